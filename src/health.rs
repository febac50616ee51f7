//! Standard gRPC health polling with status tallies and latency recording.

use std::collections::BTreeMap;
use std::io::{self, Write};
use std::time::Instant;

use tonic::metadata::MetadataMap;
use tonic::transport::Channel;
use tonic::Request;
use tonic_health::pb::health_check_response::ServingStatus;
use tonic_health::pb::health_client::HealthClient;
use tonic_health::pb::HealthCheckRequest;

use crate::error::Result;
use crate::metrics::LatencyHistogram;

/// Mapping from serving-status label to occurrence count.
pub type HealthTally = BTreeMap<String, u64>;

/// Repeated health-check driver.
///
/// Each iteration times the call with a wall clock around the call
/// boundary (not protocol timestamps) and tallies the returned status
/// label. Any single call error aborts the remaining iterations and
/// discards accumulated state.
pub struct HealthPoller {
    client: HealthClient<Channel>,
    service: String,
    iterations: usize,
    metadata: MetadataMap,
}

impl HealthPoller {
    /// Creates a poller for `service` over an established channel,
    /// configured for one iteration.
    pub fn new(channel: Channel, service: impl Into<String>) -> Self {
        Self {
            client: HealthClient::new(channel),
            service: service.into(),
            iterations: 1,
            metadata: MetadataMap::new(),
        }
    }

    /// Sets the number of iterations.
    pub fn with_iterations(mut self, n: usize) -> Self {
        self.iterations = n;
        self
    }

    /// Attaches prepared metadata to every outgoing call.
    pub fn with_metadata(mut self, metadata: MetadataMap) -> Self {
        self.metadata = metadata;
        self
    }

    /// Polls the health service and returns the per-status tally.
    ///
    /// On success the RTT histogram and per-status counts are printed
    /// first; any failure short-circuits output entirely.
    pub async fn run(&mut self) -> Result<HealthTally> {
        tracing::info!(
            service = %self.service,
            iterations = self.iterations,
            "running health check"
        );
        let mut rtt = LatencyHistogram::new();
        let mut tally = HealthTally::new();
        for i in 1..=self.iterations {
            let mut request = Request::new(HealthCheckRequest {
                service: self.service.clone(),
            });
            if !self.metadata.is_empty() {
                *request.metadata_mut() = self.metadata.clone();
            }
            let start = Instant::now();
            let response = self.client.check(request).await?;
            let elapsed = start.elapsed();
            let status = response.into_inner().status;
            let label = ServingStatus::try_from(status)
                .map(|s| s.as_str_name())
                .unwrap_or("UNKNOWN");
            tracing::debug!(iteration = i, label, "health reply");
            *tally.entry(label.to_string()).or_insert(0) += 1;
            rtt.record(elapsed.as_micros() as u64);
        }

        let mut stdout = io::stdout();
        rtt.print(&mut stdout, "RTT histogram usec", &[50.0])?;
        for (status, count) in &tally {
            writeln!(stdout, "Health {status} : {count}")?;
        }
        Ok(tally)
    }
}
