//! Round-trip latency and clock-skew estimation against an echo peer.
//!
//! The estimator does not attempt one-way latency asymmetry. Each
//! iteration performs a two-packet exchange analogous to a clock
//! synchronization probe: two chained echo calls yield three RTT samples
//! (two client-observed, one server-observed) and one skew sample derived
//! from the server's inferred midpoint time.

use std::io;
use std::time::Duration;

use tonic::metadata::MetadataMap;
use tonic::transport::Channel;
use tonic::Request;

use crate::clock::unix_nanos;
use crate::error::Result;
use crate::metrics::{LatencyHistogram, SignedHistogram};
use crate::proto::echo::echo_client::EchoClient;
use crate::proto::echo::EchoMessage;

/// Summary of one estimation run.
#[derive(Debug, Clone, Copy)]
pub struct ProbeSummary {
    /// Mean round-trip time in seconds -- the headline output.
    pub mean_rtt_seconds: f64,
    /// Mean round-trip time in microseconds.
    pub mean_rtt_micros: f64,
    /// Mean estimated clock skew in microseconds, positive when the
    /// server clock runs ahead of the client clock.
    pub mean_skew_micros: f64,
    /// Number of RTT samples recorded (three per iteration).
    pub rtt_samples: u64,
}

/// Round-trip time and clock-skew estimator.
///
/// Iterations run strictly sequentially on the calling task; within one
/// iteration the two chained echo calls are strictly ordered, which is
/// what makes the skew estimate meaningful.
pub struct RttProbe {
    client: EchoClient,
    iterations: usize,
    payload: Vec<u8>,
    delay: Duration,
    metadata: MetadataMap,
}

impl RttProbe {
    /// Creates a probe over an established channel, configured for one
    /// iteration with an empty payload and no injected delay.
    pub fn new(channel: Channel) -> Self {
        Self {
            client: EchoClient::new(channel),
            iterations: 1,
            payload: Vec::new(),
            delay: Duration::ZERO,
            metadata: MetadataMap::new(),
        }
    }

    /// Sets the number of measured iterations (the warm-up call is extra).
    pub fn with_iterations(mut self, n: usize) -> Self {
        self.iterations = n;
        self
    }

    /// Sets the probe payload carried by every echo message.
    pub fn with_payload(mut self, payload: impl Into<Vec<u8>>) -> Self {
        self.payload = payload.into();
        self
    }

    /// Asks the server to hold each response for `delay`, simulating a
    /// slow backend.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Attaches prepared metadata to every outgoing call.
    pub fn with_metadata(mut self, metadata: MetadataMap) -> Self {
        self.metadata = metadata;
        self
    }

    fn request(&self, msg: EchoMessage) -> Request<EchoMessage> {
        let mut request = Request::new(msg);
        if !self.metadata.is_empty() {
            *request.metadata_mut() = self.metadata.clone();
        }
        request
    }

    /// Runs the estimation protocol and prints both histograms.
    ///
    /// Any call error aborts immediately and nothing is printed -- partial
    /// histograms are never emitted.
    pub async fn run(&mut self) -> Result<ProbeSummary> {
        let mut msg = EchoMessage {
            payload: self.payload.clone(),
            delay_nanos: self.delay.as_nanos() as i64,
            ..Default::default()
        };
        // Warm up; the sample is discarded.
        self.client.echo(self.request(msg.clone())).await?;

        let mut rtt = LatencyHistogram::new();
        let mut skew = SignedHistogram::new();
        for i in 1..=self.iterations {
            msg.seq = i as i64;
            let t1a = unix_nanos();
            msg.ts = t1a;
            let first = self.client.echo(self.request(msg.clone())).await?.into_inner();
            let t2a = unix_nanos();
            let t1b = first.ts;

            // Chain the second probe off the first reply; the second call
            // cannot start before the first completed.
            let second = self.client.echo(self.request(first)).await?.into_inner();
            let t3a = unix_nanos();
            let t2b = second.ts;

            let rt1 = t2a - t1a;
            let rt2 = t3a - t2a;
            // Server-observed interval between its two stamps.
            let rt_r = t2b - t1b;
            rtt.record((rt1 / 1_000).max(0) as u64);
            rtt.record((rt2 / 1_000).max(0) as u64);
            rtt.record((rt_r / 1_000).max(0) as u64);

            // The server's inferred midpoint for the client's instant t2a.
            let mid_r = t1b + rt_r / 2;
            let skew_ns = mid_r - t2a;
            skew.record(skew_ns / 1_000);
            tracing::debug!(
                iteration = i,
                rt1,
                rt2,
                rt_r,
                skew_ns,
                "probe iteration complete"
            );

            // The second reply seeds the next iteration.
            msg = second;
        }

        let mut stdout = io::stdout();
        skew.print(&mut stdout, "Clock skew histogram usec", &[50.0])?;
        rtt.print(&mut stdout, "RTT histogram usec", &[50.0])?;

        Ok(ProbeSummary {
            mean_rtt_seconds: rtt.mean() / 1e6,
            mean_rtt_micros: rtt.mean(),
            mean_skew_micros: skew.mean(),
            rtt_samples: rtt.len(),
        })
    }
}
