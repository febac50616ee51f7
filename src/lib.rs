//! Protocol-level measurement and multi-target dispatch core for a gRPC
//! load-testing harness.
//!
//! This crate is the layer of a load-testing harness that actually drives
//! a remote RPC peer and measures it. It deliberately stops short of
//! scheduling: callers hand it an established channel and a payload, call
//! a `prepare` once, then `run` as many times as their QPS loop wants.
//!
//! # Architecture
//!
//! Three independent pieces compose through that shared contract:
//!
//! - [`start_echo_server`]: a minimal echo RPC service with optional
//!   injected delay plus a standard health surface, the measurement target
//!   for the other two drivers.
//! - [`RttProbe`]: chained echo exchanges yielding round-trip latency and
//!   clock-skew estimates, recorded into HdrHistograms.
//! - [`HealthPoller`]: repeated standard health checks aggregated into a
//!   per-status [`HealthTally`].
//! - [`CapabilityDispatcher`]: resolves a flat `key=value`
//!   [`RequestDescriptor`] into one concrete request against the runtime
//!   sidecar surface or the application callback surface, optionally
//!   blocking on an out-of-band delivery confirmation stream.
//!
//! # Example
//!
//! ```rust,no_run
//! use grpcbench::{start_echo_server, EchoServerConfig, RttProbe};
//!
//! # async fn example() -> grpcbench::Result<()> {
//! let addr = start_echo_server(EchoServerConfig::new("0"))
//!     .await
//!     .expect("bind failed");
//! let channel = tonic::transport::Endpoint::from_shared(
//!     format!("http://127.0.0.1:{}", addr.tcp_port().unwrap()),
//! )?
//! .connect()
//! .await?;
//! let summary = RttProbe::new(channel)
//!     .with_iterations(100)
//!     .with_payload("ping")
//!     .run()
//!     .await?;
//! println!("mean rtt: {}s", summary.mean_rtt_seconds);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod descriptor;
pub mod dispatch;
pub mod echo;
pub mod error;
pub mod health;
pub mod metrics;
pub mod probe;
pub mod proto;

mod clock;

pub use config::{ScenarioConfig, TlsOptions};
pub use descriptor::RequestDescriptor;
pub use dispatch::{
    Capability, CapabilityDispatcher, CapabilityRequest, ConfirmationMode, ConfirmationSpec,
    Target,
};
pub use echo::{
    start_echo_server, BoundAddr, EchoServerConfig, DEFAULT_HEALTH_SERVICE,
};
pub use error::{ConfigError, Error, Result};
pub use health::{HealthPoller, HealthTally};
pub use metrics::{LatencyHistogram, SignedHistogram};
pub use probe::{ProbeSummary, RttProbe};
