//! Echo probe server with injected-delay support and a health surface.
//!
//! [`start_echo_server`] binds the configured address, returns it
//! synchronously so a caller can connect immediately, and keeps the
//! accept/serve loop running on a background task until process shutdown.
//! Alongside the echo service it announces SERVING for the configured
//! health service name and NOT_SERVING for `"<name>_down"`, letting tests
//! exercise both outcomes against one process.

use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio_stream::wrappers::TcpListenerStream;
use tonic::transport::Server;
use tonic::{Request, Response, Status};
use tonic_health::ServingStatus;

use crate::clock::unix_nanos;
use crate::config::TlsOptions;
use crate::proto::echo::echo_server::{Echo, EchoServer};
use crate::proto::echo::EchoMessage;

/// Default health service name announced by the echo server.
pub const DEFAULT_HEALTH_SERVICE: &str = "echo";

/// Address the server ended up bound to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoundAddr {
    /// TCP socket address, with the ephemeral port resolved.
    Tcp(SocketAddr),
    /// Unix domain socket path.
    Unix(PathBuf),
}

impl BoundAddr {
    /// The bound TCP port, useful after passing `"0"` to get a dynamic
    /// one. Returns `None` for Unix domain sockets.
    pub fn tcp_port(&self) -> Option<u16> {
        match self {
            Self::Tcp(addr) => Some(addr.port()),
            Self::Unix(_) => None,
        }
    }
}

impl fmt::Display for BoundAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tcp(addr) => write!(f, "{addr}"),
            Self::Unix(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Echo server configuration.
///
/// The address is either a numeric TCP port (`"0"` for ephemeral) or a
/// filesystem path for a Unix domain socket.
#[derive(Debug, Clone)]
pub struct EchoServerConfig {
    address: String,
    health_service: String,
    max_concurrent_streams: Option<u32>,
    tls: Option<TlsOptions>,
}

impl EchoServerConfig {
    /// Creates a configuration listening on `address` with the default
    /// health service name.
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            health_service: DEFAULT_HEALTH_SERVICE.to_string(),
            max_concurrent_streams: None,
            tls: None,
        }
    }

    /// Sets the health service name marked SERVING. An empty name keeps
    /// the default.
    pub fn with_health_service(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        if !name.is_empty() {
            self.health_service = name;
        }
        self
    }

    /// Caps the number of concurrently active HTTP/2 streams.
    pub fn with_max_concurrent_streams(mut self, max: u32) -> Self {
        self.max_concurrent_streams = Some(max);
        self
    }

    /// Enables transport security from PEM files (mutual when the options
    /// carry a client CA).
    pub fn with_tls(mut self, tls: TlsOptions) -> Self {
        self.tls = Some(tls);
        self
    }
}

/// The echo handler: returns the input with the timestamp overwritten,
/// holding the response for the requested delay first.
#[derive(Debug, Default)]
struct EchoHandler;

#[tonic::async_trait]
impl Echo for EchoHandler {
    async fn echo(&self, request: Request<EchoMessage>) -> Result<Response<EchoMessage>, Status> {
        let mut msg = request.into_inner();
        tracing::debug!(seq = msg.seq, delay_nanos = msg.delay_nanos, "echo probe");
        msg.ts = unix_nanos();
        if msg.delay_nanos > 0 {
            // Blocks only this call's task; other calls proceed.
            tokio::time::sleep(Duration::from_nanos(msg.delay_nanos as u64)).await;
        }
        Ok(Response::new(msg))
    }
}

/// Starts the echo and health server.
///
/// Returns the bound address so a caller can connect immediately while the
/// serve loop runs in the background indefinitely. Returns `None` when the
/// address cannot be bound or the TLS material cannot be loaded -- a server
/// that cannot bind has no further contract to honor, so there is nothing
/// for the caller to recover.
pub async fn start_echo_server(config: EchoServerConfig) -> Option<BoundAddr> {
    let (mut health_reporter, health_service) = tonic_health::server::health_reporter();
    health_reporter
        .set_service_status(config.health_service.as_str(), ServingStatus::Serving)
        .await;
    let down_service = format!("{}_down", config.health_service);
    health_reporter
        .set_service_status(down_service.as_str(), ServingStatus::NotServing)
        .await;

    let mut builder = Server::builder();
    if let Some(tls) = &config.tls {
        let tls_config = match tls.server_config() {
            Ok(tls_config) => tls_config,
            Err(e) => {
                tracing::error!(error = %e, "invalid TLS credentials");
                return None;
            },
        };
        builder = match builder.tls_config(tls_config) {
            Ok(builder) => builder,
            Err(e) => {
                tracing::error!(error = %e, "failed to apply TLS configuration");
                return None;
            },
        };
    }
    if let Some(max) = config.max_concurrent_streams {
        tracing::info!(max, "capping concurrent server streams");
        builder = builder.max_concurrent_streams(max);
    }
    let router = builder
        .add_service(health_service)
        .add_service(EchoServer::new(EchoHandler));

    if config.address.contains('/') {
        serve_unix(router, &config).await
    } else {
        serve_tcp(router, &config).await
    }
}

async fn serve_tcp(
    router: tonic::transport::server::Router,
    config: &EchoServerConfig,
) -> Option<BoundAddr> {
    let port: u16 = match config.address.parse() {
        Ok(port) => port,
        Err(_) => {
            tracing::error!(address = %config.address, "address is neither a TCP port nor a socket path");
            return None;
        },
    };
    let listener = match TcpListener::bind(("0.0.0.0", port)).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(port, error = %e, "failed to bind echo server");
            return None;
        },
    };
    let addr = match listener.local_addr() {
        Ok(addr) => addr,
        Err(e) => {
            tracing::error!(error = %e, "failed to read bound address");
            return None;
        },
    };
    tracing::info!(%addr, service = %config.health_service, "echo server listening");
    tokio::spawn(async move {
        if let Err(e) = router
            .serve_with_incoming(TcpListenerStream::new(listener))
            .await
        {
            tracing::error!(error = %e, "echo server terminated");
        }
    });
    Some(BoundAddr::Tcp(addr))
}

#[cfg(unix)]
async fn serve_unix(
    router: tonic::transport::server::Router,
    config: &EchoServerConfig,
) -> Option<BoundAddr> {
    use tokio::net::UnixListener;
    use tokio_stream::wrappers::UnixListenerStream;

    let path = PathBuf::from(&config.address);
    let listener = match UnixListener::bind(&path) {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(path = %path.display(), error = %e, "failed to bind echo server");
            return None;
        },
    };
    tracing::info!(path = %path.display(), service = %config.health_service, "echo server listening");
    tokio::spawn(async move {
        if let Err(e) = router
            .serve_with_incoming(UnixListenerStream::new(listener))
            .await
        {
            tracing::error!(error = %e, "echo server terminated");
        }
    });
    Some(BoundAddr::Unix(path))
}

#[cfg(not(unix))]
async fn serve_unix(
    _router: tonic::transport::server::Router,
    config: &EchoServerConfig,
) -> Option<BoundAddr> {
    tracing::error!(address = %config.address, "unix domain sockets are not supported on this platform");
    None
}
