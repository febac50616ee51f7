//! `grpcbench.echo.v1` -- echo probe message and service bindings.

/// A single echo probe.
///
/// The server returns the message unchanged except for `ts`, which it
/// overwrites with its own wall clock before responding. A positive
/// `delay_nanos` asks the server to hold that one response for the given
/// duration.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct EchoMessage {
    /// Sequence number, advanced by the client between chained probes.
    #[prost(int64, tag = "1")]
    pub seq: i64,
    /// Sender wall-clock timestamp, nanoseconds since the Unix epoch.
    #[prost(int64, tag = "2")]
    pub ts: i64,
    /// Opaque probe payload, echoed verbatim.
    #[prost(bytes = "vec", tag = "3")]
    pub payload: ::prost::alloc::vec::Vec<u8>,
    /// Artificial response delay in nanoseconds; zero responds at once.
    #[prost(int64, tag = "4")]
    pub delay_nanos: i64,
}

/// Client for the `grpcbench.echo.v1.Echo` service.
pub mod echo_client {
    use tonic::codegen::*;

    /// Unary echo client over an established channel.
    #[derive(Debug, Clone)]
    pub struct EchoClient {
        inner: tonic::client::Grpc<tonic::transport::Channel>,
    }

    impl EchoClient {
        /// Wraps an already-established channel.
        pub fn new(channel: tonic::transport::Channel) -> Self {
            Self {
                inner: tonic::client::Grpc::new(channel),
            }
        }

        /// Round-trips one echo probe.
        pub async fn echo(
            &mut self,
            request: impl tonic::IntoRequest<super::EchoMessage>,
        ) -> std::result::Result<tonic::Response<super::EchoMessage>, tonic::Status> {
            self.inner
                .ready()
                .await
                .map_err(|e| tonic::Status::unknown(format!("Service was not ready: {e}")))?;
            let codec = tonic::codec::ProstCodec::default();
            let path = http::uri::PathAndQuery::from_static("/grpcbench.echo.v1.Echo/Echo");
            self.inner.unary(request.into_request(), path, codec).await
        }
    }
}

/// Server scaffolding for the `grpcbench.echo.v1.Echo` service.
pub mod echo_server {
    use tonic::codegen::*;

    /// Handler trait for the echo service.
    #[async_trait]
    pub trait Echo: Send + Sync + 'static {
        /// Answers one echo probe.
        async fn echo(
            &self,
            request: tonic::Request<super::EchoMessage>,
        ) -> std::result::Result<tonic::Response<super::EchoMessage>, tonic::Status>;
    }

    /// Tower service adapter for an [`Echo`] implementation.
    #[derive(Debug)]
    pub struct EchoServer<T> {
        inner: Arc<T>,
    }

    impl<T> EchoServer<T> {
        /// Wraps a handler.
        pub fn new(inner: T) -> Self {
            Self::from_arc(Arc::new(inner))
        }

        /// Wraps a shared handler, e.g. one also observed by tests.
        pub fn from_arc(inner: Arc<T>) -> Self {
            Self { inner }
        }
    }

    impl<T, B> tonic::codegen::Service<http::Request<B>> for EchoServer<T>
    where
        T: Echo,
        B: Body + Send + 'static,
        B::Error: Into<StdError> + Send + 'static,
    {
        type Response = http::Response<tonic::body::BoxBody>;
        type Error = std::convert::Infallible;
        type Future = BoxFuture<Self::Response, Self::Error>;

        fn poll_ready(
            &mut self,
            _cx: &mut Context<'_>,
        ) -> Poll<std::result::Result<(), Self::Error>> {
            Poll::Ready(Ok(()))
        }

        fn call(&mut self, req: http::Request<B>) -> Self::Future {
            match req.uri().path() {
                "/grpcbench.echo.v1.Echo/Echo" => {
                    struct EchoSvc<T>(Arc<T>);
                    impl<T: Echo> tonic::server::UnaryService<super::EchoMessage> for EchoSvc<T> {
                        type Response = super::EchoMessage;
                        type Future = BoxFuture<tonic::Response<Self::Response>, tonic::Status>;
                        fn call(
                            &mut self,
                            request: tonic::Request<super::EchoMessage>,
                        ) -> Self::Future {
                            let inner = Arc::clone(&self.0);
                            Box::pin(async move { <T as Echo>::echo(&inner, request).await })
                        }
                    }
                    let inner = Arc::clone(&self.inner);
                    Box::pin(async move {
                        let mut grpc =
                            tonic::server::Grpc::new(tonic::codec::ProstCodec::default());
                        Ok(grpc.unary(EchoSvc(inner), req).await)
                    })
                },
                _ => Box::pin(async move {
                    Ok(http::Response::builder()
                        .status(200)
                        .header("grpc-status", tonic::Code::Unimplemented as i32)
                        .header(http::header::CONTENT_TYPE, tonic::metadata::GRPC_CONTENT_TYPE)
                        .body(empty_body())
                        .unwrap())
                }),
            }
        }
    }

    impl<T> Clone for EchoServer<T> {
        fn clone(&self) -> Self {
            Self {
                inner: Arc::clone(&self.inner),
            }
        }
    }

    impl<T> tonic::server::NamedService for EchoServer<T> {
        const NAME: &'static str = "grpcbench.echo.v1.Echo";
    }
}
