//! `grpcbench.notify.v1` -- delivery confirmation stream from a test-harness
//! subscriber peer.
//!
//! The subscriber side of a pub/sub scenario streams one [`Notification`]
//! back per message it processed; the dispatcher uses that stream as its
//! completion signal.

/// Opens a confirmation stream for an expected number of deliveries.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SubscribeRequest {
    /// Number of deliveries the subscriber should confirm.
    #[prost(int32, tag = "1")]
    pub num_events: i32,
}

/// One confirmed delivery.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Notification {
    /// Position of the confirmed delivery, starting at zero.
    #[prost(int64, tag = "1")]
    pub seq: i64,
}

/// Client for the `grpcbench.notify.v1.PerfNotifier` service.
pub mod perf_notifier_client {
    use tonic::codegen::*;

    /// Confirmation-stream client over an established channel.
    #[derive(Debug, Clone)]
    pub struct PerfNotifierClient {
        inner: tonic::client::Grpc<tonic::transport::Channel>,
    }

    impl PerfNotifierClient {
        /// Wraps an already-established channel.
        pub fn new(channel: tonic::transport::Channel) -> Self {
            Self {
                inner: tonic::client::Grpc::new(channel),
            }
        }

        /// Opens the server-streamed confirmation subscription.
        pub async fn subscribe(
            &mut self,
            request: impl tonic::IntoRequest<super::SubscribeRequest>,
        ) -> std::result::Result<
            tonic::Response<tonic::codec::Streaming<super::Notification>>,
            tonic::Status,
        > {
            self.inner
                .ready()
                .await
                .map_err(|e| tonic::Status::unknown(format!("Service was not ready: {e}")))?;
            let codec = tonic::codec::ProstCodec::default();
            let path =
                http::uri::PathAndQuery::from_static("/grpcbench.notify.v1.PerfNotifier/Subscribe");
            self.inner
                .server_streaming(request.into_request(), path, codec)
                .await
        }
    }
}

/// Server scaffolding for the `grpcbench.notify.v1.PerfNotifier` service.
pub mod perf_notifier_server {
    use tonic::codegen::*;

    /// Handler trait for the confirmation-stream service.
    #[async_trait]
    pub trait PerfNotifier: Send + Sync + 'static {
        /// Stream of delivery confirmations.
        type SubscribeStream: tonic::codegen::tokio_stream::Stream<
                Item = std::result::Result<super::Notification, tonic::Status>,
            > + Send
            + 'static;

        /// Opens a confirmation stream.
        async fn subscribe(
            &self,
            request: tonic::Request<super::SubscribeRequest>,
        ) -> std::result::Result<tonic::Response<Self::SubscribeStream>, tonic::Status>;
    }

    /// Tower service adapter for a [`PerfNotifier`] implementation.
    #[derive(Debug)]
    pub struct PerfNotifierServer<T> {
        inner: Arc<T>,
    }

    impl<T> PerfNotifierServer<T> {
        /// Wraps a handler.
        pub fn new(inner: T) -> Self {
            Self::from_arc(Arc::new(inner))
        }

        /// Wraps a shared handler, e.g. one also observed by tests.
        pub fn from_arc(inner: Arc<T>) -> Self {
            Self { inner }
        }
    }

    impl<T, B> tonic::codegen::Service<http::Request<B>> for PerfNotifierServer<T>
    where
        T: PerfNotifier,
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
                "/grpcbench.notify.v1.PerfNotifier/Subscribe" => {
                    struct SubscribeSvc<T>(Arc<T>);
                    impl<T: PerfNotifier>
                        tonic::server::ServerStreamingService<super::SubscribeRequest>
                        for SubscribeSvc<T>
                    {
                        type Response = super::Notification;
                        type ResponseStream = T::SubscribeStream;
                        type Future =
                            BoxFuture<tonic::Response<Self::ResponseStream>, tonic::Status>;
                        fn call(
                            &mut self,
                            request: tonic::Request<super::SubscribeRequest>,
                        ) -> Self::Future {
                            let inner = Arc::clone(&self.0);
                            Box::pin(
                                async move { <T as PerfNotifier>::subscribe(&inner, request).await },
                            )
                        }
                    }
                    let inner = Arc::clone(&self.inner);
                    Box::pin(async move {
                        let mut grpc =
                            tonic::server::Grpc::new(tonic::codec::ProstCodec::default());
                        Ok(grpc.server_streaming(SubscribeSvc(inner), req).await)
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

    impl<T> Clone for PerfNotifierServer<T> {
        fn clone(&self) -> Self {
            Self {
                inner: Arc::clone(&self.inner),
            }
        }
    }

    impl<T> tonic::server::NamedService for PerfNotifierServer<T> {
        const NAME: &'static str = "grpcbench.notify.v1.PerfNotifier";
    }
}
