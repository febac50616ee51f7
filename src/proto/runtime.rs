//! `dapr.proto.runtime.v1` -- runtime sidecar and application-callback
//! surfaces, plus the `dapr.proto.common.v1` invoke envelope they share.
//!
//! Only the request shapes the dispatcher drives are carried here; the
//! server scaffolding exists so the integration suite can stand up
//! in-process peers for both surfaces.

/// Invoke envelope shared by the runtime and application-callback surfaces
/// (`dapr.proto.common.v1.InvokeRequest`).
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct InvokeRequest {
    /// Method (or URL fragment) to invoke on the receiver.
    #[prost(string, tag = "1")]
    pub method: ::prost::alloc::string::String,
    /// Request payload; never absent, an empty value is substituted when no
    /// payload is configured.
    #[prost(message, optional, tag = "2")]
    pub data: ::core::option::Option<::prost_types::Any>,
    /// Content type of `data`.
    #[prost(string, tag = "3")]
    pub content_type: ::prost::alloc::string::String,
}

/// Invoke result envelope (`dapr.proto.common.v1.InvokeResponse`).
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct InvokeResponse {
    /// Response payload.
    #[prost(message, optional, tag = "1")]
    pub data: ::core::option::Option<::prost_types::Any>,
    /// Content type of `data`.
    #[prost(string, tag = "2")]
    pub content_type: ::prost::alloc::string::String,
}

/// Runtime-surface service invocation request.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct InvokeServiceRequest {
    /// Target application identifier the sidecar routes to.
    #[prost(string, tag = "1")]
    pub id: ::prost::alloc::string::String,
    /// The invoke envelope delivered to the target.
    #[prost(message, optional, tag = "3")]
    pub message: ::core::option::Option<InvokeRequest>,
}

/// State retrieval request.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetStateRequest {
    /// State store component name.
    #[prost(string, tag = "1")]
    pub store_name: ::prost::alloc::string::String,
    /// Key to fetch.
    #[prost(string, tag = "2")]
    pub key: ::prost::alloc::string::String,
}

/// State retrieval response.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetStateResponse {
    /// Stored value, empty when the key is absent.
    #[prost(bytes = "vec", tag = "1")]
    pub data: ::prost::alloc::vec::Vec<u8>,
    /// Concurrency tag for the value.
    #[prost(string, tag = "2")]
    pub etag: ::prost::alloc::string::String,
}

/// Single-event publish request.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PublishEventRequest {
    /// Pub/sub component name.
    #[prost(string, tag = "1")]
    pub pubsub_name: ::prost::alloc::string::String,
    /// Topic to publish to.
    #[prost(string, tag = "2")]
    pub topic: ::prost::alloc::string::String,
    /// Event payload.
    #[prost(bytes = "vec", tag = "3")]
    pub data: ::prost::alloc::vec::Vec<u8>,
    /// Content type of `data`.
    #[prost(string, tag = "4")]
    pub data_content_type: ::prost::alloc::string::String,
    /// Per-event metadata, e.g. `rawPayload`.
    #[prost(map = "string, string", tag = "5")]
    pub metadata: ::std::collections::HashMap<
        ::prost::alloc::string::String,
        ::prost::alloc::string::String,
    >,
}

/// Single-event publish response.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PublishEventResponse {}

/// One entry of a bulk publish request.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct BulkPublishRequestEntry {
    /// Caller-assigned identifier, unique within the batch.
    #[prost(string, tag = "1")]
    pub entry_id: ::prost::alloc::string::String,
    /// Event payload.
    #[prost(bytes = "vec", tag = "2")]
    pub event: ::prost::alloc::vec::Vec<u8>,
    /// Content type of `event`.
    #[prost(string, tag = "3")]
    pub content_type: ::prost::alloc::string::String,
    /// Per-entry metadata.
    #[prost(map = "string, string", tag = "4")]
    pub metadata: ::std::collections::HashMap<
        ::prost::alloc::string::String,
        ::prost::alloc::string::String,
    >,
}

/// Batched publish request.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct BulkPublishRequest {
    /// Pub/sub component name.
    #[prost(string, tag = "1")]
    pub pubsub_name: ::prost::alloc::string::String,
    /// Topic to publish to.
    #[prost(string, tag = "2")]
    pub topic: ::prost::alloc::string::String,
    /// Events in the batch.
    #[prost(message, repeated, tag = "3")]
    pub entries: ::prost::alloc::vec::Vec<BulkPublishRequestEntry>,
    /// Request-level metadata.
    #[prost(map = "string, string", tag = "4")]
    pub metadata: ::std::collections::HashMap<
        ::prost::alloc::string::String,
        ::prost::alloc::string::String,
    >,
}

/// Per-entry failure detail of a bulk publish.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct BulkPublishResponseFailedEntry {
    /// Identifier of the failed entry.
    #[prost(string, tag = "1")]
    pub entry_id: ::prost::alloc::string::String,
    /// Failure description.
    #[prost(string, tag = "2")]
    pub error: ::prost::alloc::string::String,
}

/// Batched publish response.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct BulkPublishResponse {
    /// Entries the broker rejected; empty on full success.
    #[prost(message, repeated, tag = "1")]
    pub failed_entries: ::prost::alloc::vec::Vec<BulkPublishResponseFailedEntry>,
}

/// Client for the `dapr.proto.runtime.v1.Dapr` runtime surface.
pub mod dapr_client {
    use tonic::codegen::*;

    /// Runtime-surface client over an established channel.
    #[derive(Debug, Clone)]
    pub struct DaprClient {
        inner: tonic::client::Grpc<tonic::transport::Channel>,
    }

    impl DaprClient {
        /// Wraps an already-established channel.
        pub fn new(channel: tonic::transport::Channel) -> Self {
            Self {
                inner: tonic::client::Grpc::new(channel),
            }
        }

        async fn ready(&mut self) -> std::result::Result<(), tonic::Status> {
            self.inner
                .ready()
                .await
                .map_err(|e| tonic::Status::unknown(format!("Service was not ready: {e}")))
        }

        /// Invokes a method on another application through the sidecar.
        pub async fn invoke_service(
            &mut self,
            request: impl tonic::IntoRequest<super::InvokeServiceRequest>,
        ) -> std::result::Result<tonic::Response<super::InvokeResponse>, tonic::Status> {
            self.ready().await?;
            let codec = tonic::codec::ProstCodec::default();
            let path =
                http::uri::PathAndQuery::from_static("/dapr.proto.runtime.v1.Dapr/InvokeService");
            self.inner.unary(request.into_request(), path, codec).await
        }

        /// Fetches a single key from a state store.
        pub async fn get_state(
            &mut self,
            request: impl tonic::IntoRequest<super::GetStateRequest>,
        ) -> std::result::Result<tonic::Response<super::GetStateResponse>, tonic::Status> {
            self.ready().await?;
            let codec = tonic::codec::ProstCodec::default();
            let path = http::uri::PathAndQuery::from_static("/dapr.proto.runtime.v1.Dapr/GetState");
            self.inner.unary(request.into_request(), path, codec).await
        }

        /// Publishes a single event.
        pub async fn publish_event(
            &mut self,
            request: impl tonic::IntoRequest<super::PublishEventRequest>,
        ) -> std::result::Result<tonic::Response<super::PublishEventResponse>, tonic::Status> {
            self.ready().await?;
            let codec = tonic::codec::ProstCodec::default();
            let path =
                http::uri::PathAndQuery::from_static("/dapr.proto.runtime.v1.Dapr/PublishEvent");
            self.inner.unary(request.into_request(), path, codec).await
        }

        /// Publishes a batch of events in one call.
        pub async fn bulk_publish_event_alpha1(
            &mut self,
            request: impl tonic::IntoRequest<super::BulkPublishRequest>,
        ) -> std::result::Result<tonic::Response<super::BulkPublishResponse>, tonic::Status> {
            self.ready().await?;
            let codec = tonic::codec::ProstCodec::default();
            let path = http::uri::PathAndQuery::from_static(
                "/dapr.proto.runtime.v1.Dapr/BulkPublishEventAlpha1",
            );
            self.inner.unary(request.into_request(), path, codec).await
        }
    }
}

/// Client for the `dapr.proto.runtime.v1.AppCallback` surface.
pub mod app_callback_client {
    use tonic::codegen::*;

    /// Application-callback client over an established channel.
    #[derive(Debug, Clone)]
    pub struct AppCallbackClient {
        inner: tonic::client::Grpc<tonic::transport::Channel>,
    }

    impl AppCallbackClient {
        /// Wraps an already-established channel.
        pub fn new(channel: tonic::transport::Channel) -> Self {
            Self {
                inner: tonic::client::Grpc::new(channel),
            }
        }

        /// Invokes a method directly on the application.
        pub async fn on_invoke(
            &mut self,
            request: impl tonic::IntoRequest<super::InvokeRequest>,
        ) -> std::result::Result<tonic::Response<super::InvokeResponse>, tonic::Status> {
            self.inner
                .ready()
                .await
                .map_err(|e| tonic::Status::unknown(format!("Service was not ready: {e}")))?;
            let codec = tonic::codec::ProstCodec::default();
            let path =
                http::uri::PathAndQuery::from_static("/dapr.proto.runtime.v1.AppCallback/OnInvoke");
            self.inner.unary(request.into_request(), path, codec).await
        }
    }
}

/// Server scaffolding for the `dapr.proto.runtime.v1.Dapr` surface.
pub mod dapr_server {
    use tonic::codegen::*;

    /// Handler trait for the runtime surface.
    #[async_trait]
    pub trait Dapr: Send + Sync + 'static {
        /// Handles a service invocation.
        async fn invoke_service(
            &self,
            request: tonic::Request<super::InvokeServiceRequest>,
        ) -> std::result::Result<tonic::Response<super::InvokeResponse>, tonic::Status>;
        /// Handles a state fetch.
        async fn get_state(
            &self,
            request: tonic::Request<super::GetStateRequest>,
        ) -> std::result::Result<tonic::Response<super::GetStateResponse>, tonic::Status>;
        /// Handles a single-event publish.
        async fn publish_event(
            &self,
            request: tonic::Request<super::PublishEventRequest>,
        ) -> std::result::Result<tonic::Response<super::PublishEventResponse>, tonic::Status>;
        /// Handles a batched publish.
        async fn bulk_publish_event_alpha1(
            &self,
            request: tonic::Request<super::BulkPublishRequest>,
        ) -> std::result::Result<tonic::Response<super::BulkPublishResponse>, tonic::Status>;
    }

    /// Tower service adapter for a [`Dapr`] implementation.
    #[derive(Debug)]
    pub struct DaprServer<T> {
        inner: Arc<T>,
    }

    impl<T> DaprServer<T> {
        /// Wraps a handler.
        pub fn new(inner: T) -> Self {
            Self::from_arc(Arc::new(inner))
        }

        /// Wraps a shared handler, e.g. one also observed by tests.
        pub fn from_arc(inner: Arc<T>) -> Self {
            Self { inner }
        }
    }

    impl<T, B> tonic::codegen::Service<http::Request<B>> for DaprServer<T>
    where
        T: Dapr,
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
                "/dapr.proto.runtime.v1.Dapr/InvokeService" => {
                    struct InvokeServiceSvc<T>(Arc<T>);
                    impl<T: Dapr> tonic::server::UnaryService<super::InvokeServiceRequest>
                        for InvokeServiceSvc<T>
                    {
                        type Response = super::InvokeResponse;
                        type Future = BoxFuture<tonic::Response<Self::Response>, tonic::Status>;
                        fn call(
                            &mut self,
                            request: tonic::Request<super::InvokeServiceRequest>,
                        ) -> Self::Future {
                            let inner = Arc::clone(&self.0);
                            Box::pin(
                                async move { <T as Dapr>::invoke_service(&inner, request).await },
                            )
                        }
                    }
                    let inner = Arc::clone(&self.inner);
                    Box::pin(async move {
                        let mut grpc =
                            tonic::server::Grpc::new(tonic::codec::ProstCodec::default());
                        Ok(grpc.unary(InvokeServiceSvc(inner), req).await)
                    })
                },
                "/dapr.proto.runtime.v1.Dapr/GetState" => {
                    struct GetStateSvc<T>(Arc<T>);
                    impl<T: Dapr> tonic::server::UnaryService<super::GetStateRequest> for GetStateSvc<T> {
                        type Response = super::GetStateResponse;
                        type Future = BoxFuture<tonic::Response<Self::Response>, tonic::Status>;
                        fn call(
                            &mut self,
                            request: tonic::Request<super::GetStateRequest>,
                        ) -> Self::Future {
                            let inner = Arc::clone(&self.0);
                            Box::pin(async move { <T as Dapr>::get_state(&inner, request).await })
                        }
                    }
                    let inner = Arc::clone(&self.inner);
                    Box::pin(async move {
                        let mut grpc =
                            tonic::server::Grpc::new(tonic::codec::ProstCodec::default());
                        Ok(grpc.unary(GetStateSvc(inner), req).await)
                    })
                },
                "/dapr.proto.runtime.v1.Dapr/PublishEvent" => {
                    struct PublishEventSvc<T>(Arc<T>);
                    impl<T: Dapr> tonic::server::UnaryService<super::PublishEventRequest>
                        for PublishEventSvc<T>
                    {
                        type Response = super::PublishEventResponse;
                        type Future = BoxFuture<tonic::Response<Self::Response>, tonic::Status>;
                        fn call(
                            &mut self,
                            request: tonic::Request<super::PublishEventRequest>,
                        ) -> Self::Future {
                            let inner = Arc::clone(&self.0);
                            Box::pin(
                                async move { <T as Dapr>::publish_event(&inner, request).await },
                            )
                        }
                    }
                    let inner = Arc::clone(&self.inner);
                    Box::pin(async move {
                        let mut grpc =
                            tonic::server::Grpc::new(tonic::codec::ProstCodec::default());
                        Ok(grpc.unary(PublishEventSvc(inner), req).await)
                    })
                },
                "/dapr.proto.runtime.v1.Dapr/BulkPublishEventAlpha1" => {
                    struct BulkPublishSvc<T>(Arc<T>);
                    impl<T: Dapr> tonic::server::UnaryService<super::BulkPublishRequest> for BulkPublishSvc<T> {
                        type Response = super::BulkPublishResponse;
                        type Future = BoxFuture<tonic::Response<Self::Response>, tonic::Status>;
                        fn call(
                            &mut self,
                            request: tonic::Request<super::BulkPublishRequest>,
                        ) -> Self::Future {
                            let inner = Arc::clone(&self.0);
                            Box::pin(async move {
                                <T as Dapr>::bulk_publish_event_alpha1(&inner, request).await
                            })
                        }
                    }
                    let inner = Arc::clone(&self.inner);
                    Box::pin(async move {
                        let mut grpc =
                            tonic::server::Grpc::new(tonic::codec::ProstCodec::default());
                        Ok(grpc.unary(BulkPublishSvc(inner), req).await)
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

    impl<T> Clone for DaprServer<T> {
        fn clone(&self) -> Self {
            Self {
                inner: Arc::clone(&self.inner),
            }
        }
    }

    impl<T> tonic::server::NamedService for DaprServer<T> {
        const NAME: &'static str = "dapr.proto.runtime.v1.Dapr";
    }
}

/// Server scaffolding for the `dapr.proto.runtime.v1.AppCallback` surface.
pub mod app_callback_server {
    use tonic::codegen::*;

    /// Handler trait for the application-callback surface.
    #[async_trait]
    pub trait AppCallback: Send + Sync + 'static {
        /// Handles a direct application invocation.
        async fn on_invoke(
            &self,
            request: tonic::Request<super::InvokeRequest>,
        ) -> std::result::Result<tonic::Response<super::InvokeResponse>, tonic::Status>;
    }

    /// Tower service adapter for an [`AppCallback`] implementation.
    #[derive(Debug)]
    pub struct AppCallbackServer<T> {
        inner: Arc<T>,
    }

    impl<T> AppCallbackServer<T> {
        /// Wraps a handler.
        pub fn new(inner: T) -> Self {
            Self::from_arc(Arc::new(inner))
        }

        /// Wraps a shared handler, e.g. one also observed by tests.
        pub fn from_arc(inner: Arc<T>) -> Self {
            Self { inner }
        }
    }

    impl<T, B> tonic::codegen::Service<http::Request<B>> for AppCallbackServer<T>
    where
        T: AppCallback,
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
                "/dapr.proto.runtime.v1.AppCallback/OnInvoke" => {
                    struct OnInvokeSvc<T>(Arc<T>);
                    impl<T: AppCallback> tonic::server::UnaryService<super::InvokeRequest> for OnInvokeSvc<T> {
                        type Response = super::InvokeResponse;
                        type Future = BoxFuture<tonic::Response<Self::Response>, tonic::Status>;
                        fn call(
                            &mut self,
                            request: tonic::Request<super::InvokeRequest>,
                        ) -> Self::Future {
                            let inner = Arc::clone(&self.0);
                            Box::pin(
                                async move { <T as AppCallback>::on_invoke(&inner, request).await },
                            )
                        }
                    }
                    let inner = Arc::clone(&self.inner);
                    Box::pin(async move {
                        let mut grpc =
                            tonic::server::Grpc::new(tonic::codec::ProstCodec::default());
                        Ok(grpc.unary(OnInvokeSvc(inner), req).await)
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

    impl<T> Clone for AppCallbackServer<T> {
        fn clone(&self) -> Self {
            Self {
                inner: Arc::clone(&self.inner),
            }
        }
    }

    impl<T> tonic::server::NamedService for AppCallbackServer<T> {
        const NAME: &'static str = "dapr.proto.runtime.v1.AppCallback";
    }
}
