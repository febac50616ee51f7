//! Dispatcher tests against in-process runtime, callback, and notifier
//! surfaces.

use std::pin::Pin;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use grpcbench::proto::notifier::perf_notifier_server::{PerfNotifier, PerfNotifierServer};
use grpcbench::proto::notifier::{Notification, SubscribeRequest};
use grpcbench::proto::runtime::app_callback_server::{AppCallback, AppCallbackServer};
use grpcbench::proto::runtime::dapr_server::{Dapr, DaprServer};
use grpcbench::proto::runtime::{
    BulkPublishRequest, BulkPublishResponse, GetStateRequest, GetStateResponse, InvokeRequest,
    InvokeResponse, InvokeServiceRequest, PublishEventRequest, PublishEventResponse,
};
use grpcbench::{CapabilityDispatcher, Error, ScenarioConfig};
use tokio::net::TcpListener;
use tokio_stream::wrappers::TcpListenerStream;
use tonic::transport::{Channel, Endpoint, Server};
use tonic::{Request, Response, Status};

#[derive(Default)]
struct MockRuntime {
    invokes: AtomicUsize,
    last_invoke: Mutex<Option<InvokeServiceRequest>>,
    state_gets: AtomicUsize,
    last_state: Mutex<Option<GetStateRequest>>,
    publishes: AtomicUsize,
    fail_publishes: AtomicBool,
    bulk_publishes: AtomicUsize,
    last_bulk: Mutex<Option<BulkPublishRequest>>,
}

#[tonic::async_trait]
impl Dapr for MockRuntime {
    async fn invoke_service(
        &self,
        request: Request<InvokeServiceRequest>,
    ) -> Result<Response<InvokeResponse>, Status> {
        self.invokes.fetch_add(1, Ordering::SeqCst);
        *self.last_invoke.lock().unwrap() = Some(request.into_inner());
        Ok(Response::new(InvokeResponse::default()))
    }

    async fn get_state(
        &self,
        request: Request<GetStateRequest>,
    ) -> Result<Response<GetStateResponse>, Status> {
        self.state_gets.fetch_add(1, Ordering::SeqCst);
        *self.last_state.lock().unwrap() = Some(request.into_inner());
        Ok(Response::new(GetStateResponse {
            data: b"value".to_vec(),
            etag: String::new(),
        }))
    }

    async fn publish_event(
        &self,
        _request: Request<PublishEventRequest>,
    ) -> Result<Response<PublishEventResponse>, Status> {
        self.publishes.fetch_add(1, Ordering::SeqCst);
        if self.fail_publishes.load(Ordering::SeqCst) {
            return Err(Status::unavailable("broker offline"));
        }
        Ok(Response::new(PublishEventResponse::default()))
    }

    async fn bulk_publish_event_alpha1(
        &self,
        request: Request<BulkPublishRequest>,
    ) -> Result<Response<BulkPublishResponse>, Status> {
        self.bulk_publishes.fetch_add(1, Ordering::SeqCst);
        *self.last_bulk.lock().unwrap() = Some(request.into_inner());
        Ok(Response::new(BulkPublishResponse::default()))
    }
}

#[derive(Default)]
struct MockCallback {
    on_invokes: AtomicUsize,
    last_invoke: Mutex<Option<InvokeRequest>>,
}

#[tonic::async_trait]
impl AppCallback for MockCallback {
    async fn on_invoke(
        &self,
        request: Request<InvokeRequest>,
    ) -> Result<Response<InvokeResponse>, Status> {
        self.on_invokes.fetch_add(1, Ordering::SeqCst);
        *self.last_invoke.lock().unwrap() = Some(request.into_inner());
        Ok(Response::new(InvokeResponse::default()))
    }
}

/// Streams back one notification per announced delivery, optionally
/// replacing the tail of the stream with an error.
#[derive(Default)]
struct MockNotifier {
    fail_after: Option<usize>,
    subscriptions: AtomicUsize,
}

#[tonic::async_trait]
impl PerfNotifier for MockNotifier {
    type SubscribeStream =
        Pin<Box<dyn tokio_stream::Stream<Item = Result<Notification, Status>> + Send>>;

    async fn subscribe(
        &self,
        request: Request<SubscribeRequest>,
    ) -> Result<Response<Self::SubscribeStream>, Status> {
        self.subscriptions.fetch_add(1, Ordering::SeqCst);
        let expected = request.into_inner().num_events.max(0) as usize;
        let mut items: Vec<Result<Notification, Status>> = (0..expected)
            .map(|i| Ok(Notification { seq: i as i64 }))
            .collect();
        if let Some(k) = self.fail_after {
            items.truncate(k);
            items.push(Err(Status::internal("notifier exploded")));
        }
        Ok(Response::new(Box::pin(tokio_stream::iter(items))))
    }
}

struct Backend {
    runtime: Arc<MockRuntime>,
    callback: Arc<MockCallback>,
    #[allow(dead_code)]
    notifier: Arc<MockNotifier>,
    channel: Channel,
}

async fn start_backend(notifier: MockNotifier) -> Backend {
    let runtime = Arc::new(MockRuntime::default());
    let callback = Arc::new(MockCallback::default());
    let notifier = Arc::new(notifier);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let router = Server::builder()
        .add_service(DaprServer::from_arc(Arc::clone(&runtime)))
        .add_service(AppCallbackServer::from_arc(Arc::clone(&callback)))
        .add_service(PerfNotifierServer::from_arc(Arc::clone(&notifier)));
    tokio::spawn(async move {
        let _ = router
            .serve_with_incoming(TcpListenerStream::new(listener))
            .await;
    });

    let channel = Endpoint::from_shared(format!("http://127.0.0.1:{port}"))
        .unwrap()
        .connect()
        .await
        .expect("client should connect");
    Backend {
        runtime,
        callback,
        notifier,
        channel,
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn invoke_targets_runtime_surface() {
    let backend = start_backend(MockNotifier::default()).await;
    let mut dispatcher = CapabilityDispatcher::prepare(
        "capability=invoke,target=dapr,method=load,appid=testapp",
        backend.channel.clone(),
        b"hello",
    )
    .await
    .expect("prepare should succeed");

    dispatcher.run().await.expect("run should succeed");

    assert_eq!(backend.runtime.invokes.load(Ordering::SeqCst), 1);
    assert_eq!(backend.callback.on_invokes.load(Ordering::SeqCst), 0);
    let req = backend.runtime.last_invoke.lock().unwrap().clone().unwrap();
    assert_eq!(req.id, "testapp");
    let envelope = req.message.unwrap();
    assert_eq!(envelope.method, "load");
    assert_eq!(envelope.content_type, "text/plain");
    assert_eq!(envelope.data.unwrap().value, b"hello");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn invoke_targets_callback_surface_not_runtime() {
    let backend = start_backend(MockNotifier::default()).await;
    let mut dispatcher = CapabilityDispatcher::prepare(
        "capability=invoke,target=appcallback,method=load,appid=",
        backend.channel.clone(),
        b"hello",
    )
    .await
    .expect("prepare should succeed");

    dispatcher.run().await.expect("run should succeed");

    assert_eq!(backend.callback.on_invokes.load(Ordering::SeqCst), 1);
    assert_eq!(backend.runtime.invokes.load(Ordering::SeqCst), 0);
    let envelope = backend.callback.last_invoke.lock().unwrap().clone().unwrap();
    assert_eq!(envelope.method, "load");
    assert_eq!(envelope.content_type, "text/plain");
    assert_eq!(envelope.data.unwrap().value, b"hello");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn prepared_request_is_reusable_across_runs() {
    let backend = start_backend(MockNotifier::default()).await;
    let mut dispatcher = CapabilityDispatcher::prepare(
        "capability=invoke,target=dapr,method=load,appid=app1",
        backend.channel.clone(),
        b"",
    )
    .await
    .unwrap();

    for _ in 0..3 {
        dispatcher.run().await.unwrap();
    }
    assert_eq!(backend.runtime.invokes.load(Ordering::SeqCst), 3);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn state_get_reflects_store_and_key() {
    let backend = start_backend(MockNotifier::default()).await;
    let mut dispatcher = CapabilityDispatcher::prepare(
        "capability=state,target=dapr,method=get,store=statestore,key=k1",
        backend.channel.clone(),
        b"",
    )
    .await
    .unwrap();

    dispatcher.run().await.unwrap();

    assert_eq!(backend.runtime.state_gets.load(Ordering::SeqCst), 1);
    let req = backend.runtime.last_state.lock().unwrap().clone().unwrap();
    assert_eq!(req.store_name, "statestore");
    assert_eq!(req.key, "k1");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn publish_sends_numevents_requests() {
    let backend = start_backend(MockNotifier::default()).await;
    let mut dispatcher = CapabilityDispatcher::prepare(
        "capability=pubsub,target=dapr,method=publish,store=memstore,topic=mytopic,numevents=5",
        backend.channel.clone(),
        b"event",
    )
    .await
    .unwrap();

    dispatcher.run().await.unwrap();
    assert_eq!(backend.runtime.publishes.load(Ordering::SeqCst), 5);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn publish_aborts_on_first_failure() {
    let backend = start_backend(MockNotifier::default()).await;
    backend.runtime.fail_publishes.store(true, Ordering::SeqCst);
    let mut dispatcher = CapabilityDispatcher::prepare(
        "capability=pubsub,target=dapr,method=publish,store=memstore,topic=mytopic,numevents=4",
        backend.channel.clone(),
        b"event",
    )
    .await
    .unwrap();

    let result = dispatcher.run().await;
    assert!(result.is_err());
    assert_eq!(backend.runtime.publishes.load(Ordering::SeqCst), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn publish_multi_continues_past_failures() {
    let backend = start_backend(MockNotifier::default()).await;
    backend.runtime.fail_publishes.store(true, Ordering::SeqCst);
    let mut dispatcher = CapabilityDispatcher::prepare(
        "capability=pubsub,target=dapr,method=publish-multi,store=memstore,topic=mytopic,numevents=4",
        backend.channel.clone(),
        b"event",
    )
    .await
    .unwrap();

    let result = dispatcher.run().await;
    match result {
        Err(Error::Rpc(status)) => assert_eq!(status.code(), tonic::Code::Unavailable),
        other => panic!("expected the last publish error, got {other:?}"),
    }
    // All four were attempted despite every one failing.
    assert_eq!(backend.runtime.publishes.load(Ordering::SeqCst), 4);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn bulkpublish_sends_one_batch_with_sequential_ids() {
    let backend = start_backend(MockNotifier::default()).await;
    let mut dispatcher = CapabilityDispatcher::prepare(
        "capability=pubsub,target=dapr,method=bulkpublish,store=memstore,topic=mytopic,contenttype=text/plain,numevents=3",
        backend.channel.clone(),
        b"event",
    )
    .await
    .unwrap();

    dispatcher.run().await.unwrap();

    assert_eq!(backend.runtime.bulk_publishes.load(Ordering::SeqCst), 1);
    assert_eq!(backend.runtime.publishes.load(Ordering::SeqCst), 0);
    let req = backend.runtime.last_bulk.lock().unwrap().clone().unwrap();
    assert_eq!(req.pubsub_name, "memstore");
    assert_eq!(req.topic, "mytopic");
    let ids: Vec<&str> = req.entries.iter().map(|e| e.entry_id.as_str()).collect();
    assert_eq!(ids, ["0", "1", "2"]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn noop_needs_no_reachable_backend() {
    // Nothing listens on this channel; noop must never dial it.
    let channel = Endpoint::from_shared("http://127.0.0.1:1".to_string())
        .unwrap()
        .connect_lazy();
    let mut dispatcher = CapabilityDispatcher::prepare(
        "capability=whatever,target=noop,method=,junk=1",
        channel,
        b"",
    )
    .await
    .expect("noop prepare is unconditional");
    dispatcher.run().await.expect("noop run is unconditional");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn confirmation_first_waits_for_one_notification() {
    let backend = start_backend(MockNotifier::default()).await;
    let mut dispatcher = CapabilityDispatcher::prepare(
        "capability=pubsub,target=dapr,method=publish,store=memstore,topic=mytopic,numevents=2,callback=true",
        backend.channel.clone(),
        b"event",
    )
    .await
    .unwrap();

    dispatcher.run().await.expect("run should complete after the first confirmation");
    assert_eq!(backend.runtime.publishes.load(Ordering::SeqCst), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn confirmation_all_waits_for_every_notification() {
    let backend = start_backend(MockNotifier::default()).await;
    let mut dispatcher = CapabilityDispatcher::prepare(
        "capability=pubsub,target=dapr,method=publish,store=memstore,topic=mytopic,numevents=3,callback=all",
        backend.channel.clone(),
        b"event",
    )
    .await
    .unwrap();

    dispatcher.run().await.expect("run should complete after all confirmations");
    assert_eq!(backend.runtime.publishes.load(Ordering::SeqCst), 3);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn confirmation_stream_failure_surfaces_as_error() {
    let backend = start_backend(MockNotifier {
        fail_after: Some(0),
        ..Default::default()
    })
    .await;
    let mut dispatcher = CapabilityDispatcher::prepare(
        "capability=pubsub,target=dapr,method=publish,store=memstore,topic=mytopic,callback=true",
        backend.channel.clone(),
        b"event",
    )
    .await
    .unwrap();

    let result = dispatcher.run().await;
    assert!(
        matches!(result, Err(Error::Confirmation(_))),
        "expected confirmation failure, got {result:?}"
    );
    // The publish itself still went out before the wait.
    assert_eq!(backend.runtime.publishes.load(Ordering::SeqCst), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn preparation_errors_issue_no_rpc() {
    let backend = start_backend(MockNotifier::default()).await;
    let result = CapabilityDispatcher::prepare(
        "capability=state,target=dapr,method=get,store=statestore",
        backend.channel.clone(),
        b"",
    )
    .await;
    assert!(result.is_err());
    assert_eq!(backend.runtime.invokes.load(Ordering::SeqCst), 0);
    assert_eq!(backend.runtime.state_gets.load(Ordering::SeqCst), 0);
    assert_eq!(backend.runtime.publishes.load(Ordering::SeqCst), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn scenario_config_prepares_a_dispatcher() {
    let backend = start_backend(MockNotifier::default()).await;
    let config: ScenarioConfig = toml::from_str(
        r#"
descriptor = "capability=invoke,target=dapr,method=load,appid=scenario"
payload = "from-file"
iterations = 2
"#,
    )
    .unwrap();
    config.validate().unwrap();
    let iterations = config.iterations;
    let mut dispatcher = config
        .into_dispatcher(backend.channel.clone())
        .await
        .unwrap();
    for _ in 0..iterations {
        dispatcher.run().await.unwrap();
    }
    assert_eq!(backend.runtime.invokes.load(Ordering::SeqCst), 2);
    let req = backend.runtime.last_invoke.lock().unwrap().clone().unwrap();
    assert_eq!(req.id, "scenario");
    assert_eq!(req.message.unwrap().data.unwrap().value, b"from-file");
}
