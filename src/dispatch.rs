//! Capability resolution and multi-target request dispatch.
//!
//! A [`RequestDescriptor`] names one (target, capability, method) triple;
//! [`CapabilityRequest::resolve`] turns it into exactly one concrete
//! request shape during preparation, and [`CapabilityDispatcher`] executes
//! that shape any number of times against an established channel. All
//! descriptor validation happens at this single resolution point --
//! unsupported combinations fail preparation with an error naming the
//! attempted triple, and no RPC is ever issued for them.
//!
//! Pub/sub scenarios can additionally wait for out-of-band delivery
//! confirmations streamed back by a subscriber peer; see
//! [`ConfirmationMode`].

use std::collections::HashMap;

use tokio::sync::mpsc;
use tonic::transport::Channel;

use crate::descriptor::RequestDescriptor;
use crate::error::{ConfigError, Error, Result};
use crate::proto::notifier::perf_notifier_client::PerfNotifierClient;
use crate::proto::notifier::SubscribeRequest;
use crate::proto::runtime::app_callback_client::AppCallbackClient;
use crate::proto::runtime::dapr_client::DaprClient;
use crate::proto::runtime::{
    BulkPublishRequest, BulkPublishRequestEntry, GetStateRequest, InvokeRequest,
    InvokeServiceRequest, PublishEventRequest,
};

/// Content type stamped on every invoke envelope.
const INVOKE_CONTENT_TYPE: &str = "text/plain";

/// Backend surface receiving the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// Intentional universal no-op, used as a baseline.
    Noop,
    /// The sidecar-style runtime RPC surface.
    Dapr,
    /// The application-callback RPC surface.
    AppCallback,
}

impl Target {
    fn parse(s: &str) -> Option<Self> {
        match s {
            "noop" => Some(Self::Noop),
            "dapr" => Some(Self::Dapr),
            "appcallback" => Some(Self::AppCallback),
            _ => None,
        }
    }

    /// Descriptor literal for this target.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Noop => "noop",
            Self::Dapr => "dapr",
            Self::AppCallback => "appcallback",
        }
    }
}

/// Category of remote operation under test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// Service invocation.
    Invoke,
    /// State store access.
    State,
    /// Pub/sub publishing.
    PubSub,
}

impl Capability {
    fn parse(s: &str) -> Option<Self> {
        match s {
            "invoke" => Some(Self::Invoke),
            "state" => Some(Self::State),
            "pubsub" => Some(Self::PubSub),
            _ => None,
        }
    }

    /// Descriptor literal for this capability.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Invoke => "invoke",
            Self::State => "state",
            Self::PubSub => "pubsub",
        }
    }
}

/// Pub/sub method literals.
const METHOD_STATE_GET: &str = "get";
const METHOD_PUBSUB_PUBLISH: &str = "publish";
const METHOD_PUBSUB_PUBLISH_MULTI: &str = "publish-multi";
const METHOD_PUBSUB_BULK_PUBLISH: &str = "bulkpublish";

/// How many confirmation notifications `run` waits for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmationMode {
    /// Satisfied by the first forwarded notification. This matches the
    /// historically observed behavior; whether it should wait for all
    /// events is recorded as an open question in DESIGN.md.
    First,
    /// Satisfied only after `numevents` notifications.
    All,
}

/// Confirmation subscription parameters resolved during preparation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfirmationSpec {
    /// Wait mode.
    pub mode: ConfirmationMode,
    /// Number of deliveries the subscriber announces up front.
    pub expected: usize,
}

/// One concrete request shape, built once per test configuration and
/// reused across runs.
#[derive(Debug, Clone, PartialEq)]
pub enum CapabilityRequest {
    /// Unconditional success, no RPC issued.
    Noop,
    /// Runtime-surface service invocation.
    Invoke(InvokeServiceRequest),
    /// Application-callback invocation.
    InvokeAppCallback(InvokeRequest),
    /// State fetch.
    GetState(GetStateRequest),
    /// Sequential single-event publishes, fail-fast.
    Publish(Vec<PublishEventRequest>),
    /// Independent single-event publishes, best-effort: individual
    /// failures are skipped and only the last error is reported.
    PublishMulti(Vec<PublishEventRequest>),
    /// One batched publish call.
    BulkPublish(BulkPublishRequest),
}

impl CapabilityRequest {
    /// Resolves a parsed descriptor into one request shape, plus the
    /// confirmation subscription parameters when the descriptor asks for
    /// delivery confirmation.
    ///
    /// The `noop` target short-circuits before any validation, so it
    /// succeeds regardless of the other fields.
    pub fn resolve(
        descriptor: &RequestDescriptor,
        payload: &[u8],
    ) -> Result<(Self, Option<ConfirmationSpec>), ConfigError> {
        let Some(target) = Target::parse(&descriptor.target) else {
            return Err(unsupported(descriptor));
        };
        if target == Target::Noop {
            return Ok((Self::Noop, None));
        }
        let Some(capability) = Capability::parse(&descriptor.capability) else {
            return Err(unsupported(descriptor));
        };

        match (target, capability) {
            (Target::Dapr, Capability::Invoke) => {
                let envelope = build_invoke_envelope(descriptor, payload)?;
                Ok((
                    Self::Invoke(InvokeServiceRequest {
                        id: descriptor.app_id.clone(),
                        message: Some(envelope),
                    }),
                    None,
                ))
            },
            (Target::AppCallback, Capability::Invoke) => {
                let envelope = build_invoke_envelope(descriptor, payload)?;
                Ok((Self::InvokeAppCallback(envelope), None))
            },
            (Target::Dapr, Capability::State) => Ok((build_state(descriptor)?, None)),
            (Target::Dapr, Capability::PubSub) => build_pubsub(descriptor, payload),
            _ => Err(unsupported(descriptor)),
        }
    }
}

fn unsupported(descriptor: &RequestDescriptor) -> ConfigError {
    ConfigError::Unsupported {
        capability: descriptor.capability.clone(),
        target: descriptor.target.clone(),
        method: descriptor.method.clone(),
    }
}

fn build_invoke_envelope(
    descriptor: &RequestDescriptor,
    payload: &[u8],
) -> Result<InvokeRequest, ConfigError> {
    if descriptor.method.is_empty() {
        return Err(ConfigError::MissingField {
            field: "method",
            capability: "invoke",
        });
    }
    Ok(InvokeRequest {
        method: descriptor.method.clone(),
        content_type: INVOKE_CONTENT_TYPE.to_string(),
        data: Some(prost_types::Any {
            type_url: String::new(),
            value: payload.to_vec(),
        }),
    })
}

fn build_state(descriptor: &RequestDescriptor) -> Result<CapabilityRequest, ConfigError> {
    if descriptor.method.is_empty() {
        return Err(ConfigError::MissingField {
            field: "method",
            capability: "state",
        });
    }
    if descriptor.store.is_empty() {
        return Err(ConfigError::MissingField {
            field: "store",
            capability: "state",
        });
    }
    let key = descriptor.extension("key").unwrap_or_default();
    if key.is_empty() {
        return Err(ConfigError::MissingField {
            field: "key",
            capability: "state",
        });
    }
    match descriptor.method.as_str() {
        METHOD_STATE_GET => Ok(CapabilityRequest::GetState(GetStateRequest {
            store_name: descriptor.store.clone(),
            key: key.to_string(),
        })),
        other => Err(ConfigError::UnsupportedMethod {
            capability: "state",
            method: other.to_string(),
        }),
    }
}

fn build_pubsub(
    descriptor: &RequestDescriptor,
    payload: &[u8],
) -> Result<(CapabilityRequest, Option<ConfirmationSpec>), ConfigError> {
    if descriptor.method.is_empty() {
        return Err(ConfigError::MissingField {
            field: "method",
            capability: "pubsub",
        });
    }
    if descriptor.store.is_empty() {
        return Err(ConfigError::MissingField {
            field: "store(pubsub name)",
            capability: "pubsub",
        });
    }
    let topic = descriptor.extension("topic").unwrap_or_default();
    if topic.is_empty() {
        return Err(ConfigError::MissingField {
            field: "topic",
            capability: "pubsub",
        });
    }
    let content_type = descriptor.extension("contenttype").unwrap_or_default();
    let metadata = event_metadata(descriptor);

    let method = descriptor.method.as_str();
    let num_events = parse_num_events(
        descriptor,
        matches!(
            method,
            METHOD_PUBSUB_PUBLISH_MULTI | METHOD_PUBSUB_BULK_PUBLISH
        ),
    )?;
    let confirmation = parse_confirmation(descriptor, num_events)?;

    let request = match method {
        METHOD_PUBSUB_PUBLISH | METHOD_PUBSUB_PUBLISH_MULTI => {
            let events: Vec<PublishEventRequest> = (0..num_events)
                .map(|_| PublishEventRequest {
                    pubsub_name: descriptor.store.clone(),
                    topic: topic.to_string(),
                    data: payload.to_vec(),
                    data_content_type: content_type.to_string(),
                    metadata: metadata.clone(),
                })
                .collect();
            if method == METHOD_PUBSUB_PUBLISH {
                CapabilityRequest::Publish(events)
            } else {
                CapabilityRequest::PublishMulti(events)
            }
        },
        METHOD_PUBSUB_BULK_PUBLISH => {
            let entries: Vec<BulkPublishRequestEntry> = (0..num_events)
                .map(|i| BulkPublishRequestEntry {
                    entry_id: i.to_string(),
                    event: payload.to_vec(),
                    content_type: content_type.to_string(),
                    metadata: metadata.clone(),
                })
                .collect();
            CapabilityRequest::BulkPublish(BulkPublishRequest {
                pubsub_name: descriptor.store.clone(),
                topic: topic.to_string(),
                entries,
                metadata: HashMap::new(),
            })
        },
        other => {
            return Err(ConfigError::UnsupportedMethod {
                capability: "pubsub",
                method: other.to_string(),
            })
        },
    };
    Ok((request, confirmation))
}

/// Event metadata promoted from extensions: `rawpayload=<v>` contributes
/// `rawPayload=<v>`, and every `metadata.<name>=<v>` contributes
/// `<name>=<v>`.
fn event_metadata(descriptor: &RequestDescriptor) -> HashMap<String, String> {
    let mut metadata = HashMap::new();
    if let Some(raw) = descriptor.extension("rawpayload") {
        if !raw.is_empty() {
            metadata.insert("rawPayload".to_string(), raw.to_string());
        }
    }
    for (key, value) in &descriptor.extensions {
        if let Some(name) = key.strip_prefix("metadata.") {
            if !name.is_empty() {
                metadata.insert(name.to_string(), value.clone());
            }
        }
    }
    metadata
}

fn parse_num_events(
    descriptor: &RequestDescriptor,
    required: bool,
) -> Result<usize, ConfigError> {
    // An empty value behaves like an absent key.
    let value = descriptor.extension("numevents").unwrap_or("");
    if value.is_empty() {
        return if required {
            Err(ConfigError::MissingField {
                field: "numevents",
                capability: "pubsub",
            })
        } else {
            Ok(1)
        };
    }
    let n: usize = value.parse().map_err(|_| ConfigError::InvalidNumEvents {
        value: value.to_string(),
    })?;
    if n == 0 {
        return Err(ConfigError::InvalidNumEvents {
            value: value.to_string(),
        });
    }
    Ok(n)
}

fn parse_confirmation(
    descriptor: &RequestDescriptor,
    num_events: usize,
) -> Result<Option<ConfirmationSpec>, ConfigError> {
    match descriptor.extension("callback") {
        None | Some("") => Ok(None),
        Some("true") | Some("first") => Ok(Some(ConfirmationSpec {
            mode: ConfirmationMode::First,
            expected: num_events,
        })),
        Some("all") => Ok(Some(ConfirmationSpec {
            mode: ConfirmationMode::All,
            expected: num_events,
        })),
        Some(other) => Err(ConfigError::InvalidCallbackMode {
            value: other.to_string(),
        }),
    }
}

/// Rendezvous between the background notification listener and the
/// foreground `run`. A stream error is forwarded through the same channel
/// so the foreground observes it instead of the process aborting.
struct Confirmation {
    rx: mpsc::Receiver<std::result::Result<(), String>>,
    mode: ConfirmationMode,
    expected: usize,
}

impl Confirmation {
    async fn open(channel: Channel, spec: ConfirmationSpec) -> Result<Self> {
        let mut client = PerfNotifierClient::new(channel);
        let mut stream = client
            .subscribe(SubscribeRequest {
                num_events: spec.expected as i32,
            })
            .await?
            .into_inner();
        let (tx, rx) = mpsc::channel(1);
        tokio::spawn(async move {
            loop {
                match stream.message().await {
                    Ok(Some(notification)) => {
                        tracing::debug!(seq = notification.seq, "delivery confirmed");
                        if tx.send(Ok(())).await.is_err() {
                            break;
                        }
                    },
                    Ok(None) => break,
                    Err(status) => {
                        tracing::error!(%status, "confirmation stream failed");
                        let _ = tx.send(Err(status.to_string())).await;
                        break;
                    },
                }
            }
        });
        Ok(Self {
            rx,
            mode: spec.mode,
            expected: spec.expected,
        })
    }

    async fn wait(&mut self) -> Result<()> {
        let waits = match self.mode {
            ConfirmationMode::First => 1,
            ConfirmationMode::All => self.expected,
        };
        for _ in 0..waits {
            match self.rx.recv().await {
                Some(Ok(())) => {},
                Some(Err(message)) => return Err(Error::Confirmation(message)),
                None => {
                    return Err(Error::Confirmation(
                        "notification stream ended before delivery was confirmed".to_string(),
                    ))
                },
            }
        }
        Ok(())
    }
}

/// Two-phase test driver: [`prepare`](Self::prepare) builds state once,
/// [`run`](Self::run) executes it once per scheduler iteration.
pub struct CapabilityDispatcher {
    descriptor: RequestDescriptor,
    request: CapabilityRequest,
    dapr: DaprClient,
    app_callback: AppCallbackClient,
    confirmation: Option<Confirmation>,
}

impl CapabilityDispatcher {
    /// Parses and resolves `descriptor`, binds clients to `channel`, and --
    /// when delivery confirmation is requested -- opens the notification
    /// subscription and starts its background listener.
    ///
    /// Configuration errors are returned here, before any test RPC is
    /// issued.
    pub async fn prepare(descriptor: &str, channel: Channel, payload: &[u8]) -> Result<Self> {
        let descriptor = RequestDescriptor::parse(descriptor)?;
        let (request, confirmation_spec) = CapabilityRequest::resolve(&descriptor, payload)?;
        let confirmation = match confirmation_spec {
            Some(spec) => Some(Confirmation::open(channel.clone(), spec).await?),
            None => None,
        };
        Ok(Self {
            descriptor,
            request,
            dapr: DaprClient::new(channel.clone()),
            app_callback: AppCallbackClient::new(channel),
            confirmation,
        })
    }

    /// The parsed descriptor this dispatcher was prepared from.
    pub fn descriptor(&self) -> &RequestDescriptor {
        &self.descriptor
    }

    /// The resolved request shape.
    pub fn request(&self) -> &CapabilityRequest {
        &self.request
    }

    /// Executes one iteration of the prepared request.
    ///
    /// Single-call shapes propagate remote errors verbatim. The
    /// best-effort publish-multi shape continues past individual failures
    /// and reports only the last error encountered -- callers cannot tell
    /// which calls failed or how many succeeded. Pub/sub shapes block on
    /// the confirmation rendezvous after their sends when one was
    /// configured.
    pub async fn run(&mut self) -> Result<()> {
        let Self {
            request,
            dapr,
            app_callback,
            confirmation,
            ..
        } = self;
        match request {
            CapabilityRequest::Noop => {},
            CapabilityRequest::Invoke(req) => {
                dapr.invoke_service(req.clone()).await?;
            },
            CapabilityRequest::InvokeAppCallback(req) => {
                app_callback.on_invoke(req.clone()).await?;
            },
            CapabilityRequest::GetState(req) => {
                dapr.get_state(req.clone()).await?;
            },
            CapabilityRequest::Publish(events) => {
                for event in events.iter() {
                    dapr.publish_event(event.clone()).await?;
                }
                if let Some(confirmation) = confirmation {
                    confirmation.wait().await?;
                }
            },
            CapabilityRequest::PublishMulti(events) => {
                let mut last_err: Option<tonic::Status> = None;
                for event in events.iter() {
                    if let Err(status) = dapr.publish_event(event.clone()).await {
                        tracing::warn!(%status, "publish failed, continuing");
                        last_err = Some(status);
                    }
                }
                if let Some(confirmation) = confirmation {
                    confirmation.wait().await?;
                }
                if let Some(status) = last_err {
                    return Err(status.into());
                }
            },
            CapabilityRequest::BulkPublish(req) => {
                dapr.bulk_publish_event_alpha1(req.clone()).await?;
                if let Some(confirmation) = confirmation {
                    confirmation.wait().await?;
                }
            },
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolve(descriptor: &str, payload: &[u8]) -> Result<(CapabilityRequest, Option<ConfirmationSpec>), ConfigError> {
        let descriptor = RequestDescriptor::parse(descriptor).expect("descriptor should parse");
        CapabilityRequest::resolve(&descriptor, payload)
    }

    #[test]
    fn test_invoke_dapr_builds_envelope() {
        let (request, confirmation) = resolve(
            "capability=invoke,target=dapr,method=load,appid=testapp",
            b"hello",
        )
        .unwrap();
        assert!(confirmation.is_none());
        let CapabilityRequest::Invoke(req) = request else {
            panic!("expected Invoke, got {request:?}");
        };
        assert_eq!(req.id, "testapp");
        let envelope = req.message.unwrap();
        assert_eq!(envelope.method, "load");
        assert_eq!(envelope.content_type, "text/plain");
        assert_eq!(envelope.data.unwrap().value, b"hello");
    }

    #[test]
    fn test_invoke_appcallback_targets_callback_surface() {
        let (request, _) = resolve(
            "capability=invoke,target=appcallback,method=load,appid=",
            b"hello",
        )
        .unwrap();
        let CapabilityRequest::InvokeAppCallback(envelope) = request else {
            panic!("expected InvokeAppCallback, got {request:?}");
        };
        assert_eq!(envelope.method, "load");
        assert_eq!(envelope.content_type, "text/plain");
        assert_eq!(envelope.data.unwrap().value, b"hello");
    }

    #[test]
    fn test_invoke_empty_payload_substitutes_empty_bytes() {
        let (request, _) =
            resolve("capability=invoke,target=dapr,method=load", b"").unwrap();
        let CapabilityRequest::Invoke(req) = request else {
            panic!("expected Invoke");
        };
        let data = req.message.unwrap().data.unwrap();
        assert!(data.value.is_empty());
    }

    #[test]
    fn test_invoke_requires_method() {
        let err = resolve("capability=invoke,target=dapr", b"").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::MissingField { field: "method", .. }
        ));
    }

    #[test]
    fn test_state_get_reflects_store_and_key() {
        let (request, _) = resolve(
            "capability=state,target=dapr,method=get,store=statestore,key=k1",
            b"",
        )
        .unwrap();
        let CapabilityRequest::GetState(req) = request else {
            panic!("expected GetState");
        };
        assert_eq!(req.store_name, "statestore");
        assert_eq!(req.key, "k1");
    }

    #[test]
    fn test_state_missing_fields_fail_preparation() {
        for (descriptor, field) in [
            ("capability=state,target=dapr,store=s,key=k", "method"),
            ("capability=state,target=dapr,method=get,key=k", "store"),
            ("capability=state,target=dapr,method=get,store=s", "key"),
        ] {
            let err = resolve(descriptor, b"").unwrap_err();
            assert!(
                matches!(err, ConfigError::MissingField { field: f, .. } if f == field),
                "descriptor {descriptor:?} should fail on {field}, got {err}"
            );
        }
    }

    #[test]
    fn test_state_rejects_unknown_method() {
        let err = resolve(
            "capability=state,target=dapr,method=set,store=s,key=k",
            b"",
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::UnsupportedMethod { capability: "state", ref method } if method == "set"
        ));
    }

    #[test]
    fn test_publish_defaults_to_one_event() {
        let (request, _) = resolve(
            "capability=pubsub,target=dapr,method=publish,store=memstore,topic=mytopic",
            b"hello world",
        )
        .unwrap();
        let CapabilityRequest::Publish(events) = request else {
            panic!("expected Publish");
        };
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].pubsub_name, "memstore");
        assert_eq!(events[0].topic, "mytopic");
        assert_eq!(events[0].data, b"hello world");
    }

    #[test]
    fn test_publish_honors_numevents() {
        let (request, _) = resolve(
            "capability=pubsub,target=dapr,method=publish,store=memstore,topic=mytopic,contenttype=text/plain,numevents=100",
            b"hello world",
        )
        .unwrap();
        let CapabilityRequest::Publish(events) = request else {
            panic!("expected Publish");
        };
        assert_eq!(events.len(), 100);
        for event in &events {
            assert_eq!(event.data_content_type, "text/plain");
            assert_eq!(event.data, b"hello world");
        }
    }

    #[test]
    fn test_publish_metadata_promotion() {
        let (request, _) = resolve(
            "capability=pubsub,target=dapr,method=publish,store=s,topic=t,rawpayload=true,metadata.priority=high",
            b"",
        )
        .unwrap();
        let CapabilityRequest::Publish(events) = request else {
            panic!("expected Publish");
        };
        assert_eq!(events[0].metadata.get("rawPayload").map(String::as_str), Some("true"));
        assert_eq!(events[0].metadata.get("priority").map(String::as_str), Some("high"));
    }

    #[test]
    fn test_publish_rejects_non_numeric_numevents() {
        let err = resolve(
            "capability=pubsub,target=dapr,method=publish,store=s,topic=t,numevents=invalid",
            b"",
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidNumEvents { ref value } if value == "invalid"
        ));
    }

    #[test]
    fn test_publish_multi_requires_numevents() {
        let err = resolve(
            "capability=pubsub,target=dapr,method=publish-multi,store=s,topic=t",
            b"",
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::MissingField { field: "numevents", .. }
        ));
    }

    #[test]
    fn test_publish_multi_builds_independent_events() {
        let (request, _) = resolve(
            "capability=pubsub,target=dapr,method=publish-multi,store=s,topic=t,numevents=4",
            b"x",
        )
        .unwrap();
        let CapabilityRequest::PublishMulti(events) = request else {
            panic!("expected PublishMulti");
        };
        assert_eq!(events.len(), 4);
    }

    #[test]
    fn test_bulkpublish_missing_or_bad_numevents_fails() {
        let err = resolve(
            "capability=pubsub,target=dapr,method=bulkpublish,store=s,topic=t",
            b"",
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::MissingField { field: "numevents", .. }));

        let err = resolve(
            "capability=pubsub,target=dapr,method=bulkpublish,store=s,topic=t,numevents=nope",
            b"",
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidNumEvents { ref value } if value == "nope"
        ));

        let err = resolve(
            "capability=pubsub,target=dapr,method=bulkpublish,store=s,topic=t,numevents=0",
            b"",
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidNumEvents { .. }));
    }

    #[test]
    fn test_bulkpublish_entry_ids_are_sequential() {
        let (request, _) = resolve(
            "capability=pubsub,target=dapr,method=bulkpublish,store=memstore,topic=mytopic,contenttype=text/plain,numevents=100",
            b"hello world",
        )
        .unwrap();
        let CapabilityRequest::BulkPublish(req) = request else {
            panic!("expected BulkPublish");
        };
        assert_eq!(req.pubsub_name, "memstore");
        assert_eq!(req.topic, "mytopic");
        assert_eq!(req.entries.len(), 100);
        for (i, entry) in req.entries.iter().enumerate() {
            assert_eq!(entry.entry_id, i.to_string());
            assert_eq!(entry.content_type, "text/plain");
            assert_eq!(entry.event, b"hello world");
        }
    }

    #[test]
    fn test_pubsub_rejects_unknown_method() {
        let err = resolve(
            "capability=pubsub,target=dapr,method=invalid,store=s,topic=t",
            b"",
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::UnsupportedMethod { capability: "pubsub", ref method } if method == "invalid"
        ));
    }

    #[test]
    fn test_pubsub_missing_fields_fail_preparation() {
        let err = resolve("capability=pubsub,target=dapr,store=s,topic=t", b"").unwrap_err();
        assert!(matches!(err, ConfigError::MissingField { field: "method", .. }));

        let err = resolve("capability=pubsub,target=dapr,method=publish,topic=t", b"").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::MissingField { field: "store(pubsub name)", .. }
        ));

        let err = resolve("capability=pubsub,target=dapr,method=publish,store=s", b"").unwrap_err();
        assert!(matches!(err, ConfigError::MissingField { field: "topic", .. }));
    }

    #[test]
    fn test_noop_succeeds_regardless_of_other_fields() {
        let (request, confirmation) = resolve(
            "capability=garbage,target=noop,method=whatever,bogus.ext=1",
            b"",
        )
        .unwrap();
        assert_eq!(request, CapabilityRequest::Noop);
        assert!(confirmation.is_none());
    }

    #[test]
    fn test_unsupported_triples_name_the_attempt() {
        for descriptor in [
            "capability=state,target=appcallback,method=get,store=s,key=k",
            "capability=pubsub,target=appcallback,method=publish,store=s,topic=t",
            "capability=unknown,target=dapr,method=m",
            "capability=invoke,target=elsewhere,method=m",
        ] {
            let err = resolve(descriptor, b"").unwrap_err();
            assert!(
                matches!(err, ConfigError::Unsupported { .. }),
                "descriptor {descriptor:?} should be unsupported, got {err}"
            );
        }
    }

    #[test]
    fn test_callback_modes() {
        let (_, confirmation) = resolve(
            "capability=pubsub,target=dapr,method=publish,store=s,topic=t,callback=true",
            b"",
        )
        .unwrap();
        assert_eq!(
            confirmation,
            Some(ConfirmationSpec {
                mode: ConfirmationMode::First,
                expected: 1
            })
        );

        let (_, confirmation) = resolve(
            "capability=pubsub,target=dapr,method=publish,store=s,topic=t,callback=all,numevents=7",
            b"",
        )
        .unwrap();
        assert_eq!(
            confirmation,
            Some(ConfirmationSpec {
                mode: ConfirmationMode::All,
                expected: 7
            })
        );

        let err = resolve(
            "capability=pubsub,target=dapr,method=publish,store=s,topic=t,callback=maybe",
            b"",
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidCallbackMode { ref value } if value == "maybe"));
    }

    #[test]
    fn test_target_and_capability_literals() {
        assert_eq!(Target::Noop.as_str(), "noop");
        assert_eq!(Target::Dapr.as_str(), "dapr");
        assert_eq!(Target::AppCallback.as_str(), "appcallback");
        assert_eq!(Capability::Invoke.as_str(), "invoke");
        assert_eq!(Capability::State.as_str(), "state");
        assert_eq!(Capability::PubSub.as_str(), "pubsub");
    }
}
