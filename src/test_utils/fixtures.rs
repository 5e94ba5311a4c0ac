use std::sync::Arc;
use std::time::Duration;

use futures::stream;
use futures::StreamExt;
use tokio_util::sync::CancellationToken;

use crate::network::MockNdkApi;
use crate::network::NdkApi;
use crate::network::NotificationStream;
use crate::proto::ndk::notification::SubscriptionTypes;
use crate::proto::ndk::ConfigData;
use crate::proto::ndk::ConfigKey;
use crate::proto::ndk::ConfigNotification;
use crate::proto::ndk::Notification;
use crate::proto::ndk::NotificationRegisterResponse;
use crate::proto::ndk::NotificationStreamResponse;
use crate::proto::ndk::SdkMgrOperation;
use crate::proto::ndk::SdkMgrStatus;
use crate::stream::StreamRegistry;
use crate::Agent;
use crate::AgentBuilder;

pub(crate) const RETRY: Duration = Duration::from_secs(5);

pub(crate) fn success() -> i32 {
    SdkMgrStatus::Success as i32
}

pub(crate) fn failed() -> i32 {
    SdkMgrStatus::Failed as i32
}

pub(crate) fn register_ok(stream_id: u64) -> NotificationRegisterResponse {
    NotificationRegisterResponse {
        stream_id,
        sub_id: 1,
        status: success(),
        error_str: String::new(),
    }
}

pub(crate) fn register_failed(error_str: &str) -> NotificationRegisterResponse {
    NotificationRegisterResponse {
        stream_id: 0,
        sub_id: 0,
        status: failed(),
        error_str: error_str.to_string(),
    }
}

pub(crate) fn config_notification(
    js_path: &str,
    js_path_with_keys: &str,
    keys: &[&str],
    json: &str,
) -> ConfigNotification {
    ConfigNotification {
        op: SdkMgrOperation::Create as i32,
        key: Some(ConfigKey {
            js_path: js_path.to_string(),
            keys: keys.iter().map(|k| k.to_string()).collect(),
            js_path_with_keys: js_path_with_keys.to_string(),
        }),
        data: Some(ConfigData { json: json.to_string() }),
    }
}

pub(crate) fn commit_end(commit_seq: u64) -> ConfigNotification {
    config_notification(
        ".commit.end",
        ".commit.end",
        &[],
        &format!(r#"{{"commit_seq":{}}}"#, commit_seq),
    )
}

/// Envelope carrying one config payload whose data is `json`.
pub(crate) fn config_envelope(json: &str) -> Notification {
    Notification {
        sub_id: 1,
        subscription_types: Some(SubscriptionTypes::Config(config_notification(
            ".greeter",
            ".greeter",
            &[],
            json,
        ))),
    }
}

pub(crate) fn empty_envelope() -> Notification {
    Notification {
        sub_id: 1,
        subscription_types: None,
    }
}

pub(crate) fn stream_response(
    stream_id: u64,
    notifications: Vec<Notification>,
) -> NotificationStreamResponse {
    NotificationStreamResponse {
        stream_id,
        notifications,
    }
}

/// Stream that yields `responses` and then ends.
pub(crate) fn finite_stream(responses: Vec<NotificationStreamResponse>) -> NotificationStream {
    stream::iter(responses.into_iter().map(Ok)).boxed()
}

/// Stream that yields `responses` and then stays open forever.
pub(crate) fn open_stream(responses: Vec<NotificationStreamResponse>) -> NotificationStream {
    stream::iter(responses.into_iter().map(Ok))
        .chain(stream::pending())
        .boxed()
}

pub(crate) fn registry(
    api: MockNdkApi,
    cancel: CancellationToken,
) -> StreamRegistry {
    let api: Arc<dyn NdkApi> = Arc::new(api);
    StreamRegistry::new(api, RETRY, cancel)
}

/// Agent from `builder` wired to `api` without going through registration.
pub(crate) fn agent_with(
    builder: AgentBuilder,
    api: MockNdkApi,
) -> Agent {
    let api: Arc<dyn NdkApi> = Arc::new(api);
    builder.build().unwrap().with_api(api)
}
