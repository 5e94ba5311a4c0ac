use super::ndk::notification_register_request::Operation;
use super::ndk::notification_register_request::SubscriptionTypes;
use super::ndk::AcknowledgeConfigResponse;
use super::ndk::AgentRegistrationResponse;
use super::ndk::KeepAliveResponse;
use super::ndk::NotificationRegisterRequest;
use super::ndk::NotificationRegisterResponse;
use super::ndk::SdkMgrNextHopGroupResponse;
use super::ndk::SdkMgrRouteResponse;
use super::ndk::SdkMgrStatus;
use super::ndk::SyncResponse;
use super::ndk::TelemetryDeleteResponse;
use super::ndk::TelemetryUpdateResponse;

/// Common view over every daemon response that carries an `SdkMgrStatus`.
pub trait SdkMgrResponse {
    /// Raw status value as received on the wire.
    fn sdk_status(&self) -> i32;

    fn sdk_error_str(&self) -> &str;

    /// Unknown status values are treated as failures.
    fn is_success(&self) -> bool {
        self.sdk_status() == SdkMgrStatus::Success as i32
    }
}

macro_rules! impl_sdk_mgr_response {
    ($($ty:ty),* $(,)?) => {
        $(
            impl SdkMgrResponse for $ty {
                fn sdk_status(&self) -> i32 {
                    self.status
                }

                fn sdk_error_str(&self) -> &str {
                    &self.error_str
                }
            }
        )*
    };
}

impl_sdk_mgr_response!(
    AgentRegistrationResponse,
    KeepAliveResponse,
    NotificationRegisterResponse,
    TelemetryUpdateResponse,
    TelemetryDeleteResponse,
    SdkMgrRouteResponse,
    SdkMgrNextHopGroupResponse,
    SyncResponse,
    AcknowledgeConfigResponse,
);

impl NotificationRegisterRequest {
    /// Request that allocates a new notification stream.
    pub fn create_stream() -> Self {
        Self {
            op: Operation::Create as i32,
            ..Default::default()
        }
    }

    /// Request that adds one subscription to an existing stream.
    pub fn add_subscription(
        stream_id: u64,
        subscription: SubscriptionTypes,
    ) -> Self {
        Self {
            op: Operation::AddSubscription as i32,
            stream_id,
            sub_id: 0,
            subscription_types: Some(subscription),
        }
    }
}
