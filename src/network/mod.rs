//! This module is the network abstraction layer between an agent and the
//! NDK daemon.
//!
//! The agent never talks to tonic stubs directly. Every daemon RPC goes
//! through [`NdkApi`] and every gNMI call, including the post-commit
//! configuration read, goes through [`ConfigQuery`], so session logic can be
//! driven by mocks in tests.
mod gnmi;
mod grpc;
mod retry;
pub use gnmi::*;
pub use grpc::*;
pub(crate) use retry::*;

#[cfg(test)]
mod gnmi_test;

// Trait definition of the current module
// -----------------------------------------------------------------------------

use futures::stream::BoxStream;
#[cfg(test)]
use mockall::automock;
use tonic::async_trait;

use crate::proto::gnmi::GetRequest;
use crate::proto::gnmi::GetResponse;
use crate::proto::gnmi::SetRequest;
use crate::proto::gnmi::SetResponse;
use crate::proto::ndk::AcknowledgeConfigRequest;
use crate::proto::ndk::AcknowledgeConfigResponse;
use crate::proto::ndk::AgentRegistrationRequest;
use crate::proto::ndk::AgentRegistrationResponse;
use crate::proto::ndk::KeepAliveResponse;
use crate::proto::ndk::NextHopGroupDeleteRequest;
use crate::proto::ndk::NextHopGroupRequest;
use crate::proto::ndk::NotificationRegisterRequest;
use crate::proto::ndk::NotificationRegisterResponse;
use crate::proto::ndk::NotificationStreamResponse;
use crate::proto::ndk::RouteAddRequest;
use crate::proto::ndk::RouteDeleteRequest;
use crate::proto::ndk::SdkMgrNextHopGroupResponse;
use crate::proto::ndk::SdkMgrRouteResponse;
use crate::proto::ndk::SyncResponse;
use crate::proto::ndk::TelemetryDeleteRequest;
use crate::proto::ndk::TelemetryDeleteResponse;
use crate::proto::ndk::TelemetryUpdateRequest;
use crate::proto::ndk::TelemetryUpdateResponse;
use crate::Result;

/// Server-streamed notifications of one stream handle.
pub type NotificationStream = BoxStream<'static, std::result::Result<NotificationStreamResponse, tonic::Status>>;

/// Request/response surface of the NDK daemon.
///
/// Implementations return the daemon's response as-is; callers decide what a
/// non-success `SdkMgrStatus` means for them.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait NdkApi: Send + Sync + 'static {
    async fn agent_register(
        &self,
        req: AgentRegistrationRequest,
    ) -> Result<AgentRegistrationResponse>;

    async fn agent_unregister(&self) -> Result<AgentRegistrationResponse>;

    /// Creates streams and adds or removes subscriptions on them.
    async fn notification_register(
        &self,
        req: NotificationRegisterRequest,
    ) -> Result<NotificationRegisterResponse>;

    async fn keep_alive(&self) -> Result<KeepAliveResponse>;

    /// Opens the receive side of a notification stream.
    ///
    /// Returns the raw status on failure so the caller can tell an
    /// invalidated handle (`NotFound`, `InvalidArgument`) from a transient
    /// transport problem.
    async fn notification_stream(
        &self,
        stream_id: u64,
    ) -> std::result::Result<NotificationStream, tonic::Status>;

    async fn telemetry_add_or_update(
        &self,
        req: TelemetryUpdateRequest,
    ) -> Result<TelemetryUpdateResponse>;

    async fn telemetry_delete(
        &self,
        req: TelemetryDeleteRequest,
    ) -> Result<TelemetryDeleteResponse>;

    async fn route_add_or_update(
        &self,
        req: RouteAddRequest,
    ) -> Result<SdkMgrRouteResponse>;

    async fn route_delete(
        &self,
        req: RouteDeleteRequest,
    ) -> Result<SdkMgrRouteResponse>;

    async fn route_sync_start(&self) -> Result<SyncResponse>;

    async fn route_sync_end(&self) -> Result<SyncResponse>;

    async fn next_hop_group_add_or_update(
        &self,
        req: NextHopGroupRequest,
    ) -> Result<SdkMgrNextHopGroupResponse>;

    async fn next_hop_group_delete(
        &self,
        req: NextHopGroupDeleteRequest,
    ) -> Result<SdkMgrNextHopGroupResponse>;

    async fn next_hop_group_sync_start(&self) -> Result<SyncResponse>;

    async fn next_hop_group_sync_end(&self) -> Result<SyncResponse>;

    async fn acknowledge_config(
        &self,
        req: AcknowledgeConfigRequest,
    ) -> Result<AcknowledgeConfigResponse>;
}

/// gNMI surface of the management server.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ConfigQuery: Send + Sync + 'static {
    async fn get(
        &self,
        req: GetRequest,
    ) -> Result<GetResponse>;

    async fn set(
        &self,
        req: SetRequest,
    ) -> Result<SetResponse>;

    /// Returns the JSON-IETF blob stored under `path`, or `None` when the
    /// server had no update for it.
    async fn get_config(
        &self,
        path: &str,
    ) -> Result<Option<String>>;
}
