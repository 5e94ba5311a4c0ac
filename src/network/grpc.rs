use std::time::Duration;

use futures::StreamExt;
use tonic::codec::CompressionEncoding;
use tonic::metadata::Ascii;
use tonic::metadata::MetadataValue;
use tonic::service::interceptor::InterceptedService;
use tonic::service::Interceptor;
use tonic::transport::Channel;
use tonic::transport::Endpoint;
use tonic::Request;
use tonic::Status;
use tracing::debug;

use super::NdkApi;
use super::NotificationStream;
use crate::proto::ndk::sdk_mgr_config_service_client::SdkMgrConfigServiceClient;
use crate::proto::ndk::sdk_mgr_next_hop_group_service_client::SdkMgrNextHopGroupServiceClient;
use crate::proto::ndk::sdk_mgr_route_service_client::SdkMgrRouteServiceClient;
use crate::proto::ndk::sdk_mgr_service_client::SdkMgrServiceClient;
use crate::proto::ndk::sdk_mgr_telemetry_service_client::SdkMgrTelemetryServiceClient;
use crate::proto::ndk::sdk_notification_service_client::SdkNotificationServiceClient;
use crate::proto::ndk::AcknowledgeConfigRequest;
use crate::proto::ndk::AcknowledgeConfigResponse;
use crate::proto::ndk::AgentRegistrationRequest;
use crate::proto::ndk::AgentRegistrationResponse;
use crate::proto::ndk::KeepAliveRequest;
use crate::proto::ndk::KeepAliveResponse;
use crate::proto::ndk::NextHopGroupDeleteRequest;
use crate::proto::ndk::NextHopGroupRequest;
use crate::proto::ndk::NotificationRegisterRequest;
use crate::proto::ndk::NotificationRegisterResponse;
use crate::proto::ndk::NotificationStreamRequest;
use crate::proto::ndk::RouteAddRequest;
use crate::proto::ndk::RouteDeleteRequest;
use crate::proto::ndk::SdkMgrNextHopGroupResponse;
use crate::proto::ndk::SdkMgrRouteResponse;
use crate::proto::ndk::SyncRequest;
use crate::proto::ndk::SyncResponse;
use crate::proto::ndk::TelemetryDeleteRequest;
use crate::proto::ndk::TelemetryDeleteResponse;
use crate::proto::ndk::TelemetryUpdateRequest;
use crate::proto::ndk::TelemetryUpdateResponse;
use crate::NdkConfig;
use crate::NetworkError;
use crate::Result;

/// Metadata key the daemon uses to identify the calling agent.
pub const AGENT_METADATA_KEY: &str = "agent_name";

/// Stamps every outgoing NDK request with the agent's name.
#[derive(Clone)]
pub struct AgentNameInterceptor {
    agent_name: MetadataValue<Ascii>,
}

impl AgentNameInterceptor {
    pub fn new(agent_name: &str) -> Result<Self> {
        let agent_name = MetadataValue::try_from(agent_name)
            .map_err(|_| NetworkError::InvalidMetadata(AGENT_METADATA_KEY))?;
        Ok(Self { agent_name })
    }
}

impl Interceptor for AgentNameInterceptor {
    fn call(
        &mut self,
        mut request: Request<()>,
    ) -> std::result::Result<Request<()>, Status> {
        request
            .metadata_mut()
            .insert(AGENT_METADATA_KEY, self.agent_name.clone());
        Ok(request)
    }
}

type Intercepted = InterceptedService<Channel, AgentNameInterceptor>;

/// [`NdkApi`] over one tonic channel to the NDK service manager.
///
/// Stubs are cheap to clone; each call clones the stub it needs so the
/// adapter can be shared behind an `Arc` without locking.
#[derive(Clone)]
pub struct GrpcNdkApi {
    sdk_mgr: SdkMgrServiceClient<Intercepted>,
    notification: SdkNotificationServiceClient<Intercepted>,
    telemetry: SdkMgrTelemetryServiceClient<Intercepted>,
    route: SdkMgrRouteServiceClient<Intercepted>,
    next_hop_group: SdkMgrNextHopGroupServiceClient<Intercepted>,
    config: SdkMgrConfigServiceClient<Intercepted>,
}

impl GrpcNdkApi {
    /// Connects to the daemon described by `settings`.
    pub async fn connect(
        agent_name: &str,
        settings: &NdkConfig,
    ) -> Result<Self> {
        let channel = Self::create_channel(settings).await?;
        debug!(address = %settings.address, "connected to NDK service manager");
        Self::from_channel(channel, agent_name)
    }

    /// Builds the stub set over an already established channel.
    pub fn from_channel(
        channel: Channel,
        agent_name: &str,
    ) -> Result<Self> {
        let interceptor = AgentNameInterceptor::new(agent_name)?;

        Ok(Self {
            sdk_mgr: SdkMgrServiceClient::with_interceptor(channel.clone(), interceptor.clone()),
            notification: SdkNotificationServiceClient::with_interceptor(channel.clone(), interceptor.clone())
                .accept_compressed(CompressionEncoding::Gzip),
            telemetry: SdkMgrTelemetryServiceClient::with_interceptor(channel.clone(), interceptor.clone()),
            route: SdkMgrRouteServiceClient::with_interceptor(channel.clone(), interceptor.clone()),
            next_hop_group: SdkMgrNextHopGroupServiceClient::with_interceptor(channel.clone(), interceptor.clone()),
            config: SdkMgrConfigServiceClient::with_interceptor(channel, interceptor),
        })
    }

    async fn create_channel(settings: &NdkConfig) -> Result<Channel> {
        let endpoint = Endpoint::try_from(settings.address.clone())
            .map_err(|_| NetworkError::InvalidURI(settings.address.clone()))?;

        endpoint
            .connect_timeout(Duration::from_millis(settings.connect_timeout_in_ms))
            .tcp_keepalive(Some(Duration::from_secs(settings.tcp_keepalive_in_secs)))
            .http2_keep_alive_interval(Duration::from_secs(
                settings.http2_keep_alive_interval_in_secs,
            ))
            .keep_alive_timeout(Duration::from_secs(settings.http2_keep_alive_timeout_in_secs))
            .keep_alive_while_idle(true)
            .connect()
            .await
            .map_err(|e| NetworkError::from(e).into())
    }
}

#[tonic::async_trait]
impl NdkApi for GrpcNdkApi {
    async fn agent_register(
        &self,
        req: AgentRegistrationRequest,
    ) -> Result<AgentRegistrationResponse> {
        let resp = self.sdk_mgr.clone().agent_register(req).await?;
        Ok(resp.into_inner())
    }

    async fn agent_unregister(&self) -> Result<AgentRegistrationResponse> {
        let resp = self
            .sdk_mgr
            .clone()
            .agent_un_register(AgentRegistrationRequest::default())
            .await?;
        Ok(resp.into_inner())
    }

    async fn notification_register(
        &self,
        req: NotificationRegisterRequest,
    ) -> Result<NotificationRegisterResponse> {
        let resp = self.sdk_mgr.clone().notification_register(req).await?;
        Ok(resp.into_inner())
    }

    async fn keep_alive(&self) -> Result<KeepAliveResponse> {
        let resp = self.sdk_mgr.clone().keep_alive(KeepAliveRequest {}).await?;
        Ok(resp.into_inner())
    }

    async fn notification_stream(
        &self,
        stream_id: u64,
    ) -> std::result::Result<NotificationStream, Status> {
        let resp = self
            .notification
            .clone()
            .notification_stream(NotificationStreamRequest { stream_id })
            .await?;
        Ok(resp.into_inner().boxed())
    }

    async fn telemetry_add_or_update(
        &self,
        req: TelemetryUpdateRequest,
    ) -> Result<TelemetryUpdateResponse> {
        let resp = self.telemetry.clone().telemetry_add_or_update(req).await?;
        Ok(resp.into_inner())
    }

    async fn telemetry_delete(
        &self,
        req: TelemetryDeleteRequest,
    ) -> Result<TelemetryDeleteResponse> {
        let resp = self.telemetry.clone().telemetry_delete(req).await?;
        Ok(resp.into_inner())
    }

    async fn route_add_or_update(
        &self,
        req: RouteAddRequest,
    ) -> Result<SdkMgrRouteResponse> {
        let resp = self.route.clone().route_add_or_update(req).await?;
        Ok(resp.into_inner())
    }

    async fn route_delete(
        &self,
        req: RouteDeleteRequest,
    ) -> Result<SdkMgrRouteResponse> {
        let resp = self.route.clone().route_delete(req).await?;
        Ok(resp.into_inner())
    }

    async fn route_sync_start(&self) -> Result<SyncResponse> {
        let resp = self.route.clone().sync_start(SyncRequest {}).await?;
        Ok(resp.into_inner())
    }

    async fn route_sync_end(&self) -> Result<SyncResponse> {
        let resp = self.route.clone().sync_end(SyncRequest {}).await?;
        Ok(resp.into_inner())
    }

    async fn next_hop_group_add_or_update(
        &self,
        req: NextHopGroupRequest,
    ) -> Result<SdkMgrNextHopGroupResponse> {
        let resp = self.next_hop_group.clone().next_hop_group_add_or_update(req).await?;
        Ok(resp.into_inner())
    }

    async fn next_hop_group_delete(
        &self,
        req: NextHopGroupDeleteRequest,
    ) -> Result<SdkMgrNextHopGroupResponse> {
        let resp = self.next_hop_group.clone().next_hop_group_delete(req).await?;
        Ok(resp.into_inner())
    }

    async fn next_hop_group_sync_start(&self) -> Result<SyncResponse> {
        let resp = self.next_hop_group.clone().sync_start(SyncRequest {}).await?;
        Ok(resp.into_inner())
    }

    async fn next_hop_group_sync_end(&self) -> Result<SyncResponse> {
        let resp = self.next_hop_group.clone().sync_end(SyncRequest {}).await?;
        Ok(resp.into_inner())
    }

    async fn acknowledge_config(
        &self,
        req: AcknowledgeConfigRequest,
    ) -> Result<AcknowledgeConfigResponse> {
        let resp = self.config.clone().acknowledge_config(req).await?;
        Ok(resp.into_inner())
    }
}
