//! In-process NDK daemon and gNMI server for integration tests.
use std::net::SocketAddr;
use std::sync::Arc;

use futures::stream;
use futures::stream::BoxStream;
use futures::StreamExt;
use ndk_bond::proto::gnmi::g_nmi_server::GNmi;
use ndk_bond::proto::gnmi::g_nmi_server::GNmiServer;
use ndk_bond::proto::gnmi::typed_value::Value;
use ndk_bond::proto::gnmi::update_result::Operation as SetOperation;
use ndk_bond::proto::gnmi::GetRequest;
use ndk_bond::proto::gnmi::GetResponse;
use ndk_bond::proto::gnmi::Notification as GnmiNotification;
use ndk_bond::proto::gnmi::SetRequest;
use ndk_bond::proto::gnmi::SetResponse;
use ndk_bond::proto::gnmi::TypedValue;
use ndk_bond::proto::gnmi::Update;
use ndk_bond::proto::gnmi::UpdateResult;
use ndk_bond::proto::ndk::notification::SubscriptionTypes as Payload;
use ndk_bond::proto::ndk::notification_register_request::Operation;
use ndk_bond::proto::ndk::sdk_mgr_service_server::SdkMgrService;
use ndk_bond::proto::ndk::sdk_mgr_service_server::SdkMgrServiceServer;
use ndk_bond::proto::ndk::sdk_mgr_telemetry_service_server::SdkMgrTelemetryService;
use ndk_bond::proto::ndk::sdk_mgr_telemetry_service_server::SdkMgrTelemetryServiceServer;
use ndk_bond::proto::ndk::sdk_notification_service_server::SdkNotificationService;
use ndk_bond::proto::ndk::sdk_notification_service_server::SdkNotificationServiceServer;
use ndk_bond::proto::ndk::AgentRegistrationRequest;
use ndk_bond::proto::ndk::AgentRegistrationResponse;
use ndk_bond::proto::ndk::ConfigData;
use ndk_bond::proto::ndk::ConfigKey;
use ndk_bond::proto::ndk::ConfigNotification;
use ndk_bond::proto::ndk::KeepAliveRequest;
use ndk_bond::proto::ndk::KeepAliveResponse;
use ndk_bond::proto::ndk::Notification;
use ndk_bond::proto::ndk::NotificationRegisterRequest;
use ndk_bond::proto::ndk::NotificationRegisterResponse;
use ndk_bond::proto::ndk::NotificationStreamRequest;
use ndk_bond::proto::ndk::NotificationStreamResponse;
use ndk_bond::proto::ndk::SdkMgrOperation;
use ndk_bond::proto::ndk::SdkMgrStatus;
use ndk_bond::proto::ndk::TelemetryDeleteRequest;
use ndk_bond::proto::ndk::TelemetryDeleteResponse;
use ndk_bond::proto::ndk::TelemetryUpdateRequest;
use ndk_bond::proto::ndk::TelemetryUpdateResponse;
use ndk_bond::AGENT_METADATA_KEY;
use parking_lot::Mutex;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio_stream::wrappers::TcpListenerStream;
use tonic::codec::CompressionEncoding;
use tonic::transport::Server;
use tonic::Request;
use tonic::Response;
use tonic::Status;

pub const APP_ID: u32 = 7;
pub const STREAM_ID: u64 = 1;

/// What the daemon saw from the agent.
#[derive(Debug, Default)]
pub struct Recorded {
    pub agent_names: Vec<String>,
    pub registrations: Vec<AgentRegistrationRequest>,
    pub subscriptions: Vec<NotificationRegisterRequest>,
    pub telemetry: Vec<TelemetryUpdateRequest>,
    pub unregistered: bool,
    pub gnmi_users: Vec<String>,
    pub gnmi_requests: Vec<GetRequest>,
    pub gnmi_sets: Vec<SetRequest>,
}

#[derive(Clone)]
pub struct MockDaemon {
    pub recorded: Arc<Mutex<Recorded>>,
    notifications: Arc<Vec<Notification>>,
    config_json: Arc<String>,
}

impl MockDaemon {
    /// Daemon streaming `notifications` on every stream and answering gNMI
    /// config reads with `config_json`.
    pub fn new(
        notifications: Vec<Notification>,
        config_json: &str,
    ) -> Self {
        Self {
            recorded: Arc::new(Mutex::new(Recorded::default())),
            notifications: Arc::new(notifications),
            config_json: Arc::new(config_json.to_string()),
        }
    }

    fn record_gnmi_user<T>(
        &self,
        request: &Request<T>,
    ) {
        if let Some(user) = request.metadata().get("username").and_then(|v| v.to_str().ok()) {
            self.recorded.lock().gnmi_users.push(user.to_string());
        }
    }

    fn record_agent_name<T>(
        &self,
        request: &Request<T>,
    ) {
        if let Some(name) = request.metadata().get(AGENT_METADATA_KEY).and_then(|v| v.to_str().ok()) {
            self.recorded.lock().agent_names.push(name.to_string());
        }
    }
}

fn success() -> i32 {
    SdkMgrStatus::Success as i32
}

pub fn config_envelope(
    js_path: &str,
    json: &str,
) -> Notification {
    Notification {
        sub_id: 1,
        subscription_types: Some(Payload::Config(ConfigNotification {
            op: SdkMgrOperation::Create as i32,
            key: Some(ConfigKey {
                js_path: js_path.to_string(),
                keys: Vec::new(),
                js_path_with_keys: js_path.to_string(),
            }),
            data: Some(ConfigData { json: json.to_string() }),
        })),
    }
}

#[tonic::async_trait]
impl SdkMgrService for MockDaemon {
    async fn agent_register(
        &self,
        request: Request<AgentRegistrationRequest>,
    ) -> Result<Response<AgentRegistrationResponse>, Status> {
        self.record_agent_name(&request);
        self.recorded.lock().registrations.push(request.into_inner());
        Ok(Response::new(AgentRegistrationResponse {
            status: success(),
            error_str: String::new(),
            app_id: APP_ID,
        }))
    }

    async fn agent_un_register(
        &self,
        request: Request<AgentRegistrationRequest>,
    ) -> Result<Response<AgentRegistrationResponse>, Status> {
        self.record_agent_name(&request);
        self.recorded.lock().unregistered = true;
        Ok(Response::new(AgentRegistrationResponse {
            status: success(),
            error_str: String::new(),
            app_id: APP_ID,
        }))
    }

    async fn notification_register(
        &self,
        request: Request<NotificationRegisterRequest>,
    ) -> Result<Response<NotificationRegisterResponse>, Status> {
        let req = request.into_inner();
        if req.op() != Operation::Create {
            self.recorded.lock().subscriptions.push(req);
        }
        Ok(Response::new(NotificationRegisterResponse {
            stream_id: STREAM_ID,
            sub_id: 1,
            status: success(),
            error_str: String::new(),
        }))
    }

    async fn keep_alive(
        &self,
        _request: Request<KeepAliveRequest>,
    ) -> Result<Response<KeepAliveResponse>, Status> {
        Ok(Response::new(KeepAliveResponse {
            status: success(),
            error_str: String::new(),
        }))
    }
}

#[tonic::async_trait]
impl SdkNotificationService for MockDaemon {
    type NotificationStreamStream = BoxStream<'static, Result<NotificationStreamResponse, Status>>;

    async fn notification_stream(
        &self,
        request: Request<NotificationStreamRequest>,
    ) -> Result<Response<Self::NotificationStreamStream>, Status> {
        let stream_id = request.into_inner().stream_id;
        if stream_id != STREAM_ID {
            return Err(Status::not_found(format!("unknown stream {}", stream_id)));
        }

        let batch = NotificationStreamResponse {
            stream_id,
            notifications: self.notifications.as_ref().clone(),
        };
        let responses = stream::iter(vec![Ok(batch)]).chain(stream::pending());
        Ok(Response::new(responses.boxed()))
    }
}

#[tonic::async_trait]
impl SdkMgrTelemetryService for MockDaemon {
    async fn telemetry_add_or_update(
        &self,
        request: Request<TelemetryUpdateRequest>,
    ) -> Result<Response<TelemetryUpdateResponse>, Status> {
        self.recorded.lock().telemetry.push(request.into_inner());
        Ok(Response::new(TelemetryUpdateResponse {
            status: success(),
            error_str: String::new(),
        }))
    }

    async fn telemetry_delete(
        &self,
        _request: Request<TelemetryDeleteRequest>,
    ) -> Result<Response<TelemetryDeleteResponse>, Status> {
        Ok(Response::new(TelemetryDeleteResponse {
            status: success(),
            error_str: String::new(),
        }))
    }
}

#[tonic::async_trait]
impl GNmi for MockDaemon {
    async fn get(
        &self,
        request: Request<GetRequest>,
    ) -> Result<Response<GetResponse>, Status> {
        self.record_gnmi_user(&request);
        self.recorded.lock().gnmi_requests.push(request.into_inner());

        Ok(Response::new(GetResponse {
            notification: vec![GnmiNotification {
                update: vec![Update {
                    val: Some(TypedValue {
                        value: Some(Value::JsonIetfVal(self.config_json.as_bytes().to_vec())),
                    }),
                    ..Default::default()
                }],
                ..Default::default()
            }],
        }))
    }

    /// Answers with one result per deleted, replaced and updated path.
    async fn set(
        &self,
        request: Request<SetRequest>,
    ) -> Result<Response<SetResponse>, Status> {
        self.record_gnmi_user(&request);
        let req = request.into_inner();

        let deleted = req.delete.iter().cloned().map(|p| (Some(p), SetOperation::Delete));
        let replaced = req.replace.iter().map(|u| (u.path.clone(), SetOperation::Replace));
        let updated = req.update.iter().map(|u| (u.path.clone(), SetOperation::Update));
        let response = deleted
            .chain(replaced)
            .chain(updated)
            .map(|(path, op)| UpdateResult { path, op: op as i32 })
            .collect();

        self.recorded.lock().gnmi_sets.push(req);
        Ok(Response::new(SetResponse {
            response,
            ..Default::default()
        }))
    }
}

/// Serves `daemon` on an ephemeral local port until the returned sender
/// fires or is dropped.
pub async fn spawn_daemon(daemon: MockDaemon) -> (SocketAddr, oneshot::Sender<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = oneshot::channel::<()>();

    tokio::spawn(async move {
        Server::builder()
            .add_service(SdkMgrServiceServer::new(daemon.clone()))
            .add_service(
                SdkNotificationServiceServer::new(daemon.clone()).send_compressed(CompressionEncoding::Gzip),
            )
            .add_service(SdkMgrTelemetryServiceServer::new(daemon.clone()))
            .add_service(GNmiServer::new(daemon))
            .serve_with_incoming_shutdown(TcpListenerStream::new(listener), async {
                rx.await.ok();
            })
            .await
            .unwrap();
    });

    (addr, tx)
}
