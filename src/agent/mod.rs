//! The agent session.
//!
//! An [`Agent`] registers with the NDK daemon, keeps the config stream
//! running and exposes the operations an application uses to push state,
//! routes and next hop groups back to the daemon. Raw gNMI get and set
//! calls go to the management server's gNMI service.
//!
//! Startup is a fixed sequence where every step is fatal:
//! connect -> register -> shutdown signal handler -> keepalive (optional)
//! -> config query client -> config notification stream.
mod ack;
mod builder;
mod gnmi;
mod keepalive;
mod nexthop;
mod route;
mod state;
pub use ack::*;
pub use builder::*;
pub(crate) use keepalive::*;
pub use nexthop::*;
pub use route::*;


use std::collections::HashSet;
use std::fmt::Debug;
use std::sync::Arc;
use std::sync::OnceLock;

use parking_lot::Mutex;
use parking_lot::RwLock;
use tokio::signal::unix::signal;
use tokio::signal::unix::SignalKind;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use tracing::error;
use tracing::info;
use tracing::Instrument;
use tracing::Span;

use crate::commit::CommitMode;
use crate::commit::ConfigCommitTracker;
use crate::network::ConfigQuery;
use crate::network::GnmiConfigQuery;
use crate::network::GrpcNdkApi;
use crate::network::NdkApi;
use crate::proto::ndk::AgentRegistrationRequest;
use crate::proto::ndk::ConfigNotification;
use crate::proto::SdkMgrResponse;
use crate::stream::NotificationPump;
use crate::stream::StreamRegistry;
use crate::stream::TopicPayload;
use crate::AgentConfig;
use crate::ConfigDelta;
use crate::Error;
use crate::FullConfig;
use crate::Result;

/// Consumer side of the config topic, returned by [`Agent::start`].
///
/// Only one of the two queues carries data, depending on whether the agent
/// was built with [`AgentBuilder::with_stream_config`].
#[derive(Debug)]
pub struct ConfigFeed {
    /// One snapshot per completed commit (aggregate mode)
    pub full_config: mpsc::UnboundedReceiver<FullConfig>,
    /// Every config notification (streaming mode)
    pub deltas: mpsc::UnboundedReceiver<ConfigDelta>,
}

/// Handle to an agent session. Cheap to clone.
#[derive(Clone)]
pub struct Agent {
    inner: Arc<AgentInner>,
}

struct AgentInner {
    name: String,
    app_root_path: String,
    options: AgentOptions,
    settings: AgentConfig,
    cancel: CancellationToken,
    span: Span,

    api: OnceLock<Arc<dyn NdkApi>>,
    query: OnceLock<Arc<dyn ConfigQuery>>,
    app_id: OnceLock<u32>,

    /// XPaths whose state was pushed with `update_state`
    paths: Mutex<HashSet<String>>,
    full_config: Arc<RwLock<Option<String>>>,
}

impl Agent {
    pub(crate) fn new(
        name: String,
        options: AgentOptions,
        settings: AgentConfig,
        cancel: CancellationToken,
        span: Span,
    ) -> Self {
        let app_root_path = options
            .app_root_path
            .clone()
            .unwrap_or_else(|| format!("/{}", name));

        Self {
            inner: Arc::new(AgentInner {
                name,
                app_root_path,
                options,
                settings,
                cancel,
                span,
                api: OnceLock::new(),
                query: OnceLock::new(),
                app_id: OnceLock::new(),
                paths: Mutex::new(HashSet::new()),
                full_config: Arc::new(RwLock::new(None)),
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Identifier assigned by the daemon at registration.
    pub fn app_id(&self) -> Option<u32> {
        self.inner.app_id.get().copied()
    }

    pub fn app_root_path(&self) -> &str {
        &self.inner.app_root_path
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.inner.cancel.clone()
    }

    /// Latest full configuration snapshot (aggregate mode).
    pub fn full_config(&self) -> Option<String> {
        self.inner.full_config.read().clone()
    }

    /// Connects to the daemon, registers and starts the config stream.
    ///
    /// Setup failures are logged and returned as [`Error::Fatal`].
    pub async fn start(&self) -> Result<ConfigFeed> {
        let settings = &self.inner.settings;

        let api = match GrpcNdkApi::connect(&self.inner.name, &settings.ndk).await {
            Ok(api) => api,
            Err(e) => {
                error!(address = %settings.ndk.address, "connecting to NDK failed: {}", e);
                return Err(Error::Fatal(format!("connecting to NDK failed: {}", e)));
            }
        };
        info!(address = %settings.ndk.address, "connected to NDK");

        let query = match GnmiConfigQuery::connect_lazy(&settings.gnmi) {
            Ok(query) => query,
            Err(e) => {
                error!("gNMI client creation failed: {}", e);
                return Err(Error::Fatal(format!("gNMI client creation failed: {}", e)));
            }
        };

        self.start_with(Arc::new(api), Arc::new(query), true).await
    }

    pub(crate) async fn start_with(
        &self,
        api: Arc<dyn NdkApi>,
        query: Arc<dyn ConfigQuery>,
        handle_signals: bool,
    ) -> Result<ConfigFeed> {
        if self.inner.api.set(api.clone()).is_err() {
            return Err(Error::Fatal("agent is already started".to_string()));
        }

        let _ = self.inner.query.set(query.clone());

        let app_id = self.register(api.as_ref()).await?;
        let _ = self.inner.app_id.set(app_id);

        if handle_signals {
            self.spawn_exit_handler();
        }

        if let Some(keepalive) = self.inner.options.keepalive.filter(KeepAlive::is_set) {
            let task = run_keepalive(
                api.clone(),
                keepalive,
                self.inner.settings.retry.interval(),
                self.inner.cancel.clone(),
            );
            tokio::spawn(
                async move {
                    task.await;
                }
                .instrument(self.inner.span.clone()),
            );
        }

        Ok(self.spawn_config_stream(api, query))
    }

    /// Unregisters from the daemon and cancels every session task.
    ///
    /// Unregistration failures are logged only.
    pub async fn stop(&self) {
        info!(agent = %self.inner.name, "application has stopped and will exit gracefully");

        if let Some(api) = self.inner.api.get() {
            match api.agent_unregister().await {
                Ok(resp) if resp.is_success() => {
                    info!(app_id = resp.app_id, agent = %self.inner.name, "application unregistered successfully");
                }
                Ok(resp) => {
                    error!(status = resp.status, "agent unregistration failed: {}", resp.error_str);
                }
                Err(e) => {
                    error!("agent unregistration failed: {}", e);
                }
            }
        }

        self.inner.cancel.cancel();
    }

    /// Starts a notification stream for `T`'s topic and returns its queue.
    ///
    /// Stream creation and subscription happen in the background, so this
    /// returns immediately. The queue closes when the session stops.
    pub fn receive_notifications<T: TopicPayload>(&self) -> Result<mpsc::UnboundedReceiver<T>> {
        let registry = self.registry()?;
        let (tx, rx) = mpsc::unbounded_channel();

        tokio::spawn(
            async move {
                match NotificationPump::open(registry, tx).await {
                    Ok(pump) => pump.run().await,
                    Err(e) => debug!(topic = %T::TOPIC, "notification stream not started: {}", e),
                }
            }
            .instrument(self.inner.span.clone()),
        );

        Ok(rx)
    }

    async fn register(
        &self,
        api: &dyn NdkApi,
    ) -> Result<u32> {
        let options = &self.inner.options;
        let req = AgentRegistrationRequest {
            wait_config_ack: options.config_ack,
            auto_telemetry_state: options.auto_config_state,
            enable_cache: options.cache,
        };

        match api.agent_register(req).await {
            Ok(resp) if resp.is_success() => {
                info!(app_id = resp.app_id, agent = %self.inner.name, "application registered successfully");
                Ok(resp.app_id)
            }
            Ok(resp) => {
                error!(status = resp.status, "agent registration failed: {}", resp.error_str);
                Err(Error::Fatal(format!("agent registration failed: {}", resp.error_str)))
            }
            Err(e) => {
                error!("agent registration failed: {}", e);
                Err(Error::Fatal(format!("agent registration failed: {}", e)))
            }
        }
    }

    fn spawn_exit_handler(&self) {
        let agent = self.clone();
        tokio::spawn(
            async move {
                if wait_for_shutdown_signal(&agent.inner.cancel).await {
                    agent.stop().await;
                }
            }
            .instrument(self.inner.span.clone()),
        );
    }

    fn spawn_config_stream(
        &self,
        api: Arc<dyn NdkApi>,
        query: Arc<dyn ConfigQuery>,
    ) -> ConfigFeed {
        let inner = &self.inner;
        let mode = if inner.options.stream_config {
            CommitMode::Streaming
        } else {
            CommitMode::Aggregate
        };

        let registry = StreamRegistry::new(api, inner.settings.retry.interval(), inner.cancel.clone());
        let (full_tx, full_rx) = mpsc::unbounded_channel();
        let (delta_tx, delta_rx) = mpsc::unbounded_channel();
        let tracker = ConfigCommitTracker::new(
            mode,
            inner.app_root_path.clone(),
            query,
            inner.full_config.clone(),
            full_tx,
            delta_tx,
            inner.cancel.clone(),
        );

        let span = inner.span.clone();
        tokio::spawn(
            async move {
                let (tx, rx) = mpsc::unbounded_channel::<ConfigNotification>();
                match NotificationPump::open(registry, tx).await {
                    Ok(pump) => {
                        tokio::spawn(pump.run().instrument(Span::current()));
                        tracker.run(rx).await;
                    }
                    Err(e) => debug!("config notification stream not started: {}", e),
                }
            }
            .instrument(span),
        );

        ConfigFeed {
            full_config: full_rx,
            deltas: delta_rx,
        }
    }

    fn api(&self) -> Result<&Arc<dyn NdkApi>> {
        self.inner.api.get().ok_or(Error::NotStarted)
    }

    fn query(&self) -> Result<&Arc<dyn ConfigQuery>> {
        self.inner.query.get().ok_or(Error::NotStarted)
    }

    fn registry(&self) -> Result<StreamRegistry> {
        Ok(StreamRegistry::new(
            self.api()?.clone(),
            self.inner.settings.retry.interval(),
            self.inner.cancel.clone(),
        ))
    }

    #[cfg(test)]
    pub(crate) fn with_api(
        self,
        api: Arc<dyn NdkApi>,
    ) -> Self {
        let _ = self.inner.api.set(api);
        self
    }

    #[cfg(test)]
    pub(crate) fn with_query(
        self,
        query: Arc<dyn ConfigQuery>,
    ) -> Self {
        let _ = self.inner.query.set(query);
        self
    }

    #[cfg(test)]
    pub(crate) fn tracked_paths(&self) -> HashSet<String> {
        self.inner.paths.lock().clone()
    }
}

/// Logs a failed daemon call.
///
/// Returns `true` only for an answered call with a success status.
pub(crate) fn succeeded<R: SdkMgrResponse + Debug>(
    what: &str,
    outcome: &Result<R>,
) -> bool {
    match outcome {
        Ok(resp) if resp.is_success() => {
            debug!("{} succeeded, response: {:?}", what, resp);
            true
        }
        Ok(resp) => {
            error!("failed to {}, response: {:?}", what, resp);
            false
        }
        Err(e) => {
            error!("failed to {}: {}", what, e);
            false
        }
    }
}

/// Waits for SIGINT, SIGTERM or Ctrl+C.
///
/// Returns `false` when the session was cancelled first.
async fn wait_for_shutdown_signal(cancel: &CancellationToken) -> bool {
    let (mut sigint, mut sigterm) = match (signal(SignalKind::interrupt()), signal(SignalKind::terminate())) {
        (Ok(sigint), Ok(sigterm)) => (sigint, sigterm),
        (Err(e), _) | (_, Err(e)) => {
            error!("failed to install signal handlers: {}", e);
            return false;
        }
    };

    tokio::select! {
        _ = sigint.recv() => {
            info!("SIGINT detected.");
        },
        _ = sigterm.recv() => {
            info!("SIGTERM detected.");
        },
        _ = tokio::signal::ctrl_c() => {
            info!("Ctrl+C detected.");
        },
        _ = cancel.cancelled() => {
            return false;
        },
    }
    true
}
