use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use tracing::error;
use tracing::info;

use super::is_commit_seq_zero;
use super::is_empty_object;
use super::parse_commit_seq;
use super::ConfigDelta;
use super::FullConfig;
use crate::network::ConfigQuery;
use crate::path::COMMIT_END_JS_PATH;
use crate::proto::ndk::ConfigNotification;

/// How committed configuration reaches the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum CommitMode {
    /// One full snapshot per commit, read out-of-band after the marker.
    #[default]
    Aggregate,
    /// Every config notification is forwarded as a [`ConfigDelta`].
    Streaming,
}

/// Consumer of the config topic queue.
pub(crate) struct ConfigCommitTracker {
    mode: CommitMode,
    app_root_path: String,
    query: Arc<dyn ConfigQuery>,
    full_config: Arc<RwLock<Option<String>>>,
    full_tx: mpsc::UnboundedSender<FullConfig>,
    delta_tx: mpsc::UnboundedSender<ConfigDelta>,
    cancel: CancellationToken,
}

impl ConfigCommitTracker {
    pub(crate) fn new(
        mode: CommitMode,
        app_root_path: String,
        query: Arc<dyn ConfigQuery>,
        full_config: Arc<RwLock<Option<String>>>,
        full_tx: mpsc::UnboundedSender<FullConfig>,
        delta_tx: mpsc::UnboundedSender<ConfigDelta>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            mode,
            app_root_path,
            query,
            full_config,
            full_tx,
            delta_tx,
            cancel,
        }
    }

    /// Runs until the config queue closes or the session is cancelled.
    pub(crate) async fn run(
        self,
        mut rx: mpsc::UnboundedReceiver<ConfigNotification>,
    ) {
        info!(mode = ?self.mode, "config commit tracker started");
        loop {
            let notification = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => break,
                n = rx.recv() => match n {
                    Some(n) => n,
                    None => break,
                },
            };
            self.handle(notification).await;
        }
        info!("config commit tracker stopped");
    }

    pub(crate) async fn handle(
        &self,
        notification: ConfigNotification,
    ) {
        debug!("received config notification: {:?}", notification);

        let key = notification.key.as_ref();
        let is_commit_end = key.map(|k| k.js_path == COMMIT_END_JS_PATH).unwrap_or(false);
        let data = notification.data.as_ref().map(|d| d.json.as_str()).unwrap_or_default();

        match self.mode {
            CommitMode::Aggregate => {
                if is_commit_end && is_commit_seq_zero(data) {
                    debug!("ignoring commit end with zero sequence");
                } else if is_commit_end {
                    let commit_seq = parse_commit_seq(data).ok();
                    self.fetch_full_config(commit_seq).await;
                }
            }
            CommitMode::Streaming => {
                if self.delta_tx.send(ConfigDelta::from(notification)).is_err() {
                    debug!("config delta consumer dropped");
                }
            }
        }
    }

    async fn fetch_full_config(
        &self,
        commit_seq: Option<u64>,
    ) {
        info!(?commit_seq, path = %self.app_root_path, "commit completed, fetching full config");

        let json = match self.query.get_config(&self.app_root_path).await {
            Ok(Some(json)) if !is_empty_object(&json) => Some(json),
            Ok(_) => {
                info!(path = %self.app_root_path, "application has no configuration");
                None
            }
            Err(e) => {
                error!(path = %self.app_root_path, "failed to fetch full config: {}", e);
                return;
            }
        };

        *self.full_config.write() = json.clone();
        if self.full_tx.send(FullConfig { commit_seq, json }).is_err() {
            debug!("full config consumer dropped");
        }
    }
}
