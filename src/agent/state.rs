//! Operational state pushed by the application.
//!
//! Every path passed to `update_state` is remembered. A delete is only sent
//! for a remembered path.

use tracing::info;

use super::succeeded;
use super::Agent;
use crate::path::is_descendant_or_self;
use crate::path::to_internal;
use crate::proto::ndk::TelemetryData;
use crate::proto::ndk::TelemetryDeleteRequest;
use crate::proto::ndk::TelemetryInfo;
use crate::proto::ndk::TelemetryKey;
use crate::proto::ndk::TelemetryUpdateRequest;
use crate::Result;
use crate::StateError;

impl Agent {
    /// Adds or replaces the state of a container or list entry.
    ///
    /// `path` is an XPath such as `/greeter` or
    /// `/greeter/list-node[name=entry1]`; an empty path targets the
    /// application root container. `json` holds the node's leaf and
    /// leaf-list values.
    pub async fn update_state(
        &self,
        path: &str,
        json: &str,
    ) -> Result<()> {
        let path = self.state_path(path);
        let js_path = to_internal(&path);
        info!(%path, data = %json, "updating state");

        let req = TelemetryUpdateRequest {
            state: vec![TelemetryInfo {
                key: Some(TelemetryKey { js_path: js_path.clone() }),
                data: Some(TelemetryData {
                    json_content: json.to_string(),
                }),
            }],
        };

        let outcome = self.api()?.telemetry_add_or_update(req).await;
        if !succeeded("add or update state", &outcome) {
            return Err(StateError::AddOrUpdate {
                js_path,
                data: json.to_string(),
            }
            .into());
        }

        self.inner.paths.lock().insert(path);
        Ok(())
    }

    /// Deletes the state previously added for `path`.
    ///
    /// Deleting the application root removes every tracked path below it
    /// as well, since the daemon drops the whole subtree.
    pub async fn delete_state(
        &self,
        path: &str,
    ) -> Result<()> {
        let path = self.state_path(path);
        info!(%path, "deleting state");

        if !self.inner.paths.lock().contains(&path) {
            return Err(StateError::NotTracked(path).into());
        }

        let js_path = to_internal(&path);
        let req = TelemetryDeleteRequest {
            key: vec![TelemetryKey { js_path: js_path.clone() }],
        };

        let outcome = self.api()?.telemetry_delete(req).await;
        if !succeeded("delete state", &outcome) {
            return Err(StateError::Delete(js_path).into());
        }

        let mut paths = self.inner.paths.lock();
        if path == self.inner.app_root_path {
            paths.retain(|p| !is_descendant_or_self(p, &path));
        } else {
            paths.remove(&path);
        }
        Ok(())
    }

    /// Deletes every state added with [`Agent::update_state`].
    ///
    /// Stops at the first failed delete; paths not yet deleted stay tracked.
    pub async fn delete_all_state(&self) -> Result<()> {
        let mut pending: Vec<String> = self.inner.paths.lock().iter().cloned().collect();
        pending.sort();

        for path in pending {
            // an earlier root delete may have dropped it already
            if !self.inner.paths.lock().contains(&path) {
                continue;
            }
            self.delete_state(&path).await?;
        }

        self.inner.paths.lock().clear();
        Ok(())
    }

    fn state_path(
        &self,
        path: &str,
    ) -> String {
        if path.is_empty() {
            self.inner.app_root_path.clone()
        } else {
            path.to_string()
        }
    }
}
