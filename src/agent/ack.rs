use tracing::error;
use tracing::info;

use super::succeeded;
use super::Agent;
use crate::path::to_internal;
use crate::proto::ndk::acknowledge_config_request_info::Outcome;
use crate::proto::ndk::AcknowledgeConfigRequest;
use crate::proto::ndk::AcknowledgeConfigRequestInfo;
use crate::AckError;
use crate::Result;

/// Message shown next to a path in the CLI during the commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AckOutcome {
    Output(String),
    Warning(String),
    /// Rejects the whole commit; the daemon rolls back to the previous
    /// running configuration.
    Error(String),
}

/// Acknowledgement of one config node.
///
/// `path` is an XPath to a container, leaf, leaf-list or list of the
/// application's schema. Leaf-list and list entries take either a concrete
/// key or `*`, e.g. `/greeter/list-node[name=*]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Acknowledgement {
    pub path: String,
    pub outcome: AckOutcome,
}

impl Acknowledgement {
    pub fn output(
        path: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            outcome: AckOutcome::Output(message.into()),
        }
    }

    pub fn warning(
        path: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            outcome: AckOutcome::Warning(message.into()),
        }
    }

    pub fn error(
        path: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            outcome: AckOutcome::Error(message.into()),
        }
    }
}

impl From<Acknowledgement> for AcknowledgeConfigRequestInfo {
    fn from(ack: Acknowledgement) -> Self {
        let outcome = match ack.outcome {
            AckOutcome::Output(m) => Outcome::Output(m),
            AckOutcome::Warning(m) => Outcome::Warning(m),
            AckOutcome::Error(m) => Outcome::Error(m),
        };
        Self {
            js_path_with_keys: to_internal(&ack.path),
            outcome: Some(outcome),
        }
    }
}

impl Agent {
    /// Acknowledges the configs of one commit.
    ///
    /// Call once per `.commit.end`; the daemon ignores later calls for the
    /// same commit. An empty `acks` is a valid acknowledgement without data.
    pub async fn acknowledge_config(
        &self,
        acks: Vec<Acknowledgement>,
    ) -> Result<()> {
        let options = &self.inner.options;
        if !options.config_ack {
            error!("cannot acknowledge config unless config acknowledge is enabled");
            return Err(AckError::OptionNotSet.into());
        }
        if !options.stream_config {
            error!("cannot acknowledge config unless config streaming is enabled");
            return Err(AckError::NotStreaming.into());
        }

        let req = AcknowledgeConfigRequest {
            infos: acks.into_iter().map(Into::into).collect(),
        };
        info!("acknowledging config: {:?}", req);

        let outcome = self.api()?.acknowledge_config(req).await;
        if !succeeded("acknowledge config", &outcome) {
            return Err(AckError::Failed.into());
        }
        Ok(())
    }
}
