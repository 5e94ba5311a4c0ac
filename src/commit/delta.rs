use serde::Deserialize;
use tracing::error;

use crate::path::to_external;
use crate::path::COMMIT_END_JS_PATH;
use crate::proto::ndk::ConfigNotification;
use crate::proto::ndk::SdkMgrOperation;

/// Kind of change a config notification describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigOperation {
    Create,
    Update,
    Delete,
    CreateOrUpdate,
}

impl From<SdkMgrOperation> for ConfigOperation {
    fn from(op: SdkMgrOperation) -> Self {
        match op {
            SdkMgrOperation::Create => ConfigOperation::Create,
            SdkMgrOperation::Update => ConfigOperation::Update,
            SdkMgrOperation::Delete => ConfigOperation::Delete,
            SdkMgrOperation::CreateOrUpdate => ConfigOperation::CreateOrUpdate,
        }
    }
}

/// One streamed configuration change, with paths in XPath notation.
///
/// Targets are the application's root container or one of its list entries,
/// e.g. `/greeter` or `/greeter/list-node[name=entry1]`. The commit marker
/// keeps its daemon path `.commit.end`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigDelta {
    pub op: ConfigOperation,
    /// Target path including list keys
    pub path: String,
    /// Target path with list keys stripped, e.g. `/greeter/list-node`
    pub path_without_keys: String,
    /// List key values, only present for list entries
    pub keys: Vec<String>,
    /// Leaf, leaf-list and child container configuration of the target
    pub json: String,
}

impl ConfigDelta {
    pub fn is_commit_end(&self) -> bool {
        self.path == COMMIT_END_JS_PATH
    }
}

impl From<ConfigNotification> for ConfigDelta {
    fn from(n: ConfigNotification) -> Self {
        let op = ConfigOperation::from(n.op());
        let key = n.key.unwrap_or_default();
        let json = n.data.map(|d| d.json).unwrap_or_default();

        let (path, path_without_keys) = if key.js_path_with_keys == COMMIT_END_JS_PATH {
            (key.js_path_with_keys, key.js_path)
        } else {
            (to_external(&key.js_path_with_keys), to_external(&key.js_path))
        };

        Self {
            op,
            path,
            path_without_keys,
            keys: key.keys,
            json,
        }
    }
}

/// A full configuration snapshot, read after a commit completed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FullConfig {
    /// Sequence number of the commit that produced this snapshot. `None` when
    /// the marker's sequence could not be parsed.
    pub commit_seq: Option<u64>,
    /// JSON-IETF encoded configuration. `None` when the application has no
    /// configuration left.
    pub json: Option<String>,
}

#[derive(Deserialize)]
struct CommitSeq {
    #[serde(default)]
    commit_seq: u64,
}

/// Reads the `commit_seq` field of a commit marker's data.
///
/// A missing field reads as `0`.
pub(crate) fn parse_commit_seq(json: &str) -> Result<u64, serde_json::Error> {
    serde_json::from_str::<CommitSeq>(json).map(|c| c.commit_seq)
}

/// A zero sequence marks the synthetic commit sent right after registration.
///
/// Unparsable data is reported as non-zero.
pub(crate) fn is_commit_seq_zero(json: &str) -> bool {
    match parse_commit_seq(json) {
        Ok(seq) => seq == 0,
        Err(e) => {
            error!("failed to unmarshal commit sequence: {}", e);
            false
        }
    }
}

/// True for `{}`. Anything that is not a JSON object, including unparsable
/// input, is reported as non-empty.
pub(crate) fn is_empty_object(json: &str) -> bool {
    match serde_json::from_str::<serde_json::Map<String, serde_json::Value>>(json) {
        Ok(obj) => obj.is_empty(),
        Err(e) => {
            error!("failed to unmarshal json: {}", e);
            false
        }
    }
}
