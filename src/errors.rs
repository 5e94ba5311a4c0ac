//! NDK Agent Error Hierarchy
//!
//! Errors are grouped by the surface they come from: transport and daemon
//! status failures, option validation, and the application-facing operations
//! (state, routes, next hop groups, config acknowledgement).

use config::ConfigError;

#[doc(hidden)]
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Settings loading or validation failures
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Transport failures and non-success daemon statuses
    #[error(transparent)]
    Network(#[from] NetworkError),

    /// Operational state mutation failures
    #[error(transparent)]
    State(#[from] StateError),

    /// IP route programming failures
    #[error(transparent)]
    Route(#[from] RouteError),

    /// Next hop group programming failures
    #[error(transparent)]
    NextHopGroup(#[from] NextHopGroupError),

    /// Config acknowledgement failures
    #[error(transparent)]
    Ack(#[from] AckError),

    /// Notification subscription failures
    #[error(transparent)]
    Subscription(#[from] SubscriptionError),

    /// The session cancellation token fired before the operation finished
    #[error("Operation cancelled")]
    Cancelled,

    /// Called an operation that needs a connected session
    #[error("Agent is not started")]
    NotStarted,

    /// Unrecoverable setup failures (connect, register, unregister)
    #[error("Fatal error: {0}")]
    Fatal(String),
}

#[derive(Debug, thiserror::Error)]
pub enum NetworkError {
    /// Malformed daemon or query service address
    #[error("Invalid URI format: {0}")]
    InvalidURI(String),

    /// gRPC transport layer errors
    #[error(transparent)]
    TonicError(#[from] Box<tonic::transport::Error>),

    /// gRPC status code errors
    #[error(transparent)]
    TonicStatusError(#[from] Box<tonic::Status>),

    /// The daemon answered but reported a failed status
    #[error("{rpc} returned failed status: {error_str}")]
    StatusFailed { rpc: &'static str, error_str: String },

    /// Metadata value could not be encoded as an ASCII header
    #[error("Invalid metadata value for {0}")]
    InvalidMetadata(&'static str),

    /// gNMI update or replace built without a value
    #[error("value to set request cannot be empty")]
    EmptyGnmiValue,
}

impl From<tonic::Status> for NetworkError {
    fn from(status: tonic::Status) -> Self {
        NetworkError::TonicStatusError(Box::new(status))
    }
}

impl From<tonic::transport::Error> for NetworkError {
    fn from(e: tonic::transport::Error) -> Self {
        NetworkError::TonicError(Box::new(e))
    }
}

impl From<tonic::Status> for Error {
    fn from(status: tonic::Status) -> Self {
        Error::Network(status.into())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("state add/update failed: key: {js_path}, data: {data}")]
    AddOrUpdate { js_path: String, data: String },

    #[error("state delete failed: path: {0}")]
    Delete(String),

    /// Delete requested for a path whose state was never added
    #[error("state delete failed: path {0} has never been added")]
    NotTracked(String),
}

#[derive(Debug, thiserror::Error)]
pub enum RouteError {
    #[error("invalid ip prefix provided: {0}")]
    InvalidPrefix(String),

    #[error("route add or update failed")]
    AddOrUpdate,

    #[error("route delete failed")]
    Delete,

    #[error("route sync start failed")]
    SyncStart,

    #[error("route sync end failed")]
    SyncEnd,
}

#[derive(Debug, thiserror::Error)]
pub enum NextHopGroupError {
    #[error("invalid next hop address provided: {0}")]
    InvalidAddress(String),

    #[error("nexthop group add or update failed")]
    AddOrUpdate,

    #[error("nexthop group delete failed")]
    Delete,

    #[error("nexthop group sync start failed")]
    SyncStart,

    #[error("nexthop group sync end failed")]
    SyncEnd,
}

#[derive(Debug, thiserror::Error)]
pub enum AckError {
    #[error("acknowledge config failed")]
    Failed,

    #[error("agent is not registered with config acknowledge option")]
    OptionNotSet,

    #[error("agent cannot acknowledge configs unless it enables config stream")]
    NotStreaming,
}

#[derive(Debug, thiserror::Error)]
pub enum SubscriptionError {
    #[error("failed adding {topic} subscription to stream {stream_id}: {reason}")]
    AddFailed {
        topic: &'static str,
        stream_id: u64,
        reason: String,
    },
}

/// Agent option validation errors.
///
/// Collected together by [`crate::AgentBuilder::build`] so that every
/// incompatible combination is reported at once.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OptionError {
    #[error("agent name cannot be empty")]
    EmptyName,

    #[error("configuring agent keepalives failed. interval and threshold cannot both be zero")]
    InvalidKeepAlive,

    #[error("agent cannot acknowledge configs unless it enables config stream")]
    AckWithoutStream,

    #[error("agent cannot acknowledge configs when auto config state is enabled")]
    AckWithAutoState,
}
