//! A builder for constructing an [`Agent`] session.
//!
//! [`AgentBuilder`] collects the agent's options, then validates every
//! option and the final combination in one pass. Incompatible combinations
//! are all reported together instead of failing on the first one.
//!
//! ## Example
//! ```ignore
//! let agent = AgentBuilder::new("greeter")
//!     .with_stream_config()
//!     .with_config_acknowledge()
//!     .with_keepalive(Duration::from_secs(10), 3)
//!     .build()
//!     .map_err(|errs| eprintln!("invalid options: {:?}", errs))?;
//! let feed = agent.start().await?;
//! ```

use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::Span;

use super::Agent;
use crate::AgentConfig;
use crate::OptionError;

/// Liveness probing settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeepAlive {
    pub interval: Duration,
    /// Consecutive failed statuses after which probing stops for good
    pub threshold: u32,
}

impl KeepAlive {
    /// Probing only runs when both the interval and the threshold are set.
    pub fn is_set(&self) -> bool {
        !self.interval.is_zero() && self.threshold != 0
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct AgentOptions {
    pub(crate) app_root_path: Option<String>,
    pub(crate) stream_config: bool,
    pub(crate) config_ack: bool,
    pub(crate) keepalive: Option<KeepAlive>,
    pub(crate) auto_config_state: bool,
    pub(crate) cache: bool,
}

impl AgentOptions {
    fn validate(&self) -> Vec<OptionError> {
        let mut errors = Vec::new();
        if self.config_ack && !self.stream_config {
            errors.push(OptionError::AckWithoutStream);
        }
        if self.config_ack && self.auto_config_state {
            errors.push(OptionError::AckWithAutoState);
        }
        errors
    }
}

pub struct AgentBuilder {
    name: String,
    options: AgentOptions,
    settings: Option<AgentConfig>,
    cancel: Option<CancellationToken>,
    span: Option<Span>,
    errors: Vec<OptionError>,
}

impl AgentBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            options: AgentOptions::default(),
            settings: None,
            cancel: None,
            span: None,
            errors: Vec::new(),
        }
    }

    /// Parent span for every task the session spawns.
    pub fn with_span(
        mut self,
        span: Span,
    ) -> Self {
        self.span = Some(span);
        self
    }

    /// Token the session cancels on shutdown; cancelling it from outside
    /// stops every session task.
    pub fn with_cancellation(
        mut self,
        cancel: CancellationToken,
    ) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// XPath of the application's root container. Defaults to `/<name>`.
    pub fn with_app_root_path(
        mut self,
        path: impl Into<String>,
    ) -> Self {
        self.options.app_root_path = Some(path.into());
        self
    }

    /// Streams every config notification as a [`crate::ConfigDelta`]
    /// instead of delivering one full snapshot per commit.
    pub fn with_stream_config(mut self) -> Self {
        self.options.stream_config = true;
        self
    }

    /// Makes the daemon wait for [`Agent::acknowledge_config`] before
    /// completing a commit.
    pub fn with_config_acknowledge(mut self) -> Self {
        self.options.config_ack = true;
        self
    }

    /// Sends a liveness probe every `interval` until the daemon reported
    /// `threshold` consecutive failures.
    pub fn with_keepalive(
        mut self,
        interval: Duration,
        threshold: u32,
    ) -> Self {
        if interval.is_zero() && threshold == 0 {
            self.errors.push(OptionError::InvalidKeepAlive);
            return self;
        }
        self.options.keepalive = Some(KeepAlive { interval, threshold });
        self
    }

    /// Lets the daemon mirror the application's configuration as state.
    pub fn with_auto_config_state(mut self) -> Self {
        self.options.auto_config_state = true;
        self
    }

    /// Enables daemon-side caching of notifications.
    pub fn with_cache(mut self) -> Self {
        self.options.cache = true;
        self
    }

    /// Connection and retry settings. Defaults to [`AgentConfig::default`].
    pub fn with_settings(
        mut self,
        settings: AgentConfig,
    ) -> Self {
        self.settings = Some(settings);
        self
    }

    pub fn build(self) -> std::result::Result<Agent, Vec<OptionError>> {
        let mut errors = Vec::new();
        if self.name.is_empty() {
            errors.push(OptionError::EmptyName);
        }
        errors.extend(self.errors);
        errors.extend(self.options.validate());
        if !errors.is_empty() {
            return Err(errors);
        }

        let span = self
            .span
            .unwrap_or_else(|| tracing::info_span!("agent", agent = %self.name));

        Ok(Agent::new(
            self.name,
            self.options,
            self.settings.unwrap_or_default(),
            self.cancel.unwrap_or_default(),
            span,
        ))
    }
}
