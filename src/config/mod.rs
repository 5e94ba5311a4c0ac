//! Configuration management for an NDK agent.
//!
//! Provides hierarchical configuration loading and validation with:
//! - Default values as code base
//! - Configuration file named by `NDK_CONFIG_PATH`
//! - Environment variable overrides (`NDK__` prefix)
mod gnmi;
mod ndk;
mod retry;
pub use gnmi::*;
pub use ndk::*;
pub use retry::*;


use std::env;

use config::Config;
use config::Environment;
use config::File;
use serde::Deserialize;
use serde::Serialize;

use crate::Result;

/// Main configuration container for an agent session
///
/// Combines all subsystem configurations with hierarchical override support:
/// 1. Default values from code implementation
/// 2. Configuration file specified by `NDK_CONFIG_PATH`
/// 3. Environment variables (highest priority)
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct AgentConfig {
    /// NDK daemon connection parameters
    #[serde(default)]
    pub ndk: NdkConfig,
    /// Config query (gNMI) connection parameters
    #[serde(default)]
    pub gnmi: GnmiConfig,
    /// Reconnect and retry behaviour
    #[serde(default)]
    pub retry: RetryPolicy,
}

impl AgentConfig {
    /// Loads configuration from hierarchical sources without validation.
    ///
    /// # Examples
    /// ```ignore
    /// std::env::set_var("NDK_CONFIG_PATH", "/etc/opt/greeter/agent.toml");
    /// std::env::set_var("NDK__RETRY__INTERVAL_IN_MS", "1000");
    /// let cfg = AgentConfig::new()?.validate()?;
    /// ```
    pub fn new() -> Result<Self> {
        let mut builder = Config::builder().add_source(Config::try_from(&Self::default())?);

        if let Ok(config_path) = env::var("NDK_CONFIG_PATH") {
            builder = builder.add_source(File::with_name(&config_path).required(true));
        }

        builder = builder.add_source(
            Environment::with_prefix("NDK")
                .separator("__")
                .ignore_empty(true)
                .try_parsing(true),
        );

        let config: Self = builder.build()?.try_deserialize()?;
        Ok(config)
    }

    /// Applies additional configuration overrides from file without validation.
    pub fn with_override_config(
        &self,
        path: &str,
    ) -> Result<Self> {
        let config: Self = Config::builder()
            .add_source(Config::try_from(self)?)
            .add_source(File::with_name(path))
            .add_source(
                Environment::with_prefix("NDK")
                    .separator("__")
                    .ignore_empty(true)
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;
        Ok(config)
    }

    /// Validates configuration and returns validated instance.
    pub fn validate(self) -> Result<Self> {
        self.ndk.validate()?;
        self.gnmi.validate()?;
        self.retry.validate()?;
        Ok(self)
    }
}
