use config::ConfigError;
use serde::Deserialize;
use serde::Serialize;

use crate::Error;
use crate::Result;

/// Connection parameters for the gNMI server used to read the full
/// application configuration after a commit.
#[derive(Serialize, Deserialize, Clone)]
pub struct GnmiConfig {
    /// gRPC endpoint of the gNMI server
    #[serde(default = "default_gnmi_address")]
    pub address: String,

    #[serde(default = "default_username")]
    pub username: String,

    #[serde(default = "default_password")]
    pub password: String,

    /// TCP connect timeout in milliseconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_in_ms: u64,

    /// Get request timeout in milliseconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_in_ms: u64,
}

impl std::fmt::Debug for GnmiConfig {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("GnmiConfig")
            .field("address", &self.address)
            .field("username", &self.username)
            .field("connect_timeout_in_ms", &self.connect_timeout_in_ms)
            .field("request_timeout_in_ms", &self.request_timeout_in_ms)
            .finish()
    }
}

impl Default for GnmiConfig {
    fn default() -> Self {
        Self {
            address: default_gnmi_address(),
            username: default_username(),
            password: default_password(),
            connect_timeout_in_ms: default_connect_timeout(),
            request_timeout_in_ms: default_request_timeout(),
        }
    }
}

impl GnmiConfig {
    pub fn validate(&self) -> Result<()> {
        if self.address.trim().is_empty() {
            return Err(Error::Config(ConfigError::Message(
                "gnmi address cannot be empty".to_string(),
            )));
        }

        if self.connect_timeout_in_ms == 0 || self.request_timeout_in_ms == 0 {
            return Err(Error::Config(ConfigError::Message(
                "gnmi timeouts must be > 0".to_string(),
            )));
        }

        if self.request_timeout_in_ms <= self.connect_timeout_in_ms {
            return Err(Error::Config(ConfigError::Message(format!(
                "gnmi request timeout {}ms must exceed connect timeout {}ms",
                self.request_timeout_in_ms, self.connect_timeout_in_ms
            ))));
        }

        Ok(())
    }
}

fn default_gnmi_address() -> String {
    "http://127.0.0.1:57400".to_string()
}
fn default_username() -> String {
    "admin".to_string()
}
fn default_password() -> String {
    "NokiaSrl1!".to_string()
}
fn default_connect_timeout() -> u64 {
    2000
}
fn default_request_timeout() -> u64 {
    10000
}
