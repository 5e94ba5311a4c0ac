use std::time::Duration;

use config::ConfigError;
use serde::Deserialize;
use serde::Serialize;

use crate::Error;
use crate::Result;

/// Fixed-delay retry policy.
///
/// Stream creation, notification stream reconnects and keepalive probes are
/// retried forever with this delay; only cancellation stops them.
#[derive(Debug, Serialize, Deserialize, Clone, Copy)]
pub struct RetryPolicy {
    /// Delay between attempts (unit: milliseconds)
    #[serde(default = "default_interval_in_ms")]
    pub interval_in_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            interval_in_ms: default_interval_in_ms(),
        }
    }
}

impl RetryPolicy {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_in_ms)
    }

    pub fn validate(&self) -> Result<()> {
        if self.interval_in_ms == 0 {
            return Err(Error::Config(ConfigError::Message(
                "retry interval must be > 0".to_string(),
            )));
        }
        Ok(())
    }
}

fn default_interval_in_ms() -> u64 {
    5000
}
