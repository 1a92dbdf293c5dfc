//! Server configuration
//!
//! Settings are loaded from an optional `relay` config file and `RELAY_*`
//! environment variables, falling back to the defaults below.

use serde::Deserialize;
use std::time::Duration;

/// Relay server configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    pub host: String,
    pub port: u16,
    /// Seconds between liveness sweeps.
    pub sweep_interval_secs: u64,
    /// Seconds of silence after which a connection is evicted.
    pub liveness_timeout_secs: u64,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 9180,
            sweep_interval_secs: 30,
            liveness_timeout_secs: 60,
        }
    }
}

impl RelayConfig {
    /// Loads configuration from `relay.{toml,json,yaml}` in the working
    /// directory (if present) and `RELAY_*` environment variables.
    pub fn load() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::File::with_name("relay").required(false))
            .add_source(config::Environment::with_prefix("RELAY"))
            .build()?
            .try_deserialize()
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }

    pub fn liveness_timeout(&self) -> Duration {
        Duration::from_secs(self.liveness_timeout_secs)
    }
}
