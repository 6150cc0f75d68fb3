//! Server configuration types
//!
//! Defines the root configuration and the listener settings.

use super::SocksConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default listen address
fn default_listen_addr() -> String {
    "0.0.0.0:1080".to_string()
}

/// Default shutdown grace period in seconds
fn default_shutdown_grace_secs() -> u64 {
    5
}

/// Root configuration structure
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Config {
    /// Listener configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// SOCKS handler configuration
    #[serde(default)]
    pub socks: SocksConfig,
}

impl Config {
    /// Validate the whole configuration
    pub fn validate(&self) -> Result<(), String> {
        self.server.validate()?;
        self.socks.validate()
    }
}

/// Listener configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ServerConfig {
    /// Address to accept SOCKS clients on (e.g., "0.0.0.0:1080")
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// How long shutdown waits for live sessions, in seconds
    #[serde(default = "default_shutdown_grace_secs")]
    pub shutdown_grace_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            listen_addr: default_listen_addr(),
            shutdown_grace_secs: default_shutdown_grace_secs(),
        }
    }
}

impl ServerConfig {
    /// Shutdown grace period as a [`Duration`]
    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_secs(self.shutdown_grace_secs)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.listen_addr.trim().is_empty() {
            return Err("listen_addr must not be empty".to_string());
        }
        Ok(())
    }
}
