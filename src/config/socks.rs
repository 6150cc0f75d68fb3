//! SOCKS handler configuration types
//!
//! Tunables for the handshake, name resolution, and outbound sockets.

use crate::socks::{DEFAULT_READ_BUFFER_SIZE, MAX_REQUEST_LEN};
use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::time::Duration;

fn default_enable_socks4() -> bool {
    true
}

/// Default resolution deadline in seconds
fn default_resolve_timeout() -> u64 {
    10
}

/// Default connect timeout in seconds
fn default_connect_timeout() -> u64 {
    10
}

fn default_read_buffer_size() -> usize {
    DEFAULT_READ_BUFFER_SIZE
}

/// SOCKS handler configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SocksConfig {
    /// Accept legacy SOCKS4 clients
    #[serde(default = "default_enable_socks4")]
    pub enable_socks4: bool,

    /// Deadline for host-name resolution in seconds
    #[serde(default = "default_resolve_timeout")]
    pub resolve_timeout: u64,

    /// Deadline for dialing the destination in seconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout: u64,

    /// Local address outbound connections bind to
    #[serde(default)]
    pub outbound_bind: Option<IpAddr>,

    /// Size of each single handshake read
    #[serde(default = "default_read_buffer_size")]
    pub read_buffer_size: usize,

    /// Socket options for accepted and dialed connections
    #[serde(default)]
    pub tcp: TcpConfig,
}

impl Default for SocksConfig {
    fn default() -> Self {
        Self {
            enable_socks4: default_enable_socks4(),
            resolve_timeout: default_resolve_timeout(),
            connect_timeout: default_connect_timeout(),
            outbound_bind: None,
            read_buffer_size: default_read_buffer_size(),
            tcp: TcpConfig::default(),
        }
    }
}

impl SocksConfig {
    /// Resolution deadline as a [`Duration`]
    pub fn resolve_timeout(&self) -> Duration {
        Duration::from_secs(self.resolve_timeout)
    }

    /// Dial deadline as a [`Duration`]
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        // A single read must be able to hold any request
        if self.read_buffer_size < MAX_REQUEST_LEN {
            return Err(format!(
                "read_buffer_size must be at least {} bytes",
                MAX_REQUEST_LEN
            ));
        }
        if self.resolve_timeout == 0 {
            return Err("resolve_timeout must be greater than zero".to_string());
        }
        if self.connect_timeout == 0 {
            return Err("connect_timeout must be greater than zero".to_string());
        }
        Ok(())
    }
}

fn default_nodelay() -> bool {
    true
}

/// Default keepalive seconds
fn default_keepalive_secs() -> u64 {
    20
}

/// Default keepalive interval
fn default_keepalive_interval() -> u64 {
    8
}

/// TCP socket configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TcpConfig {
    /// Enable TCP_NODELAY
    #[serde(default = "default_nodelay")]
    pub nodelay: bool,

    /// TCP keepalive timeout in seconds
    #[serde(default = "default_keepalive_secs")]
    pub keepalive_secs: u64,

    /// TCP keepalive interval in seconds
    #[serde(default = "default_keepalive_interval")]
    pub keepalive_interval: u64,
}

impl Default for TcpConfig {
    fn default() -> Self {
        TcpConfig {
            nodelay: default_nodelay(),
            keepalive_secs: default_keepalive_secs(),
            keepalive_interval: default_keepalive_interval(),
        }
    }
}
