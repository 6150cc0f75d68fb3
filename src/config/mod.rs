//! Configuration module for Socksgate
//!
//! This module provides configuration types and parsing for the server.

mod server;
mod socks;

pub use server::{Config, ServerConfig};
pub use socks::{SocksConfig, TcpConfig};

use crate::error::ProxyError;
use anyhow::{Context, Result};
use std::path::Path;

/// Load configuration from a TOML file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let content = std::fs::read_to_string(path.as_ref())
        .map_err(ProxyError::Io)
        .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;

    parse_config(&content)
}

/// Parse and validate configuration from a TOML string
pub fn parse_config(content: &str) -> Result<Config> {
    let config: Config =
        toml::from_str(content).with_context(|| "Failed to parse configuration")?;
    config.validate().map_err(ProxyError::Config)?;
    Ok(config)
}
