//! Outbound TCP dialer
//!
//! Opens the upstream side of a tunnel.

use super::SocketOpts;
use crate::config::SocksConfig;
use crate::error::ProxyError;
use anyhow::{Context, Result};
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;
use tokio::net::{TcpSocket, TcpStream};

/// Dialer for destination connections
///
/// A single attempt per call: no retries, no alternate addresses.
#[derive(Debug, Clone)]
pub struct Dialer {
    /// Socket options to apply to connections
    socket_opts: SocketOpts,
    /// Connection timeout
    connect_timeout: Duration,
    /// Local address outbound sockets bind to
    bind: Option<IpAddr>,
}

impl Dialer {
    /// Create a new dialer with default options
    pub fn with_defaults() -> Self {
        Dialer {
            socket_opts: SocketOpts::default(),
            connect_timeout: Duration::from_secs(10),
            bind: None,
        }
    }

    /// Create a dialer from the SOCKS configuration
    pub fn from_config(config: &SocksConfig) -> Self {
        Dialer {
            socket_opts: SocketOpts::from_tcp_config(&config.tcp),
            ..Self::with_defaults()
        }
        .with_connect_timeout(config.connect_timeout())
        .with_bind(config.outbound_bind)
    }

    /// Set connection timeout
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Bind outbound sockets to a local address
    pub fn with_bind(mut self, bind: Option<IpAddr>) -> Self {
        self.bind = bind;
        self
    }

    /// Connect to `dest`
    pub async fn connect(&self, dest: SocketAddr) -> Result<TcpStream> {
        let socket = match dest {
            SocketAddr::V4(_) => TcpSocket::new_v4()?,
            SocketAddr::V6(_) => TcpSocket::new_v6()?,
        };

        if let Some(ip) = self.bind {
            socket
                .bind(SocketAddr::new(ip, 0))
                .with_context(|| format!("Failed to bind outbound socket to {}", ip))?;
        }

        let stream = tokio::time::timeout(self.connect_timeout, socket.connect(dest))
            .await
            .map_err(|_| ProxyError::Timeout(format!("connect to {}", dest)))?
            .with_context(|| format!("Failed to connect to {}", dest))?;

        self.socket_opts.hint(&stream);

        tracing::debug!("TCP connection established to {}", dest);

        Ok(stream)
    }
}
