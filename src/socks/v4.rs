//! SOCKS4 handler
//!
//! Legacy CONNECT-only support. Anything other than a well-formed CONNECT is
//! closed without a reply.

use super::codec::{send_socks4_reply, Socks4Reply, Socks4Request};
use super::consts::SOCKS4_CMD_CONNECT;
use super::dispatch::{ClientConn, ProtocolHandler};
use super::relay::relay;
use super::types::ProtocolVersion;
use crate::config::SocksConfig;
use crate::error::SocksError;
use crate::transport::Dialer;
use anyhow::{Context, Result};
use std::net::SocketAddr;
use tracing::{debug, info};

/// SOCKS4 protocol handler
#[derive(Debug, Clone)]
pub struct Socks4Handler {
    dialer: Dialer,
}

impl Socks4Handler {
    /// Create a handler dialing through `dialer`
    pub fn new(dialer: Dialer) -> Self {
        Socks4Handler { dialer }
    }

    /// Create a handler from the SOCKS configuration
    pub fn from_config(config: &SocksConfig) -> Self {
        Self::new(Dialer::from_config(config))
    }
}

#[async_trait::async_trait]
impl ProtocolHandler for Socks4Handler {
    fn version(&self) -> ProtocolVersion {
        ProtocolVersion::Socks4
    }

    async fn handle(&self, conn: &mut ClientConn, initial: &[u8]) -> Result<()> {
        let command = initial.get(1).copied().unwrap_or_default();
        if command != SOCKS4_CMD_CONNECT {
            return Err(SocksError::CommandNotSupported(command))
                .with_context(|| "unsupported SOCKS4 command, closing connection");
        }

        let request = Socks4Request::parse(initial)?;
        let dest = request.destination();
        debug!(
            "[{}] incoming SOCKS4 TCP/IP stream connection, user={:?}, raddr={}",
            conn.peer,
            request.user(),
            dest
        );

        let upstream = match self.dialer.connect(SocketAddr::V4(dest)).await {
            Ok(stream) => stream,
            Err(e) => {
                send_socks4_reply(&mut conn.stream, Socks4Reply::Rejected).await?;
                return Err(e.context("unable to connect to remote host"));
            }
        };

        send_socks4_reply(&mut conn.stream, Socks4Reply::Granted).await?;
        info!("[{}] SOCKS4 tunnel established to {}", conn.peer, dest);

        relay(&mut conn.stream, upstream).await;
        Ok(())
    }
}
