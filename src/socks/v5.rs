//! SOCKS5 handler
//!
//! Runs the handshake in four strictly sequential stages:
//!
//! 1. Method negotiation (only "no authentication" is ever selected)
//! 2. Request read, one buffer
//! 3. Command and address checks, with domain resolution
//! 4. Dial, success reply, relay
//!
//! A failing stage ends the session, after a failure reply wherever the
//! protocol has one.

use super::codec::{
    send_method_selection, send_socks5_failure, send_socks5_reply, RequestAddress, Socks5Reply,
    Socks5ReplyCode, SocksRequest, VersionMessage,
};
use super::consts::{DEFAULT_READ_BUFFER_SIZE, SOCKS5_VERSION};
use super::dispatch::{ClientConn, ProtocolHandler};
use super::relay::relay;
use super::resolve::{Resolver, SystemResolver};
use super::types::{ProtocolVersion, SocksCommand};
use crate::config::SocksConfig;
use crate::error::SocksError;
use crate::transport::Dialer;
use anyhow::{bail, Context, Result};
use std::net::{SocketAddr, SocketAddrV4};
use std::sync::Arc;
use tokio::io::AsyncReadExt;
use tokio::net::TcpStream;
use tracing::{debug, info};

/// SOCKS5 protocol handler
#[derive(Debug, Clone)]
pub struct Socks5Handler {
    dialer: Dialer,
    resolver: Arc<dyn Resolver>,
    read_buffer_size: usize,
}

impl Socks5Handler {
    /// Create a handler with the given dialer and resolver
    pub fn new(dialer: Dialer, resolver: Arc<dyn Resolver>) -> Self {
        Socks5Handler {
            dialer,
            resolver,
            read_buffer_size: DEFAULT_READ_BUFFER_SIZE,
        }
    }

    /// Create a handler from the SOCKS configuration
    pub fn from_config(config: &SocksConfig) -> Self {
        let resolver = Arc::new(SystemResolver::new(config.resolve_timeout()));
        Self::new(Dialer::from_config(config), resolver)
            .with_read_buffer_size(config.read_buffer_size)
    }

    /// Set the size of the request read
    pub fn with_read_buffer_size(mut self, size: usize) -> Self {
        self.read_buffer_size = size;
        self
    }

    async fn negotiate(&self, conn: &mut ClientConn, initial: &[u8]) -> Result<()> {
        let message =
            VersionMessage::parse(initial).with_context(|| "corrupted hello SOCKS5 message")?;

        let method = message.select_method();
        send_method_selection(&mut conn.stream, method).await?;

        match method {
            Some(method) => {
                debug!(
                    "[{}] authentication method {:?} selected from {} offered",
                    conn.peer, method, message.method_count
                );
                Ok(())
            }
            None => Err(SocksError::NoAcceptableMethod.into()),
        }
    }

    async fn read_request(&self, conn: &mut ClientConn) -> Result<SocksRequest> {
        let mut buf = vec![0u8; self.read_buffer_size];
        let n = conn
            .stream
            .read(&mut buf)
            .await
            .with_context(|| "unable to read SOCKS5 request")?;
        if n == 0 {
            bail!("client closed before sending a SOCKS5 request");
        }
        buf.truncate(n);

        match SocksRequest::parse(&buf) {
            Ok(request) => Ok(request),
            Err(e) => {
                send_socks5_failure(&mut conn.stream, Socks5ReplyCode::GeneralFailure).await?;
                Err(e).with_context(|| format!("corrupted SOCKS5 request {:?}", buf))
            }
        }
    }

    async fn resolve_destination(
        &self,
        conn: &mut ClientConn,
        request: &SocksRequest,
    ) -> Result<SocketAddrV4> {
        if request.version != SOCKS5_VERSION {
            send_socks5_failure(&mut conn.stream, Socks5ReplyCode::CommandNotSupported).await?;
            return Err(SocksError::UnsupportedVersion(request.version))
                .with_context(|| "unknown version after SOCKS5 handshake");
        }

        if request.command() != Some(SocksCommand::Connect) {
            send_socks5_failure(&mut conn.stream, Socks5ReplyCode::CommandNotSupported).await?;
            return Err(SocksError::CommandNotSupported(request.command).into());
        }

        let ip = match &request.address {
            RequestAddress::Ipv4(ip) => *ip,
            RequestAddress::Domain(name) => match self.resolver.resolve_ipv4(name).await {
                Ok(ip) => {
                    debug!("[{}] resolved {} to {}", conn.peer, name, ip);
                    ip
                }
                Err(e) => {
                    send_socks5_failure(&mut conn.stream, Socks5ReplyCode::HostUnreachable)
                        .await?;
                    return Err(e).with_context(|| format!("unable to resolve {:?}", name));
                }
            },
            other => {
                send_socks5_failure(&mut conn.stream, Socks5ReplyCode::AddressTypeNotSupported)
                    .await?;
                return Err(SocksError::AddressTypeNotSupported(other.addr_type()).into());
            }
        };

        Ok(SocketAddrV4::new(ip, request.port))
    }

    async fn connect(&self, conn: &mut ClientConn, dest: SocketAddrV4) -> Result<TcpStream> {
        match self.dialer.connect(SocketAddr::V4(dest)).await {
            Ok(stream) => Ok(stream),
            Err(e) => {
                send_socks5_failure(&mut conn.stream, Socks5ReplyCode::HostUnreachable).await?;
                Err(e.context("unable to connect to remote host"))
            }
        }
    }
}

#[async_trait::async_trait]
impl ProtocolHandler for Socks5Handler {
    fn version(&self) -> ProtocolVersion {
        ProtocolVersion::Socks5
    }

    async fn handle(&self, conn: &mut ClientConn, initial: &[u8]) -> Result<()> {
        self.negotiate(conn, initial).await?;

        let request = self.read_request(conn).await?;
        debug!(
            "[{}] incoming SOCKS5 request cmd={} raddr={}:{}",
            conn.peer, request.command, request.address, request.port
        );

        let dest = self.resolve_destination(conn, &request).await?;
        let upstream = self.connect(conn, dest).await?;

        // Echo the dialed IPv4 address, even for domain requests
        send_socks5_reply(&mut conn.stream, Socks5Reply::success(dest)).await?;
        info!("[{}] SOCKS5 tunnel established to {}", conn.peer, dest);

        relay(&mut conn.stream, upstream).await;
        Ok(())
    }
}
