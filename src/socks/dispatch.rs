//! Version dispatch
//!
//! Reads the first buffer of a fresh connection and hands it to the handler
//! registered for its version byte.

use super::types::ProtocolVersion;
use super::v4::Socks4Handler;
use super::v5::Socks5Handler;
use crate::config::SocksConfig;
use crate::error::{ProxyError, SocksError};
use crate::session::SessionTracker;
use anyhow::{Context, Result};
use std::collections::HashMap;
use std::fmt;
use std::fmt::Debug;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite};
use tracing::debug;

/// A dynamic stream trait for client connections.
///
/// Lets handlers accept any byte stream (TCP, in-memory pipes, mocks)
/// without being generic over it.
pub trait StreamDyn: AsyncRead + AsyncWrite + Unpin + Send {}

/// Blanket implementation: any type implementing the required traits is a StreamDyn.
impl<T: AsyncRead + AsyncWrite + Unpin + Send> StreamDyn for T {}

/// An accepted client connection and the endpoint it came from
pub struct ClientConn {
    /// Client byte stream
    pub stream: Box<dyn StreamDyn>,
    /// Remote endpoint of the client
    pub peer: SocketAddr,
}

impl ClientConn {
    /// Wrap an accepted stream
    pub fn new<S: StreamDyn + 'static>(stream: S, peer: SocketAddr) -> Self {
        ClientConn {
            stream: Box::new(stream),
            peer,
        }
    }
}

impl Debug for ClientConn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConn")
            .field("peer", &self.peer)
            .finish_non_exhaustive()
    }
}

/// Handler for one SOCKS protocol version.
///
/// `initial` is the first buffer read from the client, version byte
/// included. The handler owns the rest of the session; the connection is
/// closed by the dispatcher once `handle` returns.
#[async_trait::async_trait]
pub trait ProtocolHandler: Send + Sync + Debug {
    /// Version this handler serves
    fn version(&self) -> ProtocolVersion;

    /// Run the handshake and, on success, the relay
    async fn handle(&self, conn: &mut ClientConn, initial: &[u8]) -> Result<()>;
}

/// Registry that maps protocol versions to their handlers.
#[derive(Debug, Default)]
pub struct ProtocolRegistry {
    handlers: HashMap<ProtocolVersion, Arc<dyn ProtocolHandler>>,
}

impl ProtocolRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Build the standard registry for a configuration.
    ///
    /// SOCKS5 is always served; SOCKS4 only when enabled.
    pub fn from_config(config: &SocksConfig) -> Result<Self, SocksError> {
        let mut registry = Self::new();
        registry.register(Arc::new(Socks5Handler::from_config(config)))?;
        if config.enable_socks4 {
            registry.register(Arc::new(Socks4Handler::from_config(config)))?;
        }
        Ok(registry)
    }

    /// Register a handler under its version; a version can only be claimed once.
    pub fn register(&mut self, handler: Arc<dyn ProtocolHandler>) -> Result<(), SocksError> {
        let version = handler.version();
        if self.handlers.contains_key(&version) {
            return Err(SocksError::DuplicateHandler(version));
        }
        self.handlers.insert(version, handler);
        Ok(())
    }

    /// Look up a handler by version.
    pub fn get(&self, version: ProtocolVersion) -> Option<Arc<dyn ProtocolHandler>> {
        self.handlers.get(&version).cloned()
    }

    /// Look up a handler by the raw version byte.
    pub fn lookup(&self, version: u8) -> Option<Arc<dyn ProtocolHandler>> {
        ProtocolVersion::try_from(version)
            .ok()
            .and_then(|version| self.get(version))
    }

    /// Get the number of registered handlers.
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

/// Serves accepted connections: session accounting, version read, dispatch.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    registry: Arc<ProtocolRegistry>,
    tracker: SessionTracker,
    read_buffer_size: usize,
}

impl Dispatcher {
    /// Create a dispatcher over `registry`, accounting sessions in `tracker`
    pub fn new(registry: ProtocolRegistry, tracker: SessionTracker, read_buffer_size: usize) -> Self {
        Dispatcher {
            registry: Arc::new(registry),
            tracker,
            read_buffer_size,
        }
    }

    /// Tracker counting the sessions this dispatcher serves
    pub fn tracker(&self) -> &SessionTracker {
        &self.tracker
    }

    /// Serve one connection to completion. Errors end only this session.
    pub async fn serve<S>(&self, stream: S, peer: SocketAddr)
    where
        S: StreamDyn + 'static,
    {
        let _session = self.tracker.track();
        let mut conn = ClientConn::new(stream, peer);

        if let Err(e) = self.dispatch(&mut conn).await {
            debug!("[{}] session ended: {:#}", peer, e);
        }
    }

    async fn dispatch(&self, conn: &mut ClientConn) -> Result<()> {
        // SOCKS has no length header; take the greeting from a single read
        let mut buf = vec![0u8; self.read_buffer_size];
        let n = conn
            .stream
            .read(&mut buf)
            .await
            .with_context(|| "unable to read SOCKS header")?;
        if n < 2 {
            return Err(ProxyError::Protocol(format!("SOCKS header too short: {} bytes", n)).into());
        }
        buf.truncate(n);

        let handler = self
            .registry
            .lookup(buf[0])
            .ok_or(SocksError::UnsupportedVersion(buf[0]))?;

        debug!("[{}] {} handshake", conn.peer, handler.version());
        handler.handle(conn, &buf).await
    }
}
