//! Test utilities for Socksgate
//!
//! This module provides common test utilities used across integration tests.

#![allow(dead_code)]

use socksgate::config::Config;
use socksgate::{Server, SessionTracker};
use std::net::{SocketAddr, SocketAddrV4};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

/// Upper bound for any single step of an integration test
pub const STEP_TIMEOUT: Duration = Duration::from_secs(5);

/// Create a test TCP listener on an available port
pub async fn create_test_listener() -> (TcpListener, SocketAddrV4) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = match listener.local_addr().unwrap() {
        SocketAddr::V4(addr) => addr,
        SocketAddr::V6(_) => unreachable!("bound to an IPv4 address"),
    };
    (listener, addr)
}

/// An address nothing is listening on
pub async fn closed_port() -> SocketAddrV4 {
    let (_listener, addr) = create_test_listener().await;
    addr
}

/// Spawn a server echoing every connection back until EOF
pub async fn spawn_echo_server() -> SocketAddrV4 {
    let (listener, addr) = create_test_listener().await;
    tokio::spawn(async move {
        while let Ok((mut stream, _)) = listener.accept().await {
            tokio::spawn(async move {
                let (mut reader, mut writer) = stream.split();
                let _ = tokio::io::copy(&mut reader, &mut writer).await;
            });
        }
    });
    addr
}

/// Test configuration builder
pub struct TestConfigBuilder {
    enable_socks4: bool,
    shutdown_grace_secs: u64,
    connect_timeout: u64,
    resolve_timeout: u64,
}

impl Default for TestConfigBuilder {
    fn default() -> Self {
        TestConfigBuilder {
            enable_socks4: true,
            shutdown_grace_secs: 2,
            connect_timeout: 2,
            resolve_timeout: 2,
        }
    }
}

impl TestConfigBuilder {
    /// Create a new test config builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable SOCKS4
    pub fn enable_socks4(mut self, enabled: bool) -> Self {
        self.enable_socks4 = enabled;
        self
    }

    /// Set the shutdown grace period
    pub fn shutdown_grace_secs(mut self, secs: u64) -> Self {
        self.shutdown_grace_secs = secs;
        self
    }

    /// Build a config listening on an ephemeral loopback port
    pub fn build(self) -> Config {
        let mut config = Config::default();
        config.server.listen_addr = "127.0.0.1:0".to_string();
        config.server.shutdown_grace_secs = self.shutdown_grace_secs;
        config.socks.enable_socks4 = self.enable_socks4;
        config.socks.connect_timeout = self.connect_timeout;
        config.socks.resolve_timeout = self.resolve_timeout;
        config
    }
}

/// A proxy running on its own task
pub struct TestProxy {
    /// Address clients connect to
    pub addr: SocketAddr,
    /// Tracker of the proxy's live sessions
    pub tracker: SessionTracker,
    /// Sends the shutdown signal
    pub shutdown_tx: broadcast::Sender<bool>,
    /// The running server
    pub handle: JoinHandle<anyhow::Result<()>>,
}

impl TestProxy {
    /// Signal shutdown and wait for the server to return
    pub async fn shutdown(self) -> anyhow::Result<()> {
        self.shutdown_tx.send(true).unwrap();
        tokio::time::timeout(STEP_TIMEOUT, self.handle)
            .await
            .expect("server did not stop")
            .unwrap()
    }
}

/// Start a proxy with `config`
pub async fn start_proxy(config: Config) -> TestProxy {
    let tracker = SessionTracker::new();
    let server = Server::bind(&config, tracker.clone()).await.unwrap();
    let addr = server.local_addr().unwrap();
    let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
    let handle = tokio::spawn(server.run(shutdown_rx));

    TestProxy {
        addr,
        tracker,
        shutdown_tx,
        handle,
    }
}

/// Start a proxy with the default test configuration
pub async fn start_default_proxy() -> TestProxy {
    start_proxy(TestConfigBuilder::new().build()).await
}

/// Build a SOCKS5 CONNECT request for an IPv4 destination
pub fn socks5_connect_ipv4(dest: SocketAddrV4) -> Vec<u8> {
    let mut request = vec![0x05, 0x01, 0x00, 0x01];
    request.extend_from_slice(&dest.ip().octets());
    request.extend_from_slice(&dest.port().to_be_bytes());
    request
}

/// Build a SOCKS5 CONNECT request for a domain destination
pub fn socks5_connect_domain(domain: &str, port: u16) -> Vec<u8> {
    let mut request = vec![0x05, 0x01, 0x00, 0x03, domain.len() as u8];
    request.extend_from_slice(domain.as_bytes());
    request.extend_from_slice(&port.to_be_bytes());
    request
}

/// Build a SOCKS4 CONNECT request
pub fn socks4_connect(dest: SocketAddrV4, user: &[u8]) -> Vec<u8> {
    let mut request = vec![0x04, 0x01];
    request.extend_from_slice(&dest.port().to_be_bytes());
    request.extend_from_slice(&dest.ip().octets());
    request.extend_from_slice(user);
    request.push(0x00);
    request
}

/// Connect to the proxy and complete SOCKS5 method negotiation
pub async fn socks5_negotiated(proxy: SocketAddr) -> TcpStream {
    let mut stream = TcpStream::connect(proxy).await.unwrap();
    stream.write_all(&[0x05, 0x01, 0x00]).await.unwrap();

    let mut selection = [0u8; 2];
    stream.read_exact(&mut selection).await.unwrap();
    assert_eq!(selection, [0x05, 0x00]);
    stream
}

/// Read one 10 byte SOCKS5 reply
pub async fn read_socks5_reply(stream: &mut TcpStream) -> [u8; 10] {
    let mut reply = [0u8; 10];
    tokio::time::timeout(STEP_TIMEOUT, stream.read_exact(&mut reply))
        .await
        .expect("no SOCKS5 reply")
        .unwrap();
    reply
}

/// Read until EOF, failing the test if it takes too long
pub async fn read_to_eof(stream: &mut TcpStream) -> Vec<u8> {
    let mut rest = Vec::new();
    tokio::time::timeout(STEP_TIMEOUT, stream.read_to_end(&mut rest))
        .await
        .expect("connection was not closed")
        .unwrap_or_default();
    rest
}
