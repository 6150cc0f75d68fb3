//! Host name resolution for SOCKS5 domain requests

use crate::error::SocksError;
use async_trait::async_trait;
use std::fmt::Debug;
use std::future::Future;
use std::io;
use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;

/// Resolves a destination name to the single IPv4 address that gets dialed.
#[async_trait]
pub trait Resolver: Send + Sync + Debug {
    /// Resolve `host` to an IPv4 address
    async fn resolve_ipv4(&self, host: &str) -> Result<Ipv4Addr, SocksError>;
}

/// Resolver backed by the operating system, bounded by a deadline
#[derive(Debug, Clone)]
pub struct SystemResolver {
    timeout: Duration,
}

impl SystemResolver {
    /// Create a resolver that gives up after `timeout`
    pub fn new(timeout: Duration) -> Self {
        SystemResolver { timeout }
    }
}

#[async_trait]
impl Resolver for SystemResolver {
    async fn resolve_ipv4(&self, host: &str) -> Result<Ipv4Addr, SocksError> {
        // Port is irrelevant to the lookup
        let addrs = lookup_within(host, self.timeout, tokio::net::lookup_host((host, 0))).await?;

        // First IPv4 candidate only
        addrs
            .filter_map(|addr| match addr.ip() {
                IpAddr::V4(ip) => Some(ip),
                IpAddr::V6(_) => None,
            })
            .next()
            .ok_or_else(|| SocksError::HostUnreachable(format!("{}: no IPv4 address", host)))
    }
}

/// Run `lookup` for `host` under `deadline`
///
/// An expired deadline is [`SocksError::ResolveTimeout`], a failed lookup is
/// [`SocksError::HostUnreachable`].
pub(crate) async fn lookup_within<F, T>(
    host: &str,
    deadline: Duration,
    lookup: F,
) -> Result<T, SocksError>
where
    F: Future<Output = io::Result<T>>,
{
    tokio::time::timeout(deadline, lookup)
        .await
        .map_err(|_| SocksError::ResolveTimeout(host.to_string()))?
        .map_err(|e| SocksError::HostUnreachable(format!("{}: {}", host, e)))
}
