//! Duplex relay between a client and its upstream
//!
//! Each direction copies until EOF or error and then shuts down the write
//! side it was feeding. The other direction keeps running, so a client that
//! has finished sending still receives everything the upstream produces.
//! The upstream is closed exactly once, after both directions are done.

use std::io;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tracing::debug;

/// Outcome of both relay directions
#[derive(Debug)]
pub struct RelayStats {
    /// Bytes copied from the client to the upstream, or the error that ended it
    pub client_to_upstream: io::Result<u64>,
    /// Bytes copied from the upstream to the client, or the error that ended it
    pub upstream_to_client: io::Result<u64>,
}

/// Relay bytes between `client` and `upstream` until both directions finish
///
/// The upstream is consumed and dropped before returning. The client is only
/// borrowed; closing it is left to its owner.
pub async fn relay<A, B>(client: &mut A, upstream: B) -> RelayStats
where
    A: AsyncRead + AsyncWrite + Unpin,
    B: AsyncRead + AsyncWrite + Unpin,
{
    let (mut client_read, mut client_write) = tokio::io::split(client);
    let (mut upstream_read, mut upstream_write) = tokio::io::split(upstream);

    let (client_to_upstream, upstream_to_client) = tokio::join!(
        copy_then_shutdown(&mut client_read, &mut upstream_write),
        copy_then_shutdown(&mut upstream_read, &mut client_write),
    );

    match &client_to_upstream {
        Ok(bytes) => debug!("client->upstream finished: {} bytes", bytes),
        Err(e) => debug!("client->upstream error: {}", e),
    }
    match &upstream_to_client {
        Ok(bytes) => debug!("upstream->client finished: {} bytes", bytes),
        Err(e) => debug!("upstream->client error: {}", e),
    }

    drop(upstream_read.unsplit(upstream_write));

    RelayStats {
        client_to_upstream,
        upstream_to_client,
    }
}

async fn copy_then_shutdown<R, W>(reader: &mut R, writer: &mut W) -> io::Result<u64>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let result = tokio::io::copy(reader, writer).await;
    // Half-close: nothing more will be written to this sink
    if let Err(e) = writer.shutdown().await {
        debug!("shutdown after copy failed: {}", e);
    }
    result
}
