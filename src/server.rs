//! Listener and accept loop
//!
//! Accepts client connections and serves each one on its own task until a
//! shutdown signal arrives.

use crate::config::Config;
use crate::session::SessionTracker;
use crate::socks::{Dispatcher, ProtocolRegistry};
use crate::transport::SocketOpts;
use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

/// Pause after a failed accept so a persistent error (fd exhaustion) does
/// not spin the loop
const ACCEPT_ERROR_DELAY: Duration = Duration::from_millis(50);

/// SOCKS proxy server
#[derive(Debug)]
pub struct Server {
    listener: TcpListener,
    dispatcher: Dispatcher,
    socket_opts: SocketOpts,
    shutdown_grace: Duration,
}

impl Server {
    /// Bind the listener and build the handler registry.
    ///
    /// Failing to bind is fatal and returned to the caller.
    pub async fn bind(config: &Config, tracker: SessionTracker) -> Result<Self> {
        let registry = ProtocolRegistry::from_config(&config.socks)?;
        let listener = TcpListener::bind(&config.server.listen_addr)
            .await
            .with_context(|| format!("Failed to listen on {}", config.server.listen_addr))?;

        Ok(Server {
            listener,
            dispatcher: Dispatcher::new(registry, tracker, config.socks.read_buffer_size),
            socket_opts: SocketOpts::from_tcp_config(&config.socks.tcp),
            shutdown_grace: config.server.shutdown_grace(),
        })
    }

    /// Address the listener is bound to
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Session tracker shared with every served connection
    pub fn tracker(&self) -> &SessionTracker {
        self.dispatcher.tracker()
    }

    /// Accept connections until shutdown, then wait for live sessions
    pub async fn run(self, mut shutdown_rx: broadcast::Receiver<bool>) -> Result<()> {
        info!("Listening on {}", self.local_addr()?);

        loop {
            tokio::select! {
                accepted = self.listener.accept() => {
                    match accepted {
                        Ok((stream, peer)) => {
                            debug!("[{}] accepted connection", peer);
                            self.socket_opts.hint(&stream);

                            let dispatcher = self.dispatcher.clone();
                            tokio::spawn(async move {
                                dispatcher.serve(stream, peer).await;
                            });
                        }
                        Err(e) => {
                            error!("Failed to accept connection: {}", e);
                            tokio::time::sleep(ACCEPT_ERROR_DELAY).await;
                        }
                    }
                }
                _ = shutdown_rx.recv() => {
                    info!("Shutdown signal received, no longer accepting connections");
                    break;
                }
            }
        }

        // Stop accepting before waiting
        drop(self.listener);

        let tracker = self.dispatcher.tracker();
        let active = tracker.active();
        if active > 0 {
            info!(
                "Waiting up to {:?} for {} live session(s)",
                self.shutdown_grace, active
            );
            if tokio::time::timeout(self.shutdown_grace, tracker.wait_idle())
                .await
                .is_err()
            {
                warn!(
                    "Shutdown grace period elapsed with {} live session(s)",
                    tracker.active()
                );
            }
        }

        info!("Server stopped");
        Ok(())
    }
}
