//! # Socksgate - SOCKS4/SOCKS5 CONNECT proxy
//!
//! Socksgate accepts client connections on a TCP listener, runs the SOCKS4
//! or SOCKS5 handshake, dials the requested destination and relays bytes in
//! both directions until either side closes.
//!
//! ## Features
//!
//! - **SOCKS5 CONNECT**: IPv4 and domain destinations, "no authentication" only
//! - **SOCKS4 CONNECT**: optional legacy support, on by default
//! - **Half-close aware relay**: one direction finishing never cuts the other
//! - **Graceful shutdown**: stop accepting, then wait for live sessions
//!
//! ## Usage
//!
//! ```rust,ignore
//! use socksgate::config::load_config;
//! use socksgate::{Server, SessionTracker};
//! use tokio::sync::broadcast;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = load_config("config.toml")?;
//!     let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
//!
//!     let server = Server::bind(&config, SessionTracker::new()).await?;
//!     server.run(shutdown_rx).await
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! Client -> Server (accept) -> Dispatcher -> SOCKS4/SOCKS5 handler -> relay -> Target
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod config;
pub mod error;
pub mod server;
pub mod session;
pub mod socks;
pub mod transport;

// Re-export commonly used items
pub use config::{load_config, Config};
pub use error::{ProxyError, SocksError};
pub use server::Server;
pub use session::{SessionGuard, SessionTracker};

/// Version of the Socksgate library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Name of the application
pub const NAME: &str = env!("CARGO_PKG_NAME");
