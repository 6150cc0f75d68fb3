//! SOCKS protocol support
//!
//! Serves SOCKS4 and SOCKS5 CONNECT on accepted client streams. A session
//! runs through three stages:
//!
//! ```text
//! Dispatcher (version byte) -> Socks4Handler / Socks5Handler -> relay
//! ```

mod codec;
mod consts;
mod dispatch;
mod relay;
mod resolve;
mod types;
mod v4;
mod v5;

pub use codec::{
    method_selection, send_method_selection, send_socks4_reply, send_socks5_failure,
    send_socks5_reply, RequestAddress, Socks4Reply, Socks4Request, Socks5Reply, Socks5ReplyCode,
    SocksRequest, VersionMessage,
};
pub use consts::*;
pub use dispatch::{ClientConn, Dispatcher, ProtocolHandler, ProtocolRegistry, StreamDyn};
pub use relay::{relay, RelayStats};
pub use resolve::{Resolver, SystemResolver};
pub use types::{AuthMethod, ProtocolVersion, SocksCommand};
pub use v4::Socks4Handler;
pub use v5::Socks5Handler;
