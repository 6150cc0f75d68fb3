//! SOCKS message codec
//!
//! Parses handshake messages and builds replies.

mod message;
mod reply;

pub use message::{RequestAddress, Socks4Request, SocksRequest, VersionMessage};
pub use reply::{
    method_selection, send_method_selection, send_socks4_reply, send_socks5_failure,
    send_socks5_reply, Socks4Reply, Socks5Reply, Socks5ReplyCode,
};
