//! SOCKS reply builders
//!
//! Constructs SOCKS4 and SOCKS5 replies and writes them to the client.

use crate::socks::consts::*;
use crate::socks::types::AuthMethod;
use anyhow::Result;
use bytes::{BufMut, Bytes, BytesMut};
use std::net::{Ipv4Addr, SocketAddrV4};
use tokio::io::{AsyncWrite, AsyncWriteExt};

/// Reply codes for SOCKS5 protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Socks5ReplyCode {
    /// Command succeeded
    Succeeded = 0x00,
    /// General SOCKS server failure
    GeneralFailure = 0x01,
    /// Connection not allowed by ruleset
    ConnectionNotAllowed = 0x02,
    /// Network unreachable
    NetworkUnreachable = 0x03,
    /// Host unreachable
    HostUnreachable = 0x04,
    /// Connection refused
    ConnectionRefused = 0x05,
    /// TTL expired
    TtlExpired = 0x06,
    /// Command not supported
    CommandNotSupported = 0x07,
    /// Address type not supported
    AddressTypeNotSupported = 0x08,
}

impl From<Socks5ReplyCode> for u8 {
    fn from(code: Socks5ReplyCode) -> Self {
        code as u8
    }
}

/// SOCKS5 command reply
///
/// ```text
/// +----+-----+-------+------+----------+----------+
/// |VER | REP |  RSV  | ATYP | BND.ADDR | BND.PORT |
/// +----+-----+-------+------+----------+----------+
/// | 1  |  1  | X'00' |  1   |    4     |    2     |
/// +----+-----+-------+------+----------+----------+
/// ```
///
/// Always carries an IPv4 address. Failures carry `0.0.0.0:0`; success
/// carries the address that was dialed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Socks5Reply {
    /// Reply status
    pub code: Socks5ReplyCode,
    /// Address echoed back to the client
    pub bound: SocketAddrV4,
}

impl Socks5Reply {
    /// Successful CONNECT to `dialed`
    pub fn success(dialed: SocketAddrV4) -> Self {
        Socks5Reply {
            code: Socks5ReplyCode::Succeeded,
            bound: dialed,
        }
    }

    /// Failure with a zeroed address
    pub fn failure(code: Socks5ReplyCode) -> Self {
        Socks5Reply {
            code,
            bound: SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, 0),
        }
    }

    /// Encode to wire bytes
    pub fn encode(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(SOCKS5_REPLY_LEN);
        buf.put_u8(SOCKS5_VERSION);
        buf.put_u8(self.code.into());
        buf.put_u8(SOCKS5_RESERVED);
        buf.put_u8(SOCKS5_ADDR_TYPE_IPV4);
        buf.put_slice(&self.bound.ip().octets());
        buf.put_u16(self.bound.port());
        buf.freeze()
    }
}

/// SOCKS4 reply
///
/// Eight bytes: `{0x00, status, 0, 0, 0, 0, 0, 0}`. Port and address are
/// never populated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Socks4Reply {
    /// Request granted
    Granted,
    /// Request rejected or failed
    Rejected,
}

impl Socks4Reply {
    /// Encode to wire bytes
    pub fn encode(self) -> [u8; SOCKS4_REPLY_LEN] {
        let status = match self {
            Socks4Reply::Granted => SOCKS4_REPLY_GRANTED,
            Socks4Reply::Rejected => SOCKS4_REPLY_REJECTED,
        };
        [SOCKS4_REPLY_VERSION, status, 0, 0, 0, 0, 0, 0]
    }
}

/// Encode the method selection reply, `None` meaning no acceptable method
pub fn method_selection(method: Option<AuthMethod>) -> [u8; 2] {
    [
        SOCKS5_VERSION,
        method
            .map(AuthMethod::to_byte)
            .unwrap_or(SOCKS5_AUTH_METHOD_NOT_ACCEPTABLE),
    ]
}

/// Write the method selection reply
pub async fn send_method_selection<S>(stream: &mut S, method: Option<AuthMethod>) -> Result<()>
where
    S: AsyncWrite + Unpin,
{
    write_flush(stream, &method_selection(method)).await
}

/// Write a SOCKS5 command reply
pub async fn send_socks5_reply<S>(stream: &mut S, reply: Socks5Reply) -> Result<()>
where
    S: AsyncWrite + Unpin,
{
    write_flush(stream, &reply.encode()).await
}

/// Write a SOCKS5 failure reply with a zeroed address
pub async fn send_socks5_failure<S>(stream: &mut S, code: Socks5ReplyCode) -> Result<()>
where
    S: AsyncWrite + Unpin,
{
    send_socks5_reply(stream, Socks5Reply::failure(code)).await
}

/// Write a SOCKS4 reply
pub async fn send_socks4_reply<S>(stream: &mut S, reply: Socks4Reply) -> Result<()>
where
    S: AsyncWrite + Unpin,
{
    write_flush(stream, &reply.encode()).await
}

async fn write_flush<S>(stream: &mut S, bytes: &[u8]) -> Result<()>
where
    S: AsyncWrite + Unpin,
{
    stream.write_all(bytes).await?;
    stream.flush().await?;
    Ok(())
}
