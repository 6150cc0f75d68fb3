//! SOCKS request parsers
//!
//! Pure parsers over buffers already read from the client. Each handshake
//! message is expected to arrive whole in a single read; nothing here
//! touches a socket.

use crate::error::SocksError;
use crate::socks::consts::*;
use crate::socks::types::{AuthMethod, SocksCommand};
use std::fmt;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddrV4};

/// SOCKS5 method negotiation message
///
/// ```text
/// +----+----------+----------+
/// |VER | NMETHODS | METHODS  |
/// +----+----------+----------+
/// | 1  |    1     | 1 to 255 |
/// +----+----------+----------+
/// ```
///
/// `NMETHODS` is kept for diagnostics only; the methods are whatever follows it
/// in the buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionMessage {
    /// Protocol version byte
    pub version: u8,
    /// Declared method count
    pub method_count: u8,
    /// Offered method codes
    pub methods: Vec<u8>,
}

impl VersionMessage {
    /// Parse a method negotiation message
    pub fn parse(buf: &[u8]) -> Result<Self, SocksError> {
        if buf.len() < MIN_VERSION_MESSAGE_LEN {
            return Err(SocksError::CorruptedMessage("hello message too short"));
        }

        Ok(VersionMessage {
            version: buf[0],
            method_count: buf[1],
            methods: buf[2..].to_vec(),
        })
    }

    /// Choose the authentication method to run for this client
    pub fn select_method(&self) -> Option<AuthMethod> {
        AuthMethod::select(&self.methods)
    }
}

/// Destination address carried by a SOCKS5 request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestAddress {
    /// Literal IPv4 address
    Ipv4(Ipv4Addr),
    /// Domain name, still to be resolved
    Domain(String),
    /// Literal IPv6 address (refused by the handler)
    Ipv6(Ipv6Addr),
    /// Address type byte this server does not know
    Unsupported(u8),
}

impl RequestAddress {
    /// Address type byte as seen on the wire
    pub fn addr_type(&self) -> u8 {
        match self {
            RequestAddress::Ipv4(_) => SOCKS5_ADDR_TYPE_IPV4,
            RequestAddress::Domain(_) => SOCKS5_ADDR_TYPE_DOMAIN,
            RequestAddress::Ipv6(_) => SOCKS5_ADDR_TYPE_IPV6,
            RequestAddress::Unsupported(atyp) => *atyp,
        }
    }
}

impl fmt::Display for RequestAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestAddress::Ipv4(ip) => write!(f, "{}", ip),
            RequestAddress::Domain(name) => write!(f, "{}", name),
            RequestAddress::Ipv6(ip) => write!(f, "[{}]", ip),
            RequestAddress::Unsupported(atyp) => write!(f, "<address type {}>", atyp),
        }
    }
}

/// SOCKS5 request message
///
/// ```text
/// +----+-----+-------+------+----------+----------+
/// |VER | CMD |  RSV  | ATYP | DST.ADDR | DST.PORT |
/// +----+-----+-------+------+----------+----------+
/// | 1  |  1  | X'00' |  1   | Variable |    2     |
/// +----+-----+-------+------+----------+----------+
/// ```
///
/// The address length is derived from `ATYP` and checked against the buffer:
/// a buffer that is longer or shorter than its address type implies is
/// rejected as corrupted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SocksRequest {
    /// Protocol version byte
    pub version: u8,
    /// Raw command byte
    pub command: u8,
    /// Reserved byte
    pub reserved: u8,
    /// Destination address
    pub address: RequestAddress,
    /// Destination port
    pub port: u16,
}

impl SocksRequest {
    /// Parse a request message
    pub fn parse(buf: &[u8]) -> Result<Self, SocksError> {
        if buf.len() < MIN_REQUEST_LEN {
            return Err(SocksError::CorruptedMessage("request message too short"));
        }

        let addr_type = buf[3];
        let body = &buf[4..];

        let (address, port) = match addr_type {
            SOCKS5_ADDR_TYPE_IPV4 => {
                let (addr, port) = split_address(body, 4)?;
                let octets: [u8; 4] = addr
                    .try_into()
                    .map_err(|_| SocksError::CorruptedMessage("malformed IPv4 address"))?;
                (RequestAddress::Ipv4(Ipv4Addr::from(octets)), port)
            }

            SOCKS5_ADDR_TYPE_DOMAIN => {
                let domain_len = body[0] as usize;
                if domain_len == 0 {
                    return Err(SocksError::CorruptedMessage("empty domain name"));
                }

                let (name, port) = split_address(&body[1..], domain_len)?;
                let name = std::str::from_utf8(name)
                    .map_err(|_| SocksError::CorruptedMessage("domain name is not UTF-8"))?;
                (RequestAddress::Domain(name.to_string()), port)
            }

            SOCKS5_ADDR_TYPE_IPV6 => {
                let (addr, port) = split_address(body, 16)?;
                let octets: [u8; 16] = addr
                    .try_into()
                    .map_err(|_| SocksError::CorruptedMessage("malformed IPv6 address"))?;
                (RequestAddress::Ipv6(Ipv6Addr::from(octets)), port)
            }

            // Unknown layout, so only the trailing port is meaningful
            other => {
                let port = &body[body.len() - 2..];
                (RequestAddress::Unsupported(other), read_port(port)?)
            }
        };

        Ok(SocksRequest {
            version: buf[0],
            command: buf[1],
            reserved: buf[2],
            address,
            port,
        })
    }

    /// Decoded command, if the byte is a known one
    pub fn command(&self) -> Option<SocksCommand> {
        SocksCommand::from_byte(self.command)
    }
}

/// Split `body` into an address of `addr_len` bytes and a port
fn split_address(body: &[u8], addr_len: usize) -> Result<(&[u8], u16), SocksError> {
    if body.len() != addr_len + 2 {
        return Err(SocksError::CorruptedMessage(
            "address length does not match address type",
        ));
    }

    let (addr, port) = body.split_at(addr_len);
    Ok((addr, read_port(port)?))
}

fn read_port(bytes: &[u8]) -> Result<u16, SocksError> {
    let port: [u8; 2] = bytes
        .try_into()
        .map_err(|_| SocksError::CorruptedMessage("malformed port"))?;
    Ok(u16::from_be_bytes(port))
}

/// SOCKS4 request message
///
/// ```text
/// +----+----+---------+--------+--------+------+
/// | VN | CD | DSTPORT | DSTIP  | USERID | NULL |
/// +----+----+---------+--------+--------+------+
/// | 1  | 1  |    2    |   4    |  var   |  1   |
/// +----+----+---------+--------+--------+------+
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Socks4Request {
    /// Raw command byte
    pub command: u8,
    /// Destination port
    pub port: u16,
    /// Destination address
    pub ip: Ipv4Addr,
    /// User id, without the terminating NUL
    pub user_id: Vec<u8>,
}

impl Socks4Request {
    /// Parse a SOCKS4 request, version byte included
    pub fn parse(buf: &[u8]) -> Result<Self, SocksError> {
        if buf.len() < SOCKS4_HEADER_LEN {
            return Err(SocksError::CorruptedMessage("SOCKS4 request too short"));
        }

        let port = read_port(&buf[2..4])?;
        let ip = Ipv4Addr::new(buf[4], buf[5], buf[6], buf[7]);

        let rest = &buf[SOCKS4_HEADER_LEN..];
        let end = rest
            .iter()
            .position(|&b| b == 0)
            .ok_or(SocksError::CorruptedMessage("unable to locate SOCKS4 user"))?;

        Ok(Socks4Request {
            command: buf[1],
            port,
            ip,
            user_id: rest[..end].to_vec(),
        })
    }

    /// Destination socket address
    pub fn destination(&self) -> SocketAddrV4 {
        SocketAddrV4::new(self.ip, self.port)
    }

    /// User id rendered for logs
    pub fn user(&self) -> String {
        String::from_utf8_lossy(&self.user_id).into_owned()
    }
}
