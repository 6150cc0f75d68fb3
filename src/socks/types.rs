//! SOCKS type definitions
//!
//! Enumerations for the values the handshake dispatches on.

use super::consts::*;
use crate::error::SocksError;
use std::fmt;

/// Protocol version selected by the first byte a client sends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProtocolVersion {
    /// SOCKS4 (legacy, CONNECT only)
    Socks4,
    /// SOCKS5
    Socks5,
}

impl TryFrom<u8> for ProtocolVersion {
    type Error = SocksError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            SOCKS4_VERSION => Ok(ProtocolVersion::Socks4),
            SOCKS5_VERSION => Ok(ProtocolVersion::Socks5),
            other => Err(SocksError::UnsupportedVersion(other)),
        }
    }
}

impl fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtocolVersion::Socks4 => write!(f, "SOCKS4"),
            ProtocolVersion::Socks5 => write!(f, "SOCKS5"),
        }
    }
}

/// SOCKS5 command types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SocksCommand {
    /// TCP CONNECT - establish a TCP connection to target
    Connect,
    /// TCP BIND (recognized, not implemented)
    Bind,
    /// UDP ASSOCIATE (recognized, not implemented)
    UdpAssociate,
}

impl SocksCommand {
    /// Parse a command byte into SocksCommand
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            SOCKS5_CMD_TCP_CONNECT => Some(SocksCommand::Connect),
            SOCKS5_CMD_TCP_BIND => Some(SocksCommand::Bind),
            SOCKS5_CMD_UDP_ASSOCIATE => Some(SocksCommand::UdpAssociate),
            _ => None,
        }
    }
}

impl fmt::Display for SocksCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SocksCommand::Connect => write!(f, "CONNECT"),
            SocksCommand::Bind => write!(f, "BIND"),
            SocksCommand::UdpAssociate => write!(f, "UDP ASSOCIATE"),
        }
    }
}

/// SOCKS5 authentication methods this server knows about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMethod {
    /// No authentication required
    None,
    /// GSSAPI (reserved, never selected)
    Gssapi,
    /// Username/password (reserved, never selected)
    Password,
}

impl AuthMethod {
    /// Methods the server is able to execute, in preference order
    pub const SUPPORTED: &'static [AuthMethod] = &[AuthMethod::None];

    /// Convert to SOCKS5 method byte
    pub fn to_byte(self) -> u8 {
        match self {
            AuthMethod::None => SOCKS5_AUTH_METHOD_NONE,
            AuthMethod::Gssapi => SOCKS5_AUTH_METHOD_GSSAPI,
            AuthMethod::Password => SOCKS5_AUTH_METHOD_PASSWORD,
        }
    }

    /// Pick the first supported method the client offered
    pub fn select(offered: &[u8]) -> Option<Self> {
        Self::SUPPORTED
            .iter()
            .copied()
            .find(|method| offered.contains(&method.to_byte()))
    }
}
