//! SOCKS protocol constants
//!
//! Wire values for the SOCKS4 and SOCKS5 CONNECT handshakes.

/// SOCKS4 protocol version
pub const SOCKS4_VERSION: u8 = 0x04;

/// SOCKS5 protocol version
pub const SOCKS5_VERSION: u8 = 0x05;

// Authentication methods
/// No authentication required
pub const SOCKS5_AUTH_METHOD_NONE: u8 = 0x00;
/// GSSAPI authentication (not implemented)
pub const SOCKS5_AUTH_METHOD_GSSAPI: u8 = 0x01;
/// Username/password authentication (not implemented)
pub const SOCKS5_AUTH_METHOD_PASSWORD: u8 = 0x02;
/// No acceptable methods
pub const SOCKS5_AUTH_METHOD_NOT_ACCEPTABLE: u8 = 0xFF;

// Commands
/// TCP CONNECT command
pub const SOCKS5_CMD_TCP_CONNECT: u8 = 0x01;
/// TCP BIND command (not implemented)
pub const SOCKS5_CMD_TCP_BIND: u8 = 0x02;
/// UDP ASSOCIATE command (not implemented)
pub const SOCKS5_CMD_UDP_ASSOCIATE: u8 = 0x03;

// Address types
/// IPv4 address
pub const SOCKS5_ADDR_TYPE_IPV4: u8 = 0x01;
/// Domain name
pub const SOCKS5_ADDR_TYPE_DOMAIN: u8 = 0x03;
/// IPv6 address (recognized, refused)
pub const SOCKS5_ADDR_TYPE_IPV6: u8 = 0x04;

// Reserved byte
/// Reserved byte value (always 0x00)
pub const SOCKS5_RESERVED: u8 = 0x00;

// SOCKS4
/// SOCKS4 CONNECT command
pub const SOCKS4_CMD_CONNECT: u8 = 0x01;
/// Version byte carried by every SOCKS4 reply
pub const SOCKS4_REPLY_VERSION: u8 = 0x00;
/// Request granted
pub const SOCKS4_REPLY_GRANTED: u8 = 0x5A;
/// Request rejected or failed
pub const SOCKS4_REPLY_REJECTED: u8 = 0x5B;

// Message sizes
/// Smallest well-formed SOCKS5 method negotiation message
pub const MIN_VERSION_MESSAGE_LEN: usize = 3;
/// Smallest well-formed SOCKS5 request message
pub const MIN_REQUEST_LEN: usize = 10;
/// Fixed SOCKS4 header: VN, CD, DSTPORT, DSTIP
pub const SOCKS4_HEADER_LEN: usize = 8;
/// SOCKS5 reply length (IPv4 bound address)
pub const SOCKS5_REPLY_LEN: usize = 10;
/// SOCKS4 reply length
pub const SOCKS4_REPLY_LEN: usize = 8;
/// Largest SOCKS5 request: a 255 byte domain name
pub const MAX_REQUEST_LEN: usize = 4 + 1 + 255 + 2;

/// Default size of a single handshake read
pub const DEFAULT_READ_BUFFER_SIZE: usize = 512;
