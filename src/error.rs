//! Error types for Socksgate
//!
//! This module defines all custom error types used throughout the proxy.

use crate::socks::ProtocolVersion;
use std::io;
use thiserror::Error;

/// Main error type for Socksgate operations
#[derive(Error, Debug)]
pub enum ProxyError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Protocol error
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Timeout error
    #[error("Timeout: {0}")]
    Timeout(String),

    /// SOCKS protocol error
    #[error("SOCKS error: {0}")]
    Socks(#[from] SocksError),
}

/// SOCKS handshake errors
#[derive(Error, Debug)]
pub enum SocksError {
    /// Buffer too short or inconsistent with its own header
    #[error("Corrupted message: {0}")]
    CorruptedMessage(&'static str),

    /// Unsupported SOCKS version
    #[error("Unsupported SOCKS version: {0}")]
    UnsupportedVersion(u8),

    /// Two handlers registered for one version
    #[error("Handler already registered for {0}")]
    DuplicateHandler(ProtocolVersion),

    /// No acceptable authentication method
    #[error("No acceptable authentication method")]
    NoAcceptableMethod,

    /// Command not supported
    #[error("Command not supported: {0}")]
    CommandNotSupported(u8),

    /// Address type not supported
    #[error("Address type not supported: {0}")]
    AddressTypeNotSupported(u8),

    /// Destination could not be resolved or reached
    #[error("Host unreachable: {0}")]
    HostUnreachable(String),

    /// Name resolution exceeded its deadline
    #[error("Resolution timed out: {0}")]
    ResolveTimeout(String),
}
