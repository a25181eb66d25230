//! Error types for a3s-simplesocks

use thiserror::Error;

/// Errors produced by the destination address codec
#[derive(Debug, Error)]
pub enum AddressError {
    /// Underlying stream failure, including premature EOF
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Address type byte is not IPv4, domain, or IPv6
    #[error("Address type not supported: 0x{0:02x}")]
    UnsupportedType(u8),

    /// Domain name bytes are not valid UTF-8
    #[error("Invalid UTF-8 in domain name")]
    InvalidDomain,

    /// Domain name does not fit the one-byte length prefix
    #[error("Domain name too long: {0} bytes (max 255)")]
    DomainTooLong(usize),

    /// Textual address could not be parsed as `host:port`
    #[error("Invalid address '{0}'")]
    Parse(String),
}

/// Errors that can occur while establishing a session
///
/// Every variant is fatal to construction: a constructor that returns one of
/// these never hands out a session.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The command byte could not be read from the peer
    #[error("Failed to parse mux request: failed to read cmd: {0}")]
    HeaderRead(#[source] std::io::Error),

    /// The command byte is not Connect, Associate, or Mux
    #[error("Failed to parse mux request: invalid command {0}")]
    InvalidCommand(u8),

    /// The address codec rejected the inbound header
    #[error("Failed to parse mux request: {0}")]
    AddressDecode(#[source] AddressError),

    /// The address codec could not encode the outbound header
    #[error("Failed to write mux request: {0}")]
    AddressEncode(#[source] AddressError),

    /// The outbound header could not be written or flushed to the transport
    #[error("Failed to write mux request: {0}")]
    Flush(#[source] std::io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias for session setup
pub type Result<T> = std::result::Result<T, SessionError>;
