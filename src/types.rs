//! Request types carried in the simple-socks header
//!
//! Wire format of the one-shot header sent at the start of every sub-stream:
//! `[command:u8][address]`. There is no length prefix or version byte; the
//! command value alone separates a valid header from garbage and the address
//! encoding is self-delimiting.

use std::fmt;

use serde::{Deserialize, Serialize};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::address::Address;
use crate::error::{Result, SessionError};

/// What the opening side wants done with the sub-stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[repr(u8)]
pub enum Command {
    Connect = 0x01,
    Associate = 0x02,
    Mux = 0x03,
}

impl Command {
    /// Network type implied by this command
    pub fn network(self) -> Network {
        match self {
            Command::Connect | Command::Mux => Network::Tcp,
            Command::Associate => Network::Udp,
        }
    }
}

impl TryFrom<u8> for Command {
    type Error = SessionError;

    fn try_from(value: u8) -> std::result::Result<Self, Self::Error> {
        match value {
            0x01 => Ok(Command::Connect),
            0x02 => Ok(Command::Associate),
            0x03 => Ok(Command::Mux),
            other => Err(SessionError::InvalidCommand(other)),
        }
    }
}

impl From<Command> for u8 {
    fn from(value: Command) -> Self {
        value as u8
    }
}

/// Transport-level network type of a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Tcp,
    Udp,
}

impl Network {
    pub fn as_str(self) -> &'static str {
        match self {
            Network::Tcp => "tcp",
            Network::Udp => "udp",
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The logical intent of a session
///
/// Built once, either parsed from the peer or supplied by the caller, and
/// never changed afterwards. The network type always follows the command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    command: Command,
    network: Network,
    address: Address,
}

impl Request {
    /// Create a request, deriving the network type from the command
    pub fn new(command: Command, address: impl Into<Address>) -> Self {
        Self {
            command,
            network: command.network(),
            address: address.into(),
        }
    }

    pub fn command(&self) -> Command {
        self.command
    }

    pub fn network(&self) -> Network {
        self.network
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    /// Parse one header from `reader`.
    ///
    /// The command byte is validated before the address decoder runs, so an
    /// invalid command consumes exactly one byte.
    pub async fn read_from<R>(reader: &mut R) -> Result<Self>
    where
        R: AsyncRead + Unpin,
    {
        let cmd = reader.read_u8().await.map_err(SessionError::HeaderRead)?;
        let command = Command::try_from(cmd)?;
        let address = Address::read_from(reader)
            .await
            .map_err(SessionError::AddressDecode)?;
        Ok(Self::new(command, address))
    }

    /// Write this request as a header. The caller owns flushing.
    pub async fn write_to<W>(&self, writer: &mut W) -> Result<()>
    where
        W: AsyncWrite + Unpin,
    {
        let mut header = Vec::with_capacity(1 + self.address.serialized_len());
        header.push(u8::from(self.command));
        self.address
            .encode(&mut header)
            .map_err(SessionError::AddressEncode)?;
        writer
            .write_all(&header)
            .await
            .map_err(SessionError::Flush)?;
        Ok(())
    }
}

impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.network, self.address)
    }
}
