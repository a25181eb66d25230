//! # a3s-simplesocks
//!
//! Simple-socks sub-stream sessions for the A3S proxy mux transport.
//!
//! ## Overview
//!
//! Every sub-stream opened over the mux carries a one-shot header that says
//! what the stream is for: a command (`Connect`, `Associate`, `Mux`) and a
//! destination address. `a3s-simplesocks` exchanges that header and then
//! relays bytes transparently, counting traffic in both directions and
//! reporting the totals to a pluggable [`TrafficMeter`] on close.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use a3s_simplesocks::{Command, ConnSession, MemoryTrafficMeter, Request, Session};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let (client, server) = tokio::io::duplex(64 * 1024);
//!
//! // Opening side announces the request
//! let request = Request::new(Command::Connect, "example.com:80".parse::<a3s_simplesocks::Address>()?);
//! let mut outbound = Session::outbound(request, client).await?;
//!
//! // Accepting side reads it, metered under the peer's credential
//! let meter = MemoryTrafficMeter::new();
//! let mut inbound = Session::inbound(server, "user-hash").await?;
//! inbound.set_meter(Arc::new(meter.clone()));
//!
//! outbound.write(b"GET / HTTP/1.1\r\n\r\n").await?;
//! let mut buf = [0u8; 64];
//! let n = inbound.read(&mut buf).await?;
//!
//! inbound.close().await?;
//! assert_eq!(meter.get("user-hash").await.unwrap().recv, n as u64);
//! # Ok(())
//! # }
//! ```
//!
//! ## Wire format
//!
//! ```text
//! byte 0:     command  (1 = Connect, 2 = Associate, 3 = Mux)
//! bytes 1..N: address  (atype, address, big-endian port)
//! ```
//!
//! ## Architecture
//!
//! - **ConnSession** trait — read/write/close/set_meter/request capability set
//! - **Session** — buffered session over any `AsyncRead + AsyncWrite` transport
//! - **TrafficMeter** trait — per-credential usage sink (`EmptyTrafficMeter` by default)
//! - **Request** / **Address** — header types and codec

pub mod address;
pub mod config;
pub mod error;
pub mod meter;
pub mod session;
pub mod types;

// Re-export core types
pub use address::Address;
pub use config::{SessionConfig, LOCAL_USER};
pub use error::{AddressError, Result, SessionError};
pub use meter::{
    human_friendly_traffic, EmptyTrafficMeter, MemoryTrafficMeter, TrafficMeter, TrafficStats,
};
pub use session::{ConnSession, Session};
pub use types::{Command, Network, Request};
