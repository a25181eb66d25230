//! Simple-socks connection sessions
//!
//! A `Session` wraps one mux sub-stream. The side that opens the sub-stream
//! announces its request (`Session::outbound`); the side that accepts it only
//! reads that request (`Session::inbound`). After the header exchange the
//! session relays bytes unchanged while counting them, and reports the totals
//! to its `TrafficMeter` when closed.

use std::fmt;
use std::io;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufStream};

use crate::config::SessionConfig;
use crate::error::{Result, SessionError};
use crate::meter::{human_friendly_traffic, EmptyTrafficMeter, TrafficMeter};
use crate::types::Request;

/// Capability set of an established connection session
///
/// Calls must come from a single flow of control; `&mut self` enforces
/// that for owned sessions.
#[async_trait]
pub trait ConnSession: Send {
    /// Read relayed bytes. Short reads are returned as-is.
    async fn read(&mut self, buf: &mut [u8]) -> io::Result<usize>;

    /// Write relayed bytes and flush them to the transport.
    async fn write(&mut self, buf: &[u8]) -> io::Result<usize>;

    /// Report traffic, then shut down and release the transport.
    ///
    /// Only the first call has any effect; later calls return `Ok(())`.
    /// Reads and writes after close fail with `NotConnected`.
    async fn close(&mut self) -> io::Result<()>;

    /// Replace the traffic meter reported to at close
    fn set_meter(&mut self, meter: Arc<dyn TrafficMeter>);

    /// The request this session was established for
    fn request(&self) -> &Request;
}

/// A simple-socks session over transport `S`
pub struct Session<S> {
    id: String,
    request: Request,
    stream: Option<BufStream<S>>,
    credential: String,
    meter: Arc<dyn TrafficMeter>,
    sent: u64,
    recv: u64,
}

impl<S> Session<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    /// Accept a sub-stream: parse the peer's request header.
    ///
    /// `credential` is the metering key of the authenticated peer.
    pub async fn inbound(conn: S, credential: impl Into<String>) -> Result<Self> {
        Self::inbound_with_config(conn, credential, &SessionConfig::default()).await
    }

    /// Like [`Session::inbound`], with explicit configuration
    pub async fn inbound_with_config(
        conn: S,
        credential: impl Into<String>,
        config: &SessionConfig,
    ) -> Result<Self> {
        config.validate()?;
        let mut stream = BufStream::with_capacity(config.buffer_size, config.buffer_size, conn);
        let request = Request::read_from(&mut stream).await?;

        let session = Self::established(request, stream, credential.into());
        tracing::debug!(
            session = %session.id,
            command = ?session.request.command(),
            request = %session.request,
            "Mux request parsed"
        );
        Ok(session)
    }

    /// Open a sub-stream: write `request` as the header and flush it.
    ///
    /// Outbound sessions are metered under the local-origin credential.
    pub async fn outbound(request: Request, conn: S) -> Result<Self> {
        Self::outbound_with_config(request, conn, &SessionConfig::default()).await
    }

    /// Like [`Session::outbound`], with explicit configuration
    pub async fn outbound_with_config(
        request: Request,
        conn: S,
        config: &SessionConfig,
    ) -> Result<Self> {
        config.validate()?;
        let mut stream = BufStream::with_capacity(config.buffer_size, config.buffer_size, conn);
        request.write_to(&mut stream).await?;
        stream.flush().await.map_err(SessionError::Flush)?;

        let session = Self::established(request, stream, config.local_user.clone());
        tracing::debug!(
            session = %session.id,
            command = ?session.request.command(),
            request = %session.request,
            "Mux request written"
        );
        Ok(session)
    }

    fn established(request: Request, stream: BufStream<S>, credential: String) -> Self {
        Self {
            id: format!("sess-{}", uuid::Uuid::new_v4()),
            request,
            stream: Some(stream),
            credential,
            meter: Arc::new(EmptyTrafficMeter),
            sent: 0,
            recv: 0,
        }
    }
}

impl<S> Session<S> {
    /// Log correlation id (`sess-<uuid>`)
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Metering key this session reports under
    pub fn credential(&self) -> &str {
        &self.credential
    }

    /// Bytes written so far
    pub fn sent(&self) -> u64 {
        self.sent
    }

    /// Bytes read so far
    pub fn recv(&self) -> u64 {
        self.recv
    }

    /// Whether `close` has run and the transport is released
    pub fn is_closed(&self) -> bool {
        self.stream.is_none()
    }
}

fn not_connected() -> io::Error {
    io::Error::new(io::ErrorKind::NotConnected, "session closed")
}

#[async_trait]
impl<S> ConnSession for Session<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    async fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let stream = self.stream.as_mut().ok_or_else(not_connected)?;
        let n = stream.read(buf).await?;
        self.recv += n as u64;
        Ok(n)
    }

    async fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let stream = self.stream.as_mut().ok_or_else(not_connected)?;
        let n = stream.write(buf).await?;
        self.sent += n as u64;
        stream.flush().await?;
        Ok(n)
    }

    async fn close(&mut self) -> io::Result<()> {
        let Some(mut stream) = self.stream.take() else {
            return Ok(());
        };

        self.meter.count(&self.credential, self.sent, self.recv).await;
        tracing::info!(
            session = %self.id,
            request = %self.request,
            sent = %human_friendly_traffic(self.sent),
            recv = %human_friendly_traffic(self.recv),
            "Mux connection closed"
        );

        let result = stream.shutdown().await;
        if let Err(e) = &result {
            tracing::warn!(session = %self.id, error = %e, "Failed to shut down transport");
        }
        result
    }

    fn set_meter(&mut self, meter: Arc<dyn TrafficMeter>) {
        self.meter = meter;
    }

    fn request(&self) -> &Request {
        &self.request
    }
}

impl<S> fmt::Debug for Session<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("request", &self.request)
            .field("sent", &self.sent)
            .field("recv", &self.recv)
            .field("closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}
