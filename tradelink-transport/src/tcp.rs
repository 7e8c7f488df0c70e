/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! TCP transport.

use crate::transport::Transport;
use async_trait::async_trait;
use bytes::BytesMut;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::{debug, info};
use tradelink_core::error::TransportError;

/// Transport over a tokio `TcpStream` with Nagle disabled.
#[derive(Debug, Default)]
pub struct TcpTransport {
    stream: Option<TcpStream>,
}

impl TcpTransport {
    /// Creates an unconnected transport.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps an already connected stream.
    ///
    /// # Errors
    /// Returns `TransportError::Io` if `TCP_NODELAY` cannot be set.
    pub fn from_stream(stream: TcpStream) -> Result<Self, TransportError> {
        stream.set_nodelay(true)?;
        Ok(Self {
            stream: Some(stream),
        })
    }

    fn stream_mut(&mut self) -> Result<&mut TcpStream, TransportError> {
        self.stream.as_mut().ok_or(TransportError::NotConnected)
    }
}

#[async_trait]
impl Transport for TcpTransport {
    async fn connect(&mut self, addr: &str, timeout: Duration) -> Result<(), TransportError> {
        info!(addr, "connecting");

        let stream = tokio::time::timeout(timeout, TcpStream::connect(addr))
            .await
            .map_err(|_| TransportError::ConnectTimeout {
                addr: addr.to_string(),
                timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
            })?
            .map_err(|e| TransportError::Connect {
                addr: addr.to_string(),
                reason: e.to_string(),
            })?;
        stream.set_nodelay(true)?;
        self.stream = Some(stream);

        info!(addr, "connected");
        Ok(())
    }

    async fn send(&mut self, data: &[u8]) -> Result<usize, TransportError> {
        let stream = self.stream_mut()?;
        let written = stream.write(data).await?;
        if written == 0 && !data.is_empty() {
            return Err(TransportError::ConnectionClosed);
        }
        debug!(bytes = written, "sent");
        Ok(written)
    }

    // `read_buf` is cancel safe: bytes land in `buf` or stay in the socket.
    async fn recv(&mut self, buf: &mut BytesMut) -> Result<usize, TransportError> {
        let stream = self.stream_mut()?;
        let read = stream.read_buf(buf).await?;
        debug!(bytes = read, "received");
        Ok(read)
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        if let Some(mut stream) = self.stream.take() {
            stream.shutdown().await?;
            info!("connection closed");
        }
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.stream.is_some()
    }
}
