/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Transport trait definition.
//!
//! This module defines the byte-stream boundary the session engine drives.
//! Implementations move opaque bytes and never interpret frames.

use async_trait::async_trait;
use bytes::BytesMut;
use std::time::Duration;
use tradelink_core::error::TransportError;

/// Abstract byte-stream transport.
///
/// A transport never promises whole-frame delivery: `recv` may return any
/// slice of the stream and `send` may accept only part of the input.
#[async_trait]
pub trait Transport: Send {
    /// Opens a connection to `addr`.
    ///
    /// # Arguments
    /// * `addr` - Remote address in `host:port` form
    /// * `timeout` - Maximum time to wait for the connection
    ///
    /// # Errors
    /// Returns `TransportError` if the connection cannot be established.
    async fn connect(&mut self, addr: &str, timeout: Duration) -> Result<(), TransportError>;

    /// Writes bytes to the stream.
    ///
    /// # Returns
    /// The number of bytes accepted, which may be less than `data.len()`.
    ///
    /// # Errors
    /// Returns `TransportError` if the stream is not connected or fails.
    async fn send(&mut self, data: &[u8]) -> Result<usize, TransportError>;

    /// Reads available bytes, appending them to `buf`.
    ///
    /// # Returns
    /// The number of bytes read. Zero means the peer closed the stream.
    ///
    /// # Errors
    /// Returns `TransportError` if the stream is not connected or fails.
    ///
    /// # Cancel safety
    /// The driver polls this inside `tokio::select!` and drops the future
    /// whenever another branch wins. Implementations must be cancel safe: no
    /// bytes may be consumed from the stream unless they are appended to
    /// `buf` before the future resolves.
    async fn recv(&mut self, buf: &mut BytesMut) -> Result<usize, TransportError>;

    /// Closes the connection. Closing an unconnected transport is a no-op.
    ///
    /// # Errors
    /// Returns `TransportError` if the shutdown fails.
    async fn close(&mut self) -> Result<(), TransportError>;

    /// Returns true if a connection is open.
    fn is_connected(&self) -> bool;
}
