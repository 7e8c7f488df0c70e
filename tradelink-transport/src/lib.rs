/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! # TradeLink Transport
//!
//! Network transport layer for the TradeLink session engine.
//!
//! This crate provides:
//! - **Codec**: Length-prefixed framing with partial-read reassembly
//! - **Transport trait**: The byte-stream boundary the engine drives
//! - **TCP transport**: tokio `TcpStream` implementation

pub mod codec;
pub mod tcp;
pub mod transport;

pub use codec::{ByteOrder, DEFAULT_MAX_FRAME_SIZE, Frame, FrameCodec, LENGTH_PREFIX_LEN};
pub use tcp::TcpTransport;
pub use transport::Transport;
