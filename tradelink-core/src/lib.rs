/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! # TradeLink Core
//!
//! Core types, message model, and error definitions for the TradeLink
//! session engine.
//!
//! This crate provides the building blocks used across all TradeLink crates:
//! - **Error types**: Layered error taxonomy with `thiserror`
//! - **Message model**: `MsgType`, payload structs, `Message`, and the wire-level `Envelope`
//! - **Core types**: `ClientOrderId`, `InstrumentId`, `Side`, `ExecType`

pub mod error;
pub mod message;
pub mod types;

pub use error::{
    DecodeError, DispatchError, EncodeError, FrameError, HandlerError, Result, SessionError,
    TradeLinkError, TransportError,
};
pub use message::{
    Envelope, ExecutionReport, Heartbeat, Logon, LogonReply, Logout, Message, MsgType, NewOrder,
};
pub use types::{ClientOrderId, ExecType, InstrumentId, Side};
