/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! # TradeLink Engine
//!
//! Client session engine for the TradeLink protocol implementation.
//!
//! This crate provides:
//! - **SessionEngine**: Poll-driven session core with no I/O of its own
//! - **MessageDispatcher**: Table-driven routing of inbound messages
//! - **SessionDriver**: Async task that runs an engine over a transport
//! - **Application trait**: Callback interface for session events
//! - **Builder API**: Fluent configuration for client setup

pub mod application;
pub mod builder;
pub mod dispatcher;
pub mod driver;
pub mod engine;

pub use application::{Application, CloseReason, NoOpApplication};
pub use builder::ClientBuilder;
pub use dispatcher::{DispatchStats, InboundHandler, MessageDispatcher};
pub use driver::{SessionCommand, SessionDriver, SessionHandle};
pub use engine::{PollSummary, SessionEngine};
