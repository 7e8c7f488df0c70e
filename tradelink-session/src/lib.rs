/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! # TradeLink Session
//!
//! Session layer building blocks for the TradeLink engine.
//!
//! This crate provides:
//! - **State machine**: Session lifecycle with validated transitions
//! - **Heartbeat scheduling**: Outbound idle detection
//! - **Order ids**: Per-session client order id allocation
//! - **Clock**: Injectable time source
//! - **Configuration**: Session configuration options

pub mod clock;
pub mod config;
pub mod heartbeat;
pub mod order_id;
pub mod state;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{SessionConfig, SessionConfigBuilder};
pub use heartbeat::{DEFAULT_HEARTBEAT_INTERVAL, HeartbeatScheduler};
pub use order_id::OrderIdGenerator;
pub use state::{SessionEvent, SessionState, SessionStateMachine};
