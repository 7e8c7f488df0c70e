/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! # TradeLink
//!
//! Client session layer for a length-prefixed binary trading protocol.
//!
//! TradeLink connects to a trading gateway over TCP, logs on, keeps the link
//! alive with heartbeats, sends limit orders, and delivers execution reports
//! to an application callback.
//!
//! ## Features
//!
//! - **Poll-driven core**: The session engine performs no I/O of its own
//! - **Table dispatch**: Inbound messages are routed by wire discriminant
//! - **Bounded framing**: Oversized frames are skipped without losing sync
//! - **Async driver**: Built on Tokio, controlled through a cloneable handle
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use tradelink::prelude::*;
//!
//! let (handle, task) = ClientBuilder::new()
//!     .with_application(MyApplication)
//!     .with_address("127.0.0.1:5001")
//!     .with_config(SessionConfig::new("trader", "secret"))
//!     .spawn()?;
//!
//! handle.wait_for_logon().await?;
//! let id = handle
//!     .send_new_order(100.5, 10, Side::Buy, InstrumentId::new(42))
//!     .await?;
//! ```
//!
//! ## Crate Organization
//!
//! - [`core`]: Message types, identifiers, and error definitions
//! - [`wire`]: Envelope encoding and decoding
//! - [`session`]: State machine, heartbeats, and configuration
//! - [`transport`]: Frame codec and network transport
//! - [`engine`]: Session engine, dispatcher, and async driver

pub mod core {
    //! Message types, identifiers, and error definitions.
    pub use tradelink_core::*;
}

pub mod wire {
    //! Envelope encoding and decoding.
    pub use tradelink_wire::*;
}

pub mod session {
    //! State machine, heartbeats, and configuration.
    pub use tradelink_session::*;
}

pub mod transport {
    //! Frame codec and network transport.
    pub use tradelink_transport::*;
}

pub mod engine {
    //! Session engine, dispatcher, and async driver.
    pub use tradelink_engine::*;
}

/// Prelude module for convenient imports.
pub mod prelude {
    // Core types
    pub use tradelink_core::{
        ClientOrderId, DecodeError, DispatchError, EncodeError, Envelope, ExecType,
        ExecutionReport, FrameError, HandlerError, Heartbeat, InstrumentId, Logon, LogonReply,
        Logout, Message, MsgType, NewOrder, Result, SessionError, Side, TradeLinkError,
        TransportError,
    };

    // Wire encoding
    pub use tradelink_wire::{decode_envelope, encode_envelope};

    // Session
    pub use tradelink_session::{
        Clock, HeartbeatScheduler, ManualClock, SessionConfig, SessionConfigBuilder,
        SessionState, SystemClock,
    };

    // Transport
    pub use tradelink_transport::{ByteOrder, Frame, FrameCodec, TcpTransport, Transport};

    // Engine
    pub use tradelink_engine::{
        Application, ClientBuilder, CloseReason, NoOpApplication, SessionDriver, SessionEngine,
        SessionHandle,
    };
}

#[cfg(test)]
mod tests {
    use super::prelude::*;

    #[test]
    fn test_prelude_imports() {
        let _id = ClientOrderId::new(1);
        let _side = Side::Buy;
        let _state = SessionState::Disconnected;
    }

    #[test]
    fn test_heartbeat_frame() {
        let codec = FrameCodec::new();
        let bytes = codec.encode_message(&Message::Heartbeat(Heartbeat)).unwrap();
        assert_eq!(&bytes[..], &[4, 0, 0, 0, 0x08, 0x03, 0x2A, 0x00]);
    }
}
