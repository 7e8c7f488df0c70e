/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Error types for the TradeLink session engine.
//!
//! Errors fall into three groups:
//! - **Per-message** ([`DecodeError`], [`FrameError::FrameTooLarge`], [`DispatchError`]):
//!   recoverable, the offending message is logged and dropped.
//! - **Caller misuse** ([`SessionError`], [`EncodeError`]): returned synchronously,
//!   nothing is transmitted.
//! - **Transport** ([`TransportError`]): fatal to the session.

use crate::message::MsgType;
use thiserror::Error;

/// Result type alias using [`TradeLinkError`] as the error type.
pub type Result<T> = std::result::Result<T, TradeLinkError>;

/// Top-level error type for all TradeLink operations.
#[derive(Debug, Error)]
pub enum TradeLinkError {
    /// Error while decoding an inbound envelope.
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    /// Error while encoding an outbound envelope.
    #[error("encode error: {0}")]
    Encode(#[from] EncodeError),

    /// Error while framing or deframing the byte stream.
    #[error("frame error: {0}")]
    Frame(#[from] FrameError),

    /// Error while routing an inbound message.
    #[error("dispatch error: {0}")]
    Dispatch(#[from] DispatchError),

    /// Error in session layer operations.
    #[error("session error: {0}")]
    Session(#[from] SessionError),

    /// Error from the underlying transport.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// An application handler failed in an unexpected way.
    ///
    /// Unlike [`HandlerError::Rejected`], this is surfaced to the caller of
    /// the drive loop instead of being logged and dropped.
    #[error("handler fault while processing {msg_type}: {reason}")]
    HandlerFault {
        /// Message type being handled.
        msg_type: MsgType,
        /// Description of the fault.
        reason: String,
    },
}

impl TradeLinkError {
    /// Returns true if the error ends the session.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::HandlerFault { .. })
    }
}

/// Errors that occur while decoding an envelope from a frame payload.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// Payload is not a well-formed protocol-buffers envelope.
    #[error("protobuf decode error: {0}")]
    Protobuf(#[from] prost::DecodeError),

    /// Enum field carries a value with no matching variant.
    #[error("invalid value {value} for enum field {field}")]
    InvalidEnumValue {
        /// Field name.
        field: &'static str,
        /// Raw decoded value.
        value: i32,
    },

    /// Required field is absent.
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// Discriminant does not name a known message type.
    #[error("unknown message type: {0}")]
    UnknownMessageType(i32),

    /// Discriminant is known but its payload is absent.
    #[error("message type {msg_type} has no {field} payload")]
    MissingPayload {
        /// Declared message type.
        msg_type: MsgType,
        /// Expected payload field name.
        field: &'static str,
    },
}

/// Errors that occur while encoding an envelope.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EncodeError {
    /// Output buffer could not hold the envelope.
    #[error("protobuf encode error: {0}")]
    Protobuf(#[from] prost::EncodeError),

    /// Discriminant does not name a known message type.
    #[error("unknown message type: {0}")]
    UnknownMessageType(i32),

    /// Declared message type has no payload set.
    #[error("message type {msg_type} has no {field} payload")]
    MissingPayload {
        /// Declared message type.
        msg_type: MsgType,
        /// Expected payload field name.
        field: &'static str,
    },

    /// More than one payload is set.
    #[error("envelope carries {count} payloads, expected exactly one")]
    MultiplePayloads {
        /// Number of payloads present.
        count: usize,
    },
}

/// Errors that occur while framing the byte stream.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FrameError {
    /// Length prefix exceeds the configured maximum.
    #[error("frame too large: {size} bytes exceeds maximum {max_size}")]
    FrameTooLarge {
        /// Declared or actual payload size.
        size: usize,
        /// Maximum allowed payload size.
        max_size: usize,
    },

    /// Envelope could not be encoded.
    #[error("encode error: {0}")]
    Encode(#[from] EncodeError),

    /// I/O error surfaced through a codec.
    #[error("io error: {0}")]
    Io(String),
}

impl From<std::io::Error> for FrameError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

/// Errors reported by the message dispatcher.
///
/// All variants are per-message: the message is dropped and the session
/// continues, except a [`HandlerError::Fault`] which the engine escalates.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DispatchError {
    /// No route is registered for the discriminant.
    #[error("unknown message type: {0}")]
    UnknownMessageType(i32),

    /// Route found but the payload does not match the discriminant.
    #[error("malformed {msg_type} message: {reason}")]
    MalformedMessage {
        /// Declared message type.
        msg_type: MsgType,
        /// Why the payload was rejected.
        reason: String,
    },

    /// Handler returned an error.
    #[error("handler error for {msg_type}: {source}")]
    Handler {
        /// Message type being handled.
        msg_type: MsgType,
        /// Error returned by the handler.
        source: HandlerError,
    },
}

/// Errors returned by application handlers.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HandlerError {
    /// The handler refused the message. Logged and dropped.
    #[error("rejected: {0}")]
    Rejected(String),

    /// The handler hit an unexpected condition. Surfaced to the caller.
    #[error("fault: {0}")]
    Fault(String),
}

impl HandlerError {
    /// Returns true for unexpected faults.
    #[must_use]
    pub const fn is_fault(&self) -> bool {
        matches!(self, Self::Fault(_))
    }
}

/// Errors in session layer operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// Trade message attempted while not logged on.
    #[error("not logged on: session is {state}")]
    NotLoggedOn {
        /// Current session state.
        state: String,
    },

    /// Event not allowed in the current state.
    #[error("invalid transition: {event} in state {state}")]
    InvalidTransition {
        /// Current session state.
        state: String,
        /// Rejected event.
        event: String,
    },

    /// Order parameters rejected before transmission.
    #[error("invalid order: {0}")]
    InvalidOrder(String),

    /// Every client order id of this session has been used.
    #[error("client order ids exhausted")]
    OrderIdExhausted,

    /// Session is closed.
    #[error("session closed")]
    Closed,

    /// Session configuration error.
    #[error("configuration error: {0}")]
    Configuration(String),
}

/// Errors from the transport boundary. Always fatal to the session.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// Connection attempt failed.
    #[error("connect to {addr} failed: {reason}")]
    Connect {
        /// Remote address.
        addr: String,
        /// Failure description.
        reason: String,
    },

    /// Connection attempt did not complete in time.
    #[error("connect to {addr} timed out after {timeout_ms} milliseconds")]
    ConnectTimeout {
        /// Remote address.
        addr: String,
        /// Timeout in milliseconds.
        timeout_ms: u64,
    },

    /// Operation requires an open connection.
    #[error("not connected")]
    NotConnected,

    /// Peer closed the connection.
    #[error("connection closed by peer")]
    ConnectionClosed,

    /// I/O error on the stream.
    #[error("io error: {0}")]
    Io(String),
}

impl From<std::io::Error> for TransportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_error_display() {
        let err = FrameError::FrameTooLarge {
            size: 2048,
            max_size: 1024,
        };
        assert_eq!(
            err.to_string(),
            "frame too large: 2048 bytes exceeds maximum 1024"
        );
    }

    #[test]
    fn test_error_from_session() {
        let err: TradeLinkError = SessionError::OrderIdExhausted.into();
        assert!(matches!(
            err,
            TradeLinkError::Session(SessionError::OrderIdExhausted)
        ));
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_transport_error_is_fatal() {
        let err: TradeLinkError = TransportError::ConnectionClosed.into();
        assert!(err.is_fatal());
    }

    #[test]
    fn test_dispatch_error_display() {
        let err = DispatchError::Handler {
            msg_type: MsgType::ExecutionReport,
            source: HandlerError::Rejected("unknown order".to_string()),
        };
        assert_eq!(
            err.to_string(),
            "handler error for EXECUTION_REPORT: rejected: unknown order"
        );
    }

    #[test]
    fn test_handler_error_is_fault() {
        assert!(HandlerError::Fault("boom".to_string()).is_fault());
        assert!(!HandlerError::Rejected("no".to_string()).is_fault());
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset");
        let err: TransportError = io.into();
        assert_eq!(err, TransportError::Io("reset".to_string()));
    }
}
