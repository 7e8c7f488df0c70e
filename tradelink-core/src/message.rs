/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Message model for the trading protocol.
//!
//! This module provides:
//! - [`MsgType`]: The message discriminant
//! - Payload structs, one per message kind
//! - [`Message`]: Typed union where discriminant and payload always agree
//! - [`Envelope`]: Wire-level view with a raw discriminant and optional payloads

use crate::error::{DecodeError, EncodeError};
use crate::types::{ClientOrderId, ExecType, InstrumentId, Side};
use num_derive::{FromPrimitive, ToPrimitive};
use num_traits::FromPrimitive;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Message discriminant. Values are the wire enum values.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, FromPrimitive, ToPrimitive,
)]
#[repr(i32)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MsgType {
    /// Logon request (client to counterparty).
    Logon = 0,
    /// Logon reply (counterparty to client).
    LogonReply = 1,
    /// Logout, either direction.
    Logout = 2,
    /// Heartbeat, either direction.
    Heartbeat = 3,
    /// New order (client to counterparty).
    NewOrder = 4,
    /// Execution report (counterparty to client).
    ExecutionReport = 5,
}

impl MsgType {
    /// Creates a message type from its wire value.
    #[must_use]
    pub fn from_wire(value: i32) -> Option<Self> {
        Self::from_i32(value)
    }

    /// Returns the wire value.
    #[inline]
    #[must_use]
    pub const fn as_wire(self) -> i32 {
        self as i32
    }

    /// Returns true for session-level messages.
    #[must_use]
    pub const fn is_session_level(self) -> bool {
        matches!(
            self,
            Self::Logon | Self::LogonReply | Self::Logout | Self::Heartbeat
        )
    }

    /// Returns the envelope field name that carries this type's payload.
    #[must_use]
    pub const fn payload_field(self) -> &'static str {
        match self {
            Self::Logon => "logon_msg",
            Self::LogonReply => "logon_reply_msg",
            Self::Logout => "logout_msg",
            Self::Heartbeat => "heartbeat_msg",
            Self::NewOrder => "new_order_msg",
            Self::ExecutionReport => "execution_report_msg",
        }
    }

    /// Returns the protocol name of this type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Logon => "LOGON",
            Self::LogonReply => "LOGON_REPLY",
            Self::Logout => "LOGOUT",
            Self::Heartbeat => "HEARTBEAT",
            Self::NewOrder => "NEW_ORDER",
            Self::ExecutionReport => "EXECUTION_REPORT",
        }
    }
}

impl fmt::Display for MsgType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Logon request.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Logon {
    /// Account user name.
    pub user_name: String,
    /// Account password.
    pub password: String,
}

impl Logon {
    /// Creates a new logon request.
    #[must_use]
    pub fn new(user_name: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            user_name: user_name.into(),
            password: password.into(),
        }
    }
}

/// Logon reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LogonReply {
    /// Zero when the logon is accepted.
    pub reject_code: u32,
}

impl LogonReply {
    /// Creates an accepting logon reply.
    #[must_use]
    pub const fn accepted() -> Self {
        Self { reject_code: 0 }
    }

    /// Creates a rejecting logon reply.
    #[must_use]
    pub const fn rejected(reject_code: u32) -> Self {
        Self { reject_code }
    }

    /// Returns true if the logon was accepted.
    #[must_use]
    pub const fn is_accepted(&self) -> bool {
        self.reject_code == 0
    }
}

/// Logout. Empty body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Logout;

/// Heartbeat. Empty body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Heartbeat;

/// New limit order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NewOrder {
    /// Limit price.
    pub limit_price: f64,
    /// Order quantity.
    pub order_quantity: u32,
    /// Order side.
    pub side: Side,
    /// Instrument to trade.
    pub instrument_id: InstrumentId,
    /// Client-assigned order id.
    pub client_order_id: ClientOrderId,
}

/// Execution report for a previously sent order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExecutionReport {
    /// Client order id of the order this report refers to.
    pub client_order_id: ClientOrderId,
    /// Instrument of the order.
    pub instrument_id: InstrumentId,
    /// Kind of execution event.
    pub exec_type: ExecType,
    /// Quantity executed by this event.
    pub last_quantity: u32,
    /// Price of this execution.
    pub last_price: f64,
    /// Quantity still working.
    pub leaves_quantity: u32,
}

/// A protocol message whose discriminant always matches its payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Message {
    /// Logon request.
    Logon(Logon),
    /// Logon reply.
    LogonReply(LogonReply),
    /// Logout.
    Logout(Logout),
    /// Heartbeat.
    Heartbeat(Heartbeat),
    /// New order.
    NewOrder(NewOrder),
    /// Execution report.
    ExecutionReport(ExecutionReport),
}

impl Message {
    /// Returns the discriminant of this message.
    #[must_use]
    pub const fn msg_type(&self) -> MsgType {
        match self {
            Self::Logon(_) => MsgType::Logon,
            Self::LogonReply(_) => MsgType::LogonReply,
            Self::Logout(_) => MsgType::Logout,
            Self::Heartbeat(_) => MsgType::Heartbeat,
            Self::NewOrder(_) => MsgType::NewOrder,
            Self::ExecutionReport(_) => MsgType::ExecutionReport,
        }
    }
}

impl From<Logon> for Message {
    fn from(msg: Logon) -> Self {
        Self::Logon(msg)
    }
}

impl From<LogonReply> for Message {
    fn from(msg: LogonReply) -> Self {
        Self::LogonReply(msg)
    }
}

impl From<Logout> for Message {
    fn from(msg: Logout) -> Self {
        Self::Logout(msg)
    }
}

impl From<Heartbeat> for Message {
    fn from(msg: Heartbeat) -> Self {
        Self::Heartbeat(msg)
    }
}

impl From<NewOrder> for Message {
    fn from(msg: NewOrder) -> Self {
        Self::NewOrder(msg)
    }
}

impl From<ExecutionReport> for Message {
    fn from(msg: ExecutionReport) -> Self {
        Self::ExecutionReport(msg)
    }
}

/// Wire-level message envelope.
///
/// Mirrors the serialized form: a raw discriminant plus one optional slot per
/// payload kind. An envelope read off the wire may be inconsistent (unknown
/// discriminant, missing payload); [`Envelope::into_message`] and
/// [`Envelope::validate`] check it.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Envelope {
    /// Raw discriminant.
    pub msg_type: i32,
    /// Logon payload.
    pub logon: Option<Logon>,
    /// Logon reply payload.
    pub logon_reply: Option<LogonReply>,
    /// Logout payload.
    pub logout: Option<Logout>,
    /// Heartbeat payload.
    pub heartbeat: Option<Heartbeat>,
    /// New order payload.
    pub new_order: Option<NewOrder>,
    /// Execution report payload.
    pub execution_report: Option<ExecutionReport>,
}

impl Envelope {
    /// Creates an empty envelope with the given raw discriminant.
    #[must_use]
    pub fn with_type(msg_type: i32) -> Self {
        Self {
            msg_type,
            ..Self::default()
        }
    }

    /// Returns the discriminant if it names a known message type.
    #[must_use]
    pub fn known_type(&self) -> Option<MsgType> {
        MsgType::from_wire(self.msg_type)
    }

    /// Returns the number of payload slots that are set.
    #[must_use]
    pub fn payload_count(&self) -> usize {
        [
            self.logon.is_some(),
            self.logon_reply.is_some(),
            self.logout.is_some(),
            self.heartbeat.is_some(),
            self.new_order.is_some(),
            self.execution_report.is_some(),
        ]
        .into_iter()
        .filter(|set| *set)
        .count()
    }

    /// Returns true if the payload slot for `msg_type` is set.
    #[must_use]
    pub const fn has_payload(&self, msg_type: MsgType) -> bool {
        match msg_type {
            MsgType::Logon => self.logon.is_some(),
            MsgType::LogonReply => self.logon_reply.is_some(),
            MsgType::Logout => self.logout.is_some(),
            MsgType::Heartbeat => self.heartbeat.is_some(),
            MsgType::NewOrder => self.new_order.is_some(),
            MsgType::ExecutionReport => self.execution_report.is_some(),
        }
    }

    /// Checks that the envelope can be transmitted.
    ///
    /// # Errors
    /// Returns `EncodeError` if the discriminant is unknown, its payload is
    /// absent, or more than one payload is set.
    pub fn validate(&self) -> Result<MsgType, EncodeError> {
        let msg_type = self
            .known_type()
            .ok_or(EncodeError::UnknownMessageType(self.msg_type))?;
        if !self.has_payload(msg_type) {
            return Err(EncodeError::MissingPayload {
                msg_type,
                field: msg_type.payload_field(),
            });
        }
        let count = self.payload_count();
        if count != 1 {
            return Err(EncodeError::MultiplePayloads { count });
        }
        Ok(msg_type)
    }

    /// Converts the envelope into a typed message.
    ///
    /// Payloads other than the one named by the discriminant are ignored.
    ///
    /// # Errors
    /// Returns `DecodeError` if the discriminant is unknown or its payload is
    /// absent.
    pub fn into_message(self) -> Result<Message, DecodeError> {
        let msg_type = self
            .known_type()
            .ok_or(DecodeError::UnknownMessageType(self.msg_type))?;
        let missing = || DecodeError::MissingPayload {
            msg_type,
            field: msg_type.payload_field(),
        };
        let message = match msg_type {
            MsgType::Logon => Message::Logon(self.logon.ok_or_else(missing)?),
            MsgType::LogonReply => Message::LogonReply(self.logon_reply.ok_or_else(missing)?),
            MsgType::Logout => Message::Logout(self.logout.ok_or_else(missing)?),
            MsgType::Heartbeat => Message::Heartbeat(self.heartbeat.ok_or_else(missing)?),
            MsgType::NewOrder => Message::NewOrder(self.new_order.ok_or_else(missing)?),
            MsgType::ExecutionReport => {
                Message::ExecutionReport(self.execution_report.ok_or_else(missing)?)
            }
        };
        Ok(message)
    }
}

impl From<Message> for Envelope {
    fn from(message: Message) -> Self {
        let mut envelope = Self::with_type(message.msg_type().as_wire());
        match message {
            Message::Logon(m) => envelope.logon = Some(m),
            Message::LogonReply(m) => envelope.logon_reply = Some(m),
            Message::Logout(m) => envelope.logout = Some(m),
            Message::Heartbeat(m) => envelope.heartbeat = Some(m),
            Message::NewOrder(m) => envelope.new_order = Some(m),
            Message::ExecutionReport(m) => envelope.execution_report = Some(m),
        }
        envelope
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_order() -> NewOrder {
        NewOrder {
            limit_price: 100.5,
            order_quantity: 10,
            side: Side::Buy,
            instrument_id: InstrumentId::new(42),
            client_order_id: ClientOrderId::new(1),
        }
    }

    #[test]
    fn test_msg_type_wire_values() {
        assert_eq!(MsgType::Logon.as_wire(), 0);
        assert_eq!(MsgType::ExecutionReport.as_wire(), 5);
        assert_eq!(MsgType::from_wire(2), Some(MsgType::Logout));
        assert_eq!(MsgType::from_wire(99), None);
    }

    #[test]
    fn test_msg_type_session_level() {
        assert!(MsgType::Heartbeat.is_session_level());
        assert!(!MsgType::NewOrder.is_session_level());
    }

    #[test]
    fn test_envelope_from_message() {
        let envelope = Envelope::from(Message::NewOrder(sample_order()));
        assert_eq!(envelope.msg_type, MsgType::NewOrder.as_wire());
        assert_eq!(envelope.payload_count(), 1);
        assert_eq!(envelope.validate(), Ok(MsgType::NewOrder));
    }

    #[test]
    fn test_envelope_into_message() {
        let message = Message::from(sample_order());
        let envelope = Envelope::from(message.clone());
        assert_eq!(envelope.into_message(), Ok(message));
    }

    #[test]
    fn test_envelope_missing_payload() {
        let envelope = Envelope::with_type(MsgType::Heartbeat.as_wire());
        assert_eq!(
            envelope.validate(),
            Err(EncodeError::MissingPayload {
                msg_type: MsgType::Heartbeat,
                field: "heartbeat_msg",
            })
        );
        assert!(matches!(
            envelope.into_message(),
            Err(DecodeError::MissingPayload { .. })
        ));
    }

    #[test]
    fn test_envelope_multiple_payloads() {
        let mut envelope = Envelope::from(Message::Heartbeat(Heartbeat));
        envelope.logout = Some(Logout);
        assert_eq!(
            envelope.validate(),
            Err(EncodeError::MultiplePayloads { count: 2 })
        );
    }

    #[test]
    fn test_envelope_unknown_type() {
        let envelope = Envelope::with_type(99);
        assert_eq!(envelope.known_type(), None);
        assert_eq!(
            envelope.into_message(),
            Err(DecodeError::UnknownMessageType(99))
        );
    }

    #[test]
    fn test_logon_reply_accepted() {
        assert!(LogonReply::accepted().is_accepted());
        assert!(!LogonReply::rejected(3).is_accepted());
    }
}
