/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Envelope serialization.
//!
//! Converts between the domain [`Envelope`]/[`Message`] model and the
//! generated [`proto::OneMessage`] schema, and runs them through `prost`.

use crate::proto;
use bytes::BytesMut;
use prost::Message as _;
use tradelink_core::error::{DecodeError, EncodeError};
use tradelink_core::message::{
    Envelope, ExecutionReport, Heartbeat, Logon, LogonReply, Logout, Message, NewOrder,
};
use tradelink_core::types::{ClientOrderId, ExecType, InstrumentId, Side};

impl From<&Logon> for proto::Logon {
    fn from(logon: &Logon) -> Self {
        Self {
            user_name: logon.user_name.clone(),
            password: logon.password.clone(),
        }
    }
}

impl From<proto::Logon> for Logon {
    fn from(logon: proto::Logon) -> Self {
        Self::new(logon.user_name, logon.password)
    }
}

impl From<&LogonReply> for proto::LogonReply {
    fn from(reply: &LogonReply) -> Self {
        Self {
            reject_code: reply.reject_code,
        }
    }
}

impl From<proto::LogonReply> for LogonReply {
    fn from(reply: proto::LogonReply) -> Self {
        Self {
            reject_code: reply.reject_code,
        }
    }
}

impl From<&NewOrder> for proto::NewOrder {
    fn from(order: &NewOrder) -> Self {
        Self {
            limit_price: order.limit_price,
            order_quantity: order.order_quantity,
            side: order.side.as_wire(),
            instrument_id: order.instrument_id.value(),
            client_order_id: order.client_order_id.value(),
        }
    }
}

impl TryFrom<proto::NewOrder> for NewOrder {
    type Error = DecodeError;

    fn try_from(order: proto::NewOrder) -> Result<Self, Self::Error> {
        let side = Side::from_wire(order.side).ok_or(DecodeError::InvalidEnumValue {
            field: "side",
            value: order.side,
        })?;
        Ok(Self {
            limit_price: order.limit_price,
            order_quantity: order.order_quantity,
            side,
            instrument_id: InstrumentId::new(order.instrument_id),
            client_order_id: ClientOrderId::new(order.client_order_id),
        })
    }
}

impl From<&ExecutionReport> for proto::ExecutionReport {
    fn from(report: &ExecutionReport) -> Self {
        Self {
            client_order_id: report.client_order_id.value(),
            instrument_id: report.instrument_id.value(),
            exec_type: report.exec_type.as_wire(),
            last_quantity: report.last_quantity,
            last_price: report.last_price,
            leaves_quantity: report.leaves_quantity,
        }
    }
}

impl TryFrom<proto::ExecutionReport> for ExecutionReport {
    type Error = DecodeError;

    fn try_from(report: proto::ExecutionReport) -> Result<Self, Self::Error> {
        let exec_type =
            ExecType::from_wire(report.exec_type).ok_or(DecodeError::InvalidEnumValue {
                field: "exec_type",
                value: report.exec_type,
            })?;
        Ok(Self {
            client_order_id: ClientOrderId::new(report.client_order_id),
            instrument_id: InstrumentId::new(report.instrument_id),
            exec_type,
            last_quantity: report.last_quantity,
            last_price: report.last_price,
            leaves_quantity: report.leaves_quantity,
        })
    }
}

impl From<&Envelope> for proto::OneMessage {
    fn from(envelope: &Envelope) -> Self {
        Self {
            r#type: Some(envelope.msg_type),
            logon_msg: envelope.logon.as_ref().map(proto::Logon::from),
            logon_reply_msg: envelope.logon_reply.as_ref().map(proto::LogonReply::from),
            logout_msg: envelope.logout.map(|Logout| proto::Logout {}),
            heartbeat_msg: envelope.heartbeat.map(|Heartbeat| proto::Heartbeat {}),
            new_order_msg: envelope.new_order.as_ref().map(proto::NewOrder::from),
            execution_report_msg: envelope
                .execution_report
                .as_ref()
                .map(proto::ExecutionReport::from),
        }
    }
}

impl From<&Message> for proto::OneMessage {
    fn from(message: &Message) -> Self {
        let mut one = Self {
            r#type: Some(message.msg_type().as_wire()),
            ..Self::default()
        };
        match message {
            Message::Logon(m) => one.logon_msg = Some(m.into()),
            Message::LogonReply(m) => one.logon_reply_msg = Some(m.into()),
            Message::Logout(_) => one.logout_msg = Some(proto::Logout {}),
            Message::Heartbeat(_) => one.heartbeat_msg = Some(proto::Heartbeat {}),
            Message::NewOrder(m) => one.new_order_msg = Some(m.into()),
            Message::ExecutionReport(m) => one.execution_report_msg = Some(m.into()),
        }
        one
    }
}

impl TryFrom<proto::OneMessage> for Envelope {
    type Error = DecodeError;

    fn try_from(one: proto::OneMessage) -> Result<Self, Self::Error> {
        Ok(Self {
            msg_type: one.r#type.ok_or(DecodeError::MissingField("type"))?,
            logon: one.logon_msg.map(Logon::from),
            logon_reply: one.logon_reply_msg.map(LogonReply::from),
            logout: one.logout_msg.map(|_| Logout),
            heartbeat: one.heartbeat_msg.map(|_| Heartbeat),
            new_order: one.new_order_msg.map(NewOrder::try_from).transpose()?,
            execution_report: one
                .execution_report_msg
                .map(ExecutionReport::try_from)
                .transpose()?,
        })
    }
}

/// Encodes an envelope after checking it carries exactly its own payload.
///
/// # Errors
/// Returns `EncodeError` if the envelope is inconsistent. Nothing is written
/// in that case.
pub fn encode_envelope(envelope: &Envelope, dst: &mut BytesMut) -> Result<(), EncodeError> {
    envelope.validate()?;
    proto::OneMessage::from(envelope).encode(dst)?;
    Ok(())
}

/// Encodes a typed message. A [`Message`] is always consistent.
#[must_use]
pub fn encode_message(message: &Message) -> Vec<u8> {
    proto::OneMessage::from(message).encode_to_vec()
}

/// Decodes an envelope from a frame payload.
///
/// The result may still be inconsistent (unknown discriminant or missing
/// payload); that is for the dispatcher to judge.
///
/// # Errors
/// Returns `DecodeError` if the payload is malformed or has no discriminant.
pub fn decode_envelope(payload: &[u8]) -> Result<Envelope, DecodeError> {
    proto::OneMessage::decode(payload)?.try_into()
}

/// Decodes a typed message from a frame payload.
///
/// # Errors
/// Returns `DecodeError` if the payload is malformed, the discriminant is
/// unknown, or the discriminant's payload is absent.
pub fn decode_message(payload: &[u8]) -> Result<Message, DecodeError> {
    decode_envelope(payload)?.into_message()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tradelink_core::message::MsgType;

    fn round_trip(message: Message) {
        let bytes = encode_message(&message);
        assert_eq!(decode_message(&bytes).unwrap(), message);
    }

    fn new_order() -> NewOrder {
        NewOrder {
            limit_price: 100.5,
            order_quantity: 10,
            side: Side::Sell,
            instrument_id: InstrumentId::new(42),
            client_order_id: ClientOrderId::new(3),
        }
    }

    #[test]
    fn test_round_trip_every_kind() {
        round_trip(Message::Logon(Logon::new("trader", "secret")));
        round_trip(Message::LogonReply(LogonReply::rejected(7)));
        round_trip(Message::Logout(Logout));
        round_trip(Message::Heartbeat(Heartbeat));
        round_trip(Message::NewOrder(new_order()));
        round_trip(Message::ExecutionReport(ExecutionReport {
            client_order_id: ClientOrderId::new(3),
            instrument_id: InstrumentId::new(42),
            exec_type: ExecType::PartialFill,
            last_quantity: 4,
            last_price: 100.25,
            leaves_quantity: 6,
        }));
    }

    #[test]
    fn test_heartbeat_bytes() {
        // type = HEARTBEAT (3), heartbeat_msg present and empty
        let bytes = encode_message(&Message::Heartbeat(Heartbeat));
        assert_eq!(&bytes[..], &[0x08, 0x03, 0x2A, 0x00]);
    }

    #[test]
    fn test_logon_type_zero_is_written() {
        let bytes = encode_message(&Message::Logon(Logon::new("a", "b")));
        assert_eq!(&bytes[..2], &[0x08, 0x00]);
    }

    #[test]
    fn test_new_order_bytes() {
        let bytes = encode_message(&Message::NewOrder(new_order()));
        let expected = [
            0x08, 0x04, // type = NEW_ORDER
            0x32, 0x11, // new_order_msg, 17 bytes
            0x09, 0x00, 0x00, 0x00, 0x00, 0x00, 0x20, 0x59, 0x40, // limit_price 100.5
            0x10, 0x0A, // order_quantity 10
            0x18, 0x01, // side SELL
            0x20, 0x2A, // instrument_id 42
            0x28, 0x03, // client_order_id 3
        ];
        assert_eq!(&bytes[..], &expected);
    }

    #[test]
    fn test_zero_scalars_are_written() {
        let bytes = encode_message(&Message::LogonReply(LogonReply::accepted()));
        assert_eq!(&bytes[..], &[0x08, 0x01, 0x1A, 0x02, 0x08, 0x00]);
    }

    #[test]
    fn test_schema_enums_match_domain() {
        use proto::{execution_report, new_order, one_message};

        assert_eq!(one_message::Type::Logon as i32, MsgType::Logon.as_wire());
        assert_eq!(
            one_message::Type::ExecutionReport as i32,
            MsgType::ExecutionReport.as_wire()
        );
        assert_eq!(new_order::Side::Sell as i32, Side::Sell.as_wire());
        assert_eq!(
            execution_report::ExecType::Rejected as i32,
            ExecType::Rejected.as_wire()
        );
    }

    #[test]
    fn test_encode_envelope_rejects_missing_payload() {
        let envelope = Envelope::with_type(MsgType::NewOrder.as_wire());
        let mut dst = BytesMut::new();
        let result = encode_envelope(&envelope, &mut dst);
        assert!(matches!(result, Err(EncodeError::MissingPayload { .. })));
        assert!(dst.is_empty());
    }

    #[test]
    fn test_encode_envelope_matches_encode_message() {
        let message = Message::LogonReply(LogonReply::accepted());
        let mut dst = BytesMut::new();
        encode_envelope(&Envelope::from(message.clone()), &mut dst).unwrap();
        assert_eq!(&dst[..], &encode_message(&message)[..]);
    }

    #[test]
    fn test_decode_unknown_type_keeps_envelope() {
        let bytes = proto::OneMessage {
            r#type: Some(99),
            ..Default::default()
        }
        .encode_to_vec();

        let envelope = decode_envelope(&bytes).unwrap();
        assert_eq!(envelope.msg_type, 99);
        assert_eq!(envelope.payload_count(), 0);
        assert_eq!(
            decode_message(&bytes),
            Err(DecodeError::UnknownMessageType(99))
        );
    }

    #[test]
    fn test_decode_missing_payload() {
        let bytes = proto::OneMessage {
            r#type: Some(MsgType::ExecutionReport.as_wire()),
            ..Default::default()
        }
        .encode_to_vec();

        assert_eq!(
            decode_message(&bytes),
            Err(DecodeError::MissingPayload {
                msg_type: MsgType::ExecutionReport,
                field: "execution_report_msg",
            })
        );
    }

    #[test]
    fn test_decode_missing_type() {
        let bytes = proto::OneMessage {
            heartbeat_msg: Some(proto::Heartbeat {}),
            ..Default::default()
        }
        .encode_to_vec();

        assert_eq!(
            decode_envelope(&bytes),
            Err(DecodeError::MissingField("type"))
        );
    }

    #[test]
    fn test_decode_skips_unknown_fields() {
        let mut bytes = vec![0x08, 0x01];
        // field 15, string "ext"
        bytes.extend_from_slice(&[0x7A, 0x03, b'e', b'x', b't']);
        // logon_reply_msg with reject_code 0 and an unknown double in field 9
        bytes.extend_from_slice(&[0x1A, 0x0B, 0x08, 0x00, 0x49]);
        bytes.extend_from_slice(&1.5f64.to_le_bytes());

        assert_eq!(
            decode_message(&bytes).unwrap(),
            Message::LogonReply(LogonReply::accepted())
        );
    }

    #[test]
    fn test_decode_invalid_side() {
        let bytes = proto::OneMessage {
            r#type: Some(MsgType::NewOrder.as_wire()),
            new_order_msg: Some(proto::NewOrder {
                side: 9,
                ..Default::default()
            }),
            ..Default::default()
        }
        .encode_to_vec();

        assert_eq!(
            decode_envelope(&bytes),
            Err(DecodeError::InvalidEnumValue {
                field: "side",
                value: 9
            })
        );
    }

    #[test]
    fn test_decode_wire_type_mismatch() {
        // heartbeat_msg sent as a varint
        let bytes = [0x08, 0x03, 0x28, 0x01];
        assert!(matches!(
            decode_envelope(&bytes),
            Err(DecodeError::Protobuf(_))
        ));
    }

    #[test]
    fn test_decode_truncated_payload() {
        let bytes = encode_message(&Message::Logon(Logon::new("trader", "secret")));
        assert!(matches!(
            decode_envelope(&bytes[..bytes.len() - 2]),
            Err(DecodeError::Protobuf(_))
        ));
    }
}
