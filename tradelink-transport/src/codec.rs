/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Length-prefixed frame codec.
//!
//! Every frame on the wire is a 4-byte unsigned length followed by exactly
//! that many payload bytes. The codec reassembles frames from arbitrarily
//! split reads and can be used either directly through [`FrameCodec::feed`]
//! and [`FrameCodec::try_extract_frame`], or as a `tokio_util` codec with
//! `Framed`.

use bytes::{Buf, BufMut, Bytes, BytesMut};
use serde::{Deserialize, Serialize};
use tokio_util::codec::{Decoder, Encoder};
use tradelink_core::error::{DecodeError, FrameError};
use tradelink_core::message::{Envelope, Message};
use tradelink_wire::envelope::{decode_envelope, encode_envelope, encode_message};

/// Size of the length prefix in bytes.
pub const LENGTH_PREFIX_LEN: usize = 4;

/// Default maximum payload size (1 MiB).
pub const DEFAULT_MAX_FRAME_SIZE: usize = 1024 * 1024;

/// Byte order of the length prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ByteOrder {
    /// Least significant byte first.
    #[default]
    Little,
    /// Most significant byte first.
    Big,
}

impl ByteOrder {
    /// Reads a length prefix.
    #[inline]
    #[must_use]
    pub const fn read_u32(self, bytes: [u8; 4]) -> u32 {
        match self {
            Self::Little => u32::from_le_bytes(bytes),
            Self::Big => u32::from_be_bytes(bytes),
        }
    }

    /// Appends a length prefix.
    #[inline]
    pub fn put_u32(self, dst: &mut BytesMut, value: u32) {
        match self {
            Self::Little => dst.put_u32_le(value),
            Self::Big => dst.put_u32(value),
        }
    }
}

/// One length-prefixed unit extracted from the stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Payload length as declared by the prefix.
    pub length: u32,
    /// Payload bytes. Always exactly `length` long.
    pub payload: Bytes,
}

impl Frame {
    /// Returns true if the payload is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }

    /// Decodes the payload as an envelope.
    ///
    /// # Errors
    /// Returns `DecodeError` if the payload is not a valid envelope.
    pub fn decode_envelope(&self) -> Result<Envelope, DecodeError> {
        decode_envelope(&self.payload)
    }
}

/// Length-prefixed frame codec with an owned inbound buffer.
#[derive(Debug)]
pub struct FrameCodec {
    /// Byte order of the length prefix.
    byte_order: ByteOrder,
    /// Maximum payload size in bytes.
    max_frame_size: usize,
    /// Bytes received but not yet extracted as frames.
    inbound: BytesMut,
    /// Bytes of an oversized frame still to be skipped.
    discard_remaining: usize,
}

impl FrameCodec {
    /// Creates a new codec with little-endian prefixes and a 1 MiB limit.
    #[must_use]
    pub fn new() -> Self {
        Self {
            byte_order: ByteOrder::Little,
            max_frame_size: DEFAULT_MAX_FRAME_SIZE,
            inbound: BytesMut::new(),
            discard_remaining: 0,
        }
    }

    /// Sets the length prefix byte order.
    #[must_use]
    pub const fn with_byte_order(mut self, byte_order: ByteOrder) -> Self {
        self.byte_order = byte_order;
        self
    }

    /// Sets the maximum payload size.
    #[must_use]
    pub const fn with_max_frame_size(mut self, size: usize) -> Self {
        self.max_frame_size = size;
        self
    }

    /// Returns the length prefix byte order.
    #[must_use]
    pub const fn byte_order(&self) -> ByteOrder {
        self.byte_order
    }

    /// Returns the maximum payload size.
    #[must_use]
    pub const fn max_frame_size(&self) -> usize {
        self.max_frame_size
    }

    /// Appends received bytes to the inbound buffer.
    ///
    /// Bytes belonging to an oversized frame being discarded are dropped
    /// here instead of being buffered.
    pub fn feed(&mut self, data: &[u8]) {
        let skip = self.discard_remaining.min(data.len());
        self.discard_remaining -= skip;
        self.inbound.extend_from_slice(&data[skip..]);
    }

    /// Extracts the next complete frame from the inbound buffer.
    ///
    /// Returns `Ok(None)` when more bytes are needed. Call in a loop: one
    /// read may contain any number of frames.
    ///
    /// # Errors
    /// Returns `FrameError::FrameTooLarge` once for an oversized frame. Its
    /// bytes are then skipped and the next call resumes after it.
    pub fn try_extract_frame(&mut self) -> Result<Option<Frame>, FrameError> {
        let mut inbound = std::mem::take(&mut self.inbound);
        let result = self.decode(&mut inbound);
        self.inbound = inbound;
        result
    }

    /// Returns the number of buffered inbound bytes.
    #[must_use]
    pub fn buffered_len(&self) -> usize {
        self.inbound.len()
    }

    /// Returns true if an oversized frame is still being skipped.
    #[must_use]
    pub const fn is_discarding(&self) -> bool {
        self.discard_remaining > 0
    }

    /// Drops all buffered inbound bytes and any pending discard.
    pub fn clear(&mut self) {
        self.inbound.clear();
        self.discard_remaining = 0;
    }

    /// Encodes a message into a complete frame.
    ///
    /// # Errors
    /// Returns `FrameError::FrameTooLarge` if the payload exceeds the limit.
    pub fn encode_message(&self, message: &Message) -> Result<Bytes, FrameError> {
        let payload = encode_message(message);
        self.frame_payload(&payload)
    }

    /// Validates and encodes an envelope into a complete frame.
    ///
    /// # Errors
    /// Returns `FrameError::Encode` if the envelope is inconsistent, or
    /// `FrameError::FrameTooLarge` if the payload exceeds the limit.
    pub fn encode_envelope(&self, envelope: &Envelope) -> Result<Bytes, FrameError> {
        let mut payload = BytesMut::new();
        encode_envelope(envelope, &mut payload)?;
        self.frame_payload(&payload)
    }

    fn frame_payload(&self, payload: &[u8]) -> Result<Bytes, FrameError> {
        let mut dst = BytesMut::with_capacity(LENGTH_PREFIX_LEN + payload.len());
        self.put_frame(payload, &mut dst)?;
        Ok(dst.freeze())
    }

    fn put_frame(&self, payload: &[u8], dst: &mut BytesMut) -> Result<(), FrameError> {
        let too_large = || FrameError::FrameTooLarge {
            size: payload.len(),
            max_size: self.max_frame_size,
        };
        if payload.len() > self.max_frame_size {
            return Err(too_large());
        }
        let length = u32::try_from(payload.len()).map_err(|_| too_large())?;

        dst.reserve(LENGTH_PREFIX_LEN + payload.len());
        self.byte_order.put_u32(dst, length);
        dst.put_slice(payload);
        Ok(())
    }
}

impl Default for FrameCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for FrameCodec {
    type Item = Frame;
    type Error = FrameError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if self.discard_remaining > 0 {
            let skip = self.discard_remaining.min(src.len());
            src.advance(skip);
            self.discard_remaining -= skip;
            if self.discard_remaining > 0 {
                return Ok(None);
            }
        }

        if src.len() < LENGTH_PREFIX_LEN {
            return Ok(None);
        }

        let mut prefix = [0u8; LENGTH_PREFIX_LEN];
        prefix.copy_from_slice(&src[..LENGTH_PREFIX_LEN]);
        let length = self.byte_order.read_u32(prefix);
        let size = length as usize;

        if size > self.max_frame_size {
            src.advance(LENGTH_PREFIX_LEN);
            let skip = size.min(src.len());
            src.advance(skip);
            self.discard_remaining = size - skip;
            return Err(FrameError::FrameTooLarge {
                size,
                max_size: self.max_frame_size,
            });
        }

        let total = LENGTH_PREFIX_LEN + size;
        if src.len() < total {
            src.reserve(total - src.len());
            return Ok(None);
        }

        src.advance(LENGTH_PREFIX_LEN);
        let payload = src.split_to(size).freeze();
        Ok(Some(Frame { length, payload }))
    }
}

impl Encoder<&Message> for FrameCodec {
    type Error = FrameError;

    fn encode(&mut self, item: &Message, dst: &mut BytesMut) -> Result<(), Self::Error> {
        let payload = encode_message(item);
        self.put_frame(&payload, dst)
    }
}

impl Encoder<Message> for FrameCodec {
    type Error = FrameError;

    fn encode(&mut self, item: Message, dst: &mut BytesMut) -> Result<(), Self::Error> {
        <Self as Encoder<&Message>>::encode(self, &item, dst)
    }
}

impl Encoder<&Envelope> for FrameCodec {
    type Error = FrameError;

    fn encode(&mut self, item: &Envelope, dst: &mut BytesMut) -> Result<(), Self::Error> {
        let mut payload = BytesMut::new();
        encode_envelope(item, &mut payload)?;
        self.put_frame(&payload, dst)
    }
}

impl Encoder<&[u8]> for FrameCodec {
    type Error = FrameError;

    fn encode(&mut self, item: &[u8], dst: &mut BytesMut) -> Result<(), Self::Error> {
        self.put_frame(item, dst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tradelink_core::message::{Heartbeat, Logon, LogonReply, MsgType};

    fn raw_frame(payload: &[u8]) -> Vec<u8> {
        let mut out = (payload.len() as u32).to_le_bytes().to_vec();
        out.extend_from_slice(payload);
        out
    }

    #[test]
    fn test_partial_prefix_then_complete_frame() {
        let mut codec = FrameCodec::new();
        let bytes = raw_frame(&[1, 2, 3, 4, 5, 6]);
        assert_eq!(bytes.len(), 10);

        codec.feed(&bytes[..3]);
        assert_eq!(codec.try_extract_frame().unwrap(), None);

        codec.feed(&bytes[3..]);
        let frame = codec.try_extract_frame().unwrap().unwrap();
        assert_eq!(frame.length, 6);
        assert_eq!(&frame.payload[..], &[1, 2, 3, 4, 5, 6]);
        assert_eq!(codec.buffered_len(), 0);
    }

    #[test]
    fn test_prefix_without_full_payload() {
        let mut codec = FrameCodec::new();
        let bytes = raw_frame(&[9; 8]);
        codec.feed(&bytes[..7]);
        assert_eq!(codec.try_extract_frame().unwrap(), None);
        assert_eq!(codec.buffered_len(), 7);
    }

    #[test]
    fn test_zero_length_frame() {
        let mut codec = FrameCodec::new();
        codec.feed(&[0, 0, 0, 0]);
        let frame = codec.try_extract_frame().unwrap().unwrap();
        assert_eq!(frame.length, 0);
        assert!(frame.is_empty());
        assert_eq!(codec.try_extract_frame().unwrap(), None);
    }

    #[test]
    fn test_multiple_frames_in_one_feed() {
        let mut codec = FrameCodec::new();
        let mut bytes = raw_frame(b"one");
        bytes.extend(raw_frame(b""));
        bytes.extend(raw_frame(b"three"));
        codec.feed(&bytes);

        let payloads: Vec<Bytes> = std::iter::from_fn(|| codec.try_extract_frame().unwrap())
            .map(|f| f.payload)
            .collect();
        assert_eq!(payloads, vec![&b"one"[..], &b""[..], &b"three"[..]]);
    }

    #[test]
    fn test_reassembly_across_arbitrary_splits() {
        let codec = FrameCodec::new();
        let messages = [
            Message::Logon(Logon::new("trader", "secret")),
            Message::LogonReply(LogonReply::accepted()),
            Message::Heartbeat(Heartbeat),
        ];
        let stream: Vec<u8> = messages
            .iter()
            .flat_map(|m| codec.encode_message(m).unwrap().to_vec())
            .collect();

        for chunk_size in 1..=stream.len() {
            let mut codec = FrameCodec::new();
            let mut decoded = Vec::new();
            for chunk in stream.chunks(chunk_size) {
                codec.feed(chunk);
                while let Some(frame) = codec.try_extract_frame().unwrap() {
                    decoded.push(frame.decode_envelope().unwrap().into_message().unwrap());
                }
            }
            assert_eq!(decoded, messages, "chunk size {chunk_size}");
            assert_eq!(codec.buffered_len(), 0);
        }
    }

    #[test]
    fn test_frame_too_large_is_skipped() {
        let mut codec = FrameCodec::new().with_max_frame_size(4);
        let mut bytes = raw_frame(&[7; 10]);
        bytes.extend(raw_frame(b"ok"));

        codec.feed(&bytes[..6]);
        assert_eq!(
            codec.try_extract_frame(),
            Err(FrameError::FrameTooLarge {
                size: 10,
                max_size: 4
            })
        );
        assert!(codec.is_discarding());
        assert_eq!(codec.buffered_len(), 0);

        codec.feed(&bytes[6..]);
        assert!(!codec.is_discarding());
        let frame = codec.try_extract_frame().unwrap().unwrap();
        assert_eq!(&frame.payload[..], b"ok");
    }

    #[test]
    fn test_big_endian_prefix() {
        let codec = FrameCodec::new().with_byte_order(ByteOrder::Big);
        let bytes = codec.encode_message(&Message::Heartbeat(Heartbeat)).unwrap();
        assert_eq!(&bytes[..4], &[0, 0, 0, 4]);

        let mut decoder = FrameCodec::new().with_byte_order(ByteOrder::Big);
        decoder.feed(&bytes);
        let frame = decoder.try_extract_frame().unwrap().unwrap();
        assert_eq!(frame.length, 4);
    }

    #[test]
    fn test_little_endian_prefix() {
        let codec = FrameCodec::new();
        let bytes = codec.encode_message(&Message::Heartbeat(Heartbeat)).unwrap();
        assert_eq!(&bytes[..4], &[4, 0, 0, 0]);
        assert_eq!(bytes.len(), 8);
    }

    #[test]
    fn test_encode_envelope_rejects_inconsistent() {
        let codec = FrameCodec::new();
        let envelope = Envelope::with_type(MsgType::NewOrder.as_wire());
        assert!(matches!(
            codec.encode_envelope(&envelope),
            Err(FrameError::Encode(_))
        ));
    }

    #[test]
    fn test_encode_payload_over_limit() {
        let mut codec = FrameCodec::new().with_max_frame_size(2);
        let mut dst = BytesMut::new();
        let result = codec.encode(&b"abc"[..], &mut dst);
        assert!(matches!(result, Err(FrameError::FrameTooLarge { .. })));
        assert!(dst.is_empty());
    }

    #[test]
    fn test_tokio_decoder_and_encoder_agree() {
        let mut codec = FrameCodec::new();
        let mut buf = BytesMut::new();
        let message = Message::LogonReply(LogonReply::rejected(2));
        codec.encode(&message, &mut buf).unwrap();

        let frame = codec.decode(&mut buf).unwrap().unwrap();
        assert!(buf.is_empty());
        assert_eq!(
            frame.decode_envelope().unwrap().into_message().unwrap(),
            message
        );
    }

    #[test]
    fn test_byte_order_serde() {
        let order: ByteOrder = serde_json::from_str("\"big\"").unwrap();
        assert_eq!(order, ByteOrder::Big);
        assert_eq!(ByteOrder::default(), ByteOrder::Little);
    }
}
