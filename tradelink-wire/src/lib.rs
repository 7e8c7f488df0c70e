/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! # TradeLink Wire
//!
//! Binary envelope encoding and decoding for the TradeLink trading protocol.
//!
//! The counterparty serializes messages as protocol-buffers `OneMessage`
//! envelopes. This crate declares that schema for `prost` and converts it to
//! and from the domain model:
//!
//! - **Proto**: `prost` message definitions with the counterparty's field numbers
//! - **Envelope**: Domain conversions and the encode/decode entry points

pub mod envelope;
pub mod proto;

pub use envelope::{decode_envelope, decode_message, encode_envelope, encode_message};
pub use proto::OneMessage;
