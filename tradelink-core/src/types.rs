/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Core types for trading protocol operations.
//!
//! - [`ClientOrderId`]: Per-session order identifier
//! - [`InstrumentId`]: Counterparty instrument identifier
//! - [`Side`]: Order side enumeration
//! - [`ExecType`]: Execution report type

use num_derive::{FromPrimitive, ToPrimitive};
use num_traits::FromPrimitive;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Client-assigned order identifier.
///
/// Identifiers start at 1 and increase by one for every order sent within a
/// session. The wire field is 32 bits wide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(transparent)]
#[serde(transparent)]
pub struct ClientOrderId(u32);

impl ClientOrderId {
    /// The first identifier assigned in a session.
    pub const FIRST: Self = Self(1);

    /// Creates a new client order id.
    #[inline]
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Returns the raw identifier value.
    #[inline]
    #[must_use]
    pub const fn value(self) -> u32 {
        self.0
    }

    /// Returns the next identifier, or `None` at the numeric ceiling.
    #[inline]
    #[must_use]
    pub const fn next(self) -> Option<Self> {
        match self.0.checked_add(1) {
            Some(v) => Some(Self(v)),
            None => None,
        }
    }
}

impl Default for ClientOrderId {
    fn default() -> Self {
        Self::FIRST
    }
}

impl From<u32> for ClientOrderId {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl From<ClientOrderId> for u32 {
    fn from(id: ClientOrderId) -> Self {
        id.0
    }
}

impl fmt::Display for ClientOrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Instrument identifier as known by the counterparty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(transparent)]
#[serde(transparent)]
pub struct InstrumentId(u32);

impl InstrumentId {
    /// Creates a new instrument id.
    #[inline]
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Returns the raw identifier value.
    #[inline]
    #[must_use]
    pub const fn value(self) -> u32 {
        self.0
    }
}

impl From<u32> for InstrumentId {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl fmt::Display for InstrumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Order side. Discriminants are the wire enum values.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    FromPrimitive,
    ToPrimitive,
)]
#[repr(i32)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    /// Buy order.
    #[default]
    Buy = 0,
    /// Sell order.
    Sell = 1,
}

impl Side {
    /// Creates a side from its wire value.
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

    /// Returns the protocol name of this side.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Buy => "BUY",
            Self::Sell => "SELL",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Side {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("BUY") {
            Ok(Self::Buy)
        } else if s.eq_ignore_ascii_case("SELL") {
            Ok(Self::Sell)
        } else {
            Err(format!("invalid side: {s}"))
        }
    }
}

/// Execution report type. Discriminants are the wire enum values.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    FromPrimitive,
    ToPrimitive,
)]
#[repr(i32)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExecType {
    /// Order accepted.
    #[default]
    New = 0,
    /// Order partially filled.
    PartialFill = 1,
    /// Order completely filled.
    Fill = 2,
    /// Order canceled.
    Canceled = 3,
    /// Order rejected.
    Rejected = 4,
}

impl ExecType {
    /// Creates an exec type from its wire value.
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

    /// Returns true if the order is no longer working after this report.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Fill | Self::Canceled | Self::Rejected)
    }
}

impl fmt::Display for ExecType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::New => "NEW",
            Self::PartialFill => "PARTIAL_FILL",
            Self::Fill => "FILL",
            Self::Canceled => "CANCELED",
            Self::Rejected => "REJECTED",
        };
        f.write_str(name)
    }
}
