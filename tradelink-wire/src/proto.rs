/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Protocol-buffers schema of the `OneMessage` envelope.
//!
//! Field numbers are fixed by the counterparty's schema and must not change.
//! Payload scalars are `required` so they are always written, zero values
//! included. `type` is `optional` so a missing discriminant can be told
//! apart from `LOGON` (0); it is always set on encode.

/// Envelope carrying a discriminant and one payload.
#[derive(Clone, PartialEq, prost::Message)]
pub struct OneMessage {
    #[prost(enumeration = "one_message::Type", optional, tag = "1")]
    pub r#type: Option<i32>,
    #[prost(message, optional, tag = "2")]
    pub logon_msg: Option<Logon>,
    #[prost(message, optional, tag = "3")]
    pub logon_reply_msg: Option<LogonReply>,
    #[prost(message, optional, tag = "4")]
    pub logout_msg: Option<Logout>,
    #[prost(message, optional, tag = "5")]
    pub heartbeat_msg: Option<Heartbeat>,
    #[prost(message, optional, tag = "6")]
    pub new_order_msg: Option<NewOrder>,
    #[prost(message, optional, tag = "7")]
    pub execution_report_msg: Option<ExecutionReport>,
}

pub mod one_message {
    /// Envelope discriminant.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, prost::Enumeration)]
    #[repr(i32)]
    pub enum Type {
        Logon = 0,
        LogonReply = 1,
        Logout = 2,
        Heartbeat = 3,
        NewOrder = 4,
        ExecutionReport = 5,
    }
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct Logon {
    #[prost(string, required, tag = "1")]
    pub user_name: String,
    #[prost(string, required, tag = "2")]
    pub password: String,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct LogonReply {
    /// Zero when the logon was accepted.
    #[prost(uint32, required, tag = "1")]
    pub reject_code: u32,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct Logout {}

#[derive(Clone, PartialEq, prost::Message)]
pub struct Heartbeat {}

#[derive(Clone, PartialEq, prost::Message)]
pub struct NewOrder {
    #[prost(double, required, tag = "1")]
    pub limit_price: f64,
    #[prost(uint32, required, tag = "2")]
    pub order_quantity: u32,
    #[prost(enumeration = "new_order::Side", required, tag = "3")]
    pub side: i32,
    #[prost(uint32, required, tag = "4")]
    pub instrument_id: u32,
    #[prost(uint32, required, tag = "5")]
    pub client_order_id: u32,
}

pub mod new_order {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, prost::Enumeration)]
    #[repr(i32)]
    pub enum Side {
        Buy = 0,
        Sell = 1,
    }
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct ExecutionReport {
    #[prost(uint32, required, tag = "1")]
    pub client_order_id: u32,
    #[prost(uint32, required, tag = "2")]
    pub instrument_id: u32,
    #[prost(enumeration = "execution_report::ExecType", required, tag = "3")]
    pub exec_type: i32,
    #[prost(uint32, required, tag = "4")]
    pub last_quantity: u32,
    #[prost(double, required, tag = "5")]
    pub last_price: f64,
    #[prost(uint32, required, tag = "6")]
    pub leaves_quantity: u32,
}

pub mod execution_report {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, prost::Enumeration)]
    #[repr(i32)]
    pub enum ExecType {
        New = 0,
        PartialFill = 1,
        Fill = 2,
        Canceled = 3,
        Rejected = 4,
    }
}
