/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Application callback interface.
//!
//! This module defines the hooks a caller implements to observe session
//! events. Hooks run on the engine's execution context, in the order the
//! counterparty's messages arrived.

use std::fmt;
use tradelink_core::error::HandlerError;
use tradelink_core::message::{ExecutionReport, LogonReply};

/// Why a session's connection ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloseReason {
    /// The caller closed the session.
    LocalClose,
    /// The counterparty closed the connection.
    PeerClosed,
    /// The transport failed.
    TransportError(String),
    /// An application hook reported a fault.
    HandlerFault(String),
}

impl fmt::Display for CloseReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LocalClose => f.write_str("closed locally"),
            Self::PeerClosed => f.write_str("closed by peer"),
            Self::TransportError(reason) => write!(f, "transport error: {reason}"),
            Self::HandlerFault(reason) => write!(f, "handler fault: {reason}"),
        }
    }
}

/// Application callback interface for session events.
///
/// Every hook has a default that accepts the event, so implementations only
/// override what they care about. Returning [`HandlerError::Rejected`] logs
/// and drops the message; returning [`HandlerError::Fault`] ends the current
/// poll with an error.
pub trait Application: Send {
    /// Called when the counterparty answers the Logon.
    ///
    /// # Arguments
    /// * `reply` - The reply; a non-zero `reject_code` means the logon failed
    ///
    /// # Errors
    /// Returns `HandlerError` to reject or fault.
    fn on_logon_reply(&mut self, reply: &LogonReply) -> Result<(), HandlerError> {
        let _ = reply;
        Ok(())
    }

    /// Called when the counterparty logs the session out.
    ///
    /// # Errors
    /// Returns `HandlerError` to reject or fault.
    fn on_logout(&mut self) -> Result<(), HandlerError> {
        Ok(())
    }

    /// Called for every heartbeat received.
    ///
    /// # Errors
    /// Returns `HandlerError` to reject or fault.
    fn on_heartbeat(&mut self) -> Result<(), HandlerError> {
        Ok(())
    }

    /// Called for every execution report received.
    ///
    /// # Arguments
    /// * `report` - The execution report
    ///
    /// # Errors
    /// Returns `HandlerError` to reject or fault.
    fn on_execution_report(&mut self, report: &ExecutionReport) -> Result<(), HandlerError> {
        let _ = report;
        Ok(())
    }

    /// Called once when the connection ends, whatever the cause.
    ///
    /// # Arguments
    /// * `reason` - Why the connection ended
    fn on_connection_closed(&mut self, reason: &CloseReason) {
        let _ = reason;
    }
}

/// Default no-op application implementation.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpApplication;

impl Application for NoOpApplication {}
