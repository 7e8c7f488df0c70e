/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Inbound message dispatch.
//!
//! Routes each decoded envelope to a handler through a table indexed by the
//! wire discriminant. Only the message kinds a client receives have routes;
//! any other discriminant is reported as unknown.

use std::marker::PhantomData;
use tracing::trace;
use tradelink_core::error::{DispatchError, HandlerError};
use tradelink_core::message::{Envelope, ExecutionReport, Heartbeat, LogonReply, Logout, MsgType};

/// Receiver of routed inbound messages.
pub trait InboundHandler {
    /// Handles a LogonReply.
    ///
    /// # Errors
    /// Returns `HandlerError` to reject or fault.
    fn handle_logon_reply(&mut self, reply: LogonReply) -> Result<(), HandlerError>;

    /// Handles a Logout.
    ///
    /// # Errors
    /// Returns `HandlerError` to reject or fault.
    fn handle_logout(&mut self, logout: Logout) -> Result<(), HandlerError>;

    /// Handles a Heartbeat.
    ///
    /// # Errors
    /// Returns `HandlerError` to reject or fault.
    fn handle_heartbeat(&mut self, heartbeat: Heartbeat) -> Result<(), HandlerError>;

    /// Handles an ExecutionReport.
    ///
    /// # Errors
    /// Returns `HandlerError` to reject or fault.
    fn handle_execution_report(&mut self, report: ExecutionReport) -> Result<(), HandlerError>;
}

/// Route function stored in the dispatch table.
pub type RouteFn<H> = fn(&mut H, Envelope) -> Result<(), DispatchError>;

/// Counters kept by the dispatcher.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchStats {
    /// Messages delivered to a handler that accepted them.
    pub dispatched: u64,
    /// Messages with no route.
    pub unknown_type: u64,
    /// Messages whose payload did not match the discriminant.
    pub malformed: u64,
    /// Messages a handler rejected or faulted on.
    pub handler_errors: u64,
}

/// Table-driven dispatcher over a handler type.
#[derive(Debug)]
pub struct MessageDispatcher<H> {
    stats: DispatchStats,
    _handler: PhantomData<fn(&mut H)>,
}

impl<H: InboundHandler> MessageDispatcher<H> {
    /// Routes indexed by wire discriminant.
    const TABLE: [Option<RouteFn<H>>; 6] = [
        None,
        Some(route_logon_reply::<H>),
        Some(route_logout::<H>),
        Some(route_heartbeat::<H>),
        None,
        Some(route_execution_report::<H>),
    ];

    /// Creates a new dispatcher.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            stats: DispatchStats {
                dispatched: 0,
                unknown_type: 0,
                malformed: 0,
                handler_errors: 0,
            },
            _handler: PhantomData,
        }
    }

    /// Returns the route for a raw discriminant, if any.
    #[must_use]
    pub fn route(msg_type: i32) -> Option<RouteFn<H>> {
        usize::try_from(msg_type)
            .ok()
            .and_then(|index| Self::TABLE.get(index).copied().flatten())
    }

    /// Returns true if the discriminant has a route.
    #[must_use]
    pub fn has_route(msg_type: i32) -> bool {
        Self::route(msg_type).is_some()
    }

    /// Routes an envelope to `handler`.
    ///
    /// # Returns
    /// The message type that was handled.
    ///
    /// # Errors
    /// Returns `DispatchError::UnknownMessageType` if there is no route,
    /// `DispatchError::MalformedMessage` if the payload is absent, or
    /// `DispatchError::Handler` if the handler failed.
    pub fn dispatch(
        &mut self,
        handler: &mut H,
        envelope: Envelope,
    ) -> Result<MsgType, DispatchError> {
        let raw = envelope.msg_type;
        let (Some(route), Some(msg_type)) = (Self::route(raw), envelope.known_type()) else {
            self.stats.unknown_type += 1;
            return Err(DispatchError::UnknownMessageType(raw));
        };

        trace!(%msg_type, "dispatching");
        match route(handler, envelope) {
            Ok(()) => {
                self.stats.dispatched += 1;
                Ok(msg_type)
            }
            Err(err) => {
                match err {
                    DispatchError::MalformedMessage { .. } => self.stats.malformed += 1,
                    DispatchError::Handler { .. } => self.stats.handler_errors += 1,
                    DispatchError::UnknownMessageType(_) => self.stats.unknown_type += 1,
                }
                Err(err)
            }
        }
    }

    /// Returns the dispatch counters.
    #[must_use]
    pub const fn stats(&self) -> DispatchStats {
        self.stats
    }
}

impl<H: InboundHandler> Default for MessageDispatcher<H> {
    fn default() -> Self {
        Self::new()
    }
}

fn missing_payload(msg_type: MsgType) -> DispatchError {
    DispatchError::MalformedMessage {
        msg_type,
        reason: format!("{} is absent", msg_type.payload_field()),
    }
}

fn handler_error(msg_type: MsgType) -> impl FnOnce(HandlerError) -> DispatchError {
    move |source| DispatchError::Handler { msg_type, source }
}

fn route_logon_reply<H: InboundHandler>(
    handler: &mut H,
    envelope: Envelope,
) -> Result<(), DispatchError> {
    let msg_type = MsgType::LogonReply;
    let reply = envelope
        .logon_reply
        .ok_or_else(|| missing_payload(msg_type))?;
    handler
        .handle_logon_reply(reply)
        .map_err(handler_error(msg_type))
}

fn route_logout<H: InboundHandler>(
    handler: &mut H,
    envelope: Envelope,
) -> Result<(), DispatchError> {
    let msg_type = MsgType::Logout;
    let logout = envelope.logout.ok_or_else(|| missing_payload(msg_type))?;
    handler.handle_logout(logout).map_err(handler_error(msg_type))
}

fn route_heartbeat<H: InboundHandler>(
    handler: &mut H,
    envelope: Envelope,
) -> Result<(), DispatchError> {
    let msg_type = MsgType::Heartbeat;
    let heartbeat = envelope.heartbeat.ok_or_else(|| missing_payload(msg_type))?;
    handler
        .handle_heartbeat(heartbeat)
        .map_err(handler_error(msg_type))
}

fn route_execution_report<H: InboundHandler>(
    handler: &mut H,
    envelope: Envelope,
) -> Result<(), DispatchError> {
    let msg_type = MsgType::ExecutionReport;
    let report = envelope
        .execution_report
        .ok_or_else(|| missing_payload(msg_type))?;
    handler
        .handle_execution_report(report)
        .map_err(handler_error(msg_type))
}
