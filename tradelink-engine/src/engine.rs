/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Poll-driven session engine.
//!
//! [`SessionEngine`] owns the whole client session: state machine, frame
//! codec, heartbeat scheduler, order id allocation, and the outbound byte
//! queue. It performs no I/O. The host feeds it received bytes, calls
//! [`SessionEngine::poll`], and writes [`SessionEngine::pending_outbound`] to
//! the transport, reporting progress with [`SessionEngine::on_bytes_sent`].
//!
//! [`crate::driver::SessionDriver`] is a ready-made async host.

use crate::application::{Application, CloseReason};
use crate::dispatcher::{DispatchStats, InboundHandler, MessageDispatcher};
use bytes::{Buf, Bytes, BytesMut};
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use tradelink_core::error::{
    DispatchError, FrameError, HandlerError, Result, SessionError, TradeLinkError,
};
use tradelink_core::message::{
    ExecutionReport, Heartbeat, Logon, LogonReply, Logout, Message, MsgType, NewOrder,
};
use tradelink_core::types::{ClientOrderId, InstrumentId, Side};
use tradelink_session::clock::{Clock, SystemClock};
use tradelink_session::config::SessionConfig;
use tradelink_session::heartbeat::HeartbeatScheduler;
use tradelink_session::order_id::OrderIdGenerator;
use tradelink_session::state::{SessionEvent, SessionState, SessionStateMachine};
use tradelink_transport::codec::FrameCodec;

/// Outcome of one [`SessionEngine::poll`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollSummary {
    /// Frames extracted from the inbound buffer.
    pub frames_decoded: usize,
    /// Messages routed to a handler that accepted them.
    pub messages_dispatched: usize,
    /// Frames or messages logged and dropped.
    pub messages_dropped: usize,
    /// Heartbeats received in this poll.
    pub heartbeats_received: usize,
    /// Whether this poll queued a heartbeat.
    pub heartbeat_sent: bool,
    /// Whether the per-poll frame cap stopped processing early.
    pub frame_cap_reached: bool,
}

/// Session state touched by inbound message handlers.
struct SessionCore<A> {
    fsm: SessionStateMachine,
    heartbeat: HeartbeatScheduler,
    order_ids: OrderIdGenerator,
    codec: FrameCodec,
    outbound: BytesMut,
    application: A,
    clock: Arc<dyn Clock>,
    config: SessionConfig,
    heartbeats_received: u64,
}

impl<A: Application> SessionCore<A> {
    fn enqueue(&mut self, message: &Message) -> std::result::Result<(), FrameError> {
        let frame = self.codec.encode_message(message)?;
        self.outbound.extend_from_slice(&frame);
        debug!(msg_type = %message.msg_type(), bytes = frame.len(), "queued frame");
        Ok(())
    }

    fn unexpected(&self, msg_type: MsgType) -> HandlerError {
        HandlerError::Rejected(format!(
            "unexpected {msg_type} in state {}",
            self.fsm.state()
        ))
    }
}

impl<A: Application> InboundHandler for SessionCore<A> {
    fn handle_logon_reply(&mut self, reply: LogonReply) -> std::result::Result<(), HandlerError> {
        if self.fsm.state() != SessionState::AwaitingLogonReply {
            return Err(self.unexpected(MsgType::LogonReply));
        }

        let event = if reply.is_accepted() {
            SessionEvent::LogonAccepted
        } else {
            SessionEvent::LogonRejected
        };
        self.fsm
            .apply(event)
            .map_err(|e| HandlerError::Rejected(e.to_string()))?;

        if reply.is_accepted() {
            info!("logon accepted");
        } else {
            warn!(reject_code = reply.reject_code, "logon rejected");
        }
        self.application.on_logon_reply(&reply)
    }

    fn handle_logout(&mut self, _logout: Logout) -> std::result::Result<(), HandlerError> {
        self.fsm
            .apply(SessionEvent::LogoutReceived)
            .map_err(|_| self.unexpected(MsgType::Logout))?;
        info!("logged out by counterparty");
        self.application.on_logout()
    }

    fn handle_heartbeat(&mut self, _heartbeat: Heartbeat) -> std::result::Result<(), HandlerError> {
        self.heartbeats_received += 1;
        debug!("heartbeat received");
        self.application.on_heartbeat()
    }

    fn handle_execution_report(
        &mut self,
        report: ExecutionReport,
    ) -> std::result::Result<(), HandlerError> {
        debug!(
            client_order_id = %report.client_order_id,
            exec_type = %report.exec_type,
            "execution report received"
        );
        self.application.on_execution_report(&report)
    }
}

/// Client session engine.
pub struct SessionEngine<A: Application> {
    core: SessionCore<A>,
    dispatcher: MessageDispatcher<SessionCore<A>>,
}

impl<A: Application> SessionEngine<A> {
    /// Creates an engine reading time from the system clock.
    ///
    /// # Arguments
    /// * `config` - Session configuration
    /// * `application` - Callback handler
    ///
    /// # Errors
    /// Returns `SessionError::Configuration` if the configuration is invalid.
    pub fn new(config: SessionConfig, application: A) -> Result<Self> {
        Self::with_clock(config, application, Arc::new(SystemClock))
    }

    /// Creates an engine reading time from `clock`.
    ///
    /// # Errors
    /// Returns `SessionError::Configuration` if the configuration is invalid.
    pub fn with_clock(
        config: SessionConfig,
        application: A,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        config.validate()?;

        let codec = FrameCodec::new()
            .with_byte_order(config.byte_order)
            .with_max_frame_size(config.max_frame_size);
        let heartbeat = HeartbeatScheduler::new(config.heartbeat_interval, clock.now());

        Ok(Self {
            core: SessionCore {
                fsm: SessionStateMachine::new(),
                heartbeat,
                order_ids: OrderIdGenerator::new(),
                codec,
                outbound: BytesMut::new(),
                application,
                clock,
                config,
                heartbeats_received: 0,
            },
            dispatcher: MessageDispatcher::new(),
        })
    }

    /// Returns the current session state.
    #[must_use]
    pub const fn state(&self) -> SessionState {
        self.core.fsm.state()
    }

    /// Returns true iff the session is logged on.
    #[must_use]
    pub const fn is_logged_on(&self) -> bool {
        self.core.fsm.is_logged_on()
    }

    /// Returns the session configuration.
    #[must_use]
    pub const fn config(&self) -> &SessionConfig {
        &self.core.config
    }

    /// Returns the application handler.
    #[must_use]
    pub const fn application(&self) -> &A {
        &self.core.application
    }

    /// Returns the application handler mutably.
    pub const fn application_mut(&mut self) -> &mut A {
        &mut self.core.application
    }

    /// Returns the dispatch counters.
    #[must_use]
    pub const fn dispatch_stats(&self) -> DispatchStats {
        self.dispatcher.stats()
    }

    /// Returns the number of heartbeats received.
    #[must_use]
    pub const fn heartbeats_received(&self) -> u64 {
        self.core.heartbeats_received
    }

    /// Returns the number of heartbeats sent.
    #[must_use]
    pub const fn heartbeats_sent(&self) -> u64 {
        self.core.heartbeat.sent_count()
    }

    /// Returns the id the next order will carry, if any remain.
    #[must_use]
    pub const fn next_client_order_id(&self) -> Option<ClientOrderId> {
        self.core.order_ids.peek()
    }

    /// Marks the session as connecting.
    ///
    /// # Errors
    /// Returns `SessionError::InvalidTransition` unless the session is
    /// `Disconnected`.
    pub fn connect(&mut self) -> Result<()> {
        self.core.fsm.apply(SessionEvent::Connect)?;
        info!("connecting");
        Ok(())
    }

    /// Reports the transport connected and queues the Logon.
    ///
    /// # Errors
    /// Returns `SessionError::InvalidTransition` unless the session is
    /// `Connecting`.
    pub fn on_connected(&mut self) -> Result<()> {
        self.core.fsm.apply(SessionEvent::Connected)?;
        self.core.heartbeat.reset(self.core.clock.now());

        let logon = Logon::new(
            self.core.config.user_name.clone(),
            self.core.config.password.clone(),
        );
        self.core.enqueue(&Message::Logon(logon))?;
        info!(user_name = %self.core.config.user_name, "logon sent");
        Ok(())
    }

    /// Appends received bytes to the inbound buffer.
    ///
    /// Bytes received after the session closed are ignored.
    pub fn on_bytes_received(&mut self, data: &[u8]) {
        if self.core.fsm.is_closed() {
            return;
        }
        self.core.codec.feed(data);
    }

    /// Processes buffered inbound frames and runs the heartbeat check.
    ///
    /// At most `max_frames_per_poll` frames are processed; the rest stay
    /// buffered for the next poll. Malformed, oversized, and unroutable
    /// messages are logged and dropped.
    ///
    /// # Errors
    /// Returns `TradeLinkError::HandlerFault` if an application hook
    /// reported a fault. Frames after the faulting one stay buffered.
    pub fn poll(&mut self) -> Result<PollSummary> {
        let mut summary = PollSummary::default();
        let heartbeats_before = self.core.heartbeats_received;

        let mut processed = 0;
        while !self.core.fsm.is_closed() {
            if processed == self.core.config.max_frames_per_poll {
                summary.frame_cap_reached = self.core.codec.buffered_len() > 0;
                break;
            }

            let frame = match self.core.codec.try_extract_frame() {
                Ok(Some(frame)) => frame,
                Ok(None) => break,
                Err(err) => {
                    processed += 1;
                    summary.messages_dropped += 1;
                    warn!(error = %err, "dropping frame");
                    continue;
                }
            };
            processed += 1;
            summary.frames_decoded += 1;

            let envelope = match frame.decode_envelope() {
                Ok(envelope) => envelope,
                Err(err) => {
                    summary.messages_dropped += 1;
                    warn!(error = %err, length = frame.length, "dropping undecodable frame");
                    continue;
                }
            };

            match self.dispatcher.dispatch(&mut self.core, envelope) {
                Ok(_) => summary.messages_dispatched += 1,
                Err(DispatchError::Handler {
                    msg_type,
                    source: HandlerError::Fault(reason),
                }) => {
                    error!(%msg_type, %reason, "handler fault");
                    return Err(TradeLinkError::HandlerFault { msg_type, reason });
                }
                Err(err) => {
                    summary.messages_dropped += 1;
                    warn!(error = %err, "dropping message");
                }
            }
        }

        let received = self.core.heartbeats_received - heartbeats_before;
        summary.heartbeats_received = usize::try_from(received).unwrap_or(usize::MAX);
        summary.heartbeat_sent = self.tick()?;
        Ok(summary)
    }

    /// Queues a heartbeat if the session is logged on and has been idle for
    /// a full interval.
    ///
    /// # Returns
    /// Whether a heartbeat was queued.
    ///
    /// # Errors
    /// Returns `TradeLinkError::Frame` if the heartbeat cannot be framed.
    pub fn tick(&mut self) -> Result<bool> {
        let now = self.core.clock.now();
        if !self.core.fsm.is_logged_on() || !self.core.heartbeat.is_due(now) {
            return Ok(false);
        }

        self.core.enqueue(&Message::Heartbeat(Heartbeat))?;
        self.core.heartbeat.on_heartbeat_sent(now);
        Ok(true)
    }

    /// Queues a new limit order.
    ///
    /// # Arguments
    /// * `price` - Limit price; must be finite and positive
    /// * `quantity` - Order quantity; must be positive
    /// * `side` - Buy or sell
    /// * `instrument_id` - Instrument to trade
    ///
    /// # Returns
    /// The client order id assigned to the order.
    ///
    /// # Errors
    /// Returns `SessionError::NotLoggedOn` unless logged on,
    /// `SessionError::InvalidOrder` for a bad price or quantity, or
    /// `SessionError::OrderIdExhausted` when no ids remain. Nothing is
    /// queued and no id is consumed on error.
    pub fn send_new_order(
        &mut self,
        price: f64,
        quantity: u32,
        side: Side,
        instrument_id: InstrumentId,
    ) -> Result<ClientOrderId> {
        self.core.fsm.ensure_logged_on()?;
        if !price.is_finite() || price <= 0.0 {
            return Err(SessionError::InvalidOrder(format!(
                "price must be positive and finite, got {price}"
            ))
            .into());
        }
        if quantity == 0 {
            return Err(SessionError::InvalidOrder("quantity must be positive".to_string()).into());
        }
        let client_order_id = self
            .core
            .order_ids
            .peek()
            .ok_or(SessionError::OrderIdExhausted)?;

        let order = NewOrder {
            limit_price: price,
            order_quantity: quantity,
            side,
            instrument_id,
            client_order_id,
        };
        self.core.enqueue(&Message::NewOrder(order))?;
        self.core.order_ids.allocate()?;

        info!(
            %client_order_id,
            %side,
            %instrument_id,
            price,
            quantity,
            "order sent"
        );
        Ok(client_order_id)
    }

    /// Queues a Logout and moves the session to `LoggedOut`.
    ///
    /// # Errors
    /// Returns `SessionError::NotLoggedOn` unless logged on.
    pub fn logout(&mut self) -> Result<()> {
        self.core.fsm.ensure_logged_on()?;
        self.core.enqueue(&Message::Logout(Logout))?;
        self.core.fsm.apply(SessionEvent::LogoutSent)?;
        info!("logout sent");
        Ok(())
    }

    /// Closes the session immediately.
    ///
    /// Queued outbound bytes are discarded, not flushed. Closing an already
    /// closed session does nothing.
    pub fn close(&mut self) {
        self.shutdown(CloseReason::LocalClose);
    }

    /// Reports that the transport closed or failed.
    ///
    /// Clears logged-on status and notifies the application. No reconnection
    /// is attempted.
    pub fn on_transport_closed(&mut self, reason: CloseReason) {
        self.shutdown(reason);
    }

    fn shutdown(&mut self, reason: CloseReason) {
        if self.core.fsm.is_closed() {
            return;
        }
        let previous = self.core.fsm.force_close();
        self.core.outbound.clear();
        self.core.codec.clear();

        match &reason {
            CloseReason::LocalClose | CloseReason::PeerClosed => {
                info!(%reason, from = %previous, "session closed");
            }
            CloseReason::TransportError(_) | CloseReason::HandlerFault(_) => {
                error!(%reason, from = %previous, "session closed");
            }
        }
        self.core.application.on_connection_closed(&reason);
    }

    /// Returns the bytes queued for the transport.
    #[must_use]
    pub fn pending_outbound(&self) -> &[u8] {
        &self.core.outbound
    }

    /// Returns true if bytes are queued for the transport.
    #[must_use]
    pub fn has_pending_outbound(&self) -> bool {
        !self.core.outbound.is_empty()
    }

    /// Removes `count` bytes from the front of the outbound queue after the
    /// transport accepted them.
    ///
    /// The heartbeat idle timer restarts here, not when a frame is queued.
    pub fn on_bytes_sent(&mut self, count: usize) {
        let count = count.min(self.core.outbound.len());
        if count > 0 {
            self.core.outbound.advance(count);
            self.core.heartbeat.on_message_sent(self.core.clock.now());
        }
    }

    /// Takes every queued outbound byte, for hosts that write the whole
    /// queue at once. Counts as a send for the heartbeat idle timer.
    pub fn take_outbound(&mut self) -> Bytes {
        if !self.core.outbound.is_empty() {
            self.core.heartbeat.on_message_sent(self.core.clock.now());
        }
        self.core.outbound.split().freeze()
    }
}
