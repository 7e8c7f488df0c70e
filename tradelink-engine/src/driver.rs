/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Async session driver.
//!
//! [`SessionDriver`] owns a [`SessionEngine`] and a [`Transport`] and runs the
//! session on one task: it reads from the transport, polls the engine on
//! every read and on a fixed tick, flushes queued bytes, and serves caller
//! commands sent through a cloneable [`SessionHandle`].

use crate::application::{Application, CloseReason};
use crate::engine::SessionEngine;
use bytes::BytesMut;
use std::ops::ControlFlow;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};
use tradelink_core::error::{Result, SessionError, TradeLinkError, TransportError};
use tradelink_core::types::{ClientOrderId, InstrumentId, Side};
use tradelink_session::state::SessionState;
use tradelink_transport::transport::Transport;

/// Capacity of the command queue between handles and the driver.
const COMMAND_CHANNEL_CAPACITY: usize = 64;

/// Request from a [`SessionHandle`] to the driver task.
#[derive(Debug)]
pub enum SessionCommand {
    /// Send a new limit order.
    SendNewOrder {
        /// Limit price.
        price: f64,
        /// Order quantity.
        quantity: u32,
        /// Order side.
        side: Side,
        /// Instrument to trade.
        instrument_id: InstrumentId,
        /// Receives the assigned id or the rejection.
        reply: oneshot::Sender<Result<ClientOrderId>>,
    },
    /// Log the session out.
    Logout {
        /// Receives the outcome.
        reply: oneshot::Sender<Result<()>>,
    },
    /// Close the session immediately.
    Close {
        /// Signalled once the session is closed.
        reply: oneshot::Sender<()>,
    },
}

/// Cloneable handle for talking to a running [`SessionDriver`].
#[derive(Debug, Clone)]
pub struct SessionHandle {
    commands: mpsc::Sender<SessionCommand>,
    state: watch::Receiver<SessionState>,
}

impl SessionHandle {
    /// Returns the last published session state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        *self.state.borrow()
    }

    /// Returns true iff the session is logged on.
    #[must_use]
    pub fn is_logged_on(&self) -> bool {
        self.state() == SessionState::LoggedOn
    }

    /// Sends a new limit order.
    ///
    /// # Arguments
    /// * `price` - Limit price; must be finite and positive
    /// * `quantity` - Order quantity; must be positive
    /// * `side` - Buy or sell
    /// * `instrument_id` - Instrument to trade
    ///
    /// # Errors
    /// Returns the engine's rejection, or `SessionError::Closed` if the
    /// driver is no longer running.
    pub async fn send_new_order(
        &self,
        price: f64,
        quantity: u32,
        side: Side,
        instrument_id: InstrumentId,
    ) -> Result<ClientOrderId> {
        let (reply, rx) = oneshot::channel();
        let command = SessionCommand::SendNewOrder {
            price,
            quantity,
            side,
            instrument_id,
            reply,
        };
        self.request(command, rx).await?
    }

    /// Logs the session out.
    ///
    /// # Errors
    /// Returns `SessionError::NotLoggedOn` unless logged on, or
    /// `SessionError::Closed` if the driver is no longer running.
    pub async fn logout(&self) -> Result<()> {
        let (reply, rx) = oneshot::channel();
        self.request(SessionCommand::Logout { reply }, rx).await?
    }

    /// Closes the session. Closing a finished session succeeds.
    pub async fn close(&self) {
        let (reply, rx) = oneshot::channel();
        if self.request(SessionCommand::Close { reply }, rx).await.is_err() {
            debug!("close requested after driver exit");
        }
    }

    /// Waits until the logon is answered.
    ///
    /// # Errors
    /// Returns `SessionError::NotLoggedOn` if the session ended up anywhere
    /// but `LoggedOn`, or `SessionError::Closed` if the driver exited first.
    pub async fn wait_for_logon(&self) -> Result<()> {
        let mut state = self.state.clone();
        let reached = *state
            .wait_for(|s| {
                !matches!(
                    s,
                    SessionState::Disconnected
                        | SessionState::Connecting
                        | SessionState::AwaitingLogonReply
                )
            })
            .await
            .map_err(|_| SessionError::Closed)?;

        if reached == SessionState::LoggedOn {
            Ok(())
        } else {
            Err(SessionError::NotLoggedOn {
                state: reached.to_string(),
            }
            .into())
        }
    }

    /// Waits until the session is closed or the driver exits.
    pub async fn closed(&self) {
        let mut state = self.state.clone();
        let _ = state.wait_for(|s| *s == SessionState::Closed).await;
    }

    async fn request<T>(&self, command: SessionCommand, rx: oneshot::Receiver<T>) -> Result<T> {
        self.commands
            .send(command)
            .await
            .map_err(|_| SessionError::Closed)?;
        rx.await.map_err(|_| SessionError::Closed.into())
    }
}

/// Runs one session over a transport.
pub struct SessionDriver<A: Application, T: Transport> {
    engine: SessionEngine<A>,
    transport: T,
    addr: String,
    commands: mpsc::Receiver<SessionCommand>,
    state: watch::Sender<SessionState>,
}

impl<A: Application, T: Transport> SessionDriver<A, T> {
    /// Creates a driver and its handle.
    ///
    /// # Arguments
    /// * `engine` - A fresh engine in the `Disconnected` state
    /// * `transport` - An unconnected transport
    /// * `addr` - Counterparty address in `host:port` form
    #[must_use]
    pub fn new(
        engine: SessionEngine<A>,
        transport: T,
        addr: impl Into<String>,
    ) -> (Self, SessionHandle) {
        let (command_tx, command_rx) = mpsc::channel(COMMAND_CHANNEL_CAPACITY);
        let (state_tx, state_rx) = watch::channel(engine.state());
        let driver = Self {
            engine,
            transport,
            addr: addr.into(),
            commands: command_rx,
            state: state_tx,
        };
        let handle = SessionHandle {
            commands: command_tx,
            state: state_rx,
        };
        (driver, handle)
    }

    /// Returns the engine.
    #[must_use]
    pub const fn engine(&self) -> &SessionEngine<A> {
        &self.engine
    }

    /// Runs the session until it closes.
    ///
    /// Returns `Ok` when the session is closed by the caller, by the peer,
    /// or because every handle was dropped. No reconnection is attempted.
    ///
    /// # Errors
    /// Returns the transport failure or handler fault that ended the
    /// session. The application has been notified through
    /// `on_connection_closed` by then.
    pub async fn run(mut self) -> Result<()> {
        let result = self.drive().await;
        if let Err(err) = &result {
            let reason = match err {
                TradeLinkError::HandlerFault { reason, .. } => {
                    CloseReason::HandlerFault(reason.clone())
                }
                other => CloseReason::TransportError(other.to_string()),
            };
            self.engine.on_transport_closed(reason);
            self.shutdown_transport().await;
        }
        self.publish_state();
        result
    }

    async fn drive(&mut self) -> Result<()> {
        self.engine.connect()?;
        self.publish_state();

        let timeout = self.engine.config().connect_timeout;
        self.transport.connect(&self.addr, timeout).await?;
        self.engine.on_connected()?;
        self.publish_state();
        self.flush().await?;

        let mut ticker = tokio::time::interval(self.engine.config().poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let read_size = self.engine.config().read_buffer_size;
        let mut read_buf = BytesMut::with_capacity(read_size);
        let mut backlog = false;

        loop {
            tokio::select! {
                read = self.transport.recv(&mut read_buf) => {
                    if read? == 0 {
                        self.engine.on_transport_closed(CloseReason::PeerClosed);
                        self.shutdown_transport().await;
                        return Ok(());
                    }
                    self.engine.on_bytes_received(&read_buf);
                    read_buf.clear();
                    read_buf.reserve(read_size);
                    backlog = self.engine.poll()?.frame_cap_reached;
                }
                _ = ticker.tick() => {
                    backlog = self.engine.poll()?.frame_cap_reached;
                }
                () = tokio::task::yield_now(), if backlog => {
                    backlog = self.engine.poll()?.frame_cap_reached;
                }
                command = self.commands.recv() => {
                    let Some(command) = command else {
                        info!("all session handles dropped, closing");
                        self.engine.close();
                        self.shutdown_transport().await;
                        return Ok(());
                    };
                    if self.handle_command(command).await.is_break() {
                        return Ok(());
                    }
                }
            }

            self.flush().await?;
            self.publish_state();
        }
    }

    async fn handle_command(&mut self, command: SessionCommand) -> ControlFlow<()> {
        match command {
            SessionCommand::SendNewOrder {
                price,
                quantity,
                side,
                instrument_id,
                reply,
            } => {
                let result = self
                    .engine
                    .send_new_order(price, quantity, side, instrument_id);
                let _ = reply.send(result);
            }
            SessionCommand::Logout { reply } => {
                let _ = reply.send(self.engine.logout());
            }
            SessionCommand::Close { reply } => {
                self.engine.close();
                self.shutdown_transport().await;
                self.publish_state();
                let _ = reply.send(());
                return ControlFlow::Break(());
            }
        }
        ControlFlow::Continue(())
    }

    async fn flush(&mut self) -> Result<()> {
        while self.engine.has_pending_outbound() {
            let sent = self
                .transport
                .send(self.engine.pending_outbound())
                .await?;
            if sent == 0 {
                return Err(TransportError::ConnectionClosed.into());
            }
            self.engine.on_bytes_sent(sent);
        }
        Ok(())
    }

    async fn shutdown_transport(&mut self) {
        if let Err(err) = self.transport.close().await {
            warn!(error = %err, "transport shutdown failed");
        }
    }

    fn publish_state(&self) {
        let current = self.engine.state();
        self.state.send_if_modified(|published| {
            if *published == current {
                false
            } else {
                *published = current;
                true
            }
        });
    }
}
