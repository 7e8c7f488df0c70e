/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Session state machine.
//!
//! The session moves `Disconnected → Connecting → AwaitingLogonReply →
//! LoggedOn → LoggedOut`, with `Closed` reachable from anywhere and terminal.
//! Every transition is driven by a [`SessionEvent`]; an event that is not
//! valid in the current state is rejected and leaves the state untouched.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;
use tradelink_core::error::SessionError;

/// Lifecycle state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SessionState {
    /// No connection.
    #[default]
    Disconnected,
    /// Transport connection in progress.
    Connecting,
    /// Logon sent, waiting for the counterparty's reply.
    AwaitingLogonReply,
    /// Logon accepted. Trade messages may be sent.
    LoggedOn,
    /// Logout sent or received, or logon rejected.
    LoggedOut,
    /// Connection gone. Terminal.
    Closed,
}

impl SessionState {
    /// Returns the state name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Disconnected => "Disconnected",
            Self::Connecting => "Connecting",
            Self::AwaitingLogonReply => "AwaitingLogonReply",
            Self::LoggedOn => "LoggedOn",
            Self::LoggedOut => "LoggedOut",
            Self::Closed => "Closed",
        }
    }

    /// Returns true if this state is terminal.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Closed)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Input that drives a state transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionEvent {
    /// Caller asked to connect.
    Connect,
    /// Transport reported the connection open.
    Connected,
    /// LogonReply with a zero reject code.
    LogonAccepted,
    /// LogonReply with a non-zero reject code.
    LogonRejected,
    /// Logout received from the counterparty.
    LogoutReceived,
    /// Logout sent by the caller.
    LogoutSent,
    /// Transport closed or failed.
    TransportClosed,
    /// Caller closed the session.
    Close,
}

impl SessionEvent {
    /// Returns the event name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Connect => "Connect",
            Self::Connected => "Connected",
            Self::LogonAccepted => "LogonAccepted",
            Self::LogonRejected => "LogonRejected",
            Self::LogoutReceived => "LogoutReceived",
            Self::LogoutSent => "LogoutSent",
            Self::TransportClosed => "TransportClosed",
            Self::Close => "Close",
        }
    }
}

impl fmt::Display for SessionEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Runtime session state machine.
#[derive(Debug, Default)]
pub struct SessionStateMachine {
    state: SessionState,
}

impl SessionStateMachine {
    /// Creates a machine in the `Disconnected` state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current state.
    #[inline]
    #[must_use]
    pub const fn state(&self) -> SessionState {
        self.state
    }

    /// Returns true iff the state is exactly `LoggedOn`.
    #[inline]
    #[must_use]
    pub const fn is_logged_on(&self) -> bool {
        matches!(self.state, SessionState::LoggedOn)
    }

    /// Returns true if the session is closed.
    #[inline]
    #[must_use]
    pub const fn is_closed(&self) -> bool {
        self.state.is_terminal()
    }

    /// Returns the state `event` would lead to, without applying it.
    #[must_use]
    pub const fn next_state(&self, event: SessionEvent) -> Option<SessionState> {
        use SessionEvent as E;
        use SessionState as S;

        match (self.state, event) {
            (_, E::Close | E::TransportClosed) => Some(S::Closed),
            (S::Disconnected, E::Connect) => Some(S::Connecting),
            (S::Connecting, E::Connected) => Some(S::AwaitingLogonReply),
            (S::AwaitingLogonReply, E::LogonAccepted) => Some(S::LoggedOn),
            (S::AwaitingLogonReply, E::LogonRejected | E::LogoutReceived) => Some(S::LoggedOut),
            (S::LoggedOn, E::LogoutReceived | E::LogoutSent) => Some(S::LoggedOut),
            _ => None,
        }
    }

    /// Applies an event.
    ///
    /// # Returns
    /// The new state.
    ///
    /// # Errors
    /// Returns `SessionError::InvalidTransition` if the event is not valid in
    /// the current state. The state is unchanged in that case.
    pub fn apply(&mut self, event: SessionEvent) -> Result<SessionState, SessionError> {
        let next = self
            .next_state(event)
            .ok_or_else(|| SessionError::InvalidTransition {
                state: self.state.to_string(),
                event: event.to_string(),
            })?;

        if next != self.state {
            debug!(from = %self.state, to = %next, %event, "session state transition");
        }
        self.state = next;
        Ok(next)
    }

    /// Moves to `Closed` from any state.
    ///
    /// # Returns
    /// The state the session was in before closing.
    pub fn force_close(&mut self) -> SessionState {
        let previous = self.state;
        if previous != SessionState::Closed {
            debug!(from = %previous, "session closed");
        }
        self.state = SessionState::Closed;
        previous
    }

    /// Fails with `NotLoggedOn` unless the session is logged on.
    ///
    /// # Errors
    /// Returns `SessionError::NotLoggedOn` carrying the current state.
    pub fn ensure_logged_on(&self) -> Result<(), SessionError> {
        if self.is_logged_on() {
            Ok(())
        } else {
            Err(SessionError::NotLoggedOn {
                state: self.state.to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn logged_on() -> SessionStateMachine {
        let mut fsm = SessionStateMachine::new();
        fsm.apply(SessionEvent::Connect).unwrap();
        fsm.apply(SessionEvent::Connected).unwrap();
        fsm.apply(SessionEvent::LogonAccepted).unwrap();
        fsm
    }

    #[test]
    fn test_happy_path() {
        let mut fsm = SessionStateMachine::new();
        assert_eq!(fsm.state(), SessionState::Disconnected);

        assert_eq!(
            fsm.apply(SessionEvent::Connect),
            Ok(SessionState::Connecting)
        );
        assert_eq!(
            fsm.apply(SessionEvent::Connected),
            Ok(SessionState::AwaitingLogonReply)
        );
        assert!(!fsm.is_logged_on());
        assert_eq!(
            fsm.apply(SessionEvent::LogonAccepted),
            Ok(SessionState::LoggedOn)
        );
        assert!(fsm.is_logged_on());
        assert_eq!(
            fsm.apply(SessionEvent::LogoutReceived),
            Ok(SessionState::LoggedOut)
        );
        assert!(!fsm.is_logged_on());
    }

    #[test]
    fn test_logon_rejected() {
        let mut fsm = SessionStateMachine::new();
        fsm.apply(SessionEvent::Connect).unwrap();
        fsm.apply(SessionEvent::Connected).unwrap();
        assert_eq!(
            fsm.apply(SessionEvent::LogonRejected),
            Ok(SessionState::LoggedOut)
        );
    }

    #[test]
    fn test_invalid_transition_leaves_state() {
        let mut fsm = SessionStateMachine::new();
        let err = fsm.apply(SessionEvent::LogonAccepted).unwrap_err();
        assert_eq!(
            err,
            SessionError::InvalidTransition {
                state: "Disconnected".to_string(),
                event: "LogonAccepted".to_string(),
            }
        );
        assert_eq!(fsm.state(), SessionState::Disconnected);
    }

    #[test]
    fn test_logon_accepted_twice_rejected() {
        let mut fsm = logged_on();
        assert!(fsm.apply(SessionEvent::LogonAccepted).is_err());
        assert!(fsm.is_logged_on());
    }

    #[test]
    fn test_close_from_any_state() {
        let mut fsm = logged_on();
        assert_eq!(fsm.apply(SessionEvent::Close), Ok(SessionState::Closed));
        assert!(!fsm.is_logged_on());
        assert!(fsm.is_closed());

        // idempotent
        assert_eq!(fsm.apply(SessionEvent::Close), Ok(SessionState::Closed));
        assert_eq!(
            fsm.apply(SessionEvent::TransportClosed),
            Ok(SessionState::Closed)
        );

        let mut fresh = SessionStateMachine::new();
        assert_eq!(
            fresh.apply(SessionEvent::TransportClosed),
            Ok(SessionState::Closed)
        );
    }

    #[test]
    fn test_force_close_reports_previous_state() {
        let mut fsm = logged_on();
        assert_eq!(fsm.force_close(), SessionState::LoggedOn);
        assert!(fsm.is_closed());
        assert!(!fsm.is_logged_on());
        assert_eq!(fsm.force_close(), SessionState::Closed);

        let mut fresh = SessionStateMachine::new();
        assert_eq!(fresh.force_close(), SessionState::Disconnected);
        assert_eq!(fresh.state(), SessionState::Closed);
    }

    #[test]
    fn test_closed_is_terminal() {
        let mut fsm = SessionStateMachine::new();
        fsm.apply(SessionEvent::Close).unwrap();
        assert!(fsm.apply(SessionEvent::Connect).is_err());
        assert_eq!(fsm.state(), SessionState::Closed);
    }

    #[test]
    fn test_ensure_logged_on() {
        let fsm = SessionStateMachine::new();
        assert_eq!(
            fsm.ensure_logged_on(),
            Err(SessionError::NotLoggedOn {
                state: "Disconnected".to_string()
            })
        );
        assert!(logged_on().ensure_logged_on().is_ok());
    }

    #[test]
    fn test_logout_sent() {
        let mut fsm = logged_on();
        assert_eq!(
            fsm.apply(SessionEvent::LogoutSent),
            Ok(SessionState::LoggedOut)
        );
        assert!(fsm.apply(SessionEvent::LogoutSent).is_err());
    }
}
