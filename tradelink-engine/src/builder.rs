/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Client builder for fluent configuration.
//!
//! This module provides a builder API for assembling a session engine and
//! its driver.

use crate::application::{Application, NoOpApplication};
use crate::driver::{SessionDriver, SessionHandle};
use crate::engine::SessionEngine;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tradelink_core::error::{Result, SessionError};
use tradelink_session::clock::Clock;
use tradelink_session::config::SessionConfig;
use tradelink_transport::tcp::TcpTransport;
use tradelink_transport::transport::Transport;

/// Builder for a trading client session.
#[derive(Debug)]
pub struct ClientBuilder<A: Application = NoOpApplication> {
    /// Application callback handler.
    application: A,
    /// Counterparty address in `host:port` form.
    address: Option<String>,
    /// Session configuration.
    config: Option<SessionConfig>,
    /// Time source; the system clock when unset.
    clock: Option<Arc<dyn Clock>>,
}

impl Default for ClientBuilder<NoOpApplication> {
    fn default() -> Self {
        Self::new()
    }
}

impl ClientBuilder<NoOpApplication> {
    /// Creates a new builder with a no-op application.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            application: NoOpApplication,
            address: None,
            config: None,
            clock: None,
        }
    }
}

impl<A: Application> ClientBuilder<A> {
    /// Sets the application callback handler.
    #[must_use]
    pub fn with_application<B: Application>(self, application: B) -> ClientBuilder<B> {
        ClientBuilder {
            application,
            address: self.address,
            config: self.config,
            clock: self.clock,
        }
    }

    /// Sets the counterparty address.
    #[must_use]
    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    /// Sets the session configuration.
    #[must_use]
    pub fn with_config(mut self, config: SessionConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Sets the time source.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Returns the configured address.
    #[must_use]
    pub fn address(&self) -> Option<&str> {
        self.address.as_deref()
    }

    /// Returns the session configuration.
    #[must_use]
    pub const fn config(&self) -> Option<&SessionConfig> {
        self.config.as_ref()
    }

    /// Builds a standalone engine, for callers that drive I/O themselves.
    ///
    /// # Errors
    /// Returns `SessionError::Configuration` if no configuration was set or
    /// it is invalid.
    pub fn build_engine(self) -> Result<SessionEngine<A>> {
        let config = self
            .config
            .ok_or_else(|| SessionError::Configuration("session config is required".into()))?;
        match self.clock {
            Some(clock) => SessionEngine::with_clock(config, self.application, clock),
            None => SessionEngine::new(config, self.application),
        }
    }

    /// Builds a driver over a TCP transport.
    ///
    /// # Errors
    /// Returns `SessionError::Configuration` if the address or the
    /// configuration is missing or invalid.
    pub fn build(self) -> Result<(SessionDriver<A, TcpTransport>, SessionHandle)> {
        self.build_with_transport(TcpTransport::new())
    }

    /// Builds a driver over a caller-provided transport.
    ///
    /// # Arguments
    /// * `transport` - An unconnected transport
    ///
    /// # Errors
    /// Returns `SessionError::Configuration` if the address or the
    /// configuration is missing or invalid.
    pub fn build_with_transport<T: Transport>(
        mut self,
        transport: T,
    ) -> Result<(SessionDriver<A, T>, SessionHandle)> {
        let address = self
            .address
            .take()
            .ok_or_else(|| SessionError::Configuration("address is required".into()))?;
        let engine = self.build_engine()?;
        Ok(SessionDriver::new(engine, transport, address))
    }

    /// Builds a TCP driver and spawns it on the current runtime.
    ///
    /// # Returns
    /// The handle and the task running the session.
    ///
    /// # Errors
    /// Returns `SessionError::Configuration` if the address or the
    /// configuration is missing or invalid.
    pub fn spawn(self) -> Result<(SessionHandle, JoinHandle<Result<()>>)>
    where
        A: 'static,
    {
        let (driver, handle) = self.build()?;
        Ok((handle, tokio::spawn(driver.run())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tradelink_core::error::TradeLinkError;
    use tradelink_session::clock::ManualClock;
    use tradelink_session::state::SessionState;

    fn config() -> SessionConfig {
        SessionConfig::new("trader", "secret")
    }

    #[test]
    fn test_builder_defaults() {
        let builder = ClientBuilder::new();
        assert!(builder.address().is_none());
        assert!(builder.config().is_none());
    }

    #[test]
    fn test_build_engine() {
        let engine = ClientBuilder::new()
            .with_config(config().with_heartbeat_interval(Duration::from_secs(2)))
            .build_engine()
            .unwrap();
        assert_eq!(engine.state(), SessionState::Disconnected);
        assert_eq!(engine.config().heartbeat_interval, Duration::from_secs(2));
    }

    #[test]
    fn test_build_engine_with_clock() {
        let clock = ManualClock::new();
        let engine = ClientBuilder::new()
            .with_config(config())
            .with_clock(Arc::new(clock))
            .build_engine()
            .unwrap();
        assert_eq!(engine.state(), SessionState::Disconnected);
    }

    #[test]
    fn test_missing_config() {
        let result = ClientBuilder::new().build_engine();
        assert!(matches!(
            result,
            Err(TradeLinkError::Session(SessionError::Configuration(_)))
        ));
    }

    #[test]
    fn test_missing_address() {
        let result = ClientBuilder::new().with_config(config()).build();
        assert!(matches!(
            result,
            Err(TradeLinkError::Session(SessionError::Configuration(_)))
        ));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let result = ClientBuilder::new()
            .with_address("127.0.0.1:9000")
            .with_config(config().with_heartbeat_interval(Duration::ZERO))
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_build_driver() {
        let (driver, handle) = ClientBuilder::new()
            .with_address("127.0.0.1:9000")
            .with_config(config())
            .build()
            .unwrap();
        assert_eq!(driver.engine().state(), SessionState::Disconnected);
        assert_eq!(handle.state(), SessionState::Disconnected);
    }
}
