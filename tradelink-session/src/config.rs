/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Session configuration.
//!
//! This module provides configuration options for TradeLink sessions. The
//! configuration can be built in code or deserialized; durations are
//! expressed in milliseconds when serialized.

use crate::heartbeat::DEFAULT_HEARTBEAT_INTERVAL;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tradelink_core::error::SessionError;
use tradelink_transport::codec::{ByteOrder, DEFAULT_MAX_FRAME_SIZE};

const DEFAULT_MAX_FRAMES_PER_POLL: usize = 64;
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_READ_BUFFER_SIZE: usize = 4096;
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Configuration for a trading session.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Account user name sent in the Logon.
    pub user_name: String,
    /// Account password sent in the Logon.
    pub password: String,
    /// Outbound idle time after which a heartbeat is sent.
    #[serde(
        rename = "heartbeat_interval_ms",
        with = "duration_ms",
        default = "default_heartbeat_interval"
    )]
    pub heartbeat_interval: Duration,
    /// Maximum frame payload size in bytes.
    #[serde(default = "default_max_frame_size")]
    pub max_frame_size: usize,
    /// Byte order of the frame length prefix.
    #[serde(default)]
    pub byte_order: ByteOrder,
    /// Maximum number of inbound frames processed per poll.
    #[serde(default = "default_max_frames_per_poll")]
    pub max_frames_per_poll: usize,
    /// Connection establishment timeout.
    #[serde(
        rename = "connect_timeout_ms",
        with = "duration_ms",
        default = "default_connect_timeout"
    )]
    pub connect_timeout: Duration,
    /// Size of each transport read.
    #[serde(default = "default_read_buffer_size")]
    pub read_buffer_size: usize,
    /// Period of the driver's housekeeping tick.
    #[serde(
        rename = "poll_interval_ms",
        with = "duration_ms",
        default = "default_poll_interval"
    )]
    pub poll_interval: Duration,
}

impl SessionConfig {
    /// Creates a new session configuration with default settings.
    ///
    /// # Arguments
    /// * `user_name` - Account user name
    /// * `password` - Account password
    #[must_use]
    pub fn new(user_name: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            user_name: user_name.into(),
            password: password.into(),
            heartbeat_interval: DEFAULT_HEARTBEAT_INTERVAL,
            max_frame_size: DEFAULT_MAX_FRAME_SIZE,
            byte_order: ByteOrder::Little,
            max_frames_per_poll: DEFAULT_MAX_FRAMES_PER_POLL,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            read_buffer_size: DEFAULT_READ_BUFFER_SIZE,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Sets the heartbeat interval.
    #[must_use]
    pub const fn with_heartbeat_interval(mut self, interval: Duration) -> Self {
        self.heartbeat_interval = interval;
        self
    }

    /// Sets the maximum frame payload size.
    #[must_use]
    pub const fn with_max_frame_size(mut self, size: usize) -> Self {
        self.max_frame_size = size;
        self
    }

    /// Sets the length prefix byte order.
    #[must_use]
    pub const fn with_byte_order(mut self, byte_order: ByteOrder) -> Self {
        self.byte_order = byte_order;
        self
    }

    /// Sets the per-poll frame cap.
    #[must_use]
    pub const fn with_max_frames_per_poll(mut self, max: usize) -> Self {
        self.max_frames_per_poll = max;
        self
    }

    /// Sets the connect timeout.
    #[must_use]
    pub const fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Sets the transport read size.
    #[must_use]
    pub const fn with_read_buffer_size(mut self, size: usize) -> Self {
        self.read_buffer_size = size;
        self
    }

    /// Sets the driver tick period.
    #[must_use]
    pub const fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Checks the configuration for values the engine cannot run with.
    ///
    /// # Errors
    /// Returns `SessionError::Configuration` describing the first problem.
    pub fn validate(&self) -> Result<(), SessionError> {
        if self.user_name.is_empty() {
            return Err(config_error("user_name must not be empty"));
        }
        if self.heartbeat_interval.is_zero() {
            return Err(config_error("heartbeat_interval must be positive"));
        }
        if self.max_frame_size == 0 || self.max_frame_size > u32::MAX as usize {
            return Err(config_error("max_frame_size must be within 1..=u32::MAX"));
        }
        if self.max_frames_per_poll == 0 {
            return Err(config_error("max_frames_per_poll must be positive"));
        }
        if self.read_buffer_size == 0 {
            return Err(config_error("read_buffer_size must be positive"));
        }
        if self.poll_interval.is_zero() {
            return Err(config_error("poll_interval must be positive"));
        }
        Ok(())
    }
}

impl fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionConfig")
            .field("user_name", &self.user_name)
            .field("password", &"<redacted>")
            .field("heartbeat_interval", &self.heartbeat_interval)
            .field("max_frame_size", &self.max_frame_size)
            .field("byte_order", &self.byte_order)
            .field("max_frames_per_poll", &self.max_frames_per_poll)
            .field("connect_timeout", &self.connect_timeout)
            .field("read_buffer_size", &self.read_buffer_size)
            .field("poll_interval", &self.poll_interval)
            .finish()
    }
}

fn config_error(reason: &str) -> SessionError {
    SessionError::Configuration(reason.to_string())
}

const fn default_heartbeat_interval() -> Duration {
    DEFAULT_HEARTBEAT_INTERVAL
}

const fn default_max_frame_size() -> usize {
    DEFAULT_MAX_FRAME_SIZE
}

const fn default_max_frames_per_poll() -> usize {
    DEFAULT_MAX_FRAMES_PER_POLL
}

const fn default_connect_timeout() -> Duration {
    DEFAULT_CONNECT_TIMEOUT
}

const fn default_read_buffer_size() -> usize {
    DEFAULT_READ_BUFFER_SIZE
}

const fn default_poll_interval() -> Duration {
    DEFAULT_POLL_INTERVAL
}

mod duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(u64::try_from(value.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

/// Builder for session configuration.
#[derive(Debug, Default)]
pub struct SessionConfigBuilder {
    user_name: Option<String>,
    password: Option<String>,
    heartbeat_interval: Option<Duration>,
    max_frame_size: Option<usize>,
    byte_order: Option<ByteOrder>,
    max_frames_per_poll: Option<usize>,
    connect_timeout: Option<Duration>,
}

impl SessionConfigBuilder {
    /// Creates a new builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the user name.
    #[must_use]
    pub fn user_name(mut self, user_name: impl Into<String>) -> Self {
        self.user_name = Some(user_name.into());
        self
    }

    /// Sets the password.
    #[must_use]
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Sets the heartbeat interval.
    #[must_use]
    pub const fn heartbeat_interval(mut self, interval: Duration) -> Self {
        self.heartbeat_interval = Some(interval);
        self
    }

    /// Sets the maximum frame payload size.
    #[must_use]
    pub const fn max_frame_size(mut self, size: usize) -> Self {
        self.max_frame_size = Some(size);
        self
    }

    /// Sets the length prefix byte order.
    #[must_use]
    pub const fn byte_order(mut self, byte_order: ByteOrder) -> Self {
        self.byte_order = Some(byte_order);
        self
    }

    /// Sets the per-poll frame cap.
    #[must_use]
    pub const fn max_frames_per_poll(mut self, max: usize) -> Self {
        self.max_frames_per_poll = Some(max);
        self
    }

    /// Sets the connect timeout.
    #[must_use]
    pub const fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Builds the configuration.
    ///
    /// # Errors
    /// Returns `SessionError::Configuration` if credentials are missing or a
    /// value is out of range.
    pub fn build(self) -> Result<SessionConfig, SessionError> {
        let user_name = self
            .user_name
            .ok_or_else(|| config_error("user_name is required"))?;
        let password = self
            .password
            .ok_or_else(|| config_error("password is required"))?;

        let mut config = SessionConfig::new(user_name, password);
        if let Some(interval) = self.heartbeat_interval {
            config.heartbeat_interval = interval;
        }
        if let Some(size) = self.max_frame_size {
            config.max_frame_size = size;
        }
        if let Some(byte_order) = self.byte_order {
            config.byte_order = byte_order;
        }
        if let Some(max) = self.max_frames_per_poll {
            config.max_frames_per_poll = max;
        }
        if let Some(timeout) = self.connect_timeout {
            config.connect_timeout = timeout;
        }

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_config_defaults() {
        let config = SessionConfig::new("trader", "secret");
        assert_eq!(config.heartbeat_interval, Duration::from_secs(5));
        assert_eq!(config.max_frame_size, 1024 * 1024);
        assert_eq!(config.byte_order, ByteOrder::Little);
        assert_eq!(config.max_frames_per_poll, 64);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_session_config_builder() {
        let config = SessionConfigBuilder::new()
            .user_name("trader")
            .password("secret")
            .heartbeat_interval(Duration::from_secs(2))
            .byte_order(ByteOrder::Big)
            .build()
            .unwrap();

        assert_eq!(config.user_name, "trader");
        assert_eq!(config.heartbeat_interval, Duration::from_secs(2));
        assert_eq!(config.byte_order, ByteOrder::Big);
    }

    #[test]
    fn test_builder_requires_credentials() {
        let result = SessionConfigBuilder::new().user_name("trader").build();
        assert_eq!(
            result,
            Err(SessionError::Configuration(
                "password is required".to_string()
            ))
        );
    }

    #[test]
    fn test_builder_rejects_zero_interval() {
        let result = SessionConfigBuilder::new()
            .user_name("trader")
            .password("secret")
            .heartbeat_interval(Duration::ZERO)
            .build();
        assert!(matches!(result, Err(SessionError::Configuration(_))));
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let json = r#"{"user_name":"trader","password":"secret","heartbeat_interval_ms":1500,"byte_order":"big"}"#;
        let config: SessionConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.heartbeat_interval, Duration::from_millis(1500));
        assert_eq!(config.byte_order, ByteOrder::Big);
        assert_eq!(config.connect_timeout, Duration::from_secs(10));
        assert_eq!(config.read_buffer_size, 4096);
    }

    #[test]
    fn test_serialize_round_trip() {
        let config =
            SessionConfig::new("trader", "secret").with_poll_interval(Duration::from_millis(100));
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("\"poll_interval_ms\":100"));
        let back: SessionConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_debug_redacts_password() {
        let config = SessionConfig::new("trader", "secret");
        let debug = format!("{config:?}");
        assert!(debug.contains("trader"));
        assert!(!debug.contains("secret"));
    }
}
