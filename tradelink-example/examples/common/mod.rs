//! Common utilities shared across examples.

#![allow(dead_code)]

use std::env;
use std::path::Path;
use tradelink::session::SessionConfig;

/// Default gateway port.
pub const DEFAULT_PORT: u16 = 5001;

/// Default gateway host.
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Example configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ExampleConfig {
    /// Gateway hostname.
    pub host: String,
    /// Gateway port.
    pub port: u16,
    /// Account user name.
    pub user_name: String,
    /// Account password.
    pub password: String,
}

impl ExampleConfig {
    /// Loads the configuration from `TRADELINK_*` variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            host: env::var("TRADELINK_HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string()),
            port: env::var("TRADELINK_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(DEFAULT_PORT),
            user_name: env::var("TRADELINK_USER").unwrap_or_else(|_| "trader".to_string()),
            password: env::var("TRADELINK_PASSWORD").unwrap_or_else(|_| "secret".to_string()),
        }
    }

    /// Returns the socket address string.
    #[must_use]
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Builds the session configuration.
    ///
    /// When `TRADELINK_CONFIG` names a JSON file it is used as is; otherwise
    /// the defaults are used with the credentials from the environment.
    pub fn session_config(&self) -> anyhow::Result<SessionConfig> {
        match env::var("TRADELINK_CONFIG") {
            Ok(path) => load_session_config(Path::new(&path)),
            Err(_) => Ok(SessionConfig::new(&self.user_name, &self.password)),
        }
    }
}

fn load_session_config(path: &Path) -> anyhow::Result<SessionConfig> {
    let text = std::fs::read_to_string(path)?;
    let config: SessionConfig = serde_json::from_str(&text)?;
    config.validate()?;
    Ok(config)
}

/// Initializes logging for examples.
pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .try_init();
}
