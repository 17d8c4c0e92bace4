//! Gremlin connection configuration
//!
//! Loaded from YAML, with `.env` support and environment overrides:
//!
//! - `GREMLIN_HOST` replaces `host`

use gremsocket::{Headers, SessionConfig, StaticHeaders, TungsteniteDialerFactory};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

/// Environment variable overriding the configured host
pub const HOST_ENV_VAR: &str = "GREMLIN_HOST";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load config file: {0}")]
    FileError(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Top-level configuration of a Gremlin client binary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GremlinConfig {
    /// Endpoint, e.g. `wss://account.gremlin.cosmos.azure.com:443/`
    pub host: String,
    #[serde(default)]
    pub session: SessionSettings,
    #[serde(default)]
    pub heartbeat: HeartbeatSettings,
    /// Extra headers sent with the upgrade request
    #[serde(default)]
    pub headers: HashMap<String, String>,
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Session timeouts and buffers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSettings {
    #[serde(default = "default_handshake_timeout_ms")]
    pub handshake_timeout_ms: u64,
    #[serde(default = "default_wait_ms")]
    pub write_wait_ms: u64,
    #[serde(default = "default_wait_ms")]
    pub read_wait_ms: u64,
    #[serde(default = "default_buffer_size")]
    pub read_buffer_size: usize,
    #[serde(default = "default_buffer_size")]
    pub write_buffer_size: usize,
    /// Log DNS and connect timings while dialing
    #[serde(default = "default_true")]
    pub verbose_dialer: bool,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            handshake_timeout_ms: default_handshake_timeout_ms(),
            write_wait_ms: default_wait_ms(),
            read_wait_ms: default_wait_ms(),
            read_buffer_size: default_buffer_size(),
            write_buffer_size: default_buffer_size(),
            verbose_dialer: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeartbeatSettings {
    #[serde(default = "default_heartbeat_interval")]
    pub interval_secs: u64,
    /// No PONG for this long after a PING marks the peer unhealthy
    #[serde(default = "default_pong_timeout")]
    pub pong_timeout_secs: u64,
}

impl Default for HeartbeatSettings {
    fn default() -> Self {
        Self {
            interval_secs: default_heartbeat_interval(),
            pong_timeout_secs: default_pong_timeout(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_handshake_timeout_ms() -> u64 {
    1_000
}

fn default_wait_ms() -> u64 {
    15_000
}

fn default_buffer_size() -> usize {
    8192
}

fn default_true() -> bool {
    true
}

fn default_heartbeat_interval() -> u64 {
    30
}

fn default_pong_timeout() -> u64 {
    90
}

impl GremlinConfig {
    /// Load configuration from a YAML file
    pub fn load(config_path: impl AsRef<Path>) -> Result<Self> {
        dotenv::dotenv().ok(); // Don't fail if .env doesn't exist

        let yaml_content = std::fs::read_to_string(config_path)?;
        Self::from_yaml(&yaml_content)
    }

    /// Parse YAML, apply environment overrides and validate
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let mut config: GremlinConfig = serde_yaml::from_str(yaml)?;

        if let Ok(host) = std::env::var(HOST_ENV_VAR) {
            info!("Overriding host from environment variable");
            config.host = host;
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    ///
    /// Scheme and buffer checks are left to the session itself.
    fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            return Err(ConfigError::ValidationError("host must not be empty".to_string()));
        }

        if self.heartbeat.interval_secs == 0 {
            return Err(ConfigError::ValidationError(
                "heartbeat.interval_secs must be greater than 0".to_string(),
            ));
        }

        if self.heartbeat.pong_timeout_secs < self.heartbeat.interval_secs {
            return Err(ConfigError::ValidationError(
                "heartbeat.pong_timeout_secs must not be shorter than the interval".to_string(),
            ));
        }

        let valid_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_levels.contains(&self.log_level.to_lowercase().as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "log_level must be one of: {}",
                valid_levels.join(", ")
            )));
        }

        Ok(())
    }

    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_secs(self.heartbeat.interval_secs)
    }

    pub fn pong_timeout(&self) -> Duration {
        Duration::from_secs(self.heartbeat.pong_timeout_secs)
    }

    /// Session configuration described by this file
    pub fn session_config(&self) -> SessionConfig {
        let settings = &self.session;
        let factory = if settings.verbose_dialer {
            TungsteniteDialerFactory::verbose()
        } else {
            TungsteniteDialerFactory::new()
        };

        let config = SessionConfig::default()
            .with_handshake_timeout(Duration::from_millis(settings.handshake_timeout_ms))
            .with_write_wait(Duration::from_millis(settings.write_wait_ms))
            .with_read_wait(Duration::from_millis(settings.read_wait_ms))
            .with_read_buffer_size(settings.read_buffer_size)
            .with_write_buffer_size(settings.write_buffer_size)
            .with_dialer_factory(Arc::new(factory));

        if self.headers.is_empty() {
            config
        } else {
            let headers: Headers = self.headers.clone();
            config.with_headers(Arc::new(StaticHeaders::new(headers)))
        }
    }

    /// Log configuration summary
    pub fn log(&self) {
        info!("Configuration loaded:");
        info!("  Host: {}", self.host);
        info!("  Handshake timeout: {} ms", self.session.handshake_timeout_ms);
        info!(
            "  Read/write wait: {} ms / {} ms",
            self.session.read_wait_ms, self.session.write_wait_ms
        );
        info!("  Heartbeat interval: {} s", self.heartbeat.interval_secs);
        info!("  Extra headers: {}", self.headers.len());
        info!("  Log level: {}", self.log_level);
    }
}
