//! # Configuration
//!
//! Harness configuration loading and management.
//!
//! The engine's own session settings file (CompIDs, hosts, heartbeat
//! intervals) is an opaque path handed straight to the engine; this
//! module only covers the harness-level knobs: wait windows, request
//! quantities, export location, and logging.
//!
//! # Configuration Sources
//!
//! Configuration is loaded in the following order (later sources override
//! earlier):
//! 1. Built-in default values
//! 2. Configuration file (if exists)
//! 3. Environment variables (prefixed with `FIX_HARNESS_`)
//!
//! # Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `FIX_HARNESS_CONFIG_FILE` | Harness config file path | `harness.toml` |
//! | `FIX_HARNESS_EXPORT_DIR` | Export artifact directory | `.` |
//! | `FIX_HARNESS_DRAIN_MS` | Blanket drain window | `60000` |
//! | `FIX_HARNESS_LOG_LEVEL` | Log level | `info` |

use crate::engine::SessionHandle;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse configuration.
    #[error("failed to parse config: {0}")]
    Parse(String),

    /// Invalid configuration value.
    #[error("invalid config value for {field}: {message}")]
    InvalidValue {
        /// Field name.
        field: String,
        /// Error message.
        message: String,
    },
}

/// Wait windows, in milliseconds.
///
/// Defaults: 2000 ms around logon and responses, a 2000 ms hold between
/// quote request and cancel, and a 60000 ms blanket drain before
/// teardown.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimingConfig {
    /// Window to wait for session logon.
    #[serde(default = "default_logon_timeout_ms")]
    pub logon_timeout_ms: u64,

    /// Window to wait for correlated responses to a request batch.
    #[serde(default = "default_response_timeout_ms")]
    pub response_timeout_ms: u64,

    /// Hold between issuing quote requests and cancelling them.
    #[serde(default = "default_quote_hold_ms")]
    pub quote_hold_ms: u64,

    /// Blanket drain for unsolicited traffic before teardown.
    #[serde(default = "default_drain_ms")]
    pub drain_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            logon_timeout_ms: default_logon_timeout_ms(),
            response_timeout_ms: default_response_timeout_ms(),
            quote_hold_ms: default_quote_hold_ms(),
            drain_ms: default_drain_ms(),
        }
    }
}

/// Request quantity settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestConfig {
    /// NewOrderSingle quantity.
    #[serde(default = "default_order_quantity")]
    pub order_quantity: f64,

    /// QuoteRequest quantity.
    #[serde(default = "default_quote_quantity")]
    pub quote_quantity: f64,
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self {
            order_quantity: default_order_quantity(),
            quote_quantity: default_quote_quantity(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Main harness configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HarnessConfig {
    /// Wait windows.
    #[serde(default)]
    pub timing: TimingConfig,

    /// Request quantities.
    #[serde(default)]
    pub requests: RequestConfig,

    /// Logging configuration.
    #[serde(default)]
    pub log: LogConfig,

    /// Directory for per-symbol export artifacts.
    #[serde(default = "default_export_dir")]
    pub export_dir: PathBuf,

    /// Sessions to establish, identified by CompID pair. Role follows
    /// from the sender naming convention.
    #[serde(default = "default_sessions")]
    pub sessions: Vec<SessionHandle>,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            timing: TimingConfig::default(),
            requests: RequestConfig::default(),
            log: LogConfig::default(),
            export_dir: default_export_dir(),
            sessions: default_sessions(),
        }
    }
}

impl HarnessConfig {
    /// Loads configuration from environment variables and an optional
    /// config file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        let config_path =
            std::env::var("FIX_HARNESS_CONFIG_FILE").unwrap_or_else(|_| "harness.toml".to_string());
        if Path::new(&config_path).exists() {
            config = Self::from_file(&config_path)?;
        }

        config.apply_env_overrides();
        Ok(config)
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Applies environment variable overrides to the configuration.
    fn apply_env_overrides(&mut self) {
        if let Ok(dir) = std::env::var("FIX_HARNESS_EXPORT_DIR") {
            self.export_dir = PathBuf::from(dir);
        }
        if let Ok(drain) = std::env::var("FIX_HARNESS_DRAIN_MS") {
            if let Ok(ms) = drain.parse() {
                self.timing.drain_ms = ms;
            }
        }
        if let Ok(level) = std::env::var("FIX_HARNESS_LOG_LEVEL") {
            self.log.level = level;
        }
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log.level.to_lowercase().as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "log.level".to_string(),
                message: format!(
                    "invalid log level '{}', must be one of: {:?}",
                    self.log.level, valid_levels
                ),
            });
        }

        if self.requests.order_quantity <= 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "requests.order_quantity".to_string(),
                message: "quantity must be positive".to_string(),
            });
        }
        if self.requests.quote_quantity <= 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "requests.quote_quantity".to_string(),
                message: "quantity must be positive".to_string(),
            });
        }

        if self.sessions.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "sessions".to_string(),
                message: "at least one session must be configured".to_string(),
            });
        }

        Ok(())
    }
}

// ============================================================================
// Default Value Functions
// ============================================================================

fn default_logon_timeout_ms() -> u64 {
    2000
}

fn default_response_timeout_ms() -> u64 {
    2000
}

fn default_quote_hold_ms() -> u64 {
    2000
}

fn default_drain_ms() -> u64 {
    60000
}

fn default_order_quantity() -> f64 {
    1.0
}

fn default_quote_quantity() -> f64 {
    10.0
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_export_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_sessions() -> Vec<SessionHandle> {
    vec![
        SessionHandle::new("MKT_CLIENT", "BROKER"),
        SessionHandle::new("TRD_CLIENT", "BROKER"),
    ]
}
