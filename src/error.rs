//! # Harness Error Taxonomy
//!
//! Only configuration and connectivity failures propagate to the top
//! level and abort a scenario. Message-handling failures are recovered
//! at the dispatcher, correlation misses are benign, and export failures
//! are isolated per symbol; each of those is logged where it happens and
//! swallowed, so one malformed message or unwritable file never aborts
//! an otherwise-successful run.

use crate::config::ConfigError;
use crate::engine::{EngineError, SessionRole};
use thiserror::Error;

/// Fatal scenario errors.
#[derive(Debug, Error)]
pub enum HarnessError {
    /// Missing or invalid harness settings. Aborts before CONNECTING.
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigError),

    /// The engine failed to start or address a session. Fatal.
    #[error("connectivity error: {0}")]
    Connectivity(#[from] EngineError),

    /// No session with the required role was logged on within the window.
    #[error("no {role} session logged on within {timeout_ms} ms")]
    LogonTimeout {
        /// Role that never logged on.
        role: SessionRole,
        /// Wait window that elapsed.
        timeout_ms: u64,
    },

    /// The engine's session registry has no session for a required role.
    #[error("no {role} session configured")]
    MissingSession {
        /// Role absent from the registry.
        role: SessionRole,
    },
}

/// A malformed inbound message, recovered locally at the dispatcher.
#[derive(Debug, Error)]
#[error("malformed {message_name}: {detail}")]
pub struct MessageHandlingError {
    /// Message type name for the log record.
    pub message_name: &'static str,
    /// What was missing or unparseable.
    pub detail: String,
}

impl MessageHandlingError {
    /// Builds an error for a missing or unparseable field.
    #[must_use]
    pub fn new(message_name: &'static str, detail: impl Into<String>) -> Self {
        Self {
            message_name,
            detail: detail.into(),
        }
    }
}
