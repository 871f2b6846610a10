//! # Session Identity
//!
//! Session handles and role classification.
//!
//! A [`SessionHandle`] is an opaque reference to one active FIX session,
//! created and destroyed by the external engine; the harness only reads
//! its identity. Sessions are partitioned into market-data and trading
//! roles by a naming convention on the sender identity: senders whose
//! CompID starts with `TRD` are trading sessions, everything else is a
//! market-data session.

use serde::{Deserialize, Serialize};

/// Sender-CompID prefix that marks a trading session.
const TRADING_SENDER_PREFIX: &str = "TRD";

/// Role of a session, derived from the sender naming convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionRole {
    /// Market-data session (security lists, quotes, refreshes).
    MarketData,
    /// Trading session (orders, trading session status).
    Trading,
}

impl std::fmt::Display for SessionRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MarketData => write!(f, "MARKET_DATA"),
            Self::Trading => write!(f, "TRADING"),
        }
    }
}

/// Opaque identifier for one active FIX session.
///
/// Owned by the engine; the harness holds clones only for addressing
/// outbound messages and tagging log lines.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionHandle {
    sender_comp_id: String,
    target_comp_id: String,
}

impl SessionHandle {
    /// Creates a handle from sender and target identities.
    #[must_use]
    pub fn new(sender_comp_id: impl Into<String>, target_comp_id: impl Into<String>) -> Self {
        Self {
            sender_comp_id: sender_comp_id.into(),
            target_comp_id: target_comp_id.into(),
        }
    }

    /// Returns the sender CompID.
    #[inline]
    #[must_use]
    pub fn sender_comp_id(&self) -> &str {
        &self.sender_comp_id
    }

    /// Returns the target CompID.
    #[inline]
    #[must_use]
    pub fn target_comp_id(&self) -> &str {
        &self.target_comp_id
    }

    /// Returns the session role per the sender naming convention.
    #[must_use]
    pub fn role(&self) -> SessionRole {
        if self.sender_comp_id.starts_with(TRADING_SENDER_PREFIX) {
            SessionRole::Trading
        } else {
            SessionRole::MarketData
        }
    }
}

impl std::fmt::Display for SessionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}->{}", self.sender_comp_id, self.target_comp_id)
    }
}
