//! # Engine Collaborator Surface
//!
//! The narrow interface to the external FIX engine. The engine owns
//! logon/logout, heartbeats, sequence numbering, and wire encode/decode;
//! the harness only starts and stops it, enumerates its sessions, sends
//! body fields, and consumes the events it delivers.
//!
//! # Event Delivery
//!
//! The engine is handed an `mpsc::Sender<EngineEvent>` at construction
//! and pushes every session lifecycle change and inbound message into
//! it. A single dispatcher task owns the receiving end, which keeps all
//! harness state mutation on one side of an explicit ownership boundary.

pub mod log_adapter;
pub mod scripted;
pub mod session;

use crate::protocol::{InboundMessage, OutboundMessage};
use async_trait::async_trait;
use thiserror::Error;

pub use session::{SessionHandle, SessionRole};

/// Errors surfaced by the engine collaborator.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The engine could not start (connectivity failure).
    #[error("engine failed to start: {0}")]
    StartFailed(String),

    /// A message could not be handed to the engine for delivery.
    #[error("send failed for session {session}: {reason}")]
    SendFailed {
        /// Target session.
        session: String,
        /// Failure detail.
        reason: String,
    },

    /// The addressed session is unknown to the engine.
    #[error("unknown session: {0}")]
    UnknownSession(String),
}

/// One event delivered by the engine.
#[derive(Debug, Clone)]
pub enum EngineEvent {
    /// A session completed logon.
    Logon(SessionHandle),
    /// A session logged out.
    Logout(SessionHandle),
    /// An inbound application or admin message arrived on a session.
    Message(SessionHandle, InboundMessage),
}

/// External FIX engine contract.
///
/// Implementations deliver inbound traffic through the event channel
/// supplied at construction; the methods here cover only the outbound
/// and lifecycle half of the conversation.
#[async_trait]
pub trait FixEngine: Send + Sync {
    /// Starts the engine: connects and begins session logon.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::StartFailed`] when connectivity cannot be
    /// established; this is fatal to the scenario.
    async fn start(&self) -> Result<(), EngineError>;

    /// Stops the engine, logging out all sessions. Best effort.
    async fn stop(&self);

    /// Enumerates the configured sessions.
    fn sessions(&self) -> Vec<SessionHandle>;

    /// Hands an outbound message to the engine for delivery on a session.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::SendFailed`] or
    /// [`EngineError::UnknownSession`] when delivery cannot be attempted.
    async fn send(
        &self,
        message: OutboundMessage,
        session: &SessionHandle,
    ) -> Result<(), EngineError>;
}
