//! # Session Log Adapter
//!
//! Wraps the engine's logging collaborator so every line carries the
//! identity of the session it belongs to and the direction of traffic.
//!
//! The engine logs raw lines through a [`LogSink`]; the
//! [`SessionLogAdapter`] prefixes each with
//! `<sender>.<target>.<direction>` and passes it through unchanged.
//! Closing the adapter releases the wrapped sink.

use crate::engine::session::SessionHandle;

/// Direction of a logged line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogDirection {
    /// Inbound wire traffic.
    Incoming,
    /// Outbound wire traffic.
    Outgoing,
    /// Session lifecycle event.
    Event,
    /// Error event.
    Error,
}

impl std::fmt::Display for LogDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Incoming => write!(f, "incoming"),
            Self::Outgoing => write!(f, "outgoing"),
            Self::Event => write!(f, "event"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Logging collaborator supplied by the engine.
pub trait LogSink: Send + Sync {
    /// Logs an inbound wire message.
    fn on_incoming(&self, text: &str);
    /// Logs an outbound wire message.
    fn on_outgoing(&self, text: &str);
    /// Logs a session event.
    fn on_event(&self, text: &str);
    /// Logs an error event.
    fn on_error_event(&self, text: &str);
    /// Releases any resources held by the sink. Default: nothing to do.
    fn close(&self) {}
}

/// Tags every log line with session identity and direction.
pub struct SessionLogAdapter {
    session: SessionHandle,
    inner: Box<dyn LogSink>,
}

impl SessionLogAdapter {
    /// Wraps a sink for the given session.
    #[must_use]
    pub fn new(session: SessionHandle, inner: Box<dyn LogSink>) -> Self {
        Self { session, inner }
    }

    fn tag(&self, text: &str, direction: LogDirection) -> String {
        format!(
            "{}.{}.{}: {}",
            self.session.sender_comp_id(),
            self.session.target_comp_id(),
            direction,
            text
        )
    }

    /// Closes the adapter, releasing the wrapped sink.
    pub fn close(&self) {
        self.inner.close();
    }
}

impl LogSink for SessionLogAdapter {
    fn on_incoming(&self, text: &str) {
        self.inner.on_incoming(&self.tag(text, LogDirection::Incoming));
    }

    fn on_outgoing(&self, text: &str) {
        self.inner.on_outgoing(&self.tag(text, LogDirection::Outgoing));
    }

    fn on_event(&self, text: &str) {
        self.inner.on_event(&self.tag(text, LogDirection::Event));
    }

    fn on_error_event(&self, text: &str) {
        self.inner
            .on_error_event(&self.tag(text, LogDirection::Error));
    }

    fn close(&self) {
        self.inner.close();
    }
}

/// Sink that routes engine log lines into `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLogSink;

impl LogSink for TracingLogSink {
    fn on_incoming(&self, text: &str) {
        tracing::debug!(target: "fix_harness::engine", "{text}");
    }

    fn on_outgoing(&self, text: &str) {
        tracing::debug!(target: "fix_harness::engine", "{text}");
    }

    fn on_event(&self, text: &str) {
        tracing::info!(target: "fix_harness::engine", "{text}");
    }

    fn on_error_event(&self, text: &str) {
        tracing::error!(target: "fix_harness::engine", "{text}");
    }
}
