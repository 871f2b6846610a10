//! # Scripted Engine
//!
//! A deterministic [`FixEngine`] implementation for tests and dry runs.
//!
//! Where a real engine would put messages on the wire, the scripted
//! engine records them and immediately delivers whatever inbound replies
//! the test scripted for that outbound message kind. Reply scripts see
//! the outgoing message, so they can echo correlation identifiers back
//! the way a counterparty would.
//!
//! # Examples
//!
//! ```ignore
//! let (tx, rx) = tokio::sync::mpsc::channel(64);
//! let engine = ScriptedEngine::new(vec![market_session()], tx);
//! engine.script(OutboundKind::QuoteRequest, |out| {
//!     let req_id = out.get(tags::QUOTE_REQ_ID).unwrap_or_default().to_string();
//!     vec![mass_quote_ack(&req_id)]
//! });
//! ```

use crate::engine::log_adapter::{LogSink, SessionLogAdapter, TracingLogSink};
use crate::engine::session::SessionHandle;
use crate::engine::{EngineError, EngineEvent, FixEngine};
use crate::protocol::fields::EXPORT_DELIMITER;
use crate::protocol::{InboundMessage, OutboundKind, OutboundMessage};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use tokio::sync::mpsc;

type ReplyScript = Box<dyn Fn(&OutboundMessage) -> Vec<InboundMessage> + Send + Sync>;

/// Scripted in-process engine double.
pub struct ScriptedEngine {
    sessions: Vec<SessionHandle>,
    events_tx: mpsc::Sender<EngineEvent>,
    scripts: Mutex<HashMap<OutboundKind, ReplyScript>>,
    sent: Mutex<Vec<(SessionHandle, OutboundMessage)>>,
    logs: HashMap<SessionHandle, SessionLogAdapter>,
    started: AtomicBool,
    fail_start: AtomicBool,
}

impl ScriptedEngine {
    /// Creates a scripted engine over the given sessions, delivering
    /// events into `events_tx`. Wire traffic is logged per session
    /// through a [`SessionLogAdapter`] over [`TracingLogSink`].
    #[must_use]
    pub fn new(sessions: Vec<SessionHandle>, events_tx: mpsc::Sender<EngineEvent>) -> Self {
        let logs = sessions
            .iter()
            .map(|session| {
                (
                    session.clone(),
                    SessionLogAdapter::new(session.clone(), Box::new(TracingLogSink)),
                )
            })
            .collect();
        Self {
            sessions,
            events_tx,
            scripts: Mutex::new(HashMap::new()),
            sent: Mutex::new(Vec::new()),
            logs,
            started: AtomicBool::new(false),
            fail_start: AtomicBool::new(false),
        }
    }

    /// Registers a reply script for an outbound message kind.
    ///
    /// The script runs once per send of that kind; its replies are
    /// delivered on the same session the message was sent on.
    pub fn script<F>(&self, kind: OutboundKind, reply: F)
    where
        F: Fn(&OutboundMessage) -> Vec<InboundMessage> + Send + Sync + 'static,
    {
        self.scripts
            .lock()
            .expect("script table poisoned")
            .insert(kind, Box::new(reply));
    }

    /// Makes the next `start` call fail, for connectivity-error tests.
    pub fn fail_next_start(&self) {
        self.fail_start.store(true, Ordering::SeqCst);
    }

    /// Returns every message sent so far, in send order.
    #[must_use]
    pub fn sent(&self) -> Vec<(SessionHandle, OutboundMessage)> {
        self.sent.lock().expect("sent log poisoned").clone()
    }

    /// Delivers an unsolicited inbound message, as a counterparty pushing
    /// market data would.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::SendFailed`] if the event channel is closed.
    pub async fn deliver(
        &self,
        session: &SessionHandle,
        message: InboundMessage,
    ) -> Result<(), EngineError> {
        if let Some(log) = self.logs.get(session) {
            log.on_incoming(&message.fields().raw().normalized());
        }
        self.events_tx
            .send(EngineEvent::Message(session.clone(), message))
            .await
            .map_err(|e| EngineError::SendFailed {
                session: session.to_string(),
                reason: e.to_string(),
            })
    }
}

#[async_trait]
impl FixEngine for ScriptedEngine {
    async fn start(&self) -> Result<(), EngineError> {
        if self.fail_start.swap(false, Ordering::SeqCst) {
            return Err(EngineError::StartFailed("scripted start failure".into()));
        }
        self.started.store(true, Ordering::SeqCst);
        for session in &self.sessions {
            if let Some(log) = self.logs.get(session) {
                log.on_event("logon");
            }
            let _ = self
                .events_tx
                .send(EngineEvent::Logon(session.clone()))
                .await;
        }
        Ok(())
    }

    async fn stop(&self) {
        if !self.started.swap(false, Ordering::SeqCst) {
            return;
        }
        for session in &self.sessions {
            if let Some(log) = self.logs.get(session) {
                log.on_event("logout");
                log.close();
            }
            let _ = self
                .events_tx
                .send(EngineEvent::Logout(session.clone()))
                .await;
        }
    }

    fn sessions(&self) -> Vec<SessionHandle> {
        self.sessions.clone()
    }

    async fn send(
        &self,
        message: OutboundMessage,
        session: &SessionHandle,
    ) -> Result<(), EngineError> {
        if !self.sessions.contains(session) {
            return Err(EngineError::UnknownSession(session.to_string()));
        }

        if let Some(log) = self.logs.get(session) {
            let line = message
                .fields()
                .iter()
                .map(|(tag, value)| format!("{tag}={value}"))
                .collect::<Vec<_>>()
                .join(&EXPORT_DELIMITER.to_string());
            log.on_outgoing(&line);
        }

        let replies = {
            let scripts = self.scripts.lock().expect("script table poisoned");
            scripts
                .get(&message.kind())
                .map(|script| script(&message))
                .unwrap_or_default()
        };

        self.sent
            .lock()
            .expect("sent log poisoned")
            .push((session.clone(), message));

        for reply in replies {
            self.deliver(session, reply).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::protocol::fields::{tags, FieldMap};
    use crate::protocol::outbound::QuoteRequestBuilder;

    fn market_session() -> SessionHandle {
        SessionHandle::new("MKT_CLIENT", "BROKER")
    }

    #[tokio::test]
    async fn start_emits_logon_per_session() {
        let (tx, mut rx) = mpsc::channel(8);
        let engine = ScriptedEngine::new(vec![market_session()], tx);
        engine.start().await.unwrap();

        match rx.recv().await.unwrap() {
            EngineEvent::Logon(session) => assert_eq!(session, market_session()),
            other => panic!("expected logon, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn failed_start_reports_connectivity() {
        let (tx, _rx) = mpsc::channel(8);
        let engine = ScriptedEngine::new(vec![market_session()], tx);
        engine.fail_next_start();
        assert!(matches!(
            engine.start().await,
            Err(EngineError::StartFailed(_))
        ));
    }

    #[tokio::test]
    async fn scripted_reply_echoes_request_id() {
        let (tx, mut rx) = mpsc::channel(8);
        let engine = ScriptedEngine::new(vec![market_session()], tx);
        engine.script(OutboundKind::QuoteRequest, |out| {
            let req_id = out.get(tags::QUOTE_REQ_ID).unwrap().to_string();
            vec![InboundMessage::MassQuoteAck(FieldMap::new(vec![
                (tags::SYMBOL, "EUR/USD".to_string()),
                (tags::QUOTE_REQ_ID, req_id),
                (tags::QUOTE_STATUS, "0".to_string()),
            ]))]
        });

        let request = QuoteRequestBuilder::new("QuoteReqID_1", "EUR/USD").build();
        engine.send(request, &market_session()).await.unwrap();

        match rx.recv().await.unwrap() {
            EngineEvent::Message(_, InboundMessage::MassQuoteAck(fields)) => {
                assert_eq!(fields.get(tags::QUOTE_REQ_ID), Some("QuoteReqID_1"));
            }
            other => panic!("expected mass quote ack, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn send_to_unknown_session_fails() {
        let (tx, _rx) = mpsc::channel(8);
        let engine = ScriptedEngine::new(vec![market_session()], tx);
        let stranger = SessionHandle::new("TRD_CLIENT", "BROKER");
        let request = QuoteRequestBuilder::new("QuoteReqID_1", "EUR/USD").build();
        assert!(matches!(
            engine.send(request, &stranger).await,
            Err(EngineError::UnknownSession(_))
        ));
    }
}
