//! # Message Dispatch
//!
//! Single consumer of the engine's event channel.
//!
//! One dispatcher task owns the receiving end of the event channel and
//! is the only place harness state mutates in response to inbound
//! traffic: catalog appends, market-data captures, correlation resolves,
//! and the session directory all happen here. Malformed messages are
//! logged and skipped; the event stream is never aborted by one bad
//! message.

use crate::engine::{EngineEvent, SessionHandle, SessionRole};
use crate::error::MessageHandlingError;
use crate::harness::catalog::InstrumentCatalog;
use crate::harness::correlator::RequestCorrelator;
use crate::harness::market_data::MarketDataAggregator;
use crate::protocol::fields::tags;
use crate::protocol::inbound::{
    ExecutionReportMessage, MarketDataMessage, MassQuoteAckMessage, QuoteMessage, RejectMessage,
    SecurityListMessage,
};
use crate::protocol::{FieldMap, InboundMessage};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex, Notify};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Tracks which sessions are currently logged on.
///
/// Fed by the dispatcher from Logon/Logout events; the orchestrator
/// suspends on [`SessionDirectory::wait_logon`] instead of sleeping a
/// fixed interval after engine start.
#[derive(Debug, Default)]
pub struct SessionDirectory {
    active: Mutex<Vec<SessionHandle>>,
    changed: Notify,
}

impl SessionDirectory {
    /// Creates an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a session as logged on.
    pub async fn logon(&self, session: SessionHandle) {
        let mut active = self.active.lock().await;
        if !active.contains(&session) {
            active.push(session);
        }
        drop(active);
        self.changed.notify_waiters();
    }

    /// Records a session as logged out.
    pub async fn logout(&self, session: &SessionHandle) {
        self.active.lock().await.retain(|s| s != session);
        self.changed.notify_waiters();
    }

    /// Returns the first logged-on session with the given role, if any.
    pub async fn active_for(&self, role: SessionRole) -> Option<SessionHandle> {
        self.active
            .lock()
            .await
            .iter()
            .find(|s| s.role() == role)
            .cloned()
    }

    /// Waits until a session with the given role is logged on.
    ///
    /// # Errors
    ///
    /// Returns `Err(())` when the window elapses with no such session.
    pub async fn wait_logon(
        &self,
        role: SessionRole,
        timeout: Duration,
    ) -> Result<SessionHandle, ()> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            let notified = self.changed.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if let Some(session) = self.active_for(role).await {
                return Ok(session);
            }

            if tokio::time::timeout_at(deadline, notified).await.is_err() {
                return Err(());
            }
        }
    }
}

/// Routes engine events into the harness collections.
pub struct MessageDispatcher {
    catalog: Arc<InstrumentCatalog>,
    aggregator: Arc<MarketDataAggregator>,
    correlator: Arc<RequestCorrelator>,
    directory: Arc<SessionDirectory>,
}

impl MessageDispatcher {
    /// Creates a dispatcher over the shared harness collections.
    #[must_use]
    pub fn new(
        catalog: Arc<InstrumentCatalog>,
        aggregator: Arc<MarketDataAggregator>,
        correlator: Arc<RequestCorrelator>,
        directory: Arc<SessionDirectory>,
    ) -> Self {
        Self {
            catalog,
            aggregator,
            correlator,
            directory,
        }
    }

    /// Spawns the dispatch task over the engine's event channel.
    ///
    /// The task exits when the channel closes, i.e. when the engine
    /// drops its sender on stop.
    pub fn spawn(self, events: mpsc::Receiver<EngineEvent>) -> JoinHandle<()> {
        tokio::spawn(self.run(events))
    }

    /// Consumes events until the channel closes.
    pub async fn run(self, mut events: mpsc::Receiver<EngineEvent>) {
        while let Some(event) = events.recv().await {
            match event {
                EngineEvent::Logon(session) => {
                    info!(session = %session, role = %session.role(), "session logged on");
                    self.directory.logon(session).await;
                }
                EngineEvent::Logout(session) => {
                    info!(session = %session, "session logged out");
                    self.directory.logout(&session).await;
                }
                EngineEvent::Message(session, message) => {
                    self.handle_message(&session, &message).await;
                }
            }
        }
        debug!("event channel closed, dispatcher exiting");
    }

    async fn handle_message(&self, session: &SessionHandle, message: &InboundMessage) {
        match message {
            InboundMessage::SecurityList(fields) => self.on_security_list(fields).await,
            InboundMessage::MarketDataSnapshot(fields)
            | InboundMessage::MarketDataIncremental(fields) => {
                self.on_market_data(message.name(), fields).await;
            }
            InboundMessage::MassQuoteAck(fields) => self.on_mass_quote_ack(fields).await,
            InboundMessage::Quote(fields) => Self::on_quote(fields),
            InboundMessage::TradingSessionStatus(fields) => {
                self.on_trading_session_status(fields).await;
            }
            InboundMessage::MarketDataRequestReject(fields) => {
                warn!(
                    session = %session,
                    md_req_id = fields.get(tags::MD_REQ_ID).unwrap_or("?"),
                    text = fields.get(tags::TEXT).unwrap_or(""),
                    "market data request rejected"
                );
                if let Some(id) = fields.get(tags::MD_REQ_ID) {
                    self.resolve_or_note(id).await;
                }
            }
            InboundMessage::Reject(fields) => {
                let reject = RejectMessage::from_fields(fields);
                warn!(
                    session = %session,
                    reason = reject.reason.as_deref().unwrap_or("?"),
                    text = reject.text.as_deref().unwrap_or(""),
                    "session-level reject"
                );
            }
            InboundMessage::ExecutionReport(fields) => {
                if let Some(report) = ExecutionReportMessage::from_fields(fields) {
                    info!(
                        cl_ord_id = %report.cl_ord_id,
                        ord_status = %report.ord_status,
                        symbol = report.symbol.as_deref().unwrap_or("?"),
                        "execution report"
                    );
                } else {
                    let err = MessageHandlingError::new(
                        "ExecutionReport",
                        "missing ClOrdID (11) or OrdStatus (39)",
                    );
                    warn!(error = %err, "skipping malformed execution report");
                }
            }
            InboundMessage::QuoteCancel(fields) => {
                info!(
                    quote_req_id = fields.get(tags::QUOTE_REQ_ID).unwrap_or("?"),
                    "quote cancel received"
                );
            }
            InboundMessage::MassQuote(fields) => {
                debug!(
                    quote_sets = fields.get(tags::NO_QUOTE_SETS).unwrap_or("?"),
                    "mass quote received"
                );
            }
            InboundMessage::NewOrderSingle(_) | InboundMessage::MarketDataRequest(_) => {
                debug!(message = message.name(), "echoed request, ignored");
            }
            InboundMessage::QuoteRequest(fields) => {
                debug!(
                    symbol = fields.get(tags::SYMBOL).unwrap_or("?"),
                    "inbound quote request, observational only"
                );
            }
        }
    }

    async fn on_security_list(&self, fields: &FieldMap) {
        let fragment = SecurityListMessage::from_fields(fields);
        info!(
            symbols = fragment.symbols.len(),
            last_fragment = fragment.last_fragment,
            "security list fragment"
        );
        self.catalog.append(fragment.symbols).await;
        if fragment.last_fragment {
            if self.catalog.mark_complete() {
                info!("security list complete");
            }
            if let Some(id) = fields.get(tags::SECURITY_REQ_ID) {
                self.resolve_or_note(id).await;
            }
        }
    }

    async fn on_market_data(&self, name: &'static str, fields: &FieldMap) {
        let Some(md) = MarketDataMessage::from_fields(fields) else {
            let err = MessageHandlingError::new(name, "missing Symbol (55)");
            warn!(error = %err, "skipping malformed market data message");
            return;
        };
        debug!(
            symbol = %md.symbol,
            entries = md.entry_count.unwrap_or(0),
            "capturing market data"
        );
        self.aggregator.capture(&md.symbol, fields.raw().clone()).await;
        if let Some(id) = fields.get(tags::MD_REQ_ID) {
            self.resolve_or_note(id).await;
        }
    }

    async fn on_mass_quote_ack(&self, fields: &FieldMap) {
        let Some(ack) = MassQuoteAckMessage::from_fields(fields) else {
            let err = MessageHandlingError::new(
                "MassQuoteAcknowledgement",
                "missing Symbol (55), QuoteReqID (131) or QuoteStatus (297)",
            );
            warn!(error = %err, "skipping malformed quote acknowledgement");
            return;
        };
        info!(
            symbol = %ack.symbol,
            quote_req_id = %ack.quote_req_id,
            quote_status = ack.quote_status,
            "quote request acknowledged"
        );
        self.resolve_or_note(&ack.quote_req_id).await;
    }

    fn on_quote(fields: &FieldMap) {
        if let Some(quote) = QuoteMessage::from_fields(fields) {
            info!(
                symbol = %quote.symbol,
                quote_id = %quote.quote_id,
                bid = quote.bid_px,
                offer = quote.offer_px,
                bid_size = quote.bid_size,
                offer_size = quote.offer_size,
                "quote"
            );
        } else {
            let err = MessageHandlingError::new("Quote", "missing Symbol (55) or QuoteID (117)");
            warn!(error = %err, "skipping malformed quote");
        }
    }

    async fn on_trading_session_status(&self, fields: &FieldMap) {
        info!(
            trad_ses_req_id = fields.get(tags::TRAD_SES_REQ_ID).unwrap_or("?"),
            "trading session status"
        );
        if let Some(id) = fields.get(tags::TRAD_SES_REQ_ID) {
            self.resolve_or_note(id).await;
        }
    }

    /// Correlation misses are benign: some responses echo no usable ID.
    async fn resolve_or_note(&self, request_id: &str) {
        if !self.correlator.resolve(request_id).await {
            debug!(request_id, "no pending request for correlation id");
        }
    }
}
