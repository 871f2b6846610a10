//! # Request Correlation
//!
//! Tracks outstanding requests keyed by generated identifier and matches
//! them against asynchronous responses.
//!
//! The correlator owns one [`RequestRecord`] per live request ID. It
//! enforces no timeouts of its own; the orchestrator drives
//! [`RequestCorrelator::wait_idle`], which suspends on a completion
//! signal resolved by [`RequestCorrelator::resolve`] and, on timeout,
//! transitions the remaining pending records to
//! [`RequestState::TimedOut`]. There is no silent fall-through.
//!
//! # Locking
//!
//! The record map sits behind a single async mutex; it is mutated from
//! the dispatcher task (resolve) and the orchestrator (register,
//! wait_idle) only through it.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::{Mutex, Notify};

/// Family of a tracked request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestType {
    /// Security list discovery.
    SecurityList,
    /// Trading session status snapshot.
    TradingSessionStatus,
    /// Market data subscription.
    MarketData,
    /// Quote solicitation.
    Quote,
    /// Quote cancellation.
    QuoteCancel,
}

impl std::fmt::Display for RequestType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SecurityList => write!(f, "SECURITY_LIST"),
            Self::TradingSessionStatus => write!(f, "TRADING_SESSION_STATUS"),
            Self::MarketData => write!(f, "MARKET_DATA"),
            Self::Quote => write!(f, "QUOTE"),
            Self::QuoteCancel => write!(f, "QUOTE_CANCEL"),
        }
    }
}

/// Lifecycle state of a tracked request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestState {
    /// Sent, no correlated response yet.
    Pending,
    /// A correlated response arrived.
    Resolved,
    /// The wait window elapsed without a response.
    TimedOut,
}

/// One tracked request.
#[derive(Debug, Clone)]
pub struct RequestRecord {
    /// Generated request identifier.
    pub request_id: String,
    /// Request family.
    pub request_type: RequestType,
    /// Instrument symbol, when the request targets one.
    pub symbol: Option<String>,
    /// When the request was registered.
    pub issued_at: DateTime<Utc>,
    /// Current state.
    pub state: RequestState,
}

/// Tracks pending requests and resolves them against responses.
#[derive(Debug, Default)]
pub struct RequestCorrelator {
    records: Mutex<HashMap<String, RequestRecord>>,
    changed: Notify,
}

impl RequestCorrelator {
    /// Creates an empty correlator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a freshly issued request as pending.
    ///
    /// One live record per request ID; re-registering an ID replaces the
    /// old record, which cannot happen with generator-issued IDs.
    pub async fn register(
        &self,
        request_id: impl Into<String>,
        request_type: RequestType,
        symbol: Option<String>,
    ) {
        let request_id = request_id.into();
        let record = RequestRecord {
            request_id: request_id.clone(),
            request_type,
            symbol,
            issued_at: Utc::now(),
            state: RequestState::Pending,
        };
        self.records.lock().await.insert(request_id, record);
    }

    /// Resolves a pending request.
    ///
    /// Returns true when a matching PENDING record existed and was
    /// transitioned to RESOLVED. Unknown or already-settled IDs return
    /// false and change nothing; some response types carry no usable
    /// correlation ID, so a miss is benign.
    pub async fn resolve(&self, request_id: &str) -> bool {
        let resolved = {
            let mut records = self.records.lock().await;
            match records.get_mut(request_id) {
                Some(record) if record.state == RequestState::Pending => {
                    record.state = RequestState::Resolved;
                    true
                }
                _ => false,
            }
        };
        if resolved {
            self.changed.notify_waiters();
        }
        resolved
    }

    /// Counts pending records of a request family.
    pub async fn pending_count(&self, request_type: RequestType) -> usize {
        self.records
            .lock()
            .await
            .values()
            .filter(|r| r.request_type == request_type && r.state == RequestState::Pending)
            .count()
    }

    /// Returns a copy of one record, if tracked.
    pub async fn record(&self, request_id: &str) -> Option<RequestRecord> {
        self.records.lock().await.get(request_id).cloned()
    }

    /// Waits until every pending request of a family resolves.
    ///
    /// Suspends on the completion signal rather than polling. When the
    /// timeout elapses first, the remaining pending records of that
    /// family transition to TIMED_OUT and the count of them is returned
    /// as the error value.
    ///
    /// # Errors
    ///
    /// Returns `Err(timed_out_count)` when the window elapsed with
    /// requests still outstanding.
    pub async fn wait_idle(
        &self,
        request_type: RequestType,
        timeout: Duration,
    ) -> Result<(), usize> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            let notified = self.changed.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if self.pending_count(request_type).await == 0 {
                return Ok(());
            }

            if tokio::time::timeout_at(deadline, notified).await.is_err() {
                let timed_out = self.expire_pending(request_type).await;
                return Err(timed_out);
            }
        }
    }

    async fn expire_pending(&self, request_type: RequestType) -> usize {
        let mut records = self.records.lock().await;
        let mut expired = 0;
        for record in records.values_mut() {
            if record.request_type == request_type && record.state == RequestState::Pending {
                record.state = RequestState::TimedOut;
                expired += 1;
            }
        }
        expired
    }
}
