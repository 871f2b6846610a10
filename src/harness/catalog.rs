//! # Instrument Catalog
//!
//! Ordered accumulation of symbols discovered from security-list
//! fragments, plus the one-shot completion signal fired by the
//! last-fragment flag.
//!
//! The catalog is append-only and does NOT deduplicate: duplicate
//! symbols across repeated fragments accumulate. Completion fires
//! exactly once; last-fragment flags seen after that still append
//! symbols but never re-fire.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::{Mutex, Notify};

/// Append-only symbol catalog with a one-shot completion signal.
#[derive(Debug, Default)]
pub struct InstrumentCatalog {
    symbols: Mutex<Vec<String>>,
    complete: AtomicBool,
    completion: Notify,
}

impl InstrumentCatalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends the symbols of one fragment in arrival order.
    pub async fn append(&self, symbols: impl IntoIterator<Item = String>) {
        self.symbols.lock().await.extend(symbols);
    }

    /// Fires the completion signal.
    ///
    /// Returns true only on the first call; later calls are no-ops.
    pub fn mark_complete(&self) -> bool {
        let first = !self.complete.swap(true, Ordering::SeqCst);
        if first {
            self.completion.notify_waiters();
        }
        first
    }

    /// Returns whether the completion signal has fired.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.complete.load(Ordering::SeqCst)
    }

    /// Returns the accumulated symbols in arrival order.
    ///
    /// Duplicates from repeated fragments are preserved.
    pub async fn symbols(&self) -> Vec<String> {
        self.symbols.lock().await.clone()
    }

    /// Waits for the completion signal.
    ///
    /// # Errors
    ///
    /// Returns `Err(())` when the timeout elapses before the last
    /// fragment arrives.
    pub async fn wait_complete(&self, timeout: Duration) -> Result<(), ()> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            let notified = self.completion.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if self.is_complete() {
                return Ok(());
            }

            if tokio::time::timeout_at(deadline, notified).await.is_err() {
                return Err(());
            }
        }
    }
}
