//! # Market Data Aggregation
//!
//! Per-symbol ordered capture of inbound market-data messages.
//!
//! Snapshot and incremental refreshes interleave in the capture exactly
//! as they arrived; there is no merging, deduplication, or book
//! reconstruction. Rebuilding an up-to-date book from the capture is
//! downstream analysis work, not this component's.
//!
//! Symbol entries keep first-capture order so exports are stable, the
//! way an insertion-ordered map would behave.

use crate::protocol::RawMessage;
use tokio::sync::Mutex;

/// Ordered raw-message capture for one instrument.
#[derive(Debug, Clone)]
pub struct InstrumentCapture {
    /// Instrument symbol.
    pub symbol: String,
    /// Captured messages in arrival order.
    pub messages: Vec<RawMessage>,
}

/// Collects raw market-data messages per symbol, preserving arrival order.
#[derive(Debug, Default)]
pub struct MarketDataAggregator {
    captures: Mutex<Vec<InstrumentCapture>>,
}

impl MarketDataAggregator {
    /// Creates an empty aggregator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one raw message to a symbol's capture.
    ///
    /// The capture is created lazily on the first message for a symbol.
    pub async fn capture(&self, symbol: &str, raw: RawMessage) {
        let mut captures = self.captures.lock().await;
        if let Some(entry) = captures.iter_mut().find(|c| c.symbol == symbol) {
            entry.messages.push(raw);
        } else {
            captures.push(InstrumentCapture {
                symbol: symbol.to_string(),
                messages: vec![raw],
            });
        }
    }

    /// Returns a read-only copy of every capture, symbols in
    /// first-capture order, messages in arrival order.
    pub async fn snapshot(&self) -> Vec<InstrumentCapture> {
        self.captures.lock().await.clone()
    }

    /// Returns the capture for one symbol, if any message arrived for it.
    pub async fn capture_for(&self, symbol: &str) -> Option<InstrumentCapture> {
        self.captures
            .lock()
            .await
            .iter()
            .find(|c| c.symbol == symbol)
            .cloned()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn capture_preserves_arrival_order() {
        let aggregator = MarketDataAggregator::new();
        aggregator.capture("EUR/USD", RawMessage::new("A")).await;
        aggregator.capture("EUR/USD", RawMessage::new("B")).await;
        aggregator.capture("EUR/USD", RawMessage::new("C")).await;

        let capture = aggregator.capture_for("EUR/USD").await.unwrap();
        let order: Vec<_> = capture.messages.iter().map(RawMessage::as_str).collect();
        assert_eq!(order, vec!["A", "B", "C"]);
    }

    #[tokio::test]
    async fn snapshot_and_incremental_interleave_verbatim() {
        let aggregator = MarketDataAggregator::new();
        aggregator
            .capture("EUR/USD", RawMessage::new("35=W\u{1}55=EUR/USD"))
            .await;
        aggregator
            .capture("EUR/USD", RawMessage::new("35=X\u{1}55=EUR/USD"))
            .await;
        aggregator
            .capture("EUR/USD", RawMessage::new("35=W\u{1}55=EUR/USD"))
            .await;

        let capture = aggregator.capture_for("EUR/USD").await.unwrap();
        assert_eq!(capture.messages.len(), 3);
        assert!(capture.messages[1].as_str().starts_with("35=X"));
    }

    #[tokio::test]
    async fn symbols_keep_first_capture_order() {
        let aggregator = MarketDataAggregator::new();
        aggregator.capture("GBP/USD", RawMessage::new("g1")).await;
        aggregator.capture("EUR/USD", RawMessage::new("e1")).await;
        aggregator.capture("GBP/USD", RawMessage::new("g2")).await;

        let snapshot = aggregator.snapshot().await;
        let symbols: Vec<_> = snapshot.iter().map(|c| c.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["GBP/USD", "EUR/USD"]);
        assert_eq!(snapshot[0].messages.len(), 2);
    }

    #[tokio::test]
    async fn missing_symbol_has_no_capture() {
        let aggregator = MarketDataAggregator::new();
        assert!(aggregator.capture_for("USD/JPY").await.is_none());
    }
}
