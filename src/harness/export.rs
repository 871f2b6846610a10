//! # Market Data Export
//!
//! Writes the per-symbol captures to text artifacts at scenario end.
//!
//! Each symbol gets its own file named `market_data_<symbol>.txt`, where
//! the symbol has `/` replaced by `_` and is lowercased (EUR/USD becomes
//! `market_data_eur_usd.txt`). Every captured message is one line, SOH
//! normalized to `|`. A failure writing one symbol's file is logged and
//! the remaining symbols are still exported.

use crate::harness::market_data::{InstrumentCapture, MarketDataAggregator};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{error, info};

/// Derives the export filename for a symbol.
#[must_use]
pub fn export_filename(symbol: &str) -> String {
    format!("market_data_{}.txt", symbol.replace('/', "_").to_lowercase())
}

/// Exports every capture to one file per symbol under `dir`.
///
/// Returns the paths successfully written. Per-symbol failures are
/// logged and skipped; they never abort the remaining exports.
pub async fn export_captures(aggregator: &MarketDataAggregator, dir: &Path) -> Vec<PathBuf> {
    let captures = aggregator.snapshot().await;
    let mut written = Vec::with_capacity(captures.len());
    for capture in &captures {
        let path = dir.join(export_filename(&capture.symbol));
        match write_capture(capture, &path) {
            Ok(()) => {
                info!(
                    symbol = %capture.symbol,
                    path = %path.display(),
                    messages = capture.messages.len(),
                    "exported market data"
                );
                written.push(path);
            }
            Err(e) => {
                error!(
                    symbol = %capture.symbol,
                    path = %path.display(),
                    error = %e,
                    "failed to export market data"
                );
            }
        }
    }
    written
}

fn write_capture(capture: &InstrumentCapture, path: &Path) -> std::io::Result<()> {
    let file = std::fs::File::create(path)?;
    let mut writer = std::io::BufWriter::new(file);
    for message in &capture.messages {
        writeln!(writer, "{}", message.normalized())?;
    }
    writer.flush()
}
