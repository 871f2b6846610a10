//! # FIX Harness
//!
//! A FIX 4.4 integration harness that drives four scenarios against a
//! counterparty through an external protocol engine: security-list
//! discovery, order submission, market-data subscription with capture
//! and export, and quote solicitation with cancellation.
//!
//! The engine owns the wire: logon, heartbeats, sequence numbers,
//! encode/decode. The harness owns everything above it: request
//! identifiers, correlation, session-role routing, capture, and the
//! scenario lifecycle.
//!
//! # Architecture
//!
//! - [`protocol`] - field constants, message model, outbound builders
//! - [`engine`] - the [`engine::FixEngine`] contract, session identity,
//!   log adaptation, and a scripted in-process engine
//! - [`harness`] - identifier generation, correlation, catalog,
//!   market-data capture/export, event dispatch, and orchestration
//! - [`config`] - harness settings with file and environment loading
//! - [`error`] - the error taxonomy
//!
//! # Example
//!
//! ```ignore
//! let (events_tx, events_rx) = tokio::sync::mpsc::channel(1024);
//! let engine = Arc::new(ScriptedEngine::new(sessions, events_tx));
//! let orchestrator = ScenarioOrchestrator::new(engine, config, IdGenerator::new());
//! orchestrator.dispatcher().spawn(events_rx);
//! let outcome = orchestrator.run(Scenario::SecurityList, &[]).await?;
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod harness;
pub mod protocol;

pub use config::HarnessConfig;
pub use error::HarnessError;
pub use harness::{IdGenerator, Scenario, ScenarioOrchestrator, ScenarioOutcome};
