//! # Harness Core
//!
//! The scenario-driving half of the crate: identifier generation,
//! request correlation, instrument catalog, market-data capture and
//! export, the event dispatcher, and the orchestrator that ties them
//! together over a [`crate::engine::FixEngine`].

pub mod catalog;
pub mod correlator;
pub mod dispatcher;
pub mod export;
pub mod ids;
pub mod market_data;
pub mod scenario;

pub use catalog::InstrumentCatalog;
pub use correlator::{RequestCorrelator, RequestState, RequestType};
pub use dispatcher::{MessageDispatcher, SessionDirectory};
pub use ids::{IdGenerator, IdNamespace};
pub use market_data::MarketDataAggregator;
pub use scenario::{Scenario, ScenarioOrchestrator, ScenarioOutcome, ScenarioPhase};
