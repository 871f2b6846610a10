//! Harness entry point.
//!
//! Runs the selected scenarios against the built-in scripted engine,
//! which stands in for a live counterparty: it acknowledges logons,
//! answers security-list requests in fragments, streams a short burst of
//! market data, and acknowledges quote solicitations. Swapping in a real
//! engine means constructing any other [`fix_harness::engine::FixEngine`]
//! over the same event channel.

use anyhow::Context;
use clap::{Parser, ValueEnum};
use fix_harness::config::HarnessConfig;
use fix_harness::engine::scripted::ScriptedEngine;
use fix_harness::harness::{IdGenerator, Scenario, ScenarioOrchestrator};
use fix_harness::protocol::fields::{msg_type, tags, FieldMap};
use fix_harness::protocol::{InboundMessage, OutboundKind};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ScenarioArg {
    /// All four scenarios in order.
    All,
    /// Security-list discovery only.
    SecurityList,
    /// Trading session status and order submission only.
    Order,
    /// Market-data subscription and export only.
    MarketData,
    /// Quote request and cancel only.
    Quotes,
}

impl ScenarioArg {
    fn scenarios(self) -> Vec<Scenario> {
        match self {
            Self::All => vec![
                Scenario::SecurityList,
                Scenario::Order,
                Scenario::MarketData,
                Scenario::Quotes,
            ],
            Self::SecurityList => vec![Scenario::SecurityList],
            Self::Order => vec![Scenario::Order],
            Self::MarketData => vec![Scenario::MarketData],
            Self::Quotes => vec![Scenario::Quotes],
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "fix-harness", about = "FIX 4.4 scenario harness", version)]
struct Cli {
    /// Scenario selection.
    #[arg(long, value_enum, default_value = "all")]
    scenario: ScenarioArg,

    /// Instrument symbols to drive, e.g. EUR/USD.
    #[arg(long = "symbol", default_values = ["EUR/USD", "GBP/USD"])]
    symbols: Vec<String>,

    /// Harness config file (TOML). Falls back to FIX_HARNESS_CONFIG_FILE.
    #[arg(long)]
    config: Option<String>,

    /// Override the blanket drain window, in milliseconds.
    #[arg(long)]
    drain_ms: Option<u64>,
}

fn field_map(fields: Vec<(u32, &str)>) -> FieldMap {
    FieldMap::new(
        fields
            .into_iter()
            .map(|(tag, value)| (tag, value.to_string()))
            .collect(),
    )
}

/// Wires the scripted engine with counterparty replies for every request
/// kind the scenarios issue.
fn script_counterparty(engine: &ScriptedEngine) {
    engine.script(OutboundKind::SecurityListRequest, |out| {
        let req_id = out.get(tags::SECURITY_REQ_ID).unwrap_or_default();
        vec![
            InboundMessage::SecurityList(field_map(vec![
                (tags::MSG_TYPE, msg_type::SECURITY_LIST),
                (tags::SECURITY_REQ_ID, req_id),
                (tags::SYMBOL, "EUR/USD"),
                (tags::SYMBOL, "GBP/USD"),
            ])),
            InboundMessage::SecurityList(field_map(vec![
                (tags::MSG_TYPE, msg_type::SECURITY_LIST),
                (tags::SECURITY_REQ_ID, req_id),
                (tags::SYMBOL, "USD/JPY"),
                (tags::LAST_FRAGMENT, "Y"),
            ])),
        ]
    });

    engine.script(OutboundKind::TradingSessionStatusRequest, |out| {
        let req_id = out.get(tags::TRAD_SES_REQ_ID).unwrap_or_default();
        vec![InboundMessage::TradingSessionStatus(field_map(vec![
            (tags::MSG_TYPE, msg_type::TRADING_SESSION_STATUS),
            (tags::TRAD_SES_REQ_ID, req_id),
        ]))]
    });

    engine.script(OutboundKind::NewOrderSingle, |out| {
        let cl_ord_id = out.get(tags::CL_ORD_ID).unwrap_or_default();
        let symbol = out.get(tags::SYMBOL).unwrap_or_default();
        vec![InboundMessage::ExecutionReport(field_map(vec![
            (tags::MSG_TYPE, msg_type::EXECUTION_REPORT),
            (tags::CL_ORD_ID, cl_ord_id),
            (tags::SYMBOL, symbol),
            (tags::ORD_STATUS, "0"),
        ]))]
    });

    engine.script(OutboundKind::MarketDataRequest, |out| {
        let req_id = out.get(tags::MD_REQ_ID).unwrap_or_default();
        let symbol = out.get(tags::SYMBOL).unwrap_or_default();
        vec![
            InboundMessage::MarketDataSnapshot(field_map(vec![
                (tags::MSG_TYPE, msg_type::MARKET_DATA_SNAPSHOT),
                (tags::MD_REQ_ID, req_id),
                (tags::SYMBOL, symbol),
                (tags::NO_MD_ENTRIES, "2"),
                (tags::BID_PX, "1.0841"),
                (tags::OFFER_PX, "1.0843"),
            ])),
            InboundMessage::MarketDataIncremental(field_map(vec![
                (tags::MSG_TYPE, msg_type::MARKET_DATA_INCREMENTAL),
                (tags::MD_REQ_ID, req_id),
                (tags::SYMBOL, symbol),
                (tags::NO_MD_ENTRIES, "1"),
                (tags::BID_PX, "1.0842"),
            ])),
        ]
    });

    engine.script(OutboundKind::QuoteRequest, |out| {
        let req_id = out.get(tags::QUOTE_REQ_ID).unwrap_or_default();
        let symbol = out.get(tags::SYMBOL).unwrap_or_default();
        vec![
            InboundMessage::MassQuoteAck(field_map(vec![
                (tags::MSG_TYPE, msg_type::MASS_QUOTE_ACK),
                (tags::SYMBOL, symbol),
                (tags::QUOTE_REQ_ID, req_id),
                (tags::QUOTE_STATUS, "0"),
            ])),
            InboundMessage::Quote(field_map(vec![
                (tags::MSG_TYPE, msg_type::QUOTE),
                (tags::SYMBOL, symbol),
                (tags::QUOTE_ID, "Q-1"),
                (tags::BID_PX, "1.0841"),
                (tags::OFFER_PX, "1.0843"),
                (tags::BID_SIZE, "1000000"),
                (tags::OFFER_SIZE, "1000000"),
            ])),
        ]
    });
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if let Some(path) = &cli.config {
        std::env::set_var("FIX_HARNESS_CONFIG_FILE", path);
    }
    let mut config = HarnessConfig::load().context("loading harness configuration")?;
    if let Some(drain_ms) = cli.drain_ms {
        config.timing.drain_ms = drain_ms;
    }
    config.validate().context("validating harness configuration")?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.log.level.clone())),
        )
        .init();

    let (events_tx, events_rx) = tokio::sync::mpsc::channel(1024);
    let engine = Arc::new(ScriptedEngine::new(config.sessions.clone(), events_tx));
    script_counterparty(&engine);

    let orchestrator = ScenarioOrchestrator::new(Arc::clone(&engine), config, IdGenerator::new());
    let dispatcher = orchestrator.dispatcher().spawn(events_rx);

    for scenario in cli.scenario.scenarios() {
        let outcome = orchestrator
            .run(scenario, &cli.symbols)
            .await
            .with_context(|| format!("running scenario {scenario}"))?;
        info!(
            scenario = %outcome.scenario,
            discovered = outcome.discovered_symbols.len(),
            exported = outcome.exported_files.len(),
            timed_out = outcome.timed_out_requests,
            "scenario outcome"
        );
    }

    drop(engine);
    drop(orchestrator);
    dispatcher.await.context("dispatcher task panicked")?;
    Ok(())
}
