//! End-to-end scenario tests against the scripted engine.

#![allow(clippy::unwrap_used)]

use fix_harness::config::HarnessConfig;
use fix_harness::engine::scripted::ScriptedEngine;
use fix_harness::engine::SessionHandle;
use fix_harness::harness::{IdGenerator, Scenario, ScenarioOrchestrator};
use fix_harness::protocol::fields::{msg_type, tags, FieldMap};
use fix_harness::protocol::{InboundMessage, OutboundKind, OutboundMessage};
use fix_harness::HarnessError;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::mpsc;

fn test_config(export_dir: &Path) -> HarnessConfig {
    let mut config = HarnessConfig::default();
    config.timing.logon_timeout_ms = 1000;
    config.timing.response_timeout_ms = 1000;
    config.timing.quote_hold_ms = 10;
    config.timing.drain_ms = 0;
    config.export_dir = export_dir.to_path_buf();
    config
}

fn market_session() -> SessionHandle {
    SessionHandle::new("MKT_CLIENT", "BROKER")
}

fn trading_session() -> SessionHandle {
    SessionHandle::new("TRD_CLIENT", "BROKER")
}

fn field_map(fields: Vec<(u32, String)>) -> FieldMap {
    FieldMap::new(fields)
}

struct Harness {
    engine: Arc<ScriptedEngine>,
    orchestrator: ScenarioOrchestrator<ScriptedEngine>,
}

impl Harness {
    fn new(config: HarnessConfig) -> Self {
        let (events_tx, events_rx) = mpsc::channel(1024);
        let engine = Arc::new(ScriptedEngine::new(
            vec![market_session(), trading_session()],
            events_tx,
        ));
        let orchestrator =
            ScenarioOrchestrator::new(Arc::clone(&engine), config, IdGenerator::with_cl_ord_seed(9000));
        orchestrator.dispatcher().spawn(events_rx);
        Self {
            engine,
            orchestrator,
        }
    }

    fn sent_of(&self, kind: OutboundKind) -> Vec<OutboundMessage> {
        self.engine
            .sent()
            .into_iter()
            .filter(|(_, m)| m.kind() == kind)
            .map(|(_, m)| m)
            .collect()
    }
}

#[tokio::test]
async fn security_list_discovers_the_catalog_across_fragments() {
    let dir = tempfile::tempdir().unwrap();
    let harness = Harness::new(test_config(dir.path()));
    harness
        .engine
        .script(OutboundKind::SecurityListRequest, |out| {
            let req_id = out.get(tags::SECURITY_REQ_ID).unwrap().to_string();
            vec![
                InboundMessage::SecurityList(field_map(vec![
                    (tags::MSG_TYPE, msg_type::SECURITY_LIST.to_string()),
                    (tags::SECURITY_REQ_ID, req_id.clone()),
                    (tags::SYMBOL, "EUR/USD".to_string()),
                    (tags::SYMBOL, "GBP/USD".to_string()),
                ])),
                InboundMessage::SecurityList(field_map(vec![
                    (tags::MSG_TYPE, msg_type::SECURITY_LIST.to_string()),
                    (tags::SECURITY_REQ_ID, req_id),
                    (tags::SYMBOL, "USD/JPY".to_string()),
                    (tags::LAST_FRAGMENT, "Y".to_string()),
                ])),
            ]
        });

    let outcome = harness
        .orchestrator
        .run(Scenario::SecurityList, &[])
        .await
        .unwrap();

    assert_eq!(
        outcome.discovered_symbols,
        vec!["EUR/USD", "GBP/USD", "USD/JPY"]
    );
    assert_eq!(outcome.timed_out_requests, 0);
    assert!(harness.orchestrator.catalog().is_complete());

    let requests = harness.sent_of(OutboundKind::SecurityListRequest);
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].get(tags::SECURITY_REQ_ID), Some("SecurityReqID_1"));
}

#[tokio::test]
async fn security_list_without_last_fragment_times_out() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = test_config(dir.path());
    config.timing.response_timeout_ms = 50;
    let harness = Harness::new(config);
    harness
        .engine
        .script(OutboundKind::SecurityListRequest, |_| {
            vec![InboundMessage::SecurityList(field_map(vec![
                (tags::MSG_TYPE, msg_type::SECURITY_LIST.to_string()),
                (tags::SYMBOL, "EUR/USD".to_string()),
            ]))]
        });

    let outcome = harness
        .orchestrator
        .run(Scenario::SecurityList, &[])
        .await
        .unwrap();

    // Symbols still accumulate, but the request stays unresolved.
    assert_eq!(outcome.discovered_symbols, vec!["EUR/USD"]);
    assert_eq!(outcome.timed_out_requests, 1);
    assert!(!harness.orchestrator.catalog().is_complete());
}

#[tokio::test]
async fn order_scenario_requests_status_then_submits_per_symbol() {
    let dir = tempfile::tempdir().unwrap();
    let harness = Harness::new(test_config(dir.path()));
    harness
        .engine
        .script(OutboundKind::TradingSessionStatusRequest, |out| {
            let req_id = out.get(tags::TRAD_SES_REQ_ID).unwrap().to_string();
            vec![InboundMessage::TradingSessionStatus(field_map(vec![
                (tags::MSG_TYPE, msg_type::TRADING_SESSION_STATUS.to_string()),
                (tags::TRAD_SES_REQ_ID, req_id),
            ]))]
        });

    let symbols = vec!["EUR/USD".to_string(), "GBP/USD".to_string()];
    let outcome = harness
        .orchestrator
        .run(Scenario::Order, &symbols)
        .await
        .unwrap();
    assert_eq!(outcome.timed_out_requests, 0);

    let sent = harness.engine.sent();
    // Status request goes out before any order, on the trading session.
    assert_eq!(sent[0].0, trading_session());
    assert_eq!(sent[0].1.kind(), OutboundKind::TradingSessionStatusRequest);
    assert_eq!(sent[0].1.get(tags::TRAD_SES_REQ_ID), Some("9000"));

    let orders = harness.sent_of(OutboundKind::NewOrderSingle);
    assert_eq!(orders.len(), 2);
    assert_eq!(orders[0].get(tags::CL_ORD_ID), Some("9001"));
    assert_eq!(orders[0].get(tags::SYMBOL), Some("EUR/USD"));
    assert_eq!(orders[0].get(tags::SIDE), Some("1"));
    assert_eq!(orders[0].get(tags::ORD_TYPE), Some("1"));
    assert_eq!(orders[0].get(tags::TIME_IN_FORCE), Some("1"));
    assert_eq!(orders[0].get(tags::ORDER_CAPACITY), Some("P"));
    assert_eq!(orders[0].get(tags::ORDER_QTY), Some("1"));
    assert_eq!(orders[1].get(tags::CL_ORD_ID), Some("9002"));
    assert_eq!(orders[1].get(tags::SYMBOL), Some("GBP/USD"));
}

#[tokio::test]
async fn market_data_scenario_captures_and_exports_per_symbol() {
    let dir = tempfile::tempdir().unwrap();
    let harness = Harness::new(test_config(dir.path()));
    harness
        .engine
        .script(OutboundKind::MarketDataRequest, |out| {
            let req_id = out.get(tags::MD_REQ_ID).unwrap().to_string();
            let symbol = out.get(tags::SYMBOL).unwrap().to_string();
            vec![
                InboundMessage::MarketDataSnapshot(field_map(vec![
                    (tags::MSG_TYPE, msg_type::MARKET_DATA_SNAPSHOT.to_string()),
                    (tags::MD_REQ_ID, req_id.clone()),
                    (tags::SYMBOL, symbol.clone()),
                    (tags::NO_MD_ENTRIES, "1".to_string()),
                ])),
                InboundMessage::MarketDataIncremental(field_map(vec![
                    (tags::MSG_TYPE, msg_type::MARKET_DATA_INCREMENTAL.to_string()),
                    (tags::MD_REQ_ID, req_id),
                    (tags::SYMBOL, symbol),
                    (tags::NO_MD_ENTRIES, "1".to_string()),
                ])),
            ]
        });

    let symbols = vec!["EUR/USD".to_string()];
    let outcome = harness
        .orchestrator
        .run(Scenario::MarketData, &symbols)
        .await
        .unwrap();

    assert_eq!(outcome.timed_out_requests, 0);
    assert_eq!(outcome.exported_files.len(), 1);
    assert!(outcome.exported_files[0].ends_with("market_data_eur_usd.txt"));

    let content =
        std::fs::read_to_string(dir.path().join("market_data_eur_usd.txt")).unwrap();
    let lines: Vec<_> = content.lines().collect();
    assert_eq!(lines.len(), 2);
    // Snapshot first, incremental second, SOH normalized to pipes.
    assert!(lines[0].starts_with("35=W|"));
    assert!(lines[1].starts_with("35=X|"));
    assert!(lines[0].contains("55=EUR/USD"));
    assert!(!content.contains('\u{1}'));

    let requests = harness.sent_of(OutboundKind::MarketDataRequest);
    assert_eq!(requests[0].get(tags::MD_REQ_ID), Some("MDReqID_1"));
}

#[tokio::test]
async fn quotes_scenario_issues_distinct_ids_and_cancels_with_the_same_id() {
    let dir = tempfile::tempdir().unwrap();
    let harness = Harness::new(test_config(dir.path()));
    harness.engine.script(OutboundKind::QuoteRequest, |out| {
        let req_id = out.get(tags::QUOTE_REQ_ID).unwrap().to_string();
        let symbol = out.get(tags::SYMBOL).unwrap().to_string();
        vec![InboundMessage::MassQuoteAck(field_map(vec![
            (tags::MSG_TYPE, msg_type::MASS_QUOTE_ACK.to_string()),
            (tags::SYMBOL, symbol),
            (tags::QUOTE_REQ_ID, req_id),
            (tags::QUOTE_STATUS, "0".to_string()),
        ]))]
    });

    let symbols = vec!["EUR/USD".to_string(), "GBP/USD".to_string()];
    let outcome = harness
        .orchestrator
        .run(Scenario::Quotes, &symbols)
        .await
        .unwrap();
    assert_eq!(outcome.timed_out_requests, 0);

    let requests = harness.sent_of(OutboundKind::QuoteRequest);
    assert_eq!(requests.len(), 2);
    let first_id = requests[0].get(tags::QUOTE_REQ_ID).unwrap();
    let second_id = requests[1].get(tags::QUOTE_REQ_ID).unwrap();
    assert_ne!(first_id, second_id);
    assert_eq!(requests[0].get(tags::SIDE), Some("0"));

    // Every request is cancelled, each with its originating identifier.
    let cancels = harness.sent_of(OutboundKind::QuoteCancel);
    assert_eq!(cancels.len(), 2);
    assert_eq!(cancels[0].get(tags::QUOTE_REQ_ID), Some(first_id));
    assert_eq!(cancels[0].get(tags::SYMBOL), Some("EUR/USD"));
    assert_eq!(cancels[1].get(tags::QUOTE_REQ_ID), Some(second_id));

    // All cancels go out after every request.
    let kinds: Vec<_> = harness
        .engine
        .sent()
        .into_iter()
        .map(|(_, m)| m.kind())
        .collect();
    let last_request = kinds
        .iter()
        .rposition(|k| *k == OutboundKind::QuoteRequest)
        .unwrap();
    let first_cancel = kinds
        .iter()
        .position(|k| *k == OutboundKind::QuoteCancel)
        .unwrap();
    assert!(last_request < first_cancel);
}

#[tokio::test]
async fn unanswered_quotes_are_counted_as_timed_out() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = test_config(dir.path());
    config.timing.response_timeout_ms = 50;
    let harness = Harness::new(config);

    let symbols = vec!["EUR/USD".to_string(), "GBP/USD".to_string()];
    let outcome = harness
        .orchestrator
        .run(Scenario::Quotes, &symbols)
        .await
        .unwrap();

    assert_eq!(outcome.timed_out_requests, 2);
    // Cancels still go out for timed-out solicitations.
    assert_eq!(harness.sent_of(OutboundKind::QuoteCancel).len(), 2);
}

#[tokio::test]
async fn missing_trading_session_fails_fast() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());

    let (events_tx, events_rx) = mpsc::channel(64);
    // Market-data session only; the order scenario needs a trading one.
    let engine = Arc::new(ScriptedEngine::new(vec![market_session()], events_tx));
    let orchestrator =
        ScenarioOrchestrator::new(Arc::clone(&engine), config, IdGenerator::with_cl_ord_seed(0));
    orchestrator.dispatcher().spawn(events_rx);

    let result = orchestrator.run(Scenario::Order, &[]).await;
    assert!(matches!(result, Err(HarnessError::MissingSession { .. })));
}

#[tokio::test]
async fn undelivered_logon_is_a_logon_timeout() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = test_config(dir.path());
    config.timing.logon_timeout_ms = 50;

    // No dispatcher task: logon events pile up unconsumed, so the
    // directory never sees the trading session.
    let (events_tx, _events_rx) = mpsc::channel(64);
    let engine = Arc::new(ScriptedEngine::new(
        vec![market_session(), trading_session()],
        events_tx,
    ));
    let orchestrator =
        ScenarioOrchestrator::new(Arc::clone(&engine), config, IdGenerator::with_cl_ord_seed(0));

    let result = orchestrator.run(Scenario::Order, &[]).await;
    assert!(matches!(
        result,
        Err(HarnessError::LogonTimeout { timeout_ms: 50, .. })
    ));
}

#[tokio::test]
async fn engine_start_failure_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let harness = Harness::new(test_config(dir.path()));
    harness.engine.fail_next_start();

    let result = harness.orchestrator.run(Scenario::SecurityList, &[]).await;
    assert!(matches!(result, Err(HarnessError::Connectivity(_))));
}
