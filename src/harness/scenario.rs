//! # Scenario Orchestration
//!
//! Drives the four harness scenarios end to end: engine start, logon
//! wait, request issuance, response waits, drain, teardown, export.
//!
//! Every wait suspends on an explicit completion signal (session
//! directory, catalog, correlator) with a configured window; the only
//! fixed dwells are the quote hold between request and cancel and the
//! blanket drain before teardown, both of which exist to let unsolicited
//! traffic arrive rather than to stand in for a missing signal.

use crate::config::HarnessConfig;
use crate::engine::{FixEngine, SessionHandle, SessionRole};
use crate::error::HarnessError;
use crate::harness::catalog::InstrumentCatalog;
use crate::harness::correlator::{RequestCorrelator, RequestType};
use crate::harness::dispatcher::{MessageDispatcher, SessionDirectory};
use crate::harness::export::export_captures;
use crate::harness::ids::{IdGenerator, IdNamespace};
use crate::harness::market_data::MarketDataAggregator;
use crate::protocol::outbound::{
    MarketDataRequestBuilder, NewOrderSingleBuilder, QuoteCancelBuilder, QuoteRequestBuilder,
    SecurityListRequestBuilder, TradingSessionStatusRequestBuilder,
};
use rust_decimal::Decimal;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// One of the four driven scenarios.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scenario {
    /// Discover the instrument universe via SecurityListRequest.
    SecurityList,
    /// Request trading session status, then submit one order per symbol.
    Order,
    /// Subscribe to market data per symbol and capture the stream.
    MarketData,
    /// Solicit quotes per symbol, hold, then cancel them.
    Quotes,
}

impl Scenario {
    /// Session role the scenario's requests are sent on.
    #[must_use]
    pub fn required_role(self) -> SessionRole {
        match self {
            Self::Order => SessionRole::Trading,
            Self::SecurityList | Self::MarketData | Self::Quotes => SessionRole::MarketData,
        }
    }
}

impl std::fmt::Display for Scenario {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SecurityList => write!(f, "SECURITY_LIST"),
            Self::Order => write!(f, "ORDER"),
            Self::MarketData => write!(f, "MARKET_DATA"),
            Self::Quotes => write!(f, "QUOTES"),
        }
    }
}

/// Lifecycle phase of a scenario run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScenarioPhase {
    /// Constructed, nothing started.
    Init,
    /// Engine starting.
    Connecting,
    /// Waiting for the required session to log on.
    AwaitLogon,
    /// Issuing requests and waiting on their completion signals.
    Running,
    /// Blanket drain for unsolicited traffic.
    AwaitDrain,
    /// Writing export artifacts.
    Exporting,
    /// Finished.
    Done,
}

impl std::fmt::Display for ScenarioPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Init => write!(f, "INIT"),
            Self::Connecting => write!(f, "CONNECTING"),
            Self::AwaitLogon => write!(f, "AWAIT_LOGON"),
            Self::Running => write!(f, "RUNNING"),
            Self::AwaitDrain => write!(f, "AWAIT_DRAIN"),
            Self::Exporting => write!(f, "EXPORTING"),
            Self::Done => write!(f, "DONE"),
        }
    }
}

/// Result summary of one scenario run.
#[derive(Debug, Clone)]
pub struct ScenarioOutcome {
    /// The scenario that ran.
    pub scenario: Scenario,
    /// Symbols accumulated in the catalog, in arrival order.
    pub discovered_symbols: Vec<String>,
    /// Export artifacts successfully written.
    pub exported_files: Vec<PathBuf>,
    /// Requests whose wait window elapsed unresolved.
    pub timed_out_requests: usize,
}

/// Drives scenarios against an engine through the shared collections.
pub struct ScenarioOrchestrator<E: FixEngine> {
    engine: Arc<E>,
    config: HarnessConfig,
    ids: IdGenerator,
    catalog: Arc<InstrumentCatalog>,
    aggregator: Arc<MarketDataAggregator>,
    correlator: Arc<RequestCorrelator>,
    directory: Arc<SessionDirectory>,
    phase: std::sync::Mutex<ScenarioPhase>,
}

impl<E: FixEngine> ScenarioOrchestrator<E> {
    /// Creates an orchestrator with fresh collections.
    #[must_use]
    pub fn new(engine: Arc<E>, config: HarnessConfig, ids: IdGenerator) -> Self {
        Self {
            engine,
            config,
            ids,
            catalog: Arc::new(InstrumentCatalog::new()),
            aggregator: Arc::new(MarketDataAggregator::new()),
            correlator: Arc::new(RequestCorrelator::new()),
            directory: Arc::new(SessionDirectory::new()),
            phase: std::sync::Mutex::new(ScenarioPhase::Init),
        }
    }

    /// Builds the dispatcher sharing this orchestrator's collections.
    ///
    /// Spawn it over the engine's event channel before calling
    /// [`ScenarioOrchestrator::run`].
    #[must_use]
    pub fn dispatcher(&self) -> MessageDispatcher {
        MessageDispatcher::new(
            Arc::clone(&self.catalog),
            Arc::clone(&self.aggregator),
            Arc::clone(&self.correlator),
            Arc::clone(&self.directory),
        )
    }

    /// Returns the current lifecycle phase.
    pub fn phase(&self) -> ScenarioPhase {
        *self.phase.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Returns the shared instrument catalog.
    #[must_use]
    pub fn catalog(&self) -> &Arc<InstrumentCatalog> {
        &self.catalog
    }

    /// Returns the shared market-data aggregator.
    #[must_use]
    pub fn aggregator(&self) -> &Arc<MarketDataAggregator> {
        &self.aggregator
    }

    /// Returns the shared request correlator.
    #[must_use]
    pub fn correlator(&self) -> &Arc<RequestCorrelator> {
        &self.correlator
    }

    fn set_phase(&self, phase: ScenarioPhase) {
        let mut current = self
            .phase
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        info!(from = %*current, to = %phase, "phase transition");
        *current = phase;
    }

    /// Runs one scenario end to end.
    ///
    /// # Errors
    ///
    /// Fails on configuration or connectivity errors and when no session
    /// with the scenario's required role logs on within the window.
    /// Request timeouts are not errors; they are counted in the outcome.
    pub async fn run(
        &self,
        scenario: Scenario,
        symbols: &[String],
    ) -> Result<ScenarioOutcome, HarnessError> {
        self.config.validate()?;

        info!(scenario = %scenario, symbols = symbols.len(), "starting scenario");
        self.set_phase(ScenarioPhase::Connecting);
        self.engine.start().await?;

        self.set_phase(ScenarioPhase::AwaitLogon);
        let role = scenario.required_role();
        if !self.engine.sessions().iter().any(|s| s.role() == role) {
            return Err(HarnessError::MissingSession { role });
        }
        let timeout = Duration::from_millis(self.config.timing.logon_timeout_ms);
        let session = self.directory.wait_logon(role, timeout).await.map_err(|()| {
            HarnessError::LogonTimeout {
                role,
                timeout_ms: self.config.timing.logon_timeout_ms,
            }
        })?;
        info!(session = %session, role = %role, "session ready");

        self.set_phase(ScenarioPhase::Running);
        let timed_out_requests = match scenario {
            Scenario::SecurityList => self.run_security_list(&session).await?,
            Scenario::Order => self.run_order(&session, symbols).await?,
            Scenario::MarketData => self.run_market_data(&session, symbols).await?,
            Scenario::Quotes => self.run_quotes(&session, symbols).await?,
        };

        self.set_phase(ScenarioPhase::AwaitDrain);
        tokio::time::sleep(Duration::from_millis(self.config.timing.drain_ms)).await;

        self.engine.stop().await;

        self.set_phase(ScenarioPhase::Exporting);
        let exported_files = export_captures(&self.aggregator, &self.config.export_dir).await;

        self.set_phase(ScenarioPhase::Done);
        let discovered_symbols = self.catalog.symbols().await;
        info!(
            scenario = %scenario,
            discovered = discovered_symbols.len(),
            exported = exported_files.len(),
            timed_out = timed_out_requests,
            "scenario finished"
        );
        Ok(ScenarioOutcome {
            scenario,
            discovered_symbols,
            exported_files,
            timed_out_requests,
        })
    }

    /// Requests the full security list and waits for the last fragment.
    async fn run_security_list(&self, session: &SessionHandle) -> Result<usize, HarnessError> {
        let request_id = self.ids.next_id(IdNamespace::SecurityReq);
        self.correlator
            .register(&request_id, RequestType::SecurityList, None)
            .await;
        self.engine
            .send(SecurityListRequestBuilder::new(&request_id).build(), session)
            .await?;

        let window = self.response_window();
        if self.catalog.wait_complete(window).await.is_err() {
            warn!(request_id = %request_id, "security list did not complete in window");
        }
        let timed_out = self.settle(RequestType::SecurityList).await;

        for symbol in self.catalog.symbols().await {
            info!(symbol = %symbol, "discovered instrument");
        }
        Ok(timed_out)
    }

    /// Requests trading session status, then submits one order per symbol.
    async fn run_order(
        &self,
        session: &SessionHandle,
        symbols: &[String],
    ) -> Result<usize, HarnessError> {
        let status_req_id = self.ids.next_cl_ord_id();
        self.correlator
            .register(&status_req_id, RequestType::TradingSessionStatus, None)
            .await;
        self.engine
            .send(
                TradingSessionStatusRequestBuilder::new(&status_req_id).build(),
                session,
            )
            .await?;
        let timed_out = self.settle(RequestType::TradingSessionStatus).await;

        let quantity = decimal_or(self.config.requests.order_quantity, Decimal::ONE);
        for symbol in symbols {
            let cl_ord_id = self.ids.next_cl_ord_id();
            info!(cl_ord_id = %cl_ord_id, symbol = %symbol, "submitting order");
            self.engine
                .send(
                    NewOrderSingleBuilder::new(&cl_ord_id, symbol)
                        .quantity(quantity)
                        .build(),
                    session,
                )
                .await?;
        }
        Ok(timed_out)
    }

    /// Subscribes to market data for each symbol and waits for first data.
    async fn run_market_data(
        &self,
        session: &SessionHandle,
        symbols: &[String],
    ) -> Result<usize, HarnessError> {
        for symbol in symbols {
            let request_id = self.ids.next_id(IdNamespace::MarketDataReq);
            self.correlator
                .register(&request_id, RequestType::MarketData, Some(symbol.clone()))
                .await;
            self.engine
                .send(
                    MarketDataRequestBuilder::new(&request_id, symbol).build(),
                    session,
                )
                .await?;
        }
        Ok(self.settle(RequestType::MarketData).await)
    }

    /// Solicits quotes per symbol, holds, then cancels each solicitation
    /// with its originating request identifier.
    async fn run_quotes(
        &self,
        session: &SessionHandle,
        symbols: &[String],
    ) -> Result<usize, HarnessError> {
        let quantity = decimal_or(self.config.requests.quote_quantity, Decimal::TEN);
        let mut issued = Vec::with_capacity(symbols.len());
        for symbol in symbols {
            let request_id = self.ids.next_id(IdNamespace::QuoteReq);
            self.correlator
                .register(&request_id, RequestType::Quote, Some(symbol.clone()))
                .await;
            self.engine
                .send(
                    QuoteRequestBuilder::new(&request_id, symbol)
                        .quantity(quantity)
                        .build(),
                    session,
                )
                .await?;
            issued.push((request_id, symbol.clone()));
        }
        let timed_out = self.settle(RequestType::Quote).await;

        tokio::time::sleep(Duration::from_millis(self.config.timing.quote_hold_ms)).await;

        for (request_id, symbol) in issued {
            info!(quote_req_id = %request_id, symbol = %symbol, "cancelling quotes");
            self.engine
                .send(QuoteCancelBuilder::new(request_id, symbol).build(), session)
                .await?;
        }
        Ok(timed_out)
    }

    fn response_window(&self) -> Duration {
        Duration::from_millis(self.config.timing.response_timeout_ms)
    }

    /// Waits out a request family, logging and counting timeouts.
    async fn settle(&self, request_type: RequestType) -> usize {
        match self.correlator.wait_idle(request_type, self.response_window()).await {
            Ok(()) => 0,
            Err(timed_out) => {
                warn!(
                    request_type = %request_type,
                    timed_out,
                    "requests unresolved at window end"
                );
                timed_out
            }
        }
    }
}

fn decimal_or(value: f64, fallback: Decimal) -> Decimal {
    Decimal::try_from(value).unwrap_or(fallback)
}
