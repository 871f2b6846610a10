//! # Outbound Message Builders
//!
//! Builders for the FIX 4.4 requests the harness sends. Each builder
//! produces an [`OutboundMessage`]: the message kind plus ordered
//! `(tag, value)` body fields, ready for the engine to frame and encode.
//!
//! Session-level fields (sequence numbers, sending time, checksums) are
//! the engine's responsibility and never appear here.

use crate::protocol::fields::{
    md_update_type_values, msg_type, ord_type_values, order_capacity_values,
    security_list_request_type_values, side_values, subscription_request_type_values, tags,
    time_in_force_values, FixField,
};
use rust_decimal::Decimal;

/// Kinds of outbound request the harness issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutboundKind {
    /// SecurityListRequest (x).
    SecurityListRequest,
    /// TradingSessionStatusRequest (g).
    TradingSessionStatusRequest,
    /// NewOrderSingle (D).
    NewOrderSingle,
    /// MarketDataRequest (V).
    MarketDataRequest,
    /// QuoteRequest (R).
    QuoteRequest,
    /// QuoteCancel (Z).
    QuoteCancel,
}

impl std::fmt::Display for OutboundKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SecurityListRequest => write!(f, "SecurityListRequest"),
            Self::TradingSessionStatusRequest => write!(f, "TradingSessionStatusRequest"),
            Self::NewOrderSingle => write!(f, "NewOrderSingle"),
            Self::MarketDataRequest => write!(f, "MarketDataRequest"),
            Self::QuoteRequest => write!(f, "QuoteRequest"),
            Self::QuoteCancel => write!(f, "QuoteCancel"),
        }
    }
}

/// One outbound message: kind plus ordered body fields.
#[derive(Debug, Clone)]
pub struct OutboundMessage {
    kind: OutboundKind,
    fields: Vec<FixField>,
}

impl OutboundMessage {
    /// Returns the message kind.
    #[inline]
    #[must_use]
    pub fn kind(&self) -> OutboundKind {
        self.kind
    }

    /// Returns the ordered body fields.
    #[inline]
    #[must_use]
    pub fn fields(&self) -> &[FixField] {
        &self.fields
    }

    /// Returns the first value for a tag, if present.
    #[must_use]
    pub fn get(&self, tag: u32) -> Option<&str> {
        self.fields
            .iter()
            .find(|(t, _)| *t == tag)
            .map(|(_, v)| v.as_str())
    }
}

fn fix_transact_time() -> String {
    chrono::Utc::now().format("%Y%m%d-%H:%M:%S%.3f").to_string()
}

/// Builder for SecurityListRequest (MsgType=x) messages.
///
/// Requests the full instrument universe (`SecurityListRequestType=4`).
#[derive(Debug, Clone)]
pub struct SecurityListRequestBuilder {
    security_req_id: String,
}

impl SecurityListRequestBuilder {
    /// Creates a builder for the given request identifier.
    #[must_use]
    pub fn new(security_req_id: impl Into<String>) -> Self {
        Self {
            security_req_id: security_req_id.into(),
        }
    }

    /// Builds the SecurityListRequest message.
    #[must_use]
    pub fn build(self) -> OutboundMessage {
        OutboundMessage {
            kind: OutboundKind::SecurityListRequest,
            fields: vec![
                (tags::MSG_TYPE, msg_type::SECURITY_LIST_REQUEST.to_string()),
                (tags::SECURITY_REQ_ID, self.security_req_id),
                (
                    tags::SECURITY_LIST_REQUEST_TYPE,
                    security_list_request_type_values::ALL_SECURITIES.to_string(),
                ),
            ],
        }
    }
}

/// Builder for TradingSessionStatusRequest (MsgType=g) messages.
///
/// Issued as a snapshot request before order submission.
#[derive(Debug, Clone)]
pub struct TradingSessionStatusRequestBuilder {
    trad_ses_req_id: String,
}

impl TradingSessionStatusRequestBuilder {
    /// Creates a builder for the given request identifier.
    #[must_use]
    pub fn new(trad_ses_req_id: impl Into<String>) -> Self {
        Self {
            trad_ses_req_id: trad_ses_req_id.into(),
        }
    }

    /// Builds the TradingSessionStatusRequest message.
    #[must_use]
    pub fn build(self) -> OutboundMessage {
        OutboundMessage {
            kind: OutboundKind::TradingSessionStatusRequest,
            fields: vec![
                (
                    tags::MSG_TYPE,
                    msg_type::TRADING_SESSION_STATUS_REQUEST.to_string(),
                ),
                (tags::TRAD_SES_REQ_ID, self.trad_ses_req_id),
                (
                    tags::SUBSCRIPTION_REQUEST_TYPE,
                    subscription_request_type_values::SNAPSHOT.to_string(),
                ),
            ],
        }
    }
}

/// Builder for NewOrderSingle (MsgType=D) messages.
///
/// Defaults match the harness order scenario: market order, buy side,
/// good-till-cancel, principal capacity.
#[derive(Debug, Clone)]
pub struct NewOrderSingleBuilder {
    cl_ord_id: String,
    symbol: String,
    side: String,
    quantity: Decimal,
    ord_type: String,
    time_in_force: String,
    order_capacity: String,
    transact_time: Option<String>,
}

impl NewOrderSingleBuilder {
    /// Creates a builder for the given client order ID and symbol.
    #[must_use]
    pub fn new(cl_ord_id: impl Into<String>, symbol: impl Into<String>) -> Self {
        Self {
            cl_ord_id: cl_ord_id.into(),
            symbol: symbol.into(),
            side: side_values::BUY.to_string(),
            quantity: Decimal::ONE,
            ord_type: ord_type_values::MARKET.to_string(),
            time_in_force: time_in_force_values::GTC.to_string(),
            order_capacity: order_capacity_values::PRINCIPAL.to_string(),
            transact_time: None,
        }
    }

    /// Sets the sell side.
    #[must_use]
    pub fn sell(mut self) -> Self {
        self.side = side_values::SELL.to_string();
        self
    }

    /// Sets the order quantity.
    #[must_use]
    pub fn quantity(mut self, quantity: impl Into<Decimal>) -> Self {
        self.quantity = quantity.into();
        self
    }

    /// Sets an explicit transaction time (format `YYYYMMDD-HH:MM:SS.sss`).
    #[must_use]
    pub fn transact_time(mut self, time: impl Into<String>) -> Self {
        self.transact_time = Some(time.into());
        self
    }

    /// Builds the NewOrderSingle message.
    #[must_use]
    pub fn build(self) -> OutboundMessage {
        let transact_time = self.transact_time.unwrap_or_else(fix_transact_time);
        OutboundMessage {
            kind: OutboundKind::NewOrderSingle,
            fields: vec![
                (tags::MSG_TYPE, msg_type::NEW_ORDER_SINGLE.to_string()),
                (tags::CL_ORD_ID, self.cl_ord_id),
                (tags::SYMBOL, self.symbol),
                (tags::SIDE, self.side),
                (tags::TRANSACT_TIME, transact_time),
                (tags::ORDER_QTY, self.quantity.to_string()),
                (tags::ORD_TYPE, self.ord_type),
                (tags::TIME_IN_FORCE, self.time_in_force),
                (tags::ORDER_CAPACITY, self.order_capacity),
            ],
        }
    }
}

/// Builder for MarketDataRequest (MsgType=V) messages.
///
/// Subscribes snapshot plus updates at full depth with incremental
/// refresh delivery, for a single symbol.
#[derive(Debug, Clone)]
pub struct MarketDataRequestBuilder {
    md_req_id: String,
    symbol: String,
}

impl MarketDataRequestBuilder {
    /// Creates a builder for the given request identifier and symbol.
    #[must_use]
    pub fn new(md_req_id: impl Into<String>, symbol: impl Into<String>) -> Self {
        Self {
            md_req_id: md_req_id.into(),
            symbol: symbol.into(),
        }
    }

    /// Builds the MarketDataRequest message.
    #[must_use]
    pub fn build(self) -> OutboundMessage {
        OutboundMessage {
            kind: OutboundKind::MarketDataRequest,
            fields: vec![
                (tags::MSG_TYPE, msg_type::MARKET_DATA_REQUEST.to_string()),
                (tags::MD_REQ_ID, self.md_req_id),
                (
                    tags::SUBSCRIPTION_REQUEST_TYPE,
                    subscription_request_type_values::SNAPSHOT_UPDATES.to_string(),
                ),
                (tags::MARKET_DEPTH, "0".to_string()),
                (
                    tags::MD_UPDATE_TYPE,
                    md_update_type_values::INCREMENTAL_REFRESH.to_string(),
                ),
                (tags::NO_RELATED_SYM, "1".to_string()),
                (tags::SYMBOL, self.symbol),
            ],
        }
    }
}

/// Builder for QuoteRequest (MsgType=R) messages.
///
/// Carries one related-symbol entry with the counterparty's two-sided
/// side convention and principal capacity.
#[derive(Debug, Clone)]
pub struct QuoteRequestBuilder {
    quote_req_id: String,
    symbol: String,
    quantity: Decimal,
}

impl QuoteRequestBuilder {
    /// Creates a builder for the given request identifier and symbol.
    #[must_use]
    pub fn new(quote_req_id: impl Into<String>, symbol: impl Into<String>) -> Self {
        Self {
            quote_req_id: quote_req_id.into(),
            symbol: symbol.into(),
            quantity: Decimal::TEN,
        }
    }

    /// Sets the requested quantity.
    #[must_use]
    pub fn quantity(mut self, quantity: impl Into<Decimal>) -> Self {
        self.quantity = quantity.into();
        self
    }

    /// Builds the QuoteRequest message.
    #[must_use]
    pub fn build(self) -> OutboundMessage {
        OutboundMessage {
            kind: OutboundKind::QuoteRequest,
            fields: vec![
                (tags::MSG_TYPE, msg_type::QUOTE_REQUEST.to_string()),
                (tags::QUOTE_REQ_ID, self.quote_req_id),
                (tags::NO_RELATED_SYM, "1".to_string()),
                (tags::SYMBOL, self.symbol),
                (
                    tags::SIDE,
                    side_values::QUOTE_REQUEST_CONVENTION.to_string(),
                ),
                (tags::ORDER_QTY, self.quantity.to_string()),
                (
                    tags::ORDER_CAPACITY,
                    order_capacity_values::PRINCIPAL.to_string(),
                ),
            ],
        }
    }
}

/// Builder for QuoteCancel (MsgType=Z) messages.
///
/// Must carry the same QuoteReqID as the originating QuoteRequest so the
/// counterparty can correlate the cancellation.
#[derive(Debug, Clone)]
pub struct QuoteCancelBuilder {
    quote_req_id: String,
    symbol: String,
}

impl QuoteCancelBuilder {
    /// Creates a builder for the given request identifier and symbol.
    #[must_use]
    pub fn new(quote_req_id: impl Into<String>, symbol: impl Into<String>) -> Self {
        Self {
            quote_req_id: quote_req_id.into(),
            symbol: symbol.into(),
        }
    }

    /// Builds the QuoteCancel message.
    #[must_use]
    pub fn build(self) -> OutboundMessage {
        OutboundMessage {
            kind: OutboundKind::QuoteCancel,
            fields: vec![
                (tags::MSG_TYPE, msg_type::QUOTE_CANCEL.to_string()),
                (tags::QUOTE_REQ_ID, self.quote_req_id),
                (tags::SYMBOL, self.symbol),
            ],
        }
    }
}
