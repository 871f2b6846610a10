//! # Inbound Message Model
//!
//! Closed tagged-union model of the inbound FIX 4.4 messages the harness
//! reacts to, plus typed parsed views for the messages whose fields are
//! actually read.
//!
//! Every variant carries the full [`FieldMap`] so the dispatcher can route
//! by variant in one exhaustive `match` and crack fields per message. A
//! missing required field surfaces as a `None` from `from_fields` and is
//! handled locally by the dispatcher; it never aborts the stream.

use crate::protocol::fields::{tags, FieldMap};

/// One inbound FIX message, discriminated by message type (tag 35).
#[derive(Debug, Clone)]
pub enum InboundMessage {
    /// SecurityList (y) - fragment of a security-list response.
    SecurityList(FieldMap),
    /// NewOrderSingle (D) - echoed order, observational only.
    NewOrderSingle(FieldMap),
    /// Reject (3) - session-level reject.
    Reject(FieldMap),
    /// ExecutionReport (8) - order status report.
    ExecutionReport(FieldMap),
    /// MarketDataRequest (V) - echoed request, observational only.
    MarketDataRequest(FieldMap),
    /// MarketDataRequestReject (Y) - market-data request rejection.
    MarketDataRequestReject(FieldMap),
    /// MarketDataSnapshotFullRefresh (W) - full book state.
    MarketDataSnapshot(FieldMap),
    /// MarketDataIncrementalRefresh (X) - book delta.
    MarketDataIncremental(FieldMap),
    /// QuoteRequest (R) - echoed request, observational only.
    QuoteRequest(FieldMap),
    /// Quote (S) - single quote.
    Quote(FieldMap),
    /// QuoteCancel (Z) - quote cancellation.
    QuoteCancel(FieldMap),
    /// MassQuote (i) - bulk quote delivery.
    MassQuote(FieldMap),
    /// MassQuoteAcknowledgement (b) - correlated quote-request ack.
    MassQuoteAck(FieldMap),
    /// TradingSessionStatus (h) - trading session state.
    TradingSessionStatus(FieldMap),
}

impl InboundMessage {
    /// Returns the carried field map regardless of variant.
    #[must_use]
    pub fn fields(&self) -> &FieldMap {
        match self {
            Self::SecurityList(f)
            | Self::NewOrderSingle(f)
            | Self::Reject(f)
            | Self::ExecutionReport(f)
            | Self::MarketDataRequest(f)
            | Self::MarketDataRequestReject(f)
            | Self::MarketDataSnapshot(f)
            | Self::MarketDataIncremental(f)
            | Self::QuoteRequest(f)
            | Self::Quote(f)
            | Self::QuoteCancel(f)
            | Self::MassQuote(f)
            | Self::MassQuoteAck(f)
            | Self::TradingSessionStatus(f) => f,
        }
    }

    /// Returns a short human-readable name for logging.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::SecurityList(_) => "SecurityList",
            Self::NewOrderSingle(_) => "NewOrderSingle",
            Self::Reject(_) => "Reject",
            Self::ExecutionReport(_) => "ExecutionReport",
            Self::MarketDataRequest(_) => "MarketDataRequest",
            Self::MarketDataRequestReject(_) => "MarketDataRequestReject",
            Self::MarketDataSnapshot(_) => "MarketDataSnapshotFullRefresh",
            Self::MarketDataIncremental(_) => "MarketDataIncrementalRefresh",
            Self::QuoteRequest(_) => "QuoteRequest",
            Self::Quote(_) => "Quote",
            Self::QuoteCancel(_) => "QuoteCancel",
            Self::MassQuote(_) => "MassQuote",
            Self::MassQuoteAck(_) => "MassQuoteAcknowledgement",
            Self::TradingSessionStatus(_) => "TradingSessionStatus",
        }
    }
}

/// Parsed view of a SecurityList (y) fragment.
#[derive(Debug, Clone)]
pub struct SecurityListMessage {
    /// Symbols contained in this fragment, in field order.
    pub symbols: Vec<String>,
    /// Whether this fragment is flagged as the last one.
    pub last_fragment: bool,
}

impl SecurityListMessage {
    /// Parses a SecurityList fragment.
    ///
    /// A fragment with no symbols is still valid (an empty list response),
    /// so this never fails on missing symbols; the LastFragment flag
    /// defaults to false when absent.
    #[must_use]
    pub fn from_fields(fields: &FieldMap) -> Self {
        let symbols = fields
            .get_all(tags::SYMBOL)
            .into_iter()
            .map(str::to_string)
            .collect();
        let last_fragment = fields
            .get(tags::LAST_FRAGMENT)
            .is_some_and(|v| v.eq_ignore_ascii_case("y"));
        Self {
            symbols,
            last_fragment,
        }
    }
}

/// Parsed view of a MassQuoteAcknowledgement (b).
#[derive(Debug, Clone)]
pub struct MassQuoteAckMessage {
    /// Instrument symbol (55).
    pub symbol: String,
    /// Correlated quote request identifier (131).
    pub quote_req_id: String,
    /// Quote status code (297).
    pub quote_status: i32,
}

impl MassQuoteAckMessage {
    /// Parses a MassQuoteAcknowledgement.
    ///
    /// Returns `None` if any of the required fields (55, 131, 297) is
    /// missing or the status is not numeric.
    #[must_use]
    pub fn from_fields(fields: &FieldMap) -> Option<Self> {
        let symbol = fields.get(tags::SYMBOL)?.to_string();
        let quote_req_id = fields.get(tags::QUOTE_REQ_ID)?.to_string();
        let quote_status = fields.get(tags::QUOTE_STATUS)?.parse::<i32>().ok()?;
        Some(Self {
            symbol,
            quote_req_id,
            quote_status,
        })
    }
}

/// Parsed view of a market-data refresh, snapshot or incremental.
///
/// Only the symbol is extracted; the message body is kept verbatim as a
/// [`crate::protocol::fields::RawMessage`] for capture.
#[derive(Debug, Clone)]
pub struct MarketDataMessage {
    /// Instrument symbol (55).
    pub symbol: String,
    /// Entry count (268), when present.
    pub entry_count: Option<u32>,
}

impl MarketDataMessage {
    /// Parses the routing fields of a market-data refresh.
    ///
    /// Returns `None` when the Symbol (55) field is missing, which is the
    /// malformed-message case the dispatcher recovers from.
    #[must_use]
    pub fn from_fields(fields: &FieldMap) -> Option<Self> {
        let symbol = fields.get(tags::SYMBOL)?.to_string();
        let entry_count = fields
            .get(tags::NO_MD_ENTRIES)
            .and_then(|v| v.parse::<u32>().ok());
        Some(Self {
            symbol,
            entry_count,
        })
    }
}

/// Parsed view of an ExecutionReport (8), logged observationally.
#[derive(Debug, Clone)]
pub struct ExecutionReportMessage {
    /// Client order identifier (11).
    pub cl_ord_id: String,
    /// Order status code (39).
    pub ord_status: String,
    /// Instrument symbol (55), when present.
    pub symbol: Option<String>,
    /// Free text (58), when present.
    pub text: Option<String>,
}

impl ExecutionReportMessage {
    /// Parses an ExecutionReport.
    ///
    /// Returns `None` if ClOrdID (11) or OrdStatus (39) is missing.
    #[must_use]
    pub fn from_fields(fields: &FieldMap) -> Option<Self> {
        let cl_ord_id = fields.get(tags::CL_ORD_ID)?.to_string();
        let ord_status = fields.get(tags::ORD_STATUS)?.to_string();
        Some(Self {
            cl_ord_id,
            ord_status,
            symbol: fields.get(tags::SYMBOL).map(str::to_string),
            text: fields.get(tags::TEXT).map(str::to_string),
        })
    }
}

/// Parsed view of a session-level Reject (3).
///
/// Both fields are optional on the wire, so parsing never fails.
#[derive(Debug, Clone)]
pub struct RejectMessage {
    /// Session reject reason code (373), when present.
    pub reason: Option<String>,
    /// Free text (58), when present.
    pub text: Option<String>,
}

impl RejectMessage {
    /// Parses a Reject.
    #[must_use]
    pub fn from_fields(fields: &FieldMap) -> Self {
        Self {
            reason: fields.get(tags::SESSION_REJECT_REASON).map(str::to_string),
            text: fields.get(tags::TEXT).map(str::to_string),
        }
    }
}

/// Parsed view of a Quote (S), logged observationally.
#[derive(Debug, Clone)]
pub struct QuoteMessage {
    /// Instrument symbol (55).
    pub symbol: String,
    /// Quote identifier (117).
    pub quote_id: String,
    /// Bid price (132).
    pub bid_px: Option<f64>,
    /// Offer price (133).
    pub offer_px: Option<f64>,
    /// Bid size (134).
    pub bid_size: Option<f64>,
    /// Offer size (135).
    pub offer_size: Option<f64>,
}

impl QuoteMessage {
    /// Parses a Quote message.
    ///
    /// Returns `None` if Symbol (55) or QuoteID (117) is missing.
    #[must_use]
    pub fn from_fields(fields: &FieldMap) -> Option<Self> {
        let symbol = fields.get(tags::SYMBOL)?.to_string();
        let quote_id = fields.get(tags::QUOTE_ID)?.to_string();
        let px = |tag| fields.get(tag).and_then(|v: &str| v.parse::<f64>().ok());
        Some(Self {
            symbol,
            quote_id,
            bid_px: px(tags::BID_PX),
            offer_px: px(tags::OFFER_PX),
            bid_size: px(tags::BID_SIZE),
            offer_size: px(tags::OFFER_SIZE),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::protocol::fields::msg_type;

    fn map(fields: Vec<(u32, &str)>) -> FieldMap {
        FieldMap::new(
            fields
                .into_iter()
                .map(|(t, v)| (t, v.to_string()))
                .collect(),
        )
    }

    mod security_list {
        use super::*;

        #[test]
        fn parses_symbols_in_order() {
            let fields = map(vec![
                (tags::MSG_TYPE, msg_type::SECURITY_LIST),
                (tags::NO_RELATED_SYM, "2"),
                (tags::SYMBOL, "EUR/USD"),
                (tags::SYMBOL, "GBP/USD"),
                (tags::LAST_FRAGMENT, "Y"),
            ]);
            let parsed = SecurityListMessage::from_fields(&fields);
            assert_eq!(parsed.symbols, vec!["EUR/USD", "GBP/USD"]);
            assert!(parsed.last_fragment);
        }

        #[test]
        fn missing_last_fragment_defaults_false() {
            let fields = map(vec![(tags::SYMBOL, "EUR/USD")]);
            assert!(!SecurityListMessage::from_fields(&fields).last_fragment);
        }

        #[test]
        fn empty_fragment_is_valid() {
            let fields = map(vec![(tags::NO_RELATED_SYM, "0")]);
            assert!(SecurityListMessage::from_fields(&fields).symbols.is_empty());
        }
    }

    mod mass_quote_ack {
        use super::*;

        #[test]
        fn parses_required_fields() {
            let fields = map(vec![
                (tags::SYMBOL, "EUR/USD"),
                (tags::QUOTE_REQ_ID, "QuoteReqID_1"),
                (tags::QUOTE_STATUS, "0"),
            ]);
            let ack = MassQuoteAckMessage::from_fields(&fields).unwrap();
            assert_eq!(ack.quote_req_id, "QuoteReqID_1");
            assert_eq!(ack.quote_status, 0);
        }

        #[test]
        fn missing_quote_req_id_is_none() {
            let fields = map(vec![(tags::SYMBOL, "EUR/USD"), (tags::QUOTE_STATUS, "0")]);
            assert!(MassQuoteAckMessage::from_fields(&fields).is_none());
        }

        #[test]
        fn non_numeric_status_is_none() {
            let fields = map(vec![
                (tags::SYMBOL, "EUR/USD"),
                (tags::QUOTE_REQ_ID, "QuoteReqID_1"),
                (tags::QUOTE_STATUS, "abc"),
            ]);
            assert!(MassQuoteAckMessage::from_fields(&fields).is_none());
        }
    }

    mod market_data {
        use super::*;

        #[test]
        fn parses_symbol_and_count() {
            let fields = map(vec![(tags::SYMBOL, "GBP/USD"), (tags::NO_MD_ENTRIES, "3")]);
            let md = MarketDataMessage::from_fields(&fields).unwrap();
            assert_eq!(md.symbol, "GBP/USD");
            assert_eq!(md.entry_count, Some(3));
        }

        #[test]
        fn missing_symbol_is_malformed() {
            let fields = map(vec![(tags::NO_MD_ENTRIES, "3")]);
            assert!(MarketDataMessage::from_fields(&fields).is_none());
        }
    }

    mod execution_report {
        use super::*;

        #[test]
        fn parses_status_and_optional_symbol() {
            let fields = map(vec![
                (tags::CL_ORD_ID, "1547000000002"),
                (tags::ORD_STATUS, "0"),
                (tags::SYMBOL, "EUR/USD"),
            ]);
            let report = ExecutionReportMessage::from_fields(&fields).unwrap();
            assert_eq!(report.cl_ord_id, "1547000000002");
            assert_eq!(report.ord_status, "0");
            assert_eq!(report.symbol.as_deref(), Some("EUR/USD"));
        }

        #[test]
        fn missing_cl_ord_id_is_none() {
            let fields = map(vec![(tags::ORD_STATUS, "0")]);
            assert!(ExecutionReportMessage::from_fields(&fields).is_none());
        }
    }

    mod reject {
        use super::*;

        #[test]
        fn bare_reject_still_parses() {
            let fields = map(vec![(tags::MSG_TYPE, msg_type::REJECT)]);
            let reject = RejectMessage::from_fields(&fields);
            assert!(reject.reason.is_none());
            assert!(reject.text.is_none());
        }
    }

    mod quote {
        use super::*;

        #[test]
        fn parses_two_sided_quote() {
            let fields = map(vec![
                (tags::SYMBOL, "EUR/USD"),
                (tags::QUOTE_ID, "Q-1"),
                (tags::BID_PX, "1.0841"),
                (tags::OFFER_PX, "1.0843"),
                (tags::BID_SIZE, "1000000"),
                (tags::OFFER_SIZE, "1000000"),
            ]);
            let quote = QuoteMessage::from_fields(&fields).unwrap();
            assert_eq!(quote.quote_id, "Q-1");
            assert!(quote.bid_px.unwrap() < quote.offer_px.unwrap());
        }

        #[test]
        fn one_sided_quote_keeps_missing_side_none() {
            let fields = map(vec![
                (tags::SYMBOL, "EUR/USD"),
                (tags::QUOTE_ID, "Q-1"),
                (tags::BID_PX, "1.0841"),
            ]);
            let quote = QuoteMessage::from_fields(&fields).unwrap();
            assert!(quote.offer_px.is_none());
        }
    }

    #[test]
    fn name_matches_variant() {
        let fields = map(vec![(tags::SYMBOL, "EUR/USD")]);
        assert_eq!(
            InboundMessage::MassQuoteAck(fields).name(),
            "MassQuoteAcknowledgement"
        );
    }
}
