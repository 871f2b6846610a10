//! # FIX Field Primitives
//!
//! Tag, message-type, and enumerated value constants for the FIX 4.4
//! messages exercised by the harness, plus the [`FieldMap`] and
//! [`RawMessage`] capture types.
//!
//! Wire-level encoding and decoding belong to the external engine; this
//! module only names the fields the harness reads and writes.

/// The FIX field separator (SOH) as it appears in raw messages.
pub const SOH: char = '\x01';

/// The printable delimiter substituted for SOH in exported artifacts.
pub const EXPORT_DELIMITER: char = '|';

/// FIX message type constants (tag 35).
pub mod msg_type {
    /// SecurityListRequest message type.
    pub const SECURITY_LIST_REQUEST: &str = "x";
    /// SecurityList message type.
    pub const SECURITY_LIST: &str = "y";
    /// NewOrderSingle message type.
    pub const NEW_ORDER_SINGLE: &str = "D";
    /// Reject message type.
    pub const REJECT: &str = "3";
    /// ExecutionReport message type.
    pub const EXECUTION_REPORT: &str = "8";
    /// MarketDataRequest message type.
    pub const MARKET_DATA_REQUEST: &str = "V";
    /// MarketDataRequestReject message type.
    pub const MARKET_DATA_REQUEST_REJECT: &str = "Y";
    /// MarketDataSnapshotFullRefresh message type.
    pub const MARKET_DATA_SNAPSHOT: &str = "W";
    /// MarketDataIncrementalRefresh message type.
    pub const MARKET_DATA_INCREMENTAL: &str = "X";
    /// QuoteRequest message type.
    pub const QUOTE_REQUEST: &str = "R";
    /// Quote message type.
    pub const QUOTE: &str = "S";
    /// QuoteCancel message type.
    pub const QUOTE_CANCEL: &str = "Z";
    /// MassQuote message type.
    pub const MASS_QUOTE: &str = "i";
    /// MassQuoteAcknowledgement message type.
    pub const MASS_QUOTE_ACK: &str = "b";
    /// TradingSessionStatusRequest message type.
    pub const TRADING_SESSION_STATUS_REQUEST: &str = "g";
    /// TradingSessionStatus message type.
    pub const TRADING_SESSION_STATUS: &str = "h";
}

/// FIX field tag constants.
///
/// Reference: FIX 4.4 specification.
pub mod tags {
    /// MsgType (35) - Message type.
    pub const MSG_TYPE: u32 = 35;
    /// SenderCompID (49) - Sender identifier.
    pub const SENDER_COMP_ID: u32 = 49;
    /// TargetCompID (56) - Target identifier.
    pub const TARGET_COMP_ID: u32 = 56;
    /// Symbol (55) - Instrument symbol.
    pub const SYMBOL: u32 = 55;
    /// Side (54) - Order side.
    pub const SIDE: u32 = 54;
    /// OrderQty (38) - Order quantity.
    pub const ORDER_QTY: u32 = 38;
    /// TransactTime (60) - Transaction time.
    pub const TRANSACT_TIME: u32 = 60;
    /// ClOrdID (11) - Client order identifier.
    pub const CL_ORD_ID: u32 = 11;
    /// OrdType (40) - Order type.
    pub const ORD_TYPE: u32 = 40;
    /// OrdStatus (39) - Order status.
    pub const ORD_STATUS: u32 = 39;
    /// TimeInForce (59) - Time in force.
    pub const TIME_IN_FORCE: u32 = 59;
    /// OrderCapacity (528) - Capacity of the order originator.
    pub const ORDER_CAPACITY: u32 = 528;
    /// Text (58) - Free text field.
    pub const TEXT: u32 = 58;
    /// SessionRejectReason (373) - Session-level reject reason.
    pub const SESSION_REJECT_REASON: u32 = 373;

    /// SecurityReqID (320) - Security request identifier.
    pub const SECURITY_REQ_ID: u32 = 320;
    /// SecurityListRequestType (559) - Scope of a security-list request.
    pub const SECURITY_LIST_REQUEST_TYPE: u32 = 559;
    /// NoRelatedSym (146) - Repeating-group count of related symbols.
    pub const NO_RELATED_SYM: u32 = 146;
    /// LastFragment (893) - Final fragment flag of a multi-part response.
    pub const LAST_FRAGMENT: u32 = 893;

    /// TradSesReqID (335) - Trading session status request identifier.
    pub const TRAD_SES_REQ_ID: u32 = 335;
    /// SubscriptionRequestType (263) - Snapshot vs. subscription.
    pub const SUBSCRIPTION_REQUEST_TYPE: u32 = 263;

    /// MDReqID (262) - Market data request identifier.
    pub const MD_REQ_ID: u32 = 262;
    /// MarketDepth (264) - Depth of book requested.
    pub const MARKET_DEPTH: u32 = 264;
    /// MDUpdateType (265) - Full vs. incremental update delivery.
    pub const MD_UPDATE_TYPE: u32 = 265;
    /// NoMDEntries (268) - Repeating-group count of market data entries.
    pub const NO_MD_ENTRIES: u32 = 268;

    /// QuoteReqID (131) - Quote request identifier.
    pub const QUOTE_REQ_ID: u32 = 131;
    /// QuoteID (117) - Quote identifier.
    pub const QUOTE_ID: u32 = 117;
    /// QuoteStatus (297) - Status of a quote acknowledgement.
    pub const QUOTE_STATUS: u32 = 297;
    /// NoQuoteSets (296) - Repeating-group count of quote sets.
    pub const NO_QUOTE_SETS: u32 = 296;
    /// BidPx (132) - Bid price.
    pub const BID_PX: u32 = 132;
    /// OfferPx (133) - Offer price.
    pub const OFFER_PX: u32 = 133;
    /// BidSize (134) - Bid size.
    pub const BID_SIZE: u32 = 134;
    /// OfferSize (135) - Offer size.
    pub const OFFER_SIZE: u32 = 135;
}

/// FIX Side values (tag 54).
pub mod side_values {
    /// Buy side.
    pub const BUY: &str = "1";
    /// Sell side.
    pub const SELL: &str = "2";
    /// Two-sided quote-request convention used by the counterparty.
    pub const QUOTE_REQUEST_CONVENTION: &str = "0";
}

/// FIX OrdType values (tag 40).
pub mod ord_type_values {
    /// Market order.
    pub const MARKET: &str = "1";
    /// Limit order.
    pub const LIMIT: &str = "2";
}

/// FIX TimeInForce values (tag 59).
pub mod time_in_force_values {
    /// Day order.
    pub const DAY: &str = "0";
    /// Good Till Cancel.
    pub const GTC: &str = "1";
}

/// FIX OrderCapacity values (tag 528).
pub mod order_capacity_values {
    /// Principal capacity.
    pub const PRINCIPAL: &str = "P";
    /// Agency capacity.
    pub const AGENCY: &str = "A";
}

/// FIX SubscriptionRequestType values (tag 263).
pub mod subscription_request_type_values {
    /// Snapshot only.
    pub const SNAPSHOT: &str = "0";
    /// Snapshot plus updates.
    pub const SNAPSHOT_UPDATES: &str = "1";
}

/// FIX MDUpdateType values (tag 265).
pub mod md_update_type_values {
    /// Full refresh updates.
    pub const FULL_REFRESH: &str = "0";
    /// Incremental refresh updates.
    pub const INCREMENTAL_REFRESH: &str = "1";
}

/// FIX SecurityListRequestType values (tag 559).
pub mod security_list_request_type_values {
    /// Request all securities.
    pub const ALL_SECURITIES: &str = "4";
}

/// A FIX field represented as a tag-value pair.
pub type FixField = (u32, String);

/// Opaque, verbatim capture of one inbound message.
///
/// Stored exactly as received; the field separator is only substituted
/// with [`EXPORT_DELIMITER`] when the capture is exported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawMessage(String);

impl RawMessage {
    /// Wraps a raw message string.
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Returns the raw message exactly as captured.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the message with SOH replaced by the printable delimiter.
    #[must_use]
    pub fn normalized(&self) -> String {
        self.0.replace(SOH, &EXPORT_DELIMITER.to_string())
    }
}

impl std::fmt::Display for RawMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.normalized())
    }
}

/// Ordered tag-value view of one message body.
///
/// Preserves field order and repeated tags so repeating groups
/// (e.g. NoRelatedSym symbols) survive intact. The raw capture travels
/// with the map so market data can be stored verbatim.
#[derive(Debug, Clone)]
pub struct FieldMap {
    fields: Vec<FixField>,
    raw: RawMessage,
}

impl FieldMap {
    /// Builds a field map from ordered tag-value pairs, deriving the raw
    /// capture by rendering `tag=value` pairs joined with SOH.
    #[must_use]
    pub fn new(fields: Vec<FixField>) -> Self {
        let raw = RawMessage::new(
            fields
                .iter()
                .map(|(tag, value)| format!("{tag}={value}"))
                .collect::<Vec<_>>()
                .join(&SOH.to_string()),
        );
        Self { fields, raw }
    }

    /// Builds a field map with an explicit raw capture, as delivered by
    /// the engine.
    #[must_use]
    pub fn with_raw(fields: Vec<FixField>, raw: RawMessage) -> Self {
        Self { fields, raw }
    }

    /// Returns the first value for a tag, if present.
    #[must_use]
    pub fn get(&self, tag: u32) -> Option<&str> {
        self.fields
            .iter()
            .find(|(t, _)| *t == tag)
            .map(|(_, v)| v.as_str())
    }

    /// Returns every value for a tag in field order.
    ///
    /// Repeated tags are how repeating-group entries surface here.
    #[must_use]
    pub fn get_all(&self, tag: u32) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|(t, _)| *t == tag)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    /// Returns the ordered tag-value pairs.
    #[inline]
    #[must_use]
    pub fn fields(&self) -> &[FixField] {
        &self.fields
    }

    /// Returns the verbatim raw capture.
    #[inline]
    #[must_use]
    pub fn raw(&self) -> &RawMessage {
        &self.raw
    }
}
