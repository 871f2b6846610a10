//! # FIX 4.4 Protocol Surface
//!
//! The message vocabulary the harness exchanges with the engine: field
//! and value constants, the inbound tagged-union model, and outbound
//! request builders. Wire framing, checksums, and session headers stay
//! with the external engine.

pub mod fields;
pub mod inbound;
pub mod outbound;

pub use fields::{FieldMap, FixField, RawMessage};
pub use inbound::InboundMessage;
pub use outbound::{OutboundKind, OutboundMessage};
