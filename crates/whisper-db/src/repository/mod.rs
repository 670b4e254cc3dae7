//! # Repository Module
//!
//! One repository per reporting input.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  db.campaigns()      ──► CampaignRepository      ──► campaigns          │
//! │  db.conversations()  ──► ConversationRepository  ──► conversations      │
//! │  db.orders()         ──► OrderRepository         ──► orders             │
//! │                                                     order_items         │
//! │                                                                         │
//! │  Each repository also exposes crate-private `fetch_*` functions that    │
//! │  run on a borrowed connection, so `Database::snapshot` can read all     │
//! │  three tables inside one transaction.                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Storage Encoding
//! - Money: INTEGER cents
//! - Timestamps: RFC 3339 UTC text, nanosecond precision, `Z` suffix
//! - Enums: their wire labels (`Detal`, `Activa`, `Pedido Completo`, ...)

use chrono::{DateTime, SecondsFormat, Utc};

use crate::error::{DbError, DbResult};

pub mod campaign;
pub mod conversation;
pub mod order;

/// Fixed-width text form, so string comparison in SQL is time comparison.
///
/// Always nine fractional digits: the round trip keeps every instant chrono
/// can hold.
pub(crate) fn encode_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

/// Parses a stored timestamp, reporting the owning row on failure.
pub(crate) fn decode_timestamp(
    entity: &str,
    id: &str,
    column: &str,
    value: &str,
) -> DbResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| DbError::corrupt(entity, id, format!("{column} '{value}': {e}")))
}
