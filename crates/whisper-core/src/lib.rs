//! # whisper-core: Campaign Attribution & Revenue Reporting
//!
//! Pure reporting logic for the Gold Whisper back-office: which campaign
//! earned which order, how much that order was really worth, and what the
//! resulting per-campaign figures look like.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Gold Whisper Reporting                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │              whisper-report (CLI, config, logging)              │   │
//! │  │        load snapshot ──► build report ──► JSON / table          │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              ★ whisper-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────┐  ┌───────────┐  ┌───────────┐  ┌──────────┐    │   │
//! │  │   │   wire   │  │  revenue  │  │attribution│  │ metrics  │    │   │
//! │  │   │ records  │─►│ net value │  │ tier chain│  │ CPC CVR  │    │   │
//! │  │   │ validate │  └─────┬─────┘  └─────┬─────┘  │  ROAS    │    │   │
//! │  │   └──────────┘        └──► aggregate ◄┘       └──────────┘    │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              whisper-db (SQLite snapshot store)                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`money`] - Integer money in cents
//! - [`types`] - Domain types (Campaign, Conversation, Order, CampaignRow)
//! - [`wire`] - Collaborator JSON records and their validated conversion
//! - [`validation`] - Field rules used by `wire`
//! - [`revenue`] - Net revenue of one order
//! - [`attribution`] - Order → conversation → campaign matching
//! - [`aggregate`] - One row per campaign
//! - [`metrics`] - CPC, CVR, ROAS and totals
//! - [`labels`] - Campaign/category labels from inbox messages
//! - [`error`] - Domain error types
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: same snapshot in, same rows out
//! 2. **Validated Boundary**: loose JSON stops at [`wire`]; past it, fields are typed
//! 3. **Integer Money**: revenue, spend and prices are cents (i64)
//! 4. **Never Fails Past the Boundary**: unattributed orders and zero
//!    denominators are ordinary outcomes
//!
//! ## Example Usage
//!
//! ```rust
//! use whisper_core::wire::SnapshotRecords;
//! use whisper_core::{aggregate_campaigns, Snapshot};
//!
//! let records: SnapshotRecords = serde_json::from_str(r#"{
//!     "campaigns": [{
//!         "id": "C1", "name": "Joyería Detal", "accountType": "Detal",
//!         "dailyBudget": 50000, "spendTotal": 100000,
//!         "status": "Activa", "deliveryLabel": "Activa",
//!         "lastUpdated": "2025-10-07T00:00:00Z"
//!     }],
//!     "conversations": [{
//!         "id": "conv-A", "campaignId": "C1", "startedAt": "2025-10-01T10:00:00Z",
//!         "customerPhone": "+57 300 111 2233", "status": "Pedido Completo"
//!     }],
//!     "orders": [{
//!         "id": "O1", "customerPhone": "3001112233", "createdAt": "2025-10-02T10:00:00Z",
//!         "conversationId": "conv-A",
//!         "items": [{ "sku": "DIJE", "title": "Dije", "unitPrice": 100000, "qty": 2 }],
//!         "shippingCost": 15000, "currency": "COP"
//!     }]
//! }"#).unwrap();
//!
//! let snapshot = Snapshot::try_from(records).unwrap();
//! let rows = aggregate_campaigns(&snapshot.campaigns, &snapshot.conversations, &snapshot.orders);
//!
//! assert_eq!(rows[0].sales.revenue.major(), 200_000);
//! assert_eq!(rows[0].metrics().roas, 2.0);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod aggregate;
pub mod attribution;
pub mod error;
pub mod labels;
pub mod metrics;
pub mod money;
pub mod revenue;
pub mod types;
pub mod validation;
pub mod wire;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use aggregate::{
    aggregate_campaigns, aggregate_campaigns_with, aggregate_period, attribute_orders, Aggregation,
    AttributionSummary, OrderAttribution,
};
pub use attribution::{attribute, normalize_phone, Attribution, AttributionConfig, AttributionReason};
pub use error::{CoreError, CoreResult, ValidationError};
pub use metrics::{derive_metrics, totals_by_account, AccountTotals, CampaignMetrics, CampaignTotals};
pub use money::Money;
pub use revenue::compute_order_net_revenue;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Default attribution window for phone matching, in days.
pub const DEFAULT_ATTRIBUTION_WINDOW_DAYS: u32 = attribution::DEFAULT_WINDOW_DAYS;

/// Upper bound accepted for a configured attribution window, in days.
pub const MAX_ATTRIBUTION_WINDOW_DAYS: u32 = 365;
