//! # Domain Types
//!
//! Validated domain types consumed and produced by the reporting core.
//!
//! ## Type Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Campaign     │   │  Conversation   │   │     Order       │       │
//! │  │  (ads platform) │   │ (inbox platform)│   │  (sales store)  │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │◄──│  campaign_id    │   │  conversation_id│──┐    │
//! │  │  spend_total    │   │  started_at     │   │  utm_campaign_id│  │    │
//! │  │  daily_budget   │   │  customer_phone │   │  customer_phone │  │    │
//! │  │  status         │   │  status         │   │  items[]        │  │    │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘  │    │
//! │                               ▲                                    │    │
//! │                               └──────── attribution ───────────────┘    │
//! │                                                                         │
//! │  Output: CampaignRow { meta, crm, sales } one per Campaign              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Inputs are read-only snapshots; nothing in the core mutates them.
//! Wire shapes (what the collaborators send) live in [`crate::wire`].

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Enumerations
// =============================================================================

/// Ad account a campaign belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[ts(export)]
pub enum AccountType {
    /// Retail account.
    #[serde(rename = "Detal")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "Detal"))]
    Retail,
    /// Wholesale account.
    #[serde(rename = "Mayor")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "Mayor"))]
    Wholesale,
}

impl AccountType {
    /// Wire label used by the dashboard.
    pub const fn label(&self) -> &'static str {
        match self {
            AccountType::Retail => "Detal",
            AccountType::Wholesale => "Mayor",
        }
    }
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Delivery status of a campaign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[ts(export)]
pub enum CampaignStatus {
    #[serde(rename = "Activa")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "Activa"))]
    Active,
    #[serde(rename = "Pausada")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "Pausada"))]
    Paused,
}

impl CampaignStatus {
    pub const fn label(&self) -> &'static str {
        match self {
            CampaignStatus::Active => "Activa",
            CampaignStatus::Paused => "Pausada",
        }
    }
}

impl fmt::Display for CampaignStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Lifecycle status of an inbox conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[ts(export)]
pub enum ConversationStatus {
    /// Still being worked by an agent.
    #[serde(rename = "Abierta")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "Abierta"))]
    Open,
    /// The customer placed an order. Counts as a sale for CVR.
    #[serde(rename = "Pedido Completo")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "Pedido Completo"))]
    OrderCompleted,
    /// Closed without an order.
    #[serde(rename = "Cerrada")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "Cerrada"))]
    Closed,
}

impl ConversationStatus {
    pub const fn label(&self) -> &'static str {
        match self {
            ConversationStatus::Open => "Abierta",
            ConversationStatus::OrderCompleted => "Pedido Completo",
            ConversationStatus::Closed => "Cerrada",
        }
    }
}

impl fmt::Display for ConversationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// =============================================================================
// Campaign
// =============================================================================

/// Campaign snapshot fetched from the ads platform.
#[derive(Debug, Clone, PartialEq)]
pub struct Campaign {
    pub id: String,
    pub name: String,
    pub account_type: AccountType,
    pub daily_budget: Money,
    /// Cumulative spend for the reporting period.
    pub spend_total: Money,
    pub status: CampaignStatus,
    /// Mirrors `status` as shown by the ads manager.
    pub delivery_label: CampaignStatus,
    /// Share of negative feedback, 0-100.
    pub negatives_pct: Option<f64>,
    pub last_updated: DateTime<Utc>,
}

// =============================================================================
// Conversation
// =============================================================================

/// An inbox conversation labeled with the campaign that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct Conversation {
    pub id: String,
    /// Declared campaign. May reference a campaign absent from the
    /// current campaign set.
    pub campaign_id: String,
    pub started_at: DateTime<Utc>,
    /// Free-form phone as typed in the inbox; see
    /// [`crate::attribution::normalize_phone`].
    pub customer_phone: String,
    pub status: ConversationStatus,
}

// =============================================================================
// Order
// =============================================================================

/// A line item on an order.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderItem {
    pub sku: String,
    pub title: String,
    pub unit_price: Money,
    pub qty: i64,
    /// Units returned. May exceed `qty` in malformed data.
    pub returned_qty: Option<i64>,
    /// Per-unit discount. May exceed `unit_price` in malformed data.
    pub discount_per_unit: Option<Money>,
}

impl OrderItem {
    /// Quantity kept by the customer, never below zero.
    #[inline]
    pub fn effective_qty(&self) -> i64 {
        (self.qty - self.returned_qty.unwrap_or(0)).max(0)
    }

    /// Unit price after the per-unit discount. Not clamped.
    #[inline]
    pub fn effective_unit_price(&self) -> Money {
        self.unit_price - self.discount_per_unit.unwrap_or_default()
    }
}

/// A sales order, optionally linked to a conversation or campaign.
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub id: String,
    /// Direct link to the conversation that closed the sale.
    pub conversation_id: Option<String>,
    /// UTM-style campaign hint captured at checkout.
    pub utm_campaign_id: Option<String>,
    pub customer_phone: String,
    pub created_at: DateTime<Utc>,
    pub items: Vec<OrderItem>,
    /// Never part of revenue.
    pub shipping_cost: Money,
    /// Never part of revenue.
    pub other_fees: Option<Money>,
    /// ISO 4217 code, upper-case (e.g. "COP").
    pub currency: String,
}

// =============================================================================
// Snapshot
// =============================================================================

/// One consistent set of inputs for an aggregation run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub campaigns: Vec<Campaign>,
    pub conversations: Vec<Conversation>,
    pub orders: Vec<Order>,
}

// =============================================================================
// Reporting Period
// =============================================================================

/// Inclusive time range a report covers, e.g. the current month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ReportingPeriod {
    #[ts(as = "String")]
    pub from: DateTime<Utc>,
    #[ts(as = "String")]
    pub to: DateTime<Utc>,
}

impl ReportingPeriod {
    /// Creates a period. Returns `None` when `from` is after `to`.
    pub fn new(from: DateTime<Utc>, to: DateTime<Utc>) -> Option<Self> {
        (from <= to).then_some(ReportingPeriod { from, to })
    }

    #[inline]
    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        self.from <= ts && ts <= self.to
    }

    /// Extends both ends by `margin`, saturating at the representable range.
    pub fn widened(&self, margin: Duration) -> Self {
        ReportingPeriod {
            from: self.from.checked_sub_signed(margin).unwrap_or(DateTime::<Utc>::MIN_UTC),
            to: self.to.checked_add_signed(margin).unwrap_or(DateTime::<Utc>::MAX_UTC),
        }
    }
}

// =============================================================================
// Campaign Row (output)
// =============================================================================

/// Figures reported by the ads platform.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct MetaFigures {
    #[serde(with = "crate::money::major_units")]
    #[ts(type = "number")]
    pub daily_budget: Money,
    #[serde(with = "crate::money::major_units")]
    #[ts(type = "number")]
    pub spend_total: Money,
}

/// Figures derived from the inbox.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CrmFigures {
    /// Conversations declaring this campaign.
    pub conversations: usize,
    /// Of those, conversations in `Pedido Completo`.
    pub completed_orders: usize,
}

/// Figures derived from attributed orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SalesFigures {
    /// Net revenue of orders attributed to this campaign, shipping excluded.
    #[serde(with = "crate::money::major_units")]
    #[ts(type = "number")]
    pub revenue: Money,
}

/// One aggregated row per campaign, as rendered by the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CampaignRow {
    pub id: String,
    pub name: String,
    pub status: CampaignStatus,
    pub delivery_label: CampaignStatus,
    pub account_type: AccountType,
    pub meta: MetaFigures,
    pub crm: CrmFigures,
    pub sales: SalesFigures,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub negatives_pct: Option<f64>,
    #[ts(as = "String")]
    pub last_updated: DateTime<Utc>,
}

// =============================================================================
// Unit Tests
// =============================================================================
