//! # Aggregation Module
//!
//! Builds one [`CampaignRow`] per input campaign from a snapshot.
//!
//! ## Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Campaign Aggregation                             │
//! │                                                                         │
//! │  conversations ──► group by declared campaign_id ──► crm.conversations │
//! │                                                 └──► crm.completedOrders│
//! │                                                                         │
//! │  orders ──► attribute (tier chain) ──► campaign_id ──┐                  │
//! │        └──► compute_order_net_revenue ───────────────┴─► sales.revenue  │
//! │                                                                         │
//! │  campaigns ──► one row each (zeros when nothing matched)                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Conversation counts follow each conversation's own `campaign_id`.
//! Revenue follows order attribution. The two can disagree: a phone match
//! may credit a campaign through a conversation whose count sits under the
//! same campaign, while another campaign keeps its conversation count with
//! no revenue at all.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::attribution::{AttributionConfig, AttributionReason, ConversationIndex};
use crate::money::Money;
use crate::revenue::compute_order_net_revenue;
use crate::types::{
    Campaign, CampaignRow, Conversation, ConversationStatus, CrmFigures, MetaFigures, Order,
    ReportingPeriod, SalesFigures, Snapshot,
};

// =============================================================================
// Per-Order Attribution
// =============================================================================

/// Attribution outcome of one order, with its net revenue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct OrderAttribution {
    pub order_id: String,
    #[ts(optional)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
    #[ts(optional)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub campaign_id: Option<String>,
    pub reason: AttributionReason,
    #[serde(with = "crate::money::major_units")]
    #[ts(type = "number")]
    pub net_revenue: Money,
}

/// Attributes every order against one conversation batch, in input order.
pub fn attribute_orders(
    orders: &[Order],
    conversations: &[Conversation],
    config: &AttributionConfig,
) -> Vec<OrderAttribution> {
    let index = ConversationIndex::new(conversations);
    attribute_with_index(&index, orders, config)
}

fn attribute_with_index<'o, I>(
    index: &ConversationIndex<'_>,
    orders: I,
    config: &AttributionConfig,
) -> Vec<OrderAttribution>
where
    I: IntoIterator<Item = &'o Order>,
{
    orders
        .into_iter()
        .map(|order| {
            let attribution = index.attribute(order, config);
            OrderAttribution {
                order_id: order.id.clone(),
                conversation_id: attribution.conversation.map(|c| c.id.clone()),
                campaign_id: attribution.campaign_id().map(str::to_string),
                reason: attribution.reason,
                net_revenue: compute_order_net_revenue(order),
            }
        })
        .collect()
}

// =============================================================================
// Attribution Summary
// =============================================================================

/// Order count for one attribution reason.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ReasonCount {
    pub reason: AttributionReason,
    pub orders: usize,
}

/// How a run's orders were attributed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct AttributionSummary {
    pub total_orders: usize,
    /// One entry per reason, in tier order, zeros included.
    pub by_reason: Vec<ReasonCount>,
    #[serde(with = "crate::money::major_units")]
    #[ts(type = "number")]
    pub attributed_revenue: Money,
    #[serde(with = "crate::money::major_units")]
    #[ts(type = "number")]
    pub unattributed_revenue: Money,
}

impl AttributionSummary {
    pub fn from_attributions(attributions: &[OrderAttribution]) -> Self {
        let mut counts: BTreeMap<AttributionReason, usize> = BTreeMap::new();
        let mut attributed_revenue = Money::zero();
        let mut unattributed_revenue = Money::zero();

        for attribution in attributions {
            *counts.entry(attribution.reason).or_default() += 1;

            if attribution.campaign_id.is_some() {
                attributed_revenue += attribution.net_revenue;
            } else {
                unattributed_revenue += attribution.net_revenue;
            }
        }

        AttributionSummary {
            total_orders: attributions.len(),
            by_reason: AttributionReason::ALL
                .into_iter()
                .map(|reason| ReasonCount {
                    reason,
                    orders: counts.get(&reason).copied().unwrap_or(0),
                })
                .collect(),
            attributed_revenue,
            unattributed_revenue,
        }
    }

    /// Orders with the given reason.
    pub fn count(&self, reason: AttributionReason) -> usize {
        self.by_reason
            .iter()
            .find(|entry| entry.reason == reason)
            .map(|entry| entry.orders)
            .unwrap_or(0)
    }

    pub fn unattributed_orders(&self) -> usize {
        self.count(AttributionReason::Unattributed)
    }
}

// =============================================================================
// Aggregation
// =============================================================================

/// Full aggregation result: rows plus the per-order detail behind them.
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregation {
    pub rows: Vec<CampaignRow>,
    pub attributions: Vec<OrderAttribution>,
}

/// Aggregates with the default 14-day attribution window.
///
/// ## Example
/// ```rust
/// use whisper_core::aggregate::aggregate_campaigns;
///
/// let rows = aggregate_campaigns(&[], &[], &[]);
/// assert!(rows.is_empty());
/// ```
pub fn aggregate_campaigns(
    campaigns: &[Campaign],
    conversations: &[Conversation],
    orders: &[Order],
) -> Vec<CampaignRow> {
    aggregate_campaigns_with(campaigns, conversations, orders, &AttributionConfig::default()).rows
}

/// Aggregates with an explicit attribution config.
///
/// Never fails. Conversations or orders pointing at campaigns outside
/// `campaigns` are tolerated and simply produce no row.
pub fn aggregate_campaigns_with(
    campaigns: &[Campaign],
    conversations: &[Conversation],
    orders: &[Order],
    config: &AttributionConfig,
) -> Aggregation {
    let index = ConversationIndex::new(conversations);
    let attributions = attribute_with_index(&index, orders, config);
    let rows = build_rows(campaigns, &index, &attributions, |_| true);

    Aggregation { rows, attributions }
}

/// Aggregates one reporting period.
///
/// Only orders created inside `period` are attributed, but they may match
/// any conversation in the batch, so callers can pass conversations from
/// a window around the period. Conversation counts only include
/// conversations started inside `period`.
pub fn aggregate_period(
    campaigns: &[Campaign],
    conversations: &[Conversation],
    orders: &[Order],
    period: &ReportingPeriod,
    config: &AttributionConfig,
) -> Aggregation {
    let in_period = orders
        .iter()
        .filter(|order| period.contains(order.created_at));

    let index = ConversationIndex::new(conversations);
    let attributions = attribute_with_index(&index, in_period, config);
    let rows = build_rows(campaigns, &index, &attributions, |c| period.contains(c.started_at));

    Aggregation { rows, attributions }
}

fn build_rows<F>(
    campaigns: &[Campaign],
    index: &ConversationIndex<'_>,
    attributions: &[OrderAttribution],
    counted: F,
) -> Vec<CampaignRow>
where
    F: Fn(&Conversation) -> bool,
{
    let mut revenue_by_campaign: HashMap<&str, Money> = HashMap::new();
    for attribution in attributions {
        if let Some(campaign_id) = attribution.campaign_id.as_deref() {
            *revenue_by_campaign.entry(campaign_id).or_default() += attribution.net_revenue;
        }
    }

    campaigns
        .iter()
        .map(|campaign| {
            let grouped: Vec<&Conversation> = index
                .for_campaign(&campaign.id)
                .iter()
                .copied()
                .filter(|c| counted(c))
                .collect();
            let completed_orders = grouped
                .iter()
                .filter(|c| c.status == ConversationStatus::OrderCompleted)
                .count();

            CampaignRow {
                id: campaign.id.clone(),
                name: campaign.name.clone(),
                status: campaign.status,
                delivery_label: campaign.delivery_label,
                account_type: campaign.account_type,
                meta: MetaFigures {
                    daily_budget: campaign.daily_budget,
                    spend_total: campaign.spend_total,
                },
                crm: CrmFigures {
                    conversations: grouped.len(),
                    completed_orders,
                },
                sales: SalesFigures {
                    revenue: revenue_by_campaign
                        .get(campaign.id.as_str())
                        .copied()
                        .unwrap_or_default(),
                },
                negatives_pct: campaign.negatives_pct,
                last_updated: campaign.last_updated,
            }
        })
        .collect()
}

impl Snapshot {
    /// Aggregates this snapshot, restricted to `period` when given.
    pub fn aggregate(&self, period: Option<&ReportingPeriod>, config: &AttributionConfig) -> Aggregation {
        match period {
            Some(period) => aggregate_period(
                &self.campaigns,
                &self.conversations,
                &self.orders,
                period,
                config,
            ),
            None => aggregate_campaigns_with(&self.campaigns, &self.conversations, &self.orders, config),
        }
    }

    /// Campaign ids declared by conversations but missing from `campaigns`,
    /// sorted.
    pub fn unknown_campaign_ids(&self) -> Vec<String> {
        let mut unknown: Vec<String> = self
            .conversations
            .iter()
            .map(|c| c.campaign_id.as_str())
            .filter(|id| !self.campaigns.iter().any(|campaign| campaign.id == *id))
            .map(str::to_string)
            .collect();
        unknown.sort();
        unknown.dedup();
        unknown
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
