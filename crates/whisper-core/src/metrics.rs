//! # Metrics Module
//!
//! Derived campaign ratios. Every view that shows CPC, CVR or ROAS goes
//! through [`derive_metrics`].
//!
//! ## Formulas
//! ```text
//! cost_per_conversation = spend / conversations          0 if conversations == 0
//! conversion_rate       = sales / conversations × 100    0 if conversations == 0
//! roas                  = revenue / spend                0 if spend == 0
//! ```
//!
//! Results are always finite.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::types::{AccountType, CampaignRow};

// =============================================================================
// Campaign Metrics
// =============================================================================

/// Ratios derived from one campaign's (or one group's) figures.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CampaignMetrics {
    /// Spend per conversation, in major units.
    pub cost_per_conversation: f64,
    /// Completed orders per conversation, as a percentage.
    pub conversion_rate: f64,
    /// Revenue per unit of spend.
    pub roas: f64,
}

/// Derives CPC, CVR and ROAS with the zero-denominator policy above.
///
/// ## Example
/// ```rust
/// use whisper_core::metrics::derive_metrics;
/// use whisper_core::money::Money;
///
/// let m = derive_metrics(Money::from_major(100_000), 4, 1, Money::from_major(250_000));
/// assert_eq!(m.cost_per_conversation, 25_000.0);
/// assert_eq!(m.conversion_rate, 25.0);
/// assert_eq!(m.roas, 2.5);
///
/// let idle = derive_metrics(Money::zero(), 0, 0, Money::zero());
/// assert_eq!((idle.cost_per_conversation, idle.conversion_rate, idle.roas), (0.0, 0.0, 0.0));
/// ```
pub fn derive_metrics(
    spend: Money,
    conversations: usize,
    sales: usize,
    revenue: Money,
) -> CampaignMetrics {
    let (cost_per_conversation, conversion_rate) = if conversations == 0 {
        (0.0, 0.0)
    } else {
        let convs = conversations as f64;
        (
            spend.to_major_f64() / convs,
            sales as f64 / convs * 100.0,
        )
    };

    let roas = if spend.is_zero() {
        0.0
    } else {
        revenue.cents() as f64 / spend.cents() as f64
    };

    CampaignMetrics {
        cost_per_conversation: finite_or_zero(cost_per_conversation),
        conversion_rate: finite_or_zero(conversion_rate),
        roas: finite_or_zero(roas),
    }
}

#[inline]
fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

impl CampaignRow {
    /// Derived ratios for this row.
    pub fn metrics(&self) -> CampaignMetrics {
        derive_metrics(
            self.meta.spend_total,
            self.crm.conversations,
            self.crm.completed_orders,
            self.sales.revenue,
        )
    }
}

// =============================================================================
// Totals
// =============================================================================

/// Sums across a set of rows, with blended ratios.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CampaignTotals {
    pub campaigns: usize,
    #[serde(with = "crate::money::major_units")]
    #[ts(type = "number")]
    pub daily_budget: Money,
    #[serde(with = "crate::money::major_units")]
    #[ts(type = "number")]
    pub spend_total: Money,
    pub conversations: usize,
    pub completed_orders: usize,
    #[serde(with = "crate::money::major_units")]
    #[ts(type = "number")]
    pub revenue: Money,
    pub metrics: CampaignMetrics,
}

impl CampaignTotals {
    /// Totals a set of rows. Ratios are derived from the sums, not averaged.
    pub fn from_rows<'a, I>(rows: I) -> Self
    where
        I: IntoIterator<Item = &'a CampaignRow>,
    {
        let mut totals = CampaignTotals::default();

        for row in rows {
            totals.campaigns += 1;
            totals.daily_budget += row.meta.daily_budget;
            totals.spend_total += row.meta.spend_total;
            totals.conversations += row.crm.conversations;
            totals.completed_orders += row.crm.completed_orders;
            totals.revenue += row.sales.revenue;
        }

        totals.metrics = derive_metrics(
            totals.spend_total,
            totals.conversations,
            totals.completed_orders,
            totals.revenue,
        );
        totals
    }
}

/// Totals for one ad account.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct AccountTotals {
    pub account_type: AccountType,
    pub totals: CampaignTotals,
}

/// Totals per account, always Detal then Mayor, including empty accounts.
pub fn totals_by_account(rows: &[CampaignRow]) -> Vec<AccountTotals> {
    [AccountType::Retail, AccountType::Wholesale]
        .into_iter()
        .map(|account_type| AccountTotals {
            account_type,
            totals: CampaignTotals::from_rows(
                rows.iter().filter(|row| row.account_type == account_type),
            ),
        })
        .collect()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CampaignStatus, CrmFigures, MetaFigures, SalesFigures};
    use chrono::Utc;

    fn row(account_type: AccountType, spend: i64, convs: usize, sales: usize, revenue: i64) -> CampaignRow {
        CampaignRow {
            id: format!("c-{spend}"),
            name: "Mensajes a WhatsApp".to_string(),
            status: CampaignStatus::Active,
            delivery_label: CampaignStatus::Active,
            account_type,
            meta: MetaFigures {
                daily_budget: Money::from_major(50_000),
                spend_total: Money::from_major(spend),
            },
            crm: CrmFigures {
                conversations: convs,
                completed_orders: sales,
            },
            sales: SalesFigures {
                revenue: Money::from_major(revenue),
            },
            negatives_pct: None,
            last_updated: Utc::now(),
        }
    }

    #[test]
    fn test_zero_denominators_are_zero() {
        let m = derive_metrics(Money::from_major(10_000), 0, 0, Money::from_major(5_000));
        assert_eq!(m.cost_per_conversation, 0.0);
        assert_eq!(m.conversion_rate, 0.0);
        assert_eq!(m.roas, 0.5);

        let m = derive_metrics(Money::zero(), 3, 1, Money::from_major(90_000));
        assert_eq!(m.roas, 0.0);
        assert_eq!(m.cost_per_conversation, 0.0);
    }

    #[test]
    fn test_metrics_always_finite() {
        let spends = [Money::zero(), Money::from_cents(1), Money::from_major(548_428), Money::from_cents(i64::MAX)];
        let counts = [0usize, 1, 7, usize::MAX];
        let revenues = [Money::zero(), Money::from_major(200_000), Money::from_cents(i64::MAX)];

        for spend in spends {
            for convs in counts {
                for sales in counts {
                    for revenue in revenues {
                        let m = derive_metrics(spend, convs, sales, revenue);
                        assert!(m.cost_per_conversation.is_finite());
                        assert!(m.conversion_rate.is_finite());
                        assert!(m.roas.is_finite());
                    }
                }
            }
        }
    }

    #[test]
    fn test_conversion_rate_is_sales_over_conversations() {
        // 1 sale out of 20 conversations is 5%, not 2000%.
        let m = derive_metrics(Money::from_major(40_000), 20, 1, Money::zero());
        assert_eq!(m.conversion_rate, 5.0);
        assert_eq!(m.cost_per_conversation, 2_000.0);
    }

    #[test]
    fn test_row_metrics() {
        let r = row(AccountType::Wholesale, 100_000, 4, 2, 300_000);
        let m = r.metrics();
        assert_eq!(m.cost_per_conversation, 25_000.0);
        assert_eq!(m.conversion_rate, 50.0);
        assert_eq!(m.roas, 3.0);
    }

    #[test]
    fn test_totals_blend_from_sums() {
        let rows = vec![
            row(AccountType::Retail, 100_000, 10, 1, 200_000),
            row(AccountType::Retail, 300_000, 0, 0, 0),
        ];
        let totals = CampaignTotals::from_rows(&rows);

        assert_eq!(totals.campaigns, 2);
        assert_eq!(totals.spend_total, Money::from_major(400_000));
        assert_eq!(totals.daily_budget, Money::from_major(100_000));
        assert_eq!(totals.conversations, 10);
        assert_eq!(totals.metrics.roas, 0.5);
        assert_eq!(totals.metrics.conversion_rate, 10.0);
    }

    #[test]
    fn test_totals_by_account_fixed_order() {
        let rows = vec![
            row(AccountType::Wholesale, 100_000, 4, 1, 180_000),
            row(AccountType::Wholesale, 50_000, 1, 0, 0),
        ];
        let grouped = totals_by_account(&rows);

        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped[0].account_type, AccountType::Retail);
        assert_eq!(grouped[0].totals.campaigns, 0);
        assert_eq!(grouped[0].totals.metrics, CampaignMetrics::default());
        assert_eq!(grouped[1].account_type, AccountType::Wholesale);
        assert_eq!(grouped[1].totals.campaigns, 2);
        assert_eq!(grouped[1].totals.revenue, Money::from_major(180_000));
    }

    #[test]
    fn test_totals_of_nothing() {
        let totals = CampaignTotals::from_rows(std::iter::empty());
        assert_eq!(totals, CampaignTotals::default());
    }
}
