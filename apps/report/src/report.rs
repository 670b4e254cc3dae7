//! # Campaign Report
//!
//! Turns a snapshot into the document the dashboard and the CLI print.
//!
//! ```text
//! Snapshot ──► aggregate ──► rows ─┬─► row metrics
//!                                  ├─► totals (all, per account)
//!                                  └─► attribution summary
//! ```

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};
use ts_rs::TS;
use whisper_core::{
    totals_by_account, AccountTotals, AttributionConfig, AttributionSummary, CampaignMetrics,
    CampaignRow, CampaignTotals, ReportingPeriod, Snapshot,
};
use whisper_db::Database;

use crate::error::ReportResult;

// =============================================================================
// Report Document
// =============================================================================

/// One campaign row with its derived ratios.
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ReportRow {
    #[serde(flatten)]
    pub row: CampaignRow,
    pub metrics: CampaignMetrics,
}

/// Full output of one reporting run.
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CampaignReport {
    #[ts(as = "String")]
    pub generated_at: DateTime<Utc>,
    /// `None` for an all-time report.
    pub period: Option<ReportingPeriod>,
    pub attribution_window_days: u32,
    pub rows: Vec<ReportRow>,
    pub totals: CampaignTotals,
    pub totals_by_account: Vec<AccountTotals>,
    pub summary: AttributionSummary,
    /// Campaign ids tagged on conversations but missing from the campaign set.
    pub unknown_campaign_ids: Vec<String>,
}

// =============================================================================
// Builder
// =============================================================================

/// Builds [`CampaignReport`]s.
///
/// ## Example
/// ```rust,ignore
/// let report = ReportBuilder::new(14)
///     .period(Some(october))
///     .build(&snapshot);
/// ```
#[derive(Debug, Clone)]
pub struct ReportBuilder {
    window_days: u32,
    period: Option<ReportingPeriod>,
    generated_at: Option<DateTime<Utc>>,
}

impl ReportBuilder {
    pub fn new(window_days: u32) -> Self {
        ReportBuilder {
            window_days,
            period: None,
            generated_at: None,
        }
    }

    /// Restricts the report to a period.
    pub fn period(mut self, period: Option<ReportingPeriod>) -> Self {
        self.period = period;
        self
    }

    /// Fixes the report timestamp instead of using the current time.
    pub fn generated_at(mut self, at: DateTime<Utc>) -> Self {
        self.generated_at = Some(at);
        self
    }

    pub fn attribution_config(&self) -> AttributionConfig {
        AttributionConfig::with_window_days(self.window_days)
    }

    /// Aggregates `snapshot` and assembles the report.
    pub fn build(&self, snapshot: &Snapshot) -> CampaignReport {
        let config = self.attribution_config();
        let aggregation = snapshot.aggregate(self.period.as_ref(), &config);
        let summary = AttributionSummary::from_attributions(&aggregation.attributions);

        let unattributed = summary.unattributed_orders();
        if unattributed > 0 {
            warn!(
                orders = unattributed,
                revenue = %summary.unattributed_revenue,
                "Orders left unattributed"
            );
        }

        let unknown_campaign_ids = snapshot.unknown_campaign_ids();
        if !unknown_campaign_ids.is_empty() {
            warn!(
                campaigns = ?unknown_campaign_ids,
                "Conversations reference campaigns missing from the campaign set"
            );
        }

        let totals = CampaignTotals::from_rows(&aggregation.rows);
        let totals_by_account = totals_by_account(&aggregation.rows);

        info!(
            campaigns = totals.campaigns,
            orders = summary.total_orders,
            revenue = %totals.revenue,
            roas = totals.metrics.roas,
            "Report built"
        );

        let rows = aggregation
            .rows
            .into_iter()
            .map(|row| ReportRow {
                metrics: row.metrics(),
                row,
            })
            .collect();

        CampaignReport {
            generated_at: self.generated_at.unwrap_or_else(Utc::now),
            period: self.period,
            attribution_window_days: self.window_days,
            rows,
            totals,
            totals_by_account,
            summary,
            unknown_campaign_ids,
        }
    }

    /// Loads a snapshot for this builder's period from `db` and builds the
    /// report.
    pub async fn run(&self, db: &Database) -> ReportResult<CampaignReport> {
        let snapshot = db
            .snapshot(self.period.as_ref(), &self.attribution_config())
            .await?;
        Ok(self.build(&snapshot))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
