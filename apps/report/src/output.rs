//! # Report Output
//!
//! Renders a [`CampaignReport`] as pretty JSON or a plain-text table.

use std::fmt::Write as _;
use std::str::FromStr;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use whisper_core::{CampaignMetrics, CampaignTotals};

use crate::error::{ReportError, ReportResult};
use crate::report::CampaignReport;

/// Output format for the report command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Pretty-printed JSON document.
    Json,
    /// Fixed-width table for terminals.
    #[default]
    Table,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "table" => Ok(OutputFormat::Table),
            other => Err(format!("unknown output format '{other}'")),
        }
    }
}

/// Renders `report` in `format`.
pub fn render(report: &CampaignReport, format: OutputFormat) -> ReportResult<String> {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(report).map_err(ReportError::Render),
        OutputFormat::Table => Ok(render_table(report)),
    }
}

// =============================================================================
// Table
// =============================================================================

const NAME_WIDTH: usize = 32;

fn render_table(report: &CampaignReport) -> String {
    let mut out = String::new();

    let scope = match &report.period {
        Some(period) => format!("{} .. {}", period.from.to_rfc3339(), period.to.to_rfc3339()),
        None => "all time".to_string(),
    };
    // Writing to a String cannot fail.
    let _ = writeln!(
        out,
        "Campaign report ({scope}, window {} days)",
        report.attribution_window_days
    );
    out.push('\n');

    let _ = writeln!(
        out,
        "{:<6} {:<NAME_WIDTH$} {:<8} {:>16} {:>6} {:>6} {:>16} {:>14} {:>7} {:>6}",
        "Cuenta", "Campaña", "Estado", "Gasto", "Conv", "Vent", "Ingresos", "CPC", "CVR %", "ROAS"
    );
    for entry in &report.rows {
        let row = &entry.row;
        let _ = writeln!(
            out,
            "{:<6} {:<NAME_WIDTH$} {:<8} {:>16} {:>6} {:>6} {:>16} {}",
            row.account_type.label(),
            truncate(&row.name, NAME_WIDTH),
            row.status.label(),
            row.meta.spend_total.to_string(),
            row.crm.conversations,
            row.crm.completed_orders,
            row.sales.revenue.to_string(),
            ratios(&entry.metrics),
        );
    }

    out.push('\n');
    for account in &report.totals_by_account {
        write_totals(&mut out, account.account_type.label(), &account.totals);
    }
    write_totals(&mut out, "Total", &report.totals);

    out.push('\n');
    let summary = &report.summary;
    let _ = writeln!(out, "Attribution ({} orders)", summary.total_orders);
    for count in &summary.by_reason {
        let _ = writeln!(out, "  {:<28} {:>6}", count.reason.as_str(), count.orders);
    }
    let _ = writeln!(out, "  {:<28} {:>16}", "attributed revenue", summary.attributed_revenue.to_string());
    let _ = writeln!(out, "  {:<28} {:>16}", "unattributed revenue", summary.unattributed_revenue.to_string());

    if !report.unknown_campaign_ids.is_empty() {
        out.push('\n');
        let _ = writeln!(out, "Unknown campaigns: {}", report.unknown_campaign_ids.join(", "));
    }

    out
}

fn write_totals(out: &mut String, label: &str, totals: &CampaignTotals) {
    let campaigns = format!("{} campaigns", totals.campaigns);
    let _ = writeln!(
        out,
        "{:<6} {:<NAME_WIDTH$} {:<8} {:>16} {:>6} {:>6} {:>16} {}",
        label,
        campaigns,
        "",
        totals.spend_total.to_string(),
        totals.conversations,
        totals.completed_orders,
        totals.revenue.to_string(),
        ratios(&totals.metrics),
    );
}

fn ratios(metrics: &CampaignMetrics) -> String {
    format!(
        "{:>14.2} {:>7.2} {:>6.2}",
        metrics.cost_per_conversation, metrics.conversion_rate, metrics.roas
    )
}

/// Cuts `text` to `width` characters, marking the cut with `…`.
fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(width.saturating_sub(1)).collect();
    cut.push('…');
    cut
}

// =============================================================================
// Unit Tests
// =============================================================================
