//! Command line interface.

use std::path::PathBuf;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use clap::{Parser, Subcommand};
use whisper_core::ReportingPeriod;

use crate::config::ReportConfig;
use crate::error::{ReportError, ReportResult};
use crate::output::OutputFormat;

#[derive(Debug, Parser)]
#[command(name = "whisper-report")]
#[command(about = "Campaign attribution and revenue reports for Gold Whisper")]
#[command(version)]
pub struct Cli {
    /// Config file (default: report.toml in the platform config directory)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// SQLite database file
    #[arg(long, global = true, value_name = "PATH")]
    pub db: Option<PathBuf>,

    /// Phone attribution window, in days
    #[arg(long, global = true, value_name = "DAYS")]
    pub window_days: Option<u32>,

    /// Period start: RFC 3339, or YYYY-MM-DD for the start of that day (UTC)
    #[arg(long, value_name = "WHEN", value_parser = parse_period_start, requires = "to")]
    pub from: Option<DateTime<Utc>>,

    /// Period end: RFC 3339, or YYYY-MM-DD for the end of that day (UTC)
    #[arg(long, value_name = "WHEN", value_parser = parse_period_end, requires = "from")]
    pub to: Option<DateTime<Utc>>,

    /// Output format
    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Validate a JSON file of campaigns, conversations and orders and store it
    Import {
        /// File with `{ "campaigns": [...], "conversations": [...], "orders": [...] }`
        file: PathBuf,
    },

    /// Suggest campaign and category labels for a conversation's messages
    Label {
        /// Message texts, oldest first
        #[arg(required = true)]
        messages: Vec<String>,
    },
}

impl Cli {
    /// Flags win over file and environment settings.
    pub fn apply_overrides(&self, config: &mut ReportConfig) {
        if let Some(db) = &self.db {
            config.database.path = db.clone();
        }
        if let Some(days) = self.window_days {
            config.attribution.window_days = days;
        }
        if let Some(format) = self.format {
            config.output.format = format;
        }
    }

    /// Loads the configuration, applies these flags on top and validates
    /// the merged result.
    pub fn resolve_config<F>(&self, env: F) -> ReportResult<ReportConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = ReportConfig::load(self.config.as_deref(), env)?;
        self.apply_overrides(&mut config);
        config.validate()?;
        Ok(config)
    }

    /// The requested reporting period, if any.
    pub fn period(&self) -> ReportResult<Option<ReportingPeriod>> {
        match (self.from, self.to) {
            (Some(from), Some(to)) => ReportingPeriod::new(from, to)
                .map(Some)
                .ok_or_else(|| ReportError::InvalidPeriod {
                    from: from.to_rfc3339(),
                    to: to.to_rfc3339(),
                }),
            _ => Ok(None),
        }
    }
}

fn parse_period_start(value: &str) -> Result<DateTime<Utc>, String> {
    let midnight = NaiveTime::from_hms_opt(0, 0, 0).ok_or("invalid midnight")?;
    parse_when(value, midnight)
}

fn parse_period_end(value: &str) -> Result<DateTime<Utc>, String> {
    let end_of_day =
        NaiveTime::from_hms_nano_opt(23, 59, 59, 999_999_999).ok_or("invalid end of day")?;
    parse_when(value, end_of_day)
}

/// RFC 3339 instant, or a calendar date at `time_of_day` UTC.
fn parse_when(value: &str, time_of_day: NaiveTime) -> Result<DateTime<Utc>, String> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Ok(ts.with_timezone(&Utc));
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map(|date| date.and_time(time_of_day).and_utc())
        .map_err(|_| format!("expected RFC 3339 or YYYY-MM-DD, got '{value}'"))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConfigError, ENV_WINDOW_DAYS};
    use chrono::TimeZone;

    #[test]
    fn test_default_command_is_report() {
        let cli = Cli::try_parse_from(["whisper-report"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.period().unwrap(), None);
    }

    #[test]
    fn test_date_period_covers_whole_days() {
        let cli = Cli::try_parse_from([
            "whisper-report",
            "--from",
            "2025-10-01",
            "--to",
            "2025-10-31",
            "--format",
            "json",
        ])
        .unwrap();

        let period = cli.period().unwrap().unwrap();
        assert_eq!(period.from, Utc.with_ymd_and_hms(2025, 10, 1, 0, 0, 0).unwrap());
        assert_eq!(
            period.to,
            Utc.with_ymd_and_hms(2025, 11, 1, 0, 0, 0).unwrap() - chrono::Duration::nanoseconds(1)
        );
        assert_eq!(cli.format, Some(OutputFormat::Json));
    }

    #[test]
    fn test_rfc3339_period() {
        let cli = Cli::try_parse_from([
            "whisper-report",
            "--from",
            "2025-10-01T05:00:00Z",
            "--to",
            "2025-11-01T04:59:59-00:00",
        ])
        .unwrap();
        let period = cli.period().unwrap().unwrap();
        assert_eq!(period.from, Utc.with_ymd_and_hms(2025, 10, 1, 5, 0, 0).unwrap());
    }

    #[test]
    fn test_period_needs_both_ends() {
        assert!(Cli::try_parse_from(["whisper-report", "--from", "2025-10-01"]).is_err());
        assert!(Cli::try_parse_from(["whisper-report", "--to", "2025-10-01"]).is_err());
        assert!(Cli::try_parse_from(["whisper-report", "--from", "ayer", "--to", "hoy"]).is_err());
    }

    #[test]
    fn test_inverted_period() {
        let cli = Cli::try_parse_from(["whisper-report", "--from", "2025-10-31", "--to", "2025-10-01"]).unwrap();
        assert!(matches!(cli.period(), Err(ReportError::InvalidPeriod { .. })));
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["whisper-report", "import", "records.json", "--db", "/tmp/w.db"]).unwrap();
        assert!(matches!(cli.command, Some(Command::Import { ref file }) if file == &PathBuf::from("records.json")));

        let mut config = ReportConfig::default();
        cli.apply_overrides(&mut config);
        assert_eq!(config.database.path, PathBuf::from("/tmp/w.db"));
    }

    #[test]
    fn test_label_requires_messages() {
        assert!(Cli::try_parse_from(["whisper-report", "label"]).is_err());
        let cli = Cli::try_parse_from(["whisper-report", "label", "hola", "quiero un anillo"]).unwrap();
        assert!(matches!(cli.command, Some(Command::Label { ref messages }) if messages.len() == 2));
    }

    #[test]
    fn test_flags_override_config() {
        let cli = Cli::try_parse_from(["whisper-report", "--window-days", "30", "--format", "table"]).unwrap();
        let mut config = ReportConfig::default();
        config.output.format = OutputFormat::Json;
        cli.apply_overrides(&mut config);

        assert_eq!(config.attribution.window_days, 30);
        assert_eq!(config.output.format, OutputFormat::Table);
    }

    #[test]
    fn test_flag_rescues_out_of_range_env_window() {
        let env = |key: &str| (key == ENV_WINDOW_DAYS).then(|| "0".to_string());

        let cli = Cli::try_parse_from(["whisper-report", "--window-days", "7"]).unwrap();
        let config = cli.resolve_config(env).unwrap();
        assert_eq!(config.attribution.window_days, 7);

        let cli = Cli::try_parse_from(["whisper-report"]).unwrap();
        let err = cli.resolve_config(env).unwrap_err();
        assert!(matches!(
            err,
            ReportError::Config(ConfigError::WindowOutOfRange { days: 0, .. })
        ));
    }
}
