//! # Gold Whisper Report
//!
//! Entry point for the `whisper-report` binary.

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use whisper_db::Database;
use whisper_report::cli::{Cli, Command};
use whisper_report::config::ENV_LOG;
use whisper_report::report::ReportBuilder;
use whisper_report::{import, label, render, ReportConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let config = cli.resolve_config(|key| std::env::var(key).ok())?;

    if let Some(parent) = config.database.path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating data directory {}", parent.display()))?;
    }

    info!(
        db = %config.database.path.display(),
        window_days = config.attribution.window_days,
        "Configuration loaded"
    );

    let db = Database::new(config.db_config())
        .await
        .with_context(|| format!("opening {}", config.database.path.display()))?;

    let outcome = run(&cli, &config, &db).await;
    db.close().await;
    outcome
}

async fn run(cli: &Cli, config: &ReportConfig, db: &Database) -> anyhow::Result<()> {
    match &cli.command {
        Some(Command::Import { file }) => {
            let stats = import::import_file(db, file).await?;
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
        Some(Command::Label { messages }) => {
            let suggestion = label::suggest_from_store(db, messages.as_slice()).await?;
            println!("{}", serde_json::to_string_pretty(&suggestion)?);
        }
        None => {
            let report = ReportBuilder::new(config.attribution.window_days)
                .period(cli.period()?)
                .run(db)
                .await?;
            println!("{}", render(&report, config.output.format)?);
        }
    }
    Ok(())
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `WHISPER_LOG=debug` - Show debug messages
/// - `WHISPER_LOG=whisper_db=trace` - Trace the store only
/// - Default: warnings, plus info from the whisper crates
fn init_tracing() {
    let filter = EnvFilter::try_from_env(ENV_LOG)
        .unwrap_or_else(|_| EnvFilter::new("warn,whisper_report=info,whisper_db=info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
