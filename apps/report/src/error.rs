//! Error types for the reporting CLI.

use std::path::PathBuf;

use thiserror::Error;
use whisper_core::CoreError;
use whisper_db::DbError;

use crate::config::ConfigError;

/// Errors surfaced by report, import and label runs.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Database error: {0}")]
    Database(#[from] DbError),

    /// A wire record failed validation during import.
    #[error("Invalid input: {0}")]
    Core(#[from] CoreError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to render report: {0}")]
    Render(#[source] serde_json::Error),

    #[error("Invalid reporting period: {from} is after {to}")]
    InvalidPeriod { from: String, to: String },
}

/// Result type for CLI operations.
pub type ReportResult<T> = Result<T, ReportError>;
