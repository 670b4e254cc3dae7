//! # whisper-report: Reporting CLI for Gold Whisper
//!
//! Wires configuration, logging and storage around `whisper-core`.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          whisper-report                                 │
//! │                                                                         │
//! │  cli ──► config (defaults → report.toml → WHISPER_* → flags)           │
//! │   │                                                                     │
//! │   ├── (report) ──► Database::snapshot ──► ReportBuilder ──► output     │
//! │   ├── import   ──► wire records ──► validation ──► repositories        │
//! │   └── label    ──► stored campaigns ──► labels                         │
//! │                                                                         │
//! │  Logs go to stderr; the report goes to stdout.                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod import;
pub mod label;
pub mod output;
pub mod report;

pub use config::{ConfigError, ReportConfig};
pub use error::{ReportError, ReportResult};
pub use output::{render, OutputFormat};
pub use report::{CampaignReport, ReportBuilder, ReportRow};
