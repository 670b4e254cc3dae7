//! # whisper-db: Snapshot Store for Gold Whisper Reporting
//!
//! Persists campaigns, inbox conversations and orders in SQLite, and loads
//! them back as one consistent [`whisper_core::Snapshot`].
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Gold Whisper Data Flow                             │
//! │                                                                         │
//! │  whisper-report import / report                                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   whisper-db (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌────────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories  │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │                │    │  (embedded)  │  │   │
//! │  │   │               │    │ CampaignRepo   │    │ 001_initial  │  │   │
//! │  │   │ SqlitePool    │◄───│ ConversationRe │    │   _schema    │  │   │
//! │  │   │ snapshot()    │    │ OrderRepo      │    │              │  │   │
//! │  │   └───────────────┘    └────────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database                             │   │
//! │  │   ~/.local/share/whisper-report/whisper.db                      │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Campaign, conversation and order repositories
//! - [`snapshot`] - One-transaction snapshot loading and storing
//!
//! ## Usage
//!
//! ```rust,ignore
//! use whisper_core::{AttributionConfig, ReportingPeriod};
//! use whisper_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("path/to/whisper.db")).await?;
//!
//! let config = AttributionConfig::default();
//! let snapshot = db.snapshot(Some(&october), &config).await?;
//! let result = snapshot.aggregate(Some(&october), &config);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod snapshot;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig, StoreCounts};

// Repository re-exports for convenience
pub use repository::campaign::CampaignRepository;
pub use repository::conversation::ConversationRepository;
pub use repository::order::OrderRepository;
