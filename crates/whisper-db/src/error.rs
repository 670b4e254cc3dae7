//! # Store Errors
//!
//! ```text
//!   sqlx::Error / MigrateError
//!          │
//!          ▼
//!      DbError ──► ReportError::Database (whisper-report) ──► stderr, exit 1
//! ```
//!
//! Constraint failures are classified with [`sqlx::error::ErrorKind`], so a
//! bad import row surfaces as a named violation instead of an opaque query
//! failure.

use sqlx::error::ErrorKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    /// A row with the same key already exists, e.g. inserting an order id twice.
    #[error("Duplicate key: {0}")]
    UniqueViolation(String),

    /// An order item points at a missing order.
    #[error("Foreign key violation: {0}")]
    ForeignKeyViolation(String),

    /// A CHECK constraint rejected a row (negative cents, unknown status).
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    /// A stored row cannot be turned back into a domain value.
    ///
    /// Timestamps that are not RFC 3339, labels outside the known set and
    /// orders without items all end up here.
    #[error("Corrupt {entity} row {id}: {reason}")]
    Corrupt {
        entity: String,
        id: String,
        reason: String,
    },

    #[error("Cannot open store: {0}")]
    ConnectionFailed(String),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    /// Every pooled connection stayed busy past the acquire timeout.
    #[error("Connection pool exhausted")]
    PoolExhausted,

    #[error("Query failed: {0}")]
    QueryFailed(String),
}

impl DbError {
    pub fn corrupt(
        entity: impl Into<String>,
        id: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        DbError::Corrupt {
            entity: entity.into(),
            id: id.into(),
            reason: reason.into(),
        }
    }
}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db_err) => {
                let message = db_err.message().to_string();
                match db_err.kind() {
                    ErrorKind::UniqueViolation => DbError::UniqueViolation(message),
                    ErrorKind::ForeignKeyViolation => DbError::ForeignKeyViolation(message),
                    ErrorKind::CheckViolation | ErrorKind::NotNullViolation => {
                        DbError::ConstraintViolation(message)
                    }
                    _ => DbError::QueryFailed(message),
                }
            }
            sqlx::Error::ColumnDecode { index, source } => {
                DbError::corrupt("column", index, source.to_string())
            }
            sqlx::Error::Decode(source) => DbError::corrupt("value", "?", source.to_string()),
            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,
            sqlx::Error::PoolClosed => DbError::ConnectionFailed("pool is closed".to_string()),
            other => DbError::QueryFailed(other.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

pub type DbResult<T> = Result<T, DbError>;
