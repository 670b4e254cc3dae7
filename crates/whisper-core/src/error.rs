//! # Error Types
//!
//! Domain-specific error types for whisper-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  whisper-core errors (this file)                                       │
//! │  ├── CoreError        - A record failed the input boundary             │
//! │  └── ValidationError  - Which field failed and why                     │
//! │                                                                         │
//! │  whisper-db errors (separate crate)                                    │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  whisper-report errors (app)                                           │
//! │  └── ReportError      - Config, IO, db and core failures               │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ReportError → CLI exit            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## What Is NOT an Error
//! - An order that matches no conversation (`AttributionReason::Unattributed`)
//! - A zero denominator in a derived metric (defined as 0)
//! - A conversation pointing at a campaign missing from the campaign set

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Failures surfaced by the validated-input boundary.
///
/// Aggregation itself never fails; these errors only occur while turning
/// wire records into domain types.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A campaign record from the ads platform is malformed.
    #[error("Invalid campaign {id}: {source}")]
    InvalidCampaign {
        id: String,
        #[source]
        source: ValidationError,
    },

    /// A conversation record from the inbox platform is malformed.
    #[error("Invalid conversation {id}: {source}")]
    InvalidConversation {
        id: String,
        #[source]
        source: ValidationError,
    },

    /// An order record from the sales store is malformed.
    ///
    /// ## When This Occurs
    /// - Missing or unparseable `createdAt`
    /// - Empty `items`
    /// - Negative or non-finite money, fractional quantities
    #[error("Invalid order {id}: {source}")]
    InvalidOrder {
        id: String,
        #[source]
        source: ValidationError,
    },

    /// Validation error outside of a specific record.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// A field of a collaborator record failed a rule.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// A required field is missing or blank.
    #[error("{field} is required")]
    Required { field: String },

    /// Invalid format (e.g., unparseable timestamp).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Number outside an inclusive range (e.g. `negativesPct` 0..=100).
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: f64, max: f64 },

    /// Value must be zero or greater.
    #[error("{field} must not be negative")]
    MustBeNonNegative { field: String },

    /// Value must be finite (not NaN or infinite).
    #[error("{field} must be a finite number")]
    NotFinite { field: String },

    /// Value must be a whole number.
    #[error("{field} must be a whole number")]
    NotIntegral { field: String },

    /// A collection must contain at least one element.
    #[error("{field} must not be empty")]
    Empty { field: String },
}

impl ValidationError {
    /// Creates a Required error for a field.
    pub fn required(field: impl Into<String>) -> Self {
        ValidationError::Required { field: field.into() }
    }

    /// Creates an InvalidFormat error.
    pub fn invalid_format(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError::InvalidFormat {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
