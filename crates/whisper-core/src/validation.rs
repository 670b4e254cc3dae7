//! # Validation Module
//!
//! Field validators for the input boundary.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Deserialization (serde)                                      │
//! │  ├── Field presence and JSON types                                     │
//! │  └── Closed enums ("Activa" | "Pausada", ...)                          │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE (via wire.rs TryFrom impls)                      │
//! │  ├── Timestamps parse as RFC 3339                                      │
//! │  ├── Money is finite and non-negative                                  │
//! │  └── Quantities are whole and non-negative                             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Core (revenue, attribution, aggregation)                     │
//! │  └── Assumes typed, validated input. Never fails.                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Malformed-but-tolerated data passes through on purpose: a discount larger
//! than the price, a returned quantity larger than the sold quantity, and
//! any phone string.

use chrono::{DateTime, Utc};

use crate::error::ValidationError;
use crate::money::Money;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a required identifier or name and returns it trimmed.
///
/// ## Example
/// ```rust
/// use whisper_core::validation::validate_required;
///
/// assert_eq!(validate_required("id", "  c-1 ").unwrap(), "c-1");
/// assert!(validate_required("id", "   ").is_err());
/// ```
pub fn validate_required(field: &str, value: &str) -> ValidationResult<String> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::required(field));
    }

    Ok(value.to_string())
}

/// Normalizes an optional reference: blank strings count as absent.
///
/// Upstream systems send `""` for "no link"; treating it as a real id
/// would send an order down the direct-link path for nothing.
pub fn optional_reference(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Validates a currency code and returns it upper-cased.
pub fn validate_currency(code: &str) -> ValidationResult<String> {
    let code = validate_required("currency", code)?;

    if !code.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(ValidationError::invalid_format(
            "currency",
            "must contain only letters",
        ));
    }

    Ok(code.to_ascii_uppercase())
}

// =============================================================================
// Timestamp Validators
// =============================================================================

/// Parses an ISO-8601 / RFC 3339 timestamp into UTC.
///
/// ## Example
/// ```rust
/// use whisper_core::validation::parse_timestamp;
///
/// let ts = parse_timestamp("createdAt", "2025-10-06T15:00:00-05:00").unwrap();
/// assert_eq!(ts.to_rfc3339(), "2025-10-06T20:00:00+00:00");
/// assert!(parse_timestamp("createdAt", "yesterday").is_err());
/// ```
pub fn parse_timestamp(field: &str, value: &str) -> ValidationResult<DateTime<Utc>> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::required(field));
    }

    DateTime::parse_from_rfc3339(value)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| ValidationError::invalid_format(field, e.to_string()))
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a money amount in major units and converts it to [`Money`].
///
/// ## Rules
/// - Must be finite
/// - Must be non-negative (zero is allowed: free items, no spend yet)
pub fn validate_amount(field: &str, amount: f64) -> ValidationResult<Money> {
    if !amount.is_finite() {
        return Err(ValidationError::NotFinite {
            field: field.to_string(),
        });
    }

    if amount < 0.0 {
        return Err(ValidationError::MustBeNonNegative {
            field: field.to_string(),
        });
    }

    Money::try_from_amount(amount).ok_or_else(|| ValidationError::OutOfRange {
        field: field.to_string(),
        min: 0.0,
        max: i64::MAX as f64 / 100.0,
    })
}

/// Validates an optional money amount.
pub fn validate_optional_amount(field: &str, amount: Option<f64>) -> ValidationResult<Option<Money>> {
    amount.map(|a| validate_amount(field, a)).transpose()
}

/// Validates a quantity.
///
/// ## Rules
/// - Must be finite and a whole number
/// - Must be non-negative (zero-quantity lines are allowed)
///
/// ## Example
/// ```rust
/// use whisper_core::validation::validate_quantity;
///
/// assert_eq!(validate_quantity("qty", 2.0).unwrap(), 2);
/// assert!(validate_quantity("qty", 1.5).is_err());
/// assert!(validate_quantity("qty", -1.0).is_err());
/// ```
pub fn validate_quantity(field: &str, qty: f64) -> ValidationResult<i64> {
    if !qty.is_finite() {
        return Err(ValidationError::NotFinite {
            field: field.to_string(),
        });
    }

    if qty.fract() != 0.0 {
        return Err(ValidationError::NotIntegral {
            field: field.to_string(),
        });
    }

    if qty < 0.0 {
        return Err(ValidationError::MustBeNonNegative {
            field: field.to_string(),
        });
    }

    if qty > i64::MAX as f64 {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0.0,
            max: i64::MAX as f64,
        });
    }

    Ok(qty as i64)
}

/// Validates a percentage in the 0-100 range.
pub fn validate_percentage(field: &str, pct: f64) -> ValidationResult<f64> {
    if !pct.is_finite() {
        return Err(ValidationError::NotFinite {
            field: field.to_string(),
        });
    }

    if !(0.0..=100.0).contains(&pct) {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0.0,
            max: 100.0,
        });
    }

    Ok(pct)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_required() {
        assert_eq!(validate_required("id", "o-1").unwrap(), "o-1");
        assert!(matches!(
            validate_required("id", ""),
            Err(ValidationError::Required { .. })
        ));
    }

    #[test]
    fn test_optional_reference() {
        assert_eq!(optional_reference(None), None);
        assert_eq!(optional_reference(Some("".to_string())), None);
        assert_eq!(optional_reference(Some("  ".to_string())), None);
        assert_eq!(optional_reference(Some(" c-1 ".to_string())), Some("c-1".to_string()));
    }

    #[test]
    fn test_validate_currency() {
        assert_eq!(validate_currency("cop").unwrap(), "COP");
        assert!(validate_currency("").is_err());
        assert!(validate_currency("C0P").is_err());
    }

    #[test]
    fn test_parse_timestamp() {
        assert!(parse_timestamp("startedAt", "2025-10-06T15:00:00.000Z").is_ok());
        assert!(parse_timestamp("startedAt", "").is_err());
        assert!(matches!(
            parse_timestamp("startedAt", "06/10/2025"),
            Err(ValidationError::InvalidFormat { .. })
        ));
    }

    #[test]
    fn test_validate_amount() {
        assert_eq!(validate_amount("unitPrice", 0.0).unwrap(), Money::zero());
        assert_eq!(validate_amount("unitPrice", 180000.0).unwrap(), Money::from_major(180_000));
        assert!(matches!(
            validate_amount("unitPrice", -1.0),
            Err(ValidationError::MustBeNonNegative { .. })
        ));
        assert!(matches!(
            validate_amount("unitPrice", f64::NAN),
            Err(ValidationError::NotFinite { .. })
        ));
        assert_eq!(validate_optional_amount("otherFees", None).unwrap(), None);
    }

    #[test]
    fn test_validate_quantity() {
        assert_eq!(validate_quantity("qty", 0.0).unwrap(), 0);
        assert_eq!(validate_quantity("qty", 999.0).unwrap(), 999);
        assert!(validate_quantity("qty", 0.5).is_err());
        assert!(validate_quantity("qty", -2.0).is_err());
        assert!(validate_quantity("qty", f64::INFINITY).is_err());
    }

    #[test]
    fn test_validate_percentage() {
        assert_eq!(validate_percentage("negativesPct", 22.5).unwrap(), 22.5);
        assert!(validate_percentage("negativesPct", 100.1).is_err());
        assert!(validate_percentage("negativesPct", -0.1).is_err());
    }
}
