//! # Money
//!
//! Prices, budgets, spend and revenue as whole cents.
//!
//! ## Floats Stop Here
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  Summing thousands of order lines as floats drifts:                     │
//! │    0.1 + 0.2 = 0.30000000000000004                                      │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    Every price, discount, budget and revenue total is an i64 count     │
//! │    of cents. Floats appear only in derived ratios (ROAS, CVR).         │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use whisper_core::money::Money;
//!
//! let price = Money::from_major(100_000); // $100000.00
//! let line = price.multiply_quantity(2);
//! assert_eq!(line, Money::from_major(200_000));
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub};
use ts_rs::TS;

/// Cents per major currency unit.
const CENTS_PER_UNIT: i64 = 100;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in cents.
///
/// ## Design Decisions
/// - **i64 (signed)**: intermediate revenue sums may go negative when a
///   malformed discount exceeds the unit price; final results are clamped
/// - **Single field tuple struct**: zero-cost abstraction over i64
///
/// ## Where Money is Used
/// ```text
/// OrderItem.unit_price ──► line net revenue ──► order net revenue
///                                                     │
///                                                     ▼
///                          CampaignRow.sales.revenue (sum per campaign)
///
/// Campaign.spend_total ──► cost per conversation, ROAS
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents.
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from whole major units (pesos, dollars).
    ///
    /// ## Example
    /// ```rust
    /// use whisper_core::money::Money;
    ///
    /// assert_eq!(Money::from_major(15_000).cents(), 1_500_000);
    /// ```
    #[inline]
    pub const fn from_major(units: i64) -> Self {
        Money(units * CENTS_PER_UNIT)
    }

    /// Converts a wire amount (a JSON number in major units) into Money.
    ///
    /// This is the only float-to-money conversion in the crate and is
    /// reserved for the validation boundary. Returns `None` for NaN and
    /// infinities, or when the value does not fit in i64 cents.
    /// Fractional cents round half away from zero.
    ///
    /// ## Example
    /// ```rust
    /// use whisper_core::money::Money;
    ///
    /// assert_eq!(Money::try_from_amount(10.99), Some(Money::from_cents(1099)));
    /// assert_eq!(Money::try_from_amount(f64::NAN), None);
    /// ```
    pub fn try_from_amount(amount: f64) -> Option<Self> {
        if !amount.is_finite() {
            return None;
        }

        let cents = (amount * CENTS_PER_UNIT as f64).round();
        if cents < i64::MIN as f64 || cents > i64::MAX as f64 {
            return None;
        }

        Some(Money(cents as i64))
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the whole major-unit portion.
    #[inline]
    pub const fn major(&self) -> i64 {
        self.0 / CENTS_PER_UNIT
    }

    /// Returns the cents portion (always 0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % CENTS_PER_UNIT).abs()
    }

    /// Value in major units as a float. For ratios and display only.
    #[inline]
    pub fn to_major_f64(&self) -> f64 {
        self.0 as f64 / CENTS_PER_UNIT as f64
    }

    /// No money; the starting point of every sum.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Exactly zero cents.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Below zero; only possible before clamping.
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Clamps negative values to zero.
    ///
    /// ## Example
    /// ```rust
    /// use whisper_core::money::Money;
    ///
    /// assert_eq!(Money::from_cents(-500).clamp_non_negative(), Money::zero());
    /// assert_eq!(Money::from_cents(500).clamp_non_negative().cents(), 500);
    /// ```
    #[inline]
    pub const fn clamp_non_negative(self) -> Self {
        if self.0 < 0 {
            Money(0)
        } else {
            self
        }
    }

    /// Line amount for `qty` units.
    ///
    /// Saturates instead of overflowing on absurd quantities.
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0.saturating_mul(qty))
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display shows money with two decimals, e.g. `$200000.00`.
///
/// ## Note
/// This is for logs and the text report. The dashboard formats COP itself.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}${}.{:02}", sign, self.major().abs(), self.cents_part())
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0.saturating_add(other.0))
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_add(other.0);
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0.saturating_sub(other.0))
    }
}

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        self.multiply_quantity(qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

// =============================================================================
// Serde Helper
// =============================================================================

/// Serializes Money as a JSON number in major units, the shape the
/// dashboard and the upstream platforms use.
///
/// ## Usage
/// ```rust,ignore
/// #[serde(with = "crate::money::major_units")]
/// pub revenue: Money,
/// ```
pub mod major_units {
    use super::Money;
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Money, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(value.to_major_f64())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Money, D::Error> {
        let amount = f64::deserialize(deserializer)?;
        Money::try_from_amount(amount)
            .ok_or_else(|| D::Error::custom(format!("amount out of range: {amount}")))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
