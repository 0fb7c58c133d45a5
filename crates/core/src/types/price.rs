//! Type-safe price representation using decimal arithmetic.

use core::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Errors that can occur when constructing a [`Price`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// Negative prices are not allowed.
    #[error("price cannot be negative")]
    Negative,
    /// The stored floating point value is NaN or infinite.
    #[error("price is not a finite number")]
    NotFinite,
}

/// A catalog price in US dollars, rounded to cents.
///
/// Prices live in the database as `REAL` (the catalog is seeded with whole
/// dollar amounts) and are carried as [`Decimal`] in memory so display and
/// totals never accumulate float error. On the wire a price is a JSON number.
///
/// ```
/// use kicks_core::Price;
///
/// let price = Price::from_f64(129.999).unwrap();
/// assert_eq!(price.to_string(), "$130.00");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(#[serde(with = "rust_decimal::serde::float")] Decimal);

impl Price {
    /// Create a price from a decimal amount, rounding to cents.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::Negative`] if the amount is below zero.
    pub fn new(amount: Decimal) -> Result<Self, PriceError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PriceError::Negative);
        }
        Ok(Self(amount.round_dp(2)))
    }

    /// Create a price from a floating point amount (as stored in SQLite).
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::NotFinite`] for NaN/infinite input and
    /// [`PriceError::Negative`] for amounts below zero.
    pub fn from_f64(amount: f64) -> Result<Self, PriceError> {
        let decimal = Decimal::from_f64_retain(amount).ok_or(PriceError::NotFinite)?;
        Self::new(decimal)
    }

    /// Create a price from a whole number of dollars.
    #[must_use]
    pub fn from_dollars(dollars: u32) -> Self {
        Self(Decimal::from(dollars))
    }

    /// The decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// The amount as `f64` for binding into a `REAL` column.
    #[must_use]
    pub fn to_f64(&self) -> f64 {
        use rust_decimal::prelude::ToPrimitive;

        self.0.to_f64().unwrap_or_default()
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${:.2}", self.0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_from_f64_rounds_to_cents() {
        let price = Price::from_f64(59.996).unwrap();
        assert_eq!(price.amount(), Decimal::new(6000, 2));
    }

    #[test]
    fn test_rejects_negative_and_nan() {
        assert_eq!(Price::from_f64(-1.0), Err(PriceError::Negative));
        assert_eq!(Price::from_f64(f64::NAN), Err(PriceError::NotFinite));
    }

    #[test]
    fn test_zero_is_allowed() {
        assert!(Price::from_f64(0.0).is_ok());
    }

    #[test]
    fn test_serializes_as_number() {
        let json = serde_json::to_value(Price::from_dollars(120)).unwrap();
        assert_eq!(json, serde_json::json!(120.0));
    }

    #[test]
    fn test_display() {
        assert_eq!(Price::from_dollars(85).to_string(), "$85.00");
    }
}
