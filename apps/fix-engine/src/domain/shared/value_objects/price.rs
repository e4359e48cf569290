//! Price value object for limit and fill prices.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::shared::DomainError;

/// Highest per-share price the engine will submit.
const MAX_ORDER_PRICE: i64 = 1_000_000;

/// A price per share (FIX tags 44, 31, 6).
///
/// Decimal representation for financial precision. No floats in
/// price arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(Decimal);

impl Price {
    /// Zero price.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a new Price from a Decimal.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Create a Price from a float (for literals in tests and demos).
    ///
    /// # Panics
    ///
    /// Panics if the value cannot be represented as a Decimal
    /// (NaN or infinite).
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn from_f64(value: f64) -> Self {
        Self(Decimal::try_from(value).expect("price must be a finite number"))
    }

    /// Get the inner Decimal value.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// True for any price strictly above zero.
    #[must_use]
    pub fn is_positive(&self) -> bool {
        self.0.is_sign_positive() && !self.0.is_zero()
    }

    /// Round to cents (2 decimal places, banker's rounding).
    #[must_use]
    pub fn round(&self) -> Self {
        Self(self.0.round_dp(2))
    }

    /// Check the price is submittable on a new limit order.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidValue`] when the price is zero,
    /// negative, or above the per-share price cap.
    pub fn validate_for_order(&self) -> Result<(), DomainError> {
        if !self.is_positive() {
            return Err(invalid_price("limit price must be positive"));
        }
        if self.0 > Decimal::from(MAX_ORDER_PRICE) {
            return Err(invalid_price(&format!(
                "limit price exceeds the {MAX_ORDER_PRICE} per-share cap"
            )));
        }
        Ok(())
    }
}

fn invalid_price(message: &str) -> DomainError {
    DomainError::InvalidValue {
        field: "price".to_string(),
        message: message.to_string(),
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl FromStr for Price {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Decimal::from_str(s)
            .map(Self)
            .map_err(|e| invalid_price(&e.to_string()))
    }
}

impl From<Decimal> for Price {
    fn from(value: Decimal) -> Self {
        Self(value)
    }
}

impl From<Price> for Decimal {
    fn from(value: Price) -> Self {
        value.0
    }
}
