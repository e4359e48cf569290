//! Quantity value object for share amounts.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};
use std::str::FromStr;

use crate::domain::shared::DomainError;

/// Largest order quantity the engine will submit, in shares.
const MAX_ORDER_SHARES: i64 = 1_000_000;

/// A share quantity (FIX tags 38, 14, 32, 151).
///
/// Backed by `Decimal` so fill bookkeeping stays exact across partial
/// executions; binary floats would drift under repeated addition.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Quantity(Decimal);

impl Quantity {
    /// Zero shares.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Wrap a `Decimal` as a quantity.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Quantity from a whole number of shares.
    #[must_use]
    pub fn from_i64(shares: i64) -> Self {
        Self(Decimal::from(shares))
    }

    /// The underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// True for any quantity strictly above zero.
    #[must_use]
    pub fn is_positive(&self) -> bool {
        self.0.is_sign_positive() && !self.0.is_zero()
    }

    /// True when the quantity is exactly zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Check the quantity is submittable on a new order.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidValue`] when the quantity is zero,
    /// negative, or above the per-order share cap.
    pub fn validate_for_order(&self) -> Result<(), DomainError> {
        if !self.is_positive() {
            return Err(invalid_qty("order quantity must be a positive share count"));
        }
        if self.0 > Decimal::from(MAX_ORDER_SHARES) {
            return Err(invalid_qty(&format!(
                "order quantity exceeds the {MAX_ORDER_SHARES}-share cap"
            )));
        }
        Ok(())
    }
}

fn invalid_qty(message: &str) -> DomainError {
    DomainError::InvalidValue {
        field: "quantity".to_string(),
        message: message.to_string(),
    }
}

impl fmt::Display for Quantity {
    /// Canonical wire form: trailing zeros stripped, whole numbers bare.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.normalize())
    }
}

impl FromStr for Quantity {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Decimal::from_str(s)
            .map(Self)
            .map_err(|e| invalid_qty(&e.to_string()))
    }
}

impl Add for Quantity {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Quantity {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl From<Decimal> for Quantity {
    fn from(value: Decimal) -> Self {
        Self(value)
    }
}

impl From<i64> for Quantity {
    fn from(value: i64) -> Self {
        Self::from_i64(value)
    }
}

impl From<Quantity> for Decimal {
    fn from(value: Quantity) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whole_numbers_display_bare() {
        assert_eq!(Quantity::from_i64(100).to_string(), "100");
        // 100.0 carries a scale of 1 but must still encode as "100"
        assert_eq!(Quantity::new(Decimal::new(1000, 1)).to_string(), "100");
    }

    #[test]
    fn fractional_display_strips_trailing_zeros() {
        let q = Quantity::new(Decimal::new(10550, 2)); // 105.50
        assert_eq!(q.to_string(), "105.5");
    }

    #[test]
    fn parse_accepts_wire_values() {
        assert_eq!("10".parse::<Quantity>().unwrap(), Quantity::from_i64(10));
        assert_eq!(
            "0.5".parse::<Quantity>().unwrap(),
            Quantity::new(Decimal::new(5, 1))
        );
        assert!("ten".parse::<Quantity>().is_err());
    }

    #[test]
    fn arithmetic_tracks_fill_bookkeeping() {
        let order_qty = Quantity::from_i64(10);
        let cum = Quantity::from_i64(4);
        let leaves = order_qty - cum;
        assert_eq!(leaves, Quantity::from_i64(6));
        assert_eq!(cum + leaves, order_qty);
    }

    #[test]
    fn ordering_supports_overfill_checks() {
        let leaves = Quantity::from_i64(6);
        assert!(Quantity::from_i64(8) > leaves);
        assert!(Quantity::from_i64(6) <= leaves);
    }

    #[test]
    fn zero_and_negative_are_not_positive() {
        assert!(Quantity::ZERO.is_zero());
        assert!(!Quantity::ZERO.is_positive());
        assert!(!Quantity::from_i64(-5).is_positive());
        assert!(Quantity::from_i64(1).is_positive());
    }

    #[test]
    fn order_validation_enforces_bounds() {
        assert!(Quantity::ZERO.validate_for_order().is_err());
        assert!(Quantity::from_i64(-10).validate_for_order().is_err());
        assert!(Quantity::from_i64(1_000_001).validate_for_order().is_err());
        assert!(Quantity::from_i64(1_000_000).validate_for_order().is_ok());
        assert!(Quantity::from_i64(100).validate_for_order().is_ok());
    }

    #[test]
    fn serde_is_transparent() {
        let q = Quantity::from_i64(100);
        let json = serde_json::to_string(&q).unwrap();
        let back: Quantity = serde_json::from_str(&json).unwrap();
        assert_eq!(back, q);
    }

    #[test]
    fn decimal_conversions() {
        let q: Quantity = Decimal::new(200, 0).into();
        assert_eq!(q, Quantity::from_i64(200));

        let d: Decimal = Quantity::from_i64(100).into();
        assert_eq!(d, Decimal::from(100));

        let from_int: Quantity = 42i64.into();
        assert_eq!(from_int, Quantity::from_i64(42));
    }

    #[test]
    fn default_is_zero() {
        assert_eq!(Quantity::default(), Quantity::ZERO);
    }
}
