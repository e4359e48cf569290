//! Fill progress tracking with FIX quantity semantics.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::shared::{DomainError, Price, Quantity, Timestamp};

/// Quantity bookkeeping for an order.
///
/// Maintains the FIX identity `OrderQty = CumQty + LeavesQty`:
/// - `OrderQty`: original requested quantity (tag 38)
/// - `CumQty`: cumulative quantity filled (tag 14)
/// - `LeavesQty`: remaining open quantity (tag 151)
/// - `AvgPx`: volume-weighted average fill price (tag 6)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FillProgress {
    order_qty: Quantity,
    cum_qty: Quantity,
    leaves_qty: Quantity,
    avg_px: Price,
    fill_count: u32,
    last_fill_at: Option<Timestamp>,
}

impl FillProgress {
    /// Create fill progress for a fresh order.
    #[must_use]
    pub fn new(order_qty: Quantity) -> Self {
        Self {
            order_qty,
            cum_qty: Quantity::ZERO,
            leaves_qty: order_qty,
            avg_px: Price::ZERO,
            fill_count: 0,
            last_fill_at: None,
        }
    }

    /// Get the original order quantity (tag 38).
    #[must_use]
    pub const fn order_qty(&self) -> Quantity {
        self.order_qty
    }

    /// Get the cumulative filled quantity (tag 14).
    #[must_use]
    pub const fn cum_qty(&self) -> Quantity {
        self.cum_qty
    }

    /// Get the remaining quantity (tag 151).
    #[must_use]
    pub const fn leaves_qty(&self) -> Quantity {
        self.leaves_qty
    }

    /// Get the volume-weighted average fill price (tag 6).
    #[must_use]
    pub const fn avg_px(&self) -> Price {
        self.avg_px
    }

    /// Get the number of fills applied.
    #[must_use]
    pub const fn fill_count(&self) -> u32 {
        self.fill_count
    }

    /// Get the timestamp of the last fill.
    #[must_use]
    pub const fn last_fill_at(&self) -> Option<Timestamp> {
        self.last_fill_at
    }

    /// Apply a fill, updating `CumQty`, `LeavesQty`, and `AvgPx`.
    ///
    /// # Errors
    ///
    /// Returns error if the fill would exceed the remaining quantity.
    pub fn apply_fill(&mut self, qty: Quantity, px: Price) -> Result<(), DomainError> {
        if qty > self.leaves_qty {
            return Err(DomainError::InvariantViolation {
                aggregate: "FillProgress".to_string(),
                invariant: "LastQty <= LeavesQty".to_string(),
                state: format!("last_qty={qty}, leaves_qty={}", self.leaves_qty),
            });
        }

        // VWAP: new_avg = (old_avg * old_cum + px * qty) / new_cum
        let new_cum = self.cum_qty + qty;
        if new_cum.amount() > Decimal::ZERO {
            let old_value = self.avg_px.amount() * self.cum_qty.amount();
            let fill_value = px.amount() * qty.amount();
            self.avg_px = Price::new((old_value + fill_value) / new_cum.amount());
        }

        self.cum_qty = new_cum;
        self.leaves_qty = self.order_qty - self.cum_qty;
        self.fill_count += 1;
        self.last_fill_at = Some(Timestamp::now());

        debug_assert!(self.holds_identity());

        Ok(())
    }

    /// Check if the order is completely filled.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.leaves_qty.is_zero()
    }

    /// Check if the order has fills but is not complete.
    #[must_use]
    pub fn is_partial(&self) -> bool {
        self.cum_qty.is_positive() && self.leaves_qty.is_positive()
    }

    /// Verify the FIX identity `OrderQty = CumQty + LeavesQty`.
    #[must_use]
    pub fn holds_identity(&self) -> bool {
        self.order_qty == self.cum_qty + self.leaves_qty
    }
}
