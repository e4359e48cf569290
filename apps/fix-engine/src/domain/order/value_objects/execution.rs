//! Execution report content handed from the session to the order layer.

use serde::{Deserialize, Serialize};

use super::OrderStatus;
use crate::domain::shared::{ClOrdId, ExecId, Price, Quantity, Timestamp};

/// A decoded ExecutionReport (35=8) as seen by the order layer.
///
/// Fill fields are optional: acknowledgments, cancels, and rejects carry
/// no `LastQty`/`LastPx`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Execution {
    /// Counterparty execution identifier (tag 17).
    pub exec_id: ExecId,
    /// Order this execution applies to (tag 11).
    pub cl_ord_id: ClOrdId,
    /// Reported order status (tag 39).
    pub ord_status: OrderStatus,
    /// Quantity of this fill (tag 32), for fill reports.
    pub last_qty: Option<Quantity>,
    /// Price of this fill (tag 31), for fill reports.
    pub last_px: Option<Price>,
    /// Cumulative quantity reported by the counterparty (tag 14).
    pub cum_qty: Quantity,
    /// Remaining quantity reported by the counterparty (tag 151).
    pub leaves_qty: Option<Quantity>,
    /// Average price reported by the counterparty (tag 6).
    pub avg_px: Option<Price>,
    /// Free-form text, typically a reject reason (tag 58).
    pub text: Option<String>,
    /// When the execution occurred.
    pub transact_time: Timestamp,
}

impl Execution {
    /// Create an execution report with the required fields.
    #[must_use]
    pub const fn new(
        exec_id: ExecId,
        cl_ord_id: ClOrdId,
        ord_status: OrderStatus,
        cum_qty: Quantity,
        transact_time: Timestamp,
    ) -> Self {
        Self {
            exec_id,
            cl_ord_id,
            ord_status,
            last_qty: None,
            last_px: None,
            cum_qty,
            leaves_qty: None,
            avg_px: None,
            text: None,
            transact_time,
        }
    }

    /// Attach fill quantity and price.
    #[must_use]
    pub const fn with_fill(mut self, last_qty: Quantity, last_px: Price) -> Self {
        self.last_qty = Some(last_qty);
        self.last_px = Some(last_px);
        self
    }

    /// Attach the reported remaining quantity.
    #[must_use]
    pub const fn with_leaves_qty(mut self, leaves_qty: Quantity) -> Self {
        self.leaves_qty = Some(leaves_qty);
        self
    }

    /// Attach the reported average price.
    #[must_use]
    pub const fn with_avg_px(mut self, avg_px: Price) -> Self {
        self.avg_px = Some(avg_px);
        self
    }

    /// Attach free-form text.
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Returns true if this report carries a fill.
    #[must_use]
    pub const fn is_fill(&self) -> bool {
        matches!(
            self.ord_status,
            OrderStatus::PartiallyFilled | OrderStatus::Filled
        )
    }
}

/// A decoded OrderCancelReject (35=9).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancelReject {
    /// Order the rejected cancel referenced (tag 41).
    pub cl_ord_id: ClOrdId,
    /// Reject reason text (tag 58).
    pub reason: String,
}

impl CancelReject {
    /// Create a cancel reject.
    #[must_use]
    pub fn new(cl_ord_id: ClOrdId, reason: impl Into<String>) -> Self {
        Self {
            cl_ord_id,
            reason: reason.into(),
        }
    }
}
