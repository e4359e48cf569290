//! Order DTOs for use case inputs and outputs.

use serde::{Deserialize, Serialize};

use crate::domain::order::{OrderSide, OrderStatus};
use crate::domain::shared::{ClOrdId, Price, Quantity, Symbol};

/// Request to submit a new limit order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewOrderRequest {
    /// Client order ID; generated when absent.
    pub cl_ord_id: Option<ClOrdId>,
    /// Symbol to trade.
    pub symbol: Symbol,
    /// Order side.
    pub side: OrderSide,
    /// Order quantity.
    pub quantity: Quantity,
    /// Limit price.
    pub price: Price,
}

/// Outcome of a submit request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitReceipt {
    /// The ID the order was registered under.
    pub cl_ord_id: ClOrdId,
    /// Registered status: `New` when sent, `Rejected` when validation failed.
    pub status: OrderStatus,
}
