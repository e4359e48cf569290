//! Domain events for the order lifecycle.
//!
//! Every state change of an order produces an event; events are journaled
//! append-only and never deleted.

use serde::{Deserialize, Serialize};

use super::value_objects::OrderSide;
use crate::domain::shared::{ClOrdId, Price, Quantity, Symbol, Timestamp};

/// Everything that can happen to an order, as journal entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderEvent {
    /// Validated locally and put on the wire.
    Submitted(OrderSubmitted),
    /// Counterparty accepted the order.
    Acknowledged(OrderAcknowledged),
    /// A fill arrived with quantity still open.
    PartiallyFilled(OrderPartiallyFilled),
    /// The final fill arrived.
    Filled(OrderFilled),
    /// Canceled before completion.
    Canceled(OrderCanceled),
    /// Refused, locally or by the counterparty.
    Rejected(OrderRejected),
    /// A cancel request bounced; the order state is unchanged.
    CancelRejected(OrderCancelRejected),
}

impl OrderEvent {
    /// The order this event belongs to.
    #[must_use]
    pub const fn cl_ord_id(&self) -> &ClOrdId {
        match self {
            Self::Submitted(e) => &e.cl_ord_id,
            Self::Acknowledged(e) => &e.cl_ord_id,
            Self::PartiallyFilled(e) => &e.cl_ord_id,
            Self::Filled(e) => &e.cl_ord_id,
            Self::Canceled(e) => &e.cl_ord_id,
            Self::Rejected(e) => &e.cl_ord_id,
            Self::CancelRejected(e) => &e.cl_ord_id,
        }
    }

    /// Stable name for logging and journal inspection.
    #[must_use]
    pub const fn event_type(&self) -> &'static str {
        match self {
            Self::Submitted(_) => "ORDER_SUBMITTED",
            Self::Acknowledged(_) => "ORDER_ACKNOWLEDGED",
            Self::PartiallyFilled(_) => "ORDER_PARTIALLY_FILLED",
            Self::Filled(_) => "ORDER_FILLED",
            Self::Canceled(_) => "ORDER_CANCELED",
            Self::Rejected(_) => "ORDER_REJECTED",
            Self::CancelRejected(_) => "ORDER_CANCEL_REJECTED",
        }
    }
}

/// Payload for [`OrderEvent::Submitted`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderSubmitted {
    /// Order this event belongs to.
    pub cl_ord_id: ClOrdId,
    /// Instrument (tag 55).
    pub symbol: Symbol,
    /// Buy or sell (tag 54).
    pub side: OrderSide,
    /// Order quantity (tag 38).
    pub quantity: Quantity,
    /// Limit price (tag 44).
    pub price: Price,
    /// Event time.
    pub occurred_at: Timestamp,
}

/// Payload for [`OrderEvent::Acknowledged`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderAcknowledged {
    /// Order this event belongs to.
    pub cl_ord_id: ClOrdId,
    /// Event time.
    pub occurred_at: Timestamp,
}

/// Payload for [`OrderEvent::PartiallyFilled`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderPartiallyFilled {
    /// Order this event belongs to.
    pub cl_ord_id: ClOrdId,
    /// Fill quantity for this execution (tag 32).
    pub last_qty: Quantity,
    /// Fill price for this execution (tag 31).
    pub last_px: Price,
    /// Cumulative quantity filled (tag 14).
    pub cum_qty: Quantity,
    /// Remaining quantity (tag 151).
    pub leaves_qty: Quantity,
    /// Volume-weighted average price (tag 6).
    pub avg_px: Price,
    /// Event time.
    pub occurred_at: Timestamp,
}

/// Payload for [`OrderEvent::Filled`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderFilled {
    /// Order this event belongs to.
    pub cl_ord_id: ClOrdId,
    /// Total quantity filled, equals the order quantity.
    pub total_qty: Quantity,
    /// Volume-weighted average price across all fills.
    pub avg_px: Price,
    /// Event time.
    pub occurred_at: Timestamp,
}

/// Payload for [`OrderEvent::Canceled`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderCanceled {
    /// Order this event belongs to.
    pub cl_ord_id: ClOrdId,
    /// Quantity that had filled before the cancel landed.
    pub filled_qty: Quantity,
    /// Counterparty-supplied reason, when present.
    pub reason: Option<String>,
    /// Event time.
    pub occurred_at: Timestamp,
}

/// Payload for [`OrderEvent::Rejected`].
///
/// Carries the full order terms because a validation rejection is the
/// first and only event of its order; projections build the row from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRejected {
    /// Order this event belongs to.
    pub cl_ord_id: ClOrdId,
    /// Instrument (tag 55).
    pub symbol: Symbol,
    /// Buy or sell (tag 54).
    pub side: OrderSide,
    /// Order quantity (tag 38).
    pub quantity: Quantity,
    /// Limit price (tag 44).
    pub price: Price,
    /// Why the order was refused.
    pub reason: String,
    /// Event time.
    pub occurred_at: Timestamp,
}

/// Payload for [`OrderEvent::CancelRejected`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderCancelRejected {
    /// Order this event belongs to.
    pub cl_ord_id: ClOrdId,
    /// Why the cancel bounced.
    pub reason: String,
    /// Event time.
    pub occurred_at: Timestamp,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn submitted() -> OrderEvent {
        OrderEvent::Submitted(OrderSubmitted {
            cl_ord_id: ClOrdId::new("ORD001"),
            symbol: Symbol::new("AAPL"),
            side: OrderSide::Buy,
            quantity: Quantity::from_i64(10),
            price: Price::from_f64(202.0),
            occurred_at: Timestamp::now(),
        })
    }

    #[test]
    fn events_locate_their_order() {
        assert_eq!(submitted().cl_ord_id().as_str(), "ORD001");

        let cancel_reject = OrderEvent::CancelRejected(OrderCancelRejected {
            cl_ord_id: ClOrdId::new("ORD002"),
            reason: "order already filled".to_string(),
            occurred_at: Timestamp::now(),
        });
        assert_eq!(cancel_reject.cl_ord_id().as_str(), "ORD002");
    }

    #[test]
    fn type_names_carry_the_order_prefix() {
        assert_eq!(submitted().event_type(), "ORDER_SUBMITTED");

        let filled = OrderEvent::Filled(OrderFilled {
            cl_ord_id: ClOrdId::new("ORD001"),
            total_qty: Quantity::from_i64(10),
            avg_px: Price::from_f64(202.0),
            occurred_at: Timestamp::now(),
        });
        assert_eq!(filled.event_type(), "ORDER_FILLED");
    }

    #[test]
    fn journal_entries_roundtrip_through_serde() {
        let event = OrderEvent::Acknowledged(OrderAcknowledged {
            cl_ord_id: ClOrdId::new("ORD001"),
            occurred_at: Timestamp::now(),
        });

        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"ACKNOWLEDGED\""));

        let back: OrderEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
    }

    #[test]
    fn partial_fill_carries_the_execution_quantities() {
        let event = OrderPartiallyFilled {
            cl_ord_id: ClOrdId::new("ORD001"),
            last_qty: Quantity::from_i64(4),
            last_px: Price::from_f64(202.0),
            cum_qty: Quantity::from_i64(4),
            leaves_qty: Quantity::from_i64(6),
            avg_px: Price::from_f64(202.0),
            occurred_at: Timestamp::now(),
        };

        assert_eq!(event.cum_qty + event.leaves_qty, Quantity::from_i64(10));
        assert_eq!(event.last_qty, Quantity::from_i64(4));
    }
}
