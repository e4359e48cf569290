//! Order lifecycle errors.

use thiserror::Error;

use super::value_objects::OrderStatus;
use crate::domain::shared::{ClOrdId, Quantity};

/// Errors raised while driving an order through its lifecycle.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OrderError {
    /// The state machine forbids this transition.
    #[error("illegal order transition {from} -> {to}: {reason}")]
    IllegalTransition {
        /// Current order status.
        from: OrderStatus,
        /// Attempted status.
        to: OrderStatus,
        /// Why the transition is refused.
        reason: String,
    },

    /// A fill arrived for an order that cannot absorb one.
    #[error("order in status {status} cannot take fills")]
    CannotFill {
        /// Current status.
        status: OrderStatus,
    },

    /// A cancel was requested for an order that cannot be canceled.
    #[error("order in status {status} cannot be canceled")]
    CannotCancel {
        /// Current status.
        status: OrderStatus,
    },

    /// A fill would take the cumulative quantity past the order quantity.
    #[error("fill of {attempted} exceeds the {leaves} still open")]
    FillExceedsRemaining {
        /// Open quantity before the fill.
        leaves: Quantity,
        /// Fill quantity attempted.
        attempted: Quantity,
    },

    /// An order with this `ClOrdID` already exists.
    #[error("duplicate ClOrdID {cl_ord_id}")]
    DuplicateClOrdId {
        /// Order identifier.
        cl_ord_id: ClOrdId,
    },

    /// No order with this `ClOrdID` is known.
    #[error("no order with ClOrdID {cl_ord_id}")]
    UnknownOrder {
        /// Order identifier.
        cl_ord_id: ClOrdId,
    },

    /// A new-order command failed validation.
    #[error("invalid order parameter '{field}': {message}")]
    InvalidParameters {
        /// Field with the invalid value.
        field: String,
        /// Error details.
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_values() {
        let err = OrderError::IllegalTransition {
            from: OrderStatus::Filled,
            to: OrderStatus::Canceled,
            reason: "order already filled".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "illegal order transition FILLED -> CANCELED: order already filled"
        );

        let err = OrderError::FillExceedsRemaining {
            leaves: Quantity::from_i64(6),
            attempted: Quantity::from_i64(15),
        };
        assert_eq!(err.to_string(), "fill of 15 exceeds the 6 still open");

        let err = OrderError::UnknownOrder {
            cl_ord_id: ClOrdId::new("ORD999"),
        };
        assert_eq!(err.to_string(), "no order with ClOrdID ORD999");
    }

    #[test]
    fn status_errors_carry_the_status() {
        let fill = OrderError::CannotFill {
            status: OrderStatus::New,
        };
        assert!(fill.to_string().contains("NEW"));

        let cancel = OrderError::CannotCancel {
            status: OrderStatus::Rejected,
        };
        assert!(cancel.to_string().contains("REJECTED"));
    }

    #[test]
    fn error_is_std_error() {
        let err: Box<dyn std::error::Error> = Box::new(OrderError::DuplicateClOrdId {
            cl_ord_id: ClOrdId::new("ORD001"),
        });
        assert!(!err.to_string().is_empty());
    }
}
