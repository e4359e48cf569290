//! Order state machine enforcing lifecycle transitions.

use crate::domain::order::errors::OrderError;
use crate::domain::order::value_objects::OrderStatus;

/// Stateless service validating order state transitions.
///
/// The lifecycle:
///
/// ```text
/// New ──► Acknowledged ──► PartiallyFilled ──► Filled
///  │            │    │        │     │
///  │            │    └────────┼──► Filled
///  │            └──► Canceled ◄─────┘
///  └──► Rejected
/// ```
///
/// Terminal states (Filled, Canceled, Rejected) have no exits.
pub struct OrderStateMachine;

impl OrderStateMachine {
    /// Check whether a transition between two statuses is valid.
    #[must_use]
    pub const fn is_valid_transition(from: OrderStatus, to: OrderStatus) -> bool {
        matches!(
            (from, to),
            // From New
            (OrderStatus::New, OrderStatus::Acknowledged | OrderStatus::Rejected)
            // From Acknowledged
            | (
                OrderStatus::Acknowledged,
                OrderStatus::PartiallyFilled | OrderStatus::Filled | OrderStatus::Canceled
            )
            // From PartiallyFilled (further partials allowed)
            | (
                OrderStatus::PartiallyFilled,
                OrderStatus::PartiallyFilled | OrderStatus::Filled | OrderStatus::Canceled
            )
        )
    }

    /// Validate a transition, returning a descriptive error when invalid.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::IllegalTransition` if the transition is not allowed.
    pub fn validate_transition(from: OrderStatus, to: OrderStatus) -> Result<(), OrderError> {
        if Self::is_valid_transition(from, to) {
            Ok(())
        } else {
            Err(OrderError::IllegalTransition {
                from,
                to,
                reason: Self::transition_error_reason(from, to),
            })
        }
    }

    /// Human-readable reason why a transition is invalid.
    #[must_use]
    pub fn transition_error_reason(from: OrderStatus, to: OrderStatus) -> String {
        match from {
            OrderStatus::Filled => {
                format!("order is already filled, cannot move to {to}")
            }
            OrderStatus::Canceled => {
                format!("order is canceled, cannot move to {to}")
            }
            OrderStatus::Rejected => {
                format!("order is rejected, cannot move to {to}")
            }
            _ => format!("no edge from {from} to {to} in the lifecycle"),
        }
    }

    /// Get all valid next states from a given status.
    #[must_use]
    pub fn valid_next_states(from: OrderStatus) -> Vec<OrderStatus> {
        let all = [
            OrderStatus::New,
            OrderStatus::Acknowledged,
            OrderStatus::PartiallyFilled,
            OrderStatus::Filled,
            OrderStatus::Canceled,
            OrderStatus::Rejected,
        ];
        all.into_iter()
            .filter(|to| Self::is_valid_transition(from, *to))
            .collect()
    }
}
