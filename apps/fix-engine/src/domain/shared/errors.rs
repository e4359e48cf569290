//! Shared domain errors.

use thiserror::Error;

/// Errors raised by value-object validation and aggregate invariant checks.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A field value failed validation.
    #[error("invalid {field}: {message}")]
    InvalidValue {
        /// Field with the invalid value.
        field: String,
        /// Error details.
        message: String,
    },

    /// An aggregate invariant no longer holds.
    #[error("{aggregate} invariant broken: {invariant} (state {state})")]
    InvariantViolation {
        /// Aggregate name.
        aggregate: String,
        /// The invariant that broke.
        invariant: String,
        /// Current state values.
        state: String,
    },
}
