//! Persistence Port (Driven Port)
//!
//! Interface for journaling order events. Writes are append-only and
//! at-least-once: a failed persist is logged by the caller and the order
//! flow continues.

use async_trait::async_trait;

#[cfg(test)]
use mockall::automock;

use crate::domain::order::{OrderEvent, OrderSnapshot};

/// Persistence error.
#[derive(Debug, Clone, thiserror::Error)]
pub enum PersistenceError {
    /// Appending an event failed.
    #[error("Persistence write failed: {message}")]
    WriteFailed {
        /// Failure detail.
        message: String,
    },

    /// Reading the journal failed.
    #[error("Persistence query failed: {message}")]
    QueryFailed {
        /// Failure detail.
        message: String,
    },
}

/// Port for the order event journal.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait PersistencePort: Send + Sync {
    /// Append one order event to the journal.
    async fn persist(&self, event: &OrderEvent) -> Result<(), PersistenceError>;

    /// All known orders as blotter rows, newest first.
    async fn query_all(&self) -> Result<Vec<OrderSnapshot>, PersistenceError>;
}

/// No-op journal for tests and wiring without persistence.
#[derive(Debug, Clone, Default)]
pub struct NoOpPersistence;

#[async_trait]
impl PersistencePort for NoOpPersistence {
    async fn persist(&self, _event: &OrderEvent) -> Result<(), PersistenceError> {
        Ok(())
    }

    async fn query_all(&self) -> Result<Vec<OrderSnapshot>, PersistenceError> {
        Ok(Vec::new())
    }
}
