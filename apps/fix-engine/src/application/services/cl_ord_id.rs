//! ClOrdID generation.
//!
//! Client order IDs follow the house scheme: a short alpha prefix plus a
//! zero-padded counter (`ORD001`, `ORD002`, …). Past 999 the number simply
//! widens (`ORD1000`).

use std::sync::atomic::{AtomicU64, Ordering};

use crate::domain::shared::ClOrdId;

/// Default ClOrdID prefix.
pub const DEFAULT_CL_ORD_ID_PREFIX: &str = "ORD";

/// Thread-safe generator for sequential client order IDs.
#[derive(Debug)]
pub struct ClOrdIdGenerator {
    prefix: String,
    counter: AtomicU64,
}

impl ClOrdIdGenerator {
    /// Create a generator with the given prefix, starting at 1.
    #[must_use]
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            counter: AtomicU64::new(0),
        }
    }

    /// Next ID, e.g. `ORD001`.
    #[must_use]
    pub fn next_id(&self) -> ClOrdId {
        let n = self.counter.fetch_add(1, Ordering::Relaxed) + 1;
        ClOrdId::new(format!("{}{:03}", self.prefix, n))
    }

    /// The configured prefix.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }
}

impl Default for ClOrdIdGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_CL_ORD_ID_PREFIX)
    }
}
