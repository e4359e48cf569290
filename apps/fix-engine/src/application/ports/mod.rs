//! Application Ports (Driven)
//!
//! Traits the infrastructure implements on behalf of the use cases. The
//! journal behind [`PersistencePort`] is the only driven port here; the
//! FIX session is reached through its handle rather than a trait.

mod persistence_port;

pub use persistence_port::{NoOpPersistence, PersistenceError, PersistencePort};

#[cfg(test)]
pub use persistence_port::MockPersistencePort;
