//! Persistence adapters for the order event journal.

mod in_memory;

pub use in_memory::InMemoryPersistence;
