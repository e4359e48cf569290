//! Shared Kernel
//!
//! Value objects and errors both bounded contexts lean on. Nothing in
//! here depends on any other domain module.

pub mod errors;
pub mod value_objects;

pub use errors::DomainError;
pub use value_objects::{ClOrdId, ExecId, Price, Quantity, Symbol, Timestamp};
