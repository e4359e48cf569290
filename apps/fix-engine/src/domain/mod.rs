//! Domain Layer
//!
//! Pure order and session logic. Nothing in here performs I/O or knows
//! about the wire beyond FIX field semantics; the aggregates, value
//! objects, events, and state machines are all testable in isolation.
//!
//! # Bounded Contexts
//!
//! - [`order`]: Order lifecycle management (FIX execution semantics)
//! - [`session`]: FIX session state, sequence numbers, and gap recovery
//! - [`shared`]: Value objects used by both contexts

pub mod order;
pub mod session;
pub mod shared;
