//! Shared value objects used across bounded contexts.

mod identifiers;
mod price;
mod quantity;
mod symbol;
mod timestamp;

pub use identifiers::{ClOrdId, ExecId};
pub use price::Price;
pub use quantity::Quantity;
pub use symbol::Symbol;
pub use timestamp::Timestamp;
