//! Order aggregate

mod order;

pub use order::{NewOrderCommand, Order};
