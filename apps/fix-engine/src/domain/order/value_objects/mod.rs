//! Value objects for the order lifecycle context.

mod execution;
mod fill_progress;
mod order_side;
mod order_status;

pub use execution::{CancelReject, Execution};
pub use fill_progress::FillProgress;
pub use order_side::OrderSide;
pub use order_status::OrderStatus;
