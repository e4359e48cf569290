//! Application Use Cases
//!
//! Each use case wires the order registry, the journal, and the FIX
//! session together for one engine operation.

mod cancel_order;
mod process_execution;
mod submit_order;

pub use cancel_order::{CancelError, CancelOrderUseCase};
pub use process_execution::ProcessExecutionUseCase;
pub use submit_order::{SubmitError, SubmitOrderUseCase};
