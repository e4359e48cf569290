//! Order Bounded Context
//!
//! Everything an order goes through between local validation and a
//! terminal execution state, expressed in FIX tag 39 terms.
//!
//! # Key Concepts
//!
//! - **Order Aggregate**: One working order and its legal transitions
//! - **Fill Progress**: Quantity bookkeeping holding `OrderQty = CumQty + LeavesQty`
//! - **Order Registry**: Concurrent store keyed by `ClOrdID`
//! - **Domain Events**: Journal entries for every transition

pub mod aggregate;
pub mod errors;
pub mod events;
pub mod registry;
pub mod services;
pub mod value_objects;

pub use aggregate::{NewOrderCommand, Order};
pub use errors::OrderError;
pub use events::{
    OrderAcknowledged, OrderCancelRejected, OrderCanceled, OrderEvent, OrderFilled,
    OrderPartiallyFilled, OrderRejected, OrderSubmitted,
};
pub use registry::{OrderRegistry, OrderSnapshot};
pub use services::OrderStateMachine;
pub use value_objects::{CancelReject, Execution, FillProgress, OrderSide, OrderStatus};
