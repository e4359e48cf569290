//! Data Transfer Objects (DTOs)
//!
//! Plain request and receipt types passed across the use case boundary.

mod order_dto;

pub use order_dto::{NewOrderRequest, SubmitReceipt};
