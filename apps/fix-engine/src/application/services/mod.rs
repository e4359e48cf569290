//! Application Services
//!
//! Services hold cross-cutting application policy that is not a use case
//! by itself, such as the house ClOrdID scheme.

mod cl_ord_id;

pub use cl_ord_id::{ClOrdIdGenerator, DEFAULT_CL_ORD_ID_PREFIX};
