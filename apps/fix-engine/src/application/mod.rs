//! Application Layer
//!
//! Use cases sit between the domain model and the adapters: they pull
//! orders from the registry, run domain transitions, journal the
//! resulting events through ports, and hand DTOs back to callers.
//!
//! - **Ports**: Traits the infrastructure implements (journaling)
//! - **Services**: Cross-cutting policy (ClOrdID generation)
//! - **Use Cases**: One struct per engine operation
//! - **DTOs**: Plain request/receipt types at the boundary

pub mod dto;
pub mod ports;
pub mod services;
pub mod use_cases;

pub use dto::*;
pub use ports::*;
pub use services::*;
pub use use_cases::*;
