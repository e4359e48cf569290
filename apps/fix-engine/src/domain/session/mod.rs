//! Session Bounded Context
//!
//! FIX session-layer state: lifecycle, sequence number bookkeeping, and gap
//! recovery. The transport-facing runtime that drives these types lives in
//! the infrastructure layer.
//!
//! # Key Concepts
//!
//! - **Session State**: Disconnected, LogonSent, Active, PendingLogout
//! - **Sequence Tracking**: Both directions start at 1; duplicates drop,
//!   gaps trigger resend requests
//! - **Gap Buffer**: Messages ahead of a gap are parked and replayed in
//!   order once the gap fills

pub mod config;
pub mod errors;
pub mod events;
pub mod sequence;
pub mod state;

pub use config::SessionConfig;
pub use errors::SessionError;
pub use events::SessionEvent;
pub use sequence::{DEFAULT_GAP_BUFFER_CAPACITY, GapBuffer, SequenceCheck, SequenceTracker};
pub use state::SessionState;
