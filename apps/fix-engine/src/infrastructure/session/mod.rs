//! FIX session runtime.
//!
//! - [`engine`]: per-connection session loop (logon, sequencing, gaps,
//!   admin replies, application events)
//! - [`heartbeat`]: idle monitoring and test-request escalation
//! - [`initiator`]: TCP dialer with reconnect backoff
//! - [`reconnect`]: full-jitter backoff policy

pub mod engine;
pub mod heartbeat;
pub mod initiator;
pub mod reconnect;

pub use engine::{SessionCommand, SessionEngine, SessionHandle, SessionUnavailable};
pub use heartbeat::{HeartbeatConfig, HeartbeatEvent, HeartbeatMonitor, HeartbeatState};
pub use initiator::{FixInitiator, InitiatorConfig, InitiatorError};
pub use reconnect::{ReconnectConfig, ReconnectPolicy};
