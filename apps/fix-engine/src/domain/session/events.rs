//! Session domain events.
//!
//! Emitted by the session engine as the protocol state evolves. Application
//! code consumes these through the session handle's event channel.

use serde::{Deserialize, Serialize};

use crate::domain::order::value_objects::{CancelReject, Execution};
use crate::domain::session::errors::SessionError;
use crate::domain::session::state::SessionState;

/// Events emitted by a running FIX session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionEvent {
    /// The session moved between lifecycle states.
    StateChanged {
        /// State before the transition.
        from: SessionState,
        /// State after the transition.
        to: SessionState,
    },
    /// The counterparty acknowledged our Logon.
    LogonAccepted,
    /// An inbound message arrived ahead of the expected sequence number.
    SequenceGapDetected {
        /// The sequence number that was expected.
        expected: u64,
        /// The sequence number that arrived.
        received: u64,
    },
    /// A ResendRequest was sent to recover a sequence gap.
    ResendRequested {
        /// First missing sequence number.
        begin: u64,
        /// Last missing sequence number.
        end: u64,
    },
    /// A TestRequest was sent after heartbeat silence.
    TestRequestSent {
        /// Identifier the counterparty must echo back.
        test_req_id: String,
    },
    /// A Heartbeat was sent.
    HeartbeatSent,
    /// A Heartbeat was received.
    HeartbeatReceived,
    /// An ExecutionReport was received and decoded.
    ExecutionReport(Execution),
    /// An OrderCancelReject was received and decoded.
    CancelReject(CancelReject),
    /// The counterparty initiated a Logout.
    LogoutReceived,
    /// The session ended.
    Terminated {
        /// Why the session ended.
        reason: SessionError,
    },
}

impl SessionEvent {
    /// Get the event type name for logging and journaling.
    #[must_use]
    pub const fn event_type(&self) -> &'static str {
        match self {
            Self::StateChanged { .. } => "SESSION_STATE_CHANGED",
            Self::LogonAccepted => "SESSION_LOGON_ACCEPTED",
            Self::SequenceGapDetected { .. } => "SEQUENCE_GAP_DETECTED",
            Self::ResendRequested { .. } => "RESEND_REQUESTED",
            Self::TestRequestSent { .. } => "TEST_REQUEST_SENT",
            Self::HeartbeatSent => "HEARTBEAT_SENT",
            Self::HeartbeatReceived => "HEARTBEAT_RECEIVED",
            Self::ExecutionReport(_) => "EXECUTION_REPORT",
            Self::CancelReject(_) => "CANCEL_REJECT",
            Self::LogoutReceived => "LOGOUT_RECEIVED",
            Self::Terminated { .. } => "SESSION_TERMINATED",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_type_names() {
        let event = SessionEvent::StateChanged {
            from: SessionState::Disconnected,
            to: SessionState::LogonSent,
        };
        assert_eq!(event.event_type(), "SESSION_STATE_CHANGED");

        let event = SessionEvent::ResendRequested { begin: 3, end: 4 };
        assert_eq!(event.event_type(), "RESEND_REQUESTED");
    }

    #[test]
    fn serde_tagged_representation() {
        let event = SessionEvent::SequenceGapDetected {
            expected: 3,
            received: 5,
        };
        let json = serde_json::to_string(&event).unwrap();

        assert!(json.contains("\"type\":\"SEQUENCE_GAP_DETECTED\""));
        assert!(json.contains("\"expected\":3"));
        assert!(json.contains("\"received\":5"));
    }

    #[test]
    fn terminated_carries_reason() {
        let event = SessionEvent::Terminated {
            reason: SessionError::HeartbeatTimeout,
        };
        let json = serde_json::to_string(&event).unwrap();
        let parsed: SessionEvent = serde_json::from_str(&json).unwrap();

        assert!(matches!(
            parsed,
            SessionEvent::Terminated {
                reason: SessionError::HeartbeatTimeout
            }
        ));
    }
}
