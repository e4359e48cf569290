//! Session bounded context errors.

use serde::{Deserialize, Serialize};

/// Errors that terminate or prevent a FIX session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionError {
    /// No Logon acknowledgment arrived within the configured timeout.
    LogonTimeout,
    /// The counterparty rejected the Logon.
    LogonRejected {
        /// Reason supplied by the counterparty, if any.
        reason: String,
    },
    /// The counterparty stopped responding to heartbeats and test requests.
    HeartbeatTimeout,
    /// No Logout acknowledgment arrived within the configured timeout.
    LogoutTimeout,
    /// The transport closed underneath the session.
    TransportClosed,
    /// Too many messages arrived ahead of an open sequence gap.
    GapBufferOverflow,
}

impl std::fmt::Display for SessionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LogonTimeout => {
                write!(f, "Logon was not acknowledged within the timeout")
            }
            Self::LogonRejected { reason } => {
                write!(f, "Logon rejected by counterparty: {reason}")
            }
            Self::HeartbeatTimeout => {
                write!(f, "Counterparty stopped responding to heartbeats")
            }
            Self::LogoutTimeout => {
                write!(f, "Logout was not acknowledged within the timeout")
            }
            Self::TransportClosed => {
                write!(f, "Transport closed")
            }
            Self::GapBufferOverflow => {
                write!(f, "Gap buffer capacity exceeded while awaiting resend")
            }
        }
    }
}

impl std::error::Error for SessionError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages() {
        assert_eq!(
            SessionError::LogonTimeout.to_string(),
            "Logon was not acknowledged within the timeout"
        );
        assert_eq!(
            SessionError::LogonRejected {
                reason: "bad credentials".to_string()
            }
            .to_string(),
            "Logon rejected by counterparty: bad credentials"
        );
        assert_eq!(
            SessionError::HeartbeatTimeout.to_string(),
            "Counterparty stopped responding to heartbeats"
        );
    }

    #[test]
    fn implements_error_trait() {
        let err: Box<dyn std::error::Error> = Box::new(SessionError::TransportClosed);
        assert_eq!(err.to_string(), "Transport closed");
    }

    #[test]
    fn serde_tagged_representation() {
        let json = serde_json::to_string(&SessionError::HeartbeatTimeout).unwrap();
        assert!(json.contains("\"HEARTBEAT_TIMEOUT\""));
    }
}
