//! Session state value object.

use serde::{Deserialize, Serialize};

/// FIX session lifecycle state.
///
/// A session starts `Disconnected`, moves to `LogonSent` once a Logon
/// message is on the wire, becomes `Active` when the counterparty
/// acknowledges the logon, and passes through `PendingLogout` during a
/// graceful shutdown. Any failure returns the session to `Disconnected`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionState {
    /// No transport or the session has terminated.
    Disconnected,
    /// Logon sent, awaiting the counterparty's Logon acknowledgment.
    LogonSent,
    /// Logon acknowledged; application messages may flow.
    Active,
    /// Logout sent, awaiting the counterparty's Logout acknowledgment.
    PendingLogout,
}

impl SessionState {
    /// Returns true if a transport is established.
    #[must_use]
    pub const fn is_connected(&self) -> bool {
        !matches!(self, Self::Disconnected)
    }

    /// Returns true if application messages may be sent.
    ///
    /// Only an `Active` session carries orders; admin messages also flow
    /// during `LogonSent` and `PendingLogout`.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Disconnected => "DISCONNECTED",
            Self::LogonSent => "LOGON_SENT",
            Self::Active => "ACTIVE",
            Self::PendingLogout => "PENDING_LOGOUT",
        };
        write!(f, "{s}")
    }
}
