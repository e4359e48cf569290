//! Session configuration value object.

use std::time::Duration;

/// Identity and timing parameters for one FIX session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Protocol version string (tag 8), e.g. `FIX.4.2`.
    pub begin_string: String,
    /// Our CompID (tag 49).
    pub sender_comp_id: String,
    /// Counterparty CompID (tag 56).
    pub target_comp_id: String,
    /// Negotiated heartbeat interval (tag 108).
    pub heart_bt_int: Duration,
    /// How long to wait for a Logon acknowledgment before giving up.
    /// Also bounds the wait for a Logout acknowledgment.
    pub logon_timeout: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            begin_string: "FIX.4.2".to_string(),
            sender_comp_id: "CLIENT1".to_string(),
            target_comp_id: "BROKERX".to_string(),
            heart_bt_int: Duration::from_secs(30),
            logon_timeout: Duration::from_secs(10),
        }
    }
}

impl SessionConfig {
    /// Heartbeat interval in whole seconds, as carried in tag 108.
    #[must_use]
    pub const fn heart_bt_int_secs(&self) -> u64 {
        self.heart_bt_int.as_secs()
    }
}
