//! Engine Configuration Settings
//!
//! Configuration types for the FIX engine, loaded from environment variables.

use std::time::Duration;

use crate::domain::session::SessionConfig;
use crate::infrastructure::fix::{PIPE, SOH};
use crate::infrastructure::session::ReconnectConfig;

/// Field delimiter used on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WireDelimiter {
    /// Standard SOH (0x01) delimiter.
    #[default]
    Soh,
    /// Pipe delimiter, readable in logs and demos.
    Pipe,
}

impl WireDelimiter {
    /// Parse a delimiter name. Unknown names are rejected rather than
    /// defaulted; a wrong delimiter makes every frame undecodable.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "soh" => Some(Self::Soh),
            "pipe" => Some(Self::Pipe),
            _ => None,
        }
    }

    /// Get the delimiter character.
    #[must_use]
    pub const fn as_char(&self) -> char {
        match self {
            Self::Soh => SOH,
            Self::Pipe => PIPE,
        }
    }

    /// Get the delimiter name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Soh => "soh",
            Self::Pipe => "pipe",
        }
    }
}

/// Complete engine configuration.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// FIX session parameters (identity, intervals).
    pub session: SessionConfig,
    /// Wire delimiter.
    pub delimiter: WireDelimiter,
    /// Prefix for generated ClOrdIDs.
    pub cl_ord_id_prefix: String,
    /// Counterparty address for TCP mode. `None` runs the in-process demo.
    pub peer_addr: Option<String>,
    /// Reconnection backoff settings.
    pub reconnect: ReconnectConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            session: SessionConfig::default(),
            delimiter: WireDelimiter::default(),
            cl_ord_id_prefix: "ORD".to_string(),
            peer_addr: None,
            reconnect: ReconnectConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Build the configuration from `FIX_*` environment variables.
    ///
    /// Every variable has a default; set-but-empty and set-but-unparseable
    /// values are errors rather than silent fallbacks.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyValue`] or [`ConfigError::InvalidValue`]
    /// for malformed variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = SessionConfig::default();

        let session = SessionConfig {
            begin_string: env_string("FIX_BEGIN_STRING", &defaults.begin_string)?,
            sender_comp_id: env_string("FIX_SENDER_COMP_ID", &defaults.sender_comp_id)?,
            target_comp_id: env_string("FIX_TARGET_COMP_ID", &defaults.target_comp_id)?,
            heart_bt_int: parse_env_duration_secs("FIX_HEART_BT_INT_SECS", defaults.heart_bt_int)?,
            logon_timeout: parse_env_duration_secs(
                "FIX_LOGON_TIMEOUT_SECS",
                defaults.logon_timeout,
            )?,
        };

        let delimiter = match std::env::var("FIX_DELIMITER") {
            Ok(value) => {
                WireDelimiter::parse(&value).ok_or_else(|| ConfigError::InvalidValue {
                    var: "FIX_DELIMITER".to_string(),
                    value,
                })?
            }
            Err(_) => WireDelimiter::default(),
        };

        let reconnect_defaults = ReconnectConfig::default();
        let reconnect = ReconnectConfig {
            initial_delay: parse_env_duration_millis(
                "FIX_RECONNECT_DELAY_INITIAL_MS",
                reconnect_defaults.initial_delay,
            )?,
            max_delay: parse_env_duration_secs(
                "FIX_RECONNECT_DELAY_MAX_SECS",
                reconnect_defaults.max_delay,
            )?,
            multiplier: parse_env(
                "FIX_RECONNECT_DELAY_MULTIPLIER",
                reconnect_defaults.multiplier,
            )?,
            max_attempts: parse_env(
                "FIX_MAX_RECONNECT_ATTEMPTS",
                reconnect_defaults.max_attempts,
            )?,
        };

        Ok(Self {
            session,
            delimiter,
            cl_ord_id_prefix: env_string("FIX_CL_ORD_ID_PREFIX", "ORD")?,
            peer_addr: env_optional("FIX_PEER_ADDR")?,
            reconnect,
        })
    }

    /// Get the peer address for TCP mode.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingEnvVar`] when `FIX_PEER_ADDR` is unset.
    pub fn require_peer_addr(&self) -> Result<&str, ConfigError> {
        self.peer_addr
            .as_deref()
            .ok_or_else(|| ConfigError::MissingEnvVar("FIX_PEER_ADDR".to_string()))
    }
}

/// What went wrong while reading the environment.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A variable the current mode requires is unset.
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),
    /// A variable is set to an empty or whitespace-only value.
    #[error("environment variable {0} cannot be empty")]
    EmptyValue(String),
    /// Environment variable has a value that does not parse.
    #[error("invalid value for environment variable {var}: '{value}'")]
    InvalidValue {
        /// Variable name.
        var: String,
        /// The rejected value.
        value: String,
    },
}

fn env_string(key: &str, default: &str) -> Result<String, ConfigError> {
    match std::env::var(key) {
        Ok(value) if value.trim().is_empty() => Err(ConfigError::EmptyValue(key.to_string())),
        Ok(value) => Ok(value),
        Err(_) => Ok(default.to_string()),
    }
}

fn env_optional(key: &str) -> Result<Option<String>, ConfigError> {
    match std::env::var(key) {
        Ok(value) if value.trim().is_empty() => Err(ConfigError::EmptyValue(key.to_string())),
        Ok(value) => Ok(Some(value)),
        Err(_) => Ok(None),
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> Result<T, ConfigError> {
    match std::env::var(key) {
        Ok(value) => value.parse().map_err(|_| ConfigError::InvalidValue {
            var: key.to_string(),
            value,
        }),
        Err(_) => Ok(default),
    }
}

fn parse_env_duration_secs(key: &str, default: Duration) -> Result<Duration, ConfigError> {
    parse_env(key, default.as_secs()).map(Duration::from_secs)
}

fn parse_env_duration_millis(key: &str, default: Duration) -> Result<Duration, ConfigError> {
    let default_ms = u64::try_from(default.as_millis()).unwrap_or(u64::MAX);
    parse_env(key, default_ms).map(Duration::from_millis)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delimiter_parsing() {
        assert_eq!(WireDelimiter::parse("soh"), Some(WireDelimiter::Soh));
        assert_eq!(WireDelimiter::parse("SOH"), Some(WireDelimiter::Soh));
        assert_eq!(WireDelimiter::parse("pipe"), Some(WireDelimiter::Pipe));
        assert_eq!(WireDelimiter::parse("Pipe"), Some(WireDelimiter::Pipe));
        assert_eq!(WireDelimiter::parse("comma"), None);
    }

    #[test]
    fn delimiter_characters() {
        assert_eq!(WireDelimiter::Soh.as_char(), '\u{1}');
        assert_eq!(WireDelimiter::Pipe.as_char(), '|');
    }

    #[test]
    fn defaults_mirror_session_config() {
        let config = EngineConfig::default();
        assert_eq!(config.session.begin_string, "FIX.4.2");
        assert_eq!(config.session.sender_comp_id, "CLIENT1");
        assert_eq!(config.session.target_comp_id, "BROKERX");
        assert_eq!(config.session.heart_bt_int, Duration::from_secs(30));
        assert_eq!(config.cl_ord_id_prefix, "ORD");
        assert_eq!(config.delimiter, WireDelimiter::Soh);
        assert!(config.peer_addr.is_none());
    }

    #[test]
    fn missing_peer_addr_is_reported() {
        let config = EngineConfig::default();
        assert!(matches!(
            config.require_peer_addr(),
            Err(ConfigError::MissingEnvVar(var)) if var == "FIX_PEER_ADDR"
        ));
    }

    #[test]
    fn peer_addr_round_trips() {
        let config = EngineConfig {
            peer_addr: Some("127.0.0.1:9878".to_string()),
            ..EngineConfig::default()
        };
        assert_eq!(config.require_peer_addr().unwrap(), "127.0.0.1:9878");
    }
}
