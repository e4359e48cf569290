//! Timestamp value object wrapping UTC datetimes.

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// FIX SendingTime format with millisecond precision (tag 52).
const FIX_TIME_FORMAT: &str = "%Y%m%d-%H:%M:%S%.3f";

/// FIX SendingTime format without fractional seconds.
const FIX_TIME_FORMAT_SECONDS: &str = "%Y%m%d-%H:%M:%S";

/// A UTC timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Pin a timestamp to a known datetime.
    #[must_use]
    pub const fn new(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }

    /// Current time.
    #[must_use]
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// The wrapped datetime.
    #[must_use]
    pub const fn as_datetime(&self) -> DateTime<Utc> {
        self.0
    }

    /// Format as a FIX SendingTime value: `YYYYMMDD-HH:MM:SS.sss` (UTC).
    #[must_use]
    pub fn to_fix_sending_time(&self) -> String {
        self.0.format(FIX_TIME_FORMAT).to_string()
    }

    /// Parse a FIX SendingTime value.
    ///
    /// Accepts both millisecond precision and whole seconds.
    ///
    /// # Errors
    ///
    /// Returns error if the value matches neither format.
    pub fn parse_fix_sending_time(value: &str) -> Result<Self, chrono::ParseError> {
        NaiveDateTime::parse_from_str(value, FIX_TIME_FORMAT)
            .or_else(|_| NaiveDateTime::parse_from_str(value, FIX_TIME_FORMAT_SECONDS))
            .map(|naive| Self(naive.and_utc()))
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.to_rfc3339_opts(SecondsFormat::Millis, true))
    }
}
