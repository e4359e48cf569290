//! Instrument ticker, normalized for the wire.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::shared::DomainError;

/// Longest ticker the engine will put on the wire.
const MAX_SYMBOL_LEN: usize = 16;

/// An equity ticker (FIX tag 55), held uppercase.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Symbol(String);

impl Symbol {
    /// Build a symbol, normalizing ASCII letters to uppercase.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        let mut s = value.into();
        s.make_ascii_uppercase();
        Self(s)
    }

    /// The ticker as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Check the symbol is submittable on a new order.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidValue`] when the ticker is empty,
    /// too long, or not ASCII alphanumeric.
    pub fn validate(&self) -> Result<(), DomainError> {
        let invalid = |message: String| DomainError::InvalidValue {
            field: "symbol".to_string(),
            message,
        };

        if self.0.is_empty() {
            return Err(invalid("symbol must not be empty".to_string()));
        }
        if self.0.len() > MAX_SYMBOL_LEN {
            return Err(invalid(format!(
                "symbol longer than {MAX_SYMBOL_LEN} characters"
            )));
        }
        if !self.0.bytes().all(|b| b.is_ascii_alphanumeric()) {
            return Err(invalid("symbol must be ASCII alphanumeric".to_string()));
        }
        Ok(())
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Symbol {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl From<String> for Symbol {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&str> for Symbol {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_to_uppercase() {
        assert_eq!(Symbol::new("aapl").as_str(), "AAPL");
        assert_eq!(Symbol::new("BrkB").as_str(), "BRKB");
    }

    #[test]
    fn accepts_real_tickers() {
        for ticker in ["AAPL", "MSFT", "GOOGL", "BRK"] {
            assert!(Symbol::new(ticker).validate().is_ok(), "{ticker}");
        }
    }

    #[test]
    fn rejects_empty_and_oversized() {
        assert!(Symbol::new("").validate().is_err());
        assert!(Symbol::new("X".repeat(MAX_SYMBOL_LEN + 1)).validate().is_err());
        assert!(Symbol::new("X".repeat(MAX_SYMBOL_LEN)).validate().is_ok());
    }

    #[test]
    fn rejects_non_alphanumeric() {
        assert!(Symbol::new("AAPL!").validate().is_err());
        assert!(Symbol::new("AA PL").validate().is_err());
        assert!(Symbol::new("BRK.B").validate().is_err());
    }

    #[test]
    fn display_matches_wire_form() {
        assert_eq!(Symbol::new("msft").to_string(), "MSFT");
    }

    #[test]
    fn conversions_normalize_too() {
        let from_borrowed: Symbol = "aapl".into();
        let from_owned: Symbol = String::from("AAPL").into();
        assert_eq!(from_borrowed, from_owned);
        assert_eq!(from_borrowed.as_ref(), "AAPL");
    }

    #[test]
    fn serde_is_transparent() {
        let s = Symbol::new("nvda");
        let json = serde_json::to_string(&s).unwrap();
        assert_eq!(json, "\"NVDA\"");
        let back: Symbol = serde_json::from_str(&json).unwrap();
        assert_eq!(back, s);
    }

    #[test]
    fn hashes_by_normalized_value() {
        use std::collections::HashSet;
        let mut set = HashSet::new();
        set.insert(Symbol::new("AAPL"));
        set.insert(Symbol::new("aapl"));
        set.insert(Symbol::new("MSFT"));
        assert_eq!(set.len(), 2);
    }
}
