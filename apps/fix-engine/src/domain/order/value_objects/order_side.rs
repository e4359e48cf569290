//! Buy/sell indicator.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Side of an order (FIX tag 54).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderSide {
    /// Buying.
    Buy,
    /// Selling.
    Sell,
}

impl OrderSide {
    /// The single-character tag 54 encoding.
    #[must_use]
    pub const fn as_fix(&self) -> char {
        match self {
            Self::Buy => '1',
            Self::Sell => '2',
        }
    }

    /// Decode a tag 54 value, `None` for anything outside 1/2.
    #[must_use]
    pub const fn from_fix(value: char) -> Option<Self> {
        match value {
            '1' => Some(Self::Buy),
            '2' => Some(Self::Sell),
            _ => None,
        }
    }
}

impl fmt::Display for OrderSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Buy => f.write_str("BUY"),
            Self::Sell => f.write_str("SELL"),
        }
    }
}
