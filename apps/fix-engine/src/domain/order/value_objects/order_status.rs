//! Order status in the lifecycle.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Order status following FIX tag 39 semantics.
///
/// Wire values: `0` New, `1` Partially filled, `2` Filled, `4` Canceled,
/// `8` Rejected. `New` here is the engine's local pre-acknowledgment
/// state; it shares the `0` wire value with `Acknowledged`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    /// Validated and submitted, no counterparty acknowledgment yet.
    New,
    /// Counterparty accepted the order.
    Acknowledged,
    /// Some quantity executed, some still open.
    PartiallyFilled,
    /// Entire quantity executed.
    Filled,
    /// Canceled before completion.
    Canceled,
    /// Refused, locally or by the counterparty.
    Rejected,
}

impl OrderStatus {
    /// Terminal states admit no further transitions.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Filled | Self::Canceled | Self::Rejected)
    }

    /// Active states still expect execution reports.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        matches!(self, Self::New | Self::Acknowledged | Self::PartiallyFilled)
    }

    /// Whether a cancel request may be sent. Requires acknowledgment,
    /// so a still-`New` order cannot be canceled.
    #[must_use]
    pub const fn is_cancelable(&self) -> bool {
        matches!(self, Self::Acknowledged | Self::PartiallyFilled)
    }

    /// Whether the order can absorb a fill.
    #[must_use]
    pub const fn can_fill(&self) -> bool {
        matches!(self, Self::Acknowledged | Self::PartiallyFilled)
    }

    /// The tag 39 wire value.
    #[must_use]
    pub const fn as_fix(&self) -> char {
        match self {
            Self::New | Self::Acknowledged => '0',
            Self::PartiallyFilled => '1',
            Self::Filled => '2',
            Self::Canceled => '4',
            Self::Rejected => '8',
        }
    }

    /// Decode a tag 39 value from an inbound execution report.
    ///
    /// Wire value `0` means the counterparty accepted the order, so it
    /// maps to `Acknowledged`, never the local `New` state.
    #[must_use]
    pub const fn from_fix(value: char) -> Option<Self> {
        match value {
            '0' => Some(Self::Acknowledged),
            '1' => Some(Self::PartiallyFilled),
            '2' => Some(Self::Filled),
            '4' => Some(Self::Canceled),
            '8' => Some(Self::Rejected),
            _ => None,
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::New => "NEW",
            Self::Acknowledged => "ACKNOWLEDGED",
            Self::PartiallyFilled => "PARTIALLY_FILLED",
            Self::Filled => "FILLED",
            Self::Canceled => "CANCELED",
            Self::Rejected => "REJECTED",
        };
        f.write_str(name)
    }
}
