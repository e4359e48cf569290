//! Typed wrappers for wire-level identifiers.
//!
//! Keeping `ClOrdId` and `ExecId` as distinct types stops an execution id
//! from being handed to an order lookup by accident.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! wire_id {
    ($name:ident, $doc:literal) => {
        #[doc = $doc]
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            #[doc = concat!("Wrap a raw wire value as a `", stringify!($name), "`.")]
            #[must_use]
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Mint a fresh identifier from a v4 UUID, hyphen-free.
            #[must_use]
            pub fn generate() -> Self {
                Self(uuid::Uuid::new_v4().simple().to_string())
            }

            /// Borrow the raw wire value.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Unwrap into the raw wire value.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                self.0.as_str()
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_owned())
            }
        }
    };
}

wire_id!(
    ClOrdId,
    "Client-assigned order identifier (FIX tag 11). Unique per order for the life of the engine."
);
wire_id!(
    ExecId,
    "Counterparty-assigned execution identifier (FIX tag 17)."
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrap_and_display() {
        let id = ClOrdId::new("ORD001");
        assert_eq!(id.as_str(), "ORD001");
        assert_eq!(id.to_string(), "ORD001");
    }

    #[test]
    fn generate_yields_unique_hyphen_free_values() {
        let a = ExecId::generate();
        let b = ExecId::generate();
        assert_ne!(a, b);
        assert!(!a.as_str().contains('-'));
        assert_eq!(a.as_str().len(), 32);
    }

    #[test]
    fn equality_is_by_value() {
        assert_eq!(ClOrdId::new("ORD001"), ClOrdId::from("ORD001"));
        assert_ne!(ClOrdId::new("ORD001"), ClOrdId::new("ORD002"));
    }

    #[test]
    fn conversions_preserve_the_wire_value() {
        let from_owned: ExecId = String::from("EXEC-7").into();
        let from_borrowed: ExecId = "EXEC-7".into();
        assert_eq!(from_owned, from_borrowed);
        assert_eq!(from_owned.as_ref(), "EXEC-7");
        assert_eq!(from_owned.into_inner(), "EXEC-7");
    }

    #[test]
    fn serde_is_transparent() {
        let id = ClOrdId::new("ORD001");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"ORD001\"");
        let back: ClOrdId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn ids_key_hash_maps() {
        use std::collections::HashMap;
        let mut blotter = HashMap::new();
        blotter.insert(ClOrdId::new("ORD001"), 1u32);
        blotter.insert(ClOrdId::new("ORD002"), 2u32);
        blotter.insert(ClOrdId::new("ORD001"), 3u32);
        assert_eq!(blotter.len(), 2);
        assert_eq!(blotter[&ClOrdId::new("ORD001")], 3);
    }
}
