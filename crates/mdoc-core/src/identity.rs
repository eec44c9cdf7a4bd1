//! # Identifier Newtypes
//!
//! Newtype wrappers for the string and integer keys of the disclosure
//! protocol. They prevent accidental identifier confusion: a `Namespace`
//! cannot be passed where an `ElementIdentifier` is expected.
//!
//! ## Security Invariant
//!
//! Type-level distinction between doc types, namespaces and element
//! identifiers prevents a lookup in one key space from silently matching
//! a key from another.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

macro_rules! string_newtype {
    ($(#[$meta:meta])* $name:ident, $what:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Construct after validating that the value is non-blank.
            pub fn new(value: impl Into<String>) -> Result<Self, CoreError> {
                let value = value.into();
                if value.trim().is_empty() {
                    return Err(CoreError::Validation(format!(
                        concat!($what, " must not be empty, got: {:?}"),
                        value
                    )));
                }
                Ok(Self(value))
            }

            /// Borrow the underlying string.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = CoreError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl TryFrom<&str> for $name {
            type Error = CoreError;

            fn try_from(value: &str) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl std::borrow::Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }
    };
}

string_newtype!(
    /// The document type of a credential (e.g. `"Tax Number"`).
    DocType,
    "doc type"
);

string_newtype!(
    /// A named grouping of data elements within one credential
    /// (e.g. `"eu.europa.finance.taxid.1"`).
    Namespace,
    "namespace"
);

string_newtype!(
    /// The identifier of a single data element (e.g. `"tax_number"`).
    ElementIdentifier,
    "element identifier"
);

/// Unique-per-namespace key linking a disclosed element to its commitment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DigestId(pub u32);

impl DigestId {
    /// The raw integer value.
    pub fn value(&self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for DigestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_identifiers_rejected() {
        assert!(DocType::new("").is_err());
        assert!(Namespace::new("   ").is_err());
        assert!(ElementIdentifier::new("").is_err());
    }

    #[test]
    fn serde_is_plain_string() {
        let ns = Namespace::new("eu.europa.finance.taxid.1").expect("valid namespace");
        let json = serde_json::to_string(&ns).unwrap();
        assert_eq!(json, r#""eu.europa.finance.taxid.1""#);
        let back: Namespace = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ns);
    }

    #[test]
    fn serde_rejects_blank() {
        assert!(serde_json::from_str::<ElementIdentifier>(r#""""#).is_err());
    }

    #[test]
    fn digest_id_is_transparent() {
        assert_eq!(serde_json::to_string(&DigestId(7)).unwrap(), "7");
        assert_eq!(DigestId(7).to_string(), "7");
    }

    #[test]
    fn borrow_allows_str_lookup() {
        let mut map = std::collections::BTreeMap::new();
        map.insert(ElementIdentifier::new("tax_number").expect("valid identifier"), 1);
        assert_eq!(map.get("tax_number"), Some(&1));
    }
}
