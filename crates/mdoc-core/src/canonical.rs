//! # Canonical Serialization — JCS Byte Production
//!
//! `CanonicalBytes` is the only input accepted by element hashing and by
//! every signature in the workspace. An issuer that commits to an element
//! and a verifier that recomputes the commitment both go through
//! [`CanonicalBytes::new`], so their bytes agree.
//!
//! ## Security Invariant
//!
//! The inner buffer is private. Construction converts the value to a
//! `serde_json::Value`, rejects any non-integer number, and encodes with
//! `serde_jcs` (RFC 8785). Keys are sorted by code unit, separators are
//! compact, strings are UTF-8 without escaping beyond what JSON requires.
//!
//! Element values never carry floats: dates and timestamps are strings,
//! byte strings are hex.

use serde::Serialize;
use serde_json::Value;

use crate::error::CanonicalizationError;

/// JCS-encoded bytes, ready to hash or sign.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalBytes(Vec<u8>);

impl CanonicalBytes {
    /// Canonicalize `obj`.
    ///
    /// # Errors
    ///
    /// `FloatRejected` for any non-integer number anywhere in the tree,
    /// `SerializationFailed` if `obj` cannot be represented as JSON.
    pub fn new(obj: &impl Serialize) -> Result<Self, CanonicalizationError> {
        let value = serde_json::to_value(obj)?;
        find_float(&value)?;
        Ok(Self(serde_jcs::to_vec(&value)?))
    }

    /// The bytes to hash or sign.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Length in bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Never true for output of [`CanonicalBytes::new`].
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<[u8]> for CanonicalBytes {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

fn find_float(value: &Value) -> Result<(), CanonicalizationError> {
    match value {
        Value::Number(n) if !(n.is_i64() || n.is_u64()) => {
            Err(CanonicalizationError::FloatRejected(n.as_f64().unwrap_or(f64::NAN)))
        }
        Value::Object(map) => map.values().try_for_each(find_float),
        Value::Array(items) => items.iter().try_for_each(find_float),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(v: &impl Serialize) -> String {
        String::from_utf8(CanonicalBytes::new(v).unwrap().as_bytes().to_vec()).unwrap()
    }

    #[test]
    fn element_shaped_object_sorts_keys() {
        let element = serde_json::json!({
            "random": "00",
            "elementValue": {"value": "1337", "type": "text"},
            "digestID": 3,
            "elementIdentifier": "tax_number",
        });
        assert_eq!(
            text(&element),
            r#"{"digestID":3,"elementIdentifier":"tax_number","elementValue":{"type":"text","value":"1337"},"random":"00"}"#
        );
    }

    #[test]
    fn array_order_is_preserved() {
        assert_eq!(text(&serde_json::json!({"ids": [3, 1, 2]})), r#"{"ids":[3,1,2]}"#);
    }

    #[test]
    fn rust_field_order_does_not_leak() {
        #[derive(Serialize)]
        struct Forward {
            doc_type: &'static str,
            version: &'static str,
        }
        #[derive(Serialize)]
        struct Reverse {
            version: &'static str,
            doc_type: &'static str,
        }
        assert_eq!(
            CanonicalBytes::new(&Forward { doc_type: "Tax Number", version: "1.0" }).unwrap(),
            CanonicalBytes::new(&Reverse { version: "1.0", doc_type: "Tax Number" }).unwrap()
        );
    }

    #[test]
    fn floats_are_rejected_at_any_depth() {
        let top = serde_json::json!({"elementValue": 1.5});
        assert!(matches!(
            CanonicalBytes::new(&top),
            Err(CanonicalizationError::FloatRejected(f)) if f == 1.5
        ));
        let nested = serde_json::json!({"nameSpaces": {"ns": [{"elementValue": 0.25}]}});
        assert!(CanonicalBytes::new(&nested).is_err());
    }

    #[test]
    fn full_u32_and_negative_integers_survive() {
        assert_eq!(
            text(&serde_json::json!({"digestID": u32::MAX, "offset": -42})),
            r#"{"digestID":4294967295,"offset":-42}"#
        );
    }

    #[test]
    fn non_ascii_is_emitted_raw() {
        let s = text(&serde_json::json!({"registered_family_name": "Müller"}));
        assert!(s.contains("Müller"));
        assert!(!s.contains("\\u"));
    }

    #[test]
    fn empty_object_is_two_bytes() {
        let cb = CanonicalBytes::new(&serde_json::json!({})).unwrap();
        assert_eq!(cb.as_ref(), b"{}");
        assert_eq!(cb.len(), 2);
        assert!(!cb.is_empty());
    }
}
