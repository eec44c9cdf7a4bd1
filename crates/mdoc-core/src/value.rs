//! # Data Element Values
//!
//! `ElementValue` is the closed set of value shapes a data element may carry.
//! Each variant has exactly one canonical JSON form:
//!
//! ```text
//! {"type":"text","value":"Airstrip One"}
//! {"type":"bool","value":true}
//! {"type":"integer","value":1337}
//! {"type":"date","value":"2033-01-31"}
//! {"type":"timestamp","value":"2051-01-08T16:29:04Z"}
//! {"type":"bytes","value":"00ff"}
//! ```
//!
//! The `type` tag is part of the hashed encoding, so a text value that looks
//! like a date never collides with the date itself.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::temporal::Timestamp;

/// A data element value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum ElementValue {
    /// UTF-8 text.
    Text(String),
    /// Boolean flag.
    Bool(bool),
    /// Signed 64-bit integer.
    Integer(i64),
    /// Calendar date without time zone (`YYYY-MM-DD`).
    Date(NaiveDate),
    /// UTC instant with seconds precision.
    Timestamp(Timestamp),
    /// Opaque binary (e.g. a portrait), hex on the wire.
    Bytes(#[serde(with = "hex_bytes")] Vec<u8>),
}

/// The variant tag of an [`ElementValue`], used by credential schemes to
/// declare the expected shape of each attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    /// See [`ElementValue::Text`].
    Text,
    /// See [`ElementValue::Bool`].
    Bool,
    /// See [`ElementValue::Integer`].
    Integer,
    /// See [`ElementValue::Date`].
    Date,
    /// See [`ElementValue::Timestamp`].
    Timestamp,
    /// See [`ElementValue::Bytes`].
    Bytes,
}

impl ElementValue {
    /// Convenience constructor for text values.
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// The variant tag of this value.
    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Text(_) => ValueKind::Text,
            Self::Bool(_) => ValueKind::Bool,
            Self::Integer(_) => ValueKind::Integer,
            Self::Date(_) => ValueKind::Date,
            Self::Timestamp(_) => ValueKind::Timestamp,
            Self::Bytes(_) => ValueKind::Bytes,
        }
    }

    /// Borrow the text, if this is a text value.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl std::fmt::Display for ElementValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Self::Timestamp(ts) => write!(f, "{ts}"),
            Self::Bytes(b) => f.write_str(&crate::hex::encode(b)),
        }
    }
}

impl std::fmt::Display for ValueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Text => "text",
            Self::Bool => "bool",
            Self::Integer => "integer",
            Self::Date => "date",
            Self::Timestamp => "timestamp",
            Self::Bytes => "bytes",
        };
        f.write_str(s)
    }
}

mod hex_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&crate::hex::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        crate::hex::decode(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CanonicalBytes;

    fn canonical(v: &ElementValue) -> String {
        String::from_utf8(CanonicalBytes::new(v).unwrap().as_bytes().to_vec()).unwrap()
    }

    #[test]
    fn every_variant_has_a_fixed_encoding() {
        let date = NaiveDate::from_ymd_opt(2033, 1, 31).unwrap();
        let ts = Timestamp::parse("2051-01-08T16:29:04Z").expect("valid timestamp");
        let cases = [
            (ElementValue::text("1337"), r#"{"type":"text","value":"1337"}"#),
            (ElementValue::Bool(true), r#"{"type":"bool","value":true}"#),
            (ElementValue::Integer(-7), r#"{"type":"integer","value":-7}"#),
            (ElementValue::Date(date), r#"{"type":"date","value":"2033-01-31"}"#),
            (
                ElementValue::Timestamp(ts),
                r#"{"type":"timestamp","value":"2051-01-08T16:29:04Z"}"#,
            ),
            (ElementValue::Bytes(vec![0, 255]), r#"{"type":"bytes","value":"00ff"}"#),
        ];
        for (value, expected) in cases {
            assert_eq!(canonical(&value), expected, "{:?}", value.kind());
        }
    }

    #[test]
    fn text_that_looks_like_a_date_encodes_differently() {
        let date = NaiveDate::from_ymd_opt(2033, 1, 31).unwrap();
        assert_ne!(
            canonical(&ElementValue::text("2033-01-31")),
            canonical(&ElementValue::Date(date))
        );
    }

    #[test]
    fn serde_roundtrip_keeps_variant() {
        let v = ElementValue::Date(NaiveDate::from_ymd_opt(2033, 1, 31).unwrap());
        let json = serde_json::to_string(&v).unwrap();
        let back: ElementValue = serde_json::from_str(&json).unwrap();
        assert_eq!(back, v);
        assert_eq!(back.kind(), ValueKind::Date);
    }

    #[test]
    fn display_is_plain() {
        assert_eq!(ElementValue::text("Max").to_string(), "Max");
        assert_eq!(ElementValue::Bool(false).to_string(), "false");
        assert_eq!(ValueKind::Timestamp.to_string(), "timestamp");
    }
}
