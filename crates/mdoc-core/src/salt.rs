//! # Element Salts
//!
//! The per-element random value mixed into every commitment. Without it a
//! verifier holding only the commitment list could brute-force low-entropy
//! values such as a birth date or a country name offline.
//!
//! Generation lives in `mdoc-crypto` (it needs a CSPRNG); this type only
//! enforces the minimum length and the wire form (lowercase hex).

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::CoreError;
use crate::hex;

/// Minimum salt length in bytes.
pub const MIN_SALT_LEN: usize = 16;

/// Issuer-generated randomness of at least [`MIN_SALT_LEN`] bytes.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Salt(Vec<u8>);

impl Salt {
    /// Wrap salt bytes, rejecting anything shorter than [`MIN_SALT_LEN`].
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, CoreError> {
        if bytes.len() < MIN_SALT_LEN {
            return Err(CoreError::Validation(format!(
                "salt must be at least {MIN_SALT_LEN} bytes, got {}",
                bytes.len()
            )));
        }
        Ok(Self(bytes))
    }

    /// Parse a salt from its hex form.
    pub fn from_hex(hex: &str) -> Result<Self, CoreError> {
        Self::from_bytes(hex::decode(hex)?)
    }

    /// The raw salt bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Render as lowercase hex.
    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }
}

impl Serialize for Salt {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Salt {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

impl std::fmt::Debug for Salt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Salt({} bytes)", self.0.len())
    }
}
