//! # Element Digests
//!
//! Defines `DigestAlgorithm` and `ElementDigest`, the hash half of the
//! commitment scheme: `hash = Hash(CanonicalEncode(element))`.
//!
//! ## Security Invariant
//!
//! `DigestAlgorithm::digest()` accepts only `&CanonicalBytes`, so every
//! commitment in the system is computed over correctly canonicalized input.
//! Digest equality for verification goes through [`ElementDigest::ct_eq`],
//! which does not short-circuit on the first differing byte.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256, Sha384, Sha512};
use subtle::ConstantTimeEq;

use crate::canonical::CanonicalBytes;
use crate::error::CoreError;
use crate::hex;

/// The hash algorithm declared in a security object.
///
/// Serialized with the identifiers used on the mdoc wire (`"SHA-256"` etc.).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DigestAlgorithm {
    /// SHA-256, 32-byte output.
    #[default]
    #[serde(rename = "SHA-256")]
    Sha256,
    /// SHA-384, 48-byte output.
    #[serde(rename = "SHA-384")]
    Sha384,
    /// SHA-512, 64-byte output.
    #[serde(rename = "SHA-512")]
    Sha512,
}

impl DigestAlgorithm {
    /// Returns the wire identifier string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sha256 => "SHA-256",
            Self::Sha384 => "SHA-384",
            Self::Sha512 => "SHA-512",
        }
    }

    /// Output length in bytes.
    pub fn output_len(&self) -> usize {
        match self {
            Self::Sha256 => 32,
            Self::Sha384 => 48,
            Self::Sha512 => 64,
        }
    }

    /// Hash canonical bytes with this algorithm.
    pub fn digest(&self, data: &CanonicalBytes) -> ElementDigest {
        let bytes = match self {
            Self::Sha256 => Sha256::digest(data.as_bytes()).to_vec(),
            Self::Sha384 => Sha384::digest(data.as_bytes()).to_vec(),
            Self::Sha512 => Sha512::digest(data.as_bytes()).to_vec(),
        };
        ElementDigest(bytes)
    }
}

impl std::fmt::Display for DigestAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for DigestAlgorithm {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SHA-256" => Ok(Self::Sha256),
            "SHA-384" => Ok(Self::Sha384),
            "SHA-512" => Ok(Self::Sha512),
            other => Err(CoreError::Validation(format!(
                "unsupported digest algorithm: {other:?}"
            ))),
        }
    }
}

/// Raw digest bytes. The algorithm lives beside it in the security object.
///
/// Serializes as a lowercase hex string.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct ElementDigest(Vec<u8>);

impl ElementDigest {
    /// Wrap raw digest bytes received from elsewhere.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// The raw digest bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Render the digest as a lowercase hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }

    /// Constant-time equality. Digests of different length compare unequal.
    pub fn ct_eq(&self, other: &ElementDigest) -> bool {
        self.0.ct_eq(&other.0).into()
    }
}

impl Serialize for ElementDigest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for ElementDigest {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        hex::decode(&s).map(Self).map_err(serde::de::Error::custom)
    }
}

impl std::fmt::Debug for ElementDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ElementDigest({}...)", hex::prefix(&self.0))
    }
}

impl std::fmt::Display for ElementDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digest_deterministic() {
        let cb = CanonicalBytes::new(&serde_json::json!({"a": 1, "b": 2})).unwrap();
        let d1 = DigestAlgorithm::Sha256.digest(&cb);
        let d2 = DigestAlgorithm::Sha256.digest(&cb);
        assert_eq!(d1, d2);
        assert!(d1.ct_eq(&d2));
    }

    #[test]
    fn test_known_sha256_vector() {
        let cb = CanonicalBytes::new(&serde_json::json!({})).unwrap();
        assert_eq!(
            DigestAlgorithm::Sha256.digest(&cb).to_hex(),
            "44136fa355b3678a1146ad16f7e8649e94fb4fc21fe77e8310c060f61caaff8a"
        );
    }

    #[test]
    fn test_output_lengths() {
        let cb = CanonicalBytes::new(&"x").unwrap();
        for alg in [
            DigestAlgorithm::Sha256,
            DigestAlgorithm::Sha384,
            DigestAlgorithm::Sha512,
        ] {
            assert_eq!(alg.digest(&cb).as_bytes().len(), alg.output_len());
        }
    }

    #[test]
    fn test_different_algorithms_never_compare_equal() {
        let cb = CanonicalBytes::new(&"x").unwrap();
        let a = DigestAlgorithm::Sha256.digest(&cb);
        let b = DigestAlgorithm::Sha512.digest(&cb);
        assert!(!a.ct_eq(&b));
    }

    #[test]
    fn test_algorithm_wire_names() {
        assert_eq!(
            serde_json::to_string(&DigestAlgorithm::Sha256).unwrap(),
            r#""SHA-256""#
        );
        let parsed: DigestAlgorithm = serde_json::from_str(r#""SHA-384""#).unwrap();
        assert_eq!(parsed, DigestAlgorithm::Sha384);
        assert_eq!("SHA-512".parse::<DigestAlgorithm>().unwrap(), DigestAlgorithm::Sha512);
        assert!("MD5".parse::<DigestAlgorithm>().is_err());
    }

    #[test]
    fn test_digest_serde_is_hex() {
        let cb = CanonicalBytes::new(&serde_json::json!({"k": "v"})).unwrap();
        let d = DigestAlgorithm::Sha256.digest(&cb);
        let json = serde_json::to_string(&d).unwrap();
        assert_eq!(json.len(), 64 + 2);
        let back: ElementDigest = serde_json::from_str(&json).unwrap();
        assert_eq!(back, d);
    }
}
