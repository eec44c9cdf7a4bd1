//! # Ed25519 Issuer and Device Signatures
//!
//! The issuer signs the security object, the holder's device key signs the
//! device authentication, and a reader may sign its request. All three use
//! the types here.
//!
//! ## Security Invariant
//!
//! - Signing input MUST be `&CanonicalBytes`; raw bytes cannot be signed.
//! - `Ed25519KeyPair` has no `Serialize` impl and a redacted `Debug`. The
//!   inner `SigningKey` zeroizes on drop.
//! - Verification is strict: small-order keys and malleable signatures are
//!   rejected.
//!
//! Public keys and signatures travel as lowercase hex strings.

use ed25519_dalek::Signer;
use mdoc_core::{hex, CanonicalBytes};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::CryptoError;

/// Fixed-length byte newtype with hex serde and a shortened `Debug`.
macro_rules! hex_bytes {
    ($(#[$meta:meta])* $name:ident, $len:literal, $err:ident) => {
        $(#[$meta])*
        #[derive(Clone, PartialEq, Eq, Hash)]
        pub struct $name(pub [u8; $len]);

        impl $name {
            /// Wrap raw bytes without validation.
            pub fn from_bytes(bytes: [u8; $len]) -> Self {
                Self(bytes)
            }

            /// The raw bytes.
            pub fn as_bytes(&self) -> &[u8; $len] {
                &self.0
            }

            /// Lowercase hex, the wire form.
            pub fn to_hex(&self) -> String {
                hex::encode(&self.0)
            }

            /// Parse exactly
            #[doc = concat!(stringify!($len), " bytes of hex.")]
            pub fn from_hex(s: &str) -> Result<Self, CryptoError> {
                let raw = hex::decode(s).map_err(|e| CryptoError::$err(e.to_string()))?;
                let len = raw.len();
                let bytes: [u8; $len] = raw.try_into().map_err(|_| {
                    CryptoError::$err(format!("expected {} bytes, got {len}", $len))
                })?;
                Ok(Self(bytes))
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(&self.to_hex())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                Self::from_hex(&s).map_err(serde::de::Error::custom)
            }
        }

        impl std::fmt::Debug for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}({}...)", stringify!($name), hex::prefix(&self.0))
            }
        }
    };
}

hex_bytes!(
    /// A 32-byte Ed25519 public key: the issuer key a verifier trusts, or the
    /// device key bound into a security object.
    Ed25519PublicKey,
    32,
    InvalidPublicKey
);

hex_bytes!(
    /// A 64-byte Ed25519 signature.
    Ed25519Signature,
    64,
    InvalidSignature
);

impl Ed25519PublicKey {
    /// Check `signature` over `data` with strict verification.
    pub fn verify(
        &self,
        data: &CanonicalBytes,
        signature: &Ed25519Signature,
    ) -> Result<(), CryptoError> {
        let key = ed25519_dalek::VerifyingKey::from_bytes(&self.0)
            .map_err(|e| CryptoError::InvalidPublicKey(e.to_string()))?;
        key.verify_strict(data.as_bytes(), &ed25519_dalek::Signature::from_bytes(&signature.0))
            .map_err(|e| CryptoError::VerificationFailed(e.to_string()))
    }
}

impl std::fmt::Display for Ed25519PublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

// ---------------------------------------------------------------------------
// Key pair
// ---------------------------------------------------------------------------

/// An Ed25519 signing key. Only key providers hold one.
pub struct Ed25519KeyPair {
    signing_key: ed25519_dalek::SigningKey,
}

impl Ed25519KeyPair {
    /// Fresh key from `OsRng`.
    pub fn generate() -> Self {
        Self {
            signing_key: ed25519_dalek::SigningKey::generate(&mut rand::rngs::OsRng),
        }
    }

    /// Deterministic key from a 32-byte seed.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        Self {
            signing_key: ed25519_dalek::SigningKey::from_bytes(seed),
        }
    }

    /// The verifying half of this key.
    pub fn public_key(&self) -> Ed25519PublicKey {
        Ed25519PublicKey(self.signing_key.verifying_key().to_bytes())
    }

    /// Sign canonical bytes. Ed25519 signing is deterministic.
    pub fn sign(&self, data: &CanonicalBytes) -> Ed25519Signature {
        Ed25519Signature(self.signing_key.sign(data.as_bytes()).to_bytes())
    }
}

impl std::fmt::Debug for Ed25519KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Ed25519KeyPair(<private>)")
    }
}
