//! # Key Provider Abstraction
//!
//! The opaque signing capability handed to the issuer (for the security
//! object signature) and to the holder (for the device signature):
//!
//! - [`LocalKeyProvider`]: in-memory key for development and testing.
//! - [`EnvKeyProvider`]: loads a hex-encoded 32-byte Ed25519 seed from an
//!   environment variable, for deployments that inject secrets that way.
//!
//! ## Security Invariants
//!
//! - Private key material never leaves a provider; the trait exposes only
//!   `sign()` and the public key.
//! - Signing input is `&CanonicalBytes`.
//! - `KeyProvider` is `Send + Sync` so one provider can serve concurrent
//!   issuances or disclosures.

use mdoc_core::{hex, CanonicalBytes};
use zeroize::Zeroizing;

use crate::ed25519::{Ed25519KeyPair, Ed25519PublicKey, Ed25519Signature};
use crate::error::CryptoError;

/// Trait for Ed25519 signing backends.
pub trait KeyProvider: Send + Sync {
    /// Sign canonicalized data with the managed key.
    fn sign(&self, data: &CanonicalBytes) -> Result<Ed25519Signature, CryptoError>;

    /// Return the public key matching the managed private key.
    fn public_key(&self) -> Result<Ed25519PublicKey, CryptoError>;

    /// Human-readable name for this provider (for diagnostics/logging).
    fn provider_name(&self) -> &str;
}

// ─── LocalKeyProvider ────────────────────────────────────────────────────

/// In-memory Ed25519 key provider.
#[derive(Debug)]
pub struct LocalKeyProvider {
    key: Ed25519KeyPair,
}

impl LocalKeyProvider {
    /// Wrap an existing key pair.
    pub fn new(key: Ed25519KeyPair) -> Self {
        Self { key }
    }

    /// Generate a new random key using the OS CSPRNG.
    pub fn generate() -> Self {
        Self::new(Ed25519KeyPair::generate())
    }

    /// Create from a raw 32-byte seed.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        Self::new(Ed25519KeyPair::from_seed(seed))
    }
}

impl KeyProvider for LocalKeyProvider {
    fn sign(&self, data: &CanonicalBytes) -> Result<Ed25519Signature, CryptoError> {
        Ok(self.key.sign(data))
    }

    fn public_key(&self) -> Result<Ed25519PublicKey, CryptoError> {
        Ok(self.key.public_key())
    }

    fn provider_name(&self) -> &str {
        "LocalKeyProvider"
    }
}

// ─── EnvKeyProvider ──────────────────────────────────────────────────────

/// Loads an Ed25519 signing key from an environment variable.
///
/// The variable must contain a 64-character hex string encoding the 32-byte
/// seed. The key is loaded once at construction.
///
/// ```bash
/// export MDOC_ISSUER_KEY="deadbeef..."  # 64 hex chars
/// ```
#[derive(Debug)]
pub struct EnvKeyProvider {
    key: Ed25519KeyPair,
    var_name: String,
}

impl EnvKeyProvider {
    /// Load the signing key from the named environment variable.
    pub fn from_env(var_name: &str) -> Result<Self, CryptoError> {
        let raw = std::env::var(var_name).map_err(|_| {
            CryptoError::InvalidSigningKey(format!("environment variable {var_name} not set"))
        })?;
        let key = Self::parse_seed(var_name, Zeroizing::new(raw))?;
        tracing::debug!(var_name, "loaded signing key from environment");
        Ok(Self {
            key,
            var_name: var_name.to_string(),
        })
    }

    /// Return the environment variable name this provider was loaded from.
    pub fn var_name(&self) -> &str {
        &self.var_name
    }

    fn parse_seed(var_name: &str, raw: Zeroizing<String>) -> Result<Ed25519KeyPair, CryptoError> {
        // Operators paste seeds in either case, often with a trailing newline.
        let normalized = Zeroizing::new(raw.trim().to_ascii_lowercase());
        let bytes = Zeroizing::new(hex::decode(&normalized).map_err(|e| {
            CryptoError::InvalidSigningKey(format!("{var_name} is not valid hex: {e}"))
        })?);
        let seed: Zeroizing<[u8; 32]> = Zeroizing::new(bytes.as_slice().try_into().map_err(|_| {
            CryptoError::InvalidSigningKey(format!(
                "expected 32 bytes (64 hex chars) in {var_name}, got {} bytes",
                bytes.len()
            ))
        })?);
        Ok(Ed25519KeyPair::from_seed(&seed))
    }
}

impl KeyProvider for EnvKeyProvider {
    fn sign(&self, data: &CanonicalBytes) -> Result<Ed25519Signature, CryptoError> {
        Ok(self.key.sign(data))
    }

    fn public_key(&self) -> Result<Ed25519PublicKey, CryptoError> {
        Ok(self.key.public_key())
    }

    fn provider_name(&self) -> &str {
        "EnvKeyProvider"
    }
}
