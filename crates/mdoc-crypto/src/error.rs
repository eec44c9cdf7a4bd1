//! # Cryptographic Error Types
//!
//! Structured errors for all operations in `mdoc-crypto`.

use thiserror::Error;

/// Errors from cryptographic operations.
#[derive(Error, Debug)]
pub enum CryptoError {
    /// Ed25519 signature verification failed.
    #[error("Ed25519 verification failed: {0}")]
    VerificationFailed(String),

    /// Invalid Ed25519 signature encoding or length.
    #[error("invalid Ed25519 signature: {0}")]
    InvalidSignature(String),

    /// Invalid Ed25519 public key.
    #[error("invalid Ed25519 public key: {0}")]
    InvalidPublicKey(String),

    /// Invalid or unavailable signing key material.
    #[error("invalid signing key: {0}")]
    InvalidSigningKey(String),

    /// A key provider could not produce a signature.
    #[error("key provider {provider} failed: {reason}")]
    Provider {
        /// The provider's diagnostic name.
        provider: String,
        /// Why the operation failed.
        reason: String,
    },

    /// Salt or identifier generation failed.
    #[error("randomness error: {0}")]
    Randomness(String),
}
