//! # mdoc-crypto — Cryptographic Primitives
//!
//! Provides the cryptographic building blocks for issuance, disclosure and
//! verification:
//!
//! - **Ed25519** signing and verification for the issuer's security object
//!   signature and the holder's device signature.
//! - **Key providers**: the opaque signing capability handed to the issuer
//!   and the holder. Private keys never leave a provider.
//! - **Randomness**: CSPRNG salts and random digest identifiers.
//!
//! ## Crate Policy
//!
//! - Depends only on `mdoc-core` internally.
//! - Signing input is always `&CanonicalBytes`, never raw bytes.
//! - No mocking of cryptographic operations in tests.

pub mod ed25519;
pub mod error;
pub mod key_provider;
pub mod random;

pub use ed25519::{Ed25519KeyPair, Ed25519PublicKey, Ed25519Signature};
pub use error::CryptoError;
pub use key_provider::{EnvKeyProvider, KeyProvider, LocalKeyProvider};
pub use random::{random_digest_id, random_salt};
