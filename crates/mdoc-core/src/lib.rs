//! # mdoc-core — Foundational Types for Selective Disclosure
//!
//! This crate is the leaf of the mdoc workspace. It defines the primitives
//! that every issuer, holder, and verifier implementation must agree on
//! byte-for-byte:
//!
//! 1. **`CanonicalBytes` newtype.** ALL digest and signature input flows
//!    through `CanonicalBytes::new()` (RFC 8785 JCS). No raw
//!    `serde_json::to_vec()` for anything that is hashed or signed.
//!
//! 2. **Canonical-only hashing.** `DigestAlgorithm::digest()` accepts only
//!    `&CanonicalBytes`, and `ElementDigest` compares in constant time.
//!
//! 3. **Closed value type.** `ElementValue` is a tagged enum with an
//!    exhaustive set of variants, so the canonical encoding of every value
//!    is total and testable.
//!
//! 4. **UTC-only timestamps.** `Timestamp` enforces UTC with `Z` suffix and
//!    seconds precision.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `mdoc-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod canonical;
pub mod digest;
pub mod error;
pub mod hex;
pub mod identity;
pub mod salt;
pub mod temporal;
pub mod value;

// Re-export primary types for ergonomic imports.
pub use canonical::CanonicalBytes;
pub use digest::{DigestAlgorithm, ElementDigest};
pub use error::{CanonicalizationError, CoreError};
pub use identity::{DigestId, DocType, ElementIdentifier, Namespace};
pub use salt::{Salt, MIN_SALT_LEN};
pub use temporal::Timestamp;
pub use value::{ElementValue, ValueKind};
