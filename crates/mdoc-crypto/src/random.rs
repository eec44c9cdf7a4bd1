//! # Issuance Randomness
//!
//! Salts and random digest identifiers, both drawn from the OS CSPRNG.

use mdoc_core::{DigestId, Salt, MIN_SALT_LEN};
use rand::rngs::OsRng;
use rand::RngCore;

use crate::error::CryptoError;

/// Draw a fresh salt of `len` bytes.
///
/// Fails if `len` is below [`MIN_SALT_LEN`] or the OS RNG is unavailable.
pub fn random_salt(len: usize) -> Result<Salt, CryptoError> {
    if len < MIN_SALT_LEN {
        return Err(CryptoError::Randomness(format!(
            "salt length {len} is below the minimum of {MIN_SALT_LEN} bytes"
        )));
    }
    let mut bytes = vec![0u8; len];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|e| CryptoError::Randomness(e.to_string()))?;
    Salt::from_bytes(bytes).map_err(|e| CryptoError::Randomness(e.to_string()))
}

/// Draw a uniformly random digest identifier.
pub fn random_digest_id() -> DigestId {
    DigestId(OsRng.next_u32())
}
