//! Lowercase hex encoding for salts, digests, keys and signatures on the wire.

use crate::error::CoreError;

/// Render bytes as a lowercase hex string.
pub fn encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// Parse lowercase hex, the only form [`encode`] writes.
///
/// Uppercase digits, signs, whitespace and odd lengths are rejected so each
/// byte string has a single wire spelling.
pub fn decode(hex: &str) -> Result<Vec<u8>, CoreError> {
    if hex.len() % 2 != 0 {
        return Err(CoreError::HexDecode(format!(
            "hex string must have even length, got {}",
            hex.len()
        )));
    }
    hex.as_bytes()
        .chunks_exact(2)
        .enumerate()
        .map(|(i, pair)| match (nibble(pair[0]), nibble(pair[1])) {
            (Some(hi), Some(lo)) => Ok(hi << 4 | lo),
            _ => Err(CoreError::HexDecode(format!(
                "invalid lowercase hex at position {}",
                i * 2
            ))),
        })
        .collect()
}

fn nibble(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        _ => None,
    }
}

/// First four bytes as hex, for `Debug` output that must not dump secrets.
pub fn prefix(bytes: &[u8]) -> String {
    encode(&bytes[..bytes.len().min(4)])
}
