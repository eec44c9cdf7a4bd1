//! # Data Elements
//!
//! A `DataElement` is one issuer-signed item: an identifier, its value, the
//! salt mixed into its commitment, and the digest id that links it to the
//! security object.
//!
//! ## Canonical Encoding
//!
//! The commitment hash input is the JCS encoding of the whole element:
//!
//! ```text
//! {"digestID":0,"elementIdentifier":"tax_number","elementValue":{"type":"text","value":"1337"},"random":"<hex>"}
//! ```
//!
//! All four fields participate, so changing the value, the salt, the
//! identifier or the digest id each changes the hash.

use mdoc_core::{
    CanonicalBytes, CanonicalizationError, DigestAlgorithm, DigestId, ElementDigest,
    ElementIdentifier, ElementValue, Salt,
};
use serde::{Deserialize, Serialize};

/// One issuer-signed data element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataElement {
    /// Key into the namespace's commitment list.
    #[serde(rename = "digestID")]
    pub digest_id: DigestId,
    /// Issuer-generated salt.
    pub random: Salt,
    /// The attribute name.
    #[serde(rename = "elementIdentifier")]
    pub element_identifier: ElementIdentifier,
    /// The attribute value.
    #[serde(rename = "elementValue")]
    pub element_value: ElementValue,
}

impl DataElement {
    /// The deterministic byte encoding hashed into the commitment.
    pub fn canonical_bytes(&self) -> Result<CanonicalBytes, CanonicalizationError> {
        CanonicalBytes::new(self)
    }

    /// Hash the canonical encoding with `algorithm`.
    pub fn digest(
        &self,
        algorithm: DigestAlgorithm,
    ) -> Result<ElementDigest, CanonicalizationError> {
        Ok(algorithm.digest(&self.canonical_bytes()?))
    }
}
