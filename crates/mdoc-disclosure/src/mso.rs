//! # Mobile Security Object
//!
//! The issuer-signed commitment manifest. For every namespace it maps each
//! digest id to the digest of the element it commits to, and binds those
//! commitments to a doc type, a holder device key and a validity window.
//!
//! The security object is immutable once signed: [`crate::IssuerAuth`]
//! signs its canonical bytes, so any change to any field invalidates the
//! issuer signature.

use std::collections::BTreeMap;

use mdoc_core::{DigestAlgorithm, DigestId, DocType, ElementDigest, Namespace, Timestamp};
use mdoc_crypto::Ed25519PublicKey;
use serde::{Deserialize, Serialize};

use crate::error::IssuanceError;

/// Version string of the security object format.
pub const MSO_VERSION: &str = "1.0";

/// Commitments for one namespace: digest id to element digest.
pub type CommitmentList = BTreeMap<DigestId, ElementDigest>;

/// The interval during which a credential may be accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidityWindow {
    /// First instant of validity.
    pub valid_from: Timestamp,
    /// Last instant of validity.
    pub valid_until: Timestamp,
}

impl ValidityWindow {
    /// Build a window, rejecting `valid_until < valid_from`.
    pub fn new(valid_from: Timestamp, valid_until: Timestamp) -> Result<Self, IssuanceError> {
        if valid_until < valid_from {
            return Err(IssuanceError::InvalidValidityWindow {
                valid_from,
                valid_until,
            });
        }
        Ok(Self {
            valid_from,
            valid_until,
        })
    }

    /// Whether `now` lies inside the window, both ends inclusive.
    pub fn contains(&self, now: Timestamp) -> bool {
        self.valid_from <= now && now <= self.valid_until
    }
}

/// Signing time and validity window, as carried in the security object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidityInfo {
    /// When the issuer signed the security object.
    pub signed: Timestamp,
    /// First instant of validity.
    pub valid_from: Timestamp,
    /// Last instant of validity.
    pub valid_until: Timestamp,
}

impl ValidityInfo {
    /// The validity window without the signing time.
    pub fn window(&self) -> ValidityWindow {
        ValidityWindow {
            valid_from: self.valid_from,
            valid_until: self.valid_until,
        }
    }
}

/// The holder key the credential is bound to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceKeyInfo {
    /// Public key that must verify every device signature.
    pub device_key: Ed25519PublicKey,
}

/// The issuer-signed commitment manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityObject {
    /// Format version, [`MSO_VERSION`].
    pub version: String,
    /// Hash algorithm used for every commitment.
    pub digest_algorithm: DigestAlgorithm,
    /// Doc type of the credential.
    pub doc_type: DocType,
    /// Commitments per namespace.
    pub value_digests: BTreeMap<Namespace, CommitmentList>,
    /// Holder key binding.
    pub device_key_info: DeviceKeyInfo,
    /// Signing time and validity window.
    pub validity_info: ValidityInfo,
}

impl SecurityObject {
    /// The committed digest for `digest_id` in `namespace`, if any.
    pub fn commitment(&self, namespace: &Namespace, digest_id: DigestId) -> Option<&ElementDigest> {
        self.value_digests.get(namespace)?.get(&digest_id)
    }

    /// The bound holder key.
    pub fn device_key(&self) -> &Ed25519PublicKey {
        &self.device_key_info.device_key
    }

    /// Total number of commitments across namespaces.
    pub fn commitment_count(&self) -> usize {
        self.value_digests.values().map(BTreeMap::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mdoc_crypto::Ed25519KeyPair;

    fn ts(s: &str) -> Timestamp {
        Timestamp::parse(s).expect("valid timestamp")
    }

    #[test]
    fn window_rejects_inverted_bounds() {
        let err = ValidityWindow::new(ts("2030-01-02T00:00:00Z"), ts("2030-01-01T00:00:00Z"))
            .unwrap_err();
        assert!(matches!(err, IssuanceError::InvalidValidityWindow { .. }));
    }

    #[test]
    fn window_bounds_are_inclusive() {
        let from = ts("2030-01-01T00:00:00Z");
        let until = ts("2030-12-31T23:59:59Z");
        let w = ValidityWindow::new(from, until).expect("valid window");
        assert!(w.contains(from));
        assert!(w.contains(until));
        assert!(!w.contains(until.plus_secs(1)));
        assert!(!w.contains(from.plus_secs(-1)));

        let instant = ValidityWindow::new(from, from).expect("valid window");
        assert!(instant.contains(from));
    }

    #[test]
    fn wire_names() {
        let ns = Namespace::new("eu.europa.finance.taxid.1").expect("valid namespace");
        let mut list = CommitmentList::new();
        list.insert(DigestId(0), ElementDigest::from_bytes(vec![0xaa; 32]));
        let mso = SecurityObject {
            version: MSO_VERSION.to_string(),
            digest_algorithm: DigestAlgorithm::Sha256,
            doc_type: DocType::new("Tax Number").expect("valid doc type"),
            value_digests: BTreeMap::from([(ns.clone(), list)]),
            device_key_info: DeviceKeyInfo {
                device_key: Ed25519KeyPair::from_seed(&[1u8; 32]).public_key(),
            },
            validity_info: ValidityInfo {
                signed: ts("2030-01-01T00:00:00Z"),
                valid_from: ts("2030-01-01T00:00:00Z"),
                valid_until: ts("2031-01-01T00:00:00Z"),
            },
        };

        let json = serde_json::to_value(&mso).unwrap();
        assert_eq!(json["digestAlgorithm"], "SHA-256");
        assert_eq!(json["validityInfo"]["validUntil"], "2031-01-01T00:00:00Z");
        assert!(json["deviceKeyInfo"]["deviceKey"].is_string());
        assert_eq!(json["valueDigests"][ns.as_str()]["0"], "aa".repeat(32));

        let back: SecurityObject = serde_json::from_value(json).unwrap();
        assert_eq!(back, mso);
        assert_eq!(back.commitment_count(), 1);
        assert!(back.commitment(&ns, DigestId(0)).is_some());
        assert!(back.commitment(&ns, DigestId(1)).is_none());
    }
}
