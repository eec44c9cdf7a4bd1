//! # Commitment Builder
//!
//! Issuer side of the protocol. Collects `(identifier, value)` pairs per
//! namespace, then on [`CommitmentBuilder::issue`]:
//!
//! 1. assigns every element a digest id unique within its namespace and a
//!    fresh CSPRNG salt,
//! 2. hashes the canonical encoding of each element,
//! 3. assembles the [`SecurityObject`] and signs it into an [`IssuerAuth`].
//!
//! Issuance is all-or-nothing. Every failure (duplicate digest id,
//! duplicate identifier, inverted validity window, scheme violation,
//! signing failure) aborts before anything is returned.

use std::collections::{BTreeMap, BTreeSet};

use mdoc_core::{
    DigestAlgorithm, DigestId, DocType, ElementIdentifier, ElementValue, Namespace, Timestamp,
    MIN_SALT_LEN,
};
use mdoc_crypto::{random_digest_id, random_salt, Ed25519PublicKey, KeyProvider};
use serde::{Deserialize, Serialize};

use crate::auth::IssuerAuth;
use crate::element::DataElement;
use crate::error::IssuanceError;
use crate::mso::{
    CommitmentList, DeviceKeyInfo, SecurityObject, ValidityInfo, ValidityWindow, MSO_VERSION,
};
use crate::scheme::CredentialScheme;

/// Upper bound on re-draws when a random digest id collides.
const MAX_RANDOM_ID_ATTEMPTS: usize = 64;

/// Default salt length in bytes.
pub const DEFAULT_SALT_LEN: usize = 32;

/// How digest ids are assigned to elements without an explicit one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DigestIdPolicy {
    /// 0, 1, 2, ... per namespace, skipping explicitly assigned ids.
    #[default]
    Sequential,
    /// Uniform random `u32`, re-drawn on collision. Hides element count
    /// and order from the commitment list.
    Random,
}

/// Issuance parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuancePolicy {
    /// Hash algorithm for every commitment.
    #[serde(default)]
    pub digest_algorithm: DigestAlgorithm,
    /// Salt length in bytes, at least 16.
    #[serde(default = "default_salt_len")]
    pub salt_len: usize,
    /// Digest id assignment.
    #[serde(default)]
    pub digest_ids: DigestIdPolicy,
}

fn default_salt_len() -> usize {
    DEFAULT_SALT_LEN
}

impl Default for IssuancePolicy {
    fn default() -> Self {
        Self {
            digest_algorithm: DigestAlgorithm::default(),
            salt_len: DEFAULT_SALT_LEN,
            digest_ids: DigestIdPolicy::default(),
        }
    }
}

impl IssuancePolicy {
    /// Reject salts shorter than the minimum.
    pub fn validate(&self) -> Result<(), IssuanceError> {
        if self.salt_len < MIN_SALT_LEN {
            return Err(IssuanceError::InvalidSaltLength(self.salt_len));
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
struct PendingElement {
    identifier: ElementIdentifier,
    value: ElementValue,
    digest_id: Option<DigestId>,
}

/// The issuer's output: every element for the holder to store, plus the
/// signed security object committing to them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssuedCredential {
    /// Doc type of the credential.
    pub doc_type: DocType,
    /// All issued elements per namespace, in insertion order.
    pub name_spaces: BTreeMap<Namespace, Vec<DataElement>>,
    /// The signed security object.
    pub issuer_auth: IssuerAuth,
}

impl IssuedCredential {
    /// The signed security object.
    pub fn security_object(&self) -> &SecurityObject {
        &self.issuer_auth.security_object
    }

    /// Look up an issued element.
    pub fn element(&self, namespace: &Namespace, identifier: &str) -> Option<&DataElement> {
        self.name_spaces
            .get(namespace)?
            .iter()
            .find(|e| e.element_identifier.as_str() == identifier)
    }

    /// Number of issued elements across namespaces.
    pub fn element_count(&self) -> usize {
        self.name_spaces.values().map(Vec::len).sum()
    }
}

/// Builds one credential.
///
/// ```ignore
/// let mut builder = CommitmentBuilder::for_scheme(&scheme, device_key, window);
/// builder.add_element(ns.clone(), tax_number, ElementValue::text("1337"));
/// let issued = builder.issue(&issuer_key)?;
/// ```
#[derive(Debug, Clone)]
pub struct CommitmentBuilder {
    doc_type: DocType,
    device_key: Ed25519PublicKey,
    validity: ValidityWindow,
    policy: IssuancePolicy,
    scheme: Option<CredentialScheme>,
    signed_at: Option<Timestamp>,
    namespaces: BTreeMap<Namespace, Vec<PendingElement>>,
}

impl CommitmentBuilder {
    /// Start a credential of `doc_type` bound to `device_key`.
    pub fn new(doc_type: DocType, device_key: Ed25519PublicKey, validity: ValidityWindow) -> Self {
        Self {
            doc_type,
            device_key,
            validity,
            policy: IssuancePolicy::default(),
            scheme: None,
            signed_at: None,
            namespaces: BTreeMap::new(),
        }
    }

    /// Start a credential that must conform to `scheme`.
    pub fn for_scheme(
        scheme: &CredentialScheme,
        device_key: Ed25519PublicKey,
        validity: ValidityWindow,
    ) -> Self {
        let mut builder = Self::new(scheme.doc_type.clone(), device_key, validity);
        builder.scheme = Some(scheme.clone());
        builder
    }

    /// Replace the issuance policy.
    pub fn with_policy(mut self, policy: IssuancePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Fix the signing time instead of reading the clock at issuance.
    pub fn signed_at(mut self, signed_at: Timestamp) -> Self {
        self.signed_at = Some(signed_at);
        self
    }

    /// Queue an element; its digest id is assigned by the policy.
    pub fn add_element(
        &mut self,
        namespace: Namespace,
        identifier: ElementIdentifier,
        value: ElementValue,
    ) -> &mut Self {
        self.push(namespace, identifier, value, None)
    }

    /// Queue an element with a caller-chosen digest id.
    pub fn add_element_with_digest_id(
        &mut self,
        namespace: Namespace,
        identifier: ElementIdentifier,
        value: ElementValue,
        digest_id: DigestId,
    ) -> &mut Self {
        self.push(namespace, identifier, value, Some(digest_id))
    }

    /// Queue every pair in `elements` under `namespace`, in order.
    pub fn add_namespace<I>(&mut self, namespace: Namespace, elements: I) -> &mut Self
    where
        I: IntoIterator<Item = (ElementIdentifier, ElementValue)>,
    {
        for (identifier, value) in elements {
            self.push(namespace.clone(), identifier, value, None);
        }
        self
    }

    fn push(
        &mut self,
        namespace: Namespace,
        identifier: ElementIdentifier,
        value: ElementValue,
        digest_id: Option<DigestId>,
    ) -> &mut Self {
        self.namespaces.entry(namespace).or_default().push(PendingElement {
            identifier,
            value,
            digest_id,
        });
        self
    }

    /// Salt, hash and sign everything queued.
    pub fn issue(&self, issuer: &dyn KeyProvider) -> Result<IssuedCredential, IssuanceError> {
        self.policy.validate()?;
        let window = ValidityWindow::new(self.validity.valid_from, self.validity.valid_until)?;
        if self.namespaces.values().all(Vec::is_empty) {
            return Err(IssuanceError::NoElements);
        }
        self.check_scheme()?;

        let algorithm = self.policy.digest_algorithm;
        let mut name_spaces = BTreeMap::new();
        let mut value_digests = BTreeMap::new();

        for (namespace, pending) in &self.namespaces {
            let ids = self.assign_digest_ids(namespace, pending)?;
            let mut elements = Vec::with_capacity(pending.len());
            let mut commitments = CommitmentList::new();

            for (item, digest_id) in pending.iter().zip(ids) {
                let random = random_salt(self.policy.salt_len).map_err(IssuanceError::Randomness)?;
                let element = DataElement {
                    digest_id,
                    random,
                    element_identifier: item.identifier.clone(),
                    element_value: item.value.clone(),
                };
                commitments.insert(digest_id, element.digest(algorithm)?);
                elements.push(element);
            }

            tracing::debug!(
                namespace = %namespace,
                elements = elements.len(),
                "committed namespace"
            );
            value_digests.insert(namespace.clone(), commitments);
            name_spaces.insert(namespace.clone(), elements);
        }

        let security_object = SecurityObject {
            version: MSO_VERSION.to_string(),
            digest_algorithm: algorithm,
            doc_type: self.doc_type.clone(),
            value_digests,
            device_key_info: DeviceKeyInfo {
                device_key: self.device_key.clone(),
            },
            validity_info: ValidityInfo {
                signed: self.signed_at.unwrap_or_else(Timestamp::now),
                valid_from: window.valid_from,
                valid_until: window.valid_until,
            },
        };
        let issuer_auth = IssuerAuth::sign(security_object, issuer)?;

        let issued = IssuedCredential {
            doc_type: self.doc_type.clone(),
            name_spaces,
            issuer_auth,
        };
        tracing::info!(
            doc_type = %issued.doc_type,
            elements = issued.element_count(),
            digest_algorithm = %algorithm,
            provider = issuer.provider_name(),
            "issued credential"
        );
        Ok(issued)
    }

    fn check_scheme(&self) -> Result<(), IssuanceError> {
        let Some(scheme) = &self.scheme else {
            return Ok(());
        };
        scheme.check_doc_type(&self.doc_type)?;
        for (namespace, pending) in &self.namespaces {
            for item in pending {
                scheme.check_element(namespace, &item.identifier, &item.value)?;
            }
        }
        let supplied = self
            .namespaces
            .get(&scheme.namespace)
            .into_iter()
            .flatten()
            .map(|p| &p.identifier);
        scheme.check_required(supplied)?;
        Ok(())
    }

    /// Digest ids for `pending`, in order. Explicit ids are kept and must
    /// not collide; the rest follow the policy and avoid every taken id.
    fn assign_digest_ids(
        &self,
        namespace: &Namespace,
        pending: &[PendingElement],
    ) -> Result<Vec<DigestId>, IssuanceError> {
        let mut identifiers = BTreeSet::new();
        let mut taken = BTreeSet::new();
        for item in pending {
            if !identifiers.insert(&item.identifier) {
                return Err(IssuanceError::DuplicateIdentifier {
                    namespace: namespace.clone(),
                    identifier: item.identifier.clone(),
                });
            }
            if let Some(id) = item.digest_id {
                if !taken.insert(id) {
                    return Err(IssuanceError::DuplicateDigestId {
                        namespace: namespace.clone(),
                        digest_id: id,
                    });
                }
            }
        }

        let mut next = 0u32;
        let mut ids = Vec::with_capacity(pending.len());
        for item in pending {
            let id = match (item.digest_id, self.policy.digest_ids) {
                (Some(id), _) => id,
                (None, DigestIdPolicy::Sequential) => {
                    while taken.contains(&DigestId(next)) {
                        next = next.checked_add(1).ok_or_else(|| IssuanceError::DuplicateDigestId {
                            namespace: namespace.clone(),
                            digest_id: DigestId(next),
                        })?;
                    }
                    let id = DigestId(next);
                    taken.insert(id);
                    id
                }
                (None, DigestIdPolicy::Random) => {
                    let mut drawn = random_digest_id();
                    let mut attempts = 1;
                    while !taken.insert(drawn) {
                        if attempts >= MAX_RANDOM_ID_ATTEMPTS {
                            return Err(IssuanceError::DuplicateDigestId {
                                namespace: namespace.clone(),
                                digest_id: drawn,
                            });
                        }
                        drawn = random_digest_id();
                        attempts += 1;
                    }
                    drawn
                }
            };
            ids.push(id);
        }
        Ok(ids)
    }
}
