//! # Verifier
//!
//! Checks a presented [`Document`] against the issuer's public key.
//! Short-circuits on the first failure, in this order:
//!
//! 1. Issuer signature over the security object.
//! 2. Doc type and validity window.
//! 3. Device signature, with the device key from the authenticated security
//!    object. A key supplied by the presenter is never used.
//! 4. Every disclosed element: recompute its digest and compare it with the
//!    commitment under its digest id.
//! 5. Required claims, if the policy names any.
//!
//! ## Security Invariant
//!
//! A result is either a complete [`VerifiedDocument`] or one tagged
//! [`VerificationError`]. One bad element rejects the whole document.
//! Undisclosed commitments are never inspected.
//!
//! ## States
//!
//! ```text
//! Idle ──▶ ChecksRunning ──▶ Verified        (terminal)
//!                       └──▶ Rejected(reason) (terminal)
//! ```

use std::collections::{BTreeMap, BTreeSet};

use mdoc_core::{DocType, ElementIdentifier, ElementValue, Namespace, Timestamp};
use mdoc_crypto::Ed25519PublicKey;
use serde::{Deserialize, Serialize};

use crate::auth::SessionTranscript;
use crate::envelope::{DeviceResponse, Document};
use crate::error::{RejectionReason, VerificationError};
use crate::mso::SecurityObject;
use crate::scheme::CredentialScheme;

/// Disclosed values per namespace and identifier.
pub type Claims = BTreeMap<Namespace, BTreeMap<ElementIdentifier, ElementValue>>;

/// Caller-tunable verification settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationPolicy {
    /// Identifiers that must be disclosed, per namespace.
    #[serde(default)]
    pub required_claims: BTreeMap<Namespace, BTreeSet<ElementIdentifier>>,
    /// Tolerance applied to both ends of the validity window.
    #[serde(default)]
    pub clock_skew_secs: u32,
    /// Transcript the device signature must be bound to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_transcript: Option<SessionTranscript>,
}

impl VerificationPolicy {
    /// Require `identifier` in `namespace`.
    pub fn require(mut self, namespace: Namespace, identifier: ElementIdentifier) -> Self {
        self.required_claims.entry(namespace).or_default().insert(identifier);
        self
    }

    /// Expect device signatures bound to `transcript`.
    pub fn with_session_transcript(mut self, transcript: SessionTranscript) -> Self {
        self.session_transcript = Some(transcript);
        self
    }

    /// Allow `secs` of clock skew.
    pub fn with_clock_skew(mut self, secs: u32) -> Self {
        self.clock_skew_secs = secs;
        self
    }
}

/// A fully verified document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifiedDocument {
    /// Doc type of the credential.
    pub doc_type: DocType,
    /// Disclosed claims, every one matched to its commitment.
    pub claims: Claims,
    /// Start of the validity window.
    pub valid_from: Timestamp,
    /// End of the validity window.
    pub valid_until: Timestamp,
    /// When the issuer signed the security object.
    pub signed_at: Timestamp,
    /// The device key the disclosure was bound to.
    pub device_key: Ed25519PublicKey,
}

impl VerifiedDocument {
    /// A disclosed value.
    pub fn claim(&self, namespace: &Namespace, identifier: &str) -> Option<&ElementValue> {
        self.claims.get(namespace)?.get(identifier)
    }

    /// Number of disclosed claims across namespaces.
    pub fn claim_count(&self) -> usize {
        self.claims.values().map(BTreeMap::len).sum()
    }
}

/// Verifies documents of one doc type from one issuer.
#[derive(Debug, Clone)]
pub struct Verifier {
    doc_type: DocType,
    issuer_key: Ed25519PublicKey,
    policy: VerificationPolicy,
}

impl Verifier {
    /// Accept `doc_type` signed by `issuer_key`.
    pub fn new(doc_type: DocType, issuer_key: Ed25519PublicKey) -> Self {
        Self {
            doc_type,
            issuer_key,
            policy: VerificationPolicy::default(),
        }
    }

    /// Accept the scheme's doc type signed by `issuer_key`.
    pub fn for_scheme(scheme: &CredentialScheme, issuer_key: Ed25519PublicKey) -> Self {
        Self::new(scheme.doc_type.clone(), issuer_key)
    }

    /// Replace the policy.
    pub fn with_policy(mut self, policy: VerificationPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Add the scheme's required attributes to the required claims.
    pub fn require_scheme_claims(mut self, scheme: &CredentialScheme) -> Self {
        for (namespace, identifiers) in scheme.required_claims() {
            self.policy
                .required_claims
                .entry(namespace)
                .or_default()
                .extend(identifiers);
        }
        self
    }

    /// The active policy.
    pub fn policy(&self) -> &VerificationPolicy {
        &self.policy
    }

    /// Verify against the current time.
    pub fn verify(&self, document: &Document) -> Result<VerifiedDocument, VerificationError> {
        self.verify_at(document, Timestamp::now())
    }

    /// Verify with `now` as the reference time.
    pub fn verify_at(
        &self,
        document: &Document,
        now: Timestamp,
    ) -> Result<VerifiedDocument, VerificationError> {
        match self.run_checks(document, now) {
            Ok(verified) => {
                tracing::info!(
                    doc_type = %verified.doc_type,
                    claims = verified.claim_count(),
                    "document verified"
                );
                Ok(verified)
            }
            Err(e) => {
                tracing::warn!(
                    doc_type = %document.doc_type,
                    reason = %e.reason(),
                    error = %e,
                    "document rejected"
                );
                Err(e)
            }
        }
    }

    /// Verify the document of this verifier's doc type in `response`.
    pub fn verify_response(
        &self,
        response: &DeviceResponse,
    ) -> Result<VerifiedDocument, VerificationError> {
        self.verify_response_at(response, Timestamp::now())
    }

    /// [`Verifier::verify_response`] with an explicit reference time.
    pub fn verify_response_at(
        &self,
        response: &DeviceResponse,
        now: Timestamp,
    ) -> Result<VerifiedDocument, VerificationError> {
        let document = response.document(&self.doc_type).ok_or_else(|| {
            tracing::warn!(
                doc_type = %self.doc_type,
                status = response.status.0,
                "document not returned"
            );
            VerificationError::DocumentNotReturned(self.doc_type.clone())
        })?;
        self.verify_at(document, now)
    }

    fn run_checks(
        &self,
        document: &Document,
        now: Timestamp,
    ) -> Result<VerifiedDocument, VerificationError> {
        let mso = document.issuer_signed.issuer_auth.verify(&self.issuer_key)?;
        tracing::debug!(doc_type = %mso.doc_type, "issuer signature verified");

        self.check_doc_type(&document.doc_type)?;
        self.check_doc_type(&mso.doc_type)?;
        self.check_validity(mso, now)?;

        document.device_signed.device_auth.verify(
            &mso.doc_type,
            self.policy.session_transcript.as_ref(),
            mso.device_key(),
        )?;
        tracing::debug!(doc_type = %mso.doc_type, "device signature verified");

        let claims = check_digests(document, mso)?;
        self.check_required(&claims)?;

        Ok(VerifiedDocument {
            doc_type: mso.doc_type.clone(),
            claims,
            valid_from: mso.validity_info.valid_from,
            valid_until: mso.validity_info.valid_until,
            signed_at: mso.validity_info.signed,
            device_key: mso.device_key().clone(),
        })
    }

    fn check_doc_type(&self, actual: &DocType) -> Result<(), VerificationError> {
        if actual != &self.doc_type {
            return Err(VerificationError::DocTypeMismatch {
                expected: self.doc_type.clone(),
                actual: actual.clone(),
            });
        }
        Ok(())
    }

    fn check_validity(
        &self,
        mso: &SecurityObject,
        now: Timestamp,
    ) -> Result<(), VerificationError> {
        let skew = i64::from(self.policy.clock_skew_secs);
        let info = &mso.validity_info;
        if now.plus_secs(skew) < info.valid_from {
            return Err(VerificationError::NotYetValid {
                valid_from: info.valid_from,
                now,
            });
        }
        if now.plus_secs(-skew) > info.valid_until {
            return Err(VerificationError::Expired {
                valid_until: info.valid_until,
                now,
            });
        }
        Ok(())
    }

    fn check_required(&self, claims: &Claims) -> Result<(), VerificationError> {
        for (namespace, identifiers) in &self.policy.required_claims {
            let disclosed = claims.get(namespace);
            for identifier in identifiers {
                if !disclosed.is_some_and(|c| c.contains_key(identifier)) {
                    return Err(VerificationError::RequiredClaimMissing {
                        namespace: namespace.clone(),
                        identifier: identifier.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}

/// Match every disclosed element to its commitment.
fn check_digests(document: &Document, mso: &SecurityObject) -> Result<Claims, VerificationError> {
    let mut claims = Claims::new();
    for (namespace, elements) in &document.issuer_signed.name_spaces {
        let commitments = mso.value_digests.get(namespace);
        let mut seen = BTreeSet::new();
        let mut disclosed = BTreeMap::new();
        for element in elements {
            if !seen.insert(element.digest_id) {
                return Err(VerificationError::DuplicateDisclosure {
                    namespace: namespace.clone(),
                    digest_id: element.digest_id,
                });
            }
            let committed = commitments
                .and_then(|c| c.get(&element.digest_id))
                .ok_or_else(|| VerificationError::UnknownDigestId {
                    namespace: namespace.clone(),
                    digest_id: element.digest_id,
                })?;
            if !committed.ct_eq(&element.digest(mso.digest_algorithm)?) {
                return Err(VerificationError::DigestMismatch {
                    namespace: namespace.clone(),
                    digest_id: element.digest_id,
                    identifier: element.element_identifier.clone(),
                });
            }
            disclosed.insert(element.element_identifier.clone(), element.element_value.clone());
        }
        tracing::debug!(namespace = %namespace, elements = disclosed.len(), "digests matched");
        claims.insert(namespace.clone(), disclosed);
    }
    Ok(claims)
}

// ─── Verification Attempt ────────────────────────────────────────────

/// Where a verification attempt stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VerificationState {
    /// Not started.
    Idle,
    /// Checks in progress.
    ChecksRunning,
    /// All checks passed (terminal).
    Verified,
    /// A check failed (terminal).
    Rejected(RejectionReason),
}

impl VerificationState {
    /// Whether this state is terminal.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Verified | Self::Rejected(_))
    }
}

impl std::fmt::Display for VerificationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => f.write_str("IDLE"),
            Self::ChecksRunning => f.write_str("CHECKS_RUNNING"),
            Self::Verified => f.write_str("VERIFIED"),
            Self::Rejected(reason) => write!(f, "REJECTED({reason})"),
        }
    }
}

/// One-shot verification with an observable state.
///
/// There are no retries: a finished attempt refuses to run again, and the
/// caller starts a new attempt after re-requesting the disclosure.
#[derive(Debug, Clone)]
pub struct VerificationAttempt {
    state: VerificationState,
}

impl Default for VerificationAttempt {
    fn default() -> Self {
        Self::new()
    }
}

impl VerificationAttempt {
    /// A fresh attempt in [`VerificationState::Idle`].
    pub fn new() -> Self {
        Self {
            state: VerificationState::Idle,
        }
    }

    /// Current state.
    pub fn state(&self) -> VerificationState {
        self.state
    }

    /// Run every check once.
    pub fn run(
        &mut self,
        verifier: &Verifier,
        document: &Document,
        now: Timestamp,
    ) -> Result<VerifiedDocument, VerificationError> {
        if self.state != VerificationState::Idle {
            return Err(VerificationError::InvalidTransition {
                from: self.state.to_string(),
                to: VerificationState::ChecksRunning.to_string(),
            });
        }
        self.state = VerificationState::ChecksRunning;
        let result = verifier.verify_at(document, now);
        self.state = match &result {
            Ok(_) => VerificationState::Verified,
            Err(e) => VerificationState::Rejected(e.reason()),
        };
        result
    }
}
