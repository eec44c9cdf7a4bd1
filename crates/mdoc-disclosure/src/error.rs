//! # Error Types
//!
//! One error enum per protocol phase, mirroring who can act on the failure:
//!
//! - [`SchemeError`]: a credential scheme is malformed or an attribute set
//!   does not conform to it.
//! - [`IssuanceError`]: issuance aborted; nothing was produced.
//! - [`StoreError`]: the holder refused to store a credential.
//! - [`DisclosureError`]: the holder could not answer a request. Recoverable;
//!   the caller may adjust the request.
//! - [`VerificationError`]: terminal for one verification attempt. Every
//!   variant names the specific reason so callers can alert per reason.

use mdoc_core::{
    CanonicalizationError, CoreError, DigestId, DocType, ElementIdentifier, Namespace, Timestamp,
    ValueKind,
};
use mdoc_crypto::CryptoError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors loading, validating or applying a credential scheme.
#[derive(Error, Debug)]
pub enum SchemeError {
    /// The scheme definition itself is invalid.
    #[error("invalid credential scheme: {0}")]
    Invalid(String),

    /// An identifier in the scheme failed validation.
    #[error("invalid identifier in credential scheme: {0}")]
    Identifier(#[from] CoreError),

    /// The scheme file could not be read.
    #[error("failed to read scheme file {path}: {source}")]
    Io {
        /// Path that was being read.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// YAML parsing failed.
    #[error("YAML scheme parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON parsing failed.
    #[error("JSON scheme parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// Issuance targeted a different document type than the scheme's.
    #[error("doc type {actual} does not match scheme doc type {expected}")]
    DocTypeMismatch {
        /// The scheme's doc type.
        expected: DocType,
        /// The doc type being issued.
        actual: DocType,
    },

    /// An element was placed in a namespace the scheme does not define.
    #[error("namespace {0} is not defined by the credential scheme")]
    UnknownNamespace(Namespace),

    /// An element identifier is not in the scheme's attribute catalog.
    #[error("attribute {identifier} is not defined in namespace {namespace}")]
    UnknownAttribute {
        /// Namespace of the element.
        namespace: Namespace,
        /// The unknown identifier.
        identifier: ElementIdentifier,
    },

    /// An element value has a different shape than the scheme declares.
    #[error("attribute {identifier} must be {expected}, got {actual}")]
    ValueKindMismatch {
        /// The attribute identifier.
        identifier: ElementIdentifier,
        /// Declared kind.
        expected: ValueKind,
        /// Supplied kind.
        actual: ValueKind,
    },

    /// A required attribute was not supplied.
    #[error("required attribute {identifier} missing from namespace {namespace}")]
    MissingRequiredAttribute {
        /// Namespace of the attribute.
        namespace: Namespace,
        /// The missing identifier.
        identifier: ElementIdentifier,
    },
}

/// Errors aborting issuance.
#[derive(Error, Debug)]
pub enum IssuanceError {
    /// Two elements in one namespace carry the same digest identifier.
    #[error("duplicate digest id {digest_id} in namespace {namespace}")]
    DuplicateDigestId {
        /// Namespace where the collision occurred.
        namespace: Namespace,
        /// The colliding identifier.
        digest_id: DigestId,
    },

    /// The same element identifier was supplied twice in one namespace.
    #[error("duplicate element identifier {identifier} in namespace {namespace}")]
    DuplicateIdentifier {
        /// Namespace where the duplicate occurred.
        namespace: Namespace,
        /// The duplicated identifier.
        identifier: ElementIdentifier,
    },

    /// `valid_until` precedes `valid_from`.
    #[error("invalid validity window: valid_until {valid_until} is before valid_from {valid_from}")]
    InvalidValidityWindow {
        /// Start of the window.
        valid_from: Timestamp,
        /// End of the window.
        valid_until: Timestamp,
    },

    /// The configured salt length is below the minimum.
    #[error("salt length {0} is below the minimum of 16 bytes")]
    InvalidSaltLength(usize),

    /// Nothing to issue.
    #[error("credential has no data elements")]
    NoElements,

    /// The issuer signing capability failed.
    #[error("issuer signing failed: {0}")]
    SigningFailed(#[source] CryptoError),

    /// Salt generation failed.
    #[error("randomness unavailable: {0}")]
    Randomness(#[source] CryptoError),

    /// Canonical encoding failed.
    #[error("canonicalization failed: {0}")]
    Canonicalization(#[from] CanonicalizationError),

    /// The attribute set does not conform to the attached scheme.
    #[error("scheme conformance failed: {0}")]
    Scheme(#[from] SchemeError),
}

/// Errors refusing a credential into the holder store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Held elements do not match the security object they came with.
    #[error("inconsistent credential: {0}")]
    InconsistentCredential(String),

    /// Canonical encoding of a held element failed.
    #[error("canonicalization failed: {0}")]
    Canonicalization(#[from] CanonicalizationError),
}

/// Errors producing a disclosure.
#[derive(Error, Debug)]
pub enum DisclosureError {
    /// The holder has no credential of the requested document type.
    #[error("no credential held for doc type {0}")]
    UnknownDocType(DocType),

    /// Nothing held matches the request for a namespace it names.
    #[error("no held elements match the request for namespace {namespace}")]
    NoMatchingElements {
        /// The namespace with an empty intersection.
        namespace: Namespace,
    },

    /// The reader authentication signature on a request did not verify.
    #[error("reader authentication failed: {0}")]
    ReaderAuthInvalid(String),

    /// The device (or reader) signing capability failed.
    #[error("signing failed: {0}")]
    SigningFailed(#[source] CryptoError),

    /// A request or device authentication payload could not be canonicalized.
    #[error("canonicalization failed: {0}")]
    Canonicalization(#[from] CanonicalizationError),
}

/// Why a verification attempt was rejected, without the details.
///
/// Stable tag for metrics, alerting and the [`crate::VerificationState`]
/// machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionReason {
    /// See [`VerificationError::IssuerSignatureInvalid`].
    IssuerSignatureInvalid,
    /// See [`VerificationError::DeviceSignatureInvalid`].
    DeviceSignatureInvalid,
    /// See [`VerificationError::DocTypeMismatch`].
    DocTypeMismatch,
    /// See [`VerificationError::Expired`].
    Expired,
    /// See [`VerificationError::NotYetValid`].
    NotYetValid,
    /// See [`VerificationError::DigestMismatch`].
    DigestMismatch,
    /// See [`VerificationError::UnknownDigestId`].
    UnknownDigestId,
    /// See [`VerificationError::DuplicateDisclosure`].
    DuplicateDisclosure,
    /// See [`VerificationError::RequiredClaimMissing`].
    RequiredClaimMissing,
    /// See [`VerificationError::DocumentNotReturned`].
    DocumentNotReturned,
    /// See [`VerificationError::Canonicalization`].
    Canonicalization,
    /// See [`VerificationError::InvalidTransition`].
    InvalidTransition,
}

impl RejectionReason {
    /// Stable snake_case tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::IssuerSignatureInvalid => "issuer_signature_invalid",
            Self::DeviceSignatureInvalid => "device_signature_invalid",
            Self::DocTypeMismatch => "doc_type_mismatch",
            Self::Expired => "expired",
            Self::NotYetValid => "not_yet_valid",
            Self::DigestMismatch => "digest_mismatch",
            Self::UnknownDigestId => "unknown_digest_id",
            Self::DuplicateDisclosure => "duplicate_disclosure",
            Self::RequiredClaimMissing => "required_claim_missing",
            Self::DocumentNotReturned => "document_not_returned",
            Self::Canonicalization => "canonicalization",
            Self::InvalidTransition => "invalid_transition",
        }
    }
}

impl std::fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors rejecting a presented document.
#[derive(Error, Debug)]
pub enum VerificationError {
    /// The issuer signature over the security object did not verify.
    #[error("issuer signature invalid: {0}")]
    IssuerSignatureInvalid(String),

    /// The device signature did not verify with the key bound in the
    /// security object.
    #[error("device signature invalid: {0}")]
    DeviceSignatureInvalid(String),

    /// The document is not of the expected type.
    #[error("doc type mismatch: expected {expected}, got {actual}")]
    DocTypeMismatch {
        /// Doc type the verifier was configured for.
        expected: DocType,
        /// Doc type found in the document or security object.
        actual: DocType,
    },

    /// The security object's validity window has ended.
    #[error("credential expired: valid until {valid_until}, now {now}")]
    Expired {
        /// End of the validity window.
        valid_until: Timestamp,
        /// Verification time.
        now: Timestamp,
    },

    /// The security object's validity window has not started.
    #[error("credential not yet valid: valid from {valid_from}, now {now}")]
    NotYetValid {
        /// Start of the validity window.
        valid_from: Timestamp,
        /// Verification time.
        now: Timestamp,
    },

    /// A disclosed element does not hash to its commitment.
    #[error("digest mismatch for {identifier} (digest id {digest_id}) in namespace {namespace}")]
    DigestMismatch {
        /// Namespace of the element.
        namespace: Namespace,
        /// Digest id claimed by the element.
        digest_id: DigestId,
        /// Identifier claimed by the element.
        identifier: ElementIdentifier,
    },

    /// A disclosed element's digest id has no commitment.
    #[error("unknown digest id {digest_id} in namespace {namespace}")]
    UnknownDigestId {
        /// Namespace of the element.
        namespace: Namespace,
        /// The uncommitted digest id.
        digest_id: DigestId,
    },

    /// The same digest id was disclosed more than once in a namespace.
    #[error("digest id {digest_id} disclosed more than once in namespace {namespace}")]
    DuplicateDisclosure {
        /// Namespace of the elements.
        namespace: Namespace,
        /// The repeated digest id.
        digest_id: DigestId,
    },

    /// A claim the verifier requires was not disclosed.
    #[error("required claim {identifier} missing from namespace {namespace}")]
    RequiredClaimMissing {
        /// Namespace of the claim.
        namespace: Namespace,
        /// The missing identifier.
        identifier: ElementIdentifier,
    },

    /// A device response carried no document of the expected type.
    #[error("no document of type {0} in the response")]
    DocumentNotReturned(DocType),

    /// A disclosed element could not be canonicalized for hashing.
    #[error("canonicalization failed: {0}")]
    Canonicalization(#[from] CanonicalizationError),

    /// A verification attempt was driven from a state that does not allow it.
    #[error("invalid verification transition: {from} -> {to}")]
    InvalidTransition {
        /// Current state.
        from: String,
        /// Attempted target state.
        to: String,
    },
}

impl VerificationError {
    /// The detail-free reason tag for this error.
    pub fn reason(&self) -> RejectionReason {
        match self {
            Self::IssuerSignatureInvalid(_) => RejectionReason::IssuerSignatureInvalid,
            Self::DeviceSignatureInvalid(_) => RejectionReason::DeviceSignatureInvalid,
            Self::DocTypeMismatch { .. } => RejectionReason::DocTypeMismatch,
            Self::Expired { .. } => RejectionReason::Expired,
            Self::NotYetValid { .. } => RejectionReason::NotYetValid,
            Self::DigestMismatch { .. } => RejectionReason::DigestMismatch,
            Self::UnknownDigestId { .. } => RejectionReason::UnknownDigestId,
            Self::DuplicateDisclosure { .. } => RejectionReason::DuplicateDisclosure,
            Self::RequiredClaimMissing { .. } => RejectionReason::RequiredClaimMissing,
            Self::DocumentNotReturned(_) => RejectionReason::DocumentNotReturned,
            Self::Canonicalization(_) => RejectionReason::Canonicalization,
            Self::InvalidTransition { .. } => RejectionReason::InvalidTransition,
        }
    }
}
