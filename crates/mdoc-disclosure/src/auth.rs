//! # Issuer, Device and Reader Authentication
//!
//! Three signatures appear in an exchange:
//!
//! - [`IssuerAuth`]: the issuer's signature over the canonical bytes of the
//!   [`SecurityObject`]. Created once at issuance and passed through by the
//!   holder unmodified.
//! - [`DeviceAuth`]: a fresh signature by the holder's device key over the
//!   canonical [`DeviceAuthentication`] structure, created for every
//!   disclosure. Verified only with the key bound in the security object.
//! - [`ReaderAuth`]: an optional signature by the verifier over its request.
//!
//! ## Security Invariant
//!
//! All three signing inputs go through `CanonicalBytes::new()`. The issuer
//! signature covers the entire security object, so commitments, the device
//! key and the validity window cannot be changed independently.
//!
//! ## Replay
//!
//! Without a [`SessionTranscript`] the device signature covers only the
//! fixed context string and the doc type, so it is identical across
//! sessions and a captured response can be replayed to any verifier that
//! trusts the same issuer. Binding to a transcript is the transport layer's
//! job; when one is supplied both sides must use the same bytes.

use mdoc_core::{hex, CanonicalBytes, DocType};
use mdoc_crypto::{Ed25519PublicKey, Ed25519Signature, KeyProvider};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{DisclosureError, IssuanceError, VerificationError};
use crate::mso::SecurityObject;

/// COSE-style algorithm label for Ed25519.
pub const ALGORITHM_EDDSA: &str = "EdDSA";

/// Context string of the device authentication structure.
pub const DEVICE_AUTHENTICATION_CONTEXT: &str = "DeviceAuthentication";

// ---------------------------------------------------------------------------
// Session transcript
// ---------------------------------------------------------------------------

/// Transport-supplied bytes identifying one presentation session.
///
/// Opaque to this crate; serialized as lowercase hex.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct SessionTranscript(Vec<u8>);

impl SessionTranscript {
    /// Wrap transcript bytes.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// The raw transcript bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl Serialize for SessionTranscript {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(&self.0))
    }
}

impl<'de> Deserialize<'de> for SessionTranscript {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        hex::decode(&s).map(Self).map_err(serde::de::Error::custom)
    }
}

impl std::fmt::Debug for SessionTranscript {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SessionTranscript({}...)", hex::prefix(&self.0))
    }
}

// ---------------------------------------------------------------------------
// IssuerAuth
// ---------------------------------------------------------------------------

/// The issuer-signed security object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssuerAuth {
    /// Signature algorithm, always [`ALGORITHM_EDDSA`].
    pub algorithm: String,
    /// The signed payload.
    pub security_object: SecurityObject,
    /// Signature over the canonical bytes of `security_object`.
    pub signature: Ed25519Signature,
}

impl IssuerAuth {
    /// Sign a security object with the issuer's key.
    pub fn sign(
        security_object: SecurityObject,
        issuer: &dyn KeyProvider,
    ) -> Result<Self, IssuanceError> {
        let canonical = CanonicalBytes::new(&security_object)?;
        let signature = issuer.sign(&canonical).map_err(IssuanceError::SigningFailed)?;
        Ok(Self {
            algorithm: ALGORITHM_EDDSA.to_string(),
            security_object,
            signature,
        })
    }

    /// Verify the issuer signature and return the authenticated payload.
    pub fn verify(
        &self,
        issuer_key: &Ed25519PublicKey,
    ) -> Result<&SecurityObject, VerificationError> {
        if self.algorithm != ALGORITHM_EDDSA {
            return Err(VerificationError::IssuerSignatureInvalid(format!(
                "unsupported algorithm {:?}",
                self.algorithm
            )));
        }
        let canonical = CanonicalBytes::new(&self.security_object)?;
        issuer_key
            .verify(&canonical, &self.signature)
            .map_err(|e| VerificationError::IssuerSignatureInvalid(e.to_string()))?;
        Ok(&self.security_object)
    }
}

// ---------------------------------------------------------------------------
// DeviceAuth
// ---------------------------------------------------------------------------

/// The structure the holder's device key signs for each disclosure.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceAuthentication<'a> {
    /// Always [`DEVICE_AUTHENTICATION_CONTEXT`].
    pub context: &'static str,
    /// Doc type of the disclosed document.
    pub doc_type: &'a DocType,
    /// Session binding, `null` when the transport supplies none.
    pub session_transcript: Option<&'a SessionTranscript>,
}

impl<'a> DeviceAuthentication<'a> {
    /// Build the signing structure for one document.
    pub fn new(doc_type: &'a DocType, session_transcript: Option<&'a SessionTranscript>) -> Self {
        Self {
            context: DEVICE_AUTHENTICATION_CONTEXT,
            doc_type,
            session_transcript,
        }
    }

    /// Canonical signing input.
    pub fn signing_input(&self) -> Result<CanonicalBytes, mdoc_core::CanonicalizationError> {
        CanonicalBytes::new(self)
    }
}

/// The holder's per-disclosure device signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceAuth {
    /// Signature over the canonical [`DeviceAuthentication`].
    pub device_signature: Ed25519Signature,
}

impl DeviceAuth {
    /// Sign a fresh device authentication.
    pub fn sign(
        doc_type: &DocType,
        session_transcript: Option<&SessionTranscript>,
        device: &dyn KeyProvider,
    ) -> Result<Self, DisclosureError> {
        let canonical = DeviceAuthentication::new(doc_type, session_transcript).signing_input()?;
        let device_signature = device.sign(&canonical).map_err(DisclosureError::SigningFailed)?;
        Ok(Self { device_signature })
    }

    /// Verify against the device key taken from an authenticated security
    /// object.
    pub fn verify(
        &self,
        doc_type: &DocType,
        session_transcript: Option<&SessionTranscript>,
        device_key: &Ed25519PublicKey,
    ) -> Result<(), VerificationError> {
        let canonical = DeviceAuthentication::new(doc_type, session_transcript).signing_input()?;
        device_key
            .verify(&canonical, &self.device_signature)
            .map_err(|e| VerificationError::DeviceSignatureInvalid(e.to_string()))
    }
}

// ---------------------------------------------------------------------------
// ReaderAuth
// ---------------------------------------------------------------------------

/// A verifier's signature over its items request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReaderAuth {
    /// Signature over the canonical items request.
    pub reader_signature: Ed25519Signature,
}

impl ReaderAuth {
    /// Sign an already canonicalized request.
    pub fn sign(
        request: &CanonicalBytes,
        reader: &dyn KeyProvider,
    ) -> Result<Self, DisclosureError> {
        let reader_signature = reader.sign(request).map_err(DisclosureError::SigningFailed)?;
        Ok(Self { reader_signature })
    }

    /// Check the signature with a reader key the holder trusts.
    pub fn verify(
        &self,
        request: &CanonicalBytes,
        reader_key: &Ed25519PublicKey,
    ) -> Result<(), DisclosureError> {
        reader_key
            .verify(request, &self.reader_signature)
            .map_err(|e| DisclosureError::ReaderAuthInvalid(e.to_string()))
    }
}
