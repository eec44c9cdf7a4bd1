//! # Request/Response Envelope
//!
//! Message shapes exchanged between verifier and holder:
//!
//! ```text
//! DeviceRequest { version, docRequests: [ DocRequest { itemsRequest, readerAuth? } ] }
//! ItemsRequest  { docType, nameSpaces: { namespace: { identifier: requested } } }
//!
//! DeviceResponse { version, documents, documentErrors, status }
//! Document       { docType, issuerSigned { nameSpaces, issuerAuth }, deviceSigned { deviceAuth } }
//! ```
//!
//! Field names are camelCase on the wire. The byte framing of these
//! messages (CBOR, JSON, ...) is the transport's choice; only the element
//! and authentication payloads are canonicalized.

use std::collections::BTreeMap;

use mdoc_core::{CanonicalBytes, CanonicalizationError, DocType, ElementIdentifier, Namespace};
use mdoc_crypto::{Ed25519PublicKey, KeyProvider};
use serde::{Deserialize, Serialize};

use crate::auth::{DeviceAuth, IssuerAuth, ReaderAuth};
use crate::element::DataElement;
use crate::error::DisclosureError;

/// Version string of request and response envelopes.
pub const ENVELOPE_VERSION: &str = "1.0";

/// Per-document error code: the holder did not return this document.
pub const ERROR_DATA_NOT_RETURNED: u32 = 0;

/// Requested identifiers of one namespace, each with its requested flag.
pub type RequestedElements = BTreeMap<ElementIdentifier, bool>;

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// What a verifier asks for from one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemsRequest {
    /// Doc type being requested.
    pub doc_type: DocType,
    /// Per namespace, the identifiers of interest.
    pub name_spaces: BTreeMap<Namespace, RequestedElements>,
}

impl ItemsRequest {
    /// An empty request for `doc_type`.
    pub fn new(doc_type: DocType) -> Self {
        Self {
            doc_type,
            name_spaces: BTreeMap::new(),
        }
    }

    /// Mark `identifier` in `namespace` as requested.
    pub fn request(self, namespace: Namespace, identifier: ElementIdentifier) -> Self {
        self.with_element(namespace, identifier, true)
    }

    /// Add `identifier` with an explicit requested flag.
    pub fn with_element(
        mut self,
        namespace: Namespace,
        identifier: ElementIdentifier,
        requested: bool,
    ) -> Self {
        self.name_spaces
            .entry(namespace)
            .or_default()
            .insert(identifier, requested);
        self
    }

    /// Identifiers in `namespace` flagged as requested.
    pub fn requested<'a>(
        &'a self,
        namespace: &Namespace,
    ) -> impl Iterator<Item = &'a ElementIdentifier> {
        self.name_spaces
            .get(namespace)
            .into_iter()
            .flat_map(|m| m.iter().filter(|(_, wanted)| **wanted).map(|(id, _)| id))
    }

    /// Canonical bytes covered by reader authentication.
    pub fn signing_input(&self) -> Result<CanonicalBytes, CanonicalizationError> {
        CanonicalBytes::new(self)
    }
}

/// One document request, optionally signed by the reader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocRequest {
    /// The request body.
    pub items_request: ItemsRequest,
    /// Reader signature over `items_request`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reader_auth: Option<ReaderAuth>,
}

impl DocRequest {
    /// An unsigned request.
    pub fn new(items_request: ItemsRequest) -> Self {
        Self {
            items_request,
            reader_auth: None,
        }
    }

    /// A request signed with the reader's key.
    pub fn signed(
        items_request: ItemsRequest,
        reader: &dyn KeyProvider,
    ) -> Result<Self, DisclosureError> {
        let reader_auth = ReaderAuth::sign(&items_request.signing_input()?, reader)?;
        Ok(Self {
            items_request,
            reader_auth: Some(reader_auth),
        })
    }

    /// Check the reader signature. An unsigned request fails.
    pub fn verify_reader_auth(&self, reader_key: &Ed25519PublicKey) -> Result<(), DisclosureError> {
        let auth = self.reader_auth.as_ref().ok_or_else(|| {
            DisclosureError::ReaderAuthInvalid(
                "request carries no reader authentication".to_string(),
            )
        })?;
        auth.verify(&self.items_request.signing_input()?, reader_key)
    }
}

/// A batch of document requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceRequest {
    /// [`ENVELOPE_VERSION`].
    pub version: String,
    /// The requested documents.
    pub doc_requests: Vec<DocRequest>,
}

impl DeviceRequest {
    /// Wrap document requests in a versioned envelope.
    pub fn new(doc_requests: Vec<DocRequest>) -> Self {
        Self {
            version: ENVELOPE_VERSION.to_string(),
            doc_requests,
        }
    }
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

/// Issuer-signed part of a document: the disclosed elements and the
/// unmodified issuer authentication.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssuerSigned {
    /// Disclosed elements per namespace.
    pub name_spaces: BTreeMap<Namespace, Vec<DataElement>>,
    /// The issuer-signed security object.
    pub issuer_auth: IssuerAuth,
}

/// Device-signed part of a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceSigned {
    /// The holder's per-disclosure signature.
    pub device_auth: DeviceAuth,
}

/// One disclosed document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    /// Doc type of the disclosed credential.
    pub doc_type: DocType,
    /// Disclosed elements and issuer authentication.
    pub issuer_signed: IssuerSigned,
    /// Device authentication.
    pub device_signed: DeviceSigned,
}

impl Document {
    /// Number of disclosed elements across namespaces.
    pub fn disclosed_count(&self) -> usize {
        self.issuer_signed.name_spaces.values().map(Vec::len).sum()
    }
}

/// Overall response status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResponseStatus(pub u32);

impl ResponseStatus {
    /// Normal processing.
    pub const OK: Self = Self(0);
    /// Unspecified failure.
    pub const GENERAL_ERROR: Self = Self(10);
    /// The request could not be decoded.
    pub const DECODING_ERROR: Self = Self(11);
    /// The request was decoded but is invalid.
    pub const VALIDATION_ERROR: Self = Self(12);

    /// Whether this is [`ResponseStatus::OK`].
    pub fn is_ok(&self) -> bool {
        *self == Self::OK
    }
}

/// The holder's answer to a [`DeviceRequest`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceResponse {
    /// [`ENVELOPE_VERSION`].
    pub version: String,
    /// Returned documents.
    #[serde(default)]
    pub documents: Vec<Document>,
    /// Doc types that were requested but not returned, with an error code.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub document_errors: BTreeMap<DocType, u32>,
    /// Overall status.
    pub status: ResponseStatus,
}

impl DeviceResponse {
    /// A successful response.
    pub fn new(documents: Vec<Document>, document_errors: BTreeMap<DocType, u32>) -> Self {
        Self {
            version: ENVELOPE_VERSION.to_string(),
            documents,
            document_errors,
            status: ResponseStatus::OK,
        }
    }

    /// A response carrying only a failure status.
    pub fn error(status: ResponseStatus) -> Self {
        Self {
            version: ENVELOPE_VERSION.to_string(),
            documents: Vec::new(),
            document_errors: BTreeMap::new(),
            status,
        }
    }

    /// The first returned document of `doc_type`.
    pub fn document(&self, doc_type: &DocType) -> Option<&Document> {
        self.documents.iter().find(|d| &d.doc_type == doc_type)
    }
}
