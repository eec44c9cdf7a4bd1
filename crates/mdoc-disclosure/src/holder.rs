//! # Holder Store and Disclosure Selector
//!
//! The holder keeps every issued credential it accepted, keyed by doc type,
//! and answers verifier requests from them.
//!
//! ## Concurrency
//!
//! Stored credentials are immutable and shared as `Arc` snapshots. The store
//! lock is held only to clone or swap an `Arc`; selection, device signing
//! and response assembly run outside it, so concurrent disclosures from the
//! same store never block each other and never observe a half-replaced
//! credential.
//!
//! ## Selection Rules
//!
//! - Only identifiers flagged `true` in the request are considered.
//! - Requested identifiers the holder does not hold are silently omitted.
//! - Disclosed elements are the stored elements, byte for byte: no
//!   re-salting, no re-numbering.
//! - Every namespace named in the request must yield at least one element.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use mdoc_core::{DocType, Namespace};
use mdoc_crypto::KeyProvider;
use parking_lot::RwLock;

use crate::auth::{DeviceAuth, SessionTranscript};
use crate::element::DataElement;
use crate::envelope::{
    DeviceRequest, DeviceResponse, DeviceSigned, Document, IssuerSigned, ItemsRequest,
    ERROR_DATA_NOT_RETURNED,
};
use crate::error::{DisclosureError, StoreError};
use crate::issuer::IssuedCredential;

/// Thread-safe store of the holder's credentials.
#[derive(Debug, Default)]
pub struct HolderStore {
    credentials: RwLock<BTreeMap<DocType, Arc<IssuedCredential>>>,
}

impl HolderStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept a credential after checking that every element matches its
    /// commitment. Replaces any credential of the same doc type.
    pub fn store(&self, credential: IssuedCredential) -> Result<Arc<IssuedCredential>, StoreError> {
        check_consistency(&credential)?;
        let credential = Arc::new(credential);
        let replaced = self
            .credentials
            .write()
            .insert(credential.doc_type.clone(), Arc::clone(&credential))
            .is_some();
        tracing::info!(
            doc_type = %credential.doc_type,
            elements = credential.element_count(),
            replaced,
            "stored credential"
        );
        Ok(credential)
    }

    /// Snapshot of the credential for `doc_type`.
    pub fn get(&self, doc_type: &DocType) -> Option<Arc<IssuedCredential>> {
        self.credentials.read().get(doc_type).cloned()
    }

    /// Drop the credential for `doc_type`.
    pub fn remove(&self, doc_type: &DocType) -> Option<Arc<IssuedCredential>> {
        self.credentials.write().remove(doc_type)
    }

    /// Doc types currently held.
    pub fn doc_types(&self) -> Vec<DocType> {
        self.credentials.read().keys().cloned().collect()
    }

    /// Number of credentials held.
    pub fn len(&self) -> usize {
        self.credentials.read().len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.credentials.read().is_empty()
    }

    /// Answer one items request with a device-signed document.
    pub fn disclose(
        &self,
        request: &ItemsRequest,
        session_transcript: Option<&SessionTranscript>,
        device: &dyn KeyProvider,
    ) -> Result<Document, DisclosureError> {
        let credential = self
            .get(&request.doc_type)
            .ok_or_else(|| DisclosureError::UnknownDocType(request.doc_type.clone()))?;
        let name_spaces = select_disclosure(&credential, request)?;
        let device_auth = DeviceAuth::sign(&credential.doc_type, session_transcript, device)?;

        let document = Document {
            doc_type: credential.doc_type.clone(),
            issuer_signed: IssuerSigned {
                name_spaces,
                issuer_auth: credential.issuer_auth.clone(),
            },
            device_signed: DeviceSigned { device_auth },
        };
        tracing::info!(
            doc_type = %document.doc_type,
            disclosed = document.disclosed_count(),
            held = credential.element_count(),
            session_bound = session_transcript.is_some(),
            "disclosed document"
        );
        Ok(document)
    }

    /// Answer a multi-document request. Doc types that are not held or have
    /// nothing to disclose become `document_errors` entries; signing
    /// failures abort the whole response.
    pub fn respond(
        &self,
        request: &DeviceRequest,
        session_transcript: Option<&SessionTranscript>,
        device: &dyn KeyProvider,
    ) -> Result<DeviceResponse, DisclosureError> {
        let mut documents = Vec::new();
        let mut document_errors = BTreeMap::new();
        for doc_request in &request.doc_requests {
            let items = &doc_request.items_request;
            match self.disclose(items, session_transcript, device) {
                Ok(document) => documents.push(document),
                Err(
                    e @ (DisclosureError::UnknownDocType(_)
                    | DisclosureError::NoMatchingElements { .. }),
                ) => {
                    tracing::warn!(doc_type = %items.doc_type, error = %e, "document not returned");
                    document_errors.insert(items.doc_type.clone(), ERROR_DATA_NOT_RETURNED);
                }
                Err(e) => return Err(e),
            }
        }
        Ok(DeviceResponse::new(documents, document_errors))
    }
}

/// Filter a credential down to what `request` asks for.
///
/// Pure function over the stored elements; see the module docs for the
/// rules.
pub fn select_disclosure(
    credential: &IssuedCredential,
    request: &ItemsRequest,
) -> Result<BTreeMap<Namespace, Vec<DataElement>>, DisclosureError> {
    let mut selected = BTreeMap::new();
    for namespace in request.name_spaces.keys() {
        let wanted: BTreeSet<&str> = request.requested(namespace).map(|i| i.as_str()).collect();
        let matching: Vec<DataElement> = credential
            .name_spaces
            .get(namespace)
            .into_iter()
            .flatten()
            .filter(|e| wanted.contains(e.element_identifier.as_str()))
            .cloned()
            .collect();
        if matching.is_empty() {
            return Err(DisclosureError::NoMatchingElements {
                namespace: namespace.clone(),
            });
        }
        tracing::debug!(
            namespace = %namespace,
            requested = wanted.len(),
            selected = matching.len(),
            "selected elements"
        );
        selected.insert(namespace.clone(), matching);
    }
    Ok(selected)
}

fn check_consistency(credential: &IssuedCredential) -> Result<(), StoreError> {
    let mso = credential.security_object();
    if mso.doc_type != credential.doc_type {
        return Err(StoreError::InconsistentCredential(format!(
            "doc type {} does not match security object doc type {}",
            credential.doc_type, mso.doc_type
        )));
    }
    for (namespace, elements) in &credential.name_spaces {
        for element in elements {
            let committed = mso.commitment(namespace, element.digest_id).ok_or_else(|| {
                StoreError::InconsistentCredential(format!(
                    "element {} in namespace {} has no commitment for digest id {}",
                    element.element_identifier, namespace, element.digest_id
                ))
            })?;
            if !committed.ct_eq(&element.digest(mso.digest_algorithm)?) {
                return Err(StoreError::InconsistentCredential(format!(
                    "element {} in namespace {} does not match its commitment",
                    element.element_identifier, namespace
                )));
            }
        }
    }
    Ok(())
}
