//! Shared fixtures for the cross-crate scenarios.
//!
//! The tax number credential used throughout mirrors a realistic issuance:
//! ten elements in one namespace, typed per the built-in scheme.

#![allow(dead_code)]

use chrono::NaiveDate;
use mdoc_core::{DocType, ElementIdentifier, ElementValue, Namespace, Timestamp};
use mdoc_crypto::{KeyProvider, LocalKeyProvider};
use mdoc_disclosure::scheme::tax_id;
use mdoc_disclosure::{
    CommitmentBuilder, CredentialScheme, DataElement, Document, HolderStore, IssuedCredential,
    ItemsRequest, ValidityWindow, Verifier,
};

/// Install a test subscriber once. `RUST_LOG=mdoc_disclosure=debug` shows
/// the per-step logs.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn ts(s: &str) -> Timestamp {
    Timestamp::parse(s).expect("valid timestamp")
}

pub fn id(s: &str) -> ElementIdentifier {
    ElementIdentifier::new(s).expect("valid identifier")
}

pub fn ns() -> Namespace {
    Namespace::new(tax_id::NAMESPACE).expect("valid namespace")
}

pub fn doc_type() -> DocType {
    DocType::new(tax_id::DOC_TYPE).expect("valid doc type")
}

pub fn valid_from() -> Timestamp {
    ts("2030-01-01T00:00:00Z")
}

pub fn valid_until() -> Timestamp {
    ts("2031-01-01T00:00:00Z")
}

/// A reference time inside the validity window.
pub fn now() -> Timestamp {
    ts("2030-06-15T08:30:00Z")
}

pub fn window() -> ValidityWindow {
    ValidityWindow::new(valid_from(), valid_until()).expect("valid window")
}

/// The ten attribute values of the reference credential, in issuance order.
pub fn tax_id_elements() -> Vec<(ElementIdentifier, ElementValue)> {
    let birth_date = NaiveDate::from_ymd_opt(2033, 1, 31).expect("valid date");
    vec![
        (id(tax_id::TAX_NUMBER), ElementValue::text("1337")),
        (id(tax_id::AFFILIATION_COUNTRY), ElementValue::text("Utopia")),
        (id(tax_id::REGISTERED_FAMILY_NAME), ElementValue::text("Mustermann")),
        (id(tax_id::REGISTERED_GIVEN_NAME), ElementValue::text("Max")),
        (id(tax_id::RESIDENT_ADDRESS), ElementValue::text("Heckenrosenweg 4, 95867")),
        (id(tax_id::BIRTH_DATE), ElementValue::Date(birth_date)),
        (id(tax_id::ISSUANCE_DATE), ElementValue::Timestamp(ts("2051-01-08T16:29:04Z"))),
        (id(tax_id::EXPIRY_DATE), ElementValue::Timestamp(ts("2051-01-08T16:29:05Z"))),
        (id(tax_id::ISSUING_AUTHORITY), ElementValue::text("Ministry of Truth")),
        (id(tax_id::ISSUING_COUNTRY), ElementValue::text("Airstrip One")),
    ]
}

/// Issuer, holder and verifier for one credential.
pub struct Parties {
    pub scheme: CredentialScheme,
    pub issuer: LocalKeyProvider,
    pub device: LocalKeyProvider,
    pub store: HolderStore,
}

impl Parties {
    /// Fresh keys and an empty holder store.
    pub fn new() -> Self {
        init_tracing();
        Self {
            scheme: CredentialScheme::tax_id().expect("built-in scheme loads"),
            issuer: LocalKeyProvider::generate(),
            device: LocalKeyProvider::generate(),
            store: HolderStore::new(),
        }
    }

    pub fn builder(&self) -> CommitmentBuilder {
        CommitmentBuilder::for_scheme(
            &self.scheme,
            self.device.public_key().expect("local key"),
            window(),
        )
        .signed_at(valid_from())
    }

    /// Issue `elements` and return the credential without storing it.
    pub fn issue_elements(
        &self,
        elements: Vec<(ElementIdentifier, ElementValue)>,
    ) -> IssuedCredential {
        let mut builder = self.builder();
        builder.add_namespace(ns(), elements);
        builder.issue(&self.issuer).expect("issuance succeeds")
    }

    /// Issue the reference credential and hand it to the holder.
    pub fn issue_and_store(&self) -> IssuedCredential {
        let issued = self.issue_elements(tax_id_elements());
        self.store.store(issued.clone()).expect("holder accepts credential");
        issued
    }

    pub fn verifier(&self) -> Verifier {
        Verifier::for_scheme(&self.scheme, self.issuer.public_key().expect("local key"))
    }

    pub fn request(&self, identifiers: &[&str]) -> ItemsRequest {
        identifiers
            .iter()
            .fold(ItemsRequest::new(doc_type()), |r, i| r.request(ns(), id(i)))
    }

    pub fn disclose(&self, identifiers: &[&str]) -> Document {
        self.store
            .disclose(&self.request(identifiers), None, &self.device)
            .expect("disclosure succeeds")
    }
}

/// The disclosed elements of the tax number namespace, for tampering.
pub fn disclosed_mut(doc: &mut Document) -> &mut Vec<DataElement> {
    doc.issuer_signed
        .name_spaces
        .get_mut(&ns())
        .expect("tax number namespace disclosed")
}

/// Every identifier of the reference credential.
pub fn all_identifiers() -> Vec<&'static str> {
    vec![
        tax_id::TAX_NUMBER,
        tax_id::AFFILIATION_COUNTRY,
        tax_id::REGISTERED_FAMILY_NAME,
        tax_id::REGISTERED_GIVEN_NAME,
        tax_id::RESIDENT_ADDRESS,
        tax_id::BIRTH_DATE,
        tax_id::ISSUANCE_DATE,
        tax_id::EXPIRY_DATE,
        tax_id::ISSUING_AUTHORITY,
        tax_id::ISSUING_COUNTRY,
    ]
}
