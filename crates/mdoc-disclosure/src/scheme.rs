//! # Credential Schemes
//!
//! A `CredentialScheme` is the attribute catalog of one credential type: its
//! doc type, its namespace, and for every attribute the expected value kind
//! and whether it is required.
//!
//! Schemes are plain configuration values. They are loaded from YAML or JSON
//! and handed to a [`crate::CommitmentBuilder`] or [`crate::Verifier`] at
//! construction; there is no process-wide registry, so any number of schemes
//! can be in use at once.
//!
//! Conformance is structural only: an attribute must exist in the catalog and
//! its value must have the declared kind. Whether a country code is real is
//! not this crate's concern.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::path::Path;

use mdoc_core::{DocType, ElementIdentifier, ElementValue, Namespace, ValueKind};
use serde::{Deserialize, Serialize};

use crate::error::SchemeError;

const TAX_ID_YAML: &str = include_str!("../schemes/tax_id.yaml");

/// Attribute identifiers of the built-in tax number scheme.
pub mod tax_id {
    /// Doc type of the tax number credential.
    pub const DOC_TYPE: &str = "Tax Number";
    /// Namespace of the tax number credential.
    pub const NAMESPACE: &str = "eu.europa.finance.taxid.1";
    /// The tax number itself. Required.
    pub const TAX_NUMBER: &str = "tax_number";
    /// Country the tax number belongs to. Required.
    pub const AFFILIATION_COUNTRY: &str = "affiliation_country";
    /// Family name on the tax register. Required.
    pub const REGISTERED_FAMILY_NAME: &str = "registered_family_name";
    /// Given name on the tax register. Required.
    pub const REGISTERED_GIVEN_NAME: &str = "registered_given_name";
    /// Registered residence. Required.
    pub const RESIDENT_ADDRESS: &str = "resident_address";
    /// Date of birth, a `date` value. Required.
    pub const BIRTH_DATE: &str = "birth_date";
    /// Church tax identifier. The mixed case is the registered spelling.
    pub const CHURCH_TAX_ID: &str = "church_tax_ID";
    /// Account for tax refunds.
    pub const IBAN: &str = "iban";
    /// Link to the holder's personal identification credential.
    pub const PID_ID: &str = "pid_id";
    /// When the credential was issued, a `timestamp` value. Required.
    pub const ISSUANCE_DATE: &str = "issuance_date";
    /// How the tax authority verified the holder.
    pub const VERIFICATION_STATUS: &str = "verification_status";
    /// When the credential stops being valid, a `timestamp` value. Required.
    pub const EXPIRY_DATE: &str = "expiry_date";
    /// Name of the issuing tax authority. Required.
    pub const ISSUING_AUTHORITY: &str = "issuing_authority";
    /// Number of the credential document.
    pub const DOCUMENT_NUMBER: &str = "document_number";
    /// Issuer-internal reference.
    pub const ADMINISTRATIVE_NUMBER: &str = "administrative_number";
    /// Alpha-2 code of the issuing country. Required.
    pub const ISSUING_COUNTRY: &str = "issuing_country";
    /// Subdivision of the issuing country.
    pub const ISSUING_JURISDICTION: &str = "issuing_jurisdiction";
}

/// One attribute in a scheme's catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeSpec {
    /// The element identifier.
    pub identifier: ElementIdentifier,
    /// The value shape every issued value must have.
    pub kind: ValueKind,
    /// Whether issuance must include this attribute.
    #[serde(default)]
    pub required: bool,
}

/// The attribute catalog of one credential type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialScheme {
    /// Doc type of credentials following this scheme.
    pub doc_type: DocType,
    /// The single namespace holding the scheme's attributes.
    pub namespace: Namespace,
    /// Optional JSON schema URI for flat representations.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_uri: Option<String>,
    /// Attribute catalog, in presentation order.
    pub attributes: Vec<AttributeSpec>,
}

impl CredentialScheme {
    /// The built-in tax number scheme (17 attributes, 10 required).
    pub fn tax_id() -> Result<Self, SchemeError> {
        Self::from_yaml_str(TAX_ID_YAML)
    }

    /// Parse and validate a scheme from YAML.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, SchemeError> {
        let scheme: Self = serde_yaml::from_str(yaml)?;
        scheme.validate()?;
        Ok(scheme)
    }

    /// Parse and validate a scheme from JSON.
    pub fn from_json_str(json: &str) -> Result<Self, SchemeError> {
        let scheme: Self = serde_json::from_str(json)?;
        scheme.validate()?;
        Ok(scheme)
    }

    /// Load a scheme file. `.yaml`/`.yml` is parsed as YAML, anything else
    /// as JSON.
    pub fn from_path(path: &Path) -> Result<Self, SchemeError> {
        let content = std::fs::read_to_string(path).map_err(|source| SchemeError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        let scheme = match ext {
            "yaml" | "yml" => Self::from_yaml_str(&content)?,
            _ => Self::from_json_str(&content)?,
        };
        tracing::debug!(
            path = %path.display(),
            doc_type = %scheme.doc_type,
            attributes = scheme.attributes.len(),
            "loaded credential scheme"
        );
        Ok(scheme)
    }

    /// Reject empty catalogs and duplicate identifiers.
    pub fn validate(&self) -> Result<(), SchemeError> {
        if self.attributes.is_empty() {
            return Err(SchemeError::Invalid(format!(
                "scheme {} defines no attributes",
                self.doc_type
            )));
        }
        let mut seen = HashSet::new();
        for attr in &self.attributes {
            if !seen.insert(attr.identifier.as_str()) {
                return Err(SchemeError::Invalid(format!(
                    "attribute {} defined more than once",
                    attr.identifier
                )));
            }
        }
        Ok(())
    }

    /// Look up an attribute by identifier.
    pub fn attribute(&self, identifier: &str) -> Option<&AttributeSpec> {
        self.attributes.iter().find(|a| a.identifier.as_str() == identifier)
    }

    /// Identifiers that issuance must include.
    pub fn required_identifiers(&self) -> impl Iterator<Item = &ElementIdentifier> {
        self.attributes.iter().filter(|a| a.required).map(|a| &a.identifier)
    }

    /// Required identifiers keyed by namespace, in the form a verifier
    /// policy consumes.
    pub fn required_claims(&self) -> BTreeMap<Namespace, BTreeSet<ElementIdentifier>> {
        let mut map = BTreeMap::new();
        map.insert(
            self.namespace.clone(),
            self.required_identifiers().cloned().collect(),
        );
        map
    }

    /// Check that a doc type matches this scheme.
    pub fn check_doc_type(&self, doc_type: &DocType) -> Result<(), SchemeError> {
        if doc_type != &self.doc_type {
            return Err(SchemeError::DocTypeMismatch {
                expected: self.doc_type.clone(),
                actual: doc_type.clone(),
            });
        }
        Ok(())
    }

    /// Check one element against the catalog.
    pub fn check_element(
        &self,
        namespace: &Namespace,
        identifier: &ElementIdentifier,
        value: &ElementValue,
    ) -> Result<(), SchemeError> {
        if namespace != &self.namespace {
            return Err(SchemeError::UnknownNamespace(namespace.clone()));
        }
        let spec = self
            .attribute(identifier.as_str())
            .ok_or_else(|| SchemeError::UnknownAttribute {
                namespace: namespace.clone(),
                identifier: identifier.clone(),
            })?;
        if spec.kind != value.kind() {
            return Err(SchemeError::ValueKindMismatch {
                identifier: identifier.clone(),
                expected: spec.kind,
                actual: value.kind(),
            });
        }
        Ok(())
    }

    /// Check that every required attribute is among `supplied`.
    pub fn check_required<'a, I>(&self, supplied: I) -> Result<(), SchemeError>
    where
        I: IntoIterator<Item = &'a ElementIdentifier>,
    {
        let supplied: HashSet<&str> = supplied.into_iter().map(|i| i.as_str()).collect();
        match self
            .required_identifiers()
            .find(|id| !supplied.contains(id.as_str()))
        {
            Some(missing) => Err(SchemeError::MissingRequiredAttribute {
                namespace: self.namespace.clone(),
                identifier: missing.clone(),
            }),
            None => Ok(()),
        }
    }
}
