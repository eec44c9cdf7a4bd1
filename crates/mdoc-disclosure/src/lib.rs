//! # mdoc-disclosure — Selective Disclosure for mdoc Credentials
//!
//! The issuer commits to every data element of a credential with a salted
//! digest and signs the list of digests. The holder later reveals any
//! subset of elements; the verifier recomputes the digests of what was
//! revealed, matches them against the signed list, and never needs the
//! rest.
//!
//! ## Flow
//!
//! ```text
//! CommitmentBuilder ──▶ IssuedCredential ──▶ HolderStore ──▶ Document ──▶ Verifier
//!   (issuer key)          elements +            select +       elements +     issuer sig,
//!                         IssuerAuth            DeviceAuth     IssuerAuth +   device sig,
//!                                               (device key)   DeviceAuth     digests
//! ```
//!
//! ## Modules
//!
//! - [`element`]: `DataElement` and its canonical digest.
//! - [`scheme`]: credential attribute catalogs as configuration values.
//! - [`mso`]: the security object and its commitment lists.
//! - [`auth`]: issuer, device and reader signatures.
//! - [`issuer`]: the commitment builder.
//! - [`holder`]: the holder store and disclosure selector.
//! - [`verifier`]: document verification and the attempt state machine.
//! - [`envelope`]: request and response messages.
//!
//! ## Crate Policy
//!
//! - All hash and signature input is `CanonicalBytes`.
//! - Element values, salts and key material are never logged.
//! - No `unsafe`, no `.unwrap()` outside tests.

pub mod auth;
pub mod element;
pub mod envelope;
pub mod error;
pub mod holder;
pub mod issuer;
pub mod mso;
pub mod scheme;
pub mod verifier;

pub use auth::{DeviceAuth, DeviceAuthentication, IssuerAuth, ReaderAuth, SessionTranscript};
pub use element::DataElement;
pub use envelope::{
    DeviceRequest, DeviceResponse, DeviceSigned, DocRequest, Document, IssuerSigned, ItemsRequest,
    ResponseStatus,
};
pub use error::{
    DisclosureError, IssuanceError, RejectionReason, SchemeError, StoreError, VerificationError,
};
pub use holder::{select_disclosure, HolderStore};
pub use issuer::{CommitmentBuilder, DigestIdPolicy, IssuancePolicy, IssuedCredential};
pub use mso::{CommitmentList, DeviceKeyInfo, SecurityObject, ValidityInfo, ValidityWindow};
pub use scheme::{AttributeSpec, CredentialScheme};
pub use verifier::{
    Claims, VerificationAttempt, VerificationPolicy, VerificationState, VerifiedDocument, Verifier,
};
