//! Device signature binding and replay.
//!
//! Without a session transcript the device signature covers only the
//! doc type, so a captured response verifies again anywhere. Binding to a
//! transcript confines it to the session it was produced for.

mod common;

use common::*;
use mdoc_crypto::{KeyProvider, LocalKeyProvider};
use mdoc_disclosure::scheme::tax_id;
use mdoc_disclosure::{
    DeviceRequest, DocRequest, RejectionReason, SessionTranscript, VerificationAttempt,
    VerificationPolicy, VerificationState,
};

fn transcript(label: &str) -> SessionTranscript {
    SessionTranscript::from_bytes(label.as_bytes().to_vec())
}

fn bound_to(label: &str) -> VerificationPolicy {
    VerificationPolicy::default().with_session_transcript(transcript(label))
}

#[test]
fn unbound_response_replays_successfully() {
    let p = Parties::new();
    p.issue_and_store();
    let captured = p.disclose(&[tax_id::TAX_NUMBER]);

    // A second verifier, later, accepts the same bytes.
    let first = p
        .verifier()
        .verify_at(&captured, now())
        .expect("first presentation verifies");
    let replayed = p
        .verifier()
        .verify_at(&captured, now().plus_secs(3_600))
        .expect("unbound response replays");
    assert_eq!(first.claims, replayed.claims);
}

#[test]
fn bound_response_verifies_in_its_own_session() {
    let p = Parties::new();
    p.issue_and_store();
    let session = transcript("session-a");
    let doc = p
        .store
        .disclose(&p.request(&[tax_id::TAX_NUMBER]), Some(&session), &p.device)
        .expect("bound disclosure");

    let verifier = p
        .verifier()
        .with_policy(VerificationPolicy::default().with_session_transcript(session));
    assert!(verifier.verify_at(&doc, now()).is_ok());
}

#[test]
fn bound_response_fails_in_another_session() {
    let p = Parties::new();
    p.issue_and_store();
    let doc = p
        .store
        .disclose(
            &p.request(&[tax_id::TAX_NUMBER]),
            Some(&transcript("session-a")),
            &p.device,
        )
        .expect("bound disclosure");

    let other = p.verifier().with_policy(bound_to("session-b"));
    assert_eq!(
        other
            .verify_at(&doc, now())
            .expect_err("bound to session-a")
            .reason(),
        RejectionReason::DeviceSignatureInvalid
    );

    // Nor does a verifier that expects no binding accept it.
    assert_eq!(
        p.verifier()
            .verify_at(&doc, now())
            .expect_err("bound response without a session")
            .reason(),
        RejectionReason::DeviceSignatureInvalid
    );
}

#[test]
fn credential_presented_with_foreign_device_key_fails() {
    let p = Parties::new();
    p.issue_and_store();
    let thief = LocalKeyProvider::generate();
    let doc = p
        .store
        .disclose(&p.request(&[tax_id::TAX_NUMBER]), None, &thief)
        .expect("holder store signs with any key");
    assert_eq!(
        p.verifier()
            .verify_at(&doc, now())
            .expect_err("device key not in security object")
            .reason(),
        RejectionReason::DeviceSignatureInvalid
    );
}

#[test]
fn device_signature_from_other_doc_type_does_not_transfer() {
    let p = Parties::new();
    p.issue_and_store();
    let mut doc = p.disclose(&[tax_id::TAX_NUMBER]);
    doc.device_signed.device_auth = mdoc_disclosure::DeviceAuth::sign(
        &mdoc_core::DocType::new("org.iso.18013.5.1.mDL").expect("valid doc type"),
        None,
        &p.device,
    )
    .expect("device signs");
    assert_eq!(
        p.verifier()
            .verify_at(&doc, now())
            .expect_err("device signature over another doc type")
            .reason(),
        RejectionReason::DeviceSignatureInvalid
    );
}

#[test]
fn signed_reader_request_round_trip() {
    let p = Parties::new();
    p.issue_and_store();
    let reader = LocalKeyProvider::generate();
    let session = transcript("session-r");

    let doc_request = DocRequest::signed(p.request(&[tax_id::ISSUING_COUNTRY]), &reader)
        .expect("reader signs request");
    doc_request
        .verify_reader_auth(&reader.public_key().expect("local key"))
        .expect("reader signature verifies");
    let impostor = LocalKeyProvider::generate();
    assert!(doc_request
        .verify_reader_auth(&impostor.public_key().expect("local key"))
        .is_err());

    let response = p
        .store
        .respond(&DeviceRequest::new(vec![doc_request]), Some(&session), &p.device)
        .expect("holder responds");
    let verified = p
        .verifier()
        .with_policy(VerificationPolicy::default().with_session_transcript(session))
        .verify_response_at(&response, now())
        .expect("response verifies in its session");
    assert_eq!(verified.claim_count(), 1);
}

#[test]
fn attempt_records_replay_rejection() {
    let p = Parties::new();
    p.issue_and_store();
    let doc = p
        .store
        .disclose(
            &p.request(&[tax_id::TAX_NUMBER]),
            Some(&transcript("session-a")),
            &p.device,
        )
        .expect("bound disclosure");
    let verifier = p.verifier().with_policy(bound_to("session-b"));

    let mut attempt = VerificationAttempt::new();
    assert!(attempt.run(&verifier, &doc, now()).is_err());
    assert_eq!(
        attempt.state(),
        VerificationState::Rejected(RejectionReason::DeviceSignatureInvalid)
    );
    assert!(attempt.state().is_terminal());
}
