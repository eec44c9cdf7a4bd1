//! # Element Digest Vectors
//!
//! Fixed element encodings and their SHA-256 digests. Another issuer or
//! verifier implementation that hashes the JCS form of the same element
//! must arrive at the same hex digest, or no disclosure between the two
//! will ever verify.
//!
//! When Python 3 is on the path the digests are also recomputed live with
//! `json.dumps(sort_keys=True, separators=(",", ":"))` + `hashlib`, which
//! coincides with JCS for string and integer data.

use chrono::NaiveDate;
use mdoc_core::{CanonicalBytes, DigestAlgorithm, DigestId, ElementValue, Salt, Timestamp};

fn element(
    digest_id: u32,
    identifier: &str,
    value: ElementValue,
    salt_hex: &str,
) -> serde_json::Value {
    serde_json::json!({
        "digestID": DigestId(digest_id),
        "elementIdentifier": identifier,
        "elementValue": value,
        "random": Salt::from_hex(salt_hex).expect("vector salt is valid"),
    })
}

fn canonical_str(v: &serde_json::Value) -> String {
    let cb = CanonicalBytes::new(v).expect("canonicalization should succeed");
    String::from_utf8(cb.as_bytes().to_vec()).expect("JCS output is UTF-8")
}

fn sha256_hex(v: &serde_json::Value) -> String {
    let cb = CanonicalBytes::new(v).expect("canonicalization should succeed");
    DigestAlgorithm::Sha256.digest(&cb).to_hex()
}

/// Recompute with Python, if available.
fn python_digest(canonical: &str) -> Option<String> {
    let script = r#"
import sys, json, hashlib
data = json.loads(sys.stdin.read())
canonical = json.dumps(data, sort_keys=True, separators=(",", ":"), ensure_ascii=False).encode()
print(hashlib.sha256(canonical).hexdigest(), end="")
"#;
    use std::io::Write;
    let mut child = std::process::Command::new("python3")
        .arg("-c")
        .arg(script)
        .stdin(std::process::Stdio::piped())
        .stdout(std::process::Stdio::piped())
        .spawn()
        .ok()?;
    child.stdin.take()?.write_all(canonical.as_bytes()).ok()?;
    let output = child.wait_with_output().ok()?;
    if output.status.success() {
        Some(String::from_utf8(output.stdout).ok()?.trim().to_string())
    } else {
        None
    }
}

fn check(v: serde_json::Value, expected_canonical: &str, expected_hex: &str) {
    let canonical = canonical_str(&v);
    assert_eq!(canonical, expected_canonical);
    assert_eq!(sha256_hex(&v), expected_hex);
    if let Some(py_hex) = python_digest(&canonical) {
        assert_eq!(py_hex, expected_hex, "Python digest diverged for {canonical}");
    }
}

// ---------------------------------------------------------------------------
// Vector 1: text value, digest id 0
// ---------------------------------------------------------------------------

#[test]
fn vector_text_tax_number() {
    check(
        element(
            0,
            "tax_number",
            ElementValue::text("1337"),
            "000102030405060708090a0b0c0d0e0f",
        ),
        r#"{"digestID":0,"elementIdentifier":"tax_number","elementValue":{"type":"text","value":"1337"},"random":"000102030405060708090a0b0c0d0e0f"}"#,
        "2114c132722e4f3d100f85836d0f8222876b8371d7e00f2692dd0d6c73d1934e",
    );
}

// ---------------------------------------------------------------------------
// Vector 2: date value
// ---------------------------------------------------------------------------

#[test]
fn vector_date_birth_date() {
    let date = NaiveDate::from_ymd_opt(2033, 1, 31).expect("valid date");
    check(
        element(
            5,
            "birth_date",
            ElementValue::Date(date),
            "0f0e0d0c0b0a09080706050403020100",
        ),
        r#"{"digestID":5,"elementIdentifier":"birth_date","elementValue":{"type":"date","value":"2033-01-31"},"random":"0f0e0d0c0b0a09080706050403020100"}"#,
        "3313125b1569276c5dc8c369b4dc318a7196c560867d524ef79a6a0078b11544",
    );
}

// ---------------------------------------------------------------------------
// Vector 3: non-ASCII text, maximum digest id
// ---------------------------------------------------------------------------

#[test]
fn vector_unicode_max_digest_id() {
    check(
        element(
            u32::MAX,
            "registered_family_name",
            ElementValue::text("Müller"),
            "ffffffffffffffffffffffffffffffff",
        ),
        r#"{"digestID":4294967295,"elementIdentifier":"registered_family_name","elementValue":{"type":"text","value":"Müller"},"random":"ffffffffffffffffffffffffffffffff"}"#,
        "50d1783358ef92202781b25159fa378c301ae77168cd5df98f660d2dd033ec57",
    );
}

// ---------------------------------------------------------------------------
// Vector 4: timestamp value
// ---------------------------------------------------------------------------

#[test]
fn vector_timestamp_issuance_date() {
    let ts = Timestamp::parse("2051-01-08T16:29:04Z").expect("valid timestamp");
    check(
        element(
            6,
            "issuance_date",
            ElementValue::Timestamp(ts),
            "00000000000000000000000000000000",
        ),
        r#"{"digestID":6,"elementIdentifier":"issuance_date","elementValue":{"type":"timestamp","value":"2051-01-08T16:29:04Z"},"random":"00000000000000000000000000000000"}"#,
        "71204e26c7a51975348a18d0fb2364c39949e32b2621f78016089a6d899f499e",
    );
}

#[test]
fn key_order_in_source_does_not_matter() {
    let a = serde_json::json!({"random": "00", "digestID": 1});
    let b = serde_json::json!({"digestID": 1, "random": "00"});
    assert_eq!(canonical_str(&a), canonical_str(&b));
}
