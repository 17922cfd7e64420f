// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::test_support::ensure_crypto_provider;

fn transport() -> anyhow::Result<HttpTransport> {
    ensure_crypto_provider();
    HttpTransport::new("http://api.test/api/", Duration::from_secs(1))
}

#[yare::parameterized(
    plain = { "/contacts/", Some("http://api.test/api/contacts/") },
    query = { "/bookings/?page=2", Some("http://api.test/api/bookings/?page=2") },
    absolute = { "https://evil.example/x", None },
    protocol_relative = { "//evil.example/x", None },
    bare = { "contacts/", None },
)]
fn url_only_accepts_relative_paths(path: &str, expected: Option<&str>) {
    let resolved = transport().and_then(|t| t.url(path));
    assert_eq!(resolved.ok().as_deref(), expected);
}

#[test]
fn base_url_trailing_slash_is_trimmed() -> anyhow::Result<()> {
    let transport = transport()?;
    assert_eq!(transport.url("/memberships/")?, "http://api.test/api/memberships/");
    Ok(())
}

#[test]
fn object_decode_rejects_arrays() -> anyhow::Result<()> {
    #[derive(serde::Deserialize)]
    struct Pair {
        access: String,
    }

    let object = ApiResponse::json_body(StatusCode::OK, &serde_json::json!({ "access": "a" }));
    assert_eq!(object.json_object::<Pair>()?.access, "a");

    let array = ApiResponse::json_body(StatusCode::OK, &serde_json::json!(["a"]));
    assert!(array.json::<Pair>().is_ok());
    assert!(array.json_object::<Pair>().is_err());
    Ok(())
}

#[test]
fn envelope_builders() {
    let envelope = RequestEnvelope::post("/outbound/", serde_json::json!({ "body": "hi" }));
    assert_eq!(envelope.method, Method::POST);
    assert!(!envelope.retried);
    assert!(!envelope.anonymous);
    assert!(envelope.clone().anonymous().anonymous);
}

#[test]
fn response_helpers() -> anyhow::Result<()> {
    let resp = ApiResponse::json_body(StatusCode::OK, &serde_json::json!({ "id": 3 }));
    assert!(resp.is_success());
    let value: serde_json::Value = resp.json()?;
    assert_eq!(value["id"], 3);
    assert_eq!(ApiResponse::new(StatusCode::NO_CONTENT, "").text(), "");
    Ok(())
}
