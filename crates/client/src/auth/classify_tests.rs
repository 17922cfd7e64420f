// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use reqwest::header::HeaderValue;
use serde_json::json;

use super::*;
use crate::test_support::{expired_response, json_response, rejected_response};

#[yare::parameterized(
    ok = { json_response(StatusCode::OK, json!([])), Classification::Ok },
    created = { json_response(StatusCode::CREATED, json!({ "id": 1 })), Classification::Ok },
    expired_jwt = { expired_response(), Classification::ExpiredAuth },
    expired_code = {
        json_response(StatusCode::UNAUTHORIZED, json!({ "code": "token_expired" })),
        Classification::ExpiredAuth
    },
    expired_detail = {
        json_response(StatusCode::UNAUTHORIZED, json!({ "code": "token_not_valid", "detail": "Token has expired" })),
        Classification::ExpiredAuth
    },
    not_valid_without_expiry = {
        json_response(StatusCode::UNAUTHORIZED, json!({ "code": "token_not_valid", "detail": "Token is malformed" })),
        Classification::OtherAuthFailure
    },
    inactive_user = { rejected_response(), Classification::OtherAuthFailure },
    missing_credentials = {
        json_response(StatusCode::UNAUTHORIZED, json!({ "detail": "Authentication credentials were not provided." })),
        Classification::OtherAuthFailure
    },
    expired_outside_code = {
        json_response(StatusCode::UNAUTHORIZED, json!({ "detail": "Signature has expired" })),
        Classification::OtherAuthFailure
    },
    non_json_401 = { ApiResponse::new(StatusCode::UNAUTHORIZED, "nope"), Classification::OtherAuthFailure },
    forbidden_tenant = {
        json_response(StatusCode::FORBIDDEN, json!({ "detail": "X-Org-ID header is required." })),
        Classification::OtherError
    },
    forbidden_expired_text = {
        json_response(StatusCode::FORBIDDEN, json!({ "code": "token_not_valid", "detail": "expired" })),
        Classification::OtherError
    },
    validation = { json_response(StatusCode::BAD_REQUEST, json!({ "body": ["required"] })), Classification::OtherError },
    server_error = { ApiResponse::new(StatusCode::INTERNAL_SERVER_ERROR, ""), Classification::OtherError },
)]
fn classifies(response: ApiResponse, expected: Classification) {
    assert_eq!(classify(&response), expected);
}

#[test]
fn www_authenticate_expiry_is_recognized() {
    let mut response = ApiResponse::new(StatusCode::UNAUTHORIZED, "");
    response.headers.insert(
        WWW_AUTHENTICATE,
        HeaderValue::from_static(r#"Bearer error="invalid_token", error_description="The access token expired""#),
    );
    assert_eq!(classify(&response), Classification::ExpiredAuth);
}

#[test]
fn detail_is_extracted() {
    assert_eq!(auth_detail(&rejected_response()).as_deref(), Some("User is inactive"));
    assert_eq!(auth_detail(&ApiResponse::new(StatusCode::UNAUTHORIZED, "<html>")), None);
}
