// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use reqwest::StatusCode;

use super::*;

#[yare::parameterized(
    session_expired = { ClientError::SessionExpired, "SESSION_EXPIRED", 3 },
    auth_rejected = { ClientError::AuthRejected { status: 401, detail: None }, "AUTH_REJECTED", 3 },
    http_status = { ClientError::Status(ApiResponse::new(StatusCode::BAD_GATEWAY, "")), "HTTP_STATUS", 4 },
    transport = { ClientError::Transport("connection refused".into()), "TRANSPORT", 5 },
    decode = { ClientError::Decode("missing field".into()), "DECODE", 6 },
)]
fn code_mapping(err: ClientError, code: &str, exit: u8) {
    assert_eq!(err.code().as_str(), code);
    assert_eq!(err.code().exit_code(), exit);
}

#[test]
fn status_display_includes_body() {
    let err = ClientError::Status(ApiResponse::new(
        StatusCode::FORBIDDEN,
        r#"{"detail":"X-Org-ID header is required."}"#,
    ));
    let text = err.to_string();
    assert!(text.starts_with("request failed (403 Forbidden)"), "{text}");
    assert!(text.contains("X-Org-ID header is required."));
}

#[test]
fn auth_rejected_display() {
    let err = ClientError::AuthRejected { status: 401, detail: Some("User is inactive".into()) };
    assert_eq!(err.to_string(), "authentication rejected (401): User is inactive");
    assert_eq!(ClientError::SessionExpired.to_string(), "session expired");
}
