// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Response classification: which failures renewal can fix.

use reqwest::header::WWW_AUTHENTICATE;
use reqwest::StatusCode;
use serde::Deserialize;

use crate::transport::ApiResponse;

/// How the pipeline should treat a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Ok,
    /// The access credential expired; renewal may recover the request.
    ExpiredAuth,
    /// The credential is missing, malformed or revoked.
    OtherAuthFailure,
    /// Not an auth problem. Goes back to the caller as-is.
    OtherError,
}

/// Reason code the server uses for rejected JWTs.
const TOKEN_NOT_VALID: &str = "token_not_valid";
const TOKEN_EXPIRED: &str = "token_expired";

/// Error body returned by the API for auth failures.
#[derive(Debug, Default, Deserialize)]
struct AuthErrorBody {
    #[serde(default)]
    detail: Option<String>,
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    messages: Vec<TokenMessage>,
}

#[derive(Debug, Default, Deserialize)]
struct TokenMessage {
    #[serde(default)]
    message: Option<String>,
}

pub fn classify(response: &ApiResponse) -> Classification {
    if response.is_success() {
        return Classification::Ok;
    }
    if response.status != StatusCode::UNAUTHORIZED {
        return Classification::OtherError;
    }
    if expiry_signalled(response) {
        Classification::ExpiredAuth
    } else {
        Classification::OtherAuthFailure
    }
}

/// Human-readable reason from an auth failure body, if the server sent one.
pub fn auth_detail(response: &ApiResponse) -> Option<String> {
    response.json::<AuthErrorBody>().ok().and_then(|body| body.detail)
}

fn expiry_signalled(response: &ApiResponse) -> bool {
    let challenge = response
        .headers
        .get(WWW_AUTHENTICATE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(mentions_expiry);
    if challenge {
        return true;
    }

    let Ok(body) = response.json::<AuthErrorBody>() else {
        return false;
    };
    match body.code.as_deref() {
        Some(TOKEN_EXPIRED) => true,
        Some(TOKEN_NOT_VALID) => {
            body.detail.as_deref().is_some_and(mentions_expiry)
                || body.messages.iter().filter_map(|m| m.message.as_deref()).any(mentions_expiry)
        }
        _ => false,
    }
}

fn mentions_expiry(text: &str) -> bool {
    text.to_ascii_lowercase().contains("expired")
}

#[cfg(test)]
#[path = "classify_tests.rs"]
mod tests;
