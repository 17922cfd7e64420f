// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION};
use tracing::warn;

use crate::session::Session;
use crate::transport::{PreparedRequest, RequestEnvelope};

/// Header carrying the active tenant id.
pub const TENANT_HEADER: HeaderName = HeaderName::from_static("x-org-id");

/// Stamp `envelope` with the session's access credential and tenant.
///
/// Absent values produce no header. A credential that cannot be encoded as a
/// header value is dropped with a warning rather than failing the request.
pub fn inject(envelope: &RequestEnvelope, session: &Session) -> PreparedRequest {
    let mut headers = HeaderMap::new();

    if !envelope.anonymous {
        if let Some(ref token) = session.access {
            match HeaderValue::from_str(&format!("Bearer {token}")) {
                Ok(mut value) => {
                    value.set_sensitive(true);
                    headers.insert(AUTHORIZATION, value);
                }
                Err(_) => warn!("access credential is not a valid header value, omitting"),
            }
        }
        if let Some(tenant) = session.tenant {
            headers.insert(TENANT_HEADER, HeaderValue::from(tenant));
        }
    }

    PreparedRequest {
        method: envelope.method.clone(),
        path: envelope.path.clone(),
        headers,
        body: envelope.body.clone(),
    }
}

#[cfg(test)]
#[path = "inject_tests.rs"]
mod tests;
