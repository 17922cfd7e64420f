// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fakes shared by unit and integration tests.

use std::collections::HashMap;
use std::sync::{Arc, Once};
use std::time::Duration;

use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use parking_lot::Mutex;
use reqwest::header::AUTHORIZATION;
use reqwest::StatusCode;

use crate::auth::Navigator;
use crate::transport::{ApiResponse, PreparedRequest, Transport};

static CRYPTO_PROVIDER: Once = Once::new();

/// Install the ring rustls provider. reqwest refuses to build a client
/// without one, even for plain HTTP.
pub fn ensure_crypto_provider() {
    CRYPTO_PROVIDER.call_once(|| {
        let _ = rustls::crypto::ring::default_provider().install_default();
    });
}

type Handler = Box<dyn Fn(&PreparedRequest) -> ApiResponse + Send + Sync>;

/// In-process transport answering from a closure.
pub struct ScriptedTransport {
    handler: Handler,
    delays: HashMap<String, Duration>,
    requests: Mutex<Vec<PreparedRequest>>,
}

impl ScriptedTransport {
    pub fn new(handler: impl Fn(&PreparedRequest) -> ApiResponse + Send + Sync + 'static) -> Self {
        Self { handler: Box::new(handler), delays: HashMap::new(), requests: Mutex::new(vec![]) }
    }

    /// Hold responses for `path` for `delay` before answering.
    pub fn delay(mut self, path: &str, delay: Duration) -> Self {
        self.delays.insert(path.to_owned(), delay);
        self
    }

    /// Every request sent so far, in send order.
    pub fn requests(&self) -> Vec<PreparedRequest> {
        self.requests.lock().clone()
    }

    pub fn count(&self, path: &str) -> usize {
        self.requests.lock().iter().filter(|r| r.path == path).count()
    }
}

impl Transport for ScriptedTransport {
    fn send(&self, request: PreparedRequest) -> BoxFuture<'_, anyhow::Result<ApiResponse>> {
        async move {
            self.requests.lock().push(request.clone());
            if let Some(delay) = self.delays.get(&request.path) {
                tokio::time::sleep(*delay).await;
            }
            Ok((self.handler)(&request))
        }
        .boxed()
    }
}

/// Navigator that records targets instead of moving anywhere.
pub struct RecordingNavigator {
    location: Mutex<String>,
    targets: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    pub fn new(location: &str) -> Arc<Self> {
        Arc::new(Self { location: Mutex::new(location.to_owned()), targets: Mutex::new(vec![]) })
    }

    pub fn set_location(&self, location: &str) {
        *self.location.lock() = location.to_owned();
    }

    pub fn targets(&self) -> Vec<String> {
        self.targets.lock().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn current_location(&self) -> String {
        self.location.lock().clone()
    }

    fn navigate(&self, target: &str) {
        self.targets.lock().push(target.to_owned());
    }
}

/// Token from a request's `Authorization: Bearer` header.
pub fn bearer(request: &PreparedRequest) -> Option<String> {
    request
        .headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::to_owned)
}

pub fn json_response(status: StatusCode, value: serde_json::Value) -> ApiResponse {
    ApiResponse::json_body(status, &value)
}

/// 401 as the API sends it for an expired access token.
pub fn expired_response() -> ApiResponse {
    json_response(
        StatusCode::UNAUTHORIZED,
        serde_json::json!({
            "detail": "Given token not valid for any token type",
            "code": "token_not_valid",
            "messages": [{
                "token_class": "AccessToken",
                "token_type": "access",
                "message": "Token is invalid or expired",
            }],
        }),
    )
}

/// 401 for a credential renewal cannot fix.
pub fn rejected_response() -> ApiResponse {
    json_response(
        StatusCode::UNAUTHORIZED,
        serde_json::json!({ "detail": "User is inactive", "code": "user_inactive" }),
    )
}
