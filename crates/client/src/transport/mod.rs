// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Request envelopes and the HTTP transport they are sent over.

pub mod inject;

use std::time::Duration;

use anyhow::Context;
use bytes::Bytes;
use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use reqwest::header::HeaderMap;
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;

pub use self::inject::inject;

/// A request as issued by a caller, before credentials are attached.
#[derive(Debug, Clone)]
pub struct RequestEnvelope {
    pub method: Method,
    /// Path relative to the API base URL, e.g. `/contacts/`.
    pub path: String,
    pub body: Option<serde_json::Value>,
    /// Set once the request has been replayed after a renewal.
    pub retried: bool,
    /// Anonymous requests (login, renewal) never carry credentials.
    pub anonymous: bool,
}

impl RequestEnvelope {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self { method, path: path.into(), body: None, retried: false, anonymous: false }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>, body: serde_json::Value) -> Self {
        Self::new(Method::POST, path).with_body(body)
    }

    pub fn with_body(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn anonymous(mut self) -> Self {
        self.anonymous = true;
        self
    }
}

/// A request with its credential headers attached, ready for the wire.
#[derive(Debug, Clone)]
pub struct PreparedRequest {
    pub method: Method,
    pub path: String,
    pub headers: HeaderMap,
    pub body: Option<serde_json::Value>,
}

/// A fully-read HTTP response.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl ApiResponse {
    pub fn new(status: StatusCode, body: impl Into<Bytes>) -> Self {
        Self { status, headers: HeaderMap::new(), body: body.into() }
    }

    pub fn json_body(status: StatusCode, value: &serde_json::Value) -> Self {
        Self::new(status, value.to_string())
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    pub fn json<T: DeserializeOwned>(&self) -> anyhow::Result<T> {
        Ok(serde_json::from_slice(&self.body)?)
    }

    /// Decode a body that must be a JSON object. Arrays and scalars are
    /// rejected even when `T` would accept them positionally.
    pub fn json_object<T: DeserializeOwned>(&self) -> anyhow::Result<T> {
        match serde_json::from_slice::<serde_json::Value>(&self.body)? {
            value @ serde_json::Value::Object(_) => Ok(serde_json::from_value(value)?),
            _ => anyhow::bail!("expected a JSON object body"),
        }
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Sends prepared requests. The pipeline only ever talks to the network
/// through this seam.
pub trait Transport: Send + Sync + 'static {
    fn send(&self, request: PreparedRequest) -> BoxFuture<'_, anyhow::Result<ApiResponse>>;
}

/// [`Transport`] over reqwest, rooted at a single API base URL.
pub struct HttpTransport {
    base_url: String,
    client: Client,
}

impl HttpTransport {
    /// Fails when the HTTP client cannot be built, e.g. when no rustls
    /// crypto provider has been installed.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build HTTP client")?;
        let base_url = base_url.into().trim_end_matches('/').to_owned();
        Ok(Self { base_url, client })
    }

    /// Resolve a request path against the base URL.
    ///
    /// Only relative paths are accepted so credentials never leave the
    /// configured origin.
    fn url(&self, path: &str) -> anyhow::Result<String> {
        if !path.starts_with('/') || path.starts_with("//") {
            anyhow::bail!("request path must be relative to the API base: {path}");
        }
        Ok(format!("{}{}", self.base_url, path))
    }
}

impl Transport for HttpTransport {
    fn send(&self, request: PreparedRequest) -> BoxFuture<'_, anyhow::Result<ApiResponse>> {
        async move {
            let url = self.url(&request.path)?;
            let mut req = self.client.request(request.method, url).headers(request.headers);
            if let Some(ref body) = request.body {
                req = req.json(body);
            }
            let resp = req.send().await?;
            let status = resp.status();
            let headers = resp.headers().clone();
            let body = resp.bytes().await?;
            Ok(ApiResponse { status, headers, body })
        }
        .boxed()
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
