// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Corbi client: authenticated API pipeline for the messaging console.

pub mod auth;
pub mod command;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod session;
pub mod test_support;
pub mod transport;

use std::sync::Arc;

use crate::auth::Navigator;
use crate::config::ClientConfig;
use crate::pipeline::ApiClient;
use crate::session::{FileStorage, SessionStore};
use crate::transport::HttpTransport;

/// Build a client from configuration, with the session persisted under the
/// configured state directory.
pub fn build_client(
    config: &ClientConfig,
    navigator: Arc<dyn Navigator>,
) -> anyhow::Result<ApiClient> {
    let storage = Arc::new(FileStorage::new(config.state_dir()));
    let store = Arc::new(SessionStore::open(storage));
    let transport = Arc::new(HttpTransport::new(config.api_url.clone(), config.timeout())?);
    Ok(ApiClient::new(store, transport, navigator, config.endpoints()))
}
