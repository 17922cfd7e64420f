// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Authenticated request pipeline.
//!
//! Every request is stamped from the session store, sent, and classified.
//! Expired credentials are renewed through the [`RenewalCoordinator`] and the
//! request is replayed once; anything renewal cannot fix goes to the
//! [`TerminalFailureHandler`].

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::auth::classify::auth_detail;
use crate::auth::{
    classify, Classification, Navigator, RenewalCoordinator, RenewalOutcome,
    TerminalFailureHandler,
};
use crate::config::Endpoints;
use crate::error::ClientError;
use crate::session::{SessionPatch, SessionStore};
use crate::transport::{inject, ApiResponse, RequestEnvelope, Transport};

/// Organization a user belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub domain: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Membership {
    pub id: i64,
    pub role: String,
    pub organization: Organization,
}

/// Credentials issued by the login exchange.
#[derive(Deserialize)]
struct TokenPair {
    access: String,
    #[serde(default)]
    refresh: Option<String>,
}

/// The API client every resource helper calls through.
pub struct ApiClient {
    store: Arc<SessionStore>,
    transport: Arc<dyn Transport>,
    renewal: RenewalCoordinator,
    terminal: TerminalFailureHandler,
    endpoints: Endpoints,
}

impl ApiClient {
    pub fn new(
        store: Arc<SessionStore>,
        transport: Arc<dyn Transport>,
        navigator: Arc<dyn Navigator>,
        endpoints: Endpoints,
    ) -> Self {
        let renewal = RenewalCoordinator::new(
            Arc::clone(&store),
            Arc::clone(&transport),
            endpoints.renewal.clone(),
        );
        let terminal =
            TerminalFailureHandler::new(Arc::clone(&store), navigator, endpoints.login_page.clone());
        Self { store, transport, renewal, terminal, endpoints }
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.store
    }

    pub fn renewal(&self) -> &RenewalCoordinator {
        &self.renewal
    }

    /// Send `envelope`, renewing and replaying once if the credential expired.
    pub async fn execute(&self, mut envelope: RequestEnvelope) -> Result<ApiResponse, ClientError> {
        loop {
            let (session, generation) = self.store.snapshot();
            let response = self
                .transport
                .send(inject(&envelope, &session))
                .await
                .map_err(|e| ClientError::Transport(format!("{e:#}")))?;

            let classification = classify(&response);
            match classification {
                Classification::Ok => return Ok(response),
                Classification::OtherError => return Err(ClientError::Status(response)),
                Classification::ExpiredAuth | Classification::OtherAuthFailure
                    if envelope.anonymous =>
                {
                    return Err(ClientError::AuthRejected {
                        status: response.status.as_u16(),
                        detail: auth_detail(&response),
                    });
                }
                Classification::OtherAuthFailure => {
                    warn!(path = %envelope.path, status = %response.status, "credential rejected");
                    self.terminal.handle(generation);
                    return Err(ClientError::AuthRejected {
                        status: response.status.as_u16(),
                        detail: auth_detail(&response),
                    });
                }
                Classification::ExpiredAuth => {}
            }

            if envelope.retried {
                warn!(path = %envelope.path, "replayed request rejected as expired");
                self.terminal.handle(generation);
                return Err(ClientError::SessionExpired);
            }

            let (current, current_generation) = self.store.snapshot();
            if current_generation != generation && current.access.is_some() {
                debug!(path = %envelope.path, "credential renewed since send, replaying");
                envelope.retried = true;
                continue;
            }
            if current.refresh.is_none() {
                debug!(path = %envelope.path, "no renewal credential");
                self.terminal.handle(generation);
                return Err(ClientError::SessionExpired);
            }

            match self.renewal.renew(generation).await {
                RenewalOutcome::Renewed { cycle, .. } => {
                    debug!(cycle, path = %envelope.path, "replaying after renewal");
                    envelope.retried = true;
                }
                RenewalOutcome::Failed { cycle, .. } => {
                    debug!(cycle, path = %envelope.path, "renewal failed");
                    self.terminal.handle(generation);
                    return Err(ClientError::SessionExpired);
                }
            }
        }
    }

    /// Execute and decode a JSON response body.
    pub async fn execute_json<T: DeserializeOwned>(
        &self,
        envelope: RequestEnvelope,
    ) -> Result<T, ClientError> {
        let response = self.execute(envelope).await?;
        response.json().map_err(|e| ClientError::Decode(format!("{e:#}")))
    }

    /// Exchange username and password for a fresh session.
    ///
    /// Any previous session is discarded. When the user belongs to exactly
    /// one organization it becomes the active tenant.
    pub async fn login(&self, username: &str, password: &str) -> Result<(), ClientError> {
        let envelope = RequestEnvelope::post(
            &self.endpoints.login,
            serde_json::json!({ "username": username, "password": password }),
        )
        .anonymous();
        let tokens: TokenPair = self
            .execute(envelope)
            .await?
            .json_object()
            .map_err(|e| ClientError::Decode(format!("{e:#}")))?;

        self.store.clear();
        let mut patch = SessionPatch::default().access(tokens.access);
        if let Some(refresh) = tokens.refresh {
            patch = patch.refresh(refresh);
        }
        self.store.write(patch);
        info!(username, "logged in");

        match self.memberships().await {
            Ok(memberships) => {
                if let [only] = memberships.as_slice() {
                    self.select_tenant(only.organization.id);
                }
            }
            Err(e) => warn!(err = %e, "could not load memberships after login"),
        }
        Ok(())
    }

    pub async fn memberships(&self) -> Result<Vec<Membership>, ClientError> {
        self.execute_json(RequestEnvelope::get(&self.endpoints.memberships)).await
    }

    /// Switch the active tenant. The access credential stays valid.
    pub fn select_tenant(&self, id: i64) {
        self.store.write(SessionPatch::default().tenant(id));
        info!(tenant = id, "active organization selected");
    }

    pub fn logout(&self) {
        self.store.clear();
        info!("logged out");
    }
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;
