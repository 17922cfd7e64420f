// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Single-flight access credential renewal.
//!
//! The first caller to see an expired credential starts a renewal cycle and
//! every caller that fails while the cycle is pending joins it. Each cycle
//! performs exactly one exchange against the renewal endpoint:
//!
//! ```text
//! Idle ──(first eligible failure)──▶ AwaitingExchange
//! AwaitingExchange ──(new access credential)──▶ Success ──▶ Idle
//! AwaitingExchange ──(rejected / unreachable)──▶ Failed ──▶ Idle
//! ```
//!
//! When a cycle settles, the session store has already been written (or
//! cleared) and the pending marker has already been removed before any joiner
//! is woken, so a joiner acting on the outcome can start the next cycle.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use futures_util::future::{BoxFuture, Shared};
use futures_util::FutureExt;
use parking_lot::Mutex;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::session::{Session, SessionPatch, SessionStore};
use crate::transport::{inject, RequestEnvelope, Transport};

/// Result of a renewal cycle, shared by every caller that joined it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenewalOutcome {
    /// A new access credential was stored at `generation`.
    Renewed { cycle: u64, generation: u64 },
    /// The exchange failed and the session was cleared.
    Failed { cycle: u64, reason: String },
}

impl RenewalOutcome {
    pub fn cycle(&self) -> u64 {
        match self {
            Self::Renewed { cycle, .. } | Self::Failed { cycle, .. } => *cycle,
        }
    }
}

/// Observable coordinator state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenewalState {
    Idle,
    AwaitingExchange { cycle: u64 },
}

/// Renewal endpoint response.
#[derive(Debug, Deserialize)]
struct RenewalResponse {
    #[serde(default)]
    access: Option<String>,
    /// Present only when the server rotates renewal credentials.
    #[serde(default)]
    refresh: Option<String>,
}

type OutcomeFuture = Shared<BoxFuture<'static, RenewalOutcome>>;

struct PendingRenewal {
    cycle: u64,
    outcome: OutcomeFuture,
}

struct Inner {
    store: Arc<SessionStore>,
    transport: Arc<dyn Transport>,
    renewal_path: String,
    pending: Mutex<Option<PendingRenewal>>,
    cycles: AtomicU64,
}

/// Drives at most one renewal exchange at a time.
#[derive(Clone)]
pub struct RenewalCoordinator {
    inner: Arc<Inner>,
}

impl RenewalCoordinator {
    pub fn new(
        store: Arc<SessionStore>,
        transport: Arc<dyn Transport>,
        renewal_path: impl Into<String>,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                store,
                transport,
                renewal_path: renewal_path.into(),
                pending: Mutex::new(None),
                cycles: AtomicU64::new(0),
            }),
        }
    }

    pub fn state(&self) -> RenewalState {
        match *self.inner.pending.lock() {
            Some(ref pending) => RenewalState::AwaitingExchange { cycle: pending.cycle },
            None => RenewalState::Idle,
        }
    }

    /// Number of cycles started so far.
    pub fn cycles_started(&self) -> u64 {
        self.inner.cycles.load(Ordering::SeqCst)
    }

    /// Start a renewal cycle, or join the one already in flight.
    ///
    /// `observed` is the session generation the failing request was sent
    /// under. If a cycle has already replaced that credential, no new
    /// exchange starts and the current generation is returned as renewed.
    pub async fn renew(&self, observed: u64) -> RenewalOutcome {
        let outcome = {
            let mut pending = self.inner.pending.lock();
            if let Some(current) = pending.as_ref() {
                debug!(cycle = current.cycle, "joining pending renewal");
                current.outcome.clone()
            } else {
                let (session, generation) = self.inner.store.snapshot();
                if generation != observed && session.access.is_some() {
                    let cycle = self.inner.cycles.load(Ordering::SeqCst);
                    debug!(cycle, observed, generation, "credential already renewed");
                    return RenewalOutcome::Renewed { cycle, generation };
                }
                let cycle = self.inner.cycles.fetch_add(1, Ordering::SeqCst) + 1;
                debug!(cycle, "starting renewal");
                let inner = Arc::clone(&self.inner);
                let outcome = inner.exchange(cycle).boxed().shared();
                *pending = Some(PendingRenewal { cycle, outcome: outcome.clone() });
                outcome
            }
        };
        outcome.await
    }
}

impl Inner {
    async fn exchange(self: Arc<Self>, cycle: u64) -> RenewalOutcome {
        let outcome = match self.request_access().await {
            Ok(generation) => {
                info!(cycle, "access credential renewed");
                RenewalOutcome::Renewed { cycle, generation }
            }
            Err(e) => {
                warn!(cycle, err = %e, "renewal failed, clearing session");
                self.store.clear();
                RenewalOutcome::Failed { cycle, reason: format!("{e:#}") }
            }
        };

        // Back to Idle before any joiner observes the outcome.
        {
            let mut pending = self.pending.lock();
            if pending.as_ref().is_some_and(|p| p.cycle == cycle) {
                *pending = None;
            }
        }
        outcome
    }

    /// Perform the exchange and store the result. Returns the new generation.
    async fn request_access(&self) -> anyhow::Result<u64> {
        let refresh = self
            .store
            .read()
            .refresh
            .ok_or_else(|| anyhow::anyhow!("no renewal credential"))?;

        let envelope =
            RequestEnvelope::post(&self.renewal_path, serde_json::json!({ "refresh": refresh }))
                .anonymous();
        let response = self.transport.send(inject(&envelope, &Session::default())).await?;
        if !response.is_success() {
            anyhow::bail!("renewal rejected ({})", response.status);
        }

        let body: RenewalResponse = response.json_object()?;
        let access = body
            .access
            .filter(|a| !a.is_empty())
            .ok_or_else(|| anyhow::anyhow!("renewal response carried no access credential"))?;

        // Access and a rotated renewal credential land in one write.
        let mut patch = SessionPatch::default().access(access);
        if let Some(rotated) = body.refresh.filter(|r| !r.is_empty()) {
            patch = patch.refresh(rotated);
        }
        Ok(self.store.write(patch))
    }
}

#[cfg(test)]
#[path = "renewal_tests.rs"]
mod tests;
