// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Session store: access credential, renewal credential and active tenant.
//!
//! The in-memory [`Session`] is reconstructed from [`Storage`] on open and
//! every mutation is written through, so a restart picks up the same session
//! without logging in again. The store also tracks a generation counter that
//! advances whenever the access credential changes; requests remember the
//! generation they were stamped with.

pub mod storage;

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;
use tracing::warn;

pub use self::storage::{FileStorage, MemoryStorage, Storage};

/// Storage key for the access credential.
pub const ACCESS_KEY: &str = "corbi_token";
/// Storage key for the renewal credential.
pub const REFRESH_KEY: &str = "corbi_refresh";
/// Storage key for the active tenant id.
pub const TENANT_KEY: &str = "corbi_org";

/// Snapshot of the current session.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub access: Option<String>,
    pub refresh: Option<String>,
    pub tenant: Option<i64>,
}

impl Session {
    pub fn is_empty(&self) -> bool {
        self.access.is_none() && self.refresh.is_none() && self.tenant.is_none()
    }

    /// Credential-free summary, safe to print or log.
    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            authenticated: self.access.is_some(),
            renewable: self.refresh.is_some(),
            tenant: self.tenant,
        }
    }
}

// Credentials never end up in logs or panic messages.
impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("access", &self.access.as_ref().map(|_| "<redacted>"))
            .field("refresh", &self.refresh.as_ref().map(|_| "<redacted>"))
            .field("tenant", &self.tenant)
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SessionSummary {
    pub authenticated: bool,
    pub renewable: bool,
    pub tenant: Option<i64>,
}

/// Partial update for [`SessionStore::write`]. `None` fields are left alone;
/// an empty credential string removes that credential.
#[derive(Clone, Default)]
pub struct SessionPatch {
    pub access: Option<String>,
    pub refresh: Option<String>,
    pub tenant: Option<i64>,
}

impl SessionPatch {
    pub fn access(mut self, token: impl Into<String>) -> Self {
        self.access = Some(token.into());
        self
    }

    pub fn refresh(mut self, token: impl Into<String>) -> Self {
        self.refresh = Some(token.into());
        self
    }

    pub fn tenant(mut self, id: i64) -> Self {
        self.tenant = Some(id);
        self
    }
}

struct StoreState {
    session: Session,
    generation: u64,
}

/// Shared, write-through session store.
pub struct SessionStore {
    storage: Arc<dyn Storage>,
    state: Mutex<StoreState>,
}

impl SessionStore {
    /// Open a store, reconstructing the session from `storage`.
    pub fn open(storage: Arc<dyn Storage>) -> Self {
        let session = Session {
            access: load_entry(storage.as_ref(), ACCESS_KEY),
            refresh: load_entry(storage.as_ref(), REFRESH_KEY),
            tenant: load_entry(storage.as_ref(), TENANT_KEY).and_then(|raw| {
                match raw.trim().parse::<i64>() {
                    Ok(id) => Some(id),
                    Err(_) => {
                        warn!(key = TENANT_KEY, "ignoring stored tenant id that is not an integer");
                        None
                    }
                }
            }),
        };
        Self { storage, state: Mutex::new(StoreState { session, generation: 0 }) }
    }

    /// An empty store backed by [`MemoryStorage`].
    pub fn in_memory() -> Self {
        Self::open(Arc::new(MemoryStorage::new()))
    }

    pub fn read(&self) -> Session {
        self.state.lock().session.clone()
    }

    pub fn generation(&self) -> u64 {
        self.state.lock().generation
    }

    /// Session and generation read atomically.
    pub fn snapshot(&self) -> (Session, u64) {
        let state = self.state.lock();
        (state.session.clone(), state.generation)
    }

    /// Merge `patch` into the session and persist the changed entries.
    ///
    /// Returns the generation after the write.
    pub fn write(&self, patch: SessionPatch) -> u64 {
        let mut state = self.state.lock();

        if let Some(access) = patch.access {
            let access = non_empty(access);
            if access != state.session.access {
                state.generation += 1;
            }
            self.persist(ACCESS_KEY, access.as_deref());
            state.session.access = access;
        }
        if let Some(refresh) = patch.refresh {
            let refresh = non_empty(refresh);
            self.persist(REFRESH_KEY, refresh.as_deref());
            state.session.refresh = refresh;
        }
        if let Some(tenant) = patch.tenant {
            self.persist(TENANT_KEY, Some(&tenant.to_string()));
            state.session.tenant = Some(tenant);
        }

        state.generation
    }

    /// Remove every entry. Always advances the generation.
    pub fn clear(&self) -> u64 {
        let mut state = self.state.lock();
        for key in [ACCESS_KEY, REFRESH_KEY, TENANT_KEY] {
            self.persist(key, None);
        }
        state.session = Session::default();
        state.generation += 1;
        state.generation
    }

    fn persist(&self, key: &str, value: Option<&str>) {
        let result = match value {
            Some(v) => self.storage.set(key, v),
            None => self.storage.remove(key),
        };
        if let Err(e) = result {
            warn!(key, err = %e, "failed to persist session entry");
        }
    }
}

fn load_entry(storage: &dyn Storage, key: &str) -> Option<String> {
    match storage.get(key) {
        Ok(value) => value.and_then(non_empty),
        Err(e) => {
            warn!(key, err = %e, "failed to load session entry");
            None
        }
    }
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
