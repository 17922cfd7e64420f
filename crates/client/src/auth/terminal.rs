// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Terminal auth failure: clear the session and send the user to login.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, info};

use crate::session::SessionStore;

/// Where the user is and how to move them elsewhere.
pub trait Navigator: Send + Sync {
    /// Current location as a relative path plus query, e.g. `/contacts/?page=2`.
    fn current_location(&self) -> String;
    fn navigate(&self, target: &str);
}

/// Clears the session and redirects to login, at most once per generation.
pub struct TerminalFailureHandler {
    store: Arc<SessionStore>,
    navigator: Arc<dyn Navigator>,
    login_path: String,
    /// Highest store generation already handled.
    fired_through: Mutex<Option<u64>>,
}

impl TerminalFailureHandler {
    pub fn new(
        store: Arc<SessionStore>,
        navigator: Arc<dyn Navigator>,
        login_path: impl Into<String>,
    ) -> Self {
        Self { store, navigator, login_path: login_path.into(), fired_through: Mutex::new(None) }
    }

    /// Handle a terminal failure observed by a request stamped at `generation`.
    ///
    /// Returns `true` if this call performed the redirect. Concurrent failures
    /// from the same generation redirect once.
    pub fn handle(&self, generation: u64) -> bool {
        let target = {
            let mut fired = self.fired_through.lock();
            if fired.is_some_and(|through| generation <= through) {
                debug!(generation, "terminal failure already handled");
                return false;
            }
            let cleared = self.store.clear();
            *fired = Some(cleared);
            login_redirect(&self.login_path, &self.navigator.current_location())
        };

        info!(target = %target, "session ended, redirecting to login");
        self.navigator.navigate(&target);
        true
    }
}

/// Build the login target, carrying `next` only when it is a safe
/// same-origin relative path.
pub fn login_redirect(login_path: &str, next: &str) -> String {
    if !is_safe_next(next) || is_login_location(login_path, next) {
        return login_path.to_owned();
    }
    format!("{login_path}?next={}", urlencoding(next))
}

/// Whether `next` stays on this origin.
pub fn is_safe_next(next: &str) -> bool {
    next.starts_with('/')
        && !next.starts_with("//")
        && !next.contains('\\')
        && !next.chars().any(char::is_control)
}

fn is_login_location(login_path: &str, next: &str) -> bool {
    match next.strip_prefix(login_path) {
        Some(rest) => rest.is_empty() || rest.starts_with('?') || rest.starts_with('/'),
        None => false,
    }
}

/// Percent-encode a query value with the same literal set as
/// `encodeURIComponent`.
fn urlencoding(s: &str) -> String {
    s.bytes()
        .map(|b| match b {
            b'A'..=b'Z'
            | b'a'..=b'z'
            | b'0'..=b'9'
            | b'-'
            | b'_'
            | b'.'
            | b'~'
            | b'!'
            | b'\''
            | b'('
            | b')'
            | b'*' => (b as char).to_string(),
            _ => format!("%{b:02X}"),
        })
        .collect()
}

/// Navigator for the command line: reports the login target on stderr.
pub struct ConsoleNavigator {
    location: String,
}

impl ConsoleNavigator {
    pub fn new(location: impl Into<String>) -> Self {
        Self { location: location.into() }
    }
}

impl Navigator for ConsoleNavigator {
    fn current_location(&self) -> String {
        self.location.clone()
    }

    fn navigate(&self, target: &str) {
        eprintln!("session ended; sign in again: {target}");
    }
}

#[cfg(test)]
#[path = "terminal_tests.rs"]
mod tests;
