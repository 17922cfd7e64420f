// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

/// Command-line client for the Corbi messaging console API.
#[derive(Debug, Parser)]
#[command(name = "corbi", version, about)]
pub struct Cli {
    #[command(flatten)]
    pub config: ClientConfig,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, clap::Subcommand)]
pub enum Command {
    /// Sign in and store the session.
    Login {
        #[arg(long, env = "CORBI_USERNAME")]
        username: String,
        #[arg(long, env = "CORBI_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Forget the stored session.
    Logout,
    /// Set the active organization.
    Org { id: i64 },
    /// List the organizations this user belongs to.
    Memberships,
    /// Show whether a session is stored (never prints credentials).
    Status,
    /// Send a request through the authenticated pipeline and print the body.
    Request {
        /// HTTP method (GET, POST, PUT, PATCH, DELETE).
        method: String,
        /// Path relative to the API base URL, e.g. `/contacts/`.
        path: String,
        /// JSON request body.
        #[arg(long)]
        data: Option<String>,
    },
}

/// Client configuration shared by every command.
#[derive(Debug, Clone, clap::Args)]
pub struct ClientConfig {
    /// Base URL of the API.
    #[arg(long, default_value = "http://127.0.0.1:8000/api", env = "CORBI_API_URL")]
    pub api_url: String,

    /// Directory holding the persisted session.
    #[arg(long, env = "CORBI_STATE_DIR")]
    pub state_dir: Option<PathBuf>,

    /// Per-request timeout in milliseconds.
    #[arg(long, default_value_t = 30000, env = "CORBI_TIMEOUT_MS")]
    pub timeout_ms: u64,

    /// Login page path used for redirects after the session ends.
    #[arg(long, default_value = "/login", env = "CORBI_LOGIN_PATH")]
    pub login_path: String,

    /// Log filter (e.g. "warn", "corbi_client=debug").
    #[arg(long, default_value = "warn", env = "CORBI_LOG_LEVEL")]
    pub log_level: String,

    /// Log format: "text" or "json".
    #[arg(long, default_value = "text", env = "CORBI_LOG_FORMAT")]
    pub log_format: String,
}

impl ClientConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        if !(self.api_url.starts_with("http://") || self.api_url.starts_with("https://")) {
            anyhow::bail!("--api-url must be an http(s) URL: {}", self.api_url);
        }
        if self.timeout_ms == 0 {
            anyhow::bail!("--timeout-ms must be greater than zero");
        }
        if !self.login_path.starts_with('/') || self.login_path.starts_with("//") {
            anyhow::bail!("--login-path must be a relative path: {}", self.login_path);
        }
        match self.log_format.as_str() {
            "text" | "json" => Ok(()),
            other => anyhow::bail!("invalid log format: {other}"),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Resolved state directory (explicit flag or the platform default).
    pub fn state_dir(&self) -> PathBuf {
        self.state_dir.clone().unwrap_or_else(default_state_dir)
    }

    pub fn endpoints(&self) -> Endpoints {
        Endpoints { login_page: self.login_path.clone(), ..Endpoints::default() }
    }
}

/// API paths the pipeline talks to on its own behalf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    /// Credential exchange for username/password.
    pub login: String,
    /// Renewal exchange.
    pub renewal: String,
    pub memberships: String,
    /// Login page the terminal handler redirects to.
    pub login_page: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            login: "/auth/token/".to_owned(),
            renewal: "/auth/token/refresh/".to_owned(),
            memberships: "/memberships/".to_owned(),
            login_page: "/login".to_owned(),
        }
    }
}

/// Resolve the default state directory from the process environment.
pub fn default_state_dir() -> PathBuf {
    state_dir_with(|name| std::env::var(name).ok())
}

/// Checks `CORBI_STATE_DIR`, then `$XDG_STATE_HOME/corbi`, then
/// `$HOME/.local/state/corbi`.
pub fn state_dir_with(env: impl Fn(&str) -> Option<String>) -> PathBuf {
    if let Some(dir) = env("CORBI_STATE_DIR").filter(|d| !d.is_empty()) {
        return PathBuf::from(dir);
    }
    if let Some(xdg) = env("XDG_STATE_HOME").filter(|d| !d.is_empty()) {
        return PathBuf::from(xdg).join("corbi");
    }
    if let Some(home) = env("HOME").filter(|d| !d.is_empty()) {
        return PathBuf::from(home).join(".local/state/corbi");
    }
    PathBuf::from(".corbi")
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
