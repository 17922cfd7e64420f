// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::fmt;

use crate::transport::ApiResponse;

/// Errors surfaced to callers of the request pipeline.
///
/// Renewal exchange failures never appear here directly: callers whose
/// request could not be recovered observe [`ClientError::SessionExpired`].
#[derive(Debug)]
pub enum ClientError {
    /// The access credential expired and could not be renewed.
    SessionExpired,
    /// The server rejected the credential for a reason renewal cannot fix.
    AuthRejected { status: u16, detail: Option<String> },
    /// A non-auth failure response, passed through untouched.
    Status(ApiResponse),
    /// The request never produced a response (connect error, timeout).
    Transport(String),
    /// A success response whose body did not have the expected shape.
    Decode(String),
}

impl ClientError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::SessionExpired => ErrorCode::SessionExpired,
            Self::AuthRejected { .. } => ErrorCode::AuthRejected,
            Self::Status(_) => ErrorCode::HttpStatus,
            Self::Transport(_) => ErrorCode::Transport,
            Self::Decode(_) => ErrorCode::Decode,
        }
    }
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SessionExpired => f.write_str("session expired"),
            Self::AuthRejected { status, detail: Some(detail) } => {
                write!(f, "authentication rejected ({status}): {detail}")
            }
            Self::AuthRejected { status, detail: None } => {
                write!(f, "authentication rejected ({status})")
            }
            Self::Status(resp) => {
                let text = resp.text();
                if text.is_empty() {
                    write!(f, "request failed ({})", resp.status)
                } else {
                    write!(f, "request failed ({}): {text}", resp.status)
                }
            }
            Self::Transport(msg) => write!(f, "transport error: {msg}"),
            Self::Decode(msg) => write!(f, "unexpected response body: {msg}"),
        }
    }
}

impl std::error::Error for ClientError {}

/// Machine-readable error codes, stable across releases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    SessionExpired,
    AuthRejected,
    HttpStatus,
    Transport,
    Decode,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SessionExpired => "SESSION_EXPIRED",
            Self::AuthRejected => "AUTH_REJECTED",
            Self::HttpStatus => "HTTP_STATUS",
            Self::Transport => "TRANSPORT",
            Self::Decode => "DECODE",
        }
    }

    /// Process exit code used by the `corbi` binary.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::SessionExpired | Self::AuthRejected => 3,
            Self::HttpStatus => 4,
            Self::Transport => 5,
            Self::Decode => 6,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
