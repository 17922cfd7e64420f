// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Auth failure handling: classification, renewal and terminal redirect.

pub mod classify;
pub mod renewal;
pub mod terminal;

pub use self::classify::{classify, Classification};
pub use self::renewal::{RenewalCoordinator, RenewalOutcome, RenewalState};
pub use self::terminal::{login_redirect, ConsoleNavigator, Navigator, TerminalFailureHandler};
