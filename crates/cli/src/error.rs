// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

use crate::channel::ChannelError;
use crate::sync::{EngineError, RemoteError};

/// All errors surfaced by the campanile library and command line.
///
/// Errors provide user-friendly messages with hints for common issues.
#[derive(Debug, Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("no session configured\n  hint: set [session] in the config file, or CAMPANILE_USER_ID and CAMPANILE_TOKEN")]
    NoSession,

    #[error("cannot determine state directory\n  hint: set sync.state_dir or CAMPANILE_STATE_DIR")]
    NoStateDir,

    #[error("invalid value for '{key}': {reason}\n  hint: values are JSON, e.g. true, 50, 1.5 or '\"dark\"'")]
    InvalidValue { key: String, reason: String },

    #[error("unknown setting: '{0}'\n  hint: known settings are: {known}", known = cp_core::keys::ALL.join(", "))]
    UnknownKey(String),

    #[error("sync did not complete: {}", .0.describe())]
    SyncIncomplete(cp_core::SyncStatus),

    #[error("event channel gave up after {0} reconnect attempts\n  hint: check server.ws_base and the session token, then run 'campanile listen' again")]
    ChannelExhausted(u32),

    #[error(transparent)]
    Core(#[from] cp_core::Error),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Remote(#[from] RemoteError),

    #[error(transparent)]
    Channel(#[from] ChannelError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias using the library's [`Error`] type.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
