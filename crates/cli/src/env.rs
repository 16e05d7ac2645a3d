// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access.
//!
//! All runtime environment variables used by the client are defined here
//! with typed accessor functions. The variable name constants are generated
//! by `build.rs` and live in the [`vars`] submodule.

use std::path::PathBuf;

/// Generated environment variable name constants.
pub mod vars {
    include!(concat!(env!("OUT_DIR"), "/env_vars.rs"));
}

/// Returns the value of `CAMPANILE_CONFIG` if set.
pub fn config_path() -> Option<PathBuf> {
    non_empty(vars::CAMPANILE_CONFIG).map(PathBuf::from)
}

/// Returns the value of `CAMPANILE_STATE_DIR` if set.
pub fn state_dir() -> Option<PathBuf> {
    non_empty(vars::CAMPANILE_STATE_DIR).map(PathBuf::from)
}

/// Returns the value of `CAMPANILE_USER_ID` if set.
pub fn user_id() -> Option<String> {
    non_empty(vars::CAMPANILE_USER_ID)
}

/// Returns the value of `CAMPANILE_TOKEN` if set.
pub fn token() -> Option<String> {
    non_empty(vars::CAMPANILE_TOKEN)
}

fn non_empty(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
