// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! cplib - client core for the campus alerting app.
//!
//! This crate provides the functionality behind the `campanile` CLI:
//! offline-first preference sync and a live alert channel that survives
//! network drops.
//!
//! # Main Components
//!
//! - [`sync::SyncEngine`] - local-first preference store that reconciles with the server
//! - [`channel::EventChannel`] - WebSocket channel with bounded exponential reconnect
//! - [`session::SessionGlue`] - wires both to login and logout transitions
//! - [`Config`] - endpoints, sync and reconnect tuning, optional session
//! - [`Error`] - Error types for all operations
//!
//! # Usage
//!
//! ```rust,ignore
//! use cplib::session::{Session, SessionContext};
//! use cplib::sync::{HttpRemote, SyncEngine};
//!
//! let sessions = SessionContext::new();
//! let remote = HttpRemote::new("https://api.example.edu", sessions.clone(), None)?;
//! let engine = SyncEngine::new(slot, Arc::new(remote), Default::default());
//! engine.initialize(false).await;
//! engine.update("dark_mode", json!(true));
//! ```

mod cli;
mod commands;

pub mod channel;
pub mod config;
pub mod env;
pub mod error;
pub mod session;
pub mod sync;

pub use cli::{Cli, Command, KeepSide, OutputFormat, PrefsCommand, VariantCommand};
pub use config::Config;
pub use error::{Error, Result};

use tracing_subscriber::EnvFilter;

/// Installs the stderr log subscriber.
///
/// `RUST_LOG` wins; otherwise `verbose` selects debug over warn.
pub fn init_logging(verbose: bool) {
    let fallback = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    // A subscriber may already be installed when embedded
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Runs a parsed command line to completion.
pub fn run(cli: Cli) -> Result<()> {
    let config = Config::discover(cli.config.as_deref())?;
    tracing::debug!(api_base = %config.server.api_base, "configuration loaded");

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| Error::Io(std::io::Error::other(format!("tokio: {}", e))))?;

    rt.block_on(commands::run(cli.command, config))
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
