// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

pub mod listen;
pub mod prefs;
pub mod variant;
#[cfg(test)]
#[path = "mod_tests.rs"]
pub mod testing;

use std::io::Write;
use std::sync::Arc;

use cp_core::{DurableSlot, FileSlot, SyncStatus};

use crate::cli::Command;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::session::{Session, SessionContext};
use crate::sync::{HttpRemote, RemoteService, SyncEngine};

/// Everything a command needs: configuration, session and engine.
pub struct Context {
    pub config: Config,
    pub sessions: SessionContext,
    pub engine: SyncEngine,
}

impl Context {
    /// Builds the production context: file slot under the state dir, HTTP remote.
    pub fn open(config: Config) -> Result<Self> {
        let sessions = SessionContext::new();
        let remote = HttpRemote::new(
            &config.server.api_base,
            sessions.clone(),
            config.request_timeout(),
        )?;
        let state_dir = config.state_dir()?;
        let slot = FileSlot::open(&state_dir)?;
        tracing::debug!(state_dir = %state_dir.display(), "opened state directory");
        Ok(Self::with_parts(config, sessions, slot, Arc::new(remote)))
    }

    /// Builds a context from explicit parts.
    pub fn with_parts(
        config: Config,
        sessions: SessionContext,
        slot: impl DurableSlot + 'static,
        remote: Arc<dyn RemoteService>,
    ) -> Self {
        let engine = SyncEngine::new(slot, remote, config.engine_options());
        Context {
            config,
            sessions,
            engine,
        }
    }

    /// Loads local preferences and, if a session is configured, logs in.
    ///
    /// With `pull` set and a session present, the server copy is fetched and
    /// reconciled before returning.
    pub async fn start(&self, pull: bool) -> SyncStatus {
        let status = self.engine.initialize(false).await;
        let Some(session) = self.config.session() else {
            return status;
        };

        self.sessions.login(session);
        self.engine.set_session(true);
        if pull {
            self.engine.pull_from_remote().await
        } else {
            status
        }
    }

    /// The configured session, or an error telling the user how to set one.
    pub fn require_session(&self) -> Result<Session> {
        self.config.session().ok_or(Error::NoSession)
    }

    /// Pushes any change made by the command and notes a degraded sync.
    pub async fn finish(&self, out: &mut impl Write) -> Result<SyncStatus> {
        if !self.engine.has_session() {
            return Ok(self.engine.status());
        }
        let status = self.engine.flush().await;
        if let Some(note) = sync_note(status) {
            writeln!(out, "{note}")?;
        }
        Ok(status)
    }
}

/// A user-facing note for statuses where local and remote may differ.
pub fn sync_note(status: SyncStatus) -> Option<String> {
    match status {
        SyncStatus::Offline => Some("note: server unreachable; saved locally".to_string()),
        SyncStatus::Conflict => Some(
            "note: local and server preferences diverged\n  hint: run 'campanile prefs resolve --keep remote|local'"
                .to_string(),
        ),
        _ => None,
    }
}

/// Dispatches a parsed command.
pub async fn run(command: Command, config: Config) -> Result<()> {
    match command {
        Command::Prefs(cmd) => {
            let ctx = Context::open(config)?;
            prefs::run(&ctx, cmd).await
        }
        Command::Variant(cmd) => {
            let ctx = Context::open(config)?;
            variant::run(&ctx, cmd).await
        }
        Command::Listen => {
            let ctx = Context::open(config)?;
            listen::run(&ctx).await
        }
    }
}
