// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Session context and lifecycle glue.
//!
//! The client does not authenticate anyone itself. It consumes an existing
//! identity and bearer credential through [`SessionContext`], and
//! [`SessionGlue`] turns login/logout transitions into engine and channel
//! lifecycle calls:
//!
//! ```text
//! login  ──► channel.connect(session) ──► spawn engine.initialize(true)
//! logout ──► channel.disconnect()     ──► abort pull ──► engine.set_session(false)
//! ```

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::channel::{EventChannel, Transport};
use crate::sync::SyncEngine;

/// An authenticated identity with its bearer credential.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// User identity, also used as the channel session id.
    pub user_id: String,
    /// Bearer credential for the remote service and channel.
    pub credential: String,
}

impl Session {
    /// Creates a session.
    pub fn new(user_id: impl Into<String>, credential: impl Into<String>) -> Self {
        Session {
            user_id: user_id.into(),
            credential: credential.into(),
        }
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("user_id", &self.user_id)
            .field("credential", &"<redacted>")
            .finish()
    }
}

/// Shared view of the current session.
///
/// Cheap to clone; all clones observe the same state.
#[derive(Clone)]
pub struct SessionContext {
    tx: Arc<watch::Sender<Option<Session>>>,
}

impl SessionContext {
    /// Creates a context with no active session.
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        SessionContext { tx: Arc::new(tx) }
    }

    /// Marks `session` as the active session.
    pub fn login(&self, session: Session) {
        tracing::info!(user_id = %session.user_id, "session started");
        self.tx.send_replace(Some(session));
    }

    /// Ends the active session, if any.
    pub fn logout(&self) {
        if self.tx.send_replace(None).is_some() {
            tracing::info!("session ended");
        }
    }

    /// Returns the active session.
    pub fn current(&self) -> Option<Session> {
        self.tx.borrow().clone()
    }

    /// Returns true if a session is active.
    pub fn is_authenticated(&self) -> bool {
        self.tx.borrow().is_some()
    }

    /// Returns the active bearer credential.
    pub fn credential(&self) -> Option<String> {
        self.tx.borrow().as_ref().map(|s| s.credential.clone())
    }

    /// Subscribes to session transitions.
    pub fn subscribe(&self) -> watch::Receiver<Option<Session>> {
        self.tx.subscribe()
    }
}

impl Default for SessionContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Drives the engine and channel from session transitions.
pub struct SessionGlue<T: Transport> {
    engine: SyncEngine,
    channel: EventChannel<T>,
}

impl<T: Transport> SessionGlue<T> {
    /// Creates glue over an engine and a channel.
    pub fn new(engine: SyncEngine, channel: EventChannel<T>) -> Self {
        SessionGlue { engine, channel }
    }

    /// Follows `sessions` until the context is dropped or `shutdown` fires.
    ///
    /// The current value is applied first, so a session that was already
    /// active when the glue started still gets connected. On shutdown the
    /// logout path runs so the channel closes cleanly.
    ///
    /// The settings pull for a login runs as its own task. A slow or hung
    /// remote never holds back the channel connection or a later logout.
    pub async fn run(
        self,
        mut sessions: watch::Receiver<Option<Session>>,
        shutdown: CancellationToken,
    ) {
        let mut pull = None;
        let mut current = sessions.borrow_and_update().clone();
        self.apply(None, current.clone(), &mut pull).await;

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                changed = sessions.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let next = sessions.borrow_and_update().clone();
                    self.apply(current.take(), next.clone(), &mut pull).await;
                    current = next;
                }
            }
        }

        if current.is_some() {
            self.apply(current, None, &mut pull).await;
        }
        stop_pull(&mut pull).await;
    }

    async fn apply(
        &self,
        previous: Option<Session>,
        next: Option<Session>,
        pull: &mut Option<JoinHandle<()>>,
    ) {
        match (previous, next) {
            (previous, Some(session)) => {
                if previous.as_ref() == Some(&session) {
                    return;
                }
                if previous.is_some() {
                    // Identity changed: the old connection and pull belong to another session
                    self.channel.disconnect();
                    stop_pull(pull).await;
                }
                self.channel.connect(&session);

                let engine = self.engine.clone();
                *pull = Some(tokio::spawn(async move {
                    let status = engine.initialize(true).await;
                    tracing::debug!(%status, "engine initialized for session");
                }));
            }
            (Some(_), None) => {
                self.channel.disconnect();
                stop_pull(pull).await;
                self.engine.set_session(false);
            }
            (None, None) => {
                self.engine.initialize(false).await;
            }
        }
    }
}

/// Abandons an in-flight settings pull and waits for it to unwind.
async fn stop_pull(pull: &mut Option<JoinHandle<()>>) {
    if let Some(handle) = pull.take() {
        if !handle.is_finished() {
            tracing::debug!("abandoning in-flight settings pull");
            handle.abort();
        }
        let _ = handle.await;
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
