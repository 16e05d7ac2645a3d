// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Offline-first preference sync engine.
//!
//! The engine owns the authoritative in-memory [`Snapshot`]. Every mutation
//! is written through to the durable slot before the call returns, and, while
//! a session is active, schedules one debounced push of the *whole* snapshot.
//! Remote failures never reach the caller: they show up as
//! [`SyncStatus::Offline`] and the local copy stays usable.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use cp_core::{
    keys, DurableSlot, Snapshot, SyncEnvelope, SyncStatus, Variants, PREFERENCES_KEY, SYNC_BASE_KEY,
};
use parking_lot::Mutex;
use serde_json::{json, Map, Value};
use tokio::sync::watch;

use super::debounce::Debouncer;
use super::policy::{ConflictPolicy, Decision, DivergenceCheck, RemoteWins};
use super::remote::RemoteService;

/// Default quiet period before a debounced push fires.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(1000);

/// Error type for engine operations that can fail locally.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// `resolve_conflict` was called with no conflict pending.
    #[error("no conflict to resolve\n  hint: conflicts are resolved only while sync status is 'conflict'")]
    NoConflict,

    /// A theme variant operation failed.
    #[error(transparent)]
    Variant(#[from] cp_core::Error),
}

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// The two candidates captured when local and remote diverge.
#[derive(Debug, Clone, PartialEq)]
pub struct ConflictData {
    /// Local snapshot at the moment the conflict was raised.
    pub local: Snapshot,
    /// Latest server snapshot seen while the conflict is pending.
    pub server: Snapshot,
}

/// Construction options for [`SyncEngine`].
pub struct EngineOptions {
    /// Quiet period before a debounced push fires.
    pub debounce: Duration,
    /// Policy consulted when a non-empty remote snapshot arrives.
    pub policy: Box<dyn ConflictPolicy>,
}

impl Default for EngineOptions {
    fn default() -> Self {
        EngineOptions {
            debounce: DEFAULT_DEBOUNCE,
            policy: Box::new(RemoteWins),
        }
    }
}

/// Preference sync engine. Cheap to clone; clones share state.
#[derive(Clone)]
pub struct SyncEngine {
    inner: Arc<EngineInner>,
}

struct EngineInner {
    slot: Box<dyn DurableSlot>,
    remote: Arc<dyn RemoteService>,
    policy: Box<dyn ConflictPolicy>,
    debouncer: Debouncer,
    has_session: AtomicBool,
    status: watch::Sender<SyncStatus>,
    state: Mutex<EngineState>,
}

struct EngineState {
    snapshot: Snapshot,
    conflict: Option<ConflictData>,
    /// Digest of the last snapshot both sides agreed on.
    sync_base: Option<String>,
    last_synced_at: Option<DateTime<Utc>>,
}

impl SyncEngine {
    /// Creates an engine holding default values.
    ///
    /// Call [`SyncEngine::initialize`] to load the durable slot.
    pub fn new(
        slot: impl DurableSlot + 'static,
        remote: Arc<dyn RemoteService>,
        options: EngineOptions,
    ) -> Self {
        let (status, _rx) = watch::channel(SyncStatus::Idle);
        tracing::debug!(
            policy = options.policy.name(),
            debounce_ms = options.debounce.as_millis() as u64,
            "sync engine created"
        );

        SyncEngine {
            inner: Arc::new(EngineInner {
                slot: Box::new(slot),
                remote,
                policy: options.policy,
                debouncer: Debouncer::new(options.debounce),
                has_session: AtomicBool::new(false),
                status,
                state: Mutex::new(EngineState {
                    snapshot: Snapshot::defaults(),
                    conflict: None,
                    sync_base: None,
                    last_synced_at: None,
                }),
            }),
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Observation
    // ─────────────────────────────────────────────────────────────────────

    /// Current sync status.
    pub fn status(&self) -> SyncStatus {
        *self.inner.status.borrow()
    }

    /// Subscribes to status transitions.
    pub fn subscribe_status(&self) -> watch::Receiver<SyncStatus> {
        self.inner.status.subscribe()
    }

    /// Copy of the current snapshot.
    pub fn snapshot(&self) -> Snapshot {
        self.inner.state.lock().snapshot.clone()
    }

    /// Current value of one setting.
    pub fn get(&self, key: &str) -> Option<Value> {
        self.inner.state.lock().snapshot.get(key).cloned()
    }

    /// The pending conflict, if any.
    pub fn conflict(&self) -> Option<ConflictData> {
        self.inner.state.lock().conflict.clone()
    }

    /// When the last remote call succeeded.
    pub fn last_synced_at(&self) -> Option<DateTime<Utc>> {
        self.inner.state.lock().last_synced_at
    }

    /// Whether remote sync is currently enabled.
    pub fn has_session(&self) -> bool {
        self.inner.has_session.load(Ordering::Acquire)
    }

    /// Whether a debounced push is waiting to fire.
    pub fn push_pending(&self) -> bool {
        self.inner.debouncer.is_pending()
    }

    // ─────────────────────────────────────────────────────────────────────
    // Lifecycle
    // ─────────────────────────────────────────────────────────────────────

    /// Loads the durable slot and, with a session, pulls from remote.
    ///
    /// Safe to call repeatedly; the last call's `has_session` wins.
    pub async fn initialize(&self, has_session: bool) -> SyncStatus {
        self.set_session(has_session);
        self.load_local();

        if has_session {
            self.pull_from_remote().await
        } else {
            self.status()
        }
    }

    /// Records a session transition.
    ///
    /// Ending a session drops any pending push, and a `syncing` status left
    /// by an abandoned request falls back to `idle`.
    pub fn set_session(&self, active: bool) {
        let was_active = self.inner.has_session.swap(active, Ordering::AcqRel);
        if !was_active || active {
            return;
        }
        if self.inner.debouncer.cancel() {
            tracing::debug!("session ended; pending push dropped");
        }
        if self.status() == SyncStatus::Syncing {
            self.settle(SyncStatus::Idle);
        }
    }

    /// Restores defaults, forgets sync history and returns to idle.
    pub fn reset(&self) {
        self.inner.debouncer.cancel();
        {
            let mut state = self.inner.state.lock();
            state.snapshot = Snapshot::defaults();
            state.conflict = None;
            state.sync_base = None;
            state.last_synced_at = None;

            for key in [PREFERENCES_KEY, SYNC_BASE_KEY] {
                if let Err(e) = self.inner.slot.remove(key) {
                    tracing::warn!(key, error = %e, "failed to clear slot entry");
                }
            }
        }
        self.set_status(SyncStatus::Idle);
        tracing::info!("preferences reset to defaults");
    }

    fn load_local(&self) {
        let snapshot = match self.inner.slot.get(PREFERENCES_KEY) {
            Ok(Some(text)) => match Snapshot::from_json(&text) {
                Ok(snapshot) => snapshot,
                Err(e) => {
                    tracing::warn!(error = %e, "stored preferences unreadable; using defaults");
                    Snapshot::defaults()
                }
            },
            Ok(None) => Snapshot::defaults(),
            Err(e) => {
                tracing::warn!(error = %e, "failed to read stored preferences; using defaults");
                Snapshot::defaults()
            }
        };
        let sync_base = self.inner.slot.get(SYNC_BASE_KEY).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "failed to read sync base");
            None
        });

        let mut state = self.inner.state.lock();
        state.snapshot = snapshot;
        state.sync_base = sync_base;
    }

    // ─────────────────────────────────────────────────────────────────────
    // Mutation
    // ─────────────────────────────────────────────────────────────────────

    /// Sets one value, persists locally, and schedules a debounced push.
    pub fn update(&self, key: &str, value: Value) {
        {
            let mut state = self.inner.state.lock();
            state.snapshot.set(key, value);
            self.persist(&state.snapshot);
        }
        self.schedule_push();
    }

    /// Sets several values with a single local write and at most one push.
    pub fn update_many(&self, patch: Map<String, Value>) {
        if patch.is_empty() {
            return;
        }
        {
            let mut state = self.inner.state.lock();
            state.snapshot.apply(patch);
            self.persist(&state.snapshot);
        }
        self.schedule_push();
    }

    /// Pushes now if a debounced push is waiting, instead of waiting for it.
    pub async fn flush(&self) -> SyncStatus {
        if self.inner.debouncer.cancel() {
            self.push_to_remote().await
        } else {
            self.status()
        }
    }

    fn persist(&self, snapshot: &Snapshot) {
        let result = snapshot
            .to_json()
            .and_then(|text| self.inner.slot.set(PREFERENCES_KEY, &text));
        if let Err(e) = result {
            tracing::warn!(error = %e, "failed to persist preferences");
        }
    }

    fn schedule_push(&self) {
        if !self.has_session() {
            return;
        }
        let engine = self.clone();
        self.inner.debouncer.schedule(async move {
            if engine.conflict().is_some() {
                tracing::debug!("conflict pending; debounced push skipped");
                return;
            }
            engine.push_to_remote().await;
        });
    }

    // ─────────────────────────────────────────────────────────────────────
    // Remote sync
    // ─────────────────────────────────────────────────────────────────────

    /// Fetches the canonical snapshot and reconciles it with local.
    ///
    /// - remote empty: local is pushed to seed the server
    /// - remote non-empty: the conflict policy decides (remote replaces local
    ///   under the default policy)
    /// - transport failure: status becomes offline, local is untouched
    pub async fn pull_from_remote(&self) -> SyncStatus {
        if !self.has_session() {
            tracing::debug!("no session; pull skipped");
            return self.status();
        }

        self.set_status(SyncStatus::Syncing);
        let envelope = match self.inner.remote.fetch().await {
            Ok(envelope) if envelope.success => envelope,
            Ok(_) => {
                tracing::warn!("remote reported failure on fetch; working offline");
                return self.settle(SyncStatus::Offline);
            }
            Err(e) => {
                tracing::warn!(error = %e, "pull failed; working offline");
                return self.settle(SyncStatus::Offline);
            }
        };

        if self.refresh_conflict(&envelope) {
            return self.settle(SyncStatus::Conflict);
        }

        if envelope.is_empty() {
            tracing::info!("remote holds no preferences; seeding it from local");
            let local = self.snapshot();
            return self.push_snapshot(local).await;
        }

        let remote = Snapshot::from_map(envelope.settings);
        let decision = {
            let state = self.inner.state.lock();
            self.inner.policy.decide(&DivergenceCheck {
                local: &state.snapshot,
                remote: &remote,
                base: state.sync_base.as_deref(),
            })
        };
        tracing::debug!(?decision, policy = self.inner.policy.name(), "reconciling remote");

        match decision {
            Decision::AdoptRemote => {
                let digest = remote.digest();
                {
                    let mut state = self.inner.state.lock();
                    self.persist(&remote);
                    state.snapshot = remote;
                }
                self.mark_synced(digest)
            }
            Decision::KeepLocal => {
                let local = self.snapshot();
                self.push_snapshot(local).await
            }
            Decision::Conflict => {
                self.raise_conflict(remote);
                SyncStatus::Conflict
            }
        }
    }

    /// Pushes the full current snapshot.
    ///
    /// Suppressed while a conflict is pending so the server candidate is not
    /// overwritten before the user chooses.
    pub async fn push_to_remote(&self) -> SyncStatus {
        if !self.has_session() {
            tracing::debug!("no session; push skipped");
            return self.status();
        }

        let snapshot = {
            let state = self.inner.state.lock();
            if state.conflict.is_some() {
                tracing::debug!("conflict pending; push skipped");
                return SyncStatus::Conflict;
            }
            state.snapshot.clone()
        };
        self.push_snapshot(snapshot).await
    }

    async fn push_snapshot(&self, snapshot: Snapshot) -> SyncStatus {
        self.set_status(SyncStatus::Syncing);
        match self.inner.remote.store(&snapshot).await {
            Ok(()) => self.mark_synced(snapshot.digest()),
            Err(e) => {
                tracing::warn!(error = %e, "push failed; working offline");
                self.settle(SyncStatus::Offline)
            }
        }
    }

    fn mark_synced(&self, digest: String) -> SyncStatus {
        {
            let mut state = self.inner.state.lock();
            if let Err(e) = self.inner.slot.set(SYNC_BASE_KEY, &digest) {
                tracing::warn!(error = %e, "failed to persist sync base");
            }
            state.sync_base = Some(digest);
            state.last_synced_at = Some(Utc::now());
        }
        self.settle(SyncStatus::Synced)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Conflicts
    // ─────────────────────────────────────────────────────────────────────

    /// Enters the conflict state with `server` as the remote candidate.
    ///
    /// Used by callers that detect divergence outside the engine.
    pub fn flag_conflict(&self, server: Snapshot) {
        self.raise_conflict(server);
    }

    /// While a conflict is pending, a fetched snapshot only replaces the
    /// server candidate. Local data is neither replaced nor pushed.
    fn refresh_conflict(&self, envelope: &SyncEnvelope) -> bool {
        let mut state = self.inner.state.lock();
        let Some(conflict) = state.conflict.as_mut() else {
            return false;
        };
        if !envelope.is_empty() {
            conflict.server = Snapshot::from_map(envelope.settings.clone());
            tracing::debug!("conflict pending; server candidate refreshed");
        }
        true
    }

    fn raise_conflict(&self, server: Snapshot) {
        self.inner.debouncer.cancel();
        {
            let mut state = self.inner.state.lock();
            let local = state.snapshot.clone();
            state.conflict = Some(ConflictData { local, server });
        }
        tracing::warn!("local and remote preferences diverged");
        self.set_status(SyncStatus::Conflict);
    }

    /// Settles a pending conflict by picking one side wholesale.
    ///
    /// `keep_remote` adopts the captured server snapshot. Otherwise the
    /// captured local snapshot is kept and pushed.
    pub async fn resolve_conflict(&self, keep_remote: bool) -> EngineResult<SyncStatus> {
        let data = self
            .inner
            .state
            .lock()
            .conflict
            .take()
            .ok_or(EngineError::NoConflict)?;

        let chosen = if keep_remote { data.server } else { data.local };
        {
            let mut state = self.inner.state.lock();
            self.persist(&chosen);
            state.snapshot = chosen.clone();
        }
        tracing::info!(keep_remote, "conflict resolved");

        if keep_remote {
            return Ok(self.mark_synced(chosen.digest()));
        }
        if !self.has_session() {
            return Ok(self.settle(SyncStatus::Offline));
        }
        Ok(self.push_snapshot(chosen).await)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Theme variants
    // ─────────────────────────────────────────────────────────────────────

    /// Creates a variant, copying `from` if given, else based on the active theme.
    pub fn create_variant(&self, name: &str, from: Option<&str>) -> EngineResult<()> {
        self.edit_variants(|variants, snapshot| {
            let body = match from {
                Some(source) => variants
                    .get(source)
                    .cloned()
                    .ok_or_else(|| cp_core::Error::VariantNotFound(source.to_string()))?,
                None => json!({ "base": snapshot.theme() }),
            };
            variants.create(name, body)
        })
    }

    /// Copies an existing variant under a new name.
    pub fn duplicate_variant(&self, source: &str, target: &str) -> EngineResult<()> {
        self.edit_variants(|variants, _| variants.duplicate(source, target))
    }

    /// Deletes a variant. If it was the active theme, the default theme is restored.
    pub fn delete_variant(&self, name: &str) -> EngineResult<()> {
        let snapshot = self.snapshot();
        let mut variants = Variants::from_snapshot(&snapshot);
        variants.delete(name)?;

        let mut patch = Map::new();
        patch.insert(keys::CUSTOM_THEMES.to_string(), variants.into_value());
        if snapshot.theme() == name {
            patch.insert(keys::THEME.to_string(), json!("default"));
        }
        self.update_many(patch);
        Ok(())
    }

    /// Serializes a variant as portable JSON text.
    pub fn export_variant(&self, name: &str) -> EngineResult<String> {
        let snapshot = self.snapshot();
        Ok(Variants::from_snapshot(&snapshot).export(name)?)
    }

    /// Adds a variant from exported JSON text, returning the name it was stored under.
    pub fn import_variant(&self, text: &str) -> EngineResult<String> {
        self.edit_variants(|variants, _| variants.import(text))
    }

    /// Names of all variants.
    pub fn variant_names(&self) -> Vec<String> {
        let snapshot = self.snapshot();
        Variants::from_snapshot(&snapshot)
            .names()
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    fn edit_variants<R>(
        &self,
        edit: impl FnOnce(&mut Variants, &Snapshot) -> cp_core::Result<R>,
    ) -> EngineResult<R> {
        let snapshot = self.snapshot();
        let mut variants = Variants::from_snapshot(&snapshot);
        let output = edit(&mut variants, &snapshot)?;
        self.update(keys::CUSTOM_THEMES, variants.into_value());
        Ok(output)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Status
    // ─────────────────────────────────────────────────────────────────────

    /// Applies a terminal status unless a conflict is pending, which outranks it.
    fn settle(&self, status: SyncStatus) -> SyncStatus {
        let settled = if self.inner.state.lock().conflict.is_some() {
            SyncStatus::Conflict
        } else {
            status
        };
        self.set_status(settled);
        settled
    }

    fn set_status(&self, status: SyncStatus) {
        let previous = self.inner.status.send_replace(status);
        if previous != status {
            tracing::debug!(from = %previous, to = %status, "sync status changed");
        }
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
