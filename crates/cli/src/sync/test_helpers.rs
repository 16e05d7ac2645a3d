// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for sync module tests.

use std::sync::Arc;

use cp_core::{Snapshot, SyncEnvelope};
use parking_lot::Mutex;
use serde_json::{Map, Value};
use tokio::sync::Semaphore;

use super::remote::{RemoteError, RemoteFuture, RemoteService};

/// In-memory stand-in for the preference service.
///
/// Behaves like the real server: a store replaces the held settings and a
/// later fetch returns them. Held calls wait for a released permit, so a
/// test can keep a request in flight.
#[derive(Default)]
pub struct MockRemote {
    state: Mutex<MockState>,
}

#[derive(Default)]
struct MockState {
    settings: Map<String, Value>,
    fail_fetch: bool,
    fail_store: bool,
    fetches: usize,
    store_calls: usize,
    stores: Vec<Snapshot>,
    fetch_gate: Option<Arc<Semaphore>>,
    store_gate: Option<Arc<Semaphore>>,
}

impl MockRemote {
    pub fn new() -> Self {
        Self::default()
    }

    /// A service that already holds `snapshot`.
    pub fn holding(snapshot: Snapshot) -> Self {
        let remote = Self::default();
        remote.set_settings(snapshot.into_map());
        remote
    }

    pub fn set_settings(&self, settings: Map<String, Value>) {
        self.state.lock().settings = settings;
    }

    pub fn set_fail_fetch(&self, fail: bool) {
        self.state.lock().fail_fetch = fail;
    }

    pub fn set_fail_store(&self, fail: bool) {
        self.state.lock().fail_store = fail;
    }

    /// Makes every later fetch wait for [`MockRemote::release_fetches`].
    pub fn hold_fetches(&self) {
        self.state.lock().fetch_gate = Some(Arc::new(Semaphore::new(0)));
    }

    /// Makes every later store wait for [`MockRemote::release_stores`].
    pub fn hold_stores(&self) {
        self.state.lock().store_gate = Some(Arc::new(Semaphore::new(0)));
    }

    pub fn release_fetches(&self, count: usize) {
        if let Some(gate) = &self.state.lock().fetch_gate {
            gate.add_permits(count);
        }
    }

    pub fn release_stores(&self, count: usize) {
        if let Some(gate) = &self.state.lock().store_gate {
            gate.add_permits(count);
        }
    }

    /// Stores started, including held and failed ones.
    pub fn store_calls(&self) -> usize {
        self.state.lock().store_calls
    }

    pub fn fetch_count(&self) -> usize {
        self.state.lock().fetches
    }

    /// Every snapshot stored so far, oldest first.
    pub fn stores(&self) -> Vec<Snapshot> {
        self.state.lock().stores.clone()
    }
}

impl RemoteService for MockRemote {
    fn fetch(&self) -> RemoteFuture<'_, SyncEnvelope> {
        Box::pin(async move {
            let gate = {
                let mut state = self.state.lock();
                state.fetches += 1;
                state.fetch_gate.clone()
            };
            pass(gate).await;

            let state = self.state.lock();
            if state.fail_fetch {
                return Err(RemoteError::Status(503));
            }
            Ok(SyncEnvelope::ok(state.settings.clone()))
        })
    }

    fn store(&self, snapshot: &Snapshot) -> RemoteFuture<'_, ()> {
        let snapshot = snapshot.clone();
        Box::pin(async move {
            let gate = {
                let mut state = self.state.lock();
                state.store_calls += 1;
                state.store_gate.clone()
            };
            pass(gate).await;

            let mut state = self.state.lock();
            if state.fail_store {
                return Err(RemoteError::Status(503));
            }
            state.settings = snapshot.as_map().clone();
            state.stores.push(snapshot);
            Ok(())
        })
    }
}

async fn pass(gate: Option<Arc<Semaphore>>) {
    if let Some(gate) = gate {
        if let Ok(permit) = gate.acquire().await {
            permit.forget();
        }
    }
}
