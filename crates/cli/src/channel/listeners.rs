// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Inbound message listeners.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::Value;

/// Callback invoked with every parsed inbound message.
pub type Listener = Arc<dyn Fn(&Value) + Send + Sync>;

/// Handle returned by [`Listeners::add`], used to remove the listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Ordered listener set.
///
/// Membership is independent of any connection, so listeners survive
/// reconnects.
#[derive(Default)]
pub struct Listeners {
    entries: Mutex<Vec<(ListenerId, Listener)>>,
    next_id: AtomicU64,
}

impl Listeners {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `listener` after all existing ones.
    pub fn add<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&Value) + Send + Sync + 'static,
    {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.entries.lock().push((id, Arc::new(listener)));
        id
    }

    /// Removes a listener. Returns false if it was not registered.
    pub fn remove(&self, id: ListenerId) -> bool {
        let mut entries = self.entries.lock();
        let before = entries.len();
        entries.retain(|(entry, _)| *entry != id);
        entries.len() != before
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Calls every listener in registration order.
    ///
    /// A panicking listener is logged and skipped; the rest still run.
    /// Returns the number of listeners that panicked.
    pub fn dispatch(&self, message: &Value) -> usize {
        // Snapshot so listeners may add or remove listeners while running.
        let snapshot: Vec<(ListenerId, Listener)> = self.entries.lock().clone();

        let mut panicked = 0;
        for (id, listener) in snapshot {
            if catch_unwind(AssertUnwindSafe(|| listener(message))).is_err() {
                panicked += 1;
                tracing::error!(listener = ?id, "listener panicked; continuing with the rest");
            }
        }
        panicked
    }

    /// Parses a text frame once and dispatches it.
    ///
    /// Malformed frames are logged and dropped.
    pub fn dispatch_text(&self, text: &str) -> Result<usize, serde_json::Error> {
        let message: Value = serde_json::from_str(text).inspect_err(|e| {
            tracing::warn!(error = %e, len = text.len(), "dropping malformed frame");
        })?;
        Ok(self.dispatch(&message))
    }
}

#[cfg(test)]
#[path = "listeners_tests.rs"]
mod tests;
