// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Restartable single-shot timer.
//!
//! Each [`Debouncer::schedule`] call aborts the previously scheduled timer and
//! starts a new one, so only the last call in a burst fires. The timer only
//! covers the wait: once it fires, the action runs as its own task and a later
//! `schedule` or `cancel` no longer affects it.

use std::future::Future;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

pub struct Debouncer {
    delay: Duration,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Debouncer {
            delay,
            pending: Mutex::new(None),
        }
    }

    /// Runs `action` once `delay` has passed without another call.
    ///
    /// Outside a tokio runtime the action is dropped with a warning.
    pub fn schedule<F>(&self, action: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let Ok(handle) = Handle::try_current() else {
            tracing::warn!("no async runtime available; debounced action dropped");
            return;
        };

        let delay = self.delay;
        let mut pending = self.pending.lock();
        if let Some(previous) = pending.take() {
            previous.abort();
        }
        *pending = Some(handle.spawn(async move {
            tokio::time::sleep(delay).await;
            tokio::spawn(action);
        }));
    }

    /// Cancels the pending timer. Returns true if one had not fired yet.
    pub fn cancel(&self) -> bool {
        match self.pending.lock().take() {
            Some(timer) => {
                let was_pending = !timer.is_finished();
                timer.abort();
                was_pending
            }
            None => false,
        }
    }

    /// Returns true if a timer is waiting to fire.
    pub fn is_pending(&self) -> bool {
        self.pending
            .lock()
            .as_ref()
            .is_some_and(|timer| !timer.is_finished())
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        if let Some(timer) = self.pending.get_mut().take() {
            timer.abort();
        }
    }
}

#[cfg(test)]
#[path = "debounce_tests.rs"]
mod tests;
