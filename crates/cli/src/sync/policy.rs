// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Conflict detection policies.
//!
//! When a non-empty remote snapshot arrives, the engine asks a policy what
//! to do with it. Policies compare whole-snapshot digests only; there is no
//! field-level merge. The *base* is the digest of the last snapshot both
//! sides agreed on (persisted after every successful sync).

use cp_core::Snapshot;
use serde::{Deserialize, Serialize};

/// Inputs to a conflict decision.
#[derive(Debug, Clone, Copy)]
pub struct DivergenceCheck<'a> {
    /// The current local snapshot.
    pub local: &'a Snapshot,
    /// The snapshot just fetched from the remote service.
    pub remote: &'a Snapshot,
    /// Digest of the last synced snapshot, if this device ever synced.
    pub base: Option<&'a str>,
}

/// What the engine should do with a fetched remote snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Replace local with remote.
    AdoptRemote,
    /// Keep local and push it over remote.
    KeepLocal,
    /// Keep both candidates and wait for the user.
    Conflict,
}

/// Pluggable divergence detection.
pub trait ConflictPolicy: Send + Sync {
    /// Decides how to reconcile the two snapshots.
    fn decide(&self, check: &DivergenceCheck<'_>) -> Decision;

    /// Name used in logs and configuration.
    fn name(&self) -> &'static str;
}

/// Remote is authoritative whenever it holds data. Never reports a conflict.
#[derive(Debug, Clone, Copy, Default)]
pub struct RemoteWins;

impl ConflictPolicy for RemoteWins {
    fn decide(&self, _check: &DivergenceCheck<'_>) -> Decision {
        Decision::AdoptRemote
    }

    fn name(&self) -> &'static str {
        "remote-wins"
    }
}

/// Three-way digest comparison against the last synced base.
///
/// | local vs base | remote vs base | decision      |
/// |---------------|----------------|---------------|
/// | any           | equal to local | AdoptRemote   |
/// | unchanged     | changed        | AdoptRemote   |
/// | changed       | unchanged      | KeepLocal     |
/// | changed       | changed        | Conflict      |
///
/// Without a base (first sync on this device) the remote copy is adopted.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContentHash;

impl ConflictPolicy for ContentHash {
    fn decide(&self, check: &DivergenceCheck<'_>) -> Decision {
        let local = check.local.digest();
        let remote = check.remote.digest();
        if local == remote {
            return Decision::AdoptRemote;
        }

        let Some(base) = check.base else {
            return Decision::AdoptRemote;
        };
        match (local == base, remote == base) {
            (true, _) => Decision::AdoptRemote,
            (false, true) => Decision::KeepLocal,
            (false, false) => Decision::Conflict,
        }
    }

    fn name(&self) -> &'static str {
        "content-hash"
    }
}

/// Configurable policy selector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PolicyKind {
    #[default]
    RemoteWins,
    ContentHash,
}

impl PolicyKind {
    /// Instantiates the selected policy.
    pub fn build(self) -> Box<dyn ConflictPolicy> {
        match self {
            PolicyKind::RemoteWins => Box::new(RemoteWins),
            PolicyKind::ContentHash => Box::new(ContentHash),
        }
    }
}

#[cfg(test)]
#[path = "policy_tests.rs"]
mod tests;
