// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Wire types for the remote preference service.
//!
//! The service speaks JSON over HTTP:
//! - `GET  /settings/sync` returns a [`SyncEnvelope`]
//! - `POST /settings/sync` takes a [`SyncUpload`] and returns a [`SyncAck`]

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::prefs::Snapshot;

/// Response to a fetch of the canonical snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SyncEnvelope {
    /// Whether the server handled the request.
    pub success: bool,
    /// The stored settings. Empty when the user has never synced.
    #[serde(default)]
    pub settings: Map<String, Value>,
}

impl SyncEnvelope {
    /// Creates a successful envelope carrying `settings`.
    pub fn ok(settings: Map<String, Value>) -> Self {
        SyncEnvelope {
            success: true,
            settings,
        }
    }

    /// Returns true if the server holds no settings yet.
    pub fn is_empty(&self) -> bool {
        self.settings.is_empty()
    }
}

/// Body of a push. Always the full snapshot, never a partial patch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncUpload {
    /// The complete snapshot.
    pub settings: Snapshot,
}

impl SyncUpload {
    /// Wraps a snapshot for upload.
    pub fn new(settings: Snapshot) -> Self {
        SyncUpload { settings }
    }
}

/// Acknowledgement of a push.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncAck {
    /// Whether the server stored the snapshot.
    pub success: bool,
    /// Optional server message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[cfg(test)]
#[path = "protocol_tests.rs"]
mod tests;
