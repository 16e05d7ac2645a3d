// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Sync status of the preference engine.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Where the local snapshot stands relative to the remote copy.
///
/// Exactly one value holds at a time. The engine derives it from sync
/// attempts; callers only observe it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncStatus {
    /// No sync attempted since start or since the last full reset.
    #[default]
    Idle,
    /// A remote call is in flight.
    Syncing,
    /// The last remote call succeeded.
    Synced,
    /// The last remote call failed; local data remains usable.
    Offline,
    /// Local and remote diverged and a choice is pending.
    Conflict,
}

impl SyncStatus {
    /// Returns the string representation used in storage and display.
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncStatus::Idle => "idle",
            SyncStatus::Syncing => "syncing",
            SyncStatus::Synced => "synced",
            SyncStatus::Offline => "offline",
            SyncStatus::Conflict => "conflict",
        }
    }

    /// Short human-readable description for status lines.
    pub fn describe(&self) -> &'static str {
        match self {
            SyncStatus::Idle => "not synced",
            SyncStatus::Syncing => "syncing",
            SyncStatus::Synced => "synced",
            SyncStatus::Offline => "offline, changes saved locally",
            SyncStatus::Conflict => "conflict, choose local or remote",
        }
    }
}

impl fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SyncStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "idle" => Ok(SyncStatus::Idle),
            "syncing" => Ok(SyncStatus::Syncing),
            "synced" => Ok(SyncStatus::Synced),
            "offline" => Ok(SyncStatus::Offline),
            "conflict" => Ok(SyncStatus::Conflict),
            _ => Err(Error::InvalidStatus(s.to_string())),
        }
    }
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
