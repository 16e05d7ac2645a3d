// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for cp-core operations.

use thiserror::Error;

/// All possible errors that can occur in cp-core operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error("theme variant not found: {0}")]
    VariantNotFound(String),

    #[error("theme variant already exists: {0}\n  hint: pick another name or delete the existing variant first")]
    VariantExists(String),

    #[error("invalid theme variant: {0}")]
    InvalidVariant(String),

    #[error("invalid slot key: '{0}'\n  hint: keys may only contain letters, digits, '.', '_' and '-'")]
    InvalidSlotKey(String),

    #[error("invalid sync status: '{0}'\n  hint: valid statuses are: idle, syncing, synced, offline, conflict")]
    InvalidStatus(String),

    #[error("stored snapshot is not a JSON object")]
    NotAnObject,

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized Result type for cp-core operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
