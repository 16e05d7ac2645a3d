// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! cp-core: Shared data model for the campanile alerting client.
//!
//! This crate provides the preference snapshot, sync status, durable slot
//! contract and wire types used by the sync engine and event channel in the
//! `campanile` crate. Nothing here touches the network or an async runtime.

pub mod error;
pub mod prefs;
pub mod protocol;
pub mod slot;
pub mod status;
pub mod variant;

pub use error::{Error, Result};
pub use prefs::{keys, Snapshot};
pub use protocol::{SyncAck, SyncEnvelope, SyncUpload};
pub use slot::{DurableSlot, FileSlot, MemorySlot, PREFERENCES_KEY, SYNC_BASE_KEY};
pub use status::SyncStatus;
pub use variant::{ExportedVariant, Variants};
