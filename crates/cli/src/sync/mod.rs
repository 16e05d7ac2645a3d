// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Offline-first preference sync.
//!
//! Keeps the user's preference snapshot usable without a network and
//! reconciles it with the canonical server copy when a session is active.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   Caller    │────►│   Engine    │────►│   Remote    │
//! │ (UI / CLI)  │◄────│ (SyncEngine)│◄────│  (trait)    │
//! └─────────────┘     └─────────────┘     └─────────────┘
//!                        │      │
//!                        ▼      ▼
//!              ┌─────────────┐ ┌─────────────┐
//!              │Durable slot │ │  Debouncer  │  (one push per burst)
//!              └─────────────┘ └─────────────┘
//! ```
//!
//! # Features
//!
//! - Write-through local persistence on every mutation
//! - Debounced full-snapshot pushes
//! - Remote-wins reconciliation, or three-way digest conflict detection
//! - Graceful degradation to offline on any remote failure
//! - Injectable remote trait for testing

mod debounce;
mod engine;
mod policy;
mod remote;

pub use debounce::Debouncer;
pub use engine::{ConflictData, EngineError, EngineOptions, SyncEngine, DEFAULT_DEBOUNCE};
pub use policy::{ConflictPolicy, ContentHash, Decision, DivergenceCheck, PolicyKind, RemoteWins};
pub use remote::{sync_endpoint, HttpRemote, RemoteError, RemoteFuture, RemoteService};

#[cfg(test)]
pub(crate) mod test_helpers;
