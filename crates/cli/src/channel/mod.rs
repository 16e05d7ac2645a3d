// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Resilient real-time event channel.
//!
//! One long-lived duplex connection per session, delivering alerts to every
//! registered listener.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌──────────────┐     ┌─────────────┐
//! │  Listeners  │◄────│   Channel    │◄───►│  Transport  │◄───► Server
//! │ (fan-out)   │     │(EventChannel)│     │   (trait)   │
//! └─────────────┘     └──────────────┘     └─────────────┘
//!                            │
//!                            ▼
//!                     reconnect timer
//!                     (1s, 2s, 4s, 8s, 16s, give up)
//! ```
//!
//! # Features
//!
//! - Guarded connect: never more than one live or pending connection
//! - Bounded exponential backoff on abnormal close
//! - Intentional close (code 1000) never reconnects
//! - Panicking listeners are isolated from each other and the connection
//! - Injectable transport trait for testing

mod client;
mod listeners;
mod transport;

pub use client::{
    endpoint_url, ChannelConfig, ChannelError, ConnectionState, EventChannel, DEFAULT_BASE_DELAY,
    DEFAULT_MAX_RECONNECT_ATTEMPTS,
};
pub use listeners::{Listener, ListenerId, Listeners};
pub use transport::{
    Inbound, Transport, TransportError, TransportFuture, TransportResult, WebSocketTransport,
    NORMAL_CLOSURE,
};

#[cfg(test)]
pub(crate) mod transport_tests;
