// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Resilient event channel client.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use reqwest::Url;
use serde::Serialize;
use serde_json::Value;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::listeners::{ListenerId, Listeners};
use super::transport::{Inbound, Transport, TransportError, WebSocketTransport, NORMAL_CLOSURE};
use crate::session::Session;

/// Default delay before the first reconnect attempt.
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_secs(1);

/// Default number of reconnect attempts before giving up.
pub const DEFAULT_MAX_RECONNECT_ATTEMPTS: u32 = 5;

/// Errors surfaced by the channel.
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    /// The channel has no open connection.
    #[error("event channel is not connected")]
    NotConnected,

    /// The outbound message could not be encoded.
    #[error("failed to encode message: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The channel URL could not be built.
    #[error("invalid channel endpoint '{url}': {reason}")]
    Endpoint { url: String, reason: String },
}

/// Connection state of the channel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

impl ConnectionState {
    pub fn as_str(self) -> &'static str {
        match self {
            ConnectionState::Disconnected => "disconnected",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Connected => "connected",
        }
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configuration for the event channel.
#[derive(Debug, Clone)]
pub struct ChannelConfig {
    /// WebSocket base URL, e.g. `ws://localhost:8000`.
    pub ws_base: String,
    /// Delay before the first reconnect; doubles on each further attempt.
    pub base_delay: Duration,
    /// Reconnect attempts allowed before the channel gives up.
    pub max_attempts: u32,
}

impl ChannelConfig {
    pub fn new(ws_base: impl Into<String>) -> Self {
        ChannelConfig {
            ws_base: ws_base.into(),
            base_delay: DEFAULT_BASE_DELAY,
            max_attempts: DEFAULT_MAX_RECONNECT_ATTEMPTS,
        }
    }
}

type TransportFactory<T> = Box<dyn Fn() -> T + Send + Sync>;

/// Long-lived duplex connection with bounded reconnect and listener fan-out.
///
/// Cheap to clone; clones share the connection and listener set.
pub struct EventChannel<T: Transport = WebSocketTransport> {
    inner: Arc<ChannelInner<T>>,
}

impl<T: Transport> Clone for EventChannel<T> {
    fn clone(&self) -> Self {
        EventChannel {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct ChannelInner<T> {
    config: ChannelConfig,
    factory: TransportFactory<T>,
    listeners: Listeners,
    state: Mutex<ChannelState>,
}

struct ChannelState {
    connection: ConnectionState,
    session: Option<Session>,
    attempts: u32,
    delay: Duration,
    exhausted: bool,
    /// Identifies the current connection task; stale tasks compare unequal.
    generation: u64,
    link: Option<Link>,
    reconnect_timer: Option<JoinHandle<()>>,
}

/// Handle to the running connection task.
struct Link {
    outbound: mpsc::UnboundedSender<String>,
    cancel: CancellationToken,
}

enum Event {
    Shutdown,
    Outbound(String),
    Inbound(Result<Inbound, TransportError>),
}

impl EventChannel<WebSocketTransport> {
    /// Creates a channel backed by real WebSocket connections.
    pub fn new(config: ChannelConfig) -> Self {
        Self::with_factory(config, WebSocketTransport::new)
    }
}

impl<T: Transport> EventChannel<T> {
    /// Creates a channel that asks `factory` for a transport on every attempt.
    pub fn with_factory<F>(config: ChannelConfig, factory: F) -> Self
    where
        F: Fn() -> T + Send + Sync + 'static,
    {
        let delay = config.base_delay;
        EventChannel {
            inner: Arc::new(ChannelInner {
                config,
                factory: Box::new(factory),
                listeners: Listeners::new(),
                state: Mutex::new(ChannelState {
                    connection: ConnectionState::Disconnected,
                    session: None,
                    attempts: 0,
                    delay,
                    exhausted: false,
                    generation: 0,
                    link: None,
                    reconnect_timer: None,
                }),
            }),
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.inner.state.lock().connection
    }

    pub fn is_connected(&self) -> bool {
        self.state() == ConnectionState::Connected
    }

    /// Reconnect attempts made since the last successful open.
    pub fn reconnect_attempts(&self) -> u32 {
        self.inner.state.lock().attempts
    }

    /// True once every reconnect attempt has failed.
    pub fn is_exhausted(&self) -> bool {
        self.inner.state.lock().exhausted
    }

    /// Registers a listener for parsed inbound messages.
    pub fn add_listener<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&Value) + Send + Sync + 'static,
    {
        self.inner.listeners.add(listener)
    }

    /// Removes a listener. Returns false if it was not registered.
    pub fn remove_listener(&self, id: ListenerId) -> bool {
        self.inner.listeners.remove(id)
    }

    /// Opens the channel for `session`.
    ///
    /// Does nothing if the channel is already connected or connecting.
    /// Otherwise starts a new lifecycle: the reconnect budget is restored.
    pub fn connect(&self, session: &Session) {
        let mut state = self.inner.state.lock();
        if state.connection != ConnectionState::Disconnected {
            tracing::debug!(state = %state.connection, "connect ignored");
            return;
        }

        if let Some(timer) = state.reconnect_timer.take() {
            timer.abort();
        }
        state.attempts = 0;
        state.delay = self.inner.config.base_delay;
        state.exhausted = false;
        state.session = Some(session.clone());
        self.open_locked(&mut state);
    }

    /// Closes the channel intentionally. No reconnect follows. Idempotent.
    pub fn disconnect(&self) {
        let mut state = self.inner.state.lock();
        state.attempts = self.inner.config.max_attempts;
        if let Some(timer) = state.reconnect_timer.take() {
            timer.abort();
        }
        state.session = None;
        state.generation += 1;
        if let Some(link) = state.link.take() {
            link.cancel.cancel();
        }

        let previous = std::mem::replace(&mut state.connection, ConnectionState::Disconnected);
        if previous != ConnectionState::Disconnected {
            tracing::info!("event channel disconnected");
        }
    }

    /// Serializes `message` and sends it on the live connection.
    ///
    /// Nothing is buffered: without a connection the message is dropped and
    /// [`ChannelError::NotConnected`] is returned.
    pub fn send<M: Serialize + ?Sized>(&self, message: &M) -> Result<(), ChannelError> {
        let text = serde_json::to_string(message)?;

        let state = self.inner.state.lock();
        match (state.connection, &state.link) {
            (ConnectionState::Connected, Some(link)) => link
                .outbound
                .send(text)
                .map_err(|_| ChannelError::NotConnected),
            (connection, _) => {
                tracing::warn!(state = %connection, "send dropped; channel not connected");
                Err(ChannelError::NotConnected)
            }
        }
    }

    /// Timer entry point. No-op once the session ended or a connection exists.
    fn reconnect(&self) {
        let mut state = self.inner.state.lock();
        state.reconnect_timer = None;
        if state.session.is_none() || state.connection != ConnectionState::Disconnected {
            tracing::debug!("reconnect skipped");
            return;
        }
        tracing::info!(attempt = state.attempts, "reconnecting event channel");
        self.open_locked(&mut state);
    }

    fn open_locked(&self, state: &mut ChannelState) {
        let Some(session) = state.session.as_ref() else {
            return;
        };
        let url = match endpoint_url(&self.inner.config.ws_base, session) {
            Ok(url) => url,
            Err(e) => {
                tracing::error!(error = %e, "cannot open event channel");
                return;
            }
        };
        let Ok(runtime) = Handle::try_current() else {
            tracing::warn!("no async runtime available; event channel not opened");
            return;
        };

        state.connection = ConnectionState::Connecting;
        state.generation += 1;
        let cancel = CancellationToken::new();
        let (outbound, outbound_rx) = mpsc::unbounded_channel();
        state.link = Some(Link {
            outbound,
            cancel: cancel.clone(),
        });

        let transport = (self.inner.factory)();
        let channel = self.clone();
        let generation = state.generation;
        tracing::debug!(generation, "opening event channel");
        runtime.spawn(async move {
            channel
                .run_connection(transport, url, outbound_rx, cancel, generation)
                .await;
        });
    }

    async fn run_connection(
        self,
        mut transport: T,
        url: Url,
        mut outbound: mpsc::UnboundedReceiver<String>,
        cancel: CancellationToken,
        generation: u64,
    ) {
        let opened = tokio::select! {
            biased;
            _ = cancel.cancelled() => return,
            result = transport.connect(url.as_str()) => result,
        };
        if let Err(e) = opened {
            tracing::warn!(error = %e, "event channel failed to open");
            self.handle_closed(generation, None);
            return;
        }
        if !self.mark_connected(generation) {
            if let Err(e) = transport.close(NORMAL_CLOSURE).await {
                tracing::debug!(error = %e, "close after cancelled open failed");
            }
            return;
        }

        let code = loop {
            let event = tokio::select! {
                biased;
                _ = cancel.cancelled() => Event::Shutdown,
                Some(text) = outbound.recv() => Event::Outbound(text),
                inbound = transport.recv() => Event::Inbound(inbound),
            };

            match event {
                Event::Shutdown => {
                    if let Err(e) = transport.close(NORMAL_CLOSURE).await {
                        tracing::debug!(error = %e, "close handshake failed");
                    }
                    return;
                }
                Event::Outbound(text) => {
                    if let Err(e) = transport.send(text).await {
                        tracing::warn!(error = %e, "send failed; dropping connection");
                        break None;
                    }
                }
                Event::Inbound(Ok(Inbound::Text(text))) => {
                    // Malformed frames are logged by the listener set.
                    let _ = self.inner.listeners.dispatch_text(&text);
                }
                Event::Inbound(Ok(Inbound::Closed { code })) => break code,
                Event::Inbound(Err(e)) => {
                    tracing::warn!(error = %e, "receive failed; dropping connection");
                    break None;
                }
            }
        };

        self.handle_closed(generation, code);
    }

    fn mark_connected(&self, generation: u64) -> bool {
        let mut state = self.inner.state.lock();
        if state.generation != generation || state.connection != ConnectionState::Connecting {
            return false;
        }
        state.connection = ConnectionState::Connected;
        state.attempts = 0;
        state.delay = self.inner.config.base_delay;
        state.exhausted = false;
        tracing::info!("event channel connected");
        true
    }

    /// Handles the end of a connection task that was not cancelled.
    fn handle_closed(&self, generation: u64, code: Option<u16>) {
        let mut state = self.inner.state.lock();
        if state.generation != generation {
            return;
        }
        state.connection = ConnectionState::Disconnected;
        state.link = None;

        if code == Some(NORMAL_CLOSURE) {
            tracing::info!("event channel closed normally");
            return;
        }
        if state.session.is_none() {
            return;
        }
        if state.attempts >= self.inner.config.max_attempts {
            state.exhausted = true;
            tracing::error!(
                attempts = state.attempts,
                "event channel gave up reconnecting"
            );
            return;
        }

        let delay = state.delay;
        state.attempts += 1;
        state.delay = delay.saturating_mul(2);
        tracing::info!(
            ?code,
            attempt = state.attempts,
            delay_ms = delay.as_millis() as u64,
            "event channel lost; scheduling reconnect"
        );

        let Ok(runtime) = Handle::try_current() else {
            return;
        };
        let channel = self.clone();
        if let Some(previous) = state.reconnect_timer.replace(runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            channel.reconnect();
        })) {
            previous.abort();
        }
    }
}

/// Builds `{ws_base}/ws/{user_id}?token={credential}`.
pub fn endpoint_url(ws_base: &str, session: &Session) -> Result<Url, ChannelError> {
    let endpoint_error = |reason: String| ChannelError::Endpoint {
        url: ws_base.to_string(),
        reason,
    };

    let mut url = Url::parse(ws_base).map_err(|e| endpoint_error(e.to_string()))?;
    if !matches!(url.scheme(), "ws" | "wss") {
        return Err(endpoint_error(format!(
            "unsupported scheme '{}'",
            url.scheme()
        )));
    }
    url.path_segments_mut()
        .map_err(|()| endpoint_error("cannot hold a path".to_string()))?
        .pop_if_empty()
        .push("ws")
        .push(&session.user_id);
    url.query_pairs_mut()
        .clear()
        .append_pair("token", &session.credential);
    Ok(url)
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
