// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Tests for the transport module.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use super::transport::{Inbound, Transport, TransportError, TransportFuture, NORMAL_CLOSURE};
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::time::Instant;

/// Scripted server side shared by every [`MockTransport`] it creates.
#[derive(Clone, Default)]
pub struct MockHub {
    inner: Arc<Mutex<HubState>>,
}

#[derive(Default)]
struct HubState {
    created: usize,
    connect_times: Vec<Instant>,
    urls: Vec<String>,
    fail_connect: bool,
    live: Option<mpsc::UnboundedSender<Inbound>>,
    sent: Vec<String>,
    closes: Vec<u16>,
}

impl MockHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Factory handing out transports bound to this hub.
    pub fn factory(&self) -> impl Fn() -> MockTransport + Send + Sync + 'static {
        let hub = self.clone();
        move || {
            hub.inner.lock().created += 1;
            MockTransport {
                hub: hub.clone(),
                inbound: None,
            }
        }
    }

    pub fn set_fail_connect(&self, fail: bool) {
        self.inner.lock().fail_connect = fail;
    }

    /// Delivers a text frame on the live connection.
    pub fn push_text(&self, text: &str) {
        let state = self.inner.lock();
        let live = state.live.as_ref().expect("no live connection");
        live.send(Inbound::Text(text.to_string())).unwrap();
    }

    /// Closes the live connection from the server side.
    pub fn close_from_server(&self, code: Option<u16>) {
        let live = self.inner.lock().live.take().expect("no live connection");
        live.send(Inbound::Closed { code }).unwrap();
    }

    pub fn transports_created(&self) -> usize {
        self.inner.lock().created
    }

    pub fn connect_times(&self) -> Vec<Instant> {
        self.inner.lock().connect_times.clone()
    }

    pub fn urls(&self) -> Vec<String> {
        self.inner.lock().urls.clone()
    }

    pub fn sent(&self) -> Vec<String> {
        self.inner.lock().sent.clone()
    }

    pub fn closes(&self) -> Vec<u16> {
        self.inner.lock().closes.clone()
    }
}

/// Mock transport for testing without real sockets.
pub struct MockTransport {
    hub: MockHub,
    inbound: Option<mpsc::UnboundedReceiver<Inbound>>,
}

impl Transport for MockTransport {
    fn connect(&mut self, url: &str) -> TransportFuture<'_, ()> {
        let url = url.to_string();
        Box::pin(async move {
            let mut state = self.hub.inner.lock();
            state.connect_times.push(Instant::now());
            state.urls.push(url);
            if state.fail_connect {
                return Err(TransportError::ConnectionFailed("mock failure".into()));
            }
            let (tx, rx) = mpsc::unbounded_channel();
            state.live = Some(tx);
            self.inbound = Some(rx);
            Ok(())
        })
    }

    fn send(&mut self, text: String) -> TransportFuture<'_, ()> {
        Box::pin(async move {
            if self.inbound.is_none() {
                return Err(TransportError::ConnectionClosed);
            }
            self.hub.inner.lock().sent.push(text);
            Ok(())
        })
    }

    fn recv(&mut self) -> TransportFuture<'_, Inbound> {
        Box::pin(async move {
            let inbound = self
                .inbound
                .as_mut()
                .ok_or(TransportError::ConnectionClosed)?;
            let next = inbound.recv().await;
            match next {
                Some(Inbound::Closed { code }) => {
                    self.inbound = None;
                    Ok(Inbound::Closed { code })
                }
                Some(frame) => Ok(frame),
                None => {
                    self.inbound = None;
                    Ok(Inbound::Closed { code: None })
                }
            }
        })
    }

    fn close(&mut self, code: u16) -> TransportFuture<'_, ()> {
        Box::pin(async move {
            if self.inbound.take().is_some() {
                let mut state = self.hub.inner.lock();
                state.closes.push(code);
                state.live = None;
            }
            Ok(())
        })
    }
}

#[tokio::test]
async fn mock_transport_connect_and_close() {
    let hub = MockHub::new();
    let mut transport = hub.factory()();
    transport.connect("ws://localhost:1234/ws/u1").await.unwrap();

    transport.close(NORMAL_CLOSURE).await.unwrap();
    assert_eq!(hub.closes(), vec![NORMAL_CLOSURE]);
    assert_eq!(hub.urls(), vec!["ws://localhost:1234/ws/u1".to_string()]);
}

#[tokio::test]
async fn mock_transport_send_recv() {
    let hub = MockHub::new();
    let mut transport = hub.factory()();
    transport.connect("ws://localhost:1234").await.unwrap();

    transport.send(r#"{"type":"ack"}"#.into()).await.unwrap();
    assert_eq!(hub.sent(), vec![r#"{"type":"ack"}"#.to_string()]);

    hub.push_text(r#"{"type":"alert"}"#);
    let received = transport.recv().await.unwrap();
    assert_eq!(received, Inbound::Text(r#"{"type":"alert"}"#.into()));

    hub.close_from_server(Some(1011));
    let received = transport.recv().await.unwrap();
    assert_eq!(received, Inbound::Closed { code: Some(1011) });
}

#[tokio::test]
async fn mock_transport_connect_fail() {
    let hub = MockHub::new();
    hub.set_fail_connect(true);
    let mut transport = hub.factory()();

    let result = transport.connect("ws://localhost:1234").await;
    assert!(matches!(result, Err(TransportError::ConnectionFailed(_))));
    assert_eq!(hub.connect_times().len(), 1);
}

#[tokio::test]
async fn websocket_transport_starts_closed() {
    let mut transport = super::transport::WebSocketTransport::new();

    let err = transport.send("{}".into()).await.unwrap_err();
    assert!(matches!(err, TransportError::ConnectionClosed));
    transport.close(NORMAL_CLOSURE).await.unwrap();
}

#[tokio::test]
async fn websocket_transport_reports_refused_connection() {
    let mut transport = super::transport::WebSocketTransport::new();
    let result = transport.connect("ws://127.0.0.1:9/ws/u1").await;
    assert!(matches!(result, Err(TransportError::ConnectionFailed(_))));
}
