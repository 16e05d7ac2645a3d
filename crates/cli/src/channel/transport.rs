// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Transport abstraction for WebSocket communication.
//!
//! Provides a trait-based transport layer that enables:
//! - Real WebSocket connections for production
//! - Mock transports for unit testing
//!
//! Transports move raw text frames. Parsing and fan-out belong to the
//! channel, so a malformed frame never tears the connection down.

use std::future::Future;
use std::pin::Pin;

/// Close code for an intentional, client-initiated shutdown.
pub const NORMAL_CLOSURE: u16 = 1000;

/// Error type for transport operations.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Connection failed.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// Operation attempted on a transport that is not open.
    #[error("connection closed")]
    ConnectionClosed,

    /// Send failed.
    #[error("send failed: {0}")]
    SendFailed(String),

    /// Receive failed.
    #[error("receive failed: {0}")]
    ReceiveFailed(String),
}

/// Result type for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;

/// Boxed future returned by [`Transport`] methods.
pub type TransportFuture<'a, T> = Pin<Box<dyn Future<Output = TransportResult<T>> + Send + 'a>>;

/// What [`Transport::recv`] produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    /// A text frame.
    Text(String),
    /// The peer closed the connection. `code` is absent when the stream
    /// simply ended without a close frame.
    Closed { code: Option<u16> },
}

/// Transport trait for WebSocket-like communication.
///
/// One transport serves one connection attempt; the channel asks its factory
/// for a fresh one on every (re)connect. `recv` must be cancel safe, since
/// the channel races it against outbound frames and shutdown.
pub trait Transport: Send + 'static {
    /// Opens a connection to `url`.
    fn connect(&mut self, url: &str) -> TransportFuture<'_, ()>;

    /// Sends a text frame.
    fn send(&mut self, text: String) -> TransportFuture<'_, ()>;

    /// Waits for the next text frame or the end of the connection.
    fn recv(&mut self) -> TransportFuture<'_, Inbound>;

    /// Closes the connection with `code`.
    fn close(&mut self, code: u16) -> TransportFuture<'_, ()>;
}

type WsStream =
    tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>;

/// WebSocket transport implementation using tokio-tungstenite.
#[derive(Default)]
pub struct WebSocketTransport {
    /// The WebSocket connection, if open.
    ws: Option<WebSocketConnection>,
}

/// Internal WebSocket connection wrapper.
struct WebSocketConnection {
    sink: futures_util::stream::SplitSink<WsStream, tokio_tungstenite::tungstenite::Message>,
    stream: futures_util::stream::SplitStream<WsStream>,
}

impl WebSocketTransport {
    /// Create a new, unconnected WebSocket transport.
    pub fn new() -> Self {
        WebSocketTransport { ws: None }
    }
}

impl Transport for WebSocketTransport {
    fn connect(&mut self, url: &str) -> TransportFuture<'_, ()> {
        let url = url.to_string();
        Box::pin(async move {
            use futures_util::StreamExt;

            let (ws_stream, _) = tokio_tungstenite::connect_async(url.as_str())
                .await
                .map_err(|e| TransportError::ConnectionFailed(e.to_string()))?;

            let (sink, stream) = ws_stream.split();
            self.ws = Some(WebSocketConnection { sink, stream });
            Ok(())
        })
    }

    fn send(&mut self, text: String) -> TransportFuture<'_, ()> {
        Box::pin(async move {
            use futures_util::SinkExt;
            use tokio_tungstenite::tungstenite::Message;

            let ws = self.ws.as_mut().ok_or(TransportError::ConnectionClosed)?;

            if let Err(e) = ws.sink.send(Message::Text(text.into())).await {
                // Connection is broken, clear it
                self.ws = None;
                return Err(TransportError::SendFailed(e.to_string()));
            }
            Ok(())
        })
    }

    fn recv(&mut self) -> TransportFuture<'_, Inbound> {
        Box::pin(async move {
            use futures_util::StreamExt;
            use tokio_tungstenite::tungstenite::Message;

            let ws = self.ws.as_mut().ok_or(TransportError::ConnectionClosed)?;

            loop {
                match ws.stream.next().await {
                    Some(Ok(Message::Text(text))) => {
                        return Ok(Inbound::Text(text.as_str().to_owned()));
                    }
                    Some(Ok(Message::Close(frame))) => {
                        self.ws = None;
                        let code = frame.map(|f| u16::from(f.code));
                        return Ok(Inbound::Closed { code });
                    }
                    Some(Ok(Message::Binary(data))) => {
                        tracing::debug!(len = data.len(), "ignoring binary frame");
                    }
                    Some(Ok(_)) => {
                        // Ping/pong and raw frames
                        continue;
                    }
                    Some(Err(e)) => {
                        self.ws = None;
                        return Err(TransportError::ReceiveFailed(e.to_string()));
                    }
                    None => {
                        self.ws = None;
                        return Ok(Inbound::Closed { code: None });
                    }
                }
            }
        })
    }

    fn close(&mut self, code: u16) -> TransportFuture<'_, ()> {
        Box::pin(async move {
            use futures_util::SinkExt;
            use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
            use tokio_tungstenite::tungstenite::protocol::CloseFrame;
            use tokio_tungstenite::tungstenite::{Message, Utf8Bytes};

            let Some(mut ws) = self.ws.take() else {
                return Ok(());
            };
            let frame = CloseFrame {
                code: CloseCode::from(code),
                reason: Utf8Bytes::from_static("client closing"),
            };
            ws.sink
                .send(Message::Close(Some(frame)))
                .await
                .map_err(|e| TransportError::SendFailed(e.to_string()))?;
            ws.sink
                .close()
                .await
                .map_err(|e| TransportError::SendFailed(e.to_string()))
        })
    }
}
