// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Remote preference service.
//!
//! Provides a trait-based client for the canonical server-side snapshot:
//! - [`HttpRemote`] talks to the real service over HTTP
//! - Mock services stand in for it in tests

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use cp_core::{Snapshot, SyncAck, SyncEnvelope, SyncUpload};
use reqwest::{Client, Url};

use crate::session::SessionContext;

/// Error type for remote service calls.
#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    /// No session is active, so there is no credential to send.
    #[error("no active session")]
    NoSession,

    /// The configured endpoint is not a valid URL.
    #[error("invalid endpoint '{url}': {reason}")]
    Endpoint { url: String, reason: String },

    /// The request could not be completed.
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The server answered with a non-success status code.
    #[error("server returned HTTP {0}")]
    Status(u16),

    /// The server answered but reported failure.
    #[error("server rejected request: {0}")]
    Rejected(String),
}

/// Result type for remote service calls.
pub type RemoteResult<T> = Result<T, RemoteError>;

/// Boxed future returned by [`RemoteService`] methods.
pub type RemoteFuture<'a, T> = Pin<Box<dyn Future<Output = RemoteResult<T>> + Send + 'a>>;

/// Request/response access to the canonical preference snapshot.
pub trait RemoteService: Send + Sync {
    /// Fetches the stored snapshot.
    fn fetch(&self) -> RemoteFuture<'_, SyncEnvelope>;

    /// Replaces the stored snapshot with `snapshot`.
    fn store(&self, snapshot: &Snapshot) -> RemoteFuture<'_, ()>;
}

/// HTTP implementation of [`RemoteService`] using reqwest.
///
/// The bearer credential is read from the session context on every request,
/// so a renewed credential is picked up without rebuilding the client.
pub struct HttpRemote {
    client: Client,
    endpoint: Url,
    session: SessionContext,
}

impl HttpRemote {
    /// Creates a client for `{api_base}/settings/sync`.
    ///
    /// No request timeout is applied unless `request_timeout` is set.
    pub fn new(
        api_base: &str,
        session: SessionContext,
        request_timeout: Option<Duration>,
    ) -> RemoteResult<Self> {
        let endpoint = sync_endpoint(api_base)?;

        let mut builder = Client::builder();
        if let Some(timeout) = request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        Ok(HttpRemote {
            client,
            endpoint,
            session,
        })
    }

    /// The full sync endpoint URL.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

impl RemoteService for HttpRemote {
    fn fetch(&self) -> RemoteFuture<'_, SyncEnvelope> {
        Box::pin(async move {
            let token = self.session.credential().ok_or(RemoteError::NoSession)?;

            let response = self
                .client
                .get(self.endpoint.clone())
                .bearer_auth(token)
                .send()
                .await?;
            if !response.status().is_success() {
                return Err(RemoteError::Status(response.status().as_u16()));
            }

            let envelope: SyncEnvelope = response.json().await?;
            if !envelope.success {
                return Err(RemoteError::Rejected("fetch reported failure".to_string()));
            }
            Ok(envelope)
        })
    }

    fn store(&self, snapshot: &Snapshot) -> RemoteFuture<'_, ()> {
        let upload = SyncUpload::new(snapshot.clone());
        Box::pin(async move {
            let token = self.session.credential().ok_or(RemoteError::NoSession)?;

            let response = self
                .client
                .post(self.endpoint.clone())
                .bearer_auth(token)
                .json(&upload)
                .send()
                .await?;
            if !response.status().is_success() {
                return Err(RemoteError::Status(response.status().as_u16()));
            }

            let ack: SyncAck = response.json().await?;
            if !ack.success {
                return Err(RemoteError::Rejected(
                    ack.message
                        .unwrap_or_else(|| "store reported failure".to_string()),
                ));
            }
            Ok(())
        })
    }
}

/// Builds `{api_base}/settings/sync`, tolerating a trailing slash.
pub fn sync_endpoint(api_base: &str) -> RemoteResult<Url> {
    let raw = format!("{}/settings/sync", api_base.trim_end_matches('/'));
    let url = Url::parse(&raw).map_err(|e| RemoteError::Endpoint {
        url: raw.clone(),
        reason: e.to_string(),
    })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(RemoteError::Endpoint {
            url: raw,
            reason: format!("unsupported scheme '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "remote_tests.rs"]
mod tests;
