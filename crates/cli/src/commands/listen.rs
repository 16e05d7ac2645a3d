// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::future::Future;
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;

use crate::channel::{EventChannel, Transport};
use crate::error::{Error, Result};
use crate::session::SessionGlue;

use super::Context;

/// How often the loop checks whether the channel gave up reconnecting.
const EXHAUSTION_POLL: Duration = Duration::from_secs(1);

pub async fn run(ctx: &Context) -> Result<()> {
    let channel = EventChannel::new(ctx.config.channel_config());
    let sink = Arc::new(Mutex::new(std::io::stdout()));
    let stop = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "failed to wait for ctrl-c");
            std::future::pending::<()>().await;
        }
    };
    listen_until(ctx, channel, sink, stop).await
}

/// Streams channel messages as JSON lines into `sink` until `stop` resolves.
///
/// Returns an error if the channel exhausts its reconnect attempts first.
pub(crate) async fn listen_until<T, W>(
    ctx: &Context,
    channel: EventChannel<T>,
    sink: Arc<Mutex<W>>,
    stop: impl Future<Output = ()>,
) -> Result<()>
where
    T: Transport,
    W: Write + Send + 'static,
{
    let session = ctx.require_session()?;

    channel.add_listener(move |message| {
        let mut out = sink.lock();
        if let Err(e) = writeln!(out, "{message}").and_then(|()| out.flush()) {
            tracing::warn!(error = %e, "failed to write message");
        }
    });

    let shutdown = CancellationToken::new();
    let glue = SessionGlue::new(ctx.engine.clone(), channel.clone());
    let task = tokio::spawn(glue.run(ctx.sessions.subscribe(), shutdown.clone()));
    ctx.sessions.login(session);
    tracing::info!("listening for alerts, press ctrl-c to stop");

    let outcome = wait(&channel, stop).await;

    shutdown.cancel();
    if let Err(e) = task.await {
        tracing::warn!(error = %e, "session task failed");
    }
    ctx.engine.flush().await;
    outcome
}

async fn wait<T: Transport>(channel: &EventChannel<T>, stop: impl Future<Output = ()>) -> Result<()> {
    tokio::pin!(stop);
    let mut poll = tokio::time::interval(EXHAUSTION_POLL);

    loop {
        tokio::select! {
            () = &mut stop => return Ok(()),
            _ = poll.tick() => {
                if channel.is_exhausted() {
                    return Err(Error::ChannelExhausted(channel.reconnect_attempts()));
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "listen_tests.rs"]
mod tests;
