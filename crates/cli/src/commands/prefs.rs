// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::io::Write;

use cp_core::prefs::default_value;
use cp_core::{keys, SyncStatus};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::cli::{KeepSide, OutputFormat, PrefsCommand};
use crate::error::{Error, Result};
use crate::sync::EngineError;

use super::{sync_note, Context};

#[derive(Serialize)]
struct PrefsReport<'a> {
    status: SyncStatus,
    settings: &'a Map<String, Value>,
}

pub async fn run(ctx: &Context, cmd: PrefsCommand) -> Result<()> {
    let stdout = std::io::stdout();
    run_impl(ctx, cmd, &mut stdout.lock()).await
}

/// Internal implementation that accepts a writer for testing.
pub(crate) async fn run_impl(ctx: &Context, cmd: PrefsCommand, out: &mut impl Write) -> Result<()> {
    match cmd {
        PrefsCommand::Show { output } => {
            ctx.start(false).await;
            show(ctx, output, out)
        }
        PrefsCommand::Get { key } => {
            ctx.start(false).await;
            let value = ctx.engine.get(&key).ok_or(Error::UnknownKey(key))?;
            writeln!(out, "{value}")?;
            Ok(())
        }
        PrefsCommand::Set { key, value } => {
            let value = parse_value(&key, &value)?;
            ctx.start(true).await;
            writeln!(out, "{key} = {value}")?;
            ctx.engine.update(&key, value);
            ctx.finish(out).await?;
            Ok(())
        }
        PrefsCommand::Pull => {
            ctx.require_session()?;
            let status = ctx.start(true).await;
            report(status, "preferences synced", out)
        }
        PrefsCommand::Push => {
            ctx.require_session()?;
            ctx.start(false).await;
            let status = ctx.engine.push_to_remote().await;
            report(status, "preferences pushed", out)
        }
        PrefsCommand::Reset => {
            ctx.start(false).await;
            ctx.engine.reset();
            writeln!(out, "preferences reset to defaults")?;
            Ok(())
        }
        PrefsCommand::Resolve { keep } => {
            ctx.require_session()?;
            if ctx.start(true).await != SyncStatus::Conflict {
                return Err(EngineError::NoConflict.into());
            }
            let status = ctx.engine.resolve_conflict(keep == KeepSide::Remote).await?;
            let side = match keep {
                KeepSide::Remote => "kept server preferences",
                KeepSide::Local => "kept local preferences",
            };
            report(status, side, out)
        }
    }
}

fn show(ctx: &Context, output: OutputFormat, out: &mut impl Write) -> Result<()> {
    let snapshot = ctx.engine.snapshot();
    let status = ctx.engine.status();

    match output {
        OutputFormat::Json => {
            let report = PrefsReport {
                status,
                settings: snapshot.as_map(),
            };
            writeln!(out, "{}", serde_json::to_string_pretty(&report)?)?;
        }
        OutputFormat::Text => {
            writeln!(out, "sync: {status} ({})", status.describe())?;
            for (key, value) in snapshot.as_map() {
                writeln!(out, "  {key:<22} {value}")?;
            }
        }
    }
    Ok(())
}

fn report(status: SyncStatus, success: &str, out: &mut impl Write) -> Result<()> {
    if status == SyncStatus::Synced {
        writeln!(out, "{success}")?;
        return Ok(());
    }
    if let Some(note) = sync_note(status) {
        writeln!(out, "{note}")?;
    }
    Err(Error::SyncIncomplete(status))
}

/// Parses a command-line value for a known setting.
///
/// Values are JSON. For string settings a bare word is accepted as-is.
pub(crate) fn parse_value(key: &str, raw: &str) -> Result<Value> {
    let Some(default) = default_value(key) else {
        return Err(Error::UnknownKey(key.to_string()));
    };
    let invalid = |reason: String| Error::InvalidValue {
        key: key.to_string(),
        reason,
    };

    let value = match serde_json::from_str::<Value>(raw) {
        Ok(value) => value,
        Err(_) if default.is_string() => Value::String(raw.to_string()),
        Err(e) => return Err(invalid(e.to_string())),
    };

    let (expected, actual) = (kind(&default), kind(&value));
    if expected != actual {
        return Err(invalid(format!("expected {expected}, got {actual}")));
    }
    if key == keys::PARTICLE_INTENSITY && !value.as_f64().is_some_and(|v| (0.0..=100.0).contains(&v)) {
        return Err(invalid("must be between 0 and 100".to_string()));
    }
    if key == keys::ANIMATION_SPEED && !value.as_f64().is_some_and(|v| v > 0.0) {
        return Err(invalid("must be greater than 0".to_string()));
    }
    Ok(value)
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
#[path = "prefs_tests.rs"]
mod tests;
