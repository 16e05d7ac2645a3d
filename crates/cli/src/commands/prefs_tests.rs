// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use super::*;
use crate::commands::testing::{context, context_with, output};
use crate::sync::test_helpers::MockRemote;
use cp_core::Snapshot;
use serde_json::json;
use std::sync::Arc;
use yare::parameterized;

async fn run_cmd(ctx: &Context, cmd: PrefsCommand) -> (Result<()>, String) {
    let mut buf = Vec::new();
    let result = run_impl(ctx, cmd, &mut buf).await;
    (result, output(buf))
}

// ─────────────────────────────────────────────────────────────────────────
// Value parsing
// ─────────────────────────────────────────────────────────────────────────

#[parameterized(
    bool_value = { "dark_mode", "true", json!(true) },
    integer = { "particle_intensity", "75", json!(75) },
    float = { "animation_speed", "1.5", json!(1.5) },
    quoted_string = { "theme", "\"ocean\"", json!("ocean") },
    bare_string = { "theme", "ocean", json!("ocean") },
    object = { "custom_themes", "{}", json!({}) },
)]
fn parse_value_accepts(key: &str, raw: &str, expected: Value) {
    assert_eq!(parse_value(key, raw).unwrap(), expected);
}

#[parameterized(
    wrong_type = { "dark_mode", "50" },
    not_json_for_bool = { "sound_enabled", "yes" },
    intensity_too_high = { "particle_intensity", "150" },
    intensity_negative = { "particle_intensity", "-1" },
    zero_speed = { "animation_speed", "0" },
)]
fn parse_value_rejects(key: &str, raw: &str) {
    let err = parse_value(key, raw).unwrap_err();
    assert!(matches!(err, Error::InvalidValue { .. }), "got {err}");
}

#[test]
fn parse_value_rejects_unknown_key() {
    let err = parse_value("colour", "\"red\"").unwrap_err();
    assert!(matches!(err, Error::UnknownKey(_)));
}

// ─────────────────────────────────────────────────────────────────────────
// Commands
// ─────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn show_text_lists_every_setting() {
    let (ctx, _) = context(false);
    let (result, out) = run_cmd(
        &ctx,
        PrefsCommand::Show {
            output: OutputFormat::Text,
        },
    )
    .await;

    result.unwrap();
    assert!(out.starts_with("sync: idle"));
    for key in keys::ALL {
        assert!(out.contains(key), "missing {key}");
    }
}

#[tokio::test]
async fn show_json_reports_status_and_settings() {
    let (ctx, _) = context(false);
    let (result, out) = run_cmd(
        &ctx,
        PrefsCommand::Show {
            output: OutputFormat::Json,
        },
    )
    .await;

    result.unwrap();
    let parsed: Value = serde_json::from_str(&out).unwrap();
    assert_eq!(parsed["status"], "idle");
    assert_eq!(parsed["settings"]["theme"], "default");
}

#[tokio::test]
async fn get_unknown_key_fails() {
    let (ctx, _) = context(false);
    let (result, _) = run_cmd(
        &ctx,
        PrefsCommand::Get {
            key: "colour".into(),
        },
    )
    .await;
    assert!(matches!(result, Err(Error::UnknownKey(_))));
}

#[tokio::test]
async fn set_without_session_saves_locally() {
    let (ctx, remote) = context(false);
    let (result, out) = run_cmd(
        &ctx,
        PrefsCommand::Set {
            key: "theme".into(),
            value: "ocean".into(),
        },
    )
    .await;

    result.unwrap();
    assert_eq!(out.trim(), r#"theme = "ocean""#);
    assert_eq!(ctx.engine.get("theme"), Some(json!("ocean")));
    assert!(remote.stores().is_empty());
}

#[tokio::test]
async fn set_with_session_pushes_immediately() {
    let (ctx, remote) = context(true);
    let (result, _) = run_cmd(
        &ctx,
        PrefsCommand::Set {
            key: "dark_mode".into(),
            value: "true".into(),
        },
    )
    .await;

    result.unwrap();
    let pushed = remote.stores().pop().unwrap();
    assert_eq!(pushed.get("dark_mode"), Some(&json!(true)));
}

#[tokio::test]
async fn set_while_offline_notes_local_save() {
    let remote = Arc::new(MockRemote::new());
    remote.set_fail_fetch(true);
    remote.set_fail_store(true);
    let ctx = context_with(true, remote);

    let (result, out) = run_cmd(
        &ctx,
        PrefsCommand::Set {
            key: "sound_enabled".into(),
            value: "false".into(),
        },
    )
    .await;

    result.unwrap();
    assert!(out.contains("saved locally"));
    assert_eq!(ctx.engine.get("sound_enabled"), Some(json!(false)));
}

#[tokio::test]
async fn pull_requires_session() {
    let (ctx, _) = context(false);
    let (result, _) = run_cmd(&ctx, PrefsCommand::Pull).await;
    assert!(matches!(result, Err(Error::NoSession)));
}

#[tokio::test]
async fn pull_adopts_server_copy() {
    let mut server = Snapshot::defaults();
    server.set("theme", json!("royal"));
    let ctx = context_with(true, Arc::new(MockRemote::holding(server)));

    let (result, out) = run_cmd(&ctx, PrefsCommand::Pull).await;

    result.unwrap();
    assert_eq!(out.trim(), "preferences synced");
    assert_eq!(ctx.engine.get("theme"), Some(json!("royal")));
}

#[tokio::test]
async fn push_failure_is_reported() {
    let remote = Arc::new(MockRemote::new());
    remote.set_fail_store(true);
    let ctx = context_with(true, remote);

    let (result, out) = run_cmd(&ctx, PrefsCommand::Push).await;

    assert!(matches!(
        result,
        Err(Error::SyncIncomplete(SyncStatus::Offline))
    ));
    assert!(out.contains("server unreachable"));
}

#[tokio::test]
async fn reset_restores_defaults() {
    let (ctx, _) = context(false);
    run_cmd(
        &ctx,
        PrefsCommand::Set {
            key: "particle_intensity".into(),
            value: "10".into(),
        },
    )
    .await
    .0
    .unwrap();

    let (result, _) = run_cmd(&ctx, PrefsCommand::Reset).await;

    result.unwrap();
    assert_eq!(ctx.engine.snapshot(), Snapshot::defaults());
}

#[tokio::test]
async fn resolve_without_conflict_fails() {
    let (ctx, _) = context(true);
    let (result, _) = run_cmd(
        &ctx,
        PrefsCommand::Resolve {
            keep: KeepSide::Remote,
        },
    )
    .await;
    assert!(matches!(
        result,
        Err(Error::Engine(EngineError::NoConflict))
    ));
}
