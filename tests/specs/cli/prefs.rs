// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Rust specs for the `campanile prefs` commands.
//!
//! Every run is offline: the config has no session and the environment
//! carries none, so no request leaves the process.

#![allow(clippy::panic)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;
use yare::parameterized;

/// A command isolated to `temp`: its own config file and state directory.
fn campanile(temp: &TempDir) -> Command {
    let mut cmd = cargo_bin_cmd!("campanile");
    cmd.env("CAMPANILE_CONFIG", temp.path().join("config.toml"))
        .env("CAMPANILE_STATE_DIR", temp.path().join("state"))
        .env_remove("CAMPANILE_USER_ID")
        .env_remove("CAMPANILE_TOKEN")
        .env_remove("RUST_LOG");
    cmd
}

fn show_json(temp: &TempDir) -> serde_json::Value {
    let output = campanile(temp)
        .args(["prefs", "show", "-o", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    serde_json::from_slice(&output.stdout).unwrap()
}

// =============================================================================
// show / get
// =============================================================================

#[test]
fn show_on_fresh_state_lists_defaults() {
    let temp = TempDir::new().unwrap();
    let shown = show_json(&temp);

    assert_eq!(shown["status"], "idle");
    assert_eq!(shown["settings"]["theme"], "default");
    assert_eq!(shown["settings"]["particle_intensity"], 50);
}

#[test]
fn show_text_names_sync_state() {
    let temp = TempDir::new().unwrap();
    campanile(&temp)
        .args(["prefs", "show"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("sync: idle"))
        .stdout(predicate::str::contains("dark_mode"));
}

#[test]
fn get_unknown_key_fails_with_hint() {
    let temp = TempDir::new().unwrap();
    campanile(&temp)
        .args(["prefs", "get", "colour"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown setting"));
}

// =============================================================================
// set
// =============================================================================

#[test]
fn set_persists_across_runs() {
    let temp = TempDir::new().unwrap();
    campanile(&temp)
        .args(["prefs", "set", "dark_mode", "true"])
        .assert()
        .success()
        .stdout("dark_mode = true\n");

    campanile(&temp)
        .args(["prefs", "get", "dark_mode"])
        .assert()
        .success()
        .stdout("true\n");
}

#[test]
fn set_accepts_bare_word_for_strings() {
    let temp = TempDir::new().unwrap();
    campanile(&temp)
        .args(["prefs", "set", "theme", "ocean"])
        .assert()
        .success();

    assert_eq!(show_json(&temp)["settings"]["theme"], "ocean");
}

#[parameterized(
    wrong_type = { "dark_mode", "7" },
    out_of_range = { "particle_intensity", "101" },
    not_positive = { "animation_speed", "0" },
)]
fn set_rejects_invalid_values(key: &str, value: &str) {
    let temp = TempDir::new().unwrap();
    campanile(&temp)
        .args(["prefs", "set", key, value])
        .assert()
        .failure()
        .stderr(predicate::str::contains(key));
}

// =============================================================================
// reset / session-only commands
// =============================================================================

#[test]
fn reset_restores_defaults() {
    let temp = TempDir::new().unwrap();
    campanile(&temp)
        .args(["prefs", "set", "particle_intensity", "10"])
        .assert()
        .success();
    campanile(&temp)
        .args(["prefs", "reset"])
        .assert()
        .success();

    assert_eq!(show_json(&temp)["settings"]["particle_intensity"], 50);
}

#[parameterized(
    pull = { &["prefs", "pull"] },
    push = { &["prefs", "push"] },
    resolve = { &["prefs", "resolve", "--keep", "local"] },
    listen = { &["listen"] },
)]
fn session_commands_require_session(args: &[&str]) {
    let temp = TempDir::new().unwrap();
    campanile(&temp)
        .args(args)
        .assert()
        .failure()
        .stderr(predicate::str::contains("no session configured"));
}
