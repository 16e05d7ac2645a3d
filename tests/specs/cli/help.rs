// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Rust specs for help and version output of `campanile`.

#![allow(clippy::panic)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use yare::parameterized;

fn campanile() -> Command {
    cargo_bin_cmd!("campanile")
}

// =============================================================================
// Top-level help
// =============================================================================

#[test]
fn no_arguments_prints_usage_and_fails() {
    campanile()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn help_lists_commands() {
    campanile()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("prefs"))
        .stdout(predicate::str::contains("variant"))
        .stdout(predicate::str::contains("listen"))
        .stdout(predicate::str::contains("--config"));
}

#[parameterized(
    prefs = { "prefs" },
    variant = { "variant" },
    listen = { "listen" },
)]
fn command_supports_help_flag(cmd: &str) {
    campanile()
        .args([cmd, "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage"));
}

#[test]
fn set_help_shows_examples() {
    campanile()
        .args(["prefs", "set", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Examples:"))
        .stdout(predicate::str::contains("particle_intensity"));
}

// =============================================================================
// Version
// =============================================================================

#[parameterized(
    long_version = { "--version" },
    short_version = { "-V" },
)]
fn version_flag_outputs_version(flag: &str) {
    campanile()
        .arg(flag)
        .assert()
        .success()
        .stdout(predicate::str::contains("campanile"))
        .stdout(predicate::str::is_match(r"[0-9]+\.[0-9]+\.[0-9]+").unwrap());
}

#[test]
fn unknown_command_fails() {
    campanile()
        .arg("frobnicate")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unrecognized subcommand"));
}
