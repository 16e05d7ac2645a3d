// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Rust specs for the `campanile variant` commands.

#![allow(clippy::panic)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn campanile(temp: &TempDir) -> Command {
    let mut cmd = cargo_bin_cmd!("campanile");
    cmd.env("CAMPANILE_CONFIG", temp.path().join("config.toml"))
        .env("CAMPANILE_STATE_DIR", temp.path().join("state"))
        .env_remove("CAMPANILE_USER_ID")
        .env_remove("CAMPANILE_TOKEN")
        .env_remove("RUST_LOG");
    cmd
}

fn create(temp: &TempDir, name: &str) {
    campanile(temp)
        .args(["variant", "create", name])
        .assert()
        .success();
}

#[test]
fn list_is_empty_on_fresh_state() {
    let temp = TempDir::new().unwrap();
    campanile(&temp)
        .args(["variant", "list"])
        .assert()
        .success()
        .stdout("");
}

#[test]
fn create_duplicate_delete_flow() {
    let temp = TempDir::new().unwrap();
    create(&temp, "Night");
    campanile(&temp)
        .args(["variant", "duplicate", "Night", "Midnight"])
        .assert()
        .success();
    campanile(&temp)
        .args(["variant", "delete", "Night"])
        .assert()
        .success();

    campanile(&temp)
        .args(["variant", "list"])
        .assert()
        .success()
        .stdout("Midnight\n");
}

#[test]
fn create_existing_name_fails() {
    let temp = TempDir::new().unwrap();
    create(&temp, "Night");
    campanile(&temp)
        .args(["variant", "create", "Night"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn create_rejects_blank_name() {
    let temp = TempDir::new().unwrap();
    campanile(&temp)
        .args(["variant", "create", "  "])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be empty"));
}

#[test]
fn export_then_import_from_stdin() {
    let temp = TempDir::new().unwrap();
    create(&temp, "Night");

    let exported = campanile(&temp)
        .args(["variant", "export", "Night"])
        .output()
        .unwrap();
    assert!(exported.status.success());

    campanile(&temp)
        .args(["variant", "import", "-"])
        .write_stdin(exported.stdout)
        .assert()
        .success()
        .stdout(predicate::str::contains("Night (2)"));
}

#[test]
fn import_from_file() {
    let temp = TempDir::new().unwrap();
    create(&temp, "Dawn");
    let exported = campanile(&temp)
        .args(["variant", "export", "Dawn"])
        .output()
        .unwrap();

    let other = TempDir::new().unwrap();
    let file = other.path().join("dawn.json");
    std::fs::write(&file, exported.stdout).unwrap();

    campanile(&other)
        .args(["variant", "import"])
        .arg(&file)
        .assert()
        .success()
        .stdout("imported variant 'Dawn'\n");
}

#[test]
fn export_missing_variant_fails() {
    let temp = TempDir::new().unwrap();
    campanile(&temp)
        .args(["variant", "export", "Ghost"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}
