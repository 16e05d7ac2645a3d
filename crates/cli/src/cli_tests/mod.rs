// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

// This module contains split test files for CLI parsing tests.
// Each file focuses on a specific category of tests.

#![allow(clippy::unwrap_used)]

use super::*;


#[test]
fn test_cli_definition_is_valid() {
    use clap::CommandFactory;
    Cli::command().debug_assert();
}

#[test]
fn test_global_flags_after_subcommand() {
    let cli = Cli::try_parse_from(["campanile", "listen", "-v", "-c", "/tmp/c.toml"]).unwrap();
    assert!(cli.verbose);
    assert_eq!(cli.config, Some(PathBuf::from("/tmp/c.toml")));
    assert!(matches!(cli.command, Command::Listen));
}
