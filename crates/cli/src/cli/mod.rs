// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Parse a string that must not be empty or whitespace-only.
fn non_empty_string(s: &str) -> Result<String, String> {
    if s.trim().is_empty() {
        Err("cannot be empty".to_string())
    } else {
        Ok(s.to_string())
    }
}

/// Output format for commands supporting structured output.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Side kept when resolving a sync conflict.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum KeepSide {
    /// Adopt the server copy
    Remote,
    /// Keep this device's copy and push it
    Local,
}

#[derive(Parser, Debug)]
#[command(name = "campanile")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Offline-first preference sync and live alerts for the campus alerting client")]
#[command(
    long_about = "Offline-first preference sync and live alerts for the campus alerting client.\n\n\
    Preferences are saved locally first and pushed to the server when a session is configured."
)]
pub struct Cli {
    /// Path to the config file
    #[arg(short = 'c', long = "config", global = true, value_name = "path")]
    pub config: Option<PathBuf>,

    /// Enable debug logging (RUST_LOG overrides)
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Inspect and change synced preferences
    #[command(subcommand)]
    Prefs(PrefsCommand),

    /// Manage custom theme variants
    #[command(subcommand)]
    Variant(VariantCommand),

    /// Connect to the alert channel and print each message as a JSON line
    #[command(after_help = "\
Examples:
  campanile listen                   Listen until Ctrl-C
  campanile -v listen                Listen with debug logging")]
    Listen,
}

#[derive(Subcommand, Debug)]
pub enum PrefsCommand {
    /// Show all preferences and the sync status
    Show {
        /// Output format
        #[arg(short = 'o', long = "output", value_enum, default_value_t = OutputFormat::Text)]
        output: OutputFormat,
    },

    /// Print one preference as JSON
    Get {
        /// Setting name
        key: String,
    },

    /// Set one preference
    #[command(after_help = "\
Examples:
  campanile prefs set dark_mode true          Enable dark mode
  campanile prefs set particle_intensity 75   Set particle intensity
  campanile prefs set theme ocean             Bare words are taken as strings")]
    Set {
        /// Setting name
        key: String,
        /// New value as JSON (bare words allowed for string settings)
        value: String,
    },

    /// Fetch the server copy and reconcile
    Pull,

    /// Push the local copy to the server
    Push,

    /// Restore defaults and forget sync history on this device
    Reset,

    /// Settle a sync conflict by keeping one side
    Resolve {
        /// Which copy to keep
        #[arg(short = 'k', long = "keep", value_enum)]
        keep: KeepSide,
    },
}

#[derive(Subcommand, Debug)]
pub enum VariantCommand {
    /// List theme variants
    List,

    /// Create a variant based on the active theme or another variant
    Create {
        /// Variant name
        #[arg(value_parser = non_empty_string)]
        name: String,
        /// Copy this variant instead of the active theme
        #[arg(short = 'f', long = "from", value_name = "variant")]
        from: Option<String>,
    },

    /// Copy a variant under a new name
    Duplicate {
        /// Existing variant
        source: String,
        /// New name
        #[arg(value_parser = non_empty_string)]
        target: String,
    },

    /// Delete a variant
    Delete {
        /// Variant name
        name: String,
    },

    /// Print a variant as portable JSON
    Export {
        /// Variant name
        name: String,
    },

    /// Add a variant from exported JSON
    #[command(after_help = "\
Examples:
  campanile variant import night.json      Import from a file
  campanile variant export night | campanile variant import -")]
    Import {
        /// File to read, or '-' for stdin
        file: String,
    },
}

#[cfg(test)]
#[path = "../cli_tests/mod.rs"]
mod tests;
