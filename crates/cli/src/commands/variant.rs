// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::fs;
use std::io::{Read, Write};

use crate::cli::VariantCommand;
use crate::error::Result;

use super::Context;

pub async fn run(ctx: &Context, cmd: VariantCommand) -> Result<()> {
    let cmd = match cmd {
        VariantCommand::Import { file } => VariantCommand::Import {
            file: read_input(&file)?,
        },
        other => other,
    };
    let stdout = std::io::stdout();
    run_impl(ctx, cmd, &mut stdout.lock()).await
}

/// Reads a file, or stdin for `-`.
fn read_input(file: &str) -> Result<String> {
    if file == "-" {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text)?;
        return Ok(text);
    }
    Ok(fs::read_to_string(file)?)
}

/// Internal implementation that accepts a writer for testing.
///
/// For `Import`, `file` already holds the exported text.
pub(crate) async fn run_impl(
    ctx: &Context,
    cmd: VariantCommand,
    out: &mut impl Write,
) -> Result<()> {
    ctx.start(true).await;
    let engine = &ctx.engine;

    match cmd {
        VariantCommand::List => {
            for name in engine.variant_names() {
                writeln!(out, "{name}")?;
            }
            return Ok(());
        }
        VariantCommand::Export { name } => {
            writeln!(out, "{}", engine.export_variant(&name)?)?;
            return Ok(());
        }
        VariantCommand::Create { name, from } => {
            engine.create_variant(&name, from.as_deref())?;
            writeln!(out, "created variant '{}'", name.trim())?;
        }
        VariantCommand::Duplicate { source, target } => {
            engine.duplicate_variant(&source, &target)?;
            writeln!(out, "copied '{source}' to '{}'", target.trim())?;
        }
        VariantCommand::Delete { name } => {
            engine.delete_variant(&name)?;
            writeln!(out, "deleted variant '{name}'")?;
        }
        VariantCommand::Import { file: text } => {
            let name = engine.import_variant(&text)?;
            writeln!(out, "imported variant '{name}'")?;
        }
    }

    ctx.finish(out).await?;
    Ok(())
}

#[cfg(test)]
#[path = "variant_tests.rs"]
mod tests;
