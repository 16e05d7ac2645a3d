// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! User-defined theme variants.
//!
//! Variants live in the snapshot under [`keys::CUSTOM_THEMES`] as a map of
//! name to an opaque JSON object. [`Variants`] edits a copy of that map; the
//! caller writes the result back through the normal update path.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Error, Result};
use crate::prefs::{keys, Snapshot};

/// Current export format version.
pub const EXPORT_FORMAT: u32 = 1;

/// Portable form of a single variant, as produced by export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportedVariant {
    /// Export format version.
    #[serde(default = "default_format")]
    pub format: u32,
    /// Name the variant was exported under.
    pub name: String,
    /// The variant body.
    pub variant: Value,
}

fn default_format() -> u32 {
    EXPORT_FORMAT
}

/// Editable copy of the variant map.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Variants {
    entries: Map<String, Value>,
}

impl Variants {
    /// Copies the variant map out of a snapshot.
    ///
    /// A malformed `custom_themes` value is treated as empty.
    pub fn from_snapshot(snapshot: &Snapshot) -> Self {
        let entries = snapshot
            .get(keys::CUSTOM_THEMES)
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default();
        Variants { entries }
    }

    /// Variant names in sorted order.
    pub fn names(&self) -> Vec<&str> {
        self.entries.keys().map(String::as_str).collect()
    }

    /// Returns the body of a variant.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries.get(name)
    }

    /// Returns true if a variant with this name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Adds a new variant.
    pub fn create(&mut self, name: &str, body: Value) -> Result<()> {
        let name = validate_name(name)?;
        if !body.is_object() {
            return Err(Error::InvalidVariant(format!(
                "body of '{name}' must be a JSON object"
            )));
        }
        if self.entries.contains_key(name) {
            return Err(Error::VariantExists(name.to_string()));
        }
        self.entries.insert(name.to_string(), body);
        Ok(())
    }

    /// Copies `source` to a new variant named `target`.
    pub fn duplicate(&mut self, source: &str, target: &str) -> Result<()> {
        let body = self
            .entries
            .get(source)
            .cloned()
            .ok_or_else(|| Error::VariantNotFound(source.to_string()))?;
        self.create(target, body)
    }

    /// Removes a variant, returning its body.
    pub fn delete(&mut self, name: &str) -> Result<Value> {
        self.entries
            .remove(name)
            .ok_or_else(|| Error::VariantNotFound(name.to_string()))
    }

    /// Serializes a variant as standalone JSON text.
    pub fn export(&self, name: &str) -> Result<String> {
        let variant = self
            .entries
            .get(name)
            .cloned()
            .ok_or_else(|| Error::VariantNotFound(name.to_string()))?;
        let exported = ExportedVariant {
            format: EXPORT_FORMAT,
            name: name.to_string(),
            variant,
        };
        Ok(serde_json::to_string_pretty(&exported)?)
    }

    /// Adds a variant from exported JSON text.
    ///
    /// If the exported name is taken, a numeric suffix is appended
    /// (`"ocean (2)"`, `"ocean (3)"`, ...). Returns the name used.
    pub fn import(&mut self, text: &str) -> Result<String> {
        let exported: ExportedVariant = serde_json::from_str(text)
            .map_err(|e| Error::InvalidVariant(format!("not an exported variant: {e}")))?;
        if exported.format > EXPORT_FORMAT {
            return Err(Error::InvalidVariant(format!(
                "export format {} is newer than supported format {EXPORT_FORMAT}",
                exported.format
            )));
        }
        let base = validate_name(&exported.name)?;
        let name = self.unique_name(base);
        self.create(&name, exported.variant)?;
        Ok(name)
    }

    /// The map as a JSON value, ready to store under `custom_themes`.
    pub fn into_value(self) -> Value {
        Value::Object(self.entries)
    }

    fn unique_name(&self, base: &str) -> String {
        if !self.entries.contains_key(base) {
            return base.to_string();
        }
        (2..)
            .map(|n| format!("{base} ({n})"))
            .find(|candidate| !self.entries.contains_key(candidate))
            .unwrap_or_else(|| base.to_string())
    }
}

fn validate_name(name: &str) -> Result<&str> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(Error::InvalidVariant("name cannot be empty".to_string()));
    }
    Ok(trimmed)
}

#[cfg(test)]
#[path = "variant_tests.rs"]
mod tests;
