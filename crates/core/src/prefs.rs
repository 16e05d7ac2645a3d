// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Preference snapshot.
//!
//! A snapshot is a flat map of setting names to JSON values. Every known key
//! always carries a value (defaults fill the gaps on load). Keys the client
//! does not understand are carried along untouched so that data written by a
//! newer or older client survives a load/persist round trip.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

use crate::error::{Error, Result};

/// Names of the settings this client understands.
pub mod keys {
    /// Active theme identifier.
    pub const THEME: &str = "theme";
    /// Dark mode toggle.
    pub const DARK_MODE: &str = "dark_mode";
    /// Whether alert notifications are shown.
    pub const NOTIFICATIONS_ENABLED: &str = "notifications_enabled";
    /// Whether alert sounds are played.
    pub const SOUND_ENABLED: &str = "sound_enabled";
    /// Background particle toggle.
    pub const PARTICLES_ENABLED: &str = "particles_enabled";
    /// Particle intensity, 0..=100.
    pub const PARTICLE_INTENSITY: &str = "particle_intensity";
    /// Animation speed multiplier.
    pub const ANIMATION_SPEED: &str = "animation_speed";
    /// User-defined theme variants, keyed by name.
    pub const CUSTOM_THEMES: &str = "custom_themes";

    /// All known keys, in display order.
    pub const ALL: &[&str] = &[
        THEME,
        DARK_MODE,
        NOTIFICATIONS_ENABLED,
        SOUND_ENABLED,
        PARTICLES_ENABLED,
        PARTICLE_INTENSITY,
        ANIMATION_SPEED,
        CUSTOM_THEMES,
    ];
}

/// Returns the default value for a known key.
pub fn default_value(key: &str) -> Option<Value> {
    let value = match key {
        keys::THEME => Value::from("default"),
        keys::DARK_MODE => Value::Bool(false),
        keys::NOTIFICATIONS_ENABLED | keys::SOUND_ENABLED | keys::PARTICLES_ENABLED => {
            Value::Bool(true)
        }
        keys::PARTICLE_INTENSITY => Value::from(50),
        keys::ANIMATION_SPEED => Value::from(1.0),
        keys::CUSTOM_THEMES => Value::Object(Map::new()),
        _ => return None,
    };
    Some(value)
}

/// Returns true if the key is one this client understands.
pub fn is_known_key(key: &str) -> bool {
    keys::ALL.contains(&key)
}

/// The complete set of preference values at one point in time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Map<String, Value>", into = "Map<String, Value>")]
pub struct Snapshot {
    values: Map<String, Value>,
}

impl Snapshot {
    /// A snapshot holding only default values.
    pub fn defaults() -> Self {
        let values = keys::ALL
            .iter()
            .filter_map(|key| default_value(key).map(|v| (key.to_string(), v)))
            .collect();
        Snapshot { values }
    }

    /// Overlays `map` on top of the defaults.
    ///
    /// Unknown keys in `map` are kept as-is.
    pub fn from_map(map: Map<String, Value>) -> Self {
        let mut snapshot = Snapshot::defaults();
        snapshot.apply(map);
        snapshot
    }

    /// Parses a stored snapshot. The text must be a JSON object.
    pub fn from_json(text: &str) -> Result<Self> {
        match serde_json::from_str::<Value>(text)? {
            Value::Object(map) => Ok(Snapshot::from_map(map)),
            _ => Err(Error::NotAnObject),
        }
    }

    /// Serializes the full snapshot, unknown keys included.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.values)?)
    }

    /// Returns the value stored under `key`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Sets a single value.
    pub fn set(&mut self, key: impl Into<String>, value: Value) {
        self.values.insert(key.into(), value);
    }

    /// Sets every value in `patch`.
    pub fn apply(&mut self, patch: Map<String, Value>) {
        for (key, value) in patch {
            self.values.insert(key, value);
        }
    }

    /// Borrows the underlying map.
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.values
    }

    /// Consumes the snapshot, returning the underlying map.
    pub fn into_map(self) -> Map<String, Value> {
        self.values
    }

    /// Keys present in the snapshot that this client does not understand.
    pub fn unknown_keys(&self) -> impl Iterator<Item = &str> {
        self.values
            .keys()
            .map(String::as_str)
            .filter(|key| !is_known_key(key))
    }

    /// SHA-256 of the canonical JSON form, hex encoded.
    ///
    /// `serde_json::Map` keeps keys sorted, so equal snapshots always hash
    /// the same regardless of insertion order.
    pub fn digest(&self) -> String {
        let bytes = serde_json::to_vec(&self.values).unwrap_or_default();
        hex::encode(Sha256::digest(&bytes))
    }

    /// Active theme identifier.
    pub fn theme(&self) -> &str {
        self.values
            .get(keys::THEME)
            .and_then(Value::as_str)
            .unwrap_or("default")
    }
}

impl Default for Snapshot {
    fn default() -> Self {
        Snapshot::defaults()
    }
}

impl From<Map<String, Value>> for Snapshot {
    fn from(map: Map<String, Value>) -> Self {
        Snapshot::from_map(map)
    }
}

impl From<Snapshot> for Map<String, Value> {
    fn from(snapshot: Snapshot) -> Self {
        snapshot.values
    }
}

#[cfg(test)]
#[path = "prefs_tests.rs"]
mod tests;
