// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Client configuration.
//!
//! Configuration is stored in TOML at `$CAMPANILE_CONFIG`, or
//! `<config_dir>/campanile/config.toml`, and includes:
//! - `[server]`: HTTP and WebSocket endpoints
//! - `[sync]`: debounce window, conflict policy and state directory
//! - `[channel]`: reconnect backoff
//! - `[session]`: optional identity and credential
//!
//! A missing file is not an error; every field has a default.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::channel::{ChannelConfig, DEFAULT_MAX_RECONNECT_ATTEMPTS};
use crate::env;
use crate::error::{Error, Result};
use crate::session::Session;
use crate::sync::{EngineOptions, PolicyKind};

const APP_DIR_NAME: &str = "campanile";
const CONFIG_FILE_NAME: &str = "config.toml";

/// Top-level configuration file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub sync: SyncConfig,
    pub channel: ChannelSettings,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session: Option<SessionConfig>,
}

/// Endpoints of the alerting service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Base URL of the HTTP API (default: `http://localhost:8000/api`).
    pub api_base: String,
    /// Base URL of the WebSocket endpoint (default: `ws://localhost:8000`).
    pub ws_base: String,
    /// Optional timeout for HTTP requests, in seconds. Unset means none.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<u64>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            api_base: "http://localhost:8000/api".to_string(),
            ws_base: "ws://localhost:8000".to_string(),
            request_timeout_secs: None,
        }
    }
}

/// Preference sync settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Quiet period before a push, in milliseconds (default: 1000).
    pub debounce_ms: u64,
    /// How a fetched remote snapshot is reconciled (default: remote-wins).
    pub conflict_policy: PolicyKind,
    /// Where the durable slot lives. Overridden by `CAMPANILE_STATE_DIR`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state_dir: Option<PathBuf>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        SyncConfig {
            debounce_ms: 1000,
            conflict_policy: PolicyKind::default(),
            state_dir: None,
        }
    }
}

/// Event channel reconnect settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelSettings {
    /// Delay before the first reconnect, in milliseconds (default: 1000).
    pub base_delay_ms: u64,
    /// Reconnect attempts before giving up (default: 5).
    pub max_reconnect_attempts: u32,
}

impl Default for ChannelSettings {
    fn default() -> Self {
        ChannelSettings {
            base_delay_ms: 1000,
            max_reconnect_attempts: DEFAULT_MAX_RECONNECT_ATTEMPTS,
        }
    }
}

/// Identity used when no external session source is wired in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub user_id: Option<String>,
    pub token: Option<String>,
}

impl Config {
    /// Loads configuration from `path`, or defaults if it does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no config file; using defaults");
                return Ok(Config::default());
            }
            Err(e) => {
                return Err(Error::Config(format!(
                    "failed to read {}: {}",
                    path.display(),
                    e
                )))
            }
        };
        let config = Self::parse(&content)?;
        tracing::debug!(path = %path.display(), "config loaded");
        Ok(config)
    }

    /// Loads from `explicit`, else `$CAMPANILE_CONFIG`, else the user config dir.
    pub fn discover(explicit: Option<&Path>) -> Result<Self> {
        match explicit.map(Path::to_path_buf).or_else(default_config_path) {
            Some(path) => Self::load(&path),
            None => Ok(Config::default()),
        }
    }

    /// Parses and validates TOML text.
    pub fn parse(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)
            .map_err(|e| Error::Config(format!("failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Serializes to TOML.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("failed to serialize config: {}", e)))
    }

    fn validate(&self) -> Result<()> {
        let scheme_ok = |url: &str, schemes: &[&str]| {
            schemes
                .iter()
                .any(|scheme| url.starts_with(&format!("{scheme}://")))
        };
        if !scheme_ok(&self.server.api_base, &["http", "https"]) {
            return Err(Error::Config(format!(
                "server.api_base must be an http(s) URL, got '{}'",
                self.server.api_base
            )));
        }
        if !scheme_ok(&self.server.ws_base, &["ws", "wss"]) {
            return Err(Error::Config(format!(
                "server.ws_base must be a ws(s) URL, got '{}'",
                self.server.ws_base
            )));
        }
        if self.channel.base_delay_ms == 0 {
            return Err(Error::Config(
                "channel.base_delay_ms must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Directory holding the durable slot.
    ///
    /// `CAMPANILE_STATE_DIR` wins over `sync.state_dir`, which wins over the
    /// platform state directory.
    pub fn state_dir(&self) -> Result<PathBuf> {
        self.state_dir_with(env::state_dir())
    }

    fn state_dir_with(&self, env_override: Option<PathBuf>) -> Result<PathBuf> {
        env_override
            .or_else(|| self.sync.state_dir.clone())
            .or_else(|| {
                dirs::state_dir()
                    .or_else(dirs::data_local_dir)
                    .map(|dir| dir.join(APP_DIR_NAME))
            })
            .ok_or(Error::NoStateDir)
    }

    /// The configured session, with environment variables taking precedence.
    pub fn session(&self) -> Option<Session> {
        self.session_with(env::user_id(), env::token())
    }

    fn session_with(&self, user_id: Option<String>, token: Option<String>) -> Option<Session> {
        let configured = self.session.clone().unwrap_or_default();
        let user_id = user_id.or(configured.user_id)?;
        let token = token.or(configured.token)?;
        Some(Session::new(user_id, token))
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.server.request_timeout_secs.map(Duration::from_secs)
    }

    pub fn engine_options(&self) -> EngineOptions {
        EngineOptions {
            debounce: Duration::from_millis(self.sync.debounce_ms),
            policy: self.sync.conflict_policy.build(),
        }
    }

    pub fn channel_config(&self) -> ChannelConfig {
        ChannelConfig {
            ws_base: self.server.ws_base.clone(),
            base_delay: Duration::from_millis(self.channel.base_delay_ms),
            max_attempts: self.channel.max_reconnect_attempts,
        }
    }
}

/// `$CAMPANILE_CONFIG`, else `<config_dir>/campanile/config.toml`.
pub fn default_config_path() -> Option<PathBuf> {
    env::config_path().or_else(|| {
        dirs::config_dir().map(|dir| dir.join(APP_DIR_NAME).join(CONFIG_FILE_NAME))
    })
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
