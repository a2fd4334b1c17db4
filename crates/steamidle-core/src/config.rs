//! Application configuration management.
//!
//! This module handles loading and saving the application configuration,
//! which holds the gateway address, the sentry file location, the last used
//! account name, and optional overrides for session timing.
//!
//! Configuration is stored at `~/.config/steamidle/config.json`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::auth::DEFAULT_SENTRY_FILE;
use crate::idle::SessionPolicy;

/// Application name used for config/log directory paths
pub const APP_NAME: &str = "steamidle";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Gateway used when neither config nor environment names one.
pub const DEFAULT_GATEWAY_URL: &str = "http://127.0.0.1:27080";

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    pub last_username: Option<String>,
    pub gateway_url: Option<String>,
    pub sentry_path: Option<PathBuf>,
    pub heartbeat_interval_secs: Option<u64>,
    pub tick_interval_ms: Option<u64>,
    pub pump_timeout_ms: Option<u64>,
    pub max_guard_attempts: Option<u32>,
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse config file {}", path.display()))
        } else {
            Ok(Self::default())
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)
            .with_context(|| format!("Failed to write config file {}", path.display()))?;
        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    pub fn gateway_url(&self) -> &str {
        self.gateway_url.as_deref().unwrap_or(DEFAULT_GATEWAY_URL)
    }

    pub fn sentry_path(&self) -> PathBuf {
        self.sentry_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SENTRY_FILE))
    }

    /// Session timing from the defaults plus whatever this config overrides.
    pub fn policy(&self) -> SessionPolicy {
        let defaults = SessionPolicy::default();
        SessionPolicy {
            heartbeat_interval: self
                .heartbeat_interval_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.heartbeat_interval),
            render_interval: defaults.render_interval,
            tick_interval: self
                .tick_interval_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.tick_interval),
            pump_timeout: self
                .pump_timeout_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.pump_timeout),
            max_guard_attempts: self.max_guard_attempts,
        }
        .validated()
    }
}
