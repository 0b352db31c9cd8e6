// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Engine configuration.
//!
//! Configuration is stored in `<state>/config.toml`. Every field is optional:
//! - `node_id`: distinguishes this device in generated action ids
//! - `[remote]`: WebSocket endpoint actions are delivered to
//! - `[sync]`: timeouts, backoff and retry policy
//! - `[network]`: TCP reachability probe

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Error, Result};
use crate::sync::{Backoff, ProbeConfig, SyncConfig};

const CONFIG_FILE_NAME: &str = "config.toml";
const STATE_DIR_ENV: &str = "OFFQ_STATE_DIR";
const STATE_DIR_NAME: &str = "offq";

/// Configuration stored in `<state>/config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default = "default_node_id")]
    pub node_id: u32,
    #[serde(default)]
    pub remote: RemoteConfig,
    #[serde(default)]
    pub sync: SyncSection,
    #[serde(default)]
    pub network: NetworkSection,
}

/// Remote delivery endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RemoteConfig {
    /// `ws://...` or `wss://...`.
    #[serde(default = "default_remote_url")]
    pub url: String,
}

/// Drain policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SyncSection {
    /// Upper bound for one submission (default: 10000).
    #[serde(default = "default_submit_timeout_ms")]
    pub submit_timeout_ms: u64,
    /// Delay before retrying after the first failure (default: 500).
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,
    /// Cap for the retry delay (default: 300).
    #[serde(default = "default_max_backoff_secs")]
    pub max_backoff_secs: u64,
    /// Failures after which automatic retries stop. 0 = unlimited (default).
    #[serde(default)]
    pub max_attempts: u32,
    /// Period of the background retry tick (default: 30).
    #[serde(default = "default_retry_interval_secs")]
    pub retry_interval_secs: u64,
}

/// Reachability probe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NetworkSection {
    /// `host:port` that must accept TCP connections (default: "localhost:7890").
    #[serde(default = "default_probe_addr")]
    pub probe_addr: String,
    #[serde(default = "default_probe_interval_ms")]
    pub probe_interval_ms: u64,
    #[serde(default = "default_probe_timeout_ms")]
    pub probe_timeout_ms: u64,
}

fn default_node_id() -> u32 {
    1
}

fn default_remote_url() -> String {
    "ws://localhost:7890".to_string()
}

fn default_submit_timeout_ms() -> u64 {
    10_000
}

fn default_initial_backoff_ms() -> u64 {
    500
}

fn default_max_backoff_secs() -> u64 {
    300
}

fn default_retry_interval_secs() -> u64 {
    30
}

fn default_probe_addr() -> String {
    "localhost:7890".to_string()
}

fn default_probe_interval_ms() -> u64 {
    5_000
}

fn default_probe_timeout_ms() -> u64 {
    2_000
}

impl Default for Config {
    fn default() -> Self {
        Config {
            node_id: default_node_id(),
            remote: RemoteConfig::default(),
            sync: SyncSection::default(),
            network: NetworkSection::default(),
        }
    }
}

impl Default for RemoteConfig {
    fn default() -> Self {
        RemoteConfig { url: default_remote_url() }
    }
}

impl Default for SyncSection {
    fn default() -> Self {
        SyncSection {
            submit_timeout_ms: default_submit_timeout_ms(),
            initial_backoff_ms: default_initial_backoff_ms(),
            max_backoff_secs: default_max_backoff_secs(),
            max_attempts: 0,
            retry_interval_secs: default_retry_interval_secs(),
        }
    }
}

impl Default for NetworkSection {
    fn default() -> Self {
        NetworkSection {
            probe_addr: default_probe_addr(),
            probe_interval_ms: default_probe_interval_ms(),
            probe_timeout_ms: default_probe_timeout_ms(),
        }
    }
}

impl Config {
    /// Loads configuration from `state_dir`, falling back to defaults when
    /// no config file exists.
    pub fn load(state_dir: &Path) -> Result<Self> {
        let config_path = state_dir.join(CONFIG_FILE_NAME);
        let content = match fs::read_to_string(&config_path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Config::default()),
            Err(e) => return Err(Error::Config(format!("failed to read config: {}", e))),
        };
        Self::parse(&content)
    }

    /// Parses and validates TOML content.
    pub fn parse(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)
            .map_err(|e| Error::Config(format!("failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.remote.url.starts_with("ws://") || self.remote.url.starts_with("wss://")) {
            return Err(Error::Config(format!(
                "invalid remote URL '{}': must be ws:// or wss://",
                self.remote.url
            )));
        }
        if self.network.probe_addr.trim().is_empty() {
            return Err(Error::Config("network.probe_addr cannot be empty".to_string()));
        }
        if self.sync.submit_timeout_ms == 0 {
            return Err(Error::Config("sync.submit_timeout_ms must be greater than 0".to_string()));
        }
        if self.sync.retry_interval_secs == 0 {
            return Err(Error::Config(
                "sync.retry_interval_secs must be greater than 0".to_string(),
            ));
        }
        if self.network.probe_interval_ms == 0 {
            return Err(Error::Config(
                "network.probe_interval_ms must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Renders the effective configuration.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("failed to serialize config: {}", e)))
    }

    pub fn sync_config(&self) -> SyncConfig {
        SyncConfig {
            submit_timeout: Duration::from_millis(self.sync.submit_timeout_ms),
            backoff: Backoff {
                initial: Duration::from_millis(self.sync.initial_backoff_ms),
                max: Duration::from_secs(self.sync.max_backoff_secs),
            },
            max_attempts: self.sync.max_attempts,
            retry_interval: Duration::from_secs(self.sync.retry_interval_secs),
        }
    }

    pub fn probe_config(&self) -> ProbeConfig {
        ProbeConfig {
            addr: self.network.probe_addr.clone(),
            interval: Duration::from_millis(self.network.probe_interval_ms),
            timeout: Duration::from_millis(self.network.probe_timeout_ms),
        }
    }
}

/// Resolves the state directory: explicit flag, then `$OFFQ_STATE_DIR`,
/// then the platform's local data directory.
pub fn resolve_state_dir(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(dir) = explicit {
        return Ok(dir.to_path_buf());
    }
    if let Some(dir) = std::env::var_os(STATE_DIR_ENV).filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(dir));
    }
    dirs::data_local_dir()
        .map(|dir| dir.join(STATE_DIR_NAME))
        .ok_or_else(|| {
            Error::Config(format!(
                "cannot determine a state directory\n  hint: pass --state-dir or set {}",
                STATE_DIR_ENV
            ))
        })
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
