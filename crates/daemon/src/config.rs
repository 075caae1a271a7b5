// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon configuration, loaded once at startup from a TOML file and
//! passed down explicitly. There is no global configuration state.

use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unable to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("unable to parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

/// Bearer tokens per scope, mapping token to a principal name used for
/// identity stamps. The identity-provider integration stays external;
/// this is the seam it plugs into.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthConfig {
    #[serde(default)]
    pub agent_tokens: HashMap<String, String>,
    #[serde(default)]
    pub user_tokens: HashMap<String, String>,
    #[serde(default)]
    pub admin_tokens: HashMap<String, String>,
}

/// Timer interval overrides, in seconds.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TimerConfig {
    pub workers_secs: Option<u64>,
    pub tasks_secs: Option<u64>,
    pub proxy_secs: Option<u64>,
    pub daily_secs: Option<u64>,
    pub retention_secs: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DaemonConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub instance_name: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub latest_agent_version: Option<String>,
    #[serde(default)]
    pub log_file: Option<String>,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub timers: TimerConfig,
}

fn default_bind_addr() -> String {
    "127.0.0.1:8080".to_string()
}

fn default_base_url() -> String {
    "http://127.0.0.1:8080".to_string()
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            base_url: default_base_url(),
            instance_name: None,
            region: None,
            latest_agent_version: None,
            log_file: None,
            auth: AuthConfig::default(),
            timers: TimerConfig::default(),
        }
    }
}

impl DaemonConfig {
    /// Load from a TOML file. A missing path yields the defaults so a
    /// bare `fgd` comes up for local use.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        toml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn engine_config(&self) -> fg_engine::EngineConfig {
        fg_engine::EngineConfig {
            base_url: self.base_url.clone(),
            latest_agent_version: self.latest_agent_version.clone(),
            ..fg_engine::EngineConfig::default()
        }
    }

    pub fn driver_intervals(&self) -> fg_engine::drivers::DriverIntervals {
        use std::time::Duration;
        let defaults = fg_engine::drivers::DriverIntervals::default();
        fg_engine::drivers::DriverIntervals {
            workers: self.timers.workers_secs.map(Duration::from_secs).unwrap_or(defaults.workers),
            tasks: self.timers.tasks_secs.map(Duration::from_secs).unwrap_or(defaults.tasks),
            proxy: self.timers.proxy_secs.map(Duration::from_secs).unwrap_or(defaults.proxy),
            daily: self.timers.daily_secs.map(Duration::from_secs).unwrap_or(defaults.daily),
            retention: self
                .timers
                .retention_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.retention),
        }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
