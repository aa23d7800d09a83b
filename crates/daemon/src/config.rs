// SPDX-License-Identifier: MIT

//! Daemon configuration, read at start-up and passed into the core.
//!
//! Loaded from `<home>/.fman/config.toml`. Unknown keys are ignored
//! (no `deny_unknown_fields`); missing keys fall back to defaults.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

const DEFAULT_MAX_WORKERS: usize = 2;
const DEFAULT_QUEUE_SIZE: usize = 100;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not determine home directory")]
    NoHomeDir,
    #[error("failed to read {path}: {source}")]
    Read { path: PathBuf, source: std::io::Error },
    #[error("failed to parse {path}: {source}")]
    Parse { path: PathBuf, source: toml::de::Error },
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct RawConfig {
    socket_path: Option<PathBuf>,
    pid_path: Option<PathBuf>,
    max_workers: usize,
    queue_size: usize,
    log_level: String,
}

impl Default for RawConfig {
    fn default() -> Self {
        Self {
            socket_path: None,
            pid_path: None,
            max_workers: DEFAULT_MAX_WORKERS,
            queue_size: DEFAULT_QUEUE_SIZE,
            log_level: "info".to_string(),
        }
    }
}

/// Resolved daemon configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub socket_path: PathBuf,
    pub pid_path: PathBuf,
    pub max_workers: usize,
    pub queue_size: usize,
    pub log_level: String,
}

impl Config {
    /// Load configuration for the current user, applying defaults for
    /// anything the config file omits or doesn't have.
    pub fn load() -> Result<Self, ConfigError> {
        let home = dirs::home_dir().ok_or(ConfigError::NoHomeDir)?;
        Self::load_from_home(&home)
    }

    /// Load configuration rooted at an explicit home directory (used by
    /// tests, and by anything that must not depend on `$HOME`).
    pub fn load_from_home(home: &Path) -> Result<Self, ConfigError> {
        let fman_dir = home.join(".fman");
        let config_path = fman_dir.join("config.toml");

        let raw = if config_path.exists() {
            let contents =
                std::fs::read_to_string(&config_path).map_err(|source| ConfigError::Read {
                    path: config_path.clone(),
                    source,
                })?;
            toml::from_str(&contents).map_err(|source| ConfigError::Parse {
                path: config_path.clone(),
                source,
            })?
        } else {
            RawConfig::default()
        };

        Ok(Self {
            socket_path: resolve(&fman_dir, raw.socket_path, "daemon.sock"),
            pid_path: resolve(&fman_dir, raw.pid_path, "daemon.pid"),
            max_workers: raw.max_workers,
            queue_size: raw.queue_size,
            log_level: raw.log_level,
        })
    }
}

fn resolve(fman_dir: &Path, configured: Option<PathBuf>, default_name: &str) -> PathBuf {
    match configured {
        Some(p) if p.is_absolute() => p,
        Some(p) => fman_dir.join(p),
        None => fman_dir.join(default_name),
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
