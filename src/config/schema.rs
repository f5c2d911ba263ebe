//! Configuration schema for Boreas
//!
//! Configuration is stored at `~/.config/boreas/config.toml`

use crate::environment::CacheEnvironment;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Cache storage settings
    pub cache: CacheSettings,
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log format: "text" or "json"
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_format: "text".to_string(),
        }
    }
}

/// Cache storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    /// Base directory for cache storage; defaults to the user cache dir
    pub base_dir: Option<PathBuf>,

    /// Lifetime in seconds applied to entries stored without one
    pub default_lifetime_secs: i64,

    /// Override for the platform maximum path length
    pub maximum_path_length: Option<usize>,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            base_dir: None,
            default_lifetime_secs: 3600,
            maximum_path_length: None,
        }
    }
}

impl CacheSettings {
    /// Resolve the configured base directory, falling back to the user
    /// cache dir
    pub fn base_directory(&self) -> PathBuf {
        self.base_dir.clone().unwrap_or_else(|| {
            dirs::cache_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("boreas")
        })
    }

    /// Build the environment cache backends bind against
    pub fn environment(&self) -> CacheEnvironment {
        let environment = CacheEnvironment::new(self.base_directory());
        match self.maximum_path_length {
            Some(maximum) => environment.with_maximum_path_length(maximum),
            None => environment,
        }
    }
}
