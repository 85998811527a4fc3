//! Application configuration management.
//!
//! This module handles loading and saving the application configuration,
//! which includes the dataset server URL, the origin used for share links,
//! the year cache namespace and the export directory.
//!
//! Configuration is stored at `~/.config/nvitals/config.json`.
//! `NVITALS_API_URL` and `NVITALS_ORIGIN` override the file values.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::store::year_cache::{DEFAULT_NAMESPACE, DEFAULT_VERSION};

/// Application name used for config/cache directory paths
const APP_NAME: &str = "nvitals";

/// Config file name
const CONFIG_FILE: &str = "config.json";

const DEFAULT_API_URL: &str = "http://localhost:3000";

/// Year shown in the report header when none is configured
const DEFAULT_SELECTED_YEAR: &str = "2023";

pub const API_URL_ENV: &str = "NVITALS_API_URL";
pub const ORIGIN_ENV: &str = "NVITALS_ORIGIN";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_base_url: String,
    pub share_origin: String,
    pub cache_namespace: String,
    pub cache_version: u32,
    pub selected_year: String,
    pub export_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_URL.to_string(),
            share_origin: DEFAULT_API_URL.to_string(),
            cache_namespace: DEFAULT_NAMESPACE.to_string(),
            cache_version: DEFAULT_VERSION,
            selected_year: DEFAULT_SELECTED_YEAR.to_string(),
            export_dir: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            serde_json::from_str(&contents).context("Failed to parse config file")?
        } else {
            Self::default()
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Apply environment overrides through `lookup`.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup(API_URL_ENV).filter(|v| !v.trim().is_empty()) {
            self.api_base_url = url;
        }
        if let Some(origin) = lookup(ORIGIN_ENV).filter(|v| !v.trim().is_empty()) {
            self.share_origin = origin;
        }
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    pub fn cache_dir(&self) -> Result<PathBuf> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }

    /// Where CSV exports are written: the configured directory, else Downloads,
    /// else the working directory.
    pub fn export_dir(&self) -> PathBuf {
        self.export_dir
            .clone()
            .or_else(dirs::download_dir)
            .unwrap_or_else(|| PathBuf::from("."))
    }
}
