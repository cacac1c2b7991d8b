//! Application configuration management.
//!
//! This module handles loading and saving the client configuration: the
//! backend endpoint, the request timeout and an optional data directory.
//!
//! Configuration is stored at `~/.config/tributes/config.json`. The
//! `TRIBUTES_ENDPOINT` environment variable overrides the stored endpoint.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::api::client::DEFAULT_TIMEOUT_SECS;

/// Application name used for config/data directory paths
const APP_NAME: &str = "tributes";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Environment variable overriding the stored endpoint
pub const ENDPOINT_ENV: &str = "TRIBUTES_ENDPOINT";

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Config {
    /// Backend script URL
    pub endpoint: Option<String>,
    pub request_timeout_secs: Option<u64>,
    /// Overrides the platform data directory
    pub data_dir: Option<PathBuf>,
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config: {}", path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse config: {}", path.display()))
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Directory holding the tribute cache and the owner token
    pub fn data_dir(&self) -> Result<PathBuf> {
        if let Some(ref dir) = self.data_dir {
            return Ok(dir.clone());
        }
        let data_dir = dirs::data_local_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find data directory"))?;
        Ok(data_dir.join(APP_NAME))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS))
    }

    /// Endpoint to use: explicit override, then `TRIBUTES_ENDPOINT`, then the file.
    pub fn resolve_endpoint(&self, override_endpoint: Option<&str>) -> Result<String> {
        let from_env = std::env::var(ENDPOINT_ENV).ok();
        self.resolve_endpoint_with(override_endpoint, from_env.as_deref())
    }

    fn resolve_endpoint_with(
        &self,
        override_endpoint: Option<&str>,
        from_env: Option<&str>,
    ) -> Result<String> {
        [override_endpoint, from_env, self.endpoint.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|s| !s.is_empty())
            .map(str::to_string)
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "No backend endpoint configured. Run `tributes config set-endpoint <URL>` or set {}",
                    ENDPOINT_ENV
                )
            })
    }
}
