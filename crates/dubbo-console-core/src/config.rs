//! Console configuration management.
//!
//! This module handles loading and saving the console configuration: which
//! registry to talk to, the backend environment, the login route and where
//! credentials are kept.
//!
//! Configuration is stored at `~/.config/dubbo-console/config.json`.
//! `DUBBO_CONSOLE_*` environment variables override the file.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::gatekeeper::DEFAULT_LOGIN_PATH;

/// Application name used for config/data directory paths
const APP_NAME: &str = "dubbo-console";

/// Config file name
const CONFIG_FILE: &str = "config.json";

const DEFAULT_BASE_URL: &str = "http://localhost:38080";

const DEFAULT_ENV: &str = "dev";

/// HTTP request timeout in seconds.
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

pub const ENV_BASE_URL: &str = "DUBBO_CONSOLE_BASE_URL";
pub const ENV_ENVIRONMENT: &str = "DUBBO_CONSOLE_ENV";
pub const ENV_STORAGE: &str = "DUBBO_CONSOLE_STORAGE";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    File,
    Keyring,
}

impl FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "file" => Ok(StorageBackend::File),
            "keyring" | "keychain" => Ok(StorageBackend::Keyring),
            other => Err(anyhow::anyhow!("Unknown storage backend '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub base_url: String,
    pub env: String,
    pub login_path: String,
    pub storage: StorageBackend,
    pub request_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            env: DEFAULT_ENV.to_string(),
            login_path: DEFAULT_LOGIN_PATH.to_string(),
            storage: StorageBackend::default(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

impl Config {
    /// Load from the default location, then apply environment overrides
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(&Self::config_path()?)?;
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Load from `path`; a missing file yields the defaults
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
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

    /// Override fields from environment variables looked up through `var`
    pub fn apply_env<F>(&mut self, var: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(base_url) = var(ENV_BASE_URL).filter(|v| !v.is_empty()) {
            self.base_url = base_url;
        }
        if let Some(env) = var(ENV_ENVIRONMENT).filter(|v| !v.is_empty()) {
            self.env = env;
        }
        if let Some(storage) = var(ENV_STORAGE).filter(|v| !v.is_empty()) {
            self.storage = storage
                .parse()
                .with_context(|| format!("Invalid {}", ENV_STORAGE))?;
        }
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Directory for file-backed storage and logs
    pub fn data_dir(&self) -> Result<PathBuf> {
        let data_dir = dirs::data_local_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find data directory"))?;
        Ok(data_dir.join(APP_NAME))
    }

    /// Prefix every API path gets: `{base_url}/api/{env}`
    pub fn api_root(&self) -> String {
        format!("{}/api/{}", self.base_url.trim_end_matches('/'), self.env)
    }
}
