use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

use crate::error::{ChurnError, Result};

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000";
pub const DEFAULT_HEALTH_PATH: &str = "/health";

/// Configuration for churnctl, read from `~/.churnctl/config.toml`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChurnConfig {
    #[serde(default)]
    pub endpoint: EndpointConfig,
}

/// Where the prediction service lives and how to talk to it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointConfig {
    pub base_url: String,
    pub predict_path: String,
    pub health_path: String,
    /// Request timeout; unset waits indefinitely
    pub timeout_secs: Option<u64>,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            predict_path: crate::controller::PREDICT_PATH.to_string(),
            health_path: DEFAULT_HEALTH_PATH.to_string(),
            timeout_secs: None,
        }
    }
}

impl EndpointConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

impl ChurnConfig {
    /// Load from the default location. A missing file yields defaults.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Load from an explicit path. A missing file yields defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(?path, "no config file, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|err| ChurnError::config(path, err.to_string()))
    }

    /// Write the config as TOML, creating parent directories
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|err| ChurnError::config(path, err.to_string()))?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Get config file path: ~/.churnctl/config.toml
    pub fn config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".churnctl/config.toml")
    }

    /// Apply a base URL override (flag or environment) when given
    pub fn with_base_url(mut self, base_url: Option<String>) -> Self {
        if let Some(base_url) = base_url {
            self.endpoint.base_url = base_url;
        }
        self
    }
}
