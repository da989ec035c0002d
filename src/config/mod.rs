use crate::global;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

pub mod env {
    pub const BASE_URL: &str = "FLEXMEET_BASE_URL";
    pub const CALLS_API_URL: &str = "FLEXMEET_CALLS_API_URL";
    pub const CALLS_TOKEN: &str = "FLEXMEET_CALLS_TOKEN";
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub service: ServiceConfig,
    pub calls: CallsConfig,
    pub join: JoinConfig,
    pub identity: IdentityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Public base URL that shareable meeting links are built from.
    pub base_url: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CallsConfig {
    /// Calling service REST endpoint. Empty selects the in-process client.
    pub api_url: String,
    pub api_key: Option<String>,
    pub token: Option<String>,
    pub call_type: String,
    pub request_timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct JoinConfig {
    /// Upper bound on the Resolving phase (0 = wait forever)
    pub resolve_timeout_seconds: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentityConfig {
    pub user_id: Option<String>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".to_string(),
            port: 3939,
        }
    }
}

impl Default for CallsConfig {
    fn default() -> Self {
        Self {
            api_url: String::new(),
            api_key: None,
            token: None,
            call_type: "default".to_string(),
            request_timeout_seconds: 15,
        }
    }
}

impl Default for JoinConfig {
    fn default() -> Self {
        Self {
            resolve_timeout_seconds: 30,
        }
    }
}

impl JoinConfig {
    pub fn resolve_timeout(&self) -> Option<Duration> {
        match self.resolve_timeout_seconds {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(&Self::config_path()?)?;
        config.apply_env_overrides();
        Ok(config)
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            info!(
                "Config file not found, creating default at {:?}",
                config_path
            );
            let config = Self::default();
            config.save_to(config_path)?;
            return Ok(config);
        }

        let content =
            std::fs::read_to_string(config_path).context("Failed to read config file")?;

        let config: Self = toml::from_str(&content).context("Failed to parse config file")?;

        info!("Loaded config from {:?}", config_path);
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;

        std::fs::write(config_path, content).context("Failed to write config file")?;

        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(base_url) = std::env::var(env::BASE_URL) {
            self.service.base_url = base_url;
        }
        if let Ok(api_url) = std::env::var(env::CALLS_API_URL) {
            self.calls.api_url = api_url;
        }
        if let Ok(token) = std::env::var(env::CALLS_TOKEN) {
            self.calls.token = Some(token);
        }
    }

    fn config_path() -> Result<PathBuf> {
        global::config_file()
    }
}
