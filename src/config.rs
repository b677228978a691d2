//! Application configuration.
//!
//! Configuration is stored in `config.yaml` under the platform config
//! directory (e.g. `~/.config/rooftops/`) and includes:
//! - Account service base URL and bearer token
//! - Request timeout and page size for list fetches
//!
//! `ROOFTOPS_API_URL` and `ROOFTOPS_API_TOKEN` override the stored values,
//! so CI and shared machines never need a config file on disk.

use std::env;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use crate::error::{Result, RooftopError};

pub const API_URL_ENV: &str = "ROOFTOPS_API_URL";
pub const API_TOKEN_ENV: &str = "ROOFTOPS_API_TOKEN";

const DEFAULT_BASE_URL: &str = "https://uat-api.spyne.xyz/console/v1";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Account service base URL
    #[serde(default = "default_base_url")]
    pub api_url: String,

    /// Bearer token for the account service. Prefer the env var on shared
    /// machines; the config file stores it in the clear.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_token: Option<String>,

    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_request_timeout")]
    pub request_timeout: u64,

    /// Accounts fetched per page (default: 50)
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_request_timeout() -> u64 {
    30
}

fn default_page_size() -> u32 {
    50
}

impl Default for Config {
    fn default() -> Self {
        Config {
            api_url: default_base_url(),
            api_token: None,
            request_timeout: default_request_timeout(),
            page_size: default_page_size(),
        }
    }
}

impl Config {
    /// Get the path to the config file
    pub fn config_path() -> Result<PathBuf> {
        let dirs = directories::ProjectDirs::from("", "", "rooftops")
            .ok_or_else(|| RooftopError::Config("no home directory available".to_string()))?;
        Ok(dirs.config_dir().join("config.yaml"))
    }

    /// Load configuration from file (default if absent), then apply env
    /// overrides.
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        let mut config = if path.exists() {
            let content = fs::read_to_string(&path)?;
            serde_yaml_ng::from_str(&content)?
        } else {
            Config::default()
        };

        if let Ok(url) = env::var(API_URL_ENV) {
            if !url.is_empty() {
                config.api_url = url;
            }
        }
        if let Ok(token) = env::var(API_TOKEN_ENV) {
            if !token.is_empty() {
                config.api_token = Some(token);
            }
        }

        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_yaml_ng::to_string(self)?;
        fs::write(&path, content)?;
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }

    /// The bearer token, wrapped so it never lands in logs by accident.
    pub fn token(&self) -> Option<SecretString> {
        self.api_token.as_deref().map(SecretString::from)
    }

    /// Set a config value by dotted key, for `rooftops config set`.
    pub fn set_value(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "api_url" => self.api_url = value.to_string(),
            "api_token" => self.api_token = Some(value.to_string()),
            "request_timeout" => {
                self.request_timeout = value.parse().map_err(|_| {
                    RooftopError::Config(format!("'{}' is not a number of seconds", value))
                })?;
            }
            "page_size" => {
                self.page_size = value.parse().map_err(|_| {
                    RooftopError::Config(format!("'{}' is not a page size", value))
                })?;
            }
            _ => {
                return Err(RooftopError::Config(format!("unknown config key '{}'", key)));
            }
        }
        Ok(())
    }

    /// Get a config value by key, for `rooftops config get`. Tokens are
    /// redacted.
    pub fn get_value(&self, key: &str) -> Result<String> {
        match key {
            "api_url" => Ok(self.api_url.clone()),
            "api_token" => Ok(self
                .api_token
                .as_ref()
                .map(|_| "[REDACTED]".to_string())
                .unwrap_or_else(|| "(unset)".to_string())),
            "request_timeout" => Ok(self.request_timeout.to_string()),
            "page_size" => Ok(self.page_size.to_string()),
            _ => Err(RooftopError::Config(format!("unknown config key '{}'", key))),
        }
    }
}
