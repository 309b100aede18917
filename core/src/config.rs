use crate::errors::{ChatError, ChatResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Configuration for the chat client
///
/// Every field is optional so that layers (file, environment, flags) can be
/// merged on top of each other. `api_key: None` means "not configured", while
/// `Some("")` is a deliberate empty key for hosts that inject credentials.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ChatConfig {
    pub api_key: Option<String>,
    pub model_name: Option<String>,
    pub base_url: Option<String>,
    pub timeout_secs: Option<u64>,
    pub system_prompt: Option<String>,
    pub temperature: Option<f32>,
    pub log_level: Option<String>,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model_name: Some(DEFAULT_MODEL.to_string()),
            base_url: Some(DEFAULT_BASE_URL.to_string()),
            timeout_secs: Some(DEFAULT_TIMEOUT_SECS),
            system_prompt: None,
            temperature: None,
            log_level: Some("info".to_string()),
        }
    }
}

impl ChatConfig {
    /// An all-`None` config, used as an override layer.
    pub fn empty() -> Self {
        Self {
            api_key: None,
            model_name: None,
            base_url: None,
            timeout_secs: None,
            system_prompt: None,
            temperature: None,
            log_level: None,
        }
    }

    /// Loads configuration from a file if it exists, otherwise returns the default config
    pub fn load_from_file(path: &Path) -> ChatResult<Self> {
        if path.exists() {
            let content = fs::read_to_string(path).map_err(|e| {
                ChatError::ConfigError(format!("Failed to read config file: {}", e))
            })?;

            let config: Self = toml::from_str(&content).map_err(|e| {
                ChatError::ConfigError(format!("Failed to parse config file: {}", e))
            })?;

            debug!("Loaded config from {}", path.display());
            Ok(Self::default().merge(&config))
        } else {
            Ok(Self::default())
        }
    }

    /// Saves configuration to a file
    pub fn save_to_file(&self, path: &Path) -> ChatResult<()> {
        let content = toml::to_string(self)
            .map_err(|e| ChatError::ConfigError(format!("Failed to serialize config: {}", e)))?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                ChatError::ConfigError(format!("Failed to create config directory: {}", e))
            })?;
        }

        fs::write(path, content)
            .map_err(|e| ChatError::ConfigError(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    /// Merges this config with another config, preferring values from the other config if present
    pub fn merge(&self, other: &Self) -> Self {
        Self {
            api_key: other.api_key.clone().or_else(|| self.api_key.clone()),
            model_name: other.model_name.clone().or_else(|| self.model_name.clone()),
            base_url: other.base_url.clone().or_else(|| self.base_url.clone()),
            timeout_secs: other.timeout_secs.or(self.timeout_secs),
            system_prompt: other
                .system_prompt
                .clone()
                .or_else(|| self.system_prompt.clone()),
            temperature: other.temperature.or(self.temperature),
            log_level: other.log_level.clone().or_else(|| self.log_level.clone()),
        }
    }

    /// Reads overrides from the process environment, loading `.env` first.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self {
            api_key: std::env::var(API_KEY_ENV).ok(),
            ..Self::empty()
        }
    }

    /// Layers defaults, the config file, the environment and `overrides`, in that order.
    pub fn load(path: Option<&Path>, overrides: &Self) -> ChatResult<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => get_default_config_file("gemini-chat")?,
        };
        let file_config = Self::load_from_file(&path)?;
        Ok(file_config.merge(&Self::from_env()).merge(overrides))
    }

    pub fn model_name(&self) -> &str {
        self.model_name.as_deref().unwrap_or(DEFAULT_MODEL)
    }

    pub fn base_url(&self) -> &str {
        self.base_url
            .as_deref()
            .unwrap_or(DEFAULT_BASE_URL)
            .trim_end_matches('/')
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS))
    }

    pub fn log_level(&self) -> &str {
        self.log_level.as_deref().unwrap_or("info")
    }
}

/// Helper function to get default config directory
pub fn get_default_config_dir(app_name: &str) -> ChatResult<PathBuf> {
    let home_dir = dirs::home_dir().ok_or_else(|| {
        ChatError::ConfigError("Could not determine home directory".to_string())
    })?;

    Ok(home_dir.join(".config").join(app_name))
}

/// Helper function to get default config file path
pub fn get_default_config_file(app_name: &str) -> ChatResult<PathBuf> {
    let config_dir = get_default_config_dir(app_name)?;
    Ok(config_dir.join("config.toml"))
}
