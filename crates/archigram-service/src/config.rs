//! Application configuration storage
//!
//! Handles persistent storage of backend selection, credential, and sandbox
//! settings. The credential can live in the config file or come from the
//! `GEMINI_API_KEY` environment variable; the environment wins only when the
//! file has no key.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::fs;

use generation::RetryConfig;
use sandbox::SandboxConfig;

/// Environment variable consulted when the config file carries no key
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

fn default_backend() -> String {
    "gemini".to_string()
}

fn default_bind_addr() -> String {
    "127.0.0.1:8080".to_string()
}

/// Full application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Generation backend name ("gemini" or "scripted")
    #[serde(default = "default_backend")]
    pub backend: String,
    /// API key for the generation service; falls back to GEMINI_API_KEY
    pub api_key: Option<String>,
    /// Model identifier; the backend supplies its default when unset
    pub model: Option<String>,
    /// Generation service base URL override (tests, proxies)
    pub base_url: Option<String>,
    /// Retry policy for transient generation failures
    #[serde(default)]
    pub retry: RetryConfig,
    /// Sandbox execution settings
    #[serde(default)]
    pub sandbox: SandboxConfig,
    /// Where rendered artifacts are written; a temp directory when unset
    pub artifacts_dir: Option<PathBuf>,
    /// HTTP adapter bind address
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            api_key: None,
            model: None,
            base_url: None,
            retry: RetryConfig::default(),
            sandbox: SandboxConfig::default(),
            artifacts_dir: None,
            bind_addr: default_bind_addr(),
        }
    }
}

impl AppConfig {
    /// Load configuration from disk
    pub async fn load(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join("config.json");

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&config_path).await.map_err(ConfigError::Io)?;

        serde_json::from_str(&contents).map_err(ConfigError::Parse)
    }

    /// Save configuration to disk
    pub async fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        fs::create_dir_all(config_dir).await.map_err(ConfigError::Io)?;

        let config_path = config_dir.join("config.json");
        let contents = serde_json::to_string_pretty(self).map_err(ConfigError::Serialize)?;

        fs::write(&config_path, contents).await.map_err(ConfigError::Io)?;

        log::info!("configuration saved to {:?}", config_path);
        Ok(())
    }

    /// The credential the generation backend should use: the config file's
    /// key when present and non-blank, otherwise the environment's.
    pub fn resolved_api_key(&self) -> Option<String> {
        match self.api_key.as_deref() {
            Some(key) if !key.trim().is_empty() => Some(key.to_string()),
            _ => std::env::var(API_KEY_ENV).ok().filter(|k| !k.trim().is_empty()),
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(serde_json::Error),
    #[error("Failed to serialize config: {0}")]
    Serialize(serde_json::Error),
}
