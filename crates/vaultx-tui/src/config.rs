//! Configuration file handling.
//!
//! Reads from `~/.config/vaultx/vaultx.toml`

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Backend project URL.
    #[serde(default = "default_backend_url")]
    pub backend_url: String,
    /// Public API key sent with every request.
    #[serde(default)]
    pub anon_key: String,
    /// Keep the session on disk between runs.
    #[serde(default = "default_persist_session")]
    pub persist_session: bool,
    /// How long notifications stay on screen.
    #[serde(default = "default_toast_duration_ms")]
    pub toast_duration_ms: u64,
    /// Show passwords on cards without toggling.
    #[serde(default)]
    pub reveal_by_default: bool,
}

fn default_backend_url() -> String {
    "http://localhost:54321".to_string()
}

fn default_persist_session() -> bool {
    true
}

fn default_toast_duration_ms() -> u64 {
    4000
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend_url: default_backend_url(),
            anon_key: String::new(),
            persist_session: default_persist_session(),
            toast_duration_ms: default_toast_duration_ms(),
            reveal_by_default: false,
        }
    }
}

impl Config {
    /// Load configuration from the config file.
    ///
    /// If `custom_path` is provided, load from that path.
    /// Otherwise, load from the default XDG config location.
    /// Creates a default config file if it doesn't exist (only for default path).
    pub fn load(custom_path: Option<PathBuf>) -> Result<Self> {
        let is_custom = custom_path.is_some();
        let config_path = match custom_path {
            Some(path) => path,
            None => Self::config_path()?,
        };

        if !config_path.exists() {
            if !is_custom {
                let config = Config::default();
                config.save()?;
                tracing::info!("Created default config at {}", config_path.display());
                return Ok(config);
            } else {
                anyhow::bail!("Config file not found: {}", config_path.display());
            }
        }

        let contents = std::fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;

        let config = Self::parse(&contents)
            .with_context(|| format!("Failed to parse config file: {}", config_path.display()))?;

        tracing::info!("Loaded config from {}", config_path.display());
        Ok(config)
    }

    fn parse(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Apply `VAULTX_URL` / `VAULTX_ANON_KEY` from the environment
    /// (including a `.env` file, if present).
    pub fn apply_env(&mut self) {
        if let Err(e) = dotenvy::dotenv() {
            if !e.not_found() {
                tracing::warn!("Failed to read .env file: {}", e);
            }
        }
        self.apply_overrides(
            std::env::var("VAULTX_URL").ok(),
            std::env::var("VAULTX_ANON_KEY").ok(),
        );
    }

    fn apply_overrides(&mut self, url: Option<String>, anon_key: Option<String>) {
        if let Some(url) = url.filter(|u| !u.is_empty()) {
            self.backend_url = url;
        }
        if let Some(key) = anon_key.filter(|k| !k.is_empty()) {
            self.anon_key = key;
        }
    }

    /// Save configuration to the config file.
    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {}", parent.display()))?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        std::fs::write(&config_path, contents)
            .with_context(|| format!("Failed to write config file: {}", config_path.display()))
    }

    /// Get the path to the config file.
    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().context("Could not determine config directory")?;

        Ok(config_dir.join("vaultx").join("vaultx.toml"))
    }
}
