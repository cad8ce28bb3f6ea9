//! Configuration management for cinetui
//!
//! Handles config file loading/saving and API key resolution.
//! Config is stored at ~/.config/cinetui/config.toml

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Demo key offered by the recovery screen when no credential is configured.
/// Heavily rate limited; fine for trying the app out.
pub const DEMO_API_KEY: &str = "c4b4c79d8c5c4c4c4c4c4c4c4c4c4c4c";

/// Placeholder value that counts as "not configured"
const KEY_PLACEHOLDER: &str = "YOUR_TMDB_API_KEY_HERE";

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// TMDB API key
    pub tmdb_api_key: Option<String>,
    /// Response language, e.g. "en-US"
    pub language: Option<String>,
    /// Preferred result layout ("grid" or "list")
    pub view_mode: Option<String>,
}

/// Outcome of the API key resolution chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiKey {
    /// A configured key (env var or config file)
    Configured(String),
    /// Nothing configured; startup must go through the recovery screen
    Missing,
}

impl Config {
    /// Config file path (~/.config/cinetui/config.toml)
    pub fn path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("cinetui").join("config.toml"))
    }

    /// Load config from file, or return default if not found
    pub fn load() -> Self {
        Self::path()
            .and_then(|p| std::fs::read_to_string(p).ok())
            .and_then(|s| toml::from_str(&s).ok())
            .unwrap_or_default()
    }

    /// Save config to file
    pub fn save(&self) -> Result<()> {
        let path =
            Self::path().ok_or_else(|| anyhow::anyhow!("Could not determine config path"))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let toml = toml::to_string_pretty(self)?;
        std::fs::write(path, toml)?;
        Ok(())
    }

    /// Resolve the API key:
    /// 1. Environment variable TMDB_API_KEY
    /// 2. Key from the config file
    /// 3. Missing — the caller decides whether to fall back to the demo key
    pub fn resolve_api_key(&self) -> ApiKey {
        if let Ok(key) = std::env::var("TMDB_API_KEY") {
            if Self::is_usable(&key) {
                return ApiKey::Configured(key);
            }
        }

        match &self.tmdb_api_key {
            Some(key) if Self::is_usable(key) => ApiKey::Configured(key.clone()),
            _ => ApiKey::Missing,
        }
    }

    fn is_usable(key: &str) -> bool {
        !key.trim().is_empty() && key != KEY_PLACEHOLDER
    }

    /// Cache a key into the config file (best effort)
    pub fn remember_api_key(&mut self, key: &str) {
        self.tmdb_api_key = Some(key.to_string());
        let _ = self.save();
    }

    pub fn language(&self) -> String {
        self.language.clone().unwrap_or_else(|| "en-US".to_string())
    }
}
