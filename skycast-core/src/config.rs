use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, time::Duration};

use crate::{client::REQUEST_TIMEOUT, provider::gemini::DEFAULT_MODEL};

/// Environment variable that overrides the stored API key.
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// City looked up when nothing has been searched yet, and offered after errors.
pub const DEFAULT_FALLBACK_CITY: &str = "London";

/// Credentials and endpoint for the Gemini backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GeminiConfig {
    pub api_key: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// Override for the API host, mostly useful against a proxy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// fallback_city = "Lisbon"
/// speech_command = "espeak"
///
/// [gemini]
/// api_key = "..."
/// model = "gemini-3-flash-preview"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_city: Option<String>,

    /// Seconds before a lookup is abandoned. Defaults to 15.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,

    /// Program that reads a summary aloud, e.g. "espeak" or "say".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speech_command: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gemini: Option<GeminiConfig>,
}

impl Config {
    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file, return empty.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_file_path()?)
    }

    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        Ok(project_dirs()?.config_dir().join("config.toml"))
    }

    /// Path to the persisted session state (history, last city).
    pub fn state_file_path() -> Result<PathBuf> {
        Ok(project_dirs()?.data_dir().join("state.json"))
    }

    /// API key from the environment, falling back to the stored one.
    pub fn api_key(&self) -> Option<String> {
        self.api_key_with_env(std::env::var(API_KEY_ENV).ok())
    }

    fn api_key_with_env(&self, env: Option<String>) -> Option<String> {
        env.filter(|k| !k.trim().is_empty())
            .or_else(|| self.gemini.as_ref().map(|g| g.api_key.clone()))
    }

    /// Set/replace the stored API key, keeping any model or URL override.
    pub fn set_api_key(&mut self, api_key: String) {
        match self.gemini.as_mut() {
            Some(gemini) => gemini.api_key = api_key,
            None => {
                self.gemini = Some(GeminiConfig {
                    api_key,
                    model: None,
                    base_url: None,
                })
            }
        }
    }

    pub fn model(&self) -> &str {
        self.gemini
            .as_ref()
            .and_then(|g| g.model.as_deref())
            .unwrap_or(DEFAULT_MODEL)
    }

    pub fn base_url(&self) -> Option<&str> {
        self.gemini.as_ref().and_then(|g| g.base_url.as_deref())
    }

    pub fn fallback_city(&self) -> &str {
        self.fallback_city
            .as_deref()
            .filter(|c| !c.trim().is_empty())
            .unwrap_or(DEFAULT_FALLBACK_CITY)
    }

    pub fn timeout(&self) -> Duration {
        self.timeout_secs
            .filter(|s| *s > 0)
            .map(Duration::from_secs)
            .unwrap_or(REQUEST_TIMEOUT)
    }
}

fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("dev", "skycast", "skycast")
        .ok_or_else(|| anyhow!("Could not determine platform config directory"))
}
