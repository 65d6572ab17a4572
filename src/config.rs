use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use anyhow::{Context, Result, anyhow};

use crate::spoonacular::DEFAULT_BASE_URL;

pub const API_KEY_VAR: &str = "SPOONACULAR_API_KEY";
pub const BASE_URL_VAR: &str = "SPOONACULAR_BASE_URL";
pub const LOG_PATH_VAR: &str = "RECIPE_CHAT_LOG";

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub log_path: Option<PathBuf>,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the config file (if any), then apply `.env` and environment overrides
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let mut config = Self::load_from(&Self::get_config_path()?)?;
        config.apply_env(|name| env::var(name).ok());
        Ok(config)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }

        let config_content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Config = serde_json::from_str(&config_content)
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        Ok(config)
    }

    /// Write an empty config file so users can find where the API key goes.
    /// Returns the path when a file was created.
    pub fn write_template_if_missing() -> Result<Option<PathBuf>> {
        let path = Self::get_config_path()?;
        if path.exists() {
            return Ok(None);
        }
        Self::new().save_to(&path)?;
        Ok(Some(path))
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Create config directory if it doesn't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let config_content = serde_json::to_string_pretty(self)?;
        fs::write(path, config_content)?;
        Ok(())
    }

    /// Environment values win over the file. Blank values are ignored.
    fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(key) = var(API_KEY_VAR) {
            self.api_key = Some(key);
        }
        if let Some(url) = var(BASE_URL_VAR) {
            self.base_url = Some(url);
        }
        if let Some(path) = var(LOG_PATH_VAR) {
            self.log_path = Some(PathBuf::from(path));
        }
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL)
    }

    /// Configured key, treating a blank value as absent
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().filter(|key| !key.trim().is_empty())
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key().is_some()
    }

    /// Where the log file goes when not configured explicitly
    pub fn log_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.log_path {
            return Ok(path.clone());
        }
        let data_dir = dirs::data_local_dir()
            .ok_or_else(|| anyhow!("Could not determine data directory"))?;
        Ok(data_dir.join("recipe-chat").join("recipe-chat.log"))
    }

    fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("recipe-chat").join("config.json"))
    }
}
