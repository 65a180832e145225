use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use hi5_server::config::DEFAULT_SEARCH_API_BASE;

#[derive(Debug, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_server")]
    pub server: String,
    /// Shared slash-command token the server expects.
    pub token: Option<String>,
    /// Search API credential, used by `hi5 search`.
    pub api_key: Option<String>,
    #[serde(default = "default_search_api_base")]
    pub search_api_base: String,
}

fn default_server() -> String {
    "http://localhost:8080".into()
}

fn default_search_api_base() -> String {
    DEFAULT_SEARCH_API_BASE.into()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: default_server(),
            token: None,
            api_key: None,
            search_api_base: default_search_api_base(),
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let dir = dirs::config_dir()
        .context("could not find config directory")?
        .join("hi5");
    Ok(dir.join("config.toml"))
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = config_path()?;
        if path.exists() {
            let content = fs::read_to_string(&path)?;
            Ok(toml::from_str(&content)?)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = config_path()?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;
        Ok(())
    }
}

/// Shows the first few characters of a secret.
pub fn mask(secret: &Option<String>) -> String {
    secret
        .as_ref()
        .map(|k| format!("{}...", k.chars().take(6).collect::<String>()))
        .unwrap_or_else(|| "(not set)".into())
}
