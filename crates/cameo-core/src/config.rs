//! Configuration file management for Cameo.
//!
//! Supports reading `~/.config/cameo/config.toml`, with the
//! `CAMEO_API_URL` environment variable overriding the backend base URL
//! so a deployed binary can be repointed without editing files.

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{CameoError, Result};

/// Environment variable that overrides the configured backend base URL.
pub const ENV_API_URL: &str = "CAMEO_API_URL";

/// Backend connection settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
    /// Base URL of the persona backend, e.g. `https://api.example.com`.
    pub base_url: String,
    /// Optional override for the discovery deck's lookahead depth.
    #[serde(default)]
    pub lookahead: Option<usize>,
}

/// Root structure of `config.toml`.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
struct ConfigRoot {
    #[serde(default)]
    api: Option<ApiConfig>,
}

/// Loads the effective configuration.
///
/// Priority:
/// 1. `CAMEO_API_URL` environment variable (base URL only)
/// 2. `~/.config/cameo/config.toml`
///
/// Returns a `Config` error when neither source provides a base URL.
pub fn load_config() -> Result<ApiConfig> {
    let from_file = match config_path() {
        Ok(path) if path.exists() => Some(load_config_from(&path)?),
        _ => None,
    };
    let env_url = env::var(ENV_API_URL).ok().filter(|url| !url.is_empty());
    resolve_config(from_file, env_url)
}

/// Loads and parses a specific configuration file.
pub fn load_config_from(path: &Path) -> Result<ApiConfig> {
    let content = fs::read_to_string(path).map_err(|e| {
        CameoError::config(format!(
            "Failed to read configuration file at {}: {}",
            path.display(),
            e
        ))
    })?;

    let root: ConfigRoot = toml::from_str(&content).map_err(|e| {
        CameoError::config(format!(
            "Failed to parse configuration file at {}: {}",
            path.display(),
            e
        ))
    })?;

    root.api.ok_or_else(|| {
        CameoError::config(format!(
            "Configuration file at {} has no [api] section",
            path.display()
        ))
    })
}

/// Merges the file-provided configuration with the environment override.
fn resolve_config(from_file: Option<ApiConfig>, env_url: Option<String>) -> Result<ApiConfig> {
    match (from_file, env_url) {
        (Some(mut config), Some(url)) => {
            config.base_url = url;
            Ok(config)
        }
        (Some(config), None) => {
            if config.base_url.is_empty() {
                return Err(CameoError::config("Configured base_url is empty"));
            }
            Ok(config)
        }
        (None, Some(url)) => Ok(ApiConfig {
            base_url: url,
            lookahead: None,
        }),
        (None, None) => Err(CameoError::config(format!(
            "No backend configured: set {} or create {}",
            ENV_API_URL,
            config_path()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|_| "~/.config/cameo/config.toml".to_string())
        ))),
    }
}

/// Returns the path to the configuration file: ~/.config/cameo/config.toml
fn config_path() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| CameoError::config("Could not determine home directory"))?;
    Ok(home.join(".config").join("cameo").join("config.toml"))
}
