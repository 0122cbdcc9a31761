use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use url::Url;

/// Environment variable that overrides the configured backend.
pub const BACKEND_ENV: &str = "SUBSTANCE_SENSE_BACKEND";
pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8080";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not determine config directory")]
    NoConfigDir,

    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("malformed config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("invalid backend URL {url:?}: {reason}")]
    InvalidBackendUrl { url: String, reason: String },
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct Config {
    pub backend_url: Option<String>,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load `<config_dir>/substance-sense/config.json`, or defaults if it doesn't exist.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::get_config_path()?;
        Self::load_from(&config_path)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::new());
        }

        let config_content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&config_content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Backend base URL: environment first, then config file, then the default.
    pub fn backend_base_url(&self) -> Result<String, ConfigError> {
        let from_env = std::env::var(BACKEND_ENV).ok();
        self.resolve_backend_url(from_env.as_deref())
    }

    pub fn resolve_backend_url(&self, from_env: Option<&str>) -> Result<String, ConfigError> {
        let raw = from_env
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .or(self.backend_url.as_deref().map(str::trim).filter(|s| !s.is_empty()))
            .unwrap_or(DEFAULT_BACKEND_URL);

        validate_backend_url(raw)
    }

    fn get_config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;

        Ok(config_dir.join("substance-sense").join("config.json"))
    }
}

fn validate_backend_url(raw: &str) -> Result<String, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidBackendUrl {
        url: raw.to_string(),
        reason,
    };

    let parsed = Url::parse(raw).map_err(|e| invalid(e.to_string()))?;
    match parsed.scheme() {
        "http" | "https" => {}
        other => return Err(invalid(format!("unsupported scheme {other:?}"))),
    }

    Ok(raw.trim_end_matches('/').to_string())
}
