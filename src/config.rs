//! Configuration file at ~/.geo-assistant/config.toml.
//!
//! Every key is optional; a missing file means defaults. `GEO_OVERPASS_URL`
//! overrides the endpoint.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::location::DEFAULT_ADMIN_LEVELS;

pub const DEFAULT_OVERPASS_URL: &str = "https://overpass-api.de/api/interpreter";
pub const ENDPOINT_ENV: &str = "GEO_OVERPASS_URL";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub overpass: OverpassConfig,
    pub search: SearchConfig,
    pub server: ServerConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverpassConfig {
    pub endpoint: String,
    pub user_agent: String,
    /// Added to each query's server-side timeout for the HTTP read deadline.
    pub http_grace_secs: u64,
}

impl Default for OverpassConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_OVERPASS_URL.to_string(),
            user_agent: concat!("geo-assistant/", env!("CARGO_PKG_VERSION")).to_string(),
            http_grace_secs: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Boundary admin levels, tried in order.
    pub admin_levels: Vec<u8>,
    /// Pause between successive boundary lookups.
    pub courtesy_delay_ms: u64,
    pub boundary_timeout_secs: u64,
    pub landmark_timeout_secs: u64,
    pub area_timeout_secs: u64,
    pub radius_timeout_secs: u64,
    pub radius_m: u32,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            admin_levels: DEFAULT_ADMIN_LEVELS.to_vec(),
            courtesy_delay_ms: 1000,
            boundary_timeout_secs: 30,
            landmark_timeout_secs: 30,
            area_timeout_secs: 90,
            radius_timeout_secs: 60,
            radius_m: 2000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

impl Config {
    /// Load from the default path, then apply the environment override.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::load_from(&Self::default_path())?;
        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    /// Load a specific file. A missing file yields defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let data = match fs::read_to_string(path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        let config: Self = toml::from_str(&data).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".geo-assistant")
            .join("config.toml")
    }

    pub fn apply_env(&mut self) {
        if let Ok(url) = std::env::var(ENDPOINT_ENV) {
            if !url.trim().is_empty() {
                self.overpass.endpoint = url.trim().to_string();
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let s = &self.search;
        if s.admin_levels.is_empty() {
            return Err(ConfigError::Invalid("search.admin_levels must not be empty".into()));
        }
        if let Some(bad) = s.admin_levels.iter().find(|l| !(1..=11).contains(*l)) {
            return Err(ConfigError::Invalid(format!(
                "search.admin_levels: {} is outside 1..=11",
                bad
            )));
        }
        let timeouts = [
            ("boundary_timeout_secs", s.boundary_timeout_secs),
            ("landmark_timeout_secs", s.landmark_timeout_secs),
            ("area_timeout_secs", s.area_timeout_secs),
            ("radius_timeout_secs", s.radius_timeout_secs),
        ];
        if let Some((key, _)) = timeouts.iter().find(|(_, v)| *v == 0) {
            return Err(ConfigError::Invalid(format!("search.{} must be positive", key)));
        }
        if s.radius_m == 0 {
            return Err(ConfigError::Invalid("search.radius_m must be positive".into()));
        }
        if self.overpass.endpoint.trim().is_empty() {
            return Err(ConfigError::Invalid("overpass.endpoint must not be empty".into()));
        }
        Ok(())
    }
}
