//! Configuration management
//!
//! Loads configuration from config.toml at startup. All cadences and limits
//! are configurable to avoid hardcoded constants.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Monitor configuration
///
/// Loaded from config.toml at startup; a missing file falls back to defaults.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    /// Polling and gateway settings
    #[serde(default)]
    pub monitor: MonitorConfig,

    /// API server settings
    #[serde(default)]
    pub api: ApiConfig,
}

/// Polling loop and gateway configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MonitorConfig {
    /// Steady-state cadence between poll cycles, seconds
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,

    /// Sleep after an unexpected cycle fault, seconds
    #[serde(default = "default_backoff")]
    pub backoff_secs: u64,

    /// Per-request timeout for exchange fetches, seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Maximum order book levels per side
    #[serde(default = "default_depth_limit")]
    pub depth_limit: u32,

    /// Pair monitored until the first selection request arrives
    #[serde(default = "default_symbol")]
    pub default_symbol: String,
}

/// API server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
    /// Port for the HTTP/WebSocket server
    #[serde(default = "default_api_port")]
    pub port: u16,

    /// Path to static frontend files
    #[serde(default = "default_static_path")]
    pub static_path: PathBuf,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval(),
            backoff_secs: default_backoff(),
            request_timeout_secs: default_request_timeout(),
            depth_limit: default_depth_limit(),
            default_symbol: default_symbol(),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            port: default_api_port(),
            static_path: default_static_path(),
        }
    }
}

fn default_poll_interval() -> u64 {
    1
}

fn default_backoff() -> u64 {
    5
}

fn default_request_timeout() -> u64 {
    10
}

fn default_depth_limit() -> u32 {
    20
}

fn default_symbol() -> String {
    "BTC/USDT".to_string()
}

fn default_api_port() -> u16 {
    8000
}

fn default_static_path() -> PathBuf {
    PathBuf::from("frontend/build")
}

impl Config {
    /// Load configuration from config.toml (path overridable via CONFIG_PATH).
    ///
    /// A missing file yields defaults; a file that exists but does not parse
    /// is an error.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path =
            std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());

        match std::fs::read_to_string(&config_path) {
            Ok(contents) => {
                let config: Config =
                    toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))?;
                Ok(config)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Config::default()),
            Err(e) => Err(ConfigError::Io(e)),
        }
    }
}

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(String),
}
