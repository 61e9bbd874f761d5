//! Application configuration.
//!
//! Loaded once at startup from `~/.techfinance/config.json`. Every field is
//! optional; missing fields fall back to the production endpoints, so a
//! missing or malformed file never prevents the app from starting.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

fn default_api_base_url() -> String {
    "https://techfinance-api.fly.dev".to_string()
}

fn default_forecast_base_url() -> String {
    "https://techfinance-previsao.fly.dev".to_string()
}

fn default_api_token() -> String {
    "ronaldo".to_string()
}

fn default_api_timeout_secs() -> u64 {
    10
}

// The forecast service runs a Prophet model per request and can take a while.
fn default_forecast_timeout_secs() -> u64 {
    30
}

/// Runtime configuration for the REST clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    #[serde(default = "default_forecast_base_url")]
    pub forecast_base_url: String,
    #[serde(default = "default_api_token")]
    pub api_token: String,
    #[serde(default = "default_api_timeout_secs")]
    pub api_timeout_secs: u64,
    #[serde(default = "default_forecast_timeout_secs")]
    pub forecast_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            forecast_base_url: default_forecast_base_url(),
            api_token: default_api_token(),
            api_timeout_secs: default_api_timeout_secs(),
            forecast_timeout_secs: default_forecast_timeout_secs(),
        }
    }
}

impl Config {
    /// Load configuration from `~/.techfinance/config.json`, falling back to
    /// defaults when the file is absent or cannot be parsed.
    pub fn load() -> Config {
        match config_path() {
            Some(path) => Self::load_from(&path),
            None => {
                log::warn!("Could not resolve home directory; using default configuration");
                Config::default()
            }
        }
    }

    /// Load configuration from an explicit path (same fallback rules as `load`).
    pub fn load_from(path: &Path) -> Config {
        if !path.exists() {
            return Config::default();
        }

        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                log::warn!(
                    "Failed to read config at {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                return Config::default();
            }
        };

        match serde_json::from_str(&content) {
            Ok(config) => config,
            Err(e) => {
                log::warn!(
                    "Malformed config at {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Config::default()
            }
        }
    }
}

/// Canonical config file path (`~/.techfinance/config.json`).
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".techfinance").join("config.json"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = Config::load_from(&dir.path().join("config.json"));

        assert_eq!(config.api_base_url, "https://techfinance-api.fly.dev");
        assert_eq!(config.forecast_base_url, "https://techfinance-previsao.fly.dev");
        assert_eq!(config.api_token, "ronaldo");
        assert_eq!(config.api_timeout_secs, 10);
        assert_eq!(config.forecast_timeout_secs, 30);
    }

    #[test]
    fn test_partial_file_keeps_remaining_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "apiBaseUrl": "http://localhost:9000" }"#).expect("write");

        let config = Config::load_from(&path);

        assert_eq!(config.api_base_url, "http://localhost:9000");
        assert_eq!(config.api_token, "ronaldo");
        assert_eq!(config.api_timeout_secs, 10);
    }

    #[test]
    fn test_malformed_file_degrades_to_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").expect("write");

        let config = Config::load_from(&path);

        assert_eq!(config.api_base_url, "https://techfinance-api.fly.dev");
    }

    #[test]
    fn test_full_file_overrides_everything() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.json");
        fs::write(
            &path,
            r#"{
                "apiBaseUrl": "http://localhost:9000",
                "forecastBaseUrl": "http://localhost:9001",
                "apiToken": "test-token",
                "apiTimeoutSecs": 2,
                "forecastTimeoutSecs": 5
            }"#,
        )
        .expect("write");

        let config = Config::load_from(&path);

        assert_eq!(config.api_base_url, "http://localhost:9000");
        assert_eq!(config.forecast_base_url, "http://localhost:9001");
        assert_eq!(config.api_token, "test-token");
        assert_eq!(config.api_timeout_secs, 2);
        assert_eq!(config.forecast_timeout_secs, 5);
    }
}
