//! Application configuration management.
//!
//! This module handles loading and saving the application configuration,
//! which holds the backend host, port and scheme plus the last email used
//! to sign in.
//!
//! Configuration is stored at `~/.config/tradementor/config.json`.
//! Environment variables override the file; see [`Config::base_url`].

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use reqwest::Url;
use serde::{Deserialize, Serialize};

/// Application name used for config directory paths
const APP_NAME: &str = "tradementor";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Port the backend listens on unless told otherwise
pub const DEFAULT_PORT: u16 = 5001;

pub const DEFAULT_SCHEME: &str = "http";

/// Full base URL override; wins over everything else
pub const ENV_API_URL: &str = "TRADEMENTOR_API_URL";
pub const ENV_API_HOST: &str = "TRADEMENTOR_API_HOST";
pub const ENV_API_PORT: &str = "TRADEMENTOR_API_PORT";
pub const ENV_API_SCHEME: &str = "TRADEMENTOR_API_SCHEME";

/// Loopback host for the current platform. The Android emulator reaches
/// the development machine through 10.0.2.2.
pub fn default_host() -> &'static str {
    if cfg!(target_os = "android") {
        "10.0.2.2"
    } else {
        "localhost"
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Config {
    pub api_host: Option<String>,
    pub api_port: Option<u16>,
    pub api_scheme: Option<String>,
    pub last_email: Option<String>,
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load from `path`, falling back to defaults when the file is missing
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse config file {}", path.display()))
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let config_dir =
            dirs::config_dir().ok_or_else(|| anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Resolve the backend base URL from the process environment and this
    /// config. Called once at startup; the result is fixed for the session.
    pub fn base_url(&self) -> Result<String> {
        self.base_url_with(|key| std::env::var(key).ok())
    }

    /// Same as [`base_url`](Self::base_url) with an explicit variable lookup.
    pub fn base_url_with<F>(&self, env: F) -> Result<String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| env(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(url) = var(ENV_API_URL) {
            let parsed = Url::parse(&url)
                .with_context(|| format!("Invalid {} value '{}'", ENV_API_URL, url))?;
            if !matches!(parsed.scheme(), "http" | "https") || parsed.host_str().is_none() {
                return Err(anyhow!(
                    "{} must be an http(s) URL with a host, got '{}'",
                    ENV_API_URL,
                    url
                ));
            }
            return Ok(url.trim_end_matches('/').to_string());
        }

        let scheme = var(ENV_API_SCHEME)
            .or_else(|| self.api_scheme.clone())
            .unwrap_or_else(|| DEFAULT_SCHEME.to_string());
        if scheme != "http" && scheme != "https" {
            return Err(anyhow!("Unsupported API scheme '{}'", scheme));
        }

        let host = var(ENV_API_HOST)
            .or_else(|| self.api_host.clone())
            .unwrap_or_else(|| default_host().to_string());

        let port = match var(ENV_API_PORT) {
            Some(raw) => raw
                .parse::<u16>()
                .with_context(|| format!("Invalid {} value '{}'", ENV_API_PORT, raw))?,
            None => self.api_port.unwrap_or(DEFAULT_PORT),
        };

        // IPv6 literals need brackets in a URL authority
        let host = if host.contains(':') && !host.starts_with('[') {
            format!("[{}]", host)
        } else {
            host
        };

        let url = format!("{}://{}:{}", scheme, host, port);
        Url::parse(&url).with_context(|| format!("Invalid API address '{}'", url))?;
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_base_url() {
        let url = Config::default().base_url_with(env(&[])).unwrap();
        assert_eq!(url, format!("http://{}:5001", default_host()));
    }

    #[test]
    fn test_file_values_used() {
        let config = Config {
            api_host: Some("10.96.82.1".to_string()),
            api_port: Some(8080),
            api_scheme: Some("https".to_string()),
            last_email: None,
        };
        assert_eq!(
            config.base_url_with(env(&[])).unwrap(),
            "https://10.96.82.1:8080"
        );
    }

    #[test]
    fn test_env_overrides_file() {
        let config = Config {
            api_host: Some("from-file".to_string()),
            api_port: Some(8080),
            ..Config::default()
        };
        let url = config
            .base_url_with(env(&[(ENV_API_HOST, "api.local"), (ENV_API_PORT, "9000")]))
            .unwrap();
        assert_eq!(url, "http://api.local:9000");

        let url = config
            .base_url_with(env(&[(ENV_API_URL, "https://api.example.com/")]))
            .unwrap();
        assert_eq!(url, "https://api.example.com");
    }

    #[test]
    fn test_invalid_values_rejected() {
        let config = Config::default();
        assert!(config
            .base_url_with(env(&[(ENV_API_PORT, "not-a-port")]))
            .is_err());
        assert!(config
            .base_url_with(env(&[(ENV_API_SCHEME, "ftp")]))
            .is_err());
    }

    #[test]
    fn test_ipv6_host_is_bracketed() {
        let config = Config {
            api_host: Some("::1".to_string()),
            ..Config::default()
        };
        assert_eq!(config.base_url_with(env(&[])).unwrap(), "http://[::1]:5001");

        let url = config
            .base_url_with(env(&[(ENV_API_HOST, "[fe80::1]")]))
            .unwrap();
        assert_eq!(url, "http://[fe80::1]:5001");
    }

    #[test]
    fn test_url_override_is_validated() {
        let config = Config::default();
        for bad in ["not a url", "ftp://files.example.com", "localhost:5001"] {
            assert!(
                config.base_url_with(env(&[(ENV_API_URL, bad)])).is_err(),
                "accepted {}",
                bad
            );
        }

        let url = config
            .base_url_with(env(&[(ENV_API_URL, "http://[::1]:5001/")]))
            .unwrap();
        assert_eq!(url, "http://[::1]:5001");
    }

    #[test]
    fn test_invalid_host_rejected() {
        let config = Config {
            api_host: Some("bad host".to_string()),
            ..Config::default()
        };
        assert!(config.base_url_with(env(&[])).is_err());
    }

    #[test]
    fn test_blank_env_is_ignored() {
        let config = Config {
            api_host: Some("from-file".to_string()),
            ..Config::default()
        };
        let url = config.base_url_with(env(&[(ENV_API_HOST, "  ")])).unwrap();
        assert_eq!(url, "http://from-file:5001");
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(CONFIG_FILE);

        assert_eq!(Config::load_from(&path).unwrap(), Config::default());

        let config = Config {
            api_host: Some("10.0.2.2".to_string()),
            last_email: Some("asha@example.com".to_string()),
            ..Config::default()
        };
        config.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "{not json").unwrap();
        assert!(Config::load_from(&path).is_err());
    }
}
