//! Client configuration from environment variables.
//!
//! # Invariants
//! - `base_url` is an absolute http(s) URL without a trailing slash.
//! - `timeout` is `None` (transport default) or a positive duration.

use crate::logging::default_log_level;
use reqwest::Url;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::time::Duration;

pub const ENV_API_URL: &str = "NOTETREE_API_URL";
pub const ENV_TIMEOUT_SECS: &str = "NOTETREE_TIMEOUT_SECS";
pub const ENV_LOG_LEVEL: &str = "NOTETREE_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "NOTETREE_LOG_DIR";

pub const DEFAULT_API_URL: &str = "http://localhost:5045";

/// Settings shared by the HTTP client and logging bootstrap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout: Option<Duration>,
    pub log_level: String,
    pub log_dir: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            timeout: None,
            log_level: default_log_level().to_string(),
            log_dir: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidBaseUrl(String),
    InvalidTimeout(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidBaseUrl(value) => {
                write!(f, "{ENV_API_URL} must be an http(s) URL, got `{value}`")
            }
            Self::InvalidTimeout(value) => write!(
                f,
                "{ENV_TIMEOUT_SECS} must be a positive number of seconds, got `{value}`"
            ),
        }
    }
}

impl Error for ConfigError {}

impl ClientConfig {
    /// Reads configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads configuration through `lookup`; unset or blank keys use defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let mut config = Self::default();
        if let Some(url) = get(ENV_API_URL) {
            config.base_url = normalize_base_url(&url)?;
        }
        if let Some(raw) = get(ENV_TIMEOUT_SECS) {
            config.timeout = Some(parse_timeout(&raw)?);
        }
        if let Some(level) = get(ENV_LOG_LEVEL) {
            config.log_level = level;
        }
        config.log_dir = get(ENV_LOG_DIR).map(PathBuf::from);
        Ok(config)
    }

    /// Overrides the API base URL.
    pub fn with_base_url(mut self, url: &str) -> Result<Self, ConfigError> {
        self.base_url = normalize_base_url(url)?;
        Ok(self)
    }
}

fn normalize_base_url(value: &str) -> Result<String, ConfigError> {
    let invalid = || ConfigError::InvalidBaseUrl(value.to_string());
    let url = Url::parse(value.trim()).map_err(|_| invalid())?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid());
    }
    if url.host_str().map_or(true, str::is_empty) {
        return Err(invalid());
    }
    Ok(url.as_str().trim_end_matches('/').to_string())
}

fn parse_timeout(value: &str) -> Result<Duration, ConfigError> {
    match value.parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ => Err(ConfigError::InvalidTimeout(value.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::{ClientConfig, ConfigError, DEFAULT_API_URL};
    use std::collections::HashMap;
    use std::time::Duration;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn empty_environment_uses_defaults() {
        let config = ClientConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.base_url, DEFAULT_API_URL);
        assert_eq!(config.timeout, None);
        assert_eq!(config.log_dir, None);
    }

    #[test]
    fn values_are_trimmed_and_normalized() {
        let config = ClientConfig::from_lookup(lookup(&[
            ("NOTETREE_API_URL", " https://notes.example.com/ "),
            ("NOTETREE_TIMEOUT_SECS", "15"),
            ("NOTETREE_LOG_DIR", "/tmp/notetree"),
        ]))
        .unwrap();
        assert_eq!(config.base_url, "https://notes.example.com");
        assert_eq!(config.timeout, Some(Duration::from_secs(15)));
        assert_eq!(config.log_dir.unwrap().to_str(), Some("/tmp/notetree"));
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(matches!(
            ClientConfig::from_lookup(lookup(&[("NOTETREE_API_URL", "ftp://x")])),
            Err(ConfigError::InvalidBaseUrl(_))
        ));
        assert!(matches!(
            ClientConfig::from_lookup(lookup(&[("NOTETREE_TIMEOUT_SECS", "0")])),
            Err(ConfigError::InvalidTimeout(_))
        ));
        assert!(matches!(
            ClientConfig::default().with_base_url("http://"),
            Err(ConfigError::InvalidBaseUrl(_))
        ));
    }

    #[test]
    fn malformed_hosts_are_rejected() {
        for url in ["http://exa mple.com", "https://:8080", "http//notes.example.com"] {
            assert!(
                matches!(
                    ClientConfig::default().with_base_url(url),
                    Err(ConfigError::InvalidBaseUrl(_))
                ),
                "{url} was accepted"
            );
        }
        let config = ClientConfig::default()
            .with_base_url("HTTP://Notes.Example.com:8080/api/")
            .unwrap();
        assert_eq!(config.base_url, "http://notes.example.com:8080/api");
    }
}
