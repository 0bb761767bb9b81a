//! Client configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Base URL used when nothing else is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";

/// Request timeout used when nothing else is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Environment variable selecting the API base URL.
pub const API_URL_ENV: &str = "POLICYHUB_API_URL";

/// Environment variable overriding the request timeout, in milliseconds.
pub const TIMEOUT_ENV: &str = "POLICYHUB_TIMEOUT_MS";

/// Errors raised while building a client.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// The base URL does not parse or is not http(s).
    #[error("invalid API base URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// The timeout value is not a positive integer.
    #[error("invalid timeout '{0}': expected a positive number of milliseconds")]
    InvalidTimeout(String),

    /// The HTTP client could not be constructed.
    #[error("failed to create HTTP client: {0}")]
    Build(String),
}

/// Settings for [`PolicyHubClient`](crate::PolicyHubClient).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// API base URL without a trailing slash.
    pub base_url: String,

    /// Per-request timeout in milliseconds.
    pub timeout_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_ms: DEFAULT_TIMEOUT.as_millis() as u64,
        }
    }
}

impl ClientConfig {
    /// Reads [`API_URL_ENV`] and [`TIMEOUT_ENV`], keeping defaults for unset values.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`from_env`](Self::from_env) with a custom variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(url) = lookup(API_URL_ENV).filter(|v| !v.trim().is_empty()) {
            config = config.with_base_url(url);
        }
        if let Some(raw) = lookup(TIMEOUT_ENV).filter(|v| !v.trim().is_empty()) {
            config.timeout_ms = parse_timeout_ms(&raw)?;
        }
        config.validate()?;
        Ok(config)
    }

    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim().trim_end_matches('/').to_string();
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = timeout.as_millis() as u64;
        self
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Checks that the base URL is an absolute http(s) URL and the timeout is non-zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |reason: String| ConfigError::InvalidUrl {
            url: self.base_url.clone(),
            reason,
        };
        let url = reqwest::Url::parse(&self.base_url).map_err(|e| invalid(e.to_string()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(invalid(format!("unsupported scheme '{}'", url.scheme())));
        }
        if self.timeout_ms == 0 {
            return Err(ConfigError::InvalidTimeout("0".to_string()));
        }
        Ok(())
    }
}

/// Parses a timeout given in milliseconds.
pub fn parse_timeout_ms(raw: &str) -> Result<u64, ConfigError> {
    raw.trim()
        .parse::<u64>()
        .ok()
        .filter(|ms| *ms > 0)
        .ok_or_else(|| ConfigError::InvalidTimeout(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::from_lookup(|_| None).expect("defaults");
        assert_eq!(config.base_url, "http://localhost:8080");
        assert_eq!(config.timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_lookup_overrides() {
        let config = ClientConfig::from_lookup(|key| match key {
            API_URL_ENV => Some("https://hub.example.com/api/".to_string()),
            TIMEOUT_ENV => Some("2500".to_string()),
            _ => None,
        })
        .expect("config");
        assert_eq!(config.base_url, "https://hub.example.com/api");
        assert_eq!(config.timeout_ms, 2500);
    }

    #[test]
    fn test_invalid_values() {
        let bad_timeout = ClientConfig::from_lookup(|key| {
            (key == TIMEOUT_ENV).then(|| "soon".to_string())
        });
        assert!(matches!(bad_timeout, Err(ConfigError::InvalidTimeout(_))));

        let bad_url = ClientConfig::default().with_base_url("ftp://files");
        assert!(matches!(bad_url.validate(), Err(ConfigError::InvalidUrl { .. })));
    }
}
