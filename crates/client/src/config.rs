//! Client configuration read from the environment.

use std::time::Duration;

use thiserror::Error;

pub const API_URL_ENV: &str = "AUTHZ_API_URL";
pub const TOKEN_ENV: &str = "AUTHZ_TOKEN";
pub const TIMEOUT_ENV: &str = "AUTHZ_TIMEOUT_SECS";

pub const DEFAULT_API_URL: &str = "http://localhost:8080/v1";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} must be a positive number of seconds, got `{value}`")]
    InvalidTimeout { name: &'static str, value: String },
    #[error("{name} must not be empty")]
    Empty { name: &'static str },
    #[error("{value} is not a usable base URL: {reason}")]
    InvalidUrl { value: String, reason: String },
    #[error("failed to build HTTP client: {0}")]
    Http(#[from] reqwest::Error),
}

/// Where the backend lives and how to talk to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL without trailing slash, e.g. `http://localhost:8080/v1`.
    pub api_url: String,
    /// Bearer token to start with, if one was provided.
    pub token: Option<String>,
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            token: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl ClientConfig {
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: normalize_url(&api_url.into()),
            ..Self::default()
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Reads `AUTHZ_API_URL`, `AUTHZ_TOKEN` and `AUTHZ_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let api_url = match lookup(API_URL_ENV) {
            Some(url) if url.trim().is_empty() => return Err(ConfigError::Empty { name: API_URL_ENV }),
            Some(url) => normalize_url(&url),
            None => DEFAULT_API_URL.to_string(),
        };

        let timeout = match lookup(TIMEOUT_ENV) {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    return Err(ConfigError::InvalidTimeout {
                        name: TIMEOUT_ENV,
                        value: raw,
                    });
                }
            },
            None => DEFAULT_TIMEOUT,
        };

        let token = lookup(TOKEN_ENV).filter(|t| !t.trim().is_empty());

        Ok(Self {
            api_url,
            token,
            timeout,
        })
    }
}

fn normalize_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}
