//! Client configuration
//!
//! Loaded in three layers: built-in defaults, then an optional TOML file,
//! then environment overrides.
//!
//! ```toml
//! base_url = "https://scholar.example.edu"
//! login_route = "/login"
//! storage_path = "/home/ana/.config/scholar/session.json"
//! timeout_secs = 30
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Environment variable that replaces `base_url`
pub const BASE_URL_ENV: &str = "SCHOLAR_API_BASE_URL";

/// Default backend address
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";

/// Default navigation target on Unauthorized
pub const DEFAULT_LOGIN_ROUTE: &str = "/login";

/// Configuration failures
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read
    #[error("failed to read config file {path}: {source}")]
    Io {
        /// Config file
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },
    /// The config file is not valid TOML for [`ClientConfig`]
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
    /// `base_url` is not an absolute http(s) URL
    #[error("invalid base url {0:?}: expected an absolute http or https URL")]
    InvalidBaseUrl(String),
}

/// Client configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClientConfig {
    /// Base URL relative request paths are resolved against
    pub base_url: String,
    /// Route the navigator is sent to on Unauthorized
    pub login_route: String,
    /// JSON file backing persistent client storage; in-memory when unset
    pub storage_path: Option<PathBuf>,
    /// Per-request timeout in seconds; no timeout when unset
    pub timeout_secs: Option<u64>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            login_route: DEFAULT_LOGIN_ROUTE.to_string(),
            storage_path: None,
            timeout_secs: None,
        }
    }
}

impl ClientConfig {
    /// Defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the base URL
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the login route
    pub fn login_route(mut self, route: impl Into<String>) -> Self {
        self.login_route = route.into();
        self
    }

    /// Persist client storage to a file
    pub fn storage_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.storage_path = Some(path.into());
        self
    }

    /// Set a per-request timeout
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    /// Parse a TOML document; missing keys keep their defaults
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Read a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Defaults, then `path` if given, then the process environment
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        let config = config.apply_env();
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from the process environment
    pub fn apply_env(self) -> Self {
        self.with_env_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable lookup
    ///
    /// Blank values are ignored.
    pub fn with_env_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(url) = lookup(BASE_URL_ENV).filter(|v| !v.trim().is_empty()) {
            self.base_url = url.trim().to_string();
        }
        self
    }

    /// Per-request timeout
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    /// Check that the base URL is usable
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = self.base_url.trim();
        let has_scheme = url.starts_with("http://") || url.starts_with("https://");
        if !has_scheme || reqwest::Url::parse(url).is_err() {
            return Err(ConfigError::InvalidBaseUrl(self.base_url.clone()));
        }
        Ok(())
    }
}
