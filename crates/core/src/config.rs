//! Client configuration
//!
//! Configuration is a TOML file, by default `<config dir>/mall/config.toml`.
//! The directory can be overridden with `MALL_CONFIG_DIR`.
//!
//! ```toml
//! hostname = "play.example.com:9000"
//! secure = true
//!
//! [retry]
//! max_attempts = 5
//! initial_backoff_ms = 100
//! backoff = "linear"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Hostname used when none is configured
pub const DEFAULT_HOSTNAME: &str = "localhost";

/// Environment variable overriding the configuration directory
pub const CONFIG_DIR_ENV: &str = "MALL_CONFIG_DIR";

const CONFIG_FILE: &str = "config.toml";

/// Connection settings for a client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// `host[:port]` of the service; empty means [`DEFAULT_HOSTNAME`]
    pub hostname: String,

    /// Use `https` instead of `http`
    pub secure: bool,

    /// `User-Agent` sent with every request; empty means the crate default
    pub user_agent: String,

    /// Total timeout for a single round trip
    pub timeout_secs: Option<u64>,

    pub connect_timeout_secs: Option<u64>,

    pub retry: RetryConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            hostname: String::new(),
            secure: false,
            user_agent: String::new(),
            timeout_secs: None,
            connect_timeout_secs: None,
            retry: RetryConfig::default(),
        }
    }
}

impl Config {
    /// Parse a configuration from TOML text
    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| Error::Config(e.to_string()))
    }

    /// Load a configuration file
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml(&text).map_err(|e| match e {
            Error::Config(msg) => Error::Config(format!("{}: {msg}", path.display())),
            other => other,
        })
    }

    /// Load the default configuration file, falling back to defaults if it does not exist
    pub fn load_default() -> Result<Self> {
        match Self::default_path() {
            Some(path) if path.exists() => Self::load(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Location of the default configuration file
    pub fn default_path() -> Option<PathBuf> {
        let dir = match std::env::var_os(CONFIG_DIR_ENV) {
            Some(dir) if !dir.is_empty() => PathBuf::from(dir),
            _ => dirs::config_dir()?.join("mall"),
        };
        Some(dir.join(CONFIG_FILE))
    }

    /// Serialize to TOML text
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::Config(e.to_string()))
    }

    /// Configured hostname, or [`DEFAULT_HOSTNAME`]
    pub fn effective_hostname(&self) -> &str {
        if self.hostname.is_empty() {
            DEFAULT_HOSTNAME
        } else {
            &self.hostname
        }
    }

    /// Configured user agent, or `mall/<version>`
    pub fn effective_user_agent(&self) -> String {
        if self.user_agent.is_empty() {
            default_user_agent()
        } else {
            self.user_agent.clone()
        }
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    pub fn connect_timeout(&self) -> Option<Duration> {
        self.connect_timeout_secs.map(Duration::from_secs)
    }
}

/// `mall/<crate version>`
pub fn default_user_agent() -> String {
    format!("mall/{}", env!("CARGO_PKG_VERSION"))
}

/// How the wait between attempts grows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backoff {
    /// `initial * n` after the n-th failed attempt
    #[default]
    Linear,
    /// `initial * 2^(n-1)` after the n-th failed attempt
    Exponential,
}

/// Retry budget and backoff schedule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Total attempts, including the first
    pub max_attempts: u32,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
    pub backoff: Backoff,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            initial_backoff_ms: 100,
            max_backoff_ms: 10_000,
            backoff: Backoff::Linear,
        }
    }
}
