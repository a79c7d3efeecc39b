//! Runtime configuration.
//!
//! # Responsibility
//! - Resolve database path, remote endpoint, sync cadence and logging
//!   settings from environment variables with documented defaults.
//!
//! # Invariants
//! - Unset variables fall back to defaults; set but invalid values are errors.
//! - The sync interval is never zero.

use crate::logging::default_log_level;
use crate::sync::scheduler::DEFAULT_SYNC_INTERVAL;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::time::Duration;

pub const ENV_DB_PATH: &str = "QUOTEBOOK_DB_PATH";
pub const ENV_ENDPOINT: &str = "QUOTEBOOK_ENDPOINT";
pub const ENV_SYNC_INTERVAL_SECS: &str = "QUOTEBOOK_SYNC_INTERVAL_SECS";
pub const ENV_REQUEST_TIMEOUT_SECS: &str = "QUOTEBOOK_REQUEST_TIMEOUT_SECS";
pub const ENV_LOG_LEVEL: &str = "QUOTEBOOK_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "QUOTEBOOK_LOG_DIR";

pub const DEFAULT_DB_FILE_NAME: &str = "quotebook.sqlite3";
pub const DEFAULT_ENDPOINT: &str = "https://jsonplaceholder.typicode.com/posts";

/// Invalid configuration value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidNumber { key: &'static str, value: String },
    ZeroInterval { key: &'static str },
    EmptyValue { key: &'static str },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidNumber { key, value } => {
                write!(f, "{key} must be a whole number of seconds, got `{value}`")
            }
            Self::ZeroInterval { key } => write!(f, "{key} must be greater than zero"),
            Self::EmptyValue { key } => write!(f, "{key} cannot be blank"),
        }
    }
}

impl Error for ConfigError {}

/// Remote reconciliation settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteConfig {
    pub endpoint: String,
    pub sync_interval: Duration,
    /// `None` means requests never time out.
    pub request_timeout: Option<Duration>,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            sync_interval: DEFAULT_SYNC_INTERVAL,
            request_timeout: None,
        }
    }
}

/// Full application configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuotebookConfig {
    pub db_path: PathBuf,
    pub log_level: String,
    /// `None` lets the caller derive a directory next to the database.
    pub log_dir: Option<PathBuf>,
    pub remote: RemoteConfig,
}

impl Default for QuotebookConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_FILE_NAME),
            log_level: default_log_level().to_string(),
            log_dir: None,
            remote: RemoteConfig::default(),
        }
    }
}

impl QuotebookConfig {
    /// Reads configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads configuration through an arbitrary lookup function.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(value) = non_blank(&lookup, ENV_DB_PATH)? {
            config.db_path = PathBuf::from(value);
        }
        if let Some(value) = non_blank(&lookup, ENV_ENDPOINT)? {
            config.remote.endpoint = value;
        }
        if let Some(secs) = seconds(&lookup, ENV_SYNC_INTERVAL_SECS)? {
            if secs == 0 {
                return Err(ConfigError::ZeroInterval {
                    key: ENV_SYNC_INTERVAL_SECS,
                });
            }
            config.remote.sync_interval = Duration::from_secs(secs);
        }
        if let Some(secs) = seconds(&lookup, ENV_REQUEST_TIMEOUT_SECS)? {
            // 0 keeps the "no timeout" default.
            config.remote.request_timeout = (secs > 0).then(|| Duration::from_secs(secs));
        }
        if let Some(value) = non_blank(&lookup, ENV_LOG_LEVEL)? {
            config.log_level = value;
        }
        if let Some(value) = non_blank(&lookup, ENV_LOG_DIR)? {
            config.log_dir = Some(PathBuf::from(value));
        }

        Ok(config)
    }
}

fn non_blank(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
) -> Result<Option<String>, ConfigError> {
    match lookup(key) {
        None => Ok(None),
        Some(value) if value.trim().is_empty() => Err(ConfigError::EmptyValue { key }),
        Some(value) => Ok(Some(value.trim().to_string())),
    }
}

fn seconds(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
) -> Result<Option<u64>, ConfigError> {
    let Some(value) = non_blank(lookup, key)? else {
        return Ok(None);
    };
    value
        .parse::<u64>()
        .map(Some)
        .map_err(|_| ConfigError::InvalidNumber { key, value })
}
