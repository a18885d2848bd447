//! Configuration module for the bundle synchronizer.
//!
//! Loads configuration from environment variables.

use std::env;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::bundle::PROPERTIES_SUFFIX;

/// Errors in the startup configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("invalid bundle prefix '{0}', expected host:path")]
    InvalidPrefix(String),

    #[error("{name} must be a positive number of seconds, got '{value}'")]
    InvalidSeconds { name: &'static str, value: String },
}

/// One configured bundle family: the tenant host and the base file prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleFamily {
    pub host: String,
    /// Base file path without the `.properties` suffix
    pub prefix: PathBuf,
}

impl BundleFamily {
    /// Parse `host:prefix`. The host ends at the first colon.
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        let raw = raw.trim();
        let (host, prefix) = raw
            .split_once(':')
            .ok_or_else(|| ConfigError::InvalidPrefix(raw.to_string()))?;

        if host.trim().is_empty() || prefix.trim().is_empty() {
            return Err(ConfigError::InvalidPrefix(raw.to_string()));
        }

        Ok(Self {
            host: host.trim().to_string(),
            prefix: PathBuf::from(prefix.trim()),
        })
    }

    /// Path of the base bundle file.
    pub fn base_file(&self) -> PathBuf {
        let mut path = self.prefix.clone().into_os_string();
        path.push(PROPERTIES_SUFFIX);
        PathBuf::from(path)
    }
}

impl fmt::Display for BundleFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.prefix.display())
    }
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    // Bundles
    pub bundle_charset: String,
    pub families: Vec<BundleFamily>,

    // Mail
    pub smtp_host: String,

    // MongoDB
    pub mongodb_uri: String,
    pub mongodb_database: String,

    // Synchronizer
    pub sync_interval: Duration,
    pub io_timeout: Duration,
    /// Author recorded on values written by the synchronizer
    pub author: Option<String>,
    /// Run a single pass and exit
    pub run_once: bool,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Expects `.env` to have been loaded already.
    ///
    /// # Errors
    /// Returns `ConfigError` if a required variable is missing or malformed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let families = var("TRANSLATION_BUNDLE_PREFIXES")
            .ok_or(ConfigError::Missing("TRANSLATION_BUNDLE_PREFIXES"))?
            .split(',')
            .filter(|s| !s.trim().is_empty())
            .map(BundleFamily::parse)
            .collect::<Result<Vec<_>, _>>()?;

        let seconds = |name: &'static str, default: u64| -> Result<Duration, ConfigError> {
            match var(name) {
                None => Ok(Duration::from_secs(default)),
                Some(value) => match value.parse::<u64>() {
                    Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
                    _ => Err(ConfigError::InvalidSeconds { name, value }),
                },
            }
        };

        let run_once = var("SYNC_RUN_ONCE")
            .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        Ok(Self {
            bundle_charset: var("TRANSLATION_BUNDLE_CHARSET").unwrap_or_else(|| "ISO-8859-1".to_string()),
            families,
            smtp_host: var("SMTP_HOST").unwrap_or_else(|| "localhost".to_string()),
            mongodb_uri: var("MONGODB_URI").ok_or(ConfigError::Missing("MONGODB_URI"))?,
            mongodb_database: var("MONGODB_DATABASE").unwrap_or_else(|| "translation_site".to_string()),
            sync_interval: seconds("SYNC_INTERVAL_SECS", 60)?,
            io_timeout: seconds("SYNC_IO_TIMEOUT_SECS", 30)?,
            author: var("SYNC_AUTHOR"),
            run_once,
        })
    }
}
