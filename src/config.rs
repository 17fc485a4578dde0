//! Configuration Module
//!
//! Handles loading storage configuration from environment variables.

use std::env;
use std::path::PathBuf;

const DEFAULT_STORAGE_DIR: &str = ".shelf";
const DEFAULT_TIMEOUT_MS: u64 = 300_000;

/// Storage configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Root directory of the persistent medium
    pub storage_dir: PathBuf,
    /// Time-to-live in milliseconds for caches created without an explicit timeout
    pub default_timeout_ms: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SHELF_STORAGE_DIR` - Persistent storage directory (default: `.shelf`)
    /// - `SHELF_DEFAULT_TIMEOUT_MS` - Default TTL in milliseconds (default: 300000)
    pub fn from_env() -> Self {
        Self {
            storage_dir: env::var("SHELF_STORAGE_DIR")
                .ok()
                .filter(|v| !v.is_empty())
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_STORAGE_DIR)),
            default_timeout_ms: env::var("SHELF_DEFAULT_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_TIMEOUT_MS),
        }
    }

    /// Returns a copy of this config rooted at another directory.
    pub fn with_storage_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.storage_dir = dir.into();
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            storage_dir: PathBuf::from(DEFAULT_STORAGE_DIR),
            default_timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}
