//! Configuration Module
//!
//! Cache construction parameters and server configuration loaded from
//! environment variables.

use std::env;
use std::str::FromStr;

use tracing::warn;

use crate::cache::DEFAULT_HALFLIFE;
use crate::error::{CacheError, Result};

/// Default byte budget (64 MiB).
pub const DEFAULT_AVAILABLE_BYTES: u64 = 64 * 1024 * 1024;

// == Cache Config ==
/// Construction-time parameters of a `CacheStore`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CacheConfig {
    /// Maximum total payload bytes kept after any put. Zero caches nothing.
    pub available_bytes: u64,
    /// Accesses after which a new access weighs twice as much as an old one
    pub halflife: f64,
    /// Minimum `compute_cost / nbytes` for admission
    pub limit: f64,
}

impl CacheConfig {
    /// Creates a config with the given budget and default halflife and limit.
    pub fn new(available_bytes: u64) -> Self {
        Self {
            available_bytes,
            ..Self::default()
        }
    }

    pub fn with_halflife(mut self, halflife: f64) -> Self {
        self.halflife = halflife;
        self
    }

    pub fn with_limit(mut self, limit: f64) -> Self {
        self.limit = limit;
        self
    }

    // == Validate ==
    /// Checks that halflife is positive and limit is non-negative.
    pub fn validate(&self) -> Result<()> {
        if !self.halflife.is_finite() || self.halflife <= 0.0 {
            return Err(CacheError::InvalidConfig(format!(
                "halflife must be a positive finite number, got {}",
                self.halflife
            )));
        }
        if !self.limit.is_finite() || self.limit < 0.0 {
            return Err(CacheError::InvalidConfig(format!(
                "limit must be a non-negative finite number, got {}",
                self.limit
            )));
        }
        Ok(())
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            available_bytes: DEFAULT_AVAILABLE_BYTES,
            halflife: DEFAULT_HALFLIFE,
            limit: 0.0,
        }
    }
}

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Cache engine parameters
    pub cache: CacheConfig,
    /// HTTP server port
    pub server_port: u16,
    /// Interval in seconds between stats log lines
    pub stats_interval: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `AVAILABLE_BYTES` - Byte budget (default: 64 MiB)
    /// - `HALFLIFE` - Recency halflife in accesses (default: 1000)
    /// - `COST_LIMIT` - Minimum cost per byte for admission (default: 0)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `STATS_INTERVAL` - Stats reporting frequency in seconds (default: 30)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            cache: CacheConfig {
                available_bytes: env_or("AVAILABLE_BYTES", defaults.cache.available_bytes),
                halflife: env_or("HALFLIFE", defaults.cache.halflife),
                limit: env_or("COST_LIMIT", defaults.cache.limit),
            },
            server_port: env_or("SERVER_PORT", defaults.server_port),
            stats_interval: env_or("STATS_INTERVAL", defaults.stats_interval),
        }
    }

    /// Validates the cache parameters and the reporting interval.
    pub fn validate(&self) -> Result<()> {
        self.cache.validate()?;
        if self.stats_interval == 0 {
            return Err(CacheError::InvalidConfig(
                "stats interval must be at least one second".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache: CacheConfig::default(),
            server_port: 3000,
            stats_interval: 30,
        }
    }
}

/// Reads and parses `name`, falling back to `default` when unset or malformed.
fn env_or<T: FromStr>(name: &str, default: T) -> T {
    match env::var(name) {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            warn!(variable = name, value = %raw, "ignoring unparsable environment variable");
            default
        }),
        Err(_) => default,
    }
}
