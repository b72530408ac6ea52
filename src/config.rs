//! Configuration Module
//!
//! Handles loading and managing cache configuration from environment variables.

use std::collections::HashMap;
use std::env;

use serde::{Deserialize, Serialize};

// == Strategy Selection ==
/// Eviction policy selected at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StrategyKind {
    /// Insertion-ordered store; eviction removes the oldest-inserted entry
    TimeBased,
    /// Recency-ordered store; eviction removes the least-recently-used entry
    Lru,
}

impl StrategyKind {
    /// Parses a strategy name as used in configuration (`time-based` or `lru`).
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "time-based" => Some(Self::TimeBased),
            "lru" => Some(Self::Lru),
            _ => None,
        }
    }
}

/// Cache configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Global cache on/off switch
    pub cache_enabled: bool,
    /// Eviction policy to construct the cache with
    pub cache_strategy: StrategyKind,
    /// Maximum number of entries the cache can hold
    pub cache_max_size: usize,
    /// Default TTL in seconds for entries without a more specific TTL
    pub cache_max_age: u64,
    /// Per-resource TTL overrides in seconds, keyed by resource name
    pub cache_resource_ttl: HashMap<String, u64>,
    /// Background cleanup task interval in seconds
    pub cleanup_interval: u64,
    /// HTTP admin server port
    pub server_port: u16,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_ENABLED` - Global cache switch (default: true)
    /// - `CACHE_STRATEGY` - `time-based` or `lru` (default: time-based)
    /// - `CACHE_MAX_SIZE` - Maximum cache entries (default: 1000)
    /// - `CACHE_MAX_AGE` - Default TTL in seconds (default: 300)
    /// - `CACHE_RESOURCE_TTL` - Per-resource TTLs, e.g. `machine=60,subnet=600`
    /// - `CACHE_CLEANUP_INTERVAL` - Cleanup frequency in seconds (default: 60)
    /// - `SERVER_PORT` - HTTP admin server port (default: 3000)
    pub fn from_env() -> Self {
        Self {
            cache_enabled: env::var("CACHE_ENABLED")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
            cache_strategy: env::var("CACHE_STRATEGY")
                .ok()
                .and_then(|v| StrategyKind::parse(&v))
                .unwrap_or(StrategyKind::TimeBased),
            cache_max_size: env::var("CACHE_MAX_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(1000),
            cache_max_age: env::var("CACHE_MAX_AGE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(300),
            cache_resource_ttl: env::var("CACHE_RESOURCE_TTL")
                .ok()
                .map(|v| parse_resource_ttl(&v))
                .unwrap_or_default(),
            cleanup_interval: env::var("CACHE_CLEANUP_INTERVAL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(60),
            server_port: env::var("SERVER_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3000),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache_enabled: true,
            cache_strategy: StrategyKind::TimeBased,
            cache_max_size: 1000,
            cache_max_age: 300,
            cache_resource_ttl: HashMap::new(),
            cleanup_interval: 60,
            server_port: 3000,
        }
    }
}

// == Resource TTL Parsing ==
/// Parses a `name=seconds` comma-separated list; malformed pairs are skipped.
fn parse_resource_ttl(value: &str) -> HashMap<String, u64> {
    value
        .split(',')
        .filter_map(|pair| {
            let (name, ttl) = pair.split_once('=')?;
            let name = name.trim();
            if name.is_empty() {
                return None;
            }
            Some((name.to_string(), ttl.trim().parse().ok()?))
        })
        .collect()
}
