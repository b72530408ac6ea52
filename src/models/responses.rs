//! Response DTOs for the cache admin API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;

use crate::cache::CacheStats;
use crate::config::StrategyKind;

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    /// Number of cache hits
    pub hits: u64,
    /// Number of cache misses
    pub misses: u64,
    /// Number of capacity evictions
    pub evictions: u64,
    /// Current number of entries in cache
    pub total_entries: usize,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
}

impl StatsResponse {
    /// Creates a new StatsResponse from cache statistics
    pub fn from_stats(stats: &CacheStats) -> Self {
        Self {
            hits: stats.hits,
            misses: stats.misses,
            evictions: stats.evictions,
            total_entries: stats.total_entries,
            hit_rate: stats.hit_rate(),
        }
    }
}

/// Response body for invalidation endpoints
#[derive(Debug, Clone, Serialize)]
pub struct InvalidateResponse {
    /// Number of entries removed
    pub invalidated: usize,
}

impl InvalidateResponse {
    /// Creates a new InvalidateResponse
    pub fn new(invalidated: usize) -> Self {
        Self { invalidated }
    }
}

/// Response body for the delete endpoint (DELETE /entries/:key)
#[derive(Debug, Clone, Serialize)]
pub struct DeleteResponse {
    /// Success message
    pub message: String,
    /// The key that was deleted
    pub key: String,
}

impl DeleteResponse {
    /// Creates a new DeleteResponse
    pub fn new(key: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            message: format!("Key '{}' deleted successfully", key),
            key,
        }
    }
}

/// Response body for the clear endpoint (DELETE /entries)
#[derive(Debug, Clone, Serialize)]
pub struct ClearResponse {
    /// Success message
    pub message: String,
}

impl ClearResponse {
    /// Creates a new ClearResponse
    pub fn new() -> Self {
        Self {
            message: "Cache cleared".to_string(),
        }
    }
}

impl Default for ClearResponse {
    fn default() -> Self {
        Self::new()
    }
}

/// Response body for the settings endpoints (GET/PUT /settings)
#[derive(Debug, Clone, Serialize)]
pub struct SettingsResponse {
    /// Global enabled flag
    pub enabled: bool,
    /// Default TTL in seconds
    pub default_ttl: u64,
    /// The eviction policy the cache was constructed with
    pub strategy: StrategyKind,
}

/// Response body for per-resource TTL updates (PUT /resource-ttl)
#[derive(Debug, Clone, Serialize)]
pub struct ResourceTtlResponse {
    /// Resource family name
    pub resource: String,
    /// TTL now in effect for that family
    pub ttl: u64,
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}
