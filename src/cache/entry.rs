//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL support.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::Serialize;
use serde_json::Value;

// == Cache Entry ==
/// Represents a single cached response with its metadata.
///
/// The value and the cache-control directives are opaque to the cache: they
/// are stored and handed back as-is. Callers use `created_at` to compute the
/// elapsed age of a response and echo `cache_control` into response metadata.
#[derive(Debug, Clone, Serialize)]
pub struct CacheEntry {
    /// The key this entry is stored under, kept so eviction bookkeeping can
    /// reach the index given only the entry
    pub key: String,
    /// The cached payload
    pub value: Value,
    /// Creation timestamp (Unix milliseconds)
    pub created_at: u64,
    /// Expiration timestamp (Unix milliseconds)
    pub expires_at: u64,
    /// Optional response-caching directives, passed through untouched
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_control: Option<Value>,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new cache entry expiring `ttl_seconds` from now.
    pub fn new(key: String, value: Value, ttl_seconds: u64, cache_control: Option<Value>) -> Self {
        let now = current_timestamp_ms();
        Self {
            key,
            value,
            created_at: now,
            expires_at: now + ttl_seconds * 1000,
            cache_control,
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired.
    ///
    /// Boundary condition: an entry is expired once the current time is
    /// greater than or equal to the expiration time. An expired entry is
    /// logically absent even while it still occupies storage.
    pub fn is_expired(&self) -> bool {
        current_timestamp_ms() >= self.expires_at
    }

    // == Time To Live ==
    /// Returns remaining TTL in milliseconds, or 0 once expired.
    pub fn ttl_remaining_ms(&self) -> u64 {
        let now = current_timestamp_ms();
        self.expires_at.saturating_sub(now)
    }

    /// Returns remaining TTL in whole seconds, or 0 once expired.
    pub fn ttl_remaining(&self) -> u64 {
        self.ttl_remaining_ms() / 1000
    }

    // == Age ==
    /// Returns the elapsed age of the entry in milliseconds.
    pub fn age_ms(&self) -> u64 {
        current_timestamp_ms().saturating_sub(self.created_at)
    }
}

// == Utility Functions ==
/// Returns current Unix timestamp in milliseconds.
pub fn current_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("Time went backwards")
        .as_millis() as u64
}
