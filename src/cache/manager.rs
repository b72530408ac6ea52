//! Cache Manager Module
//!
//! The facade the resource-serving layer talks to. Owns exactly one eviction
//! strategy chosen at construction, derives cache keys from request shape,
//! resolves per-call TTLs, and wraps pattern invalidation into
//! resource-family helpers. The manager never calls the upstream API or the
//! protocol layer; it is a lookaside cache keyed by opaque strings.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use regex::Regex;
use serde_json::Value;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info};
use url::Url;

use crate::cache::{CacheEntry, CacheStats, CacheStrategy, LruStrategy, TimeBasedStrategy};
use crate::config::{Config, StrategyKind};
use crate::error::{CacheError, Result};
use crate::tasks::spawn_cleanup_task;

// == Key Generation Options ==
/// Per-call override of the default key-generation algorithm.
pub type KeyGeneratorFn = Arc<dyn Fn(&Url, &HashMap<String, String>) -> String + Send + Sync>;

/// Options controlling how a cache key is derived from a request.
#[derive(Clone, Default)]
pub struct KeyOptions {
    /// Append the query string to the key
    pub include_query_params: bool,
    /// Restrict appended query parameters to these names; None means all
    pub include_query_params_list: Option<Vec<String>>,
    /// Fully replaces the default algorithm when set
    pub key_generator: Option<KeyGeneratorFn>,
}

// == Set Options ==
/// Per-call options for `CacheManager::set`.
#[derive(Clone, Default)]
pub struct SetOptions {
    /// `Some(false)` turns this one store into a no-op
    pub enabled: Option<bool>,
    /// TTL override in seconds; wins over any resource-specific TTL
    pub ttl: Option<u64>,
    /// Opaque response-caching directives stored alongside the value
    pub cache_control: Option<Value>,
}

// == Cache Manager ==
/// Facade over one `CacheStrategy` instance.
///
/// The strategy is picked once from configuration and lives behind a single
/// lock guarding its index and recency structures together; every operation
/// below takes that lock for its full critical section. Dispose the manager
/// on shutdown to stop the background cleanup task.
pub struct CacheManager {
    /// The one active eviction strategy
    strategy: Arc<RwLock<dyn CacheStrategy>>,
    /// Which policy the strategy was built with
    strategy_kind: StrategyKind,
    /// Handle of the periodic expiry sweep
    cleanup_handle: JoinHandle<()>,
    /// Global on/off switch
    enabled: AtomicBool,
    /// Default TTL in seconds
    default_ttl: AtomicU64,
    /// Per-resource TTL overrides, mutable at runtime
    resource_ttls: RwLock<HashMap<String, u64>>,
}

impl CacheManager {
    // == Constructor ==
    /// Creates a manager from configuration and starts the cleanup task.
    ///
    /// Must be called within a tokio runtime. The strategy choice is final;
    /// changing it requires constructing a new manager.
    pub fn new(config: &Config) -> Self {
        let strategy: Arc<RwLock<dyn CacheStrategy>> = match config.cache_strategy {
            StrategyKind::TimeBased => {
                Arc::new(RwLock::new(TimeBasedStrategy::new(config.cache_max_size)))
            }
            StrategyKind::Lru => Arc::new(RwLock::new(LruStrategy::new(config.cache_max_size))),
        };

        let cleanup_handle = spawn_cleanup_task(strategy.clone(), config.cleanup_interval);
        info!(
            strategy = ?config.cache_strategy,
            max_size = config.cache_max_size,
            default_ttl = config.cache_max_age,
            "cache manager initialized"
        );

        Self {
            strategy,
            strategy_kind: config.cache_strategy,
            cleanup_handle,
            enabled: AtomicBool::new(config.cache_enabled),
            default_ttl: AtomicU64::new(config.cache_max_age),
            resource_ttls: RwLock::new(config.cache_resource_ttl.clone()),
        }
    }

    // == Dispose ==
    /// Stops the background cleanup task.
    ///
    /// Idempotent; also invoked from `Drop` so tests tearing a manager down
    /// do not leak the task.
    pub fn dispose(&self) {
        self.cleanup_handle.abort();
        debug!("cache cleanup task stopped");
    }

    // == Key Generation ==
    /// Derives a cache key from a resource name, a resource URI, and the
    /// request parameters.
    ///
    /// Default shape: `"{resource}:{path}"`, then `:{id}` from the first
    /// present of the `system_id`, `id`, `name` parameters, then the
    /// canonically sorted query string when requested. A `key_generator`
    /// in the options replaces the whole algorithm.
    pub fn generate_cache_key(
        &self,
        resource_name: &str,
        uri: &Url,
        params: &HashMap<String, String>,
        options: Option<&KeyOptions>,
    ) -> String {
        if let Some(generator) = options.and_then(|opts| opts.key_generator.as_ref()) {
            return generator(uri, params);
        }

        let mut key = format!("{}:{}", resource_name, resource_path(uri));

        for id_param in ["system_id", "id", "name"] {
            if let Some(id) = params.get(id_param) {
                key.push(':');
                key.push_str(id);
                break;
            }
        }

        if let Some(opts) = options.filter(|opts| opts.include_query_params) {
            let query = canonical_query(uri, opts.include_query_params_list.as_deref());
            if !query.is_empty() {
                key.push(':');
                key.push_str(&query);
            }
        }

        key
    }

    // == Get ==
    /// Returns the cached value for `key`, or None on a miss.
    ///
    /// A disabled cache misses without touching the strategy.
    pub async fn get(&self, key: &str) -> Option<Value> {
        self.get_entry(key).await.map(|entry| entry.value)
    }

    /// Like `get`, but returns the whole entry so callers can compute the
    /// response age from `created_at` and echo `cache_control` outward.
    pub async fn get_entry(&self, key: &str) -> Option<CacheEntry> {
        if !self.is_enabled() {
            return None;
        }
        self.strategy.write().await.get(key)
    }

    // == Set ==
    /// Stores a value, resolving the TTL as: per-call option, then the
    /// resource-specific TTL for `resource_name`, then the default.
    ///
    /// Returns the stored entry, or None when the manager is disabled or
    /// the options disable this one call.
    pub async fn set(
        &self,
        key: &str,
        value: Value,
        resource_name: Option<&str>,
        options: Option<SetOptions>,
    ) -> Option<CacheEntry> {
        if !self.is_enabled() {
            return None;
        }
        let options = options.unwrap_or_default();
        if options.enabled == Some(false) {
            return None;
        }

        let ttl = match options.ttl {
            Some(ttl) => ttl,
            None => match resource_name {
                Some(name) => self.resource_ttl(name).await,
                None => self.default_ttl(),
            },
        };

        Some(
            self.strategy
                .write()
                .await
                .set(key.to_string(), value, ttl, options.cache_control),
        )
    }

    // == Delete ==
    /// Removes one entry. Returns false when absent or when disabled.
    pub async fn delete(&self, key: &str) -> bool {
        if !self.is_enabled() {
            return false;
        }
        self.strategy.write().await.delete(key)
    }

    // == Clear ==
    /// Empties the underlying storage. Permitted even when disabled.
    pub async fn clear(&self) {
        self.strategy.write().await.clear();
    }

    // == Size ==
    /// Storage occupancy; reflects the store even when disabled.
    pub async fn size(&self) -> usize {
        self.strategy.read().await.size()
    }

    // == Invalidate ==
    /// Removes every entry whose whole key matches `pattern`.
    ///
    /// A malformed pattern is the one expected error in this subsystem and
    /// propagates to the caller. Returns the number of entries removed,
    /// 0 when disabled.
    pub async fn invalidate(&self, pattern: &str) -> Result<usize> {
        if !self.is_enabled() {
            return Ok(0);
        }
        let pattern = Regex::new(pattern)
            .map_err(|err| CacheError::InvalidPattern(err.to_string()))?;
        Ok(self.strategy.write().await.invalidate(&pattern))
    }

    /// Removes every key of the `"{resource}:"` family.
    pub async fn invalidate_resource(&self, resource_name: &str) -> Result<usize> {
        let pattern = format!("^{}:", regex::escape(resource_name));
        self.invalidate(&pattern).await
    }

    /// Removes every key naming one specific resource instance: the id may
    /// sit directly after the resource name or after one intermediate
    /// segment, so both `"machine:abc"` and `"machine:details:abc"` match
    /// while other ids in that position do not.
    pub async fn invalidate_resource_by_id(
        &self,
        resource_name: &str,
        resource_id: &str,
    ) -> Result<usize> {
        let pattern = format!(
            "^{}:([^:]*:)?{}(:|$)",
            regex::escape(resource_name),
            regex::escape(resource_id)
        );
        self.invalidate(&pattern).await
    }

    // == Stats ==
    /// Snapshot of the active strategy's performance counters.
    pub async fn stats(&self) -> CacheStats {
        self.strategy.read().await.stats()
    }

    // == Settings Accessors ==
    /// The eviction policy this manager was constructed with.
    pub fn strategy_kind(&self) -> StrategyKind {
        self.strategy_kind
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Relaxed);
        info!(enabled, "cache enabled flag updated");
    }

    pub fn default_ttl(&self) -> u64 {
        self.default_ttl.load(Ordering::Relaxed)
    }

    pub fn set_default_ttl(&self, ttl_seconds: u64) {
        self.default_ttl.store(ttl_seconds, Ordering::Relaxed);
    }

    /// TTL for a resource, falling back to the default when no
    /// resource-specific value is set.
    pub async fn resource_ttl(&self, resource_name: &str) -> u64 {
        self.resource_ttls
            .read()
            .await
            .get(resource_name)
            .copied()
            .unwrap_or_else(|| self.default_ttl())
    }

    pub async fn set_resource_ttl(&self, resource_name: &str, ttl_seconds: u64) {
        self.resource_ttls
            .write()
            .await
            .insert(resource_name.to_string(), ttl_seconds);
    }
}

impl Drop for CacheManager {
    fn drop(&mut self) {
        self.cleanup_handle.abort();
    }
}

// == Key Helpers ==
/// Path component of a resource URI. Custom-scheme URIs such as
/// `metal://machine/abc` parse their first segment as the host, so the key
/// path is host + path.
fn resource_path(uri: &Url) -> String {
    match uri.host_str() {
        Some(host) => format!("{}{}", host, uri.path()),
        None => uri.path().trim_start_matches('/').to_string(),
    }
}

/// Query parameters serialized canonically: filtered by the allow-list when
/// given, sorted by name, joined as `a=1&b=2`.
fn canonical_query(uri: &Url, allow: Option<&[String]>) -> String {
    let mut pairs: Vec<(String, String)> = uri
        .query_pairs()
        .filter(|(name, _)| allow.map_or(true, |list| list.iter().any(|a| a == name)))
        .map(|(name, value)| (name.into_owned(), value.into_owned()))
        .collect();
    pairs.sort();

    let mut query = String::new();
    for (name, value) in pairs {
        if !query.is_empty() {
            query.push('&');
        }
        query.push_str(&name);
        query.push('=');
        query.push_str(&value);
    }
    query
}
