//! Cache Strategy Interface
//!
//! The capability interface shared by the eviction policies. The manager
//! owns exactly one implementation behind a single `RwLock`; every method
//! here runs synchronously under that lock, so implementations never block
//! or suspend.

use regex::Regex;
use serde_json::Value;

use crate::cache::{CacheEntry, CacheStats};

// == Cache Strategy Trait ==
/// A size-bounded, TTL-aware key-value store with one eviction policy.
///
/// Implementations must uphold the shared contract:
/// - `size()` never exceeds the configured capacity after a `set` returns
/// - an entry whose expiry has passed is treated as absent everywhere
/// - invalidation patterns are matched against the whole key string
pub trait CacheStrategy: Send + Sync {
    /// Looks up a live entry.
    ///
    /// An expired entry is removed on sight and reported as a miss,
    /// indistinguishable from a key that was never cached.
    fn get(&mut self, key: &str) -> Option<CacheEntry>;

    /// Stores a value under `key` with the given TTL, evicting one entry
    /// according to the policy if a new key would exceed capacity.
    ///
    /// Overwriting an existing key never evicts: cardinality cannot grow.
    /// Returns the entry as stored.
    fn set(
        &mut self,
        key: String,
        value: Value,
        ttl_seconds: u64,
        cache_control: Option<Value>,
    ) -> CacheEntry;

    /// Removes an entry by key. Returns whether an entry was present.
    fn delete(&mut self, key: &str) -> bool;

    /// Removes every entry.
    fn clear(&mut self);

    /// Returns the number of entries currently occupying storage,
    /// expired-but-unswept entries included.
    fn size(&self) -> usize;

    /// Removes every entry whose whole key matches `pattern`.
    ///
    /// Returns the number of entries removed.
    fn invalidate(&mut self, pattern: &Regex) -> usize;

    /// Removes every expired entry regardless of capacity pressure.
    ///
    /// Called periodically by the background cleanup task. Returns the
    /// number of entries removed.
    fn sweep_expired(&mut self) -> usize;

    /// Returns a snapshot of the performance counters.
    fn stats(&self) -> CacheStats;
}
