//! Time-Based Strategy Module
//!
//! Insertion-ordered eviction policy: when a new key arrives at capacity,
//! the oldest-inserted entry is removed. Reads never reorder anything, so a
//! frequently-read entry still ages out in insertion order.

use std::collections::{HashMap, VecDeque};

use regex::Regex;
use serde_json::Value;
use tracing::debug;

use crate::cache::{CacheEntry, CacheStats, CacheStrategy};

// == Time-Based Strategy ==
/// Size-bounded store evicting in insertion order.
///
/// Keys are queued front = oldest inserted, back = newest. The queue only
/// ever contains keys that are present in the index; every removal path
/// keeps the two in sync.
#[derive(Debug)]
pub struct TimeBasedStrategy {
    /// Key-value storage
    entries: HashMap<String, CacheEntry>,
    /// Insertion order of live keys
    order: VecDeque<String>,
    /// Performance statistics
    stats: CacheStats,
    /// Maximum number of entries allowed
    max_size: usize,
}

impl TimeBasedStrategy {
    // == Constructor ==
    /// Creates a new empty strategy bounded at `max_size` entries.
    pub fn new(max_size: usize) -> Self {
        Self {
            entries: HashMap::new(),
            order: VecDeque::new(),
            stats: CacheStats::new(),
            max_size,
        }
    }

    /// Drops queued keys that no longer exist in the index.
    fn sync_order(&mut self) {
        let entries = &self.entries;
        self.order.retain(|key| entries.contains_key(key));
    }
}

impl CacheStrategy for TimeBasedStrategy {
    // == Get ==
    /// Looks up a key without touching its insertion-order position.
    ///
    /// Expired entries are removed on sight and counted as misses.
    fn get(&mut self, key: &str) -> Option<CacheEntry> {
        if let Some(entry) = self.entries.get(key) {
            if entry.is_expired() {
                self.entries.remove(key);
                self.sync_order();
                self.stats.set_total_entries(self.entries.len());
                self.stats.record_miss();
                return None;
            }

            let entry = entry.clone();
            self.stats.record_hit();
            Some(entry)
        } else {
            self.stats.record_miss();
            None
        }
    }

    // == Set ==
    /// Stores a key-value pair with the given TTL.
    ///
    /// An existing key is overwritten in place and keeps its queue position;
    /// only a fresh insert at capacity evicts the oldest-inserted entry.
    fn set(
        &mut self,
        key: String,
        value: Value,
        ttl_seconds: u64,
        cache_control: Option<Value>,
    ) -> CacheEntry {
        let is_overwrite = self.entries.contains_key(&key);

        if !is_overwrite && self.entries.len() >= self.max_size {
            if let Some(evicted_key) = self.order.pop_front() {
                self.entries.remove(&evicted_key);
                self.stats.record_eviction();
                debug!(key = %evicted_key, "evicted oldest-inserted entry");
            }
        }

        let entry = CacheEntry::new(key.clone(), value, ttl_seconds, cache_control);
        self.entries.insert(key.clone(), entry.clone());
        if !is_overwrite {
            self.order.push_back(key);
        }

        self.stats.set_total_entries(self.entries.len());
        entry
    }

    // == Delete ==
    fn delete(&mut self, key: &str) -> bool {
        if self.entries.remove(key).is_some() {
            self.sync_order();
            self.stats.set_total_entries(self.entries.len());
            true
        } else {
            false
        }
    }

    // == Clear ==
    fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
        self.stats.set_total_entries(0);
    }

    // == Size ==
    fn size(&self) -> usize {
        self.entries.len()
    }

    // == Invalidate ==
    /// Removes every entry whose whole key matches the pattern.
    fn invalidate(&mut self, pattern: &Regex) -> usize {
        let matching: Vec<String> = self
            .entries
            .keys()
            .filter(|key| pattern.is_match(key))
            .cloned()
            .collect();

        for key in &matching {
            self.entries.remove(key);
        }
        self.sync_order();
        self.stats.set_total_entries(self.entries.len());

        debug!(pattern = %pattern, count = matching.len(), "invalidated entries");
        matching.len()
    }

    // == Sweep Expired ==
    fn sweep_expired(&mut self) -> usize {
        let expired: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired())
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired {
            self.entries.remove(key);
        }
        self.sync_order();
        self.stats.set_total_entries(self.entries.len());

        expired.len()
    }

    // == Stats ==
    fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.entries.len());
        stats
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::thread::sleep;
    use std::time::Duration;

    fn pattern(raw: &str) -> Regex {
        Regex::new(raw).unwrap()
    }

    #[test]
    fn test_new_is_empty() {
        let strategy = TimeBasedStrategy::new(100);
        assert_eq!(strategy.size(), 0);
    }

    #[test]
    fn test_set_and_get() {
        let mut strategy = TimeBasedStrategy::new(100);

        strategy.set("machine:abc".to_string(), json!({"cpu": 4}), 300, None);
        let entry = strategy.get("machine:abc").unwrap();

        assert_eq!(entry.value, json!({"cpu": 4}));
        assert_eq!(strategy.size(), 1);
    }

    #[test]
    fn test_get_missing_key() {
        let mut strategy = TimeBasedStrategy::new(100);
        assert!(strategy.get("nope").is_none());
        assert_eq!(strategy.stats().misses, 1);
    }

    #[test]
    fn test_delete() {
        let mut strategy = TimeBasedStrategy::new(100);

        strategy.set("k".to_string(), json!(1), 300, None);
        assert!(strategy.delete("k"));
        assert!(!strategy.delete("k"));
        assert_eq!(strategy.size(), 0);
    }

    #[test]
    fn test_overwrite_replaces_value() {
        let mut strategy = TimeBasedStrategy::new(100);

        strategy.set("k".to_string(), json!(1), 300, None);
        strategy.set("k".to_string(), json!(2), 300, None);

        assert_eq!(strategy.get("k").unwrap().value, json!(2));
        assert_eq!(strategy.size(), 1);
    }

    #[test]
    fn test_ttl_expiration_on_get() {
        let mut strategy = TimeBasedStrategy::new(100);

        strategy.set("k".to_string(), json!(1), 1, None);
        assert!(strategy.get("k").is_some());

        sleep(Duration::from_millis(1100));

        assert!(strategy.get("k").is_none());
        assert_eq!(strategy.size(), 0, "expired entry should have been removed");
    }

    #[test]
    fn test_eviction_is_insertion_order_not_access_order() {
        let mut strategy = TimeBasedStrategy::new(2);

        strategy.set("a".to_string(), json!(1), 300, None);
        strategy.set("b".to_string(), json!(2), 300, None);

        // Reading `a` must not protect it: this policy ignores recency.
        assert!(strategy.get("a").is_some());

        strategy.set("c".to_string(), json!(3), 300, None);

        assert!(strategy.get("a").is_none(), "oldest-inserted should be evicted");
        assert!(strategy.get("b").is_some());
        assert!(strategy.get("c").is_some());
        assert_eq!(strategy.stats().evictions, 1);
    }

    #[test]
    fn test_overwrite_at_capacity_does_not_evict() {
        let mut strategy = TimeBasedStrategy::new(2);

        strategy.set("a".to_string(), json!(1), 300, None);
        strategy.set("b".to_string(), json!(2), 300, None);
        strategy.set("a".to_string(), json!(10), 300, None);

        assert_eq!(strategy.size(), 2);
        assert_eq!(strategy.stats().evictions, 0);
        assert_eq!(strategy.get("a").unwrap().value, json!(10));
        assert!(strategy.get("b").is_some());
    }

    #[test]
    fn test_overwrite_keeps_insertion_position() {
        let mut strategy = TimeBasedStrategy::new(2);

        strategy.set("a".to_string(), json!(1), 300, None);
        strategy.set("b".to_string(), json!(2), 300, None);
        // Overwriting `a` must not move it to the back of the queue.
        strategy.set("a".to_string(), json!(10), 300, None);
        strategy.set("c".to_string(), json!(3), 300, None);

        assert!(strategy.get("a").is_none(), "a is still the oldest insert");
        assert!(strategy.get("b").is_some());
        assert!(strategy.get("c").is_some());
    }

    #[test]
    fn test_invalidate_by_pattern() {
        let mut strategy = TimeBasedStrategy::new(100);

        strategy.set("machine:1".to_string(), json!(1), 300, None);
        strategy.set("machine:2".to_string(), json!(2), 300, None);
        strategy.set("machines:list".to_string(), json!([]), 300, None);

        let removed = strategy.invalidate(&pattern("^machine:"));

        assert_eq!(removed, 2);
        assert_eq!(strategy.size(), 1);
        assert!(strategy.get("machines:list").is_some());
    }

    #[test]
    fn test_clear_is_idempotent() {
        let mut strategy = TimeBasedStrategy::new(100);

        strategy.set("k".to_string(), json!(1), 300, None);
        strategy.clear();
        strategy.clear();

        assert_eq!(strategy.size(), 0);
    }

    #[test]
    fn test_sweep_expired() {
        let mut strategy = TimeBasedStrategy::new(100);

        strategy.set("short".to_string(), json!(1), 1, None);
        strategy.set("long".to_string(), json!(2), 300, None);

        sleep(Duration::from_millis(1100));

        let removed = strategy.sweep_expired();
        assert_eq!(removed, 1);
        assert_eq!(strategy.size(), 1);
        assert!(strategy.get("long").is_some());
    }

    #[test]
    fn test_eviction_after_expired_removal() {
        let mut strategy = TimeBasedStrategy::new(2);

        strategy.set("a".to_string(), json!(1), 1, None);
        strategy.set("b".to_string(), json!(2), 300, None);

        sleep(Duration::from_millis(1100));
        strategy.sweep_expired();

        // Queue must not remember the swept key; `b` is now the oldest.
        strategy.set("c".to_string(), json!(3), 300, None);
        strategy.set("d".to_string(), json!(4), 300, None);

        assert!(strategy.get("b").is_none());
        assert!(strategy.get("c").is_some());
        assert!(strategy.get("d").is_some());
    }
}
