//! LRU Strategy Module
//!
//! Recency-based eviction policy: a hash index into an arena-backed doubly
//! linked list. Every read promotes its entry to most-recently-used; when a
//! new key arrives at capacity, the least-recently-used entry is evicted
//! from the tail.

use std::collections::HashMap;

use generational_arena::Index;
use regex::Regex;
use serde_json::Value;
use tracing::debug;

use crate::cache::lru_list::LruList;
use crate::cache::{CacheEntry, CacheStats, CacheStrategy};

// == LRU Strategy ==
/// Size-bounded store evicting in least-recently-used order.
///
/// `lookup` and the list always hold the same key set; the entry stored in
/// each node carries its own key so a tail eviction can clean up the index.
#[derive(Debug)]
pub struct LruStrategy {
    /// Key to arena-index of the node holding its entry
    lookup: HashMap<String, Index>,
    /// Recency list, head = most recently used
    list: LruList,
    /// Performance statistics
    stats: CacheStats,
    /// Maximum number of entries allowed
    max_size: usize,
}

impl LruStrategy {
    // == Constructor ==
    /// Creates a new empty strategy bounded at `max_size` entries.
    pub fn new(max_size: usize) -> Self {
        Self {
            lookup: HashMap::new(),
            list: LruList::new(),
            stats: CacheStats::new(),
            max_size,
        }
    }
}

impl CacheStrategy for LruStrategy {
    // == Get ==
    /// Looks up a key, promoting a live entry to most-recently-used.
    ///
    /// Expired entries are removed from both the index and the list on
    /// sight, and counted as misses.
    fn get(&mut self, key: &str) -> Option<CacheEntry> {
        let index = match self.lookup.get(key) {
            Some(&index) => index,
            None => {
                self.stats.record_miss();
                return None;
            }
        };

        if self.list.entry(index).is_expired() {
            self.list.remove(index);
            self.lookup.remove(key);
            self.stats.set_total_entries(self.lookup.len());
            self.stats.record_miss();
            return None;
        }

        self.list.move_to_front(index);
        self.stats.record_hit();
        Some(self.list.entry(index).clone())
    }

    // == Set ==
    /// Stores a key-value pair with the given TTL.
    ///
    /// An existing key has its old node unlinked first so its stale position
    /// cannot linger; only a fresh insert at capacity evicts the tail.
    fn set(
        &mut self,
        key: String,
        value: Value,
        ttl_seconds: u64,
        cache_control: Option<Value>,
    ) -> CacheEntry {
        if let Some(index) = self.lookup.remove(&key) {
            self.list.remove(index);
        } else if self.list.len() >= self.max_size {
            if let Some(evicted) = self.list.pop_back() {
                self.lookup.remove(&evicted.key);
                self.stats.record_eviction();
                debug!(key = %evicted.key, "evicted least-recently-used entry");
            }
        }

        let entry = CacheEntry::new(key.clone(), value, ttl_seconds, cache_control);
        let index = self.list.push_front(entry.clone());
        self.lookup.insert(key, index);

        self.stats.set_total_entries(self.lookup.len());
        entry
    }

    // == Delete ==
    fn delete(&mut self, key: &str) -> bool {
        if let Some(index) = self.lookup.remove(key) {
            self.list.remove(index);
            self.stats.set_total_entries(self.lookup.len());
            true
        } else {
            false
        }
    }

    // == Clear ==
    fn clear(&mut self) {
        self.lookup.clear();
        self.list.clear();
        self.stats.set_total_entries(0);
    }

    // == Size ==
    fn size(&self) -> usize {
        self.lookup.len()
    }

    // == Invalidate ==
    /// Removes every entry whose whole key matches the pattern.
    ///
    /// Matching keys are collected first, then removed, so the list is never
    /// mutated while it is being scanned.
    fn invalidate(&mut self, pattern: &Regex) -> usize {
        let matching: Vec<String> = self
            .lookup
            .keys()
            .filter(|key| pattern.is_match(key))
            .cloned()
            .collect();

        for key in &matching {
            if let Some(index) = self.lookup.remove(key) {
                self.list.remove(index);
            }
        }
        self.stats.set_total_entries(self.lookup.len());

        debug!(pattern = %pattern, count = matching.len(), "invalidated entries");
        matching.len()
    }

    // == Sweep Expired ==
    /// Walks from the tail towards the head removing expired nodes.
    ///
    /// Stale entries cluster near the tail under typical access patterns,
    /// but every expired node is removed wherever it sits.
    fn sweep_expired(&mut self) -> usize {
        let mut removed = 0;
        let mut current = self.list.tail_index();

        while let Some(index) = current {
            let prev = self.list.prev_index(index);
            if self.list.entry(index).is_expired() {
                let entry = self.list.remove(index);
                self.lookup.remove(&entry.key);
                removed += 1;
            }
            current = prev;
        }

        self.stats.set_total_entries(self.lookup.len());
        removed
    }

    // == Stats ==
    fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.lookup.len());
        stats
    }
}
