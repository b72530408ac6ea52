//! Integration Tests for the Cache Manager
//!
//! Exercises the full facade through the public API: TTL resolution,
//! eviction policy differences, invalidation precision, and the disabled
//! no-op behavior.

use std::time::Duration;

use serde_json::json;

use metalcache::{CacheManager, Config, SetOptions, StrategyKind};

// == Helper Functions ==

fn manager_with(strategy: StrategyKind, max_size: usize) -> CacheManager {
    CacheManager::new(&Config {
        cache_strategy: strategy,
        cache_max_size: max_size,
        cache_max_age: 300,
        ..Config::default()
    })
}

// == Round Trip ==

#[tokio::test]
async fn test_round_trip_preserves_nested_values() {
    let manager = manager_with(StrategyKind::TimeBased, 100);

    let value = json!({
        "system_id": "abc123",
        "status": "deployed",
        "tags": ["web", "prod"],
        "power": {"state": "on", "driver": "ipmi"}
    });
    manager.set("machine:abc123", value.clone(), None, None).await;

    assert_eq!(manager.get("machine:abc123").await, Some(value));
}

// == TTL Behavior ==

#[tokio::test]
async fn test_entry_expires_after_ttl() {
    let manager = manager_with(StrategyKind::TimeBased, 100);

    let options = SetOptions {
        ttl: Some(1),
        ..SetOptions::default()
    };
    manager.set("short", json!(1), None, Some(options)).await;

    assert!(manager.get("short").await.is_some());

    tokio::time::sleep(Duration::from_millis(1100)).await;

    assert!(
        manager.get("short").await.is_none(),
        "entry should be gone once its TTL elapsed"
    );
}

#[tokio::test]
async fn test_ttl_precedence_chain() {
    let manager = manager_with(StrategyKind::TimeBased, 100);
    manager.set_resource_ttl("Machine", 60).await;

    let entry = manager
        .set("machine:a", json!(1), Some("Machine"), None)
        .await
        .unwrap();
    assert_eq!(entry.expires_at - entry.created_at, 60_000);

    let options = SetOptions {
        ttl: Some(10),
        ..SetOptions::default()
    };
    let entry = manager
        .set("machine:b", json!(2), Some("Machine"), Some(options))
        .await
        .unwrap();
    assert_eq!(
        entry.expires_at - entry.created_at,
        10_000,
        "a per-call TTL wins over the resource-specific one"
    );

    let entry = manager
        .set("subnet:a", json!(3), Some("Subnet"), None)
        .await
        .unwrap();
    assert_eq!(
        entry.expires_at - entry.created_at,
        300_000,
        "unknown resources fall back to the default TTL"
    );
}

// == Eviction Policies ==

#[tokio::test]
async fn test_lru_read_protects_entry_from_eviction() {
    let manager = manager_with(StrategyKind::Lru, 2);

    manager.set("a", json!(1), None, None).await;
    manager.set("b", json!(2), None, None).await;
    manager.get("a").await;
    manager.set("c", json!(3), None, None).await;

    assert!(manager.get("a").await.is_some());
    assert!(manager.get("b").await.is_none());
    assert!(manager.get("c").await.is_some());
}

#[tokio::test]
async fn test_time_based_read_does_not_protect_entry() {
    let manager = manager_with(StrategyKind::TimeBased, 2);

    manager.set("a", json!(1), None, None).await;
    manager.set("b", json!(2), None, None).await;
    manager.get("a").await;
    manager.set("c", json!(3), None, None).await;

    assert!(manager.get("a").await.is_none());
    assert!(manager.get("b").await.is_some());
    assert!(manager.get("c").await.is_some());
}

#[tokio::test]
async fn test_size_bound_holds_under_churn() {
    let manager = manager_with(StrategyKind::Lru, 5);

    for i in 0..50 {
        manager.set(&format!("machine:{i}"), json!(i), None, None).await;
        assert!(manager.size().await <= 5);
    }
}

// == Invalidation ==

#[tokio::test]
async fn test_invalidate_resource_spares_sibling_families() {
    let manager = manager_with(StrategyKind::TimeBased, 100);
    manager.set("machine:1", json!(1), None, None).await;
    manager.set("machine:2", json!(2), None, None).await;
    manager.set("machines:list", json!([]), None, None).await;

    let removed = manager.invalidate_resource("machine").await.unwrap();

    assert_eq!(removed, 2);
    assert!(manager.get("machine:1").await.is_none());
    assert!(manager.get("machine:2").await.is_none());
    assert!(
        manager.get("machines:list").await.is_some(),
        "the plural family must survive"
    );
}

#[tokio::test]
async fn test_invalidate_resource_by_id_spares_other_ids() {
    let manager = manager_with(StrategyKind::Lru, 100);
    manager.set("machine:details:xyz", json!(1), None, None).await;
    manager.set("machine:details:abc", json!(2), None, None).await;
    manager.set("machines:list", json!([]), None, None).await;

    let removed = manager
        .invalidate_resource_by_id("machine", "xyz")
        .await
        .unwrap();

    assert_eq!(removed, 1);
    assert!(manager.get("machine:details:abc").await.is_some());
    assert!(manager.get("machines:list").await.is_some());
}

#[tokio::test]
async fn test_invalidate_malformed_pattern_errors() {
    let manager = manager_with(StrategyKind::TimeBased, 100);
    manager.set("machine:1", json!(1), None, None).await;

    assert!(manager.invalidate("(never closed").await.is_err());
    assert_eq!(manager.size().await, 1, "nothing may be removed on error");
}

// == Disabled Cache ==

#[tokio::test]
async fn test_disabled_manager_misses_without_losing_storage() {
    let manager = manager_with(StrategyKind::TimeBased, 100);
    manager.set("k", json!(1), None, None).await;

    manager.set_enabled(false);

    assert!(manager.get("k").await.is_none());
    assert!(manager.set("other", json!(2), None, None).await.is_none());
    assert_eq!(manager.invalidate_resource("k").await.unwrap(), 0);
    assert_eq!(manager.size().await, 1, "storage is untouched while disabled");

    manager.set_enabled(true);
    assert!(manager.get("k").await.is_some(), "entry reappears when re-enabled");
}

// == Clear ==

#[tokio::test]
async fn test_clear_twice_equals_clear_once() {
    let manager = manager_with(StrategyKind::Lru, 100);
    manager.set("a", json!(1), None, None).await;
    manager.set("b", json!(2), None, None).await;

    manager.clear().await;
    assert_eq!(manager.size().await, 0);

    manager.clear().await;
    assert_eq!(manager.size().await, 0);
}
