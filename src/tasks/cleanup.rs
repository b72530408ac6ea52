//! TTL Cleanup Task
//!
//! Background task that periodically removes expired cache entries,
//! independent of capacity pressure.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::CacheStrategy;

/// Spawns a background task that periodically sweeps expired entries out of
/// the given strategy.
///
/// The task sleeps for the configured interval between sweeps and takes the
/// strategy's write lock only for the duration of each sweep. It is a
/// detached tokio task, so it never keeps the process alive on its own; the
/// owning `CacheManager` aborts it via the returned handle on disposal.
///
/// # Arguments
/// * `strategy` - shared reference to the strategy to sweep
/// * `interval_secs` - seconds between sweeps
pub fn spawn_cleanup_task(
    strategy: Arc<RwLock<dyn CacheStrategy>>,
    interval_secs: u64,
) -> JoinHandle<()> {
    let interval = Duration::from_secs(interval_secs);

    tokio::spawn(async move {
        info!(interval_secs, "starting TTL cleanup task");

        loop {
            tokio::time::sleep(interval).await;

            let removed = {
                let mut strategy = strategy.write().await;
                strategy.sweep_expired()
            };

            if removed > 0 {
                info!(removed, "TTL cleanup removed expired entries");
            } else {
                debug!("TTL cleanup found no expired entries");
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::TimeBasedStrategy;
    use serde_json::json;

    fn shared_strategy() -> Arc<RwLock<dyn CacheStrategy>> {
        Arc::new(RwLock::new(TimeBasedStrategy::new(100)))
    }

    #[tokio::test]
    async fn test_cleanup_task_removes_expired_entries() {
        let strategy = shared_strategy();

        {
            let mut guard = strategy.write().await;
            guard.set("expire_soon".to_string(), json!("value"), 1, None);
        }

        let handle = spawn_cleanup_task(strategy.clone(), 1);

        // Wait for the entry to expire and at least one sweep to run.
        tokio::time::sleep(Duration::from_millis(2500)).await;

        {
            let guard = strategy.read().await;
            assert_eq!(guard.size(), 0, "expired entry should have been swept");
        }

        handle.abort();
    }

    #[tokio::test]
    async fn test_cleanup_task_preserves_valid_entries() {
        let strategy = shared_strategy();

        {
            let mut guard = strategy.write().await;
            guard.set("long_lived".to_string(), json!("value"), 3600, None);
        }

        let handle = spawn_cleanup_task(strategy.clone(), 1);

        tokio::time::sleep(Duration::from_millis(1500)).await;

        {
            let mut guard = strategy.write().await;
            let entry = guard.get("long_lived");
            assert!(entry.is_some(), "valid entry should not be removed");
            assert_eq!(entry.unwrap().value, json!("value"));
        }

        handle.abort();
    }

    #[tokio::test]
    async fn test_cleanup_task_can_be_aborted() {
        let strategy = shared_strategy();

        let handle = spawn_cleanup_task(strategy, 1);

        handle.abort();

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(handle.is_finished(), "task should be finished after abort");
    }
}
