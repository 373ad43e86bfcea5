//! Stats Reporter Task
//!
//! Background task that periodically logs cache occupancy and hit rate.

use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::CacheStore;

/// Spawns a background task that logs cache statistics every `interval`.
///
/// The task only takes the read lock, and only long enough to copy the
/// counters.
///
/// # Returns
/// A JoinHandle for the spawned task, which can be used to abort the task
/// during graceful shutdown.
///
/// # Example
/// ```ignore
/// let cache = Arc::new(RwLock::new(CacheStore::<String, String>::with_budget(1 << 20)));
/// let reporter = spawn_stats_reporter(cache.clone(), Duration::from_secs(30));
/// // Later, during shutdown:
/// reporter.abort();
/// ```
pub fn spawn_stats_reporter<K, V>(
    cache: Arc<RwLock<CacheStore<K, V>>>,
    interval: Duration,
) -> JoinHandle<()>
where
    K: Hash + Eq + Clone + Send + Sync + 'static,
    V: Send + Sync + 'static,
{
    tokio::spawn(async move {
        info!(interval_ms = interval.as_millis() as u64, "Starting stats reporter");

        loop {
            tokio::time::sleep(interval).await;

            let (stats, available_bytes, index_len) = {
                let cache_guard = cache.read().await;
                (
                    cache_guard.stats(),
                    cache_guard.available_bytes(),
                    cache_guard.index_len(),
                )
            };

            if stats.hits + stats.misses == 0 {
                debug!("Cache stats: no traffic yet");
                continue;
            }

            info!(
                entries = stats.total_entries,
                total_bytes = stats.total_bytes,
                available_bytes,
                hit_rate = stats.hit_rate(),
                evictions = stats.evictions,
                rejections = stats.rejections,
                index_records = index_len,
                "Cache stats"
            );
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_reporter_does_not_block_writers() {
        let cache = Arc::new(RwLock::new(CacheStore::<String, String>::with_budget(100)));

        let handle = spawn_stats_reporter(cache.clone(), Duration::from_millis(10));

        // Let the reporter run a few rounds, with traffic
        for i in 0..5 {
            {
                let mut cache_guard = cache.write().await;
                cache_guard
                    .put(format!("key{}", i), "value".to_string(), 5, 1.0)
                    .unwrap();
                cache_guard.get("key0");
            }
            tokio::time::sleep(Duration::from_millis(15)).await;
        }

        assert_eq!(cache.read().await.len(), 5);
        handle.abort();
    }

    #[tokio::test]
    async fn test_reporter_can_be_aborted() {
        let cache = Arc::new(RwLock::new(CacheStore::<String, String>::with_budget(100)));

        let handle = spawn_stats_reporter(cache, Duration::from_secs(1));

        // Abort immediately
        handle.abort();

        // Wait a bit and verify task is finished
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(handle.is_finished(), "Task should be finished after abort");
    }
}
