//! Cache Module
//!
//! Byte-bounded caching with cost-aware scoring and lazy eviction.
//!
//! Each access adds `(compute_cost / nbytes) * (1 + ε)^tick` to an entry's
//! score; when the byte budget is exceeded the lowest-scored entries go first.

mod clock;
mod entry;
mod index;
mod score;
mod stats;
mod store;


// Re-export public types
pub use clock::Clock;
pub use entry::CacheEntry;
pub use index::LazyPriorityIndex;
pub use score::{cost_ratio, ScoreFunction, DEFAULT_HALFLIFE, MAX_COST_RATIO, REBASE_THRESHOLD};
pub use stats::CacheStats;
pub use store::CacheStore;

/// Shared, exclusively locked cache handle for multi-threaded callers.
///
/// The lock covers a whole `get` or `put` including its eviction loop.
pub type SharedCache<K, V> = std::sync::Arc<parking_lot::Mutex<CacheStore<K, V>>>;

/// Wraps a store in a [`SharedCache`].
pub fn shared<K, V>(store: CacheStore<K, V>) -> SharedCache<K, V> {
    std::sync::Arc::new(parking_lot::Mutex::new(store))
}
