//! Cost Cache - A bounded-memory result cache
//!
//! Keeps results that are expensive to recompute and cheap to store, scoring
//! each entry by cost per byte, access frequency and recency, and evicting the
//! lowest-scored entries whenever the byte budget is exceeded.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod memo;
pub mod models;
pub mod tasks;

pub use api::AppState;
pub use cache::{shared, CacheStore, SharedCache};
pub use config::{CacheConfig, Config};
pub use error::{CacheError, Result};
pub use memo::{Memoized, Nbytes, SizeEstimator};
pub use tasks::spawn_stats_reporter;
