//! API Handlers
//!
//! HTTP request handlers for each cache server endpoint.

use std::sync::Arc;
use tokio::sync::RwLock;

use axum::{
    extract::{Path, State},
    Json,
};

use crate::cache::CacheStore;
use crate::config::CacheConfig;
use crate::error::{CacheError, Result};
use crate::memo::{DeepSize, SizeEstimator};
use crate::models::{
    GetResponse, HealthResponse, PutRequest, PutResponse, RemoveResponse, StatsResponse,
};

/// Application state shared across all handlers.
///
/// Every operation that scores an access takes the write lock, so each
/// get or put (eviction included) runs atomically.
#[derive(Clone)]
pub struct AppState {
    /// Thread-safe cache store
    pub cache: Arc<RwLock<CacheStore<String, String>>>,
}

impl AppState {
    /// Creates a new AppState with the given cache store.
    pub fn new(cache: CacheStore<String, String>) -> Self {
        Self {
            cache: Arc::new(RwLock::new(cache)),
        }
    }

    /// Creates a new AppState from configuration.
    pub fn from_config(config: CacheConfig) -> Result<Self> {
        Ok(Self::new(CacheStore::new(config)?))
    }
}

/// Handler for PUT /put
///
/// Offers a value to the cache. Rejections by the admission policy are
/// reported in the body, not as HTTP errors.
pub async fn put_handler(
    State(state): State<AppState>,
    Json(req): Json<PutRequest>,
) -> Result<Json<PutResponse>> {
    // Validate request
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let nbytes = req.nbytes.unwrap_or_else(|| DeepSize.estimate(&req.value));

    let mut cache = state.cache.write().await;
    match cache.put(req.key.clone(), req.value, nbytes, req.cost) {
        Ok(evicted) => {
            let admitted = cache.contains_key(&req.key);
            Ok(Json(PutResponse::stored(req.key, admitted, evicted)))
        }
        Err(err) if err.is_rejection() => Ok(Json(PutResponse::rejected(req.key, err.to_string()))),
        Err(err) => Err(err),
    }
}

/// Handler for GET /get/:key
///
/// Retrieves a value from the cache by key.
pub async fn get_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<GetResponse>> {
    // Acquire write lock (hits update scores and stats)
    let mut cache = state.cache.write().await;
    let value = cache
        .get(&key)
        .cloned()
        .ok_or_else(|| CacheError::NotFound(key.clone()))?;

    Ok(Json(GetResponse::new(key, value)))
}

/// Handler for DELETE /remove/:key
///
/// Removes a key from the cache. Removing an absent key succeeds.
pub async fn remove_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Json<RemoveResponse> {
    let mut cache = state.cache.write().await;
    let removed = cache.remove(&key).is_some();

    Json(RemoveResponse::new(key, removed))
}

/// Handler for GET /stats
///
/// Returns current cache statistics.
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    // Acquire read lock for stats
    let cache = state.cache.read().await;
    let stats = cache.stats();

    Json(StatsResponse::new(&stats, cache.available_bytes(), cache.tick()))
}

/// Handler for GET /health
///
/// Returns health status of the server.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
