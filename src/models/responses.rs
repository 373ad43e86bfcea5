//! Response DTOs for the cache server API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;

use crate::cache::CacheStats;

/// Response body for the GET operation (GET /get/:key)
#[derive(Debug, Clone, Serialize)]
pub struct GetResponse {
    /// The requested key
    pub key: String,
    /// The stored value
    pub value: String,
}

impl GetResponse {
    /// Creates a new GetResponse
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Response body for the PUT operation (PUT /put)
///
/// Admission is advisory: a rejected put is still a successful request.
#[derive(Debug, Clone, Serialize)]
pub struct PutResponse {
    /// The key that was put
    pub key: String,
    /// Whether the value is in the cache after the put
    pub admitted: bool,
    /// Keys evicted to make room
    pub evicted: Vec<String>,
    /// Why the value was not admitted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl PutResponse {
    /// Creates a response for a put that ran the eviction loop.
    pub fn stored(key: impl Into<String>, admitted: bool, evicted: Vec<String>) -> Self {
        Self {
            key: key.into(),
            admitted,
            evicted,
            reason: None,
        }
    }

    /// Creates a response for a put the cache declined.
    pub fn rejected(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            admitted: false,
            evicted: Vec::new(),
            reason: Some(reason.into()),
        }
    }
}

/// Response body for the REMOVE operation (DELETE /remove/:key)
#[derive(Debug, Clone, Serialize)]
pub struct RemoveResponse {
    /// The key that was removed
    pub key: String,
    /// Whether an entry was present
    pub removed: bool,
}

impl RemoveResponse {
    /// Creates a new RemoveResponse
    pub fn new(key: impl Into<String>, removed: bool) -> Self {
        Self {
            key: key.into(),
            removed,
        }
    }
}

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    /// Number of cache hits
    pub hits: u64,
    /// Number of cache misses
    pub misses: u64,
    /// Number of evictions
    pub evictions: u64,
    /// Number of rejected puts
    pub rejections: u64,
    /// Current number of entries in cache
    pub total_entries: usize,
    /// Current number of stored bytes
    pub total_bytes: u64,
    /// Byte budget
    pub available_bytes: u64,
    /// Total scored accesses
    pub tick: u64,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
}

impl StatsResponse {
    /// Creates a new StatsResponse from cache statistics
    pub fn new(stats: &CacheStats, available_bytes: u64, tick: u64) -> Self {
        Self {
            hits: stats.hits,
            misses: stats.misses,
            evictions: stats.evictions,
            rejections: stats.rejections,
            total_entries: stats.total_entries,
            total_bytes: stats.total_bytes,
            available_bytes,
            tick,
            hit_rate: stats.hit_rate(),
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error message describing what went wrong
    pub error: String,
}

impl ErrorResponse {
    /// Creates a new ErrorResponse
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
