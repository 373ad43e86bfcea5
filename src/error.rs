//! Error types for the cache
//!
//! Provides unified error handling using thiserror. Admission rejections are
//! advisory: callers that treat the cache as best-effort may ignore them.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::models::ErrorResponse;

// == Cache Error Enum ==
/// Unified error type for the cache engine and its HTTP surface.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CacheError {
    /// Entry cannot be scored (zero size, negative or non-finite cost)
    #[error("Invalid entry: {0}")]
    InvalidEntry(String),

    /// Cost per byte is below the configured admission limit
    #[error("Below cost limit: {ratio} < {limit}")]
    BelowCostLimit { ratio: f64, limit: f64 },

    /// Entry does not fit even in an empty cache
    #[error("Entry too large: {nbytes} bytes exceeds budget of {available_bytes} bytes")]
    EntryTooLarge { nbytes: u64, available_bytes: u64 },

    /// Construction-time configuration is unusable
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Key not found in cache
    #[error("Key not found: {0}")]
    NotFound(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl CacheError {
    /// Returns true for rejections that leave the cache untouched and that a
    /// best-effort caller can safely ignore.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            CacheError::BelowCostLimit { .. } | CacheError::EntryTooLarge { .. }
        )
    }
}

// == Internal Eviction Signal ==
/// Raised when the index runs dry while the store is still over budget.
///
/// Never leaves `CacheStore`; it is translated into `EntryTooLarge`.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("budget unsatisfiable: index exhausted with {excess} bytes over budget")]
pub(crate) struct BudgetUnsatisfiable {
    pub excess: u64,
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let status = match &self {
            CacheError::NotFound(_) => StatusCode::NOT_FOUND,
            CacheError::InvalidEntry(_) | CacheError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            CacheError::InvalidConfig(_) => StatusCode::INTERNAL_SERVER_ERROR,
            // Admission rejections are advisory: the caller keeps its value.
            CacheError::BelowCostLimit { .. } | CacheError::EntryTooLarge { .. } => {
                let body = Json(json!({ "admitted": false, "reason": self.to_string() }));
                return (StatusCode::OK, body).into_response();
            }
        };

        let body = Json(ErrorResponse::new(self.to_string()));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the cache.
pub type Result<T> = std::result::Result<T, CacheError>;
