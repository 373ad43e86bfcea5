//! Request DTOs for the cache server API
//!
//! Defines the structure of incoming HTTP request bodies.

use serde::Deserialize;

/// Maximum allowed key length in bytes
pub const MAX_KEY_LENGTH: usize = 256;

/// Request body for the PUT operation (PUT /put)
///
/// # Fields
/// - `key`: The cache key to store the value under
/// - `value`: The value to store
/// - `cost`: Seconds it took the caller to produce `value`
/// - `nbytes`: Optional size override (defaults to the value's byte length)
#[derive(Debug, Clone, Deserialize)]
pub struct PutRequest {
    /// The cache key
    pub key: String,
    /// The value to store
    pub value: String,
    /// Recomputation cost in seconds
    pub cost: f64,
    /// Optional explicit size in bytes
    #[serde(default)]
    pub nbytes: Option<u64>,
}

impl PutRequest {
    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.key.is_empty() {
            return Some("Key cannot be empty".to_string());
        }
        if self.key.len() > MAX_KEY_LENGTH {
            return Some(format!(
                "Key exceeds maximum length of {} bytes",
                MAX_KEY_LENGTH
            ));
        }
        None
    }
}
