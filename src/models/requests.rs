//! Request DTOs for the cache service API
//!
//! Defines the structure of incoming HTTP request bodies and query strings.

use std::time::Duration;

use serde::Deserialize;
use serde_json::Value;

/// Maximum allowed key length in bytes
pub const MAX_KEY_LENGTH: usize = 256;

/// Checks a client-supplied key. Returns an error message if it is rejected.
pub fn validate_key(key: &str) -> Option<String> {
    if key.is_empty() {
        return Some("Key cannot be empty".to_string());
    }
    if key.len() > MAX_KEY_LENGTH {
        return Some(format!(
            "Key exceeds maximum length of {} bytes",
            MAX_KEY_LENGTH
        ));
    }
    None
}

/// Request body for the SET operation (PUT /set), also used per item by PUT /mset
#[derive(Debug, Clone, Deserialize)]
pub struct SetRequest {
    /// The cache key
    pub key: String,
    /// The value to store; JSON `null` is a real value
    pub value: Value,
    /// Optional TTL in milliseconds; zero or negative stores an already-expired entry
    #[serde(default)]
    pub ttl_ms: Option<i64>,
}

impl SetRequest {
    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        validate_key(&self.key)
    }

    /// TTL as a duration, with negative values clamped to zero.
    pub fn ttl(&self) -> Option<Duration> {
        self.ttl_ms
            .map(|ms| Duration::from_millis(u64::try_from(ms).unwrap_or(0)))
    }
}

/// Request body for POST /extend/:key
#[derive(Debug, Clone, Deserialize)]
pub struct ExtendRequest {
    pub additional_ms: u64,
}

/// Request body for POST /mget and POST /mdel
#[derive(Debug, Clone, Deserialize)]
pub struct KeysRequest {
    pub keys: Vec<String>,
}

/// Request body for PUT /mset
#[derive(Debug, Clone, Deserialize)]
pub struct MsetRequest {
    pub entries: Vec<SetRequest>,
}

impl MsetRequest {
    /// Returns the first validation failure, if any.
    pub fn validate(&self) -> Option<String> {
        self.entries.iter().find_map(SetRequest::validate)
    }
}

/// Query string for GET /keys and the /match endpoints
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PatternQuery {
    /// Regular expression matched against keys
    pub pattern: Option<String>,
}
