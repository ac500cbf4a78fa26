//! Request DTOs for the gateway API
//!
//! Defines the structure of incoming HTTP request bodies.

use serde::Deserialize;
use serde_json::Value;

use crate::models::records::JobParameters;

/// Default cache TTL in seconds when the client does not send one.
pub const DEFAULT_CACHE_TTL: u64 = 3600;

/// Request body for POST /api/v1/upload/prepare
///
/// Every field is optional; absent fields default to empty or zero.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PrepareUploadRequest {
    #[serde(default)]
    pub filename: String,
    #[serde(default)]
    pub filesize: i64,
    #[serde(default)]
    pub filetype: String,
}

/// Form body for POST /api/v1/upload/complete
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CompleteUploadForm {
    #[serde(default)]
    pub job_id: String,
}

/// Request body for POST /api/v1/jobs/create
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateJobRequest {
    #[serde(default)]
    pub job_type: String,
    /// Must be a JSON object when present; `null` counts as absent
    #[serde(default)]
    pub parameters: Option<JobParameters>,
}

/// Largest accepted cache TTL in seconds (365 days).
pub const MAX_CACHE_TTL: u64 = 365 * 24 * 60 * 60;

/// Request body for POST /api/v1/cache/:key
///
/// # Fields
/// - `value`: Any JSON value, stored as its JSON text
/// - `ttl`: Optional TTL in seconds (defaults to one hour). Fractions are
///   truncated to whole seconds.
#[derive(Debug, Clone, Deserialize)]
pub struct SetCacheRequest {
    pub value: Value,
    #[serde(default)]
    pub ttl: Option<f64>,
}

impl SetCacheRequest {
    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        let ttl = self.ttl?.trunc();
        if !ttl.is_finite() || ttl < 1.0 {
            return Some("ttl must be at least one second".to_string());
        }
        if ttl > MAX_CACHE_TTL as f64 {
            return Some(format!("ttl must not exceed {} seconds", MAX_CACHE_TTL));
        }
        None
    }

    /// TTL to apply, in whole seconds. Only meaningful after `validate`.
    pub fn effective_ttl(&self) -> u64 {
        self.ttl
            .map(|ttl| ttl.trunc().clamp(1.0, MAX_CACHE_TTL as f64) as u64)
            .unwrap_or(DEFAULT_CACHE_TTL)
    }
}
