//! Response DTOs for the gateway API
//!
//! Defines the structure of outgoing HTTP response bodies.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::Serialize;

/// Response body for POST /api/v1/upload/prepare
#[derive(Debug, Clone, Serialize)]
pub struct PrepareUploadResponse {
    pub job_id: String,
    /// Where the client should send the file
    pub upload_url: String,
    /// Unix seconds after which the upload record is gone
    pub expires_at: i64,
}

impl PrepareUploadResponse {
    pub fn new(job_id: impl Into<String>, expires_at: i64) -> Self {
        let job_id = job_id.into();
        Self {
            upload_url: format!("/upload/{}", job_id),
            job_id,
            expires_at,
        }
    }
}

/// Job ID plus its status after the operation, shared by upload complete,
/// job create and job cancel.
#[derive(Debug, Clone, Serialize)]
pub struct JobStatusResponse {
    pub job_id: String,
    pub status: String,
}

impl JobStatusResponse {
    pub fn new(job_id: impl Into<String>, status: impl Into<String>) -> Self {
        Self {
            job_id: job_id.into(),
            status: status.into(),
        }
    }
}

/// Response body for GET /api/v1/cache/:key
#[derive(Debug, Clone, Serialize)]
pub struct CacheValueResponse {
    pub key: String,
    /// The raw stored string
    pub value: String,
}

impl CacheValueResponse {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Response body for cache set and delete
#[derive(Debug, Clone, Serialize)]
pub struct CacheStatusResponse {
    pub key: String,
    pub status: String,
}

impl CacheStatusResponse {
    pub fn set(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            status: "set".to_string(),
        }
    }

    pub fn deleted(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            status: "deleted".to_string(),
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// "healthy", or "degraded" in strict mode with a failing dependency
    pub status: String,
    pub service: String,
    pub version: String,
    /// Process uptime, e.g. `1h2m3s`
    pub uptime: String,
    /// Dependency name to "healthy" / "unhealthy"
    pub resources: BTreeMap<String, String>,
}

/// Response body for the unimplemented utility endpoints
#[derive(Debug, Clone, Serialize)]
pub struct PlaceholderResponse {
    pub message: String,
    /// Always "not_implemented"
    pub status: String,
}

impl PlaceholderResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status: "not_implemented".to_string(),
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

/// Formats an uptime as hours, minutes and seconds, dropping leading zero units.
pub fn format_uptime(uptime: Duration) -> String {
    let total = uptime.as_secs();
    let (hours, minutes, seconds) = (total / 3600, (total % 3600) / 60, total % 60);

    if hours > 0 {
        format!("{}h{}m{}s", hours, minutes, seconds)
    } else if minutes > 0 {
        format!("{}m{}s", minutes, seconds)
    } else {
        format!("{}s", seconds)
    }
}
