//! Error types for the gateway
//!
//! Provides unified error handling using thiserror.

use std::time::Duration;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use tracing::error;

use crate::models::ErrorResponse;

// == Store Error Enum ==
/// Failures raised by a key-value store backend.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Redis driver or connection failure
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// Store round trip exceeded the configured bound
    #[error("store operation timed out after {0:?}")]
    Timeout(Duration),

    /// Operation against a key holding the wrong kind of value
    #[error("wrong type of value stored at key '{0}'")]
    WrongType(String),

    /// Key rejected by the backend
    #[error("invalid key: {0}")]
    InvalidKey(String),

    /// Value rejected by the backend
    #[error("value too large: {0} bytes")]
    ValueTooLarge(usize),

    /// Concurrent writers kept replacing the record during a field merge
    #[error("record at key '{0}' kept changing during update")]
    Contended(String),

    /// Backend could not be configured
    #[error("invalid store configuration: {0}")]
    Config(String),
}

/// Convenience Result type for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

// == App Error Enum ==
/// Unified error type for HTTP handlers.
#[derive(Error, Debug)]
pub enum AppError {
    /// Malformed body or missing required field
    #[error("{0}")]
    InvalidRequest(String),

    /// Record or key not present in the store
    #[error("{0}")]
    NotFound(String),

    /// Dependent store failed
    #[error("{0}")]
    Store(#[from] StoreError),

    /// Internal server error
    #[error("{0}")]
    Internal(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::InvalidRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::Store(err @ (StoreError::InvalidKey(_) | StoreError::ValueTooLarge(_))) => {
                (StatusCode::BAD_REQUEST, err.to_string())
            }
            AppError::Store(err) => {
                error!(error = %err, "store operation failed");
                (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
            }
            AppError::Internal(msg) => {
                error!(error = %msg, "internal error");
                (StatusCode::INTERNAL_SERVER_ERROR, msg.clone())
            }
        };

        let body = Json(ErrorResponse::new(message));

        (status, body).into_response()
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Internal(format!("malformed stored record: {}", err))
    }
}

// == Result Type Alias ==
/// Convenience Result type for handlers.
pub type Result<T> = std::result::Result<T, AppError>;
