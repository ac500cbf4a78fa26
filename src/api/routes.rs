//! API Routes
//!
//! Configures the Axum router with all gateway endpoints.

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::cache::{delete_cache_value, get_cache_value, set_cache_value};
use super::handlers::{health_handler, metrics_handler, AppState};
use super::jobs::{cancel_job, create_job, job_status};
use super::middleware::track_metrics;
use super::upload::{complete_upload, prepare_upload, upload_status};
use super::utility::{compress_data, convert_format, resize_image};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /health` - Health check with store probe
/// - `GET /metrics` - Prometheus exposition
/// - `POST /api/v1/upload/prepare`, `POST /api/v1/upload/complete`,
///   `GET /api/v1/upload/status/:jobId`
/// - `POST /api/v1/jobs/create`, `GET|DELETE /api/v1/jobs/:jobId`
/// - `GET|POST|DELETE /api/v1/cache/:key`
/// - `POST /api/v1/compress`, `/api/v1/resize-image`, `/api/v1/convert-format`
///
/// # Middleware
/// - Metrics: counts and times every request by route template
/// - CORS: Allows any origin
/// - Tracing: Logs all requests
pub fn create_router(state: AppState) -> Router {
    // Configure CORS middleware
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        // Uploads
        .route("/api/v1/upload/prepare", post(prepare_upload))
        .route("/api/v1/upload/complete", post(complete_upload))
        .route("/api/v1/upload/status/:jobId", get(upload_status))
        // Jobs
        .route("/api/v1/jobs/create", post(create_job))
        .route("/api/v1/jobs/:jobId", get(job_status).delete(cancel_job))
        // Cache
        .route(
            "/api/v1/cache/:key",
            get(get_cache_value)
                .post(set_cache_value)
                .delete(delete_cache_value),
        )
        // Placeholders
        .route("/api/v1/compress", post(compress_data))
        .route("/api/v1/resize-image", post(resize_image))
        .route("/api/v1/convert-format", post(convert_format))
        .layer(middleware::from_fn_with_state(
            state.metrics.clone(),
            track_metrics,
        ))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
