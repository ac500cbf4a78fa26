//! API Handlers
//!
//! Shared application state plus the operational endpoints (health and
//! metrics). Data endpoints live in `upload`, `jobs`, `cache` and `utility`.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use tracing::warn;

use crate::metrics::HttpMetrics;
use crate::models::responses::format_uptime;
use crate::models::HealthResponse;
use crate::store::Store;

/// Name reported by the health endpoint.
pub const SERVICE_NAME: &str = "kv-gateway";

/// Content type of the Prometheus text format.
pub const PROMETHEUS_CONTENT_TYPE: &str = "text/plain; version=0.0.4";

/// Application state shared across all handlers.
///
/// Holds the store behind a trait object so the same router serves Redis in
/// production and the memory backend in development and tests.
#[derive(Clone)]
pub struct AppState {
    /// Key-value store
    pub store: Arc<dyn Store>,
    /// HTTP metrics registry
    pub metrics: Arc<HttpMetrics>,
    /// Process start, for uptime
    pub started_at: Instant,
    /// Report a failing store in the top-level health status
    pub health_strict: bool,
}

impl AppState {
    /// Creates a new AppState around a store and a metrics registry.
    pub fn new(store: Arc<dyn Store>, metrics: Arc<HttpMetrics>) -> Self {
        Self {
            store,
            metrics,
            started_at: Instant::now(),
            health_strict: false,
        }
    }

    /// Enables or disables strict health reporting.
    pub fn with_strict_health(mut self, strict: bool) -> Self {
        self.health_strict = strict;
        self
    }
}

/// Handler for GET /health
///
/// Probes the store and reports it under `resources`. The top-level status
/// stays "healthy" unless strict mode is on, in which case a failing store
/// yields "degraded" and 503.
pub async fn health_handler(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let store_healthy = match state.store.ping().await {
        Ok(()) => true,
        Err(err) => {
            warn!(error = %err, store = state.store.name(), "Store health probe failed");
            false
        }
    };

    let mut resources = BTreeMap::new();
    resources.insert(
        state.store.name().to_string(),
        if store_healthy { "healthy" } else { "unhealthy" }.to_string(),
    );

    let (code, status) = if state.health_strict && !store_healthy {
        (StatusCode::SERVICE_UNAVAILABLE, "degraded")
    } else {
        (StatusCode::OK, "healthy")
    };

    let response = HealthResponse {
        status: status.to_string(),
        service: SERVICE_NAME.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime: format_uptime(state.started_at.elapsed()),
        resources,
    };

    (code, Json(response))
}

/// Handler for GET /metrics
///
/// Renders the metrics registry in Prometheus text format.
pub async fn metrics_handler(State(state): State<AppState>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, PROMETHEUS_CONTENT_TYPE)],
        state.metrics.render(),
    )
}
