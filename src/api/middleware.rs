//! Metrics Middleware
//!
//! Wraps every request to count it and time it under its route template.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{MatchedPath, Request, State},
    middleware::Next,
    response::Response,
};

use crate::metrics::HttpMetrics;

/// Endpoint label for requests that matched no route.
pub const UNMATCHED_ENDPOINT: &str = "unmatched";

/// Keeps the in-flight gauge balanced even if the request future is dropped.
struct InFlight<'a>(&'a HttpMetrics);

impl<'a> InFlight<'a> {
    fn start(metrics: &'a HttpMetrics) -> Self {
        metrics.connection_opened();
        Self(metrics)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.connection_closed();
    }
}

/// Records request count and latency for every request.
pub async fn track_metrics(
    State(metrics): State<Arc<HttpMetrics>>,
    req: Request,
    next: Next,
) -> Response {
    let method = req.method().to_string();
    let endpoint = req
        .extensions()
        .get::<MatchedPath>()
        .map(|path| path.as_str().to_owned())
        .unwrap_or_else(|| UNMATCHED_ENDPOINT.to_string());

    let start = Instant::now();
    let response = {
        let _in_flight = InFlight::start(&metrics);
        next.run(req).await
    };

    metrics.record_request(&method, &endpoint, response.status().as_u16(), start.elapsed());
    response
}
