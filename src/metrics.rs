//! HTTP Metrics
//!
//! Request counters, latency histograms and an in-flight gauge, recorded into
//! a Prometheus recorder owned by this component rather than a process-wide
//! global. The router receives it through application state.

use std::time::Duration;

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram, Unit};
use metrics_exporter_prometheus::{
    BuildError, Matcher, PrometheusBuilder, PrometheusHandle, PrometheusRecorder,
};

pub const REQUESTS_TOTAL: &str = "http_requests_total";
pub const REQUEST_DURATION: &str = "http_request_duration_seconds";
pub const ACTIVE_CONNECTIONS: &str = "active_connections";

const DURATION_BUCKETS: &[f64] = &[
    0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
];

// == Http Metrics ==
/// Metrics registry for the HTTP surface.
pub struct HttpMetrics {
    recorder: PrometheusRecorder,
    handle: PrometheusHandle,
}

impl HttpMetrics {
    // == Constructor ==
    /// Builds a fresh registry with the HTTP metrics described.
    pub fn new() -> Result<Self, BuildError> {
        let recorder = PrometheusBuilder::new()
            .set_buckets_for_metric(Matcher::Full(REQUEST_DURATION.to_string()), DURATION_BUCKETS)?
            .build_recorder();
        let handle = recorder.handle();

        metrics::with_local_recorder(&recorder, || {
            describe_counter!(REQUESTS_TOTAL, "Total number of HTTP requests");
            describe_histogram!(REQUEST_DURATION, Unit::Seconds, "Duration of HTTP requests");
            describe_gauge!(ACTIVE_CONNECTIONS, "Number of active connections");
        });

        Ok(Self { recorder, handle })
    }

    // == Record Request ==
    /// Counts a finished request and observes its latency.
    ///
    /// # Arguments
    /// * `method` - HTTP method
    /// * `endpoint` - Route template, not the concrete path
    /// * `status` - Response status code
    /// * `elapsed` - Time spent in the handler chain
    pub fn record_request(&self, method: &str, endpoint: &str, status: u16, elapsed: Duration) {
        metrics::with_local_recorder(&self.recorder, || {
            counter!(
                REQUESTS_TOTAL,
                "method" => method.to_string(),
                "endpoint" => endpoint.to_string(),
                "status" => status.to_string()
            )
            .increment(1);
            histogram!(
                REQUEST_DURATION,
                "method" => method.to_string(),
                "endpoint" => endpoint.to_string()
            )
            .record(elapsed.as_secs_f64());
        });
    }

    /// Marks a request as in flight.
    pub fn connection_opened(&self) {
        metrics::with_local_recorder(&self.recorder, || {
            gauge!(ACTIVE_CONNECTIONS).increment(1.0);
        });
    }

    /// Marks an in-flight request as finished.
    pub fn connection_closed(&self) {
        metrics::with_local_recorder(&self.recorder, || {
            gauge!(ACTIVE_CONNECTIONS).decrement(1.0);
        });
    }

    // == Render ==
    /// Prometheus text exposition of everything recorded so far.
    pub fn render(&self) -> String {
        self.handle.render()
    }
}

impl std::fmt::Debug for HttpMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpMetrics").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_request_counter() {
        let metrics = HttpMetrics::new().unwrap();
        metrics.record_request("GET", "/health", 200, Duration::from_millis(3));
        metrics.record_request("GET", "/health", 200, Duration::from_millis(4));

        let output = metrics.render();
        let line = output
            .lines()
            .find(|l| l.starts_with("http_requests_total{"))
            .expect("counter line");
        assert!(line.contains(r#"method="GET""#));
        assert!(line.contains(r#"endpoint="/health""#));
        assert!(line.contains(r#"status="200""#));
        assert!(line.ends_with(" 2"));
    }

    #[test]
    fn test_records_duration_histogram() {
        let metrics = HttpMetrics::new().unwrap();
        metrics.record_request("POST", "/api/v1/jobs/create", 201, Duration::from_millis(20));

        let output = metrics.render();
        assert!(output.contains("http_request_duration_seconds_bucket"));
        assert!(output.contains(r#"le="0.025""#));
    }

    #[test]
    fn test_active_connections_gauge() {
        let metrics = HttpMetrics::new().unwrap();
        metrics.connection_opened();
        metrics.connection_opened();
        metrics.connection_closed();

        let output = metrics.render();
        let value: f64 = output
            .lines()
            .find_map(|l| l.strip_prefix("active_connections "))
            .expect("gauge line")
            .parse()
            .unwrap();
        assert_eq!(value, 1.0);
    }

    #[test]
    fn test_registries_are_independent() {
        let first = HttpMetrics::new().unwrap();
        let second = HttpMetrics::new().unwrap();
        first.record_request("GET", "/health", 200, Duration::from_millis(1));

        assert!(first.render().contains("http_requests_total"));
        assert!(!second.render().contains("http_requests_total{"));
    }
}
