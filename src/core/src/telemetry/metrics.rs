//! Metrics for outbound API requests.
//!
//! Recorded through the `metrics` facade; nothing is exported unless the
//! embedding application installs a recorder.

use std::time::Instant;

use metrics::{counter, describe_counter, describe_histogram, histogram};

/// Register descriptions for every metric the client records.
pub fn describe_metrics() {
    describe_counter!(
        "apqp_client_requests_total",
        "Total API requests issued, labelled by method and response status"
    );
    describe_histogram!(
        "apqp_client_request_duration_seconds",
        "API request round-trip time in seconds"
    );
    describe_counter!(
        "apqp_client_errors_total",
        "Total client errors by error code"
    );
}

/// Timer for one outbound request.
#[derive(Debug)]
pub struct RequestMetrics {
    method: &'static str,
    started: Instant,
}

impl RequestMetrics {
    pub fn start(method: &'static str) -> Self {
        Self {
            method,
            started: Instant::now(),
        }
    }

    /// Record completion. `status` is `None` when no response arrived.
    pub fn finish(self, status: Option<u16>) {
        let status = status
            .map(|s| s.to_string())
            .unwrap_or_else(|| "transport_error".to_string());

        counter!(
            "apqp_client_requests_total",
            "method" => self.method,
            "status" => status,
        )
        .increment(1);

        histogram!(
            "apqp_client_request_duration_seconds",
            "method" => self.method,
        )
        .record(self.started.elapsed().as_secs_f64());
    }
}
