//! Service middleware for metrics and request tracking.
//!
//! ## Metrics Exposed
//!
//! - `referral_kernel_requests_total` - Counter of total requests by path, method, status
//! - `referral_kernel_request_duration_seconds` - Histogram of request latency

use axum::{
    extract::Request,
    middleware::Next,
    response::Response,
};
use std::time::Instant;
use tracing::info;

/// Metrics middleware that records request counts and latency.
///
/// Records:
/// - Total request count by path pattern, method, and status code
/// - Request duration as a histogram
///
/// Uses tracing for now - can be upgraded to prometheus metrics later.
pub async fn metrics_middleware(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let path = normalize_path(request.uri().path());

    let response = next.run(request).await;

    let latency = start.elapsed();
    let status = response.status().as_u16();

    info!(
        target: "referral_kernel::metrics",
        metric_type = "request",
        path = %path,
        method = %method,
        status = status,
        latency_ms = latency.as_millis() as u64,
        "request_metric"
    );

    response
}

/// Normalize path for metrics to avoid high cardinality.
///
/// Replaces numeric user-id segments with placeholders.
fn normalize_path(path: &str) -> String {
    let id_regex = regex_lite::Regex::new(r"/\d+").unwrap();

    id_regex.replace_all(path, "/:id").to_string()
}
