//! Prometheus metrics for the API server.

use std::sync::LazyLock;
use std::time::Instant;

use axum::body::Body;
use axum::http::{Request, Response};
use axum::middleware::Next;
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use regex_lite::Regex;

/// Initialize the Prometheus metrics recorder.
/// Returns a handle that can be used to render metrics.
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    PrometheusBuilder::new().install_recorder()
}

/// Metric names as constants for consistency.
pub mod names {
    // HTTP metrics
    pub const HTTP_REQUESTS_TOTAL: &str = "jobboard_http_requests_total";
    pub const HTTP_REQUEST_DURATION_SECONDS: &str = "jobboard_http_request_duration_seconds";
    pub const HTTP_REQUESTS_IN_FLIGHT: &str = "jobboard_http_requests_in_flight";

    // Domain events
    pub const APPLICATIONS_SUBMITTED_TOTAL: &str = "jobboard_applications_submitted_total";
    pub const STATUS_TRANSITIONS_TOTAL: &str = "jobboard_status_transitions_total";
    pub const TRANSITIONS_DENIED_TOTAL: &str = "jobboard_transitions_denied_total";
    pub const ACCESS_DENIED_TOTAL: &str = "jobboard_access_denied_total";
    pub const UPLOADS_TOTAL: &str = "jobboard_uploads_total";
    pub const ADMIN_ACTIONS_TOTAL: &str = "jobboard_admin_actions_total";

    // Rate limiting metrics
    pub const RATE_LIMIT_HITS_TOTAL: &str = "jobboard_rate_limit_hits_total";
}

/// Record an HTTP request.
pub fn record_http_request(method: &str, path: &str, status: u16, duration_secs: f64) {
    let labels = [
        ("method", method.to_string()),
        ("path", sanitize_path(path)),
        ("status", status.to_string()),
    ];

    counter!(names::HTTP_REQUESTS_TOTAL, &labels).increment(1);
    histogram!(names::HTTP_REQUEST_DURATION_SECONDS, &labels).record(duration_secs);
}

pub fn record_application_submitted() {
    counter!(names::APPLICATIONS_SUBMITTED_TOTAL).increment(1);
}

/// Record an applied status change.
pub fn record_transition(entity: &'static str, to: &'static str) {
    counter!(names::STATUS_TRANSITIONS_TOTAL, "entity" => entity, "to" => to).increment(1);
}

/// Record a refused status change.
pub fn record_transition_denied(entity: &'static str) {
    counter!(names::TRANSITIONS_DENIED_TOTAL, "entity" => entity).increment(1);
}

pub fn record_access_denied(reason: &'static str) {
    counter!(names::ACCESS_DENIED_TOTAL, "reason" => reason).increment(1);
}

pub fn record_upload(kind: &'static str) {
    counter!(names::UPLOADS_TOTAL, "kind" => kind).increment(1);
}

pub fn record_admin_action(action: &'static str) {
    counter!(names::ADMIN_ACTIONS_TOTAL, "action" => action).increment(1);
}

/// Record rate limit hit.
pub fn record_rate_limit_hit(endpoint: &str) {
    let labels = [("endpoint", sanitize_path(endpoint))];
    counter!(names::RATE_LIMIT_HITS_TOTAL, &labels).increment(1);
}

static UUID_SEGMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}(_[A-Za-z0-9]+)?")
        .expect("valid regex")
});

static USER_SEGMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/users/[A-Za-z0-9_-]+").expect("valid regex"));

/// Sanitize path for metrics labels (collapse ids into placeholders).
fn sanitize_path(path: &str) -> String {
    let path = UUID_SEGMENT.replace_all(path, ":id");
    USER_SEGMENT.replace_all(&path, "/users/:uid").to_string()
}

/// Metrics middleware for HTTP requests.
pub async fn metrics_middleware(request: Request<Body>, next: Next) -> Response<Body> {
    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let start = Instant::now();

    gauge!(names::HTTP_REQUESTS_IN_FLIGHT).increment(1.0);

    let response = next.run(request).await;

    gauge!(names::HTTP_REQUESTS_IN_FLIGHT).decrement(1.0);

    let status = response.status().as_u16();
    let duration = start.elapsed().as_secs_f64();

    record_http_request(&method, &path, status, duration);

    response
}
