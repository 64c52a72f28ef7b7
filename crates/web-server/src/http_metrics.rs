//! HTTP request metrics.
//!
//! A single Prometheus recorder is installed per process the first time
//! [`install`] is called. Instruments:
//! - `http_requests_total{method, route, status}` - Counter
//! - `http_request_duration_seconds{method, route, status}` - Histogram
//! - `db_queries_total{operation}` - Counter, incremented by the database crate
//! - `process_*` - Process gauges, collected on every scrape
//!
//! The `/metrics` endpoint is not special-cased, so scrapes show up in the
//! request counters they expose.

use crate::AppState;
use axum::{
    body::{Body, HttpBody},
    extract::{MatchedPath, Request, State},
    http::{HeaderValue, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use futures_util::StreamExt;
use metrics::Unit;
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle, PrometheusRecorder};
use metrics_process::Collector;
use std::sync::{Arc, OnceLock};
use std::time::Instant;

pub const HTTP_REQUESTS_TOTAL: &str = "http_requests_total";
pub const HTTP_REQUEST_DURATION_SECONDS: &str = "http_request_duration_seconds";

/// Content type of the Prometheus text exposition format.
pub const PROMETHEUS_CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

const HTTP_DURATION_BUCKETS: &[f64] = &[
    0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
];

static GLOBAL_METRICS: OnceLock<Metrics> = OnceLock::new();

/// Handle onto the process-wide metrics registry.
#[derive(Clone)]
pub struct Metrics {
    prometheus: PrometheusHandle,
    process: Arc<Collector>,
}

/// Installs the global recorder on first use and returns a handle to it.
pub fn install() -> Metrics {
    GLOBAL_METRICS
        .get_or_init(|| {
            let recorder = build_recorder();
            let prometheus = recorder.handle();
            if let Err(e) = metrics::set_global_recorder(recorder) {
                // Another recorder owns the facade; the page will render empty.
                tracing::warn!(error = %e, "Failed to install the Prometheus recorder.");
            }
            let process = Arc::new(Collector::default());
            register_metrics(&process);
            Metrics {
                prometheus,
                process,
            }
        })
        .clone()
}

fn build_recorder() -> PrometheusRecorder {
    let matcher = Matcher::Full(HTTP_REQUEST_DURATION_SECONDS.to_string());
    match PrometheusBuilder::new().set_buckets_for_metric(matcher, HTTP_DURATION_BUCKETS) {
        Ok(builder) => builder.build_recorder(),
        Err(e) => {
            tracing::warn!(error = %e, "Invalid histogram buckets, falling back to summaries.");
            PrometheusBuilder::new().build_recorder()
        }
    }
}

fn register_metrics(process: &Collector) {
    metrics::describe_counter!(HTTP_REQUESTS_TOTAL, Unit::Count, "Total HTTP requests");
    metrics::describe_histogram!(
        HTTP_REQUEST_DURATION_SECONDS,
        Unit::Seconds,
        "Duration of HTTP requests in seconds"
    );
    metrics::describe_counter!(database::DB_QUERIES_TOTAL, Unit::Count, "Total database queries");
    process.describe();
}

impl Metrics {
    /// Renders the whole registry in the Prometheus text format.
    pub fn render(&self) -> String {
        self.process.collect();
        self.prometheus.run_upkeep();
        self.prometheus.render()
    }
}

/// # GET /metrics
pub async fn metrics_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, PROMETHEUS_CONTENT_TYPE)],
        state.metrics.render(),
    )
}

/// Middleware that records request count and duration.
///
/// The observation is taken when the response body has been fully sent (or
/// dropped by the connection), not when the handler returns.
pub async fn track_http_metrics(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let route = match request.extensions().get::<MatchedPath>() {
        Some(matched) => matched.as_str().to_owned(),
        None => normalize_path(request.uri().path()),
    };

    let response = next.run(request).await;

    let timer = RequestTimer {
        method,
        route,
        status: response.status().as_u16(),
        start,
    };
    observe_on_body_end(response, timer)
}

fn observe_on_body_end(response: Response, timer: RequestTimer) -> Response {
    let (mut parts, body) = response.into_parts();

    // Re-streaming loses the exact size hint, so pin it as a header instead.
    if let Some(len) = body.size_hint().exact().filter(|len| *len > 0) {
        parts
            .headers
            .entry(header::CONTENT_LENGTH)
            .or_insert_with(|| HeaderValue::from(len));
    }

    let stream = body.into_data_stream().map(move |chunk| {
        // The timer lives as long as the stream; hyper drops it once sent.
        let _ = &timer;
        chunk
    });

    Response::from_parts(parts, Body::from_stream(stream))
}

/// Records one request when dropped.
struct RequestTimer {
    method: String,
    route: String,
    status: u16,
    start: Instant,
}

impl Drop for RequestTimer {
    fn drop(&mut self) {
        let labels = [
            ("method", self.method.clone()),
            ("route", self.route.clone()),
            ("status", self.status.to_string()),
        ];
        metrics::counter!(HTTP_REQUESTS_TOTAL, &labels).increment(1);
        metrics::histogram!(HTTP_REQUEST_DURATION_SECONDS, &labels)
            .record(self.start.elapsed().as_secs_f64());
    }
}

/// Normalize an unmatched request path for metrics labeling.
///
/// Numeric and UUID segments become `:id` and a trailing slash is dropped.
/// Every other segment is kept verbatim, so distinct unknown paths with
/// non-numeric segments still get distinct labels.
pub fn normalize_path(path: &str) -> String {
    let path = path.trim_end_matches('/');
    if path.is_empty() {
        return "/".to_string();
    }

    path.split('/')
        .map(|seg| if is_uuid(seg) || is_numeric(seg) { ":id" } else { seg })
        .collect::<Vec<_>>()
        .join("/")
}

/// Check if a string looks like a UUID (8-4-4-4-12 hex pattern).
fn is_uuid(s: &str) -> bool {
    let parts: Vec<&str> = s.split('-').collect();
    s.len() == 36
        && parts.len() == 5
        && parts
            .iter()
            .zip([8, 4, 4, 4, 12])
            .all(|(part, len)| part.len() == len && part.chars().all(|c| c.is_ascii_hexdigit()))
}

fn is_numeric(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_numeric_segments() {
        assert_eq!(normalize_path("/api/mahasiswa/42/extra"), "/api/mahasiswa/:id/extra");
        assert_eq!(normalize_path("/items/0"), "/items/:id");
    }

    #[test]
    fn normalizes_uuid_segments() {
        assert_eq!(
            normalize_path("/jobs/550e8400-e29b-41d4-a716-446655440000/status"),
            "/jobs/:id/status"
        );
    }

    #[test]
    fn drops_trailing_slash() {
        assert_eq!(normalize_path("/api/unknown/"), "/api/unknown");
        assert_eq!(normalize_path("/"), "/");
    }

    #[test]
    fn keeps_other_segments_verbatim() {
        assert_eq!(normalize_path("/api/unknown-slug/7"), "/api/unknown-slug/:id");
        assert_eq!(normalize_path("/v2/abc123"), "/v2/abc123");
    }

    #[test]
    fn install_is_idempotent() {
        let first = install();
        let second = install();
        assert!(Arc::ptr_eq(&first.process, &second.process));

        assert!(first.render().contains("process_start_time_seconds"));
    }
}
