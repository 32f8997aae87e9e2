//! HTTP request handlers.

use bytes::Bytes;
use http_body_util::Full;
use hyper::{header, Request, Response, StatusCode};
use log::*;
use percent_encoding::percent_decode_str;
use serde::Serialize;
use std::sync::atomic::Ordering::Relaxed;
use std::sync::Arc;

use crate::api::metrics::METRICS;
use crate::common::error::SearchError;
use crate::engine::search_sources;
use crate::sources::SourceRegistry;

/// Metrics snapshot for the JSON API.
#[derive(Serialize)]
pub struct MetricsSnapshot {
    uptime_secs: u64,
    active_connections: u64,

    // Traffic counters
    http_requests: u64,
    grep_requests: u64,
    matches_served: u64,

    // Error counters
    auth_failures: u64,
    client_errors: u64,
    server_errors: u64,
    timeouts: u64,
}

/// Get current metrics snapshot.
pub fn metrics_snapshot() -> MetricsSnapshot {
    MetricsSnapshot {
        uptime_secs: METRICS.uptime_secs(),
        active_connections: METRICS.active_connections.load(Relaxed),
        http_requests: METRICS.http_requests.load(Relaxed),
        grep_requests: METRICS.grep_requests.load(Relaxed),
        matches_served: METRICS.matches_served.load(Relaxed),
        auth_failures: METRICS.auth_failures.load(Relaxed),
        client_errors: METRICS.client_errors.load(Relaxed),
        server_errors: METRICS.server_errors.load(Relaxed),
        timeouts: METRICS.timeouts.load(Relaxed),
    }
}

/// Parse a query parameter from a request.
///
/// Generic over the body type so handlers can be exercised in tests with
/// synthetic requests.
pub fn parse_query_param<B>(req: &Request<B>, key: &str) -> Option<String> {
    let query = req.uri().query()?;
    for pair in query.split('&') {
        let mut it = pair.splitn(2, '=');
        let k = it.next()?;
        if k == key {
            let raw = it.next().unwrap_or_default();
            return percent_decode_str(raw)
                .decode_utf8()
                .ok()
                .map(|s| s.into_owned());
        }
    }
    None
}

/// Create a plain-text response.
pub fn text_response(body: impl Into<Bytes>, status: StatusCode) -> Response<Full<Bytes>> {
    let mut r = Response::new(Full::new(body.into()));
    *r.status_mut() = status;
    r.headers_mut().insert(
        header::CONTENT_TYPE,
        header::HeaderValue::from_static("text/plain"),
    );
    r
}

/// Create a JSON response.
pub fn json_response<T: Serialize>(value: &T, status: StatusCode) -> Response<Full<Bytes>> {
    match serde_json::to_vec(value) {
        Ok(body) => {
            let mut r = Response::new(Full::new(Bytes::from(body)));
            *r.status_mut() = status;
            r.headers_mut().insert(
                header::CONTENT_TYPE,
                header::HeaderValue::from_static("application/json"),
            );
            r
        }
        Err(e) => {
            error!("json serialize error: {}", e);
            Response::builder()
                .status(StatusCode::INTERNAL_SERVER_ERROR)
                .body(Full::new(Bytes::from_static(
                    b"{\"error\":\"serialization\"}",
                )))
                .unwrap()
        }
    }
}

/// Handle the liveness probe. Intentionally unauthenticated.
pub fn handle_ping() -> Response<Full<Bytes>> {
    text_response("pong", StatusCode::OK)
}

/// Handle a grep request: extract the pattern, run the multi-source scan,
/// map the outcome onto a status code and plain-text body.
///
/// The scan fully completes or fails before the first response byte is
/// produced; an error never follows a partial body.
pub async fn handle_grep<B>(
    registry: Arc<SourceRegistry>,
    req: Request<B>,
) -> Response<Full<Bytes>> {
    METRICS.grep_requests.fetch_add(1, Relaxed);

    // A missing parameter and an empty one are the same failure.
    let pattern = parse_query_param(&req, "pattern").unwrap_or_default();

    match search_sources(&pattern, &registry).await {
        Ok(report) => {
            METRICS
                .matches_served
                .fetch_add(report.total_matches() as u64, Relaxed);
            text_response(report.render(), StatusCode::OK)
        }
        Err(e) => {
            let status = match &e {
                SearchError::EmptyPattern | SearchError::BadPattern(_) => StatusCode::BAD_REQUEST,
                SearchError::SourceUnavailable { .. } | SearchError::Scan { .. } => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            };
            if status == StatusCode::BAD_REQUEST {
                METRICS.client_errors.fetch_add(1, Relaxed);
            } else {
                METRICS.server_errors.fetch_add(1, Relaxed);
                error!("grep failed: {}", e);
            }
            text_response(format!("{}\n", e), status)
        }
    }
}
