//! Error taxonomy and client-facing failure responses.
//!
//! Client errors (missing key, unknown path) are masked as plain 404s so
//! scanners learn nothing about which endpoints exist. Upstream detail is
//! only ever surfaced on the API route's 502 envelope; the image route and
//! everything else answer with generic bodies and log the cause internally.

use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Json, Response};
use serde_json::json;
use tracing::error;

/// Failure of a single upstream attempt.
#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    #[error("upstream returned status {0}")]
    Status(StatusCode),
    #[error("upstream request failed: {0}")]
    Network(#[from] reqwest::Error),
}

impl UpstreamError {
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network(_))
    }
}

/// Masked 404 used for unknown paths and for missing/malformed API keys.
///
/// Deliberately identical in both cases; a 401 would confirm the endpoint
/// exists.
pub fn masked_not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        [(header::CONTENT_TYPE, "text/plain")],
        "Not Found",
    )
        .into_response()
}

/// Convert a handler panic into a 500 envelope instead of a torn connection.
///
/// The panic payload goes to the log only; the body stays generic.
pub fn handle_panic(err: Box<dyn std::any::Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s
    } else {
        "unknown panic payload"
    };
    error!(detail, "request handler panicked");

    let mut response = (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({
            "error": "Internal Server Error",
            "timestamp": chrono::Utc::now().to_rfc3339(),
        })),
    )
        .into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        axum::http::HeaderValue::from_static("no-cache"),
    );
    response
}
