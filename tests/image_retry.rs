//! Image route behavior: retry/backoff, terminal conditions, and the
//! no-upstream-detail guarantee, against mock upstreams that count hits.

mod helpers;

use axum::Router;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::any;
use helpers::{body_string, get, header as response_header, proxy_router, send, spawn_upstream, test_config};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Upstream double that fails the first `fail_times` hits with 500, then
/// serves a small JPEG-typed body.
fn flaky_upstream(hits: Arc<AtomicUsize>, fail_times: usize) -> Router {
    Router::new().route(
        "/t/p/{*rest}",
        any(move || {
            let hits = hits.clone();
            async move {
                let hit = hits.fetch_add(1, Ordering::SeqCst) + 1;
                if hit <= fail_times {
                    (StatusCode::INTERNAL_SERVER_ERROR, "upstream exploded").into_response()
                } else {
                    (
                        [(header::CONTENT_TYPE, "image/jpeg")],
                        "fake-jpeg-bytes",
                    )
                        .into_response()
                }
            }
        }),
    )
}

/// Upstream double that always answers `status` with a distinctive body.
fn fixed_upstream(hits: Arc<AtomicUsize>, status: StatusCode) -> Router {
    Router::new().route(
        "/t/p/{*rest}",
        any(move || {
            let hits = hits.clone();
            async move {
                hits.fetch_add(1, Ordering::SeqCst);
                (status, "secret upstream detail").into_response()
            }
        }),
    )
}

async fn image_router(upstream: Router) -> Router {
    let base = spawn_upstream(upstream).await;
    proxy_router(test_config(&base, "http://127.0.0.1:9"))
}

fn assert_no_upstream_detail(body: &str) {
    assert!(
        !body.contains("secret") && !body.contains("exploded"),
        "upstream detail leaked: {body:?}"
    );
}

#[tokio::test]
async fn succeeds_after_transient_failures() {
    let hits = Arc::new(AtomicUsize::new(0));
    let router = image_router(flaky_upstream(hits.clone(), 2)).await;

    let response = send(&router, get("/t/p/w500/abc.jpg")).await;

    assert_eq!(response.status(), 200);
    assert_eq!(hits.load(Ordering::SeqCst), 3, "expected exactly 3 attempts");
    assert_eq!(
        response_header(&response, "content-type").unwrap(),
        "image/jpeg"
    );
    assert_eq!(
        response_header(&response, "cache-control").unwrap(),
        "public, max-age=604800, immutable"
    );
    assert_eq!(
        response_header(&response, "access-control-allow-origin"),
        Some("*")
    );
    assert_eq!(body_string(response).await, "fake-jpeg-bytes");
}

#[tokio::test]
async fn upstream_404_is_terminal_on_first_attempt() {
    let hits = Arc::new(AtomicUsize::new(0));
    let router = image_router(fixed_upstream(hits.clone(), StatusCode::NOT_FOUND)).await;

    let response = send(&router, get("/t/p/w500/missing.jpg")).await;

    assert_eq!(response.status(), 404);
    assert_eq!(hits.load(Ordering::SeqCst), 1, "404 must not be retried");
    let body = body_string(response).await;
    assert_eq!(body, "Not Found");
    assert_no_upstream_detail(&body);
}

#[tokio::test]
async fn exhaustion_on_http_failures_returns_generic_502() {
    let hits = Arc::new(AtomicUsize::new(0));
    let router = image_router(fixed_upstream(hits.clone(), StatusCode::INTERNAL_SERVER_ERROR)).await;

    let response = send(&router, get("/t/p/w500/abc.jpg")).await;

    assert_eq!(response.status(), 502);
    assert_eq!(hits.load(Ordering::SeqCst), 3, "expected all attempts used");
    let body = body_string(response).await;
    assert_eq!(body, "Bad Gateway");
    assert_no_upstream_detail(&body);
}

#[tokio::test]
async fn network_failure_returns_503() {
    // Nothing listens on the image upstream port.
    let router = proxy_router(test_config("http://127.0.0.1:9", "http://127.0.0.1:9"));

    let response = send(&router, get("/t/p/w500/abc.jpg")).await;

    assert_eq!(response.status(), 503);
    assert_eq!(
        response_header(&response, "access-control-allow-origin"),
        Some("*")
    );
    assert_eq!(body_string(response).await, "Service Unavailable");
}

#[tokio::test]
async fn image_cache_lifetime_is_at_least_a_day() {
    let hits = Arc::new(AtomicUsize::new(0));
    let router = image_router(flaky_upstream(hits, 0)).await;

    let response = send(&router, get("/t/p/w500/abc.jpg")).await;
    assert_eq!(response.status(), 200);

    let cache_control = response_header(&response, "cache-control").unwrap();
    let max_age: u64 = cache_control
        .split("max-age=")
        .nth(1)
        .and_then(|rest| rest.split(|c: char| !c.is_ascii_digit()).next())
        .unwrap()
        .parse()
        .unwrap();
    assert!(max_age >= 86_400, "max-age {max_age} below one day");
}
