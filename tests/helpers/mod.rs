//! Shared scaffolding for integration tests: a proxy router wired to
//! throwaway upstream servers on ephemeral ports.

#![allow(dead_code)]

use axum::Router;
use axum::body::Body;
use axum::extract::Request;
use axum::response::Response;
use tower::ServiceExt;
use veil::config::Config;
use veil::state::AppState;
use veil::web::create_router;

/// A well-formed 32-character key that passes the admin shape check.
pub const ADMIN_KEY: &str = "abcdefghijklmnopqrstuvwxyz012345";

/// Default config with fast retry timings and both upstreams redirected.
pub fn test_config(image_upstream: &str, api_upstream: &str) -> Config {
    let mut config: Config = figment::Figment::new().extract().unwrap();
    config.image_upstream = image_upstream.to_string();
    config.api_upstream = api_upstream.to_string();
    config.retry_base_delay_ms = 1;
    config.retry_max_delay_ms = 2;
    config.attempt_timeout_secs = 2;
    config
}

/// Config for tests that never reach an upstream (both point at a dead port).
pub fn offline_config() -> Config {
    test_config("http://127.0.0.1:9", "http://127.0.0.1:9")
}

pub fn proxy_router(config: Config) -> Router {
    create_router(AppState::new(config).unwrap())
}

/// Serve `router` on an ephemeral localhost port, returning its base URL.
pub async fn spawn_upstream(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

pub async fn send(router: &Router, request: Request<Body>) -> Response {
    router.clone().oneshot(request).await.unwrap()
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub async fn body_string(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub fn header<'a>(response: &'a Response, name: &str) -> Option<&'a str> {
    response.headers().get(name).and_then(|v| v.to_str().ok())
}
