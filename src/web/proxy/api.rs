//! REST API forwarding with key injection and path-based cache policy.
//!
//! Unlike the image route, a caller reaching this path has already presented
//! a key, so network failures may surface their message in a JSON envelope.
//! Upstream status and body pass through unchanged otherwise.

use axum::extract::Request;
use axum::http::{HeaderMap, HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Json, Response};
use serde_json::json;
use tracing::warn;
use url::Url;

use crate::state::AppState;
use crate::web::api_key::ApiKey;
use crate::web::error::masked_not_found;
use crate::web::proxy::{copy_response_headers, outbound_headers, read_request_body};
use crate::web::routes::cache;

pub async fn forward(state: &AppState, key: ApiKey, req: Request) -> Response {
    let (parts, body) = req.into_parts();
    let config = &state.config;
    let path = parts.uri.path().to_string();

    let url = match build_url(&config.api_upstream, &path, parts.uri.query(), &key) {
        Ok(url) => url,
        Err(err) => {
            warn!(error = %err, "API upstream base URL is invalid");
            return masked_not_found();
        }
    };

    let body_bytes = match read_request_body(&parts.method, body).await {
        Ok(bytes) => bytes,
        Err(response) => return response,
    };

    let mut request = state
        .api_client
        .request(parts.method.clone(), url)
        .headers(outbound_headers(&parts.headers, "application/json"))
        .timeout(config.attempt_timeout());
    if let Some(bytes) = body_bytes {
        request = request.body(bytes);
    }

    let upstream = match request.send().await {
        Ok(upstream) => upstream,
        Err(err) => return bad_gateway(err),
    };

    // Status passes through as-is; the upstream's own 4xx/5xx are the
    // caller's to interpret.
    let status = upstream.status();
    let upstream_headers = upstream.headers().clone();
    let body = match upstream.bytes().await {
        Ok(body) => body,
        Err(err) => return bad_gateway(err),
    };

    let mut headers = HeaderMap::new();
    copy_response_headers(&upstream_headers, &mut headers);
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    if let Ok(value) = HeaderValue::from_str(&cache::api(config, &path)) {
        headers.insert(header::CACHE_CONTROL, value);
    }

    (status, headers, body).into_response()
}

/// Upstream URL with the caller's path and query, plus `api_key` injected
/// only when the caller didn't already supply one.
fn build_url(base: &str, path: &str, query: Option<&str>, key: &ApiKey) -> Result<Url, url::ParseError> {
    let mut url = Url::parse(base)?;
    url.set_path(path);
    url.set_query(query);

    let has_key = url.query_pairs().any(|(name, _)| name == "api_key");
    if !has_key {
        url.query_pairs_mut().append_pair("api_key", key.as_str());
    }

    Ok(url)
}

fn bad_gateway(err: reqwest::Error) -> Response {
    // Strip the URL before it can reach a log line or the envelope: the
    // injected api_key query parameter lives there.
    let err = err.without_url();
    warn!(error = %err, "API upstream request failed");

    let mut response = (
        StatusCode::BAD_GATEWAY,
        Json(json!({
            "error": "API request failed",
            "message": err.to_string(),
        })),
    )
        .into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static(cache::NO_CACHE),
    );
    response
}
