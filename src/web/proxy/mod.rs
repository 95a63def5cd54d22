//! Upstream forwarding: outbound request construction and response copying.
//!
//! Both routes share the same header discipline: incoming headers are copied
//! minus the ones that would corrupt the upstream exchange, a fixed proxy
//! `User-Agent` replaces the caller's, and upstream response bodies are
//! buffered in full before the outgoing response is built -- streaming would
//! risk a mid-stream failure after headers are already sent.

pub mod api;
pub mod image;

use axum::body::{Body, Bytes};
use axum::http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode, header};
use axum::response::{IntoResponse, Response};
use tracing::debug;

/// Fixed identity presented to upstreams regardless of the caller's agent.
pub const PROXY_USER_AGENT: &str = concat!(
    "Mozilla/5.0 (compatible; veil-proxy/",
    env!("CARGO_PKG_VERSION"),
    ")"
);

/// Largest request body forwarded upstream.
const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Headers never forwarded to the upstream. `Host` and `Content-Length` are
/// set by the outbound client; `Accept-Encoding` is dropped so the upstream
/// sends an uncompressed body we can buffer and re-frame.
const STRIPPED_REQUEST_HEADERS: &[HeaderName] = &[
    header::HOST,
    header::ACCEPT_ENCODING,
    header::CONTENT_LENGTH,
    header::CONNECTION,
];

/// Headers never copied back from the upstream response. Hop-by-hop framing
/// is re-established locally, and `Content-Length` is recomputed for the
/// buffered body.
const STRIPPED_RESPONSE_HEADERS: &[HeaderName] = &[
    header::TRANSFER_ENCODING,
    header::CONNECTION,
    header::CONTENT_LENGTH,
    // The CORS layer asserts its own permissive value on the way out.
    header::ACCESS_CONTROL_ALLOW_ORIGIN,
];

/// Build the outbound header map for an upstream call.
pub(super) fn outbound_headers(incoming: &HeaderMap, accept: &'static str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    for (name, value) in incoming.iter() {
        if STRIPPED_REQUEST_HEADERS.contains(name) {
            continue;
        }
        headers.append(name.clone(), value.clone());
    }
    headers.insert(
        header::USER_AGENT,
        HeaderValue::from_static(PROXY_USER_AGENT),
    );
    headers.insert(header::ACCEPT, HeaderValue::from_static(accept));
    headers
}

/// Copy upstream response headers into `target`, minus the stripped set.
pub(super) fn copy_response_headers(upstream: &HeaderMap, target: &mut HeaderMap) {
    for (name, value) in upstream.iter() {
        if STRIPPED_RESPONSE_HEADERS.contains(name) {
            continue;
        }
        target.append(name.clone(), value.clone());
    }
}

/// Buffer the request body for forwarding. GET and HEAD never carry one.
pub(super) async fn read_request_body(
    method: &Method,
    body: Body,
) -> Result<Option<Bytes>, Response> {
    if matches!(*method, Method::GET | Method::HEAD) {
        return Ok(None);
    }
    match axum::body::to_bytes(body, MAX_BODY_BYTES).await {
        Ok(bytes) => Ok(Some(bytes)),
        Err(err) => {
            debug!(error = %err, "failed to buffer request body");
            Err((StatusCode::BAD_REQUEST, "Bad Request").into_response())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outbound_headers_strip_and_override() {
        let mut incoming = HeaderMap::new();
        incoming.insert(header::HOST, HeaderValue::from_static("proxy.example"));
        incoming.insert(header::ACCEPT_ENCODING, HeaderValue::from_static("br"));
        incoming.insert(header::USER_AGENT, HeaderValue::from_static("curl/8.0"));
        incoming.insert("x-custom", HeaderValue::from_static("kept"));

        let headers = outbound_headers(&incoming, "image/*");

        assert!(!headers.contains_key(header::HOST));
        assert!(!headers.contains_key(header::ACCEPT_ENCODING));
        assert_eq!(headers.get("x-custom").unwrap(), "kept");
        assert_eq!(headers.get(header::ACCEPT).unwrap(), "image/*");
        assert_eq!(
            headers.get(header::USER_AGENT).unwrap(),
            PROXY_USER_AGENT
        );
    }

    #[test]
    fn response_copy_drops_framing_headers() {
        let mut upstream = HeaderMap::new();
        upstream.insert(header::CONTENT_TYPE, HeaderValue::from_static("image/png"));
        upstream.insert(header::CONTENT_LENGTH, HeaderValue::from_static("42"));
        upstream.insert(
            header::TRANSFER_ENCODING,
            HeaderValue::from_static("chunked"),
        );

        let mut target = HeaderMap::new();
        copy_response_headers(&upstream, &mut target);

        assert_eq!(target.get(header::CONTENT_TYPE).unwrap(), "image/png");
        assert!(!target.contains_key(header::CONTENT_LENGTH));
        assert!(!target.contains_key(header::TRANSFER_ENCODING));
    }
}
