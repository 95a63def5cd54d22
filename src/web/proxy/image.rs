//! Image CDN forwarding with bounded retry.
//!
//! The image origin is the one upstream observed to be flaky, so calls are
//! wrapped in a small retry loop: per-attempt timeout, exponential backoff
//! between attempts, 2xx and 404 terminal, everything else retryable.
//! Clients never see upstream error detail; failures collapse to a generic
//! 502 (HTTP-level) or 503 (network-level).

use axum::extract::Request;
use axum::http::{HeaderMap, HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::Config;
use crate::state::AppState;
use crate::utils::fmt_duration;
use crate::web::error::{UpstreamError, masked_not_found};
use crate::web::proxy::{copy_response_headers, outbound_headers, read_request_body};
use crate::web::routes::cache;

pub async fn forward(state: &AppState, req: Request) -> Response {
    let (parts, body) = req.into_parts();
    let config = &state.config;

    let url = match parts.uri.path_and_query() {
        Some(pq) => format!("{}{}", config.image_upstream.trim_end_matches('/'), pq),
        None => return masked_not_found(),
    };

    let body_bytes = match read_request_body(&parts.method, body).await {
        Ok(bytes) => bytes,
        Err(response) => return response,
    };

    let mut last_failure: Option<UpstreamError> = None;

    for attempt in 1..=config.retry_max_attempts {
        if attempt > 1 {
            let delay = backoff_delay(config, attempt - 1);
            debug!(attempt, delay = %fmt_duration(delay), "backing off before retry");
            tokio::time::sleep(delay).await;
        }

        // Headers and timeout are rebuilt fresh each attempt.
        let mut request = state
            .image_client
            .request(parts.method.clone(), url.as_str())
            .headers(outbound_headers(&parts.headers, "image/*"))
            .timeout(config.attempt_timeout());
        if let Some(ref bytes) = body_bytes {
            request = request.body(bytes.clone());
        }

        match request.send().await {
            Ok(upstream) if upstream.status().is_success() => {
                return match success_response(config, upstream).await {
                    Ok(response) => response,
                    Err(err) => {
                        warn!(attempt, error = %err, "image body read failed after success status");
                        plain_status(StatusCode::BAD_GATEWAY, "Bad Gateway")
                    }
                };
            }
            Ok(upstream) if upstream.status() == StatusCode::NOT_FOUND => {
                // Real absence, not transient; stop immediately and mask.
                debug!(attempt, path = %parts.uri.path(), "image not found upstream");
                return plain_status(StatusCode::NOT_FOUND, "Not Found");
            }
            Ok(upstream) => {
                let status = upstream.status();
                warn!(attempt, status = status.as_u16(), "image upstream returned retryable status");
                last_failure = Some(UpstreamError::Status(status));
            }
            Err(err) => {
                warn!(attempt, error = %err, "image upstream request failed");
                last_failure = Some(UpstreamError::Network(err));
            }
        }
    }

    warn!(
        attempts = config.retry_max_attempts,
        path = %parts.uri.path(),
        "image fetch exhausted all attempts"
    );

    // 503 when the trouble was network-level, 502 when the upstream kept
    // answering badly. Generic bodies either way.
    match last_failure {
        Some(failure) if failure.is_network() => {
            plain_status(StatusCode::SERVICE_UNAVAILABLE, "Service Unavailable")
        }
        _ => plain_status(StatusCode::BAD_GATEWAY, "Bad Gateway"),
    }
}

/// Buffer the upstream body, then re-frame with the long-lived cache policy.
async fn success_response(
    config: &Config,
    upstream: reqwest::Response,
) -> Result<Response, reqwest::Error> {
    let status = upstream.status();
    let upstream_headers = upstream.headers().clone();
    let body = upstream.bytes().await?;

    let mut headers = HeaderMap::new();
    copy_response_headers(&upstream_headers, &mut headers);
    if let Ok(value) = HeaderValue::from_str(&cache::image(config)) {
        headers.insert(header::CACHE_CONTROL, value);
    }

    Ok((status, headers, body).into_response())
}

fn plain_status(status: StatusCode, body: &'static str) -> Response {
    (status, [(header::CONTENT_TYPE, "text/plain")], body).into_response()
}

/// Delay before the next attempt after `failed_attempts` failures:
/// `min(base * 2^(failed_attempts - 1), cap)`.
fn backoff_delay(config: &Config, failed_attempts: u32) -> Duration {
    let exponent = failed_attempts.saturating_sub(1).min(16);
    let delay_ms = config
        .retry_base_delay_ms
        .saturating_mul(1u64 << exponent)
        .min(config.retry_max_delay_ms);
    Duration::from_millis(delay_ms)
}
