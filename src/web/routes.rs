//! Router construction, request dispatch, and cache-control presets.

use axum::extract::{Request, State};
use axum::http::{HeaderName, HeaderValue, Method, StatusCode, header};
use axum::response::{IntoResponse, Json, Response};
use axum::Router;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;

use crate::state::AppState;
use crate::web::api_key::ApiKey;
use crate::web::middleware::client_ip::ClientInfo;
use crate::web::middleware::request_id::RequestIdLayer;
use crate::web::router::RouteDecision;
use crate::web::{disguise, error, proxy, status};

/// Cache-Control values attached to outgoing responses.
///
/// Advisory hints for downstream caches only; the proxy stores nothing.
pub mod cache {
    use crate::config::Config;

    /// Liveness endpoints, admin, OPTIONS -- never cache.
    pub const NO_CACHE: &str = "no-cache";

    /// API responses: TTL chosen by path substring, first match wins.
    /// The literal check order (configuration > search > popular > default)
    /// is part of the contract.
    pub fn api(config: &Config, path: &str) -> String {
        let max_age = if path.contains("configuration") {
            config.cache_configuration_secs
        } else if path.contains("search") {
            config.cache_search_secs
        } else if path.contains("popular") {
            config.cache_popular_secs
        } else {
            config.cache_api_default_secs
        };
        format!("public, max-age={max_age}")
    }

    /// Image responses: TMDB image paths are content-addressed, so they are
    /// safe to cache for a long time and mark immutable.
    pub fn image(config: &Config) -> String {
        format!("public, max-age={}, immutable", config.cache_image_secs)
    }
}

/// Wraps a JSON response with a `Cache-Control` header.
pub fn with_cache_control<T: serde::Serialize>(value: T, cache_control: &str) -> Response {
    let mut response = Json(value).into_response();
    if let Ok(value) = HeaderValue::from_str(cache_control) {
        response
            .headers_mut()
            .insert(header::CACHE_CONTROL, value);
    }
    response
}

/// Creates the proxy router.
///
/// A single fallback dispatcher mirrors the path-priority routing contract;
/// axum route patterns cannot express "any method, byte-wise prefix" without
/// splitting the contract across entries.
pub fn create_router(state: AppState) -> Router {
    let request_timeout = state.config.request_timeout();

    let router = Router::new().fallback(dispatch).with_state(state);

    router.layer((
        // Outermost: per-request ID span + severity-proportional response logging.
        RequestIdLayer,
        // Every response carries permissive CORS headers, errors included.
        cors_layer(),
        // A panicking handler becomes a 500 envelope instead of a dead connection.
        CatchPanicLayer::custom(error::handle_panic),
        // Hard ceiling on tail latency; must cover retry attempts + backoff.
        TimeoutLayer::new(request_timeout),
    ))
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static("x-api-key"),
        ])
}

/// Single entry point for every request.
async fn dispatch(State(state): State<AppState>, req: Request) -> Response {
    // Bare OPTIONS (non-preflight; preflights are answered by the CORS layer).
    if req.method() == Method::OPTIONS {
        return options_ok();
    }

    let path = req.uri().path().to_string();
    let api_key = ApiKey::from_parts(req.headers(), req.uri().query());

    match RouteDecision::classify(&path) {
        RouteDecision::Health => {
            status::health(&ClientInfo::resolve(req.headers(), req.extensions()))
        }
        RouteDecision::AdminStatus => status::admin_status(
            &state,
            api_key.as_ref(),
            &ClientInfo::resolve(req.headers(), req.extensions()),
        ),
        RouteDecision::RootDisguise => disguise::root(),
        RouteDecision::ImageProxy => proxy::image::forward(&state, req).await,
        RouteDecision::ApiProxy => match api_key {
            Some(key) => proxy::api::forward(&state, key, req).await,
            // Masked: a missing key looks exactly like an unknown path.
            None => error::masked_not_found(),
        },
        RouteDecision::NotFound => error::masked_not_found(),
    }
}

static ALLOW_METHODS: HeaderValue = HeaderValue::from_static("GET, POST, PUT, DELETE, OPTIONS");
static ALLOW_HEADERS: HeaderValue = HeaderValue::from_static("Content-Type, Authorization, X-API-Key");

fn options_ok() -> Response {
    let mut response = StatusCode::OK.into_response();
    let headers = response.headers_mut();
    headers.insert("access-control-allow-methods", ALLOW_METHODS.clone());
    headers.insert("access-control-allow-headers", ALLOW_HEADERS.clone());
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static(cache::NO_CACHE));
    response
}
