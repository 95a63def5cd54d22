//! Health and admin status handlers.
//!
//! Neither makes an upstream call, and neither response may be cached --
//! both exist to reflect liveness at the moment of the request.

use axum::response::Response;
use serde_json::json;
use tracing::trace;

use crate::state::AppState;
use crate::web::api_key::ApiKey;
use crate::web::error::masked_not_found;
use crate::web::middleware::client_ip::ClientInfo;
use crate::web::routes::{cache, with_cache_control};

/// `/health` and `/ping`.
pub fn health(client: &ClientInfo) -> Response {
    trace!("health check requested");
    with_cache_control(
        json!({
            "status": "ok",
            "timestamp": chrono::Utc::now().to_rfc3339(),
            "client_ip": client.ip_string(),
            "country": client.country_str(),
        }),
        cache::NO_CACHE,
    )
}

/// `/admin/status`.
///
/// Requires an API key of exactly the admin shape; anything else gets the
/// same masked 404 an unknown path would, never a 401.
pub fn admin_status(state: &AppState, api_key: Option<&ApiKey>, client: &ClientInfo) -> Response {
    let Some(key) = api_key else {
        return masked_not_found();
    };
    if !key.is_admin_shaped() {
        return masked_not_found();
    }

    let uptime_secs = (chrono::Utc::now() - state.started_at).num_seconds();

    with_cache_control(
        json!({
            "status": "active",
            "version": env!("CARGO_PKG_VERSION"),
            "commit": env!("GIT_COMMIT_SHORT"),
            "uptime_secs": uptime_secs,
            "endpoints": {
                "images": "/t/p/{size}/{path}",
                "api": "/3/{endpoint}",
                "health": "/health",
                "admin": "/admin/status",
            },
            "client_info": {
                "ip": client.ip_string(),
                "country": client.country_str(),
            },
            "timestamp": chrono::Utc::now().to_rfc3339(),
        }),
        cache::NO_CACHE,
    )
}
