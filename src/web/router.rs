//! Path classification for the dispatch fallback.

/// The route class a request path is bucketed into before dispatch.
///
/// Classification is a total function of the decoded path: every input maps
/// to exactly one class. Checks run in priority order with byte-wise
/// exact/prefix matches; no regex, no partial matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteDecision {
    Health,
    AdminStatus,
    RootDisguise,
    ImageProxy,
    ApiProxy,
    NotFound,
}

impl RouteDecision {
    pub fn classify(path: &str) -> Self {
        match path {
            "/health" | "/ping" => Self::Health,
            "/admin/status" => Self::AdminStatus,
            "" | "/" => Self::RootDisguise,
            _ if path.starts_with("/t/p/") => Self::ImageProxy,
            _ if path.starts_with("/3/") => Self::ApiProxy,
            _ => Self::NotFound,
        }
    }
}
