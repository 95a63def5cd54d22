//! API key resolution from the incoming request.
//!
//! Precedence is fixed: `X-API-Key` header -> `api_key` query parameter ->
//! `key` query parameter. The resolved value must never appear in logs or
//! in any response body.

use http::HeaderMap;

/// Admin access requires this exact key length. An exact-length string
/// comparison policy, not a validated secret format.
pub const ADMIN_KEY_LEN: usize = 32;

/// A caller-supplied TMDB API key.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Resolve the key from headers and the raw query string.
    pub fn from_parts(headers: &HeaderMap, query: Option<&str>) -> Option<Self> {
        if let Some(value) = headers.get("x-api-key").and_then(|v| v.to_str().ok())
            && !value.is_empty()
        {
            return Some(Self(value.to_string()));
        }

        for name in ["api_key", "key"] {
            if let Some(value) = query.and_then(|q| query_param(q, name))
                && !value.is_empty()
            {
                return Some(Self(value));
            }
        }

        None
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_admin_shaped(&self) -> bool {
        self.0.len() == ADMIN_KEY_LEN
    }
}

// Never derive Debug for the wrapped value; a `{:?}` in a log line must not
// print the key itself.
impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ApiKey(len={})", self.0.len())
    }
}

fn query_param(query: &str, name: &str) -> Option<String> {
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(k, _)| k == name)
        .map(|(_, v)| v.into_owned())
}
