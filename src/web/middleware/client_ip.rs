//! Client identity resolution from trusted edge headers.
//!
//! IP priority: `CF-Connecting-IP` (edge CDN) -> rightmost `X-Forwarded-For`
//! entry (appended by the closest trusted proxy) -> socket peer address.
//! Country comes from `CF-IPCountry` when the edge provides it.
//!
//! These values are echoed in health/admin payloads only; routing never
//! depends on them.

use axum::extract::ConnectInfo;
use http::{Extensions, HeaderMap};
use std::net::{IpAddr, SocketAddr};

/// Client identity as reported by the hosting edge. Opaque pass-through.
#[derive(Debug, Clone)]
pub struct ClientInfo {
    pub ip: Option<IpAddr>,
    pub country: Option<String>,
}

impl ClientInfo {
    pub fn resolve(headers: &HeaderMap, extensions: &Extensions) -> Self {
        Self {
            ip: client_ip(headers, extensions),
            country: header_str(headers, "cf-ipcountry").map(str::to_owned),
        }
    }

    pub fn ip_string(&self) -> String {
        self.ip
            .map(|ip| ip.to_string())
            .unwrap_or_else(|| "unknown".to_string())
    }

    pub fn country_str(&self) -> &str {
        self.country.as_deref().unwrap_or("unknown")
    }
}

fn client_ip(headers: &HeaderMap, extensions: &Extensions) -> Option<IpAddr> {
    // 1. CF-Connecting-IP -- set by the edge CDN, most trustworthy.
    if let Some(ip) =
        header_str(headers, "cf-connecting-ip").and_then(|s| s.parse::<IpAddr>().ok())
    {
        return Some(ip);
    }

    // 2. Rightmost X-Forwarded-For -- appended by the closest trusted proxy.
    if let Some(xff) = header_str(headers, "x-forwarded-for")
        && let Some(ip) = xff
            .rsplit(',')
            .next()
            .map(str::trim)
            .and_then(|s| s.parse::<IpAddr>().ok())
    {
        return Some(ip);
    }

    // 3. Socket peer address (local dev fallback).
    extensions
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip())
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;

    fn headers(pairs: &[(&str, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(
                http::HeaderName::from_bytes(name.as_bytes()).unwrap(),
                HeaderValue::from_str(value).unwrap(),
            );
        }
        map
    }

    #[test]
    fn cf_header_wins() {
        let headers = headers(&[
            ("cf-connecting-ip", "203.0.113.7"),
            ("x-forwarded-for", "198.51.100.1, 10.0.0.1"),
        ]);
        let info = ClientInfo::resolve(&headers, &Extensions::new());
        assert_eq!(info.ip_string(), "203.0.113.7");
    }

    #[test]
    fn rightmost_forwarded_entry_used() {
        let headers = headers(&[("x-forwarded-for", "198.51.100.1, 10.0.0.9")]);
        let info = ClientInfo::resolve(&headers, &Extensions::new());
        assert_eq!(info.ip_string(), "10.0.0.9");
    }

    #[test]
    fn unknown_without_any_source() {
        let info = ClientInfo::resolve(&HeaderMap::new(), &Extensions::new());
        assert_eq!(info.ip_string(), "unknown");
        assert_eq!(info.country_str(), "unknown");
    }

    #[test]
    fn country_from_edge_header() {
        let headers = headers(&[("cf-ipcountry", "DE")]);
        let info = ClientInfo::resolve(&headers, &Extensions::new());
        assert_eq!(info.country_str(), "DE");
    }
}
