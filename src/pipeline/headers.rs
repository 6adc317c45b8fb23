//! Response header policy.
//!
//! HTML responses get a fixed header set and nothing from upstream, which
//! drops framing and script restrictions. Other resources forward an
//! allowlist only.

use axum::http::{header, HeaderMap, HeaderName, HeaderValue};

const PERMISSIVE_CSP: &str = "default-src 'self' 'unsafe-inline' 'unsafe-eval'; script-src 'self' 'unsafe-inline' 'unsafe-eval'; style-src 'self' 'unsafe-inline';";

const BINARY_ALLOWLIST: [HeaderName; 4] = [
    header::CONTENT_TYPE,
    header::CACHE_CONTROL,
    header::ETAG,
    header::LAST_MODIFIED,
];

pub fn html_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("text/html; charset=utf-8"));
    headers.insert(header::X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff"));
    headers.insert(
        header::REFERRER_POLICY,
        HeaderValue::from_static("strict-origin-when-cross-origin"),
    );
    headers.insert(header::CONTENT_SECURITY_POLICY, HeaderValue::from_static(PERMISSIVE_CSP));
    headers
}

/// Rewritten scripts: content type (normalized when upstream said
/// javascript) and cache-control.
pub fn script_headers(upstream: &HeaderMap) -> HeaderMap {
    let mut headers = HeaderMap::new();
    if let Some(content_type) = upstream.get(header::CONTENT_TYPE) {
        let is_js = content_type
            .to_str()
            .map(|v| v.contains("javascript"))
            .unwrap_or(false);
        let value = if is_js {
            HeaderValue::from_static("application/javascript; charset=utf-8")
        } else {
            content_type.clone()
        };
        headers.insert(header::CONTENT_TYPE, value);
    }
    if let Some(cache) = upstream.get(header::CACHE_CONTROL) {
        headers.insert(header::CACHE_CONTROL, cache.clone());
    }
    headers
}

pub fn binary_headers(upstream: &HeaderMap) -> HeaderMap {
    let mut headers = HeaderMap::new();
    for name in BINARY_ALLOWLIST {
        if let Some(value) = upstream.get(&name) {
            headers.insert(name, value.clone());
        }
    }
    headers
}
