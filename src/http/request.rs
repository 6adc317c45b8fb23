//! Request-side helpers.
//!
//! # Responsibilities
//! - Request ID header name and lookup
//! - Turn an inbound request into a `ProxyRequest` for the pipeline

use axum::body::Bytes;
use axum::http::{HeaderMap, HeaderName, Method, Uri};

use crate::pipeline::ProxyRequest;

pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Request ID set by the request-id layer, or `unknown`.
pub fn request_id(headers: &HeaderMap) -> &str {
    headers
        .get(&X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
}

/// Subpath of `{prefix}/editor/{sid}/{enc}/...` exactly as it arrived.
///
/// Percent-escapes such as `%3F`, `%23` and `%2F` are kept so the upstream
/// sees the same path the page asked for.
pub fn raw_subpath<'a>(prefix: &str, path: &'a str) -> Option<&'a str> {
    let rest = path.strip_prefix(prefix)?.strip_prefix("/editor/")?;
    rest.splitn(3, '/').nth(2)
}

/// Inbound request parts needed by the pipeline.
#[derive(Debug)]
pub struct Inbound {
    pub method: Method,
    pub uri: Uri,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl Inbound {
    pub fn into_proxy_request(self, session_id: String, encoded_origin: String, subpath: String) -> ProxyRequest {
        ProxyRequest {
            session_id,
            encoded_origin,
            subpath,
            query: self.uri.query().map(str::to_string),
            method: self.method,
            headers: self.headers,
            body: self.body,
        }
    }
}
