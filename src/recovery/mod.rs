//! Escaped-request recovery.
//!
//! # Data Flow
//! ```text
//! Root-level request (no sid/token in path)
//!     → Referer header
//!     → ProxyAddress::parse on the referer's path
//!     → ProxyRequest with the escaped path as subpath
//!     → Content pipeline
//! ```
//!
//! # Design Decisions
//! - No referer, or a referer of the wrong shape, is a 404; nothing is guessed
//! - Paths under the mount prefix or the asset route are never recovered

use axum::http::{header, HeaderMap};
use url::Url;

use crate::codec::ProxyAddress;

/// Session and token recovered from a referring proxied page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recovered {
    pub session_id: String,
    pub encoded_origin: String,
    /// The escaped request's own path without the leading slash.
    pub subpath: String,
}

/// Whether `path` is owned by one of the proxy's own routes.
pub fn is_reserved(prefix: &str, asset_route: &str, path: &str) -> bool {
    let under = |root: &str| path == root || path.strip_prefix(root).is_some_and(|rest| rest.starts_with('/'));
    under(prefix.trim_end_matches('/')) || under(asset_route.trim_end_matches('/'))
}

/// Recover `(sid, enc, subpath)` for an escaped request from its referer.
pub fn recover(prefix: &str, asset_route: &str, path: &str, referer: Option<&str>) -> Option<Recovered> {
    if is_reserved(prefix, asset_route, path) {
        return None;
    }

    let referer = referer?;
    let referer_path = match Url::parse(referer) {
        Ok(url) => url.path().to_string(),
        Err(_) if referer.starts_with('/') => referer.to_string(),
        Err(_) => return None,
    };
    let address = ProxyAddress::parse(prefix, &referer_path)?;

    Some(Recovered {
        session_id: address.session_id,
        encoded_origin: address.encoded_origin,
        subpath: path.trim_start_matches('/').to_string(),
    })
}

/// Referer header as text, if present and valid.
pub fn referer(headers: &HeaderMap) -> Option<&str> {
    headers.get(header::REFERER).and_then(|v| v.to_str().ok())
}
