//! Request model handed to the pipeline.

use axum::body::Bytes;
use axum::http::{header, HeaderMap, Method};
use url::Url;

use crate::codec::origin_of;

/// One proxied request, already split out of its proxy address.
#[derive(Debug, Clone)]
pub struct ProxyRequest {
    pub session_id: String,
    pub encoded_origin: String,
    /// Upstream path without the leading slash; may be empty.
    pub subpath: String,
    /// Raw query string without the `?`.
    pub query: Option<String>,
    pub method: Method,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl ProxyRequest {
    /// Path shown in logs and on the error page.
    pub fn display_path(&self) -> String {
        format!("/{}", self.subpath)
    }

    /// Host the client used to reach the proxy.
    pub fn host(&self) -> Option<&str> {
        self.headers.get(header::HOST).and_then(|v| v.to_str().ok())
    }

    /// Upstream URL for this request given the decoded base URL.
    ///
    /// An empty subpath fetches the base URL itself; otherwise the subpath is
    /// taken relative to the base URL's origin.
    pub fn target_url(&self, base_url: &str) -> Option<Url> {
        let mut url = if self.subpath.is_empty() {
            Url::parse(base_url).ok()?
        } else {
            let origin = origin_of(base_url)?;
            Url::parse(&format!("{}/{}", origin, self.subpath)).ok()?
        };
        if let Some(query) = self.query.as_deref().filter(|q| !q.is_empty()) {
            url.set_query(Some(query));
        }
        Some(url)
    }
}
