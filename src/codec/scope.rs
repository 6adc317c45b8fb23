//! Proxy address construction and parsing.
//!
//! A proxy address is `/<prefix>/editor/<sessionId>/<encodedOrigin>/<subpath>`.
//! [`ProxyScope`] is the `(prefix, sessionId, encodedOrigin)` part shared by
//! every reference rewritten inside one fetched document.

use crate::codec::token::encode;

/// Path segment between the mount prefix and the session id.
pub const EDITOR_SEGMENT: &str = "editor";

/// One session's view of one upstream origin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyScope {
    prefix: String,
    session_id: String,
    encoded_origin: String,
}

impl ProxyScope {
    /// Build a scope for a raw origin such as `https://example.com`.
    pub fn for_origin(prefix: &str, session_id: &str, origin: &str) -> Self {
        Self::from_encoded(prefix, session_id, &encode(origin))
    }

    /// Build a scope from an already-encoded origin token.
    pub fn from_encoded(prefix: &str, session_id: &str, encoded_origin: &str) -> Self {
        Self {
            prefix: prefix.trim_end_matches('/').to_string(),
            session_id: session_id.to_string(),
            encoded_origin: encoded_origin.to_string(),
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn encoded_origin(&self) -> &str {
        &self.encoded_origin
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// `/<prefix>/editor/` - present in every proxied reference.
    pub fn marker(&self) -> String {
        format!("{}/{}/", self.prefix, EDITOR_SEGMENT)
    }

    /// `/<prefix>/editor/<sid>/<enc>` without a trailing slash.
    pub fn root(&self) -> String {
        format!(
            "{}/{}/{}/{}",
            self.prefix, EDITOR_SEGMENT, self.session_id, self.encoded_origin
        )
    }

    /// Value for the injected `<base href>`.
    pub fn base_href(&self) -> String {
        format!("{}/", self.root())
    }

    /// Proxy path for an upstream path; a missing leading slash is added.
    pub fn path(&self, upstream_path: &str) -> String {
        if upstream_path.starts_with('/') {
            format!("{}{}", self.root(), upstream_path)
        } else {
            format!("{}/{}", self.root(), upstream_path)
        }
    }
}

/// Join `(sessionId, origin, path)` into a canonical proxy path.
pub fn build_proxy_path(prefix: &str, session_id: &str, origin: &str, path: &str) -> String {
    ProxyScope::for_origin(prefix, session_id, origin).path(path)
}

/// A parsed proxy address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyAddress {
    pub session_id: String,
    pub encoded_origin: String,
    pub subpath: String,
}

impl ProxyAddress {
    /// Locate `/<prefix>/editor/<sid>/<enc>` inside `path` and split it out.
    ///
    /// The session id must be at least 16 hex characters and the token must
    /// use the codec alphabet; anything else is not a proxy address.
    pub fn parse(prefix: &str, path: &str) -> Option<Self> {
        let marker = format!("{}/{}/", prefix.trim_end_matches('/'), EDITOR_SEGMENT);
        let start = path.find(&marker)? + marker.len();
        let rest = &path[start..];

        let mut parts = rest.splitn(3, '/');
        let session_id = parts.next()?;
        let encoded_origin = parts.next()?;
        let subpath = parts.next().unwrap_or("");

        let sid_ok = session_id.len() >= 16 && session_id.chars().all(|c| c.is_ascii_hexdigit());
        let enc_ok = !encoded_origin.is_empty()
            && encoded_origin
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !sid_ok || !enc_ok {
            return None;
        }

        Some(Self {
            session_id: session_id.to_string(),
            encoded_origin: encoded_origin.to_string(),
            subpath: subpath.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SID: &str = "0123456789abcdef0123";

    #[test]
    fn test_build_proxy_path_normalizes_slash() {
        let with = build_proxy_path("/proxy", SID, "https://example.com", "/api/data");
        let without = build_proxy_path("/proxy", SID, "https://example.com", "api/data");
        assert_eq!(with, without);
        assert_eq!(
            with,
            format!("/proxy/editor/{}/aHR0cHM6Ly9leGFtcGxlLmNvbQ/api/data", SID)
        );
    }

    #[test]
    fn test_scope_paths() {
        let scope = ProxyScope::for_origin("/proxy/", SID, "https://example.com");
        assert_eq!(scope.marker(), "/proxy/editor/");
        assert_eq!(scope.base_href(), format!("{}/", scope.root()));
        assert!(scope.path("x.png").ends_with("/aHR0cHM6Ly9leGFtcGxlLmNvbQ/x.png"));
    }

    #[test]
    fn test_parse_address() {
        let path = format!("/proxy/editor/{}/aHR0cHM6Ly9leGFtcGxlLmNvbQ/a/b.html", SID);
        let addr = ProxyAddress::parse("/proxy", &path).unwrap();
        assert_eq!(addr.session_id, SID);
        assert_eq!(addr.encoded_origin, "aHR0cHM6Ly9leGFtcGxlLmNvbQ");
        assert_eq!(addr.subpath, "a/b.html");

        let bare = format!("/proxy/editor/{}/aHR0cHM6Ly9leGFtcGxlLmNvbQ", SID);
        assert_eq!(ProxyAddress::parse("/proxy", &bare).unwrap().subpath, "");
    }

    #[test]
    fn test_parse_rejects_wrong_shape() {
        assert!(ProxyAddress::parse("/proxy", "/some/page").is_none());
        assert!(ProxyAddress::parse("/proxy", "/proxy/editor/short/abc/page").is_none());
        assert!(ProxyAddress::parse("/proxy", &format!("/proxy/editor/{}/", SID)).is_none());
        assert!(ProxyAddress::parse("/proxy", &format!("/proxy/editor/{}/a=b/x", SID)).is_none());
    }
}
