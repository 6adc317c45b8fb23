//! Canonicalize absolute links to the proxy's own host.

use regex::{Captures, Regex};

use super::RewriteError;
use crate::codec::ProxyScope;

const PARENT_ORIGIN_ATTR: &str = "data-parent-origin=\"";

/// Replace `http(s)://<host>/...` with the proxy path for `scope`.
///
/// References that already point into the proxy only lose their host part.
/// The injected `data-parent-origin` value is left as is.
/// Returns the new HTML and the number of references replaced.
pub fn canonicalize_host(html: &str, host: &str, scope: &ProxyScope) -> Result<(String, usize), RewriteError> {
    let pattern = Regex::new(&format!(
        r#"https?://{}(/[^\s"'<>)]*)?(?:([^\w.:/-])|$)"#,
        regex::escape(host)
    ))?;
    let marker = scope.marker();
    let mut count = 0;

    let out = pattern
        .replace_all(html, |caps: &Captures| {
            let whole = &caps[0];
            if caps.get(0).is_some_and(|m| html[..m.start()].ends_with(PARENT_ORIGIN_ATTR)) {
                return whole.to_string();
            }
            count += 1;
            let path = caps.get(1).map_or("", |m| m.as_str());
            let terminator = caps.get(2).map_or("", |m| m.as_str());
            let replaced = if path.starts_with(&marker) {
                path.to_string()
            } else if path.is_empty() {
                scope.root()
            } else {
                scope.path(path)
            };
            format!("{replaced}{terminator}")
        })
        .into_owned();

    Ok((out, count))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scope() -> ProxyScope {
        ProxyScope::for_origin("/proxy", "0123456789abcdef0123", "https://example.com")
    }

    #[test]
    fn test_host_links_become_proxy_paths() {
        let scope = scope();
        let (out, count) = canonicalize_host(
            r#"<a href="http://localhost:3000/team">t</a><a href="https://localhost:3000">h</a>"#,
            "localhost:3000",
            &scope,
        )
        .unwrap();
        assert_eq!(count, 2);
        assert!(out.contains(&format!(r#"href="{}/team""#, scope.root())));
        assert!(out.contains(&format!(r#"href="{}""#, scope.root())));
    }

    #[test]
    fn test_already_proxied_keeps_single_prefix() {
        let scope = scope();
        let html = format!(r#"<a href="http://localhost:3000{}/x">x</a>"#, scope.root());
        let (out, _) = canonicalize_host(&html, "localhost:3000", &scope).unwrap();
        assert_eq!(out, format!(r#"<a href="{}/x">x</a>"#, scope.root()));
    }

    #[test]
    fn test_parent_origin_attribute_survives() {
        let scope = scope();
        let html = r#"<div id="__editor_root" data-parent-origin="http://localhost:3000"></div><a href="http://localhost:3000/a">a</a>"#;
        let (out, count) = canonicalize_host(html, "localhost:3000", &scope).unwrap();
        assert_eq!(count, 1);
        assert!(out.contains(r#"data-parent-origin="http://localhost:3000""#));
        assert!(out.contains(&format!(r#"href="{}/a""#, scope.root())));
    }

    #[test]
    fn test_other_hosts_untouched() {
        let html = r#"<a href="http://localhost:30001/x">x</a>"#;
        let (out, count) = canonicalize_host(html, "localhost:3000", &scope()).unwrap();
        assert_eq!(count, 0);
        assert_eq!(out, html);
    }
}
