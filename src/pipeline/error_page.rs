//! Human-readable error document for failed proxy requests.

use super::inject::escape_attr;

/// Render the error page. All inputs are escaped.
pub fn render(session_id: &str, path: &str, message: &str) -> String {
    let path = if path.is_empty() { "/" } else { path };
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>Proxy Error</title>
<style>
  body {{ font-family: -apple-system, BlinkMacSystemFont, sans-serif; margin: 0; padding: 40px; background: #f8f9fa; }}
  .error {{ background: white; border: 1px solid #e74c3c; border-radius: 8px; padding: 24px; max-width: 600px; margin: 0 auto; }}
  .error h2 {{ color: #e74c3c; margin: 0 0 16px 0; }}
  .error p {{ margin: 8px 0; color: #666; }}
  .error code {{ background: #f1f2f6; padding: 2px 6px; border-radius: 3px; font-family: Monaco, Menlo, monospace; }}
</style>
</head>
<body>
<div class="error">
  <h2>Proxy Error</h2>
  <p><strong>Session:</strong> <code>{session}</code></p>
  <p><strong>Path:</strong> <code>{path}</code></p>
  <p><strong>Error:</strong> {message}</p>
</div>
</body>
</html>
"#,
        session = escape_attr(session_id),
        path = escape_attr(path),
        message = escape_attr(message),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_context() {
        let page = render("0123456789abcdef0123", "/pricing", "upstream request failed: HTTP 503: Service Unavailable");
        assert!(page.contains("0123456789abcdef0123"));
        assert!(page.contains("/pricing"));
        assert!(page.contains("HTTP 503"));
    }

    #[test]
    fn test_empty_path_shown_as_root() {
        assert!(render("s", "", "m").contains("<code>/</code>"));
    }

    #[test]
    fn test_escapes_input() {
        let page = render("<sid>", "/<script>alert(1)</script>", "a & b");
        assert!(!page.contains("<script>alert"));
        assert!(page.contains("&lt;script&gt;"));
        assert!(page.contains("a &amp; b"));
    }
}
