//! Bundler runtime public-path rewriting.
//!
//! Chunk loaders fetch further assets relative to a runtime path variable.
//! HTML rewriting never sees those requests, so the assignment itself is
//! repointed at the proxy.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::codec::ProxyScope;

static RUNTIME_SHORT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"([.;\s])r\.p\s*=\s*"/_next/""#).expect("static bundler pattern"));
static WEBPACK_REQUIRE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"__webpack_require__\.p\s*=\s*"/_next/""#).expect("static bundler pattern"));
// Also covers the `self.` and `globalThis.` qualified forms.
static NEXT_REQUIRE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(__next_require__\.p\s*=\s*)"/_next/""#).expect("static bundler pattern"));
static NEXT_LITERAL: Lazy<Regex> = Lazy::new(|| Regex::new(r#""/_next/"#).expect("static bundler pattern"));

/// Whether a script response should get the public-path rewrite.
pub fn is_bundler_chunk(content_type: &str, url_path: &str) -> bool {
    content_type.contains("javascript")
        || (url_path.contains("/_next/static/") && (url_path.ends_with(".js") || url_path.ends_with(".mjs")))
}

/// Repoint public-path assignments and `"/_next/` literals at the proxy.
///
/// Returns the rewritten script and the number of replacements.
pub fn rewrite_public_path(js: &str, scope: &ProxyScope) -> (String, usize) {
    let public_path = scope.path("/_next/");
    let mut count = 0;

    let js = replace_counted(js, &RUNTIME_SHORT, &mut count, |caps| {
        format!(r#"{}r.p="{}""#, &caps[1], public_path)
    });
    let js = replace_counted(&js, &WEBPACK_REQUIRE, &mut count, |_| {
        format!(r#"__webpack_require__.p="{}""#, public_path)
    });
    let js = replace_counted(&js, &NEXT_REQUIRE, &mut count, |caps| {
        format!(r#"{}"{}""#, &caps[1], public_path)
    });
    let js = replace_counted(&js, &NEXT_LITERAL, &mut count, |_| format!("\"{}", public_path));

    (js, count)
}

fn replace_counted(input: &str, pattern: &Regex, count: &mut usize, f: impl Fn(&Captures) -> String) -> String {
    pattern
        .replace_all(input, |caps: &Captures| {
            *count += 1;
            f(caps)
        })
        .into_owned()
}
