//! Rewriting routines that know one technology's asset layout.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use super::RewriteContext;

static NEXT_BUILD: Lazy<Regex> = Lazy::new(|| Regex::new(r#"(href|src)="(/_next/[^"]*)""#).expect("static asset pattern"));
static NEXT_APP: Lazy<Regex> = Lazy::new(|| Regex::new(r#"(href|src)="(/__next/[^"]*)""#).expect("static asset pattern"));
static WP_CONTENT: Lazy<Regex> = Lazy::new(|| Regex::new(r#"(href|src)="(/wp-content/[^"]*)""#).expect("static asset pattern"));
static WP_INCLUDES: Lazy<Regex> = Lazy::new(|| Regex::new(r#"(href|src)="(/wp-includes/[^"]*)""#).expect("static asset pattern"));
static SHOPIFY_ASSETS: Lazy<Regex> = Lazy::new(|| Regex::new(r#"(href|src)="(/assets/[^"]*)""#).expect("static asset pattern"));
static REACT_STATIC: Lazy<Regex> = Lazy::new(|| Regex::new(r#"(href|src)="(/static/[^"]*)""#).expect("static asset pattern"));
static REACT_PUBLIC: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(href|src)="(/[^"]*\.(?:js|css|png|jpg|jpeg|gif|svg|ico|woff|woff2|ttf|eot))""#)
        .expect("static asset pattern")
});

/// Rewrite `href`/`src` values matched by `pattern` unless `keep` rejects them.
fn rewrite_matches(html: &str, pattern: &Regex, ctx: &RewriteContext, keep: impl Fn(&str) -> bool) -> String {
    pattern
        .replace_all(html, |caps: &Captures| {
            let path = &caps[2];
            if ctx.is_protected(path) || !keep(path) {
                return caps[0].to_string();
            }
            format!(r#"{}="{}""#, &caps[1], ctx.scope().path(path))
        })
        .into_owned()
}

pub fn next_js(html: &str, ctx: &RewriteContext) -> String {
    let html = rewrite_matches(html, &NEXT_BUILD, ctx, |_| true);
    rewrite_matches(&html, &NEXT_APP, ctx, |_| true)
}

/// Content and includes; anything mentioning the admin area stays upstream.
pub fn wordpress(html: &str, ctx: &RewriteContext) -> String {
    let html = rewrite_matches(html, &WP_CONTENT, ctx, |_| true);
    rewrite_matches(&html, &WP_INCLUDES, ctx, |path| !path.contains("admin"))
}

/// Theme assets only. CDN references are absolute and never matched.
pub fn shopify(html: &str, ctx: &RewriteContext) -> String {
    rewrite_matches(html, &SHOPIFY_ASSETS, ctx, |_| true)
}

pub fn react(html: &str, ctx: &RewriteContext) -> String {
    let html = rewrite_matches(html, &REACT_STATIC, ctx, |_| true);
    rewrite_matches(&html, &REACT_PUBLIC, ctx, |_| true)
}
