//! Fallback rewriter for pages without a dedicated routine.
//!
//! Two passes: absolute URLs on the page's origin inside double quotes, then
//! relative references in URL-bearing attributes and CSS `url(...)`.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use super::{RewriteContext, RewriteError, RuleSet};

static ATTR_DOUBLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"\b(data-src|data-href|srcset|src|href|action)(\s*=\s*)"([^"]*)""#).expect("static attribute pattern")
});

static ATTR_SINGLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"\b(data-src|data-href|srcset|src|href|action)(\s*=\s*)'([^']*)'"#).expect("static attribute pattern")
});

static CSS_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"url\(\s*(["']?)([^"')]*)["']?\s*\)"#).expect("static css url pattern")
});

pub fn rewrite(html: &str, ctx: &RewriteContext, rules: &RuleSet) -> Result<String, RewriteError> {
    let html = rewrite_absolute(html, ctx)?;
    let html = rewrite_attributes(&html, &ATTR_DOUBLE, '"', ctx, rules);
    let html = rewrite_attributes(&html, &ATTR_SINGLE, '\'', ctx, rules);
    Ok(rewrite_css_urls(&html, ctx, rules))
}

/// `"https://origin/..."` → `"<proxy root>/..."`. The origin must end at a
/// path, query, fragment or the closing quote so look-alike hosts survive.
fn rewrite_absolute(html: &str, ctx: &RewriteContext) -> Result<String, RewriteError> {
    let pattern = Regex::new(&format!(r#""{}((?:[/?#][^"]*)?)""#, regex::escape(ctx.origin())))?;
    Ok(pattern
        .replace_all(html, |caps: &Captures| format!("\"{}\"", ctx.scope().path(&caps[1])))
        .into_owned())
}

fn rewrite_attributes(html: &str, pattern: &Regex, quote: char, ctx: &RewriteContext, rules: &RuleSet) -> String {
    pattern
        .replace_all(html, |caps: &Captures| {
            let (attr, eq, value) = (&caps[1], &caps[2], &caps[3]);
            let rewritten = if attr == "srcset" {
                rewrite_srcset(value, ctx, rules)
            } else {
                rewrite_reference(value, ctx, rules)
            };
            match rewritten {
                Some(new) => format!("{attr}{eq}{quote}{new}{quote}"),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}

fn rewrite_css_urls(html: &str, ctx: &RewriteContext, rules: &RuleSet) -> String {
    CSS_URL
        .replace_all(html, |caps: &Captures| {
            let quote = &caps[1];
            match rewrite_reference(&caps[2], ctx, rules) {
                Some(new) => format!("url({quote}{new}{quote})"),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}

/// Each candidate of a `srcset` list is `url [descriptor]`.
fn rewrite_srcset(value: &str, ctx: &RewriteContext, rules: &RuleSet) -> Option<String> {
    let mut changed = false;
    let candidates: Vec<String> = value
        .split(',')
        .map(|candidate| {
            let trimmed = candidate.trim();
            let (url, descriptor) = match trimmed.split_once(char::is_whitespace) {
                Some((url, rest)) => (url, Some(rest.trim())),
                None => (trimmed, None),
            };
            match rewrite_reference(url, ctx, rules) {
                Some(new) => {
                    changed = true;
                    match descriptor {
                        Some(d) => format!("{new} {d}"),
                        None => new,
                    }
                }
                None => trimmed.to_string(),
            }
        })
        .collect();
    changed.then(|| candidates.join(", "))
}

/// Proxy path for one reference, or `None` when it must stay as written.
fn rewrite_reference(value: &str, ctx: &RewriteContext, rules: &RuleSet) -> Option<String> {
    let value = value.trim();
    if value.is_empty()
        || value.starts_with('#')
        || value.starts_with("data:")
        || has_scheme(value)
        || ctx.is_protected(value)
        || rules.skips(value)
    {
        return None;
    }
    Some(ctx.resolve(value))
}

/// `http:`, `https:`, `blob:` and friends: everything absolute.
fn has_scheme(value: &str) -> bool {
    value.to_ascii_lowercase().starts_with("http")
        || value.split_once(':').is_some_and(|(scheme, _)| {
            !scheme.is_empty()
                && scheme.starts_with(|c: char| c.is_ascii_alphabetic())
                && scheme.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        })
}
