//! URL counters reported after a rewrite pass.

use std::collections::BTreeSet;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

static ATTR_URL: Lazy<Regex> = Lazy::new(|| Regex::new(r#"(?:src|href)="([^"]*)""#).expect("static count pattern"));
static CSS_URL: Lazy<Regex> = Lazy::new(|| Regex::new(r#"url\(["']?([^"')]*)["']?\)"#).expect("static count pattern"));

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RewriteStats {
    /// Distinct URL values in `src`/`href` attributes and `url(...)`.
    pub total_urls: usize,
    /// Those pointing into the proxy.
    pub rewritten_urls: usize,
    pub skipped_urls: usize,
    /// Matches of the rule-set pairs.
    pub framework_specific_rewrites: usize,
}

/// Count distinct URL values in `html`; those containing `marker` are rewritten.
pub fn count_urls(html: &str, marker: &str) -> RewriteStats {
    let urls: BTreeSet<&str> = ATTR_URL
        .captures_iter(html)
        .chain(CSS_URL.captures_iter(html))
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str())
        .filter(|u| !u.is_empty())
        .collect();

    let total_urls = urls.len();
    let rewritten_urls = urls.iter().filter(|u| u.contains(marker)).count();

    RewriteStats {
        total_urls,
        rewritten_urls,
        skipped_urls: total_urls - rewritten_urls,
        framework_specific_rewrites: 0,
    }
}
