//! Per-framework rewrite rule sets.
//!
//! A rule set is a skip list plus `(pattern, template)` pairs applied before
//! the framework routine runs. Templates use `$MARKER`, `$SESSION_ID` and
//! `$ENCODED_ORIGIN` placeholders; `${1}` refers to the pattern's capture.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::codec::ProxyScope;
use crate::detect::FrameworkType;

const BASE_SKIP: &[&str] = &["#", "javascript:", "mailto:", "tel:"];

pub struct RewritePair {
    pub pattern: Regex,
    pub template: &'static str,
}

pub struct RuleSet {
    pub skip_patterns: Vec<&'static str>,
    pub pairs: Vec<RewritePair>,
}

impl RuleSet {
    fn new(extra_skip: &[&'static str], pairs: &[(&str, &'static str)]) -> Self {
        let mut skip_patterns = BASE_SKIP.to_vec();
        skip_patterns.extend_from_slice(extra_skip);
        let pairs = pairs
            .iter()
            .map(|&(pattern, template)| RewritePair {
                pattern: Regex::new(pattern).expect("static rewrite pattern"),
                template,
            })
            .collect();
        Self { skip_patterns, pairs }
    }

    /// True when `value` contains any entry of the skip list.
    pub fn skips(&self, value: &str) -> bool {
        self.skip_patterns.iter().any(|s| value.contains(s))
    }

    /// Apply every pair in order; returns the new HTML and the match count.
    pub fn apply_pairs(&self, html: &str, scope: &ProxyScope) -> (String, usize) {
        let mut out = html.to_string();
        let mut count = 0;
        for pair in &self.pairs {
            let matches = pair.pattern.find_iter(&out).count();
            if matches == 0 {
                continue;
            }
            let replacement = expand_template(pair.template, scope);
            out = pair.pattern.replace_all(&out, replacement.as_str()).into_owned();
            count += matches;
        }
        (out, count)
    }
}

/// Fill the placeholders of `template`. Literal `$` in the values is escaped
/// so the result is safe to hand to `Regex::replace_all`.
fn expand_template(template: &str, scope: &ProxyScope) -> String {
    let escape = |v: &str| v.replace('$', "$$");
    template
        .replace("$MARKER", &escape(&scope.marker()))
        .replace("$SESSION_ID", &escape(scope.session_id()))
        .replace("$ENCODED_ORIGIN", &escape(scope.encoded_origin()))
}

static NEXT_TEMPLATES: [&str; 2] = [
    r#"href="$MARKER$SESSION_ID/$ENCODED_ORIGIN/_next/${1}""#,
    r#"src="$MARKER$SESSION_ID/$ENCODED_ORIGIN/_next/${1}""#,
];
static WORDPRESS_TEMPLATES: [&str; 2] = [
    r#"href="$MARKER$SESSION_ID/$ENCODED_ORIGIN/wp-content/${1}""#,
    r#"src="$MARKER$SESSION_ID/$ENCODED_ORIGIN/wp-content/${1}""#,
];
static SHOPIFY_TEMPLATES: [&str; 2] = [
    r#"href="$MARKER$SESSION_ID/$ENCODED_ORIGIN/assets/${1}""#,
    r#"src="$MARKER$SESSION_ID/$ENCODED_ORIGIN/assets/${1}""#,
];
static REACT_TEMPLATES: [&str; 2] = [
    r#"href="$MARKER$SESSION_ID/$ENCODED_ORIGIN/static/${1}""#,
    r#"src="$MARKER$SESSION_ID/$ENCODED_ORIGIN/static/${1}""#,
];

/// `href` and `src` pairs for one root-level asset directory.
fn framework_rules(dir: &str, templates: &'static [&'static str; 2], extra_skip: &[&'static str]) -> RuleSet {
    let href = format!(r#"href="/{}/([^"]*)""#, dir);
    let src = format!(r#"src="/{}/([^"]*)""#, dir);
    RuleSet::new(extra_skip, &[(href.as_str(), templates[0]), (src.as_str(), templates[1])])
}

static BASE_RULES: Lazy<RuleSet> = Lazy::new(|| RuleSet::new(&[], &[]));

static RULE_SETS: Lazy<Vec<(FrameworkType, RuleSet)>> = Lazy::new(|| {
    vec![
        (
            FrameworkType::NextJs,
            framework_rules("_next", &NEXT_TEMPLATES, &["/_next/", "/__next/"]),
        ),
        (
            FrameworkType::WordPress,
            framework_rules("wp-content", &WORDPRESS_TEMPLATES, &["/wp-admin/", "/wp-includes/"]),
        ),
        (
            FrameworkType::Shopify,
            framework_rules("assets", &SHOPIFY_TEMPLATES, &["cdn.shopify.com"]),
        ),
        (
            FrameworkType::React,
            framework_rules("static", &REACT_TEMPLATES, &[]),
        ),
    ]
});

/// Rule set for a classification; types without their own get the base set.
pub fn rules_for(framework: FrameworkType) -> &'static RuleSet {
    RULE_SETS
        .iter()
        .find(|(f, _)| *f == framework)
        .map(|(_, rules)| rules)
        .unwrap_or_else(|| &*BASE_RULES)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scope() -> ProxyScope {
        ProxyScope::for_origin("/proxy", "0123456789abcdef0123", "https://example.com")
    }

    #[test]
    fn test_base_skip_list() {
        let rules = rules_for(FrameworkType::Unknown);
        assert!(rules.pairs.is_empty());
        assert!(rules.skips("mailto:a@b.c"));
        assert!(rules.skips("javascript:void(0)"));
        assert!(!rules.skips("/about"));
    }

    #[test]
    fn test_framework_skip_lists_extend_base() {
        let next = rules_for(FrameworkType::NextJs);
        assert!(next.skips("/_next/static/a.js"));
        assert!(next.skips("tel:123"));
        assert!(rules_for(FrameworkType::Shopify).skips("https://cdn.shopify.com/x.js"));
        assert!(rules_for(FrameworkType::WordPress).skips("/wp-admin/admin.php"));
    }

    #[test]
    fn test_next_pairs_rewrite_and_count() {
        let html = r#"<script src="/_next/a.js"></script><link href="/_next/b.css"><img src="/logo.png">"#;
        let (out, count) = rules_for(FrameworkType::NextJs).apply_pairs(html, &scope());
        assert_eq!(count, 2);
        let root = scope().root();
        assert!(out.contains(&format!(r#"src="{}/_next/a.js""#, root)));
        assert!(out.contains(&format!(r#"href="{}/_next/b.css""#, root)));
        assert!(out.contains(r#"src="/logo.png""#));
    }

    #[test]
    fn test_template_escapes_dollar() {
        let scope = ProxyScope::for_origin("/pro$xy", "0123456789abcdef0123", "https://example.com");
        let (out, _) = rules_for(FrameworkType::React).apply_pairs(r#"<img src="/static/a.png">"#, &scope);
        assert!(out.contains("/pro$xy/editor/"));
    }
}
