//! Scoring and classification.
//!
//! # Algorithm
//! 1. Sum the weights of every content signature that matches the HTML
//! 2. Add URL bonuses and document-structure bonuses
//! 3. Highest total wins; all zero means `Unknown`
//! 4. Confidence comes from the gap to the runner-up, not the absolute score
//! 5. Features and version are extracted for the winner only
//!
//! Pure and deterministic: identical input always yields identical output.

use std::collections::{BTreeSet, HashMap};

use super::framework::{Classification, Evidence, FrameworkType};
use super::signatures::{
    CONTENT_SIGNATURES, FEATURE_RULES, GENERATOR_BONUSES, GENERATOR_META, META_CONTENT,
    ROOT_MOUNT_BONUS, ROOT_MOUNT_MARKERS, STATIC_DOCUMENT_BONUS, URL_BONUSES, VERSION_PATTERNS,
};

/// Classify a fetched document.
pub fn detect(html: &str, source_url: &str) -> Classification {
    let mut scores: HashMap<FrameworkType, u32> = HashMap::new();
    let mut matched = Vec::new();

    for (framework, signatures) in CONTENT_SIGNATURES.iter() {
        for signature in signatures {
            if signature.pattern.is_match(html) {
                *scores.entry(*framework).or_default() += signature.weight;
                matched.push(signature.label);
            }
        }
    }

    score_url(source_url, &mut scores);
    score_structure(html, &mut scores);

    let mut ranked: Vec<(FrameworkType, u32)> = FrameworkType::ALL
        .iter()
        .map(|f| (*f, scores.get(f).copied().unwrap_or(0)))
        .collect();
    // Stable sort keeps declaration order among equal scores.
    ranked.sort_by(|a, b| b.1.cmp(&a.1));

    let (best, best_score) = ranked[0];
    let runner_up = ranked.get(1).map(|(_, s)| *s).unwrap_or(0);

    if best_score == 0 {
        return Classification::unknown();
    }

    let gap = best_score - runner_up;
    let features = extract_features(html, best);
    let version = extract_version(html, best);

    Classification {
        framework: best,
        confidence: confidence_for_gap(gap),
        version,
        features,
        evidence: Evidence {
            scores: ranked.into_iter().filter(|(_, s)| *s > 0).collect(),
            gap,
            matched,
        },
    }
}

/// Map the winner's lead over the runner-up to a confidence value.
pub fn confidence_for_gap(gap: u32) -> f64 {
    match gap {
        g if g >= 20 => 0.95,
        g if g >= 15 => 0.90,
        g if g >= 10 => 0.80,
        g if g >= 5 => 0.70,
        _ => 0.60,
    }
}

fn score_url(url: &str, scores: &mut HashMap<FrameworkType, u32>) {
    let url = url.to_lowercase();
    for bonus in URL_BONUSES {
        if bonus.needles.iter().any(|n| url.contains(n)) {
            *scores.entry(bonus.framework).or_default() += bonus.weight;
        }
    }
}

fn score_structure(html: &str, scores: &mut HashMap<FrameworkType, u32>) {
    if ROOT_MOUNT_MARKERS.iter().any(|m| html.contains(m)) {
        *scores.entry(FrameworkType::React).or_default() += ROOT_MOUNT_BONUS;
    }

    if html.contains("<!DOCTYPE html>") && html.contains("<html>") {
        *scores.entry(FrameworkType::StaticHtml).or_default() += STATIC_DOCUMENT_BONUS;
    }

    let generators = generator_names(html);
    for (framework, needle, weight) in GENERATOR_BONUSES {
        if generators.iter().any(|g| g.contains(needle)) {
            *scores.entry(*framework).or_default() += weight;
        }
    }
}

/// Lowercased `content` values of every `<meta name="generator">` tag.
fn generator_names(html: &str) -> Vec<String> {
    GENERATOR_META
        .find_iter(html)
        .filter_map(|tag| {
            META_CONTENT
                .captures(tag.as_str())
                .and_then(|c| c.get(1))
                .map(|m| m.as_str().to_lowercase())
        })
        .collect()
}

fn extract_features(html: &str, framework: FrameworkType) -> BTreeSet<&'static str> {
    FEATURE_RULES
        .iter()
        .filter(|rule| rule.framework == framework)
        .filter(|rule| rule.any_of.iter().any(|needle| html.contains(needle)))
        .map(|rule| rule.feature)
        .collect()
}

fn extract_version(html: &str, framework: FrameworkType) -> Option<String> {
    let (_, patterns) = VERSION_PATTERNS.iter().find(|(f, _)| *f == framework)?;
    patterns
        .iter()
        .find_map(|p| p.captures(html).and_then(|c| c.get(1)).map(|m| m.as_str().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const NEXT_PAGE: &str = r#"
        <!DOCTYPE html>
        <html>
          <head>
            <script src="/_next/static/chunks/main.js"></script>
            <link rel="stylesheet" href="/_next/static/css/app.css">
          </head>
          <body>
            <div id="__next"></div>
          </body>
        </html>
    "#;

    #[test]
    fn test_detects_nextjs() {
        let result = detect(NEXT_PAGE, "https://example.com");
        assert_eq!(result.framework, FrameworkType::NextJs);
        assert!(result.confidence > 0.8);
        assert!(result.features.contains("static-generation"));
    }

    #[test]
    fn test_detects_wordpress_with_version() {
        let html = r#"
            <!DOCTYPE html>
            <html>
              <head>
                <meta name="generator" content="WordPress 6.0">
                <link rel="stylesheet" href="/wp-content/themes/theme/style.css">
                <script src="/wp-includes/js/jquery.js"></script>
              </head>
              <body><div class="wp-content"></div></body>
            </html>
        "#;
        let result = detect(html, "https://example.com");
        assert_eq!(result.framework, FrameworkType::WordPress);
        assert!(result.confidence > 0.8);
        assert_eq!(result.version.as_deref(), Some("6.0"));
        assert!(result.features.contains("custom-theme"));
    }

    #[test]
    fn test_detects_react() {
        let html = r#"
            <!DOCTYPE html>
            <html>
              <head><title>React App</title></head>
              <body>
                <div id="root" data-reactroot></div>
                <script>ReactDOM.render(<App />, document.getElementById('root'));</script>
              </body>
            </html>
        "#;
        let result = detect(html, "https://example.com");
        assert_eq!(result.framework, FrameworkType::React);
        assert!(result.confidence > 0.7);
        assert!(result.features.contains("class-components"));
    }

    #[test]
    fn test_detects_shopify_from_url_bonus() {
        let html = r#"
            <!DOCTYPE html>
            <html>
              <head>
                <link rel="stylesheet" href="/assets/theme.css">
                <script src="/assets/cart.js"></script>
              </head>
              <body><div class="shopify-section"></div></body>
            </html>
        "#;
        let result = detect(html, "https://myshopify.com");
        assert_eq!(result.framework, FrameworkType::Shopify);
        assert!(result.confidence > 0.7);
        assert!(result.features.contains("shopping-cart"));
    }

    #[test]
    fn test_plain_page_is_unknown() {
        let html = "<div>Hello World</div><p>Plain HTML <img src=\"/a.png\"><a href=\"/b.html\">b</a></p>";
        let result = detect(html, "https://example.com");
        assert_eq!(result.framework, FrameworkType::Unknown);
        assert!(result.confidence <= 0.6);
        assert_eq!(result.confidence, 0.0);
        assert!(result.features.is_empty());
    }

    #[test]
    fn test_doctype_only_is_static() {
        let result = detect("<!DOCTYPE html><html><body>hi</body></html>", "https://example.com");
        assert_eq!(result.framework, FrameworkType::StaticHtml);
        assert_eq!(result.confidence, 0.6);
    }

    #[test]
    fn test_deterministic() {
        let a = detect(NEXT_PAGE, "https://example.com/_next/x");
        let b = detect(NEXT_PAGE, "https://example.com/_next/x");
        assert_eq!(a, b);
    }

    #[test]
    fn test_overlap_lowers_confidence() {
        // A Vue widget embedded in a WordPress page: both fingerprints fire.
        let html = r#"<link href="/wp-content/x.css"><div v-if="a" v-for="b in c" v-model="d"></div>"#;
        let result = detect(html, "https://example.com");
        assert_eq!(result.framework, FrameworkType::Vue);
        assert_eq!(result.evidence.gap, 10);
        assert_eq!(result.confidence, 0.8);
    }

    #[test]
    fn test_confidence_monotonic_in_gap() {
        let mut previous = 0.0;
        for gap in 0..60 {
            let c = confidence_for_gap(gap);
            assert!(c >= previous, "confidence dropped at gap {gap}");
            assert!((0.0..=1.0).contains(&c));
            previous = c;
        }
        assert_eq!(confidence_for_gap(4), 0.6);
        assert_eq!(confidence_for_gap(5), 0.7);
        assert_eq!(confidence_for_gap(10), 0.8);
        assert_eq!(confidence_for_gap(15), 0.9);
        assert_eq!(confidence_for_gap(20), 0.95);
    }
}
