//! Static fingerprint tables.
//!
//! Content signatures are compiled once on first use and never mutated, so
//! concurrent detections share them without locking.

use once_cell::sync::Lazy;
use regex::Regex;

use super::framework::FrameworkType;

/// One weighted piece of content evidence.
pub struct Signature {
    pub label: &'static str,
    pub pattern: Regex,
    pub weight: u32,
}

/// Bonus applied when the source URL contains any of `needles` (lowercased).
pub struct UrlBonus {
    pub framework: FrameworkType,
    pub needles: &'static [&'static str],
    pub weight: u32,
}

/// Feature reported when any of `any_of` occurs in the document.
pub struct FeatureRule {
    pub framework: FrameworkType,
    pub any_of: &'static [&'static str],
    pub feature: &'static str,
}

fn table(framework: FrameworkType, rules: &[(&'static str, u32)]) -> (FrameworkType, Vec<Signature>) {
    let signatures = rules
        .iter()
        .map(|&(pattern, weight)| Signature {
            label: pattern,
            pattern: Regex::new(&format!("(?i){}", pattern)).expect("static signature pattern"),
            weight,
        })
        .collect();
    (framework, signatures)
}

pub static CONTENT_SIGNATURES: Lazy<Vec<(FrameworkType, Vec<Signature>)>> = Lazy::new(|| {
    vec![
        table(
            FrameworkType::React,
            &[
                (r#"<div[^>]*id="root"[^>]*>"#, 10),
                (r#"<div[^>]*id="app"[^>]*>"#, 8),
                (r"data-reactroot", 15),
                (r"react-helmet", 12),
                (r"_reactDevtools", 10),
                (r"react\.js", 8),
                (r"ReactDOM\.render", 12),
                (r"useState|useEffect|useContext", 6),
            ],
        ),
        table(
            FrameworkType::NextJs,
            &[
                (r"_next/", 20),
                (r"__next/", 18),
                (r"next\.js", 15),
                (r"next/router", 12),
                (r"next/link", 10),
                (r"next/image", 10),
                (r"next/head", 8),
                (r"next/script", 8),
                (r"next\.config", 6),
            ],
        ),
        table(
            FrameworkType::Vue,
            &[
                (r"vue\.js", 15),
                (r"v-app", 12),
                (r"v-model", 10),
                (r"v-for", 10),
                (r"v-if", 10),
                (r"v-show", 8),
                (r"new Vue\(", 12),
                (r"createApp\(", 12),
                (r"@vue", 8),
            ],
        ),
        table(
            FrameworkType::Angular,
            &[
                (r"angular\.js", 15),
                (r"ng-app", 12),
                (r"ng-model", 10),
                (r"ng-repeat", 10),
                (r"ng-if", 10),
                (r"ng-show", 8),
                (r"@angular", 12),
                (r"angular\.min\.js", 8),
                (r"angular\.css", 6),
            ],
        ),
        table(
            FrameworkType::WordPress,
            &[
                (r"wp-content", 20),
                (r"wp-includes", 18),
                (r"wp-admin", 15),
                (r"wordpress", 12),
                (r"wp-json", 10),
                (r"wp_head", 8),
                (r"wp_footer", 8),
                (r"wp_enqueue_script", 6),
                (r"wp_enqueue_style", 6),
            ],
        ),
        table(
            FrameworkType::Shopify,
            &[
                (r"cdn\.shopify\.com", 20),
                (r"shopify\.com", 15),
                (r"shopify\.js", 12),
                (r"shopify\.css", 10),
                (r"cart\.js", 8),
                (r"option_selection\.js", 8),
                (r"shopify\.liquid", 6),
            ],
        ),
        table(
            FrameworkType::Wix,
            &[
                (r"wix\.com", 15),
                (r"wixsite\.com", 20),
                (r"wix\.js", 12),
                (r"wix\.css", 10),
                (r"wixapps\.net", 18),
                (r"wix\.html", 6),
            ],
        ),
        table(
            FrameworkType::Squarespace,
            &[
                (r"squarespace\.com", 15),
                (r"static1\.squarespace\.com", 18),
                (r"static\.squarespace\.com", 18),
                (r"squarespace\.js", 12),
                (r"squarespace\.css", 10),
            ],
        ),
        table(
            FrameworkType::Webflow,
            &[
                (r"webflow\.com", 15),
                (r"webflow\.js", 12),
                (r"webflow\.css", 10),
                (r"webflow\.html", 6),
            ],
        ),
    ]
});

pub const URL_BONUSES: &[UrlBonus] = &[
    UrlBonus {
        framework: FrameworkType::WordPress,
        needles: &["wp-content", "wp-includes"],
        weight: 15,
    },
    UrlBonus {
        framework: FrameworkType::NextJs,
        needles: &["_next/", "__next/"],
        weight: 20,
    },
    UrlBonus {
        framework: FrameworkType::Shopify,
        needles: &["cdn.shopify.com", "myshopify.com"],
        weight: 18,
    },
    UrlBonus {
        framework: FrameworkType::Wix,
        needles: &["wixsite.com", "wixapps.net"],
        weight: 18,
    },
    UrlBonus {
        framework: FrameworkType::Squarespace,
        needles: &["static1.squarespace.com", "static.squarespace.com"],
        weight: 18,
    },
];

/// Bonus for a `<meta name="generator">` naming the technology.
pub const GENERATOR_BONUSES: &[(FrameworkType, &str, u32)] = &[
    (FrameworkType::WordPress, "wordpress", 10),
    (FrameworkType::NextJs, "next.js", 10),
];

/// Root mount points conventionally emitted by component frameworks.
pub const ROOT_MOUNT_MARKERS: &[&str] = &[r#"<div id="root">"#, r#"<div id="app">"#];
pub const ROOT_MOUNT_BONUS: u32 = 5;

pub const STATIC_DOCUMENT_BONUS: u32 = 3;

pub static GENERATOR_META: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)<meta\b[^>]*\bname\s*=\s*["']?generator["']?[^>]*>"#).expect("static generator pattern")
});

pub static META_CONTENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)\bcontent\s*=\s*["']([^"']*)["']"#).expect("static meta content pattern")
});

pub const FEATURE_RULES: &[FeatureRule] = &[
    FeatureRule { framework: FrameworkType::React, any_of: &["useState", "useEffect"], feature: "hooks" },
    FeatureRule { framework: FrameworkType::React, any_of: &["ReactDOM.render"], feature: "class-components" },
    FeatureRule { framework: FrameworkType::React, any_of: &["createRoot"], feature: "react-18" },
    FeatureRule { framework: FrameworkType::NextJs, any_of: &["_next/"], feature: "static-generation" },
    FeatureRule { framework: FrameworkType::NextJs, any_of: &["__next/"], feature: "app-router" },
    FeatureRule { framework: FrameworkType::NextJs, any_of: &["next/image"], feature: "image-optimization" },
    FeatureRule { framework: FrameworkType::Vue, any_of: &["v-model"], feature: "two-way-binding" },
    FeatureRule { framework: FrameworkType::Vue, any_of: &["v-for"], feature: "list-rendering" },
    FeatureRule { framework: FrameworkType::Vue, any_of: &["v-if"], feature: "conditional-rendering" },
    FeatureRule { framework: FrameworkType::WordPress, any_of: &["wp-content/themes"], feature: "custom-theme" },
    FeatureRule { framework: FrameworkType::WordPress, any_of: &["wp-content/plugins"], feature: "plugins" },
    FeatureRule { framework: FrameworkType::WordPress, any_of: &["wp-json"], feature: "rest-api" },
    FeatureRule { framework: FrameworkType::Shopify, any_of: &["cart.js"], feature: "shopping-cart" },
    FeatureRule { framework: FrameworkType::Shopify, any_of: &["option_selection.js"], feature: "product-options" },
];

fn versions(framework: FrameworkType, patterns: &[&str]) -> (FrameworkType, Vec<Regex>) {
    let compiled = patterns
        .iter()
        .map(|p| Regex::new(&format!("(?i){}", p)).expect("static version pattern"))
        .collect();
    (framework, compiled)
}

pub static VERSION_PATTERNS: Lazy<Vec<(FrameworkType, Vec<Regex>)>> = Lazy::new(|| {
    vec![
        versions(FrameworkType::React, &[r"react@([\d.]+)", r"React\s+([\d.]+)"]),
        versions(FrameworkType::NextJs, &[r"next@([\d.]+)", r"Next\.js\s+([\d.]+)"]),
        versions(FrameworkType::Vue, &[r"vue@([\d.]+)", r"Vue\.js\s+([\d.]+)"]),
        versions(FrameworkType::Angular, &[r"angular@([\d.]+)", r"Angular\s+([\d.]+)"]),
        versions(FrameworkType::WordPress, &[r"WordPress\s+([\d.]+)", r"wp_version=([\d.]+)"]),
        versions(FrameworkType::Shopify, &[r"Shopify\s+([\d.]+)"]),
        versions(FrameworkType::Wix, &[r"Wix\s+([\d.]+)"]),
        versions(FrameworkType::Squarespace, &[r"Squarespace\s+([\d.]+)"]),
        versions(FrameworkType::Webflow, &[r"Webflow\s+([\d.]+)"]),
    ]
});
