//! Site-building technology classification types.

use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

/// Closed set of technologies the detector can report.
///
/// Declaration order is the tie-break order when two candidates score the same.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FrameworkType {
    Unknown,
    React,
    #[serde(rename = "nextjs")]
    NextJs,
    Vue,
    Angular,
    #[serde(rename = "wordpress")]
    WordPress,
    #[serde(rename = "static")]
    StaticHtml,
    Shopify,
    Wix,
    Squarespace,
    Webflow,
    Custom,
}

impl FrameworkType {
    pub const ALL: [FrameworkType; 12] = [
        FrameworkType::Unknown,
        FrameworkType::React,
        FrameworkType::NextJs,
        FrameworkType::Vue,
        FrameworkType::Angular,
        FrameworkType::WordPress,
        FrameworkType::StaticHtml,
        FrameworkType::Shopify,
        FrameworkType::Wix,
        FrameworkType::Squarespace,
        FrameworkType::Webflow,
        FrameworkType::Custom,
    ];

    /// Stable machine identifier, used in logs and metric labels.
    pub fn as_str(self) -> &'static str {
        match self {
            FrameworkType::Unknown => "unknown",
            FrameworkType::React => "react",
            FrameworkType::NextJs => "nextjs",
            FrameworkType::Vue => "vue",
            FrameworkType::Angular => "angular",
            FrameworkType::WordPress => "wordpress",
            FrameworkType::StaticHtml => "static",
            FrameworkType::Shopify => "shopify",
            FrameworkType::Wix => "wix",
            FrameworkType::Squarespace => "squarespace",
            FrameworkType::Webflow => "webflow",
            FrameworkType::Custom => "custom",
        }
    }

    /// Human-readable name.
    pub fn display_name(self) -> &'static str {
        match self {
            FrameworkType::Unknown => "Unknown Framework",
            FrameworkType::React => "React",
            FrameworkType::NextJs => "Next.js",
            FrameworkType::Vue => "Vue.js",
            FrameworkType::Angular => "Angular",
            FrameworkType::WordPress => "WordPress",
            FrameworkType::StaticHtml => "Static HTML",
            FrameworkType::Shopify => "Shopify",
            FrameworkType::Wix => "Wix",
            FrameworkType::Squarespace => "Squarespace",
            FrameworkType::Webflow => "Webflow",
            FrameworkType::Custom => "Custom Framework",
        }
    }
}

impl fmt::Display for FrameworkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// How the classification was reached.
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct Evidence {
    /// Non-zero scores, highest first (ties in declaration order).
    pub scores: Vec<(FrameworkType, u32)>,
    /// Gap between the best and second-best score.
    pub gap: u32,
    /// Labels of the content signatures that matched.
    pub matched: Vec<&'static str>,
}

/// Result of classifying one fetched document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Classification {
    pub framework: FrameworkType,
    /// In `[0, 1]`; 0 only when nothing matched.
    pub confidence: f64,
    pub version: Option<String>,
    pub features: BTreeSet<&'static str>,
    pub evidence: Evidence,
}

impl Classification {
    pub fn unknown() -> Self {
        Self {
            framework: FrameworkType::Unknown,
            confidence: 0.0,
            version: None,
            features: BTreeSet::new(),
            evidence: Evidence::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names() {
        assert_eq!(FrameworkType::NextJs.display_name(), "Next.js");
        assert_eq!(FrameworkType::WordPress.display_name(), "WordPress");
        assert_eq!(FrameworkType::React.display_name(), "React");
        assert_eq!(FrameworkType::Shopify.display_name(), "Shopify");
        assert_eq!(FrameworkType::Unknown.to_string(), "Unknown Framework");
        assert_eq!(FrameworkType::StaticHtml.as_str(), "static");
    }

    #[test]
    fn test_serializes_as_identifier() {
        let json = serde_json::to_string(&FrameworkType::NextJs).unwrap();
        assert_eq!(json, "\"nextjs\"");
        let json = serde_json::to_string(&FrameworkType::StaticHtml).unwrap();
        assert_eq!(json, "\"static\"");
    }
}
