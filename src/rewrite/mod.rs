//! Framework-Aware Rewriter subsystem.
//!
//! # Data Flow
//! ```text
//! HTML (already injected) + Classification
//!     → rules.rs (rule-set pairs, counted as framework-specific rewrites)
//!     → frameworks.rs (Next.js / WordPress / Shopify / React routines)
//!       or generic.rs (absolute same-origin + relative references)
//!     → canonical.rs (absolute links to the proxy's own host)
//!     → stats.rs (URL counters)
//!
//! Script payloads
//!     → bundler.rs (public-path assignments only)
//! ```
//!
//! # Design Decisions
//! - Every routine is a pure `&str → String` transform; callers log
//! - Values already carrying the proxy marker are never touched again
//! - The editor asset route always loads from the proxy itself

pub mod bundler;
pub mod canonical;
pub mod frameworks;
pub mod generic;
pub mod rules;
pub mod stats;

use serde::Serialize;
use thiserror::Error;
use url::{Position, Url};

use crate::codec::{origin_of, ProxyScope};
use crate::detect::{Classification, FrameworkType};

pub use bundler::{is_bundler_chunk, rewrite_public_path};
pub use canonical::canonicalize_host;
pub use rules::{rules_for, RuleSet};
pub use stats::{count_urls, RewriteStats};

#[derive(Debug, Error)]
pub enum RewriteError {
    #[error("cannot derive an origin from {0}")]
    NoOrigin(String),

    #[error("invalid rewrite pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// Everything a rewrite pass needs to know about where the page lives.
#[derive(Debug, Clone)]
pub struct RewriteContext {
    scope: ProxyScope,
    base_url: Url,
    origin: String,
    asset_route: String,
    proxy_host: Option<String>,
    marker: String,
}

impl RewriteContext {
    /// `base_url` is the page's own URL; its origin scopes every rewritten path.
    pub fn new(
        prefix: &str,
        session_id: &str,
        base_url: &str,
        asset_route: &str,
    ) -> Result<Self, RewriteError> {
        let parsed = Url::parse(base_url).map_err(|_| RewriteError::NoOrigin(base_url.to_string()))?;
        let origin = origin_of(base_url).ok_or_else(|| RewriteError::NoOrigin(base_url.to_string()))?;
        let scope = ProxyScope::for_origin(prefix, session_id, &origin);
        let marker = scope.marker();
        Ok(Self {
            scope,
            base_url: parsed,
            origin,
            asset_route: asset_route.trim_end_matches('/').to_string(),
            proxy_host: None,
            marker,
        })
    }

    /// Host the proxy itself was reached on, for canonicalization.
    pub fn with_proxy_host(mut self, host: Option<&str>) -> Self {
        self.proxy_host = host.filter(|h| !h.is_empty()).map(str::to_string);
        self
    }

    pub fn scope(&self) -> &ProxyScope {
        &self.scope
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn marker(&self) -> &str {
        &self.marker
    }

    /// Values no routine may rewrite: protocol-relative, already proxied,
    /// or pointing at the editor assets.
    pub fn is_protected(&self, value: &str) -> bool {
        value.starts_with("//")
            || value.contains(&self.marker)
            || value == self.asset_route
            || value
                .strip_prefix(self.asset_route.as_str())
                .is_some_and(|rest| rest.starts_with('/'))
    }

    /// Proxy path for a page-relative or root-relative reference.
    pub fn resolve(&self, value: &str) -> String {
        if value.starts_with('/') {
            return self.scope.path(value);
        }
        match self.base_url.join(value) {
            Ok(joined) if origin_of(joined.as_str()).as_deref() == Some(self.origin.as_str()) => {
                self.scope.path(&joined[Position::BeforePath..])
            }
            _ => self.scope.path(value),
        }
    }
}

/// Rewritten document plus counters.
#[derive(Debug, Clone)]
pub struct RewriteOutcome {
    pub html: String,
    pub stats: RewriteStats,
    pub canonicalized: usize,
}

/// Run the full HTML pass for one classified document.
pub fn rewrite_html(
    html: &str,
    ctx: &RewriteContext,
    classification: &Classification,
) -> Result<RewriteOutcome, RewriteError> {
    let rules = rules_for(classification.framework);
    let (paired, framework_specific) = rules.apply_pairs(html, ctx.scope());

    let routed = match classification.framework {
        FrameworkType::NextJs => frameworks::next_js(&paired, ctx),
        FrameworkType::WordPress => frameworks::wordpress(&paired, ctx),
        FrameworkType::Shopify => frameworks::shopify(&paired, ctx),
        FrameworkType::React => frameworks::react(&paired, ctx),
        _ => generic::rewrite(&paired, ctx, rules)?,
    };

    let (html, canonicalized) = match ctx.proxy_host.as_deref() {
        Some(host) => canonicalize_host(&routed, host, ctx.scope())?,
        None => (routed, 0),
    };

    let mut stats = count_urls(&html, ctx.marker());
    stats.framework_specific_rewrites = framework_specific;

    Ok(RewriteOutcome {
        html,
        stats,
        canonicalized,
    })
}
