//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the editor proxy.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the editor proxy.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ProxyConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Upstream fetch behaviour.
    pub upstream: UpstreamConfig,

    /// Session issuing.
    pub session: SessionConfig,

    /// Editing-layer wiring.
    pub editor: EditorConfig,

    /// Request limits.
    pub security: SecurityConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:3000").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3000".to_string(),
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Whole inbound request, including the upstream fetch and rewriting.
    pub request_secs: u64,

    /// Upstream fetch, redirects included.
    pub upstream_secs: u64,

    /// TCP connect to the upstream.
    pub connect_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            request_secs: 60,
            upstream_secs: 30,
            connect_secs: 10,
        }
    }
}

/// Upstream fetch configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Redirect hops followed before giving up.
    pub max_redirects: usize,

    /// User agent sent when the browser supplied none.
    pub user_agent: String,

    /// Accept-Language sent when the browser supplied none.
    pub accept_language: String,

    /// Re-run the target safety check on every proxied fetch and redirect hop.
    pub revalidate_targets: bool,

    /// Honour `HTTP_PROXY`/`HTTPS_PROXY` for upstream fetches.
    pub system_proxy: bool,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            max_redirects: 5,
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string(),
            accept_language: "en-US,en;q=0.9".to_string(),
            revalidate_targets: false,
            system_proxy: true,
        }
    }
}

/// Session configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Lifetime stamped on new sessions; 0 means no expiry.
    pub ttl_secs: u64,

    /// Random bytes per session id (hex-encoded, so twice as many characters).
    pub id_bytes: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ttl_secs: 3600,
            id_bytes: 20,
        }
    }
}

/// Editing-layer configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Path prefix every proxy route is mounted under.
    pub mount_prefix: String,

    /// Route the editor runtime assets are served from.
    pub asset_route: String,

    /// Directory holding `runtime.js` and `runtime.css`.
    pub assets_dir: String,

    /// Origin of the page embedding the proxied iframe.
    pub parent_origin: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            mount_prefix: "/proxy".to_string(),
            asset_route: "/__editor".to_string(),
            assets_dir: "public/__editor".to_string(),
            parent_origin: "http://localhost:3333".to_string(),
        }
    }
}

/// Request limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Maximum forwarded request body size in bytes.
    pub max_body_size: usize,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_body_size: 2 * 1024 * 1024,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Default log filter when `RUST_LOG` is unset.
    pub log_level: String,

    /// `pretty` or `json`.
    pub log_format: String,

    /// Enable the Prometheus exporter.
    pub metrics_enabled: bool,

    /// Metrics listener address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
