//! Target URL safety checks.
//!
//! # Responsibilities
//! - Allow only `http`/`https` targets with a non-empty host
//! - Reject loopback, link-local, private and unspecified hosts (v4 and v6)
//! - Normalize user input and derive origins
//!
//! # Design Decisions
//! - Runs before any fetch is attempted; a rejected target never hits the network
//! - Hosts are judged on the parsed `url::Host`, not on string prefixes

use std::net::{Ipv4Addr, Ipv6Addr};
use thiserror::Error;
use url::{Host, Url};

/// Why a URL is not eligible to be proxied.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum UnsafeTargetError {
    #[error("Invalid URL format: {0}")]
    InvalidFormat(String),

    #[error("Protocol '{0}:' is not allowed. Only HTTP and HTTPS are supported.")]
    Scheme(String),

    #[error("URL must have a valid hostname")]
    MissingHost,

    #[error("Private/localhost addresses are not allowed for security reasons: {0}")]
    PrivateAddress(String),
}

impl UnsafeTargetError {
    /// Human-readable reason, as returned to launch callers.
    pub fn reason(&self) -> String {
        self.to_string()
    }
}

/// A URL that passed [`validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedTarget {
    pub url: Url,
    pub hostname: String,
}

impl ValidatedTarget {
    pub fn scheme(&self) -> &str {
        self.url.scheme()
    }

    pub fn path(&self) -> &str {
        self.url.path()
    }
}

/// Check that `url` may be proxied.
pub fn validate(url: &str) -> Result<ValidatedTarget, UnsafeTargetError> {
    let parsed = Url::parse(url).map_err(|e| UnsafeTargetError::InvalidFormat(e.to_string()))?;

    match parsed.scheme() {
        "http" | "https" => {}
        other => return Err(UnsafeTargetError::Scheme(other.to_string())),
    }

    let host = match parsed.host() {
        Some(host) => host,
        None => return Err(UnsafeTargetError::MissingHost),
    };

    let hostname = match &host {
        Host::Domain(d) => d.to_string(),
        Host::Ipv4(ip) => ip.to_string(),
        Host::Ipv6(ip) => ip.to_string(),
    };
    if hostname.is_empty() {
        return Err(UnsafeTargetError::MissingHost);
    }

    if is_private_host(&host) {
        return Err(UnsafeTargetError::PrivateAddress(hostname));
    }

    Ok(ValidatedTarget { url: parsed, hostname })
}

fn is_private_host(host: &Host<&str>) -> bool {
    match host {
        Host::Domain(d) => {
            let d = d.trim_end_matches('.').to_ascii_lowercase();
            d == "localhost" || d.ends_with(".localhost")
        }
        Host::Ipv4(ip) => is_private_v4(ip),
        Host::Ipv6(ip) => is_private_v6(ip),
    }
}

fn is_private_v4(ip: &Ipv4Addr) -> bool {
    ip.is_loopback() || ip.is_private() || ip.is_link_local() || ip.is_unspecified()
}

fn is_private_v6(ip: &Ipv6Addr) -> bool {
    if ip.is_loopback() || ip.is_unspecified() {
        return true;
    }
    if let Some(v4) = ip.to_ipv4_mapped() {
        return is_private_v4(&v4);
    }
    let first = ip.segments()[0];
    // fc00::/7 unique local, fe80::/10 link-local
    (first & 0xfe00) == 0xfc00 || (first & 0xffc0) == 0xfe80
}

/// Prepend `https://` when the input carries no scheme, then require it to parse.
///
/// An explicit foreign scheme is kept so that [`validate`] can name it.
pub fn normalize_url(input: &str) -> Result<String, UnsafeTargetError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(UnsafeTargetError::InvalidFormat("URL cannot be empty".to_string()));
    }

    let candidate = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    };

    Url::parse(&candidate)
        .map(|u| u.to_string())
        .map_err(|e| UnsafeTargetError::InvalidFormat(e.to_string()))
}

/// `scheme://host[:port]` of an absolute URL, without a trailing slash.
pub fn origin_of(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    match parsed.origin() {
        origin @ url::Origin::Tuple(..) => Some(origin.ascii_serialization()),
        url::Origin::Opaque(_) => None,
    }
}

/// True when both URLs parse and share scheme, host and port.
pub fn same_origin(a: &str, b: &str) -> bool {
    match (Url::parse(a), Url::parse(b)) {
        (Ok(a), Ok(b)) => a.origin() == b.origin(),
        _ => false,
    }
}
