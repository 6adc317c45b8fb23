//! Configuration validation.
//!
//! Semantic checks only; serde has already handled syntax. Every violation
//! is collected so a bad file can be fixed in one go.

use std::fmt;
use std::net::SocketAddr;

use url::Url;

use crate::config::schema::ProxyConfig;
use crate::session::MAX_TTL_SECS;

/// One semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a configuration, returning all violations.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("'{}' is not a socket address", config.listener.bind_address),
        ));
    }

    for (field, value) in [
        ("timeouts.request_secs", config.timeouts.request_secs),
        ("timeouts.upstream_secs", config.timeouts.upstream_secs),
        ("timeouts.connect_secs", config.timeouts.connect_secs),
    ] {
        if value == 0 {
            errors.push(ValidationError::new(field, "must be greater than 0"));
        }
    }

    for (field, value) in [
        ("editor.mount_prefix", &config.editor.mount_prefix),
        ("editor.asset_route", &config.editor.asset_route),
    ] {
        if !value.starts_with('/') || value.ends_with('/') {
            errors.push(ValidationError::new(
                field,
                format!("'{}' must start with '/' and must not end with '/'", value),
            ));
        }
    }

    if config.editor.mount_prefix == config.editor.asset_route {
        errors.push(ValidationError::new(
            "editor.asset_route",
            "must differ from editor.mount_prefix",
        ));
    }

    match Url::parse(&config.editor.parent_origin) {
        Ok(url) if matches!(url.scheme(), "http" | "https") && url.host_str().is_some() => {}
        _ => errors.push(ValidationError::new(
            "editor.parent_origin",
            format!("'{}' is not an absolute http(s) URL", config.editor.parent_origin),
        )),
    }

    if config.session.id_bytes < 8 {
        errors.push(ValidationError::new("session.id_bytes", "must be at least 8"));
    }

    if config.session.ttl_secs > MAX_TTL_SECS {
        errors.push(ValidationError::new(
            "session.ttl_secs",
            format!("must be at most {MAX_TTL_SECS} (one year)"),
        ));
    }

    if !matches!(config.observability.log_format.as_str(), "pretty" | "json") {
        errors.push(ValidationError::new(
            "observability.log_format",
            format!("unknown format '{}' (expected pretty or json)", config.observability.log_format),
        ));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("'{}' is not a socket address", config.observability.metrics_address),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(validate_config(&ProxyConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_every_violation() {
        let mut config = ProxyConfig::default();
        config.listener.bind_address = "nowhere".into();
        config.timeouts.upstream_secs = 0;
        config.editor.mount_prefix = "proxy/".into();
        config.editor.parent_origin = "ftp://files".into();
        config.session.id_bytes = 4;
        config.session.ttl_secs = u64::MAX;
        config.observability.log_format = "xml".into();

        let errors = validate_config(&config).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
        assert_eq!(
            fields,
            vec![
                "listener.bind_address",
                "timeouts.upstream_secs",
                "editor.mount_prefix",
                "editor.parent_origin",
                "session.id_bytes",
                "session.ttl_secs",
                "observability.log_format",
            ]
        );
    }

    #[test]
    fn test_ttl_upper_bound() {
        let mut config = ProxyConfig::default();
        config.session.ttl_secs = MAX_TTL_SECS;
        assert!(validate_config(&config).is_ok());
        config.session.ttl_secs = 10_000_000_000_000;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors[0].field, "session.ttl_secs");
    }

    #[test]
    fn test_metrics_address_checked_only_when_enabled() {
        let mut config = ProxyConfig::default();
        config.observability.metrics_address = "bad".into();
        assert!(validate_config(&config).is_ok());
        config.observability.metrics_enabled = true;
        assert!(validate_config(&config).is_err());
    }
}
