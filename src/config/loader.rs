//! Configuration loading from disk and the environment.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::ProxyConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value '{value}' for {var}")]
    Env { var: &'static str, value: String },

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors.iter().map(|e| e.to_string()).collect::<Vec<_>>().join(", ")
}

pub const ENV_BIND: &str = "EDITOR_PROXY_BIND";
pub const ENV_UPSTREAM_TIMEOUT: &str = "EDITOR_PROXY_UPSTREAM_TIMEOUT_SECS";
pub const ENV_MAX_REDIRECTS: &str = "EDITOR_PROXY_MAX_REDIRECTS";
pub const ENV_SESSION_TTL: &str = "EDITOR_PROXY_SESSION_TTL_SECS";
pub const ENV_LOG_LEVEL: &str = "EDITOR_PROXY_LOG_LEVEL";
pub const ENV_LOG_FORMAT: &str = "EDITOR_PROXY_LOG_FORMAT";

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<ProxyConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: ProxyConfig = toml::from_str(&content)?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Resolve the effective configuration: file (or defaults), then
/// environment overrides, then validation.
pub fn load(path: Option<&Path>) -> Result<ProxyConfig, ConfigError> {
    let config = match path {
        Some(path) => toml::from_str(&fs::read_to_string(path)?)?,
        None => ProxyConfig::default(),
    };
    let config = apply_overrides(config, |var| std::env::var(var).ok())?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Overlay `EDITOR_PROXY_*` variables looked up through `lookup`.
pub fn apply_overrides(
    mut config: ProxyConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<ProxyConfig, ConfigError> {
    if let Some(bind) = lookup(ENV_BIND) {
        config.listener.bind_address = bind;
    }
    if let Some(value) = lookup(ENV_UPSTREAM_TIMEOUT) {
        config.timeouts.upstream_secs = parse_number(ENV_UPSTREAM_TIMEOUT, value)?;
    }
    if let Some(value) = lookup(ENV_MAX_REDIRECTS) {
        config.upstream.max_redirects = parse_number(ENV_MAX_REDIRECTS, value)?;
    }
    if let Some(value) = lookup(ENV_SESSION_TTL) {
        config.session.ttl_secs = parse_number(ENV_SESSION_TTL, value)?;
    }
    if let Some(level) = lookup(ENV_LOG_LEVEL) {
        config.observability.log_level = level;
    }
    if let Some(format) = lookup(ENV_LOG_FORMAT) {
        config.observability.log_format = format;
    }
    Ok(config)
}

fn parse_number<T: std::str::FromStr>(var: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::Env { var, value })
}
