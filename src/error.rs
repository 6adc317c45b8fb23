//! Crate-wide error type.

use axum::http::StatusCode;
use thiserror::Error;

use crate::codec::{DecodeError, UnsafeTargetError};
use crate::config::loader::ConfigError;
use crate::pipeline::upstream::UpstreamError;
use crate::rewrite::RewriteError;
use crate::session::SessionError;

#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("invalid encoded origin: {0}")]
    Decode(#[from] DecodeError),

    #[error("invalid session: {0}")]
    InvalidSession(#[from] SessionError),

    #[error("{0}")]
    UnsafeTarget(#[from] UnsafeTargetError),

    #[error("upstream request failed: {0}")]
    Upstream(#[source] UpstreamError),

    #[error("rewrite failed: {0}")]
    Rewrite(#[from] RewriteError),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A redirect refused by target validation is reported as an unsafe target.
impl From<UpstreamError> for ProxyError {
    fn from(error: UpstreamError) -> Self {
        match error {
            UpstreamError::UnsafeRedirect(target) => ProxyError::UnsafeTarget(target),
            other => ProxyError::Upstream(other),
        }
    }
}

pub type ProxyResult<T> = Result<T, ProxyError>;

impl ProxyError {
    /// Status used when the error is surfaced outside the pipeline's error page.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ProxyError::Decode(_) | ProxyError::InvalidSession(_) | ProxyError::UnsafeTarget(_) => {
                StatusCode::BAD_REQUEST
            }
            ProxyError::Upstream(UpstreamError::Timeout(_)) => StatusCode::GATEWAY_TIMEOUT,
            ProxyError::Upstream(_) => StatusCode::BAD_GATEWAY,
            ProxyError::Rewrite(_) | ProxyError::Config(_) | ProxyError::Io(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Short machine label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            ProxyError::Decode(_) => "decode",
            ProxyError::InvalidSession(_) => "invalid_session",
            ProxyError::UnsafeTarget(_) => "unsafe_target",
            ProxyError::Upstream(_) => "upstream",
            ProxyError::Rewrite(_) => "rewrite",
            ProxyError::Config(_) => "config",
            ProxyError::Io(_) => "io",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_status_codes() {
        assert_eq!(ProxyError::from(DecodeError::Empty).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ProxyError::from(SessionError::TooShort).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ProxyError::from(UnsafeTargetError::MissingHost).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ProxyError::from(UpstreamError::Timeout(Duration::from_secs(30))).status_code(),
            StatusCode::GATEWAY_TIMEOUT
        );
        assert_eq!(
            ProxyError::from(UpstreamError::Status {
                status: 503,
                reason: "Service Unavailable".into()
            })
            .status_code(),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn test_refused_redirect_is_unsafe_target() {
        let err = ProxyError::from(UpstreamError::UnsafeRedirect(UnsafeTargetError::PrivateAddress(
            "10.0.0.1".into(),
        )));
        assert!(matches!(err, ProxyError::UnsafeTarget(UnsafeTargetError::PrivateAddress(_))));
        assert_eq!(err.kind(), "unsafe_target");
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);

        let err = ProxyError::from(UpstreamError::TooManyRedirects(5));
        assert_eq!(err.kind(), "upstream");
    }

    #[test]
    fn test_messages() {
        let err = ProxyError::from(UpstreamError::Status {
            status: 503,
            reason: "Service Unavailable".into(),
        });
        assert_eq!(err.to_string(), "upstream request failed: HTTP 503: Service Unavailable");
        assert_eq!(err.kind(), "upstream");
    }
}
