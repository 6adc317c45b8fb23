//! Upstream fetching.
//!
//! # Responsibilities
//! - Own the shared `reqwest::Client` (pooling, decompression, redirects)
//! - Build the forwarded header subset
//! - Translate timeouts, redirect loops and network failures into `UpstreamError`
//!
//! # Design Decisions
//! - One bounded timeout covers connect, redirects and body
//! - Never retried here; retry policy belongs to the caller

use std::error::Error as _;
use std::time::Duration;

use axum::body::Bytes;
use axum::http::{header, HeaderMap, HeaderValue, Method, StatusCode};
use reqwest::redirect;
use thiserror::Error;
use url::Url;

use crate::codec::{validate, UnsafeTargetError};
use crate::config::ProxyConfig;

#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("HTTP {status}: {reason}")]
    Status { status: u16, reason: String },

    #[error("timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    #[error("too many redirects (limit {0})")]
    TooManyRedirects(usize),

    #[error("redirect refused: {0}")]
    UnsafeRedirect(UnsafeTargetError),

    #[error("network error: {0}")]
    Network(String),

    #[error("invalid client configuration: {0}")]
    Client(String),
}

/// Body and metadata of a successful upstream response.
#[derive(Debug)]
pub struct UpstreamResponse {
    pub status: StatusCode,
    /// URL after redirects.
    pub final_url: Url,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl UpstreamResponse {
    pub fn content_type(&self) -> &str {
        self.headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
    }
}

/// Header defaults used when the browser supplied none.
#[derive(Debug, Clone)]
struct HeaderDefaults {
    user_agent: HeaderValue,
    accept_language: HeaderValue,
}

#[derive(Debug, Clone)]
pub struct UpstreamClient {
    client: reqwest::Client,
    timeout: Duration,
    max_redirects: usize,
    defaults: HeaderDefaults,
}

impl UpstreamClient {
    pub fn new(config: &ProxyConfig) -> Result<Self, UpstreamError> {
        let timeout = Duration::from_secs(config.timeouts.upstream_secs);
        let max_redirects = config.upstream.max_redirects;

        let policy = if config.upstream.revalidate_targets {
            redirect::Policy::custom(move |attempt| {
                match check_hop(attempt.url(), attempt.previous().len(), max_redirects) {
                    Ok(()) => attempt.follow(),
                    Err(e) => attempt.error(e),
                }
            })
        } else {
            redirect::Policy::limited(max_redirects)
        };

        let mut builder = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(config.timeouts.connect_secs))
            .redirect(policy)
            .gzip(true)
            .brotli(true)
            .deflate(true);
        if !config.upstream.system_proxy {
            builder = builder.no_proxy();
        }
        let client = builder.build().map_err(|e| UpstreamError::Client(e.to_string()))?;

        let defaults = HeaderDefaults {
            user_agent: HeaderValue::from_str(&config.upstream.user_agent)
                .map_err(|e| UpstreamError::Client(format!("user_agent: {e}")))?,
            accept_language: HeaderValue::from_str(&config.upstream.accept_language)
                .map_err(|e| UpstreamError::Client(format!("accept_language: {e}")))?,
        };

        Ok(Self {
            client,
            timeout,
            max_redirects,
            defaults,
        })
    }

    /// Fetch `url` with the incoming method, forwarding a safe header subset.
    pub async fn fetch(
        &self,
        method: Method,
        url: Url,
        incoming: &HeaderMap,
        upstream_origin: &str,
        body: Bytes,
    ) -> Result<UpstreamResponse, UpstreamError> {
        let headers = forwarded_headers(incoming, upstream_origin, &self.defaults);
        let mut request = self.client.request(method.clone(), url).headers(headers);
        if method != Method::GET && method != Method::HEAD && !body.is_empty() {
            request = request.body(body);
        }

        let response = request.send().await.map_err(|e| self.classify(e))?;

        let status = response.status();
        if status.is_client_error() || status.is_server_error() {
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
            });
        }

        let final_url = response.url().clone();
        let headers = response.headers().clone();
        let body = response.bytes().await.map_err(|e| self.classify(e))?;

        Ok(UpstreamResponse {
            status,
            final_url,
            headers,
            body,
        })
    }

    fn classify(&self, error: reqwest::Error) -> UpstreamError {
        if let Some(refused) = refused_hop(&error) {
            UpstreamError::UnsafeRedirect(refused)
        } else if error.is_timeout() {
            UpstreamError::Timeout(self.timeout)
        } else if error.is_redirect() {
            UpstreamError::TooManyRedirects(self.max_redirects)
        } else {
            UpstreamError::Network(error.to_string())
        }
    }
}

/// Verdict for one redirect hop when targets are revalidated.
/// `hops` counts the requests already made, as reqwest's limited policy does.
fn check_hop(next: &Url, hops: usize, max_redirects: usize) -> Result<(), UpstreamError> {
    if hops >= max_redirects {
        return Err(UpstreamError::TooManyRedirects(max_redirects));
    }
    validate(next.as_str())
        .map(|_| ())
        .map_err(UpstreamError::UnsafeRedirect)
}

/// Target rejected by `check_hop`, if that is what stopped the request.
fn refused_hop(error: &reqwest::Error) -> Option<UnsafeTargetError> {
    let mut source = error.source();
    while let Some(err) = source {
        if let Some(UpstreamError::UnsafeRedirect(target)) = err.downcast_ref::<UpstreamError>() {
            return Some(target.clone());
        }
        source = err.source();
    }
    None
}

/// Headers sent upstream.
///
/// Accept-Encoding is left to the client, which advertises exactly the
/// encodings it can decode.
fn forwarded_headers(incoming: &HeaderMap, upstream_origin: &str, defaults: &HeaderDefaults) -> HeaderMap {
    let mut headers = HeaderMap::new();

    headers.insert(
        header::USER_AGENT,
        incoming
            .get(header::USER_AGENT)
            .cloned()
            .unwrap_or_else(|| defaults.user_agent.clone()),
    );
    headers.insert(
        header::ACCEPT,
        incoming
            .get(header::ACCEPT)
            .cloned()
            .unwrap_or_else(|| HeaderValue::from_static("*/*")),
    );
    headers.insert(
        header::ACCEPT_LANGUAGE,
        incoming
            .get(header::ACCEPT_LANGUAGE)
            .cloned()
            .unwrap_or_else(|| defaults.accept_language.clone()),
    );
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    headers.insert(header::PRAGMA, HeaderValue::from_static("no-cache"));

    if let Some(cookie) = incoming.get(header::COOKIE) {
        headers.insert(header::COOKIE, cookie.clone());
    }
    if incoming.contains_key(header::REFERER) {
        if let Ok(referer) = HeaderValue::from_str(&format!("{}/", upstream_origin)) {
            headers.insert(header::REFERER, referer);
        }
    }
    if let Some(content_type) = incoming.get(header::CONTENT_TYPE) {
        headers.insert(header::CONTENT_TYPE, content_type.clone());
    }

    headers
}
