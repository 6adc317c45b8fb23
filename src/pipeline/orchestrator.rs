//! Per-request orchestration.
//!
//! `received → validated → fetched → {html | script | binary} → responded`,
//! with every failure collapsing into the error page.

use std::time::Instant;

use axum::body::{Body, Bytes};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::codec::{decode, origin_of, validate, ProxyScope, UnsafeTargetError};
use crate::config::ProxyConfig;
use crate::detect::detect;
use crate::error::{ProxyError, ProxyResult};
use crate::observability::metrics;
use crate::rewrite::{is_bundler_chunk, rewrite_html, rewrite_public_path, RewriteContext, RewriteError};
use crate::session::manager::short_id;
use crate::session::validate_id;

use super::error_page;
use super::headers::{binary_headers, html_headers, script_headers};
use super::inject::{inject, Injection};
use super::request::ProxyRequest;
use super::upstream::{UpstreamClient, UpstreamError, UpstreamResponse};

/// Terminal state of one pipeline run.
#[derive(Debug)]
pub enum FetchResult {
    Html {
        status: StatusCode,
        headers: HeaderMap,
        body: String,
    },
    Script {
        status: StatusCode,
        headers: HeaderMap,
        body: String,
    },
    Binary {
        status: StatusCode,
        headers: HeaderMap,
        body: Bytes,
    },
    Error {
        status: StatusCode,
        body: String,
    },
}

impl FetchResult {
    pub fn kind(&self) -> &'static str {
        match self {
            FetchResult::Html { .. } => "html",
            FetchResult::Script { .. } => "script",
            FetchResult::Binary { .. } => "binary",
            FetchResult::Error { .. } => "error",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            FetchResult::Html { status, .. }
            | FetchResult::Script { status, .. }
            | FetchResult::Binary { status, .. }
            | FetchResult::Error { status, .. } => *status,
        }
    }
}

impl IntoResponse for FetchResult {
    fn into_response(self) -> Response {
        match self {
            FetchResult::Html { status, headers, body } | FetchResult::Script { status, headers, body } => {
                (status, headers, body).into_response()
            }
            FetchResult::Binary { status, headers, body } => (status, headers, Body::from(body)).into_response(),
            FetchResult::Error { status, body } => {
                (status, [(header::CONTENT_TYPE, "text/html; charset=utf-8")], body).into_response()
            }
        }
    }
}

/// Shared, immutable request processor.
#[derive(Debug, Clone)]
pub struct Pipeline {
    upstream: UpstreamClient,
    prefix: String,
    asset_route: String,
    parent_origin: String,
    revalidate: bool,
}

impl Pipeline {
    pub fn new(config: &ProxyConfig) -> Result<Self, UpstreamError> {
        Ok(Self {
            upstream: UpstreamClient::new(config)?,
            prefix: config.editor.mount_prefix.trim_end_matches('/').to_string(),
            asset_route: config.editor.asset_route.trim_end_matches('/').to_string(),
            parent_origin: config.editor.parent_origin.clone(),
            revalidate: config.upstream.revalidate_targets,
        })
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn asset_route(&self) -> &str {
        &self.asset_route
    }

    /// Run one request to completion. Never fails: errors become the error page.
    pub async fn handle(&self, request: ProxyRequest) -> FetchResult {
        let start_time = Instant::now();
        let path = request.display_path();
        let session = short_id(&request.session_id);

        let result = match self.process(&request).await {
            Ok(result) => result,
            Err(e) => {
                let target = failure_target(&request).unwrap_or_else(|| "-".to_string());
                match &e {
                    ProxyError::Upstream(_) | ProxyError::Io(_) => tracing::error!(
                        session = %session,
                        path = %path,
                        target = %target,
                        kind = e.kind(),
                        error = %e,
                        "Proxy request failed"
                    ),
                    _ => tracing::warn!(
                        session = %session,
                        path = %path,
                        target = %target,
                        kind = e.kind(),
                        error = %e,
                        "Proxy request rejected"
                    ),
                }
                FetchResult::Error {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    body: error_page::render(&request.session_id, &path, &e.to_string()),
                }
            }
        };

        metrics::record_request(result.kind(), result.status().as_u16(), start_time);
        result
    }

    async fn process(&self, request: &ProxyRequest) -> ProxyResult<FetchResult> {
        let base_url = decode(&request.encoded_origin)?;
        validate_id(&request.session_id)?;
        if self.revalidate {
            validate(&base_url)?;
        }

        let target = request.target_url(&base_url).ok_or_else(|| {
            UnsafeTargetError::InvalidFormat(format!("cannot build upstream URL from {base_url}"))
        })?;
        if self.revalidate {
            validate(target.as_str())?;
        }

        tracing::debug!(
            session = %short_id(&request.session_id),
            target = %target,
            method = %request.method,
            "Fetching upstream"
        );

        let fetch_start = Instant::now();
        let response = self
            .upstream
            .fetch(
                request.method.clone(),
                target,
                &request.headers,
                &origin_of(&base_url).unwrap_or_default(),
                request.body.clone(),
            )
            .await;
        metrics::record_upstream_duration(fetch_start.elapsed());
        let response = response?;

        let content_type = response.content_type().to_ascii_lowercase();
        if content_type.contains("text/html") {
            Ok(self.process_html(request, response))
        } else if is_bundler_chunk(&content_type, response.final_url.path()) {
            self.process_script(request, response)
        } else {
            let headers = binary_headers(&response.headers);
            Ok(FetchResult::Binary {
                status: response.status,
                headers,
                body: response.body,
            })
        }
    }

    fn process_html(&self, request: &ProxyRequest, response: UpstreamResponse) -> FetchResult {
        let session = short_id(&request.session_id);
        let page_url = response.final_url.as_str();
        let upstream_html = String::from_utf8_lossy(&response.body).into_owned();

        let classification = detect(&upstream_html, page_url);
        metrics::record_framework(classification.framework.as_str());

        let ctx = match RewriteContext::new(&self.prefix, &request.session_id, page_url, &self.asset_route) {
            Ok(ctx) => ctx.with_proxy_host(request.host()),
            Err(e) => {
                tracing::warn!(session = %session, target = %page_url, error = %e, "Serving page without rewriting");
                return FetchResult::Html {
                    status: response.status,
                    headers: html_headers(),
                    body: upstream_html,
                };
            }
        };

        let base_href = ctx.scope().base_href();
        let injected = inject(
            &upstream_html,
            &Injection {
                base_href: &base_href,
                asset_route: &self.asset_route,
                session_id: &request.session_id,
                parent_origin: &self.parent_origin,
            },
        );

        let body = match rewrite_html(&injected, &ctx, &classification) {
            Ok(outcome) => {
                tracing::info!(
                    session = %session,
                    target = %page_url,
                    framework = classification.framework.display_name(),
                    confidence = classification.confidence,
                    total_urls = outcome.stats.total_urls,
                    rewritten_urls = outcome.stats.rewritten_urls,
                    skipped_urls = outcome.stats.skipped_urls,
                    framework_specific_rewrites = outcome.stats.framework_specific_rewrites,
                    canonicalized = outcome.canonicalized,
                    "Page rewritten"
                );
                outcome.html
            }
            Err(e) => {
                tracing::warn!(
                    session = %session,
                    target = %page_url,
                    error = %ProxyError::from(e),
                    "Rewrite failed, serving injected page unrewritten"
                );
                injected
            }
        };

        FetchResult::Html {
            status: response.status,
            headers: html_headers(),
            body,
        }
    }

    fn process_script(&self, request: &ProxyRequest, response: UpstreamResponse) -> ProxyResult<FetchResult> {
        let origin = origin_of(response.final_url.as_str())
            .ok_or_else(|| RewriteError::NoOrigin(response.final_url.to_string()))?;
        let scope = ProxyScope::for_origin(&self.prefix, &request.session_id, &origin);
        let js = String::from_utf8_lossy(&response.body);
        let (body, replaced) = rewrite_public_path(&js, &scope);

        tracing::debug!(
            session = %short_id(&request.session_id),
            target = %response.final_url,
            replaced,
            "Bundler chunk rewritten"
        );

        Ok(FetchResult::Script {
            status: response.status,
            headers: script_headers(&response.headers),
            body,
        })
    }
}

/// Upstream URL a failed request was aimed at, when it can still be derived.
fn failure_target(request: &ProxyRequest) -> Option<String> {
    let base_url = decode(&request.encoded_origin).ok()?;
    request.target_url(&base_url).map(|url| url.to_string())
}
