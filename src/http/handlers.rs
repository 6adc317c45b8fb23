//! Handlers for the proxy's own endpoints: sessions, status, launch and
//! editor assets.

use std::path::Path;

use axum::{
    extract::{FromRequest, Query, Request, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Redirect, Response},
    Form, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::codec::{encode, normalize_url, validate, ProxyScope};
use crate::error::ProxyError;
use crate::http::server::AppState;
use crate::session::manager::short_id;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub message: &'static str,
    pub session_id: String,
    pub short_id: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusConfiguration {
    pub session_ttl: u64,
    pub upstream_timeout_secs: u64,
    pub max_redirects: usize,
    pub log_level: String,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub service: &'static str,
    pub status: &'static str,
    pub timestamp: DateTime<Utc>,
    pub version: &'static str,
    pub configuration: StatusConfiguration,
}

#[derive(Debug, Deserialize)]
pub struct LaunchInput {
    pub url: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

pub async fn create_session(State(state): State<AppState>) -> Json<SessionResponse> {
    let session = state.sessions.create_default();
    tracing::info!(session = %session.short_id(), "Session created");
    Json(SessionResponse {
        message: "Session created",
        short_id: session.short_id(),
        session_id: session.id,
        created_at: session.created_at,
        expires_at: session.expires_at,
    })
}

pub async fn get_status(State(state): State<AppState>) -> Json<StatusResponse> {
    let config = &state.config;
    Json(StatusResponse {
        service: "editor-proxy",
        status: "running",
        timestamp: Utc::now(),
        version: env!("CARGO_PKG_VERSION"),
        configuration: StatusConfiguration {
            session_ttl: config.session.ttl_secs,
            upstream_timeout_secs: config.timeouts.upstream_secs,
            max_redirects: config.upstream.max_redirects,
            log_level: config.observability.log_level.clone(),
        },
    })
}

pub async fn launch_query(State(state): State<AppState>, Query(input): Query<LaunchInput>) -> Response {
    launch(&state, &input.url)
}

/// `POST {prefix}/launch` with a JSON or form body.
pub async fn launch_body(State(state): State<AppState>, request: Request) -> Response {
    let is_json = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.contains("json"));

    let input = if is_json {
        Json::<LaunchInput>::from_request(request, &state)
            .await
            .map(|Json(input)| input)
            .map_err(|e| e.body_text())
    } else {
        Form::<LaunchInput>::from_request(request, &state)
            .await
            .map(|Form(input)| input)
            .map_err(|e| e.body_text())
    };

    match input {
        Ok(input) => launch(&state, &input.url),
        Err(message) => error_json(StatusCode::BAD_REQUEST, message),
    }
}

/// Validate the target, mint a session and redirect into the proxy path.
fn launch(state: &AppState, raw_url: &str) -> Response {
    let checked = normalize_url(raw_url).and_then(|url| validate(&url).map(|_| url));
    let url = match checked {
        Ok(url) => url,
        Err(e) => {
            tracing::warn!(target = %raw_url, reason = %e, "Launch rejected");
            let e = ProxyError::from(e);
            return error_json(e.status_code(), e.to_string());
        }
    };

    let session = state.sessions.create_default();
    let location = ProxyScope::from_encoded(state.pipeline.prefix(), &session.id, &encode(&url)).base_href();
    tracing::info!(session = %short_id(&session.id), target = %url, "Launching editor session");
    Redirect::to(&location).into_response()
}

fn error_json(status: StatusCode, error: String) -> Response {
    (status, Json(ErrorBody { error })).into_response()
}

pub async fn runtime_js(State(state): State<AppState>) -> Response {
    serve_asset(&state.config.editor.assets_dir, "runtime.js", "application/javascript; charset=utf-8").await
}

pub async fn runtime_css(State(state): State<AppState>) -> Response {
    serve_asset(&state.config.editor.assets_dir, "runtime.css", "text/css; charset=utf-8").await
}

async fn serve_asset(dir: &str, name: &str, content_type: &'static str) -> Response {
    let path = Path::new(dir).join(name);
    match tokio::fs::read(&path).await {
        Ok(bytes) => (
            [
                (header::CONTENT_TYPE, HeaderValue::from_static(content_type)),
                (header::CACHE_CONTROL, HeaderValue::from_static("public, max-age=3600")),
            ],
            bytes,
        )
            .into_response(),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Editor asset unavailable");
            (StatusCode::NOT_FOUND, format!("{name} not found")).into_response()
        }
    }
}
