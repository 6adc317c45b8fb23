//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with the proxy, launch and asset routes
//! - Wire up middleware (request ID, tracing, timeout, body limit)
//! - Adapt proxy-path and escaped requests to the content pipeline
//! - Serve on a listener until shutdown

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::{Body, Bytes},
    extract::{DefaultBodyLimit, Path, State},
    http::{HeaderMap, Method, Request, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::{any, get},
    Router,
};
use tokio::net::TcpListener;
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::ProxyConfig;
use crate::error::ProxyResult;
use crate::http::handlers;
use crate::http::request::{raw_subpath, request_id, Inbound};
use crate::lifecycle::Shutdown;
use crate::pipeline::{Pipeline, ProxyRequest};
use crate::recovery;
use crate::session::SessionManager;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<Pipeline>,
    pub sessions: SessionManager,
    pub config: Arc<ProxyConfig>,
}

/// HTTP server for the editor proxy.
pub struct HttpServer {
    router: Router,
    config: Arc<ProxyConfig>,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: ProxyConfig) -> ProxyResult<Self> {
        let config = Arc::new(config);
        let state = AppState {
            pipeline: Arc::new(Pipeline::new(&config)?),
            sessions: SessionManager::new(config.session.id_bytes, config.session.ttl_secs),
            config: config.clone(),
        };

        let router = Self::build_router(&config, state);
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ProxyConfig, state: AppState) -> Router {
        let prefix = config.editor.mount_prefix.trim_end_matches('/');
        let assets = config.editor.asset_route.trim_end_matches('/');

        Router::new()
            .route(&format!("{prefix}/session"), get(handlers::create_session))
            .route(&format!("{prefix}/status"), get(handlers::get_status))
            .route(
                &format!("{prefix}/launch"),
                get(handlers::launch_query).post(handlers::launch_body),
            )
            .route(&format!("{prefix}/editor/{{sid}}/{{enc}}"), any(editor_root_handler))
            .route(&format!("{prefix}/editor/{{sid}}/{{enc}}/"), any(editor_root_handler))
            .route(&format!("{prefix}/editor/{{sid}}/{{enc}}/{{*subpath}}"), any(editor_handler))
            .route(&format!("{assets}/runtime.js"), get(handlers::runtime_js))
            .route(&format!("{assets}/runtime.css"), get(handlers::runtime_css))
            .fallback(escaped_handler)
            .with_state(state)
            .layer(DefaultBodyLimit::disable())
            .layer(RequestBodyLimitLayer::new(config.security.max_body_size))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                tracing::info_span!(
                    "request",
                    request_id = %request_id(request.headers()),
                    method = %request.method(),
                    uri = %request.uri(),
                )
            }))
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// The configured router, for serving on a custom listener.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until `shutdown` is triggered.
    pub async fn run(self, listener: TcpListener, shutdown: &Shutdown) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            prefix = %self.config.editor.mount_prefix,
            "HTTP server starting"
        );

        let stop = shutdown.clone();
        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                stop.wait().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }
}

async fn editor_root_handler(
    State(state): State<AppState>,
    Path((sid, enc)): Path<(String, String)>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let inbound = Inbound { method, uri, headers, body };
    proxy(&state, inbound.into_proxy_request(sid, enc, String::new())).await
}

async fn editor_handler(
    State(state): State<AppState>,
    Path((sid, enc, decoded)): Path<(String, String, String)>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let subpath = raw_subpath(state.pipeline.prefix(), uri.path())
        .map(str::to_string)
        .unwrap_or(decoded);
    let inbound = Inbound { method, uri, headers, body };
    proxy(&state, inbound.into_proxy_request(sid, enc, subpath)).await
}

/// Anything no route claims: try to recover the session from the referer.
async fn escaped_handler(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let path = uri.path().to_string();
    let recovered = recovery::recover(
        state.pipeline.prefix(),
        state.pipeline.asset_route(),
        &path,
        recovery::referer(&headers),
    );

    match recovered {
        Some(found) => {
            tracing::info!(
                request_id = %request_id(&headers),
                path = %path,
                "Recovered escaped request from referer"
            );
            let inbound = Inbound { method, uri, headers, body };
            let request = inbound.into_proxy_request(found.session_id, found.encoded_origin, found.subpath);
            proxy(&state, request).await
        }
        None => {
            tracing::debug!(request_id = %request_id(&headers), path = %path, "No proxy context for request");
            (StatusCode::NOT_FOUND, "Not found").into_response()
        }
    }
}

async fn proxy(state: &AppState, request: ProxyRequest) -> Response {
    tracing::debug!(
        request_id = %request_id(&request.headers),
        method = %request.method,
        path = %request.display_path(),
        "Proxying request"
    );
    state.pipeline.handle(request).await.into_response()
}
