//! Editor proxy (v1)
//!
//! Serves third-party sites inside an editing iframe.
//!
//! # Architecture Overview
//!
//! ```text
//!                         ┌────────────────────────────────────────────────────┐
//!                         │                   EDITOR PROXY                      │
//!                         │                                                     │
//!   Browser request       │  ┌────────┐   ┌──────────┐   ┌──────────────────┐  │
//!   ──────────────────────┼─▶│  http  │──▶│  codec   │──▶│     pipeline     │  │
//!                         │  │ server │   │ session  │   │  upstream fetch  │──┼──▶ Origin
//!                         │  └───┬────┘   └──────────┘   └────────┬─────────┘  │     site
//!                         │      │ fallback                       │            │
//!                         │      ▼                                ▼            │
//!                         │  ┌────────┐            ┌─────────────────────────┐ │
//!                         │  │recovery│            │ detect → inject →       │ │
//!                         │  └────────┘            │ rewrite → headers       │ │
//!   Browser response      │                        └───────────┬─────────────┘ │
//!   ◀─────────────────────┼────────────────────────────────────┘               │
//!                         │                                                     │
//!                         │  config · observability · lifecycle · error        │
//!                         └────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use editor_proxy::config;
use editor_proxy::lifecycle::{signals, Shutdown};
use editor_proxy::observability::{logging, metrics};
use editor_proxy::HttpServer;

#[derive(Parser)]
#[command(name = "editor-proxy", version, about = "Session-scoped proxy for the visual site editor")]
struct Args {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = config::load(args.config.as_deref())?;

    logging::init_logging(&config.observability);
    tracing::info!("editor-proxy v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        bind_address = %config.listener.bind_address,
        mount_prefix = %config.editor.mount_prefix,
        request_timeout_secs = config.timeouts.request_secs,
        upstream_timeout_secs = config.timeouts.upstream_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    signals::spawn_signal_handler(shutdown.clone());

    let server = HttpServer::new(config)?;
    server.run(listener, &shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
