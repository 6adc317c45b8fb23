//! Content pipeline subsystem.
//!
//! # Data Flow
//! ```text
//! http handler / recovery
//!     → request.rs (ProxyRequest: sid, token, subpath, query)
//!     → orchestrator.rs (decode, validate, fetch, branch on content type)
//!         → upstream.rs (reqwest fetch, forwarded header subset)
//!         → html: inject.rs → detect → rewrite → headers.rs
//!         → script: bundler public-path rewrite → headers.rs
//!         → binary: passthrough → headers.rs
//!     → error_page.rs on any failure
//! ```
//!
//! # Design Decisions
//! - Failures never reach the client raw; they become a 500 error page
//! - A rewrite failure degrades to the injected but unrewritten page
//! - Detection runs on the upstream document, before injection

pub mod error_page;
pub mod headers;
pub mod inject;
pub mod orchestrator;
pub mod request;
pub mod upstream;

pub use orchestrator::{FetchResult, Pipeline};
pub use request::ProxyRequest;
pub use upstream::{UpstreamClient, UpstreamError, UpstreamResponse};
