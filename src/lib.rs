//! Editor proxy library.
//!
//! Proxies arbitrary websites under a session-scoped path, rewrites their
//! references so every follow-up request comes back through the proxy, and
//! injects an external editing layer into HTML pages.

pub mod codec;
pub mod config;
pub mod detect;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod pipeline;
pub mod recovery;
pub mod rewrite;
pub mod session;

pub use config::schema::ProxyConfig;
pub use error::{ProxyError, ProxyResult};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
