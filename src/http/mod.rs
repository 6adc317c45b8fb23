//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, trace, timeout, body limit)
//!     → {prefix}/session | status | launch → handlers.rs
//!     → {prefix}/editor/{sid}/{enc}/... → request.rs → pipeline
//!     → {asset_route}/runtime.{js,css} → handlers.rs (files on disk)
//!     → anything else → recovery → pipeline or 404
//! ```

pub mod handlers;
pub mod request;
pub mod server;

pub use request::X_REQUEST_ID;
pub use server::{AppState, HttpServer};
