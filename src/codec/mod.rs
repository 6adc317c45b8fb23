//! URL Codec subsystem.
//!
//! # Data Flow
//! ```text
//! Launch request (plain target URL)
//!     → target.rs (normalize, scheme + private-address check)
//!     → token.rs (encode full URL as a path-safe token)
//!     → scope.rs (build /<prefix>/editor/<sid>/<token>/)
//!
//! Proxied request (/<prefix>/editor/<sid>/<token>/<subpath>)
//!     → token.rs (decode token back to the upstream URL)
//!     → scope.rs (rebuild proxy paths for rewritten references)
//! ```
//!
//! # Design Decisions
//! - Encoding depends only on the input bytes, so every instance agrees
//! - Tokens never contain `/`, `+` or `=` and fit in a single path segment
//! - Target safety is checked before any network I/O

pub mod scope;
pub mod target;
pub mod token;

pub use scope::{build_proxy_path, ProxyAddress, ProxyScope, EDITOR_SEGMENT};
pub use target::{normalize_url, origin_of, same_origin, validate, UnsafeTargetError, ValidatedTarget};
pub use token::{decode, encode, DecodeError};
