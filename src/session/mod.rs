//! Session subsystem.
//!
//! # Data Flow
//! ```text
//! GET /session or POST /launch
//!     → manager.rs (random id + timestamps)
//!     → id embedded in every proxy path for the session
//!
//! Proxied request
//!     → manager.rs validate_id (shape check on the path segment)
//! ```
//!
//! # Design Decisions
//! - No server-side session table; the path carries all authority
//! - Expiry is informational and is not enforced on requests
//! - Session values are immutable once created

pub mod manager;

pub use manager::{validate_id, Session, SessionError, SessionManager, MAX_TTL_SECS, MIN_ID_LEN};
