//! Framework Detector subsystem.
//!
//! # Data Flow
//! ```text
//! Fetched HTML + source URL
//!     → signatures.rs (static weighted patterns per technology)
//!     → detector.rs (score, pick winner, confidence from the lead)
//!     → framework.rs Classification (type, confidence, version, features)
//! ```
//!
//! # Design Decisions
//! - Rule tables are immutable statics, shared across requests without locks
//! - Detection is pure; callers log the outcome
//! - Confidence rewards a clear winner, not a high absolute score

pub mod detector;
pub mod framework;
pub mod signatures;

pub use detector::{confidence_for_gap, detect};
pub use framework::{Classification, Evidence, FrameworkType};
