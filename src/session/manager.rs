//! Session creation and identifier validation.

use chrono::{DateTime, TimeDelta, Utc};
use rand::RngCore;
use serde::Serialize;
use thiserror::Error;

/// Minimum accepted length of an externally supplied session id.
pub const MIN_ID_LEN: usize = 16;

const MIN_ID_BYTES: usize = 8;

/// Longest lifetime a session can be given; larger TTLs are clamped.
pub const MAX_TTL_SECS: u64 = 365 * 24 * 60 * 60;

/// `start + secs` with `secs` clamped to [`MAX_TTL_SECS`].
fn expiry_after(start: DateTime<Utc>, secs: u64) -> DateTime<Utc> {
    i64::try_from(secs.min(MAX_TTL_SECS))
        .ok()
        .and_then(TimeDelta::try_seconds)
        .and_then(|delta| start.checked_add_signed(delta))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// Why a session id segment was rejected.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("Session ID must be a non-empty string")]
    Empty,

    #[error("Session ID must be at least {MIN_ID_LEN} characters long")]
    TooShort,

    #[error("Session ID must contain only hexadecimal characters")]
    NotHex,
}

/// A short-lived token scoping one proxied browsing flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl Session {
    /// True iff an expiry is set and lies in the past.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        matches!(self.expires_at, Some(at) if now > at)
    }

    /// Seconds until expiry, saturating at 0. `None` when the session never expires.
    pub fn remaining_secs(&self) -> Option<i64> {
        self.expires_at
            .map(|at| (at - Utc::now()).num_seconds().max(0))
    }

    /// Push the expiry out by `secs`, starting from now when none was set.
    pub fn extend(&self, secs: u64) -> Session {
        let expires_at = expiry_after(self.expires_at.unwrap_or_else(Utc::now), secs);
        Session {
            expires_at: Some(expires_at),
            ..self.clone()
        }
    }

    /// First 8 characters followed by `...`, for logs.
    pub fn short_id(&self) -> String {
        short_id(&self.id)
    }
}

/// Shorten an id for log output.
pub fn short_id(id: &str) -> String {
    if id.chars().count() <= 8 {
        id.to_string()
    } else {
        format!("{}...", id.chars().take(8).collect::<String>())
    }
}

/// Check the shape of an externally supplied session id.
pub fn validate_id(candidate: &str) -> Result<(), SessionError> {
    if candidate.is_empty() {
        return Err(SessionError::Empty);
    }
    if candidate.len() < MIN_ID_LEN {
        return Err(SessionError::TooShort);
    }
    if !candidate.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(SessionError::NotHex);
    }
    Ok(())
}

/// Stateless session factory.
#[derive(Debug, Clone)]
pub struct SessionManager {
    id_bytes: usize,
    default_ttl_secs: Option<u64>,
}

impl SessionManager {
    /// `id_bytes` below 8 is raised to 8. A TTL of 0 means "never expires".
    pub fn new(id_bytes: usize, default_ttl_secs: u64) -> Self {
        Self {
            id_bytes: id_bytes.max(MIN_ID_BYTES),
            default_ttl_secs: (default_ttl_secs > 0).then_some(default_ttl_secs),
        }
    }

    /// Create a session with the configured TTL.
    pub fn create_default(&self) -> Session {
        self.create(self.default_ttl_secs)
    }

    /// Create a session with an explicit TTL.
    pub fn create(&self, ttl_secs: Option<u64>) -> Session {
        let now = Utc::now();
        Session {
            id: self.generate_id(),
            created_at: now,
            expires_at: ttl_secs.map(|ttl| expiry_after(now, ttl)),
        }
    }

    fn generate_id(&self) -> String {
        let mut bytes = vec![0u8; self.id_bytes];
        rand::thread_rng().fill_bytes(&mut bytes);
        bytes.iter().map(|b| format!("{:02x}", b)).collect()
    }
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::new(20, 3600)
    }
}
