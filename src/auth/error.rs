use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::store::StoreError;

/// Outcome taxonomy for the five exposed operations. Authentication
/// failures carry one uniform message per category so callers cannot tell
/// an expired reset token from a wrong one, or learn how close a pattern
/// came to matching.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Malformed input, rejected before touching the store.
    #[error("{0}")]
    Validation(&'static str),
    #[error("account not found")]
    NotFound,
    #[error("account already exists")]
    AlreadyExists,
    #[error("incorrect pattern")]
    PatternMismatch,
    #[error("invalid one-time code")]
    InvalidOtp,
    #[error("invalid or expired reset token")]
    InvalidResetToken,
    #[error("address does not match our records")]
    AddressMismatch,
    /// Carries the lock expiry so the caller can show a countdown.
    #[error("account is temporarily locked until {until}")]
    Locked { until: DateTime<Utc> },
    /// A notification that the current request depends on was not delivered.
    #[error("notification delivery failed")]
    Delivery(#[source] anyhow::Error),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Internal(anyhow::Error),
}
