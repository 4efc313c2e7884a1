//! Durable keyed storage for account records.
//!
//! All mutable authentication state (attempt counters, lock windows, reset
//! tokens) lives behind [`CredentialStore`]; nothing is cached across calls.
//! State-machine transitions that race under concurrent requests
//! (failed-attempt counting, reset-token consumption) are exposed as single
//! atomic operations so two requests for the same account can never lose an
//! update.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use secrecy::SecretString;
use std::time::Duration;
use thiserror::Error;

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// The sole persistent entity: one row per registered identity.
#[derive(Debug, Clone)]
pub struct Account {
    pub identity: String,
    pub contact_address: String,
    pub credential_hash: String,
    pub otp_secret: SecretString,
    pub failed_attempts: i32,
    pub lock_until: Option<DateTime<Utc>>,
    pub reset_token: Option<String>,
    pub reset_token_expiry: Option<DateTime<Utc>>,
}

/// Fields required to create an account; everything else starts empty.
#[derive(Debug)]
pub struct NewAccount {
    pub identity: String,
    pub contact_address: String,
    pub credential_hash: String,
    pub otp_secret: SecretString,
}

/// Result of atomically recording a failed verification attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureOutcome {
    /// Attempt counted, account still unlocked.
    Counted { attempts: i32 },
    /// This attempt reached the threshold and locked the account.
    Locked { until: DateTime<Utc> },
    /// A concurrent request locked the account first; nothing was counted.
    AlreadyLocked { until: DateTime<Utc> },
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("account already exists")]
    Conflict,
    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

/// Keyed account storage consumed by the auth service.
///
/// Implementations must make each method atomic with respect to concurrent
/// calls for the same identity, and bound every access with a timeout of a
/// few seconds (a timeout surfaces as [`StoreError::Backend`], a transient
/// failure).
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn find(&self, identity: &str) -> Result<Option<Account>, StoreError>;

    /// Create a new account. Fails with [`StoreError::Conflict`] if the
    /// identity is already taken.
    async fn insert(&self, account: NewAccount) -> Result<(), StoreError>;

    /// Count one failed attempt and, when the threshold is reached, set the
    /// lock in the same write. While a lock is active no attempt is counted.
    /// A lock that has already expired starts a fresh attempt window.
    async fn record_failed_attempt(
        &self,
        identity: &str,
        threshold: i32,
        lock_window: Duration,
    ) -> Result<FailureOutcome, StoreError>;

    /// Reset the attempt counter and clear any lock after a successful match.
    async fn clear_failures(&self, identity: &str) -> Result<(), StoreError>;

    /// Store a recovery token with its expiry, replacing any prior token so
    /// at most one is live per account.
    async fn set_reset_token(
        &self,
        identity: &str,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), StoreError>;

    /// Atomically replace the credential hash and clear the token, but only
    /// if `token` matches the stored one and it has not expired. Returns
    /// whether the swap happened; on `false` nothing changed.
    async fn consume_reset_token(
        &self,
        identity: &str,
        token: &str,
        new_credential_hash: &str,
    ) -> Result<bool, StoreError>;
}
