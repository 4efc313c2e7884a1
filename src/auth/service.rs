//! The account security state machine behind the five exposed operations.
//!
//! All mutable state lives in the store; the service itself is cheap to
//! clone behind an `Arc` and holds only its injected collaborators. OTP
//! delivery during login blocks the response so the caller can report a
//! send failure; the lockout alert is dispatched on its own task and only
//! ever logged.

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error};

use crate::notify::Notifier;
use crate::store::{Account, CredentialStore, FailureOutcome, NewAccount, StoreError};

use super::error::AuthError;
use super::lockout::{self, LockState};
use super::pattern::{hash_pattern, verify_pattern};
use super::{otp, reset, validate};

const OTP_SUBJECT: &str = "Your one-time code";
const ALERT_SUBJECT: &str = "Alert: suspicious login attempts detected";
const RESET_SUBJECT: &str = "Pattern reset request";

#[derive(Debug, Clone)]
pub struct AuthConfig {
    base_url: String,
    otp_issuer: String,
    max_failed_attempts: i32,
    lock_window: Duration,
    reset_token_ttl: Duration,
}

impl AuthConfig {
    #[must_use]
    pub fn new(base_url: String) -> Self {
        Self {
            base_url,
            otp_issuer: "Spuro".to_string(),
            max_failed_attempts: lockout::MAX_FAILED_ATTEMPTS,
            lock_window: lockout::LOCK_WINDOW,
            reset_token_ttl: reset::RESET_TOKEN_TTL,
        }
    }

    #[must_use]
    pub fn with_max_failed_attempts(mut self, max_failed_attempts: i32) -> Self {
        self.max_failed_attempts = max_failed_attempts.max(1);
        self
    }

    #[must_use]
    pub fn with_lock_window(mut self, lock_window: Duration) -> Self {
        self.lock_window = lock_window;
        self
    }

    #[must_use]
    pub fn with_reset_token_ttl(mut self, reset_token_ttl: Duration) -> Self {
        self.reset_token_ttl = reset_token_ttl;
        self
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[must_use]
    pub fn otp_issuer(&self) -> &str {
        &self.otp_issuer
    }

    #[must_use]
    pub fn max_failed_attempts(&self) -> i32 {
        self.max_failed_attempts
    }

    #[must_use]
    pub fn lock_window(&self) -> Duration {
        self.lock_window
    }

    #[must_use]
    pub fn reset_token_ttl(&self) -> Duration {
        self.reset_token_ttl
    }
}

pub struct AuthService {
    store: Arc<dyn CredentialStore>,
    notifier: Arc<dyn Notifier>,
    config: AuthConfig,
}

impl AuthService {
    #[must_use]
    pub fn new(
        store: Arc<dyn CredentialStore>,
        notifier: Arc<dyn Notifier>,
        config: AuthConfig,
    ) -> Self {
        Self {
            store,
            notifier,
            config,
        }
    }

    /// Create an account: validated address, hashed pattern, and a fresh
    /// OTP secret that stays stable for the account's lifetime.
    pub async fn register(
        &self,
        identity: &str,
        address: &str,
        pattern: &str,
    ) -> Result<(), AuthError> {
        if !validate::valid_identity(identity) {
            return Err(AuthError::Validation("invalid identity"));
        }
        if !validate::valid_email(address) {
            return Err(AuthError::Validation("invalid email address"));
        }
        if !validate::valid_pattern(pattern) {
            return Err(AuthError::Validation("invalid pattern"));
        }

        let account = NewAccount {
            identity: identity.to_string(),
            contact_address: address.to_string(),
            credential_hash: hash_pattern(pattern),
            otp_secret: otp::generate_secret(),
        };

        match self.store.insert(account).await {
            Ok(()) => {
                debug!("registered account {identity}");
                Ok(())
            }
            Err(StoreError::Conflict) => Err(AuthError::AlreadyExists),
            Err(err) => Err(err.into()),
        }
    }

    /// First factor: lock gate, constant-time pattern check, then OTP
    /// dispatch. Returns the address the code was sent to.
    ///
    /// The OTP send is synchronous on purpose: the caller reports delivery
    /// failure to the user.
    pub async fn verify_login(
        &self,
        identity: &str,
        address: &str,
        pattern: &str,
    ) -> Result<String, AuthError> {
        if !validate::valid_identity(identity) {
            return Err(AuthError::Validation("invalid identity"));
        }
        if !validate::valid_email(address) {
            return Err(AuthError::Validation("invalid email address"));
        }
        if !validate::valid_pattern(pattern) {
            return Err(AuthError::Validation("invalid pattern"));
        }

        let account = self
            .store
            .find(identity)
            .await?
            .ok_or(AuthError::NotFound)?;

        if let LockState::Locked { until } = lockout::lock_state(account.lock_until, Utc::now()) {
            return Err(AuthError::Locked { until });
        }

        if !verify_pattern(pattern, &account.credential_hash) {
            let outcome = self
                .store
                .record_failed_attempt(
                    identity,
                    self.config.max_failed_attempts(),
                    self.config.lock_window(),
                )
                .await?;
            return Err(match outcome {
                FailureOutcome::Counted { .. } => AuthError::PatternMismatch,
                FailureOutcome::Locked { until } => {
                    self.spawn_lockout_alert(&account, until);
                    AuthError::Locked { until }
                }
                FailureOutcome::AlreadyLocked { until } => AuthError::Locked { until },
            });
        }

        self.store.clear_failures(identity).await?;

        // The claimed address must match the record before anything is sent
        // to it.
        if account.contact_address != address {
            return Err(AuthError::AddressMismatch);
        }

        let code = otp::issue(&account.otp_secret, self.config.otp_issuer(), identity)
            .map_err(AuthError::Internal)?;
        let body = format!(
            "Dear {identity},\n\nYour one-time code is: {code}\nIt is valid for 5 minutes.\n\nRegards,\nSpuro"
        );
        self.notifier
            .send(&account.contact_address, OTP_SUBJECT, &body)
            .await
            .map_err(AuthError::Delivery)?;

        Ok(account.contact_address)
    }

    /// Second factor: check a submitted code against the current window
    /// with skew tolerance. Mutates nothing.
    pub async fn confirm_otp(&self, identity: &str, code: &str) -> Result<(), AuthError> {
        if !validate::valid_identity(identity) {
            return Err(AuthError::Validation("invalid identity"));
        }
        if !validate::valid_otp_code(code) {
            return Err(AuthError::Validation("malformed one-time code"));
        }

        let account = self
            .store
            .find(identity)
            .await?
            .ok_or(AuthError::NotFound)?;

        let valid = otp::validate(&account.otp_secret, self.config.otp_issuer(), identity, code)
            .map_err(AuthError::Internal)?;
        if valid {
            Ok(())
        } else {
            Err(AuthError::InvalidOtp)
        }
    }

    /// Issue a recovery token (replacing any live one) and send the reset
    /// link. Returns the address the link was sent to.
    pub async fn request_reset(&self, identity: &str, address: &str) -> Result<String, AuthError> {
        if !validate::valid_identity(identity) {
            return Err(AuthError::Validation("invalid identity"));
        }
        if !validate::valid_email(address) {
            return Err(AuthError::Validation("invalid email address"));
        }

        let account = self
            .store
            .find(identity)
            .await?
            .ok_or(AuthError::NotFound)?;

        if account.contact_address != address {
            return Err(AuthError::AddressMismatch);
        }

        let token = reset::generate_token().map_err(AuthError::Internal)?;
        let ttl = ChronoDuration::from_std(self.config.reset_token_ttl())
            .map_err(|err| AuthError::Internal(err.into()))?;
        let expires_at = Utc::now() + ttl;
        self.store
            .set_reset_token(identity, &token, expires_at)
            .await?;

        let reset_url = reset::build_reset_url(self.config.base_url(), identity, &token);
        let body = format!(
            "Dear {identity},\n\nUse the following link to reset your pattern:\n{reset_url}\n\nThis link expires in 1 hour.\n\nRegards,\nSpuro"
        );
        self.notifier
            .send(&account.contact_address, RESET_SUBJECT, &body)
            .await
            .map_err(AuthError::Delivery)?;

        Ok(account.contact_address)
    }

    /// Swap in a new pattern if the submitted token is the live one and has
    /// not expired. Attempt counters and locks are left untouched.
    pub async fn consume_reset(
        &self,
        identity: &str,
        token: &str,
        new_pattern: &str,
    ) -> Result<(), AuthError> {
        if !validate::valid_identity(identity) {
            return Err(AuthError::Validation("invalid identity"));
        }
        if token.trim().is_empty() {
            return Err(AuthError::Validation("missing reset token"));
        }
        if !validate::valid_pattern(new_pattern) {
            return Err(AuthError::Validation("invalid pattern"));
        }

        if self.store.find(identity).await?.is_none() {
            return Err(AuthError::NotFound);
        }

        let swapped = self
            .store
            .consume_reset_token(identity, token, &hash_pattern(new_pattern))
            .await?;
        if swapped {
            debug!("pattern reset for account {identity}");
            Ok(())
        } else {
            // Wrong token and expired token are indistinguishable on purpose.
            Err(AuthError::InvalidResetToken)
        }
    }

    /// Best-effort alert on lock transition: its failure never rolls back
    /// the lock and never reaches the end user.
    fn spawn_lockout_alert(&self, account: &Account, until: DateTime<Utc>) {
        let notifier = Arc::clone(&self.notifier);
        let to = account.contact_address.clone();
        let identity = account.identity.clone();
        let body = format!(
            "Dear {identity},\n\nMultiple failed login attempts were detected on your account. \
It has been temporarily locked until {until}.\n\nIf this wasn't you, please secure your account.\n\nRegards,\nSpuro"
        );
        tokio::spawn(async move {
            if let Err(err) = notifier.send(&to, ALERT_SUBJECT, &body).await {
                error!("failed to deliver lockout alert to {to}: {err:#}");
            }
        });
    }
}
