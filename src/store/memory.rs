//! In-memory account storage for local development and tests.
//!
//! Mirrors the semantics of [`PgStore`](super::PgStore): every operation
//! holds the map lock for its whole read-modify-write, so transitions are
//! atomic per store.

use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::Mutex;

use super::{Account, CredentialStore, FailureOutcome, NewAccount, StoreError};

#[derive(Default)]
pub struct MemoryStore {
    accounts: Mutex<HashMap<String, Account>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite an account's lock expiry, e.g. to simulate an elapsed
    /// lock window without waiting it out.
    pub async fn set_lock_until(&self, identity: &str, lock_until: Option<DateTime<Utc>>) {
        let mut accounts = self.accounts.lock().await;
        if let Some(account) = accounts.get_mut(identity) {
            account.lock_until = lock_until;
        }
    }
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn find(&self, identity: &str) -> Result<Option<Account>, StoreError> {
        let accounts = self.accounts.lock().await;
        Ok(accounts.get(identity).cloned())
    }

    async fn insert(&self, account: NewAccount) -> Result<(), StoreError> {
        let mut accounts = self.accounts.lock().await;
        if accounts.contains_key(&account.identity) {
            return Err(StoreError::Conflict);
        }
        accounts.insert(
            account.identity.clone(),
            Account {
                identity: account.identity,
                contact_address: account.contact_address,
                credential_hash: account.credential_hash,
                otp_secret: account.otp_secret,
                failed_attempts: 0,
                lock_until: None,
                reset_token: None,
                reset_token_expiry: None,
            },
        );
        Ok(())
    }

    async fn record_failed_attempt(
        &self,
        identity: &str,
        threshold: i32,
        lock_window: Duration,
    ) -> Result<FailureOutcome, StoreError> {
        let mut accounts = self.accounts.lock().await;
        let account = accounts
            .get_mut(identity)
            .ok_or_else(|| anyhow::anyhow!("failed-attempt update matched no row for {identity}"))?;

        let now = Utc::now();
        match account.lock_until {
            Some(until) if until > now => Ok(FailureOutcome::AlreadyLocked { until }),
            Some(_) => {
                // Expired lock: start a fresh attempt window.
                account.failed_attempts = 1;
                account.lock_until = None;
                Ok(FailureOutcome::Counted { attempts: 1 })
            }
            None => {
                account.failed_attempts += 1;
                if account.failed_attempts >= threshold {
                    let until = now
                        + ChronoDuration::from_std(lock_window)
                            .unwrap_or_else(|_| ChronoDuration::seconds(60));
                    account.lock_until = Some(until);
                    Ok(FailureOutcome::Locked { until })
                } else {
                    Ok(FailureOutcome::Counted {
                        attempts: account.failed_attempts,
                    })
                }
            }
        }
    }

    async fn clear_failures(&self, identity: &str) -> Result<(), StoreError> {
        let mut accounts = self.accounts.lock().await;
        if let Some(account) = accounts.get_mut(identity) {
            account.failed_attempts = 0;
            account.lock_until = None;
        }
        Ok(())
    }

    async fn set_reset_token(
        &self,
        identity: &str,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let mut accounts = self.accounts.lock().await;
        let account = accounts
            .get_mut(identity)
            .ok_or_else(|| anyhow::anyhow!("reset-token update matched no row for {identity}"))?;
        account.reset_token = Some(token.to_string());
        account.reset_token_expiry = Some(expires_at);
        Ok(())
    }

    async fn consume_reset_token(
        &self,
        identity: &str,
        token: &str,
        new_credential_hash: &str,
    ) -> Result<bool, StoreError> {
        let mut accounts = self.accounts.lock().await;
        let Some(account) = accounts.get_mut(identity) else {
            return Ok(false);
        };

        let now = Utc::now();
        let token_matches = account.reset_token.as_deref() == Some(token);
        let unexpired = account.reset_token_expiry.is_some_and(|expiry| expiry >= now);
        if !token_matches || !unexpired {
            return Ok(false);
        }

        account.credential_hash = new_credential_hash.to_string();
        account.reset_token = None;
        account.reset_token_expiry = None;
        Ok(true)
    }
}
