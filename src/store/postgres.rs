//! Postgres-backed account storage.
//!
//! Every state transition is a single guarded `UPDATE` so concurrent
//! requests for the same identity serialize on the row instead of losing
//! updates. Timeouts are bounded by the pool's `acquire_timeout`.

use anyhow::{anyhow, Context};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use sqlx::{postgres::PgRow, FromRow, PgPool, Row};
use std::time::Duration;
use tracing::Instrument;

use super::{Account, CredentialStore, FailureOutcome, NewAccount, StoreError};

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl<'r> FromRow<'r, PgRow> for Account {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        let otp_secret: String = row.try_get("otp_secret")?;
        Ok(Self {
            identity: row.try_get("identity")?,
            contact_address: row.try_get("contact_address")?,
            credential_hash: row.try_get("credential_hash")?,
            otp_secret: SecretString::from(otp_secret),
            failed_attempts: row.try_get("failed_attempts")?,
            lock_until: row.try_get("lock_until")?,
            reset_token: row.try_get("reset_token")?,
            reset_token_expiry: row.try_get("reset_token_expiry")?,
        })
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().is_some_and(|code| code.as_ref() == "23505"),
        _ => false,
    }
}

#[async_trait]
impl CredentialStore for PgStore {
    async fn find(&self, identity: &str) -> Result<Option<Account>, StoreError> {
        let query = r"
            SELECT identity, contact_address, credential_hash, otp_secret,
                   failed_attempts, lock_until, reset_token, reset_token_expiry
            FROM accounts
            WHERE identity = $1
        ";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = query
        );
        let account = sqlx::query_as::<_, Account>(query)
            .bind(identity)
            .fetch_optional(&self.pool)
            .instrument(span)
            .await
            .context("failed to look up account")?;

        Ok(account)
    }

    async fn insert(&self, account: NewAccount) -> Result<(), StoreError> {
        let query = r"
            INSERT INTO accounts
                (identity, contact_address, credential_hash, otp_secret)
            VALUES ($1, $2, $3, $4)
        ";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "INSERT",
            db.statement = query
        );
        let result = sqlx::query(query)
            .bind(&account.identity)
            .bind(&account.contact_address)
            .bind(&account.credential_hash)
            .bind(account.otp_secret.expose_secret())
            .execute(&self.pool)
            .instrument(span)
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(err) if is_unique_violation(&err) => Err(StoreError::Conflict),
            Err(err) => Err(anyhow::Error::new(err)
                .context("failed to insert account")
                .into()),
        }
    }

    async fn record_failed_attempt(
        &self,
        identity: &str,
        threshold: i32,
        lock_window: Duration,
    ) -> Result<FailureOutcome, StoreError> {
        // One statement so the increment, the threshold check, and the lock
        // transition commit together. Rows with an expired lock start a fresh
        // attempt window; rows with an active lock do not match and nothing
        // is counted for them.
        let query = r"
            UPDATE accounts
            SET failed_attempts = CASE
                    WHEN lock_until IS NOT NULL AND lock_until <= NOW() THEN 1
                    ELSE failed_attempts + 1
                END,
                lock_until = CASE
                    WHEN lock_until IS NOT NULL AND lock_until <= NOW() THEN NULL
                    WHEN failed_attempts + 1 >= $2
                        THEN NOW() + ($3 * INTERVAL '1 second')
                    ELSE lock_until
                END
            WHERE identity = $1
              AND (lock_until IS NULL OR lock_until <= NOW())
            RETURNING failed_attempts, lock_until
        ";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "UPDATE",
            db.statement = query
        );
        let lock_seconds = i64::try_from(lock_window.as_secs()).unwrap_or(i64::MAX);
        let row = sqlx::query(query)
            .bind(identity)
            .bind(threshold)
            .bind(lock_seconds)
            .fetch_optional(&self.pool)
            .instrument(span)
            .await
            .context("failed to record failed attempt")?;

        if let Some(row) = row {
            let attempts: i32 = row.get("failed_attempts");
            let lock_until: Option<DateTime<Utc>> = row.get("lock_until");
            return Ok(match lock_until {
                Some(until) if until > Utc::now() => FailureOutcome::Locked { until },
                _ => FailureOutcome::Counted { attempts },
            });
        }

        // No row matched: either a concurrent request locked the account
        // between our read and this write, or the account is gone.
        let current = self.find(identity).await?;
        match current.and_then(|account| account.lock_until) {
            Some(until) if until > Utc::now() => Ok(FailureOutcome::AlreadyLocked { until }),
            _ => Err(anyhow!("failed-attempt update matched no row for {identity}").into()),
        }
    }

    async fn clear_failures(&self, identity: &str) -> Result<(), StoreError> {
        let query = r"
            UPDATE accounts
            SET failed_attempts = 0, lock_until = NULL
            WHERE identity = $1
        ";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "UPDATE",
            db.statement = query
        );
        sqlx::query(query)
            .bind(identity)
            .execute(&self.pool)
            .instrument(span)
            .await
            .context("failed to clear failed attempts")?;

        Ok(())
    }

    async fn set_reset_token(
        &self,
        identity: &str,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let query = r"
            UPDATE accounts
            SET reset_token = $2, reset_token_expiry = $3
            WHERE identity = $1
        ";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "UPDATE",
            db.statement = query
        );
        let result = sqlx::query(query)
            .bind(identity)
            .bind(token)
            .bind(expires_at)
            .execute(&self.pool)
            .instrument(span)
            .await
            .context("failed to store reset token")?;

        if result.rows_affected() == 0 {
            return Err(anyhow!("reset-token update matched no row for {identity}").into());
        }

        Ok(())
    }

    async fn consume_reset_token(
        &self,
        identity: &str,
        token: &str,
        new_credential_hash: &str,
    ) -> Result<bool, StoreError> {
        // Exact-match and expiry checks happen inside the same statement as
        // the credential swap, so a token can be consumed at most once.
        let query = r"
            UPDATE accounts
            SET credential_hash = $3, reset_token = NULL, reset_token_expiry = NULL
            WHERE identity = $1
              AND reset_token = $2
              AND reset_token_expiry IS NOT NULL
              AND reset_token_expiry >= NOW()
        ";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "UPDATE",
            db.statement = query
        );
        let result = sqlx::query(query)
            .bind(identity)
            .bind(token)
            .bind(new_credential_hash)
            .execute(&self.pool)
            .instrument(span)
            .await
            .context("failed to consume reset token")?;

        Ok(result.rows_affected() == 1)
    }
}
