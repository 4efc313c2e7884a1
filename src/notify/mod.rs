//! Out-of-band message delivery.
//!
//! The auth service only needs "send a subject/body to an address"; how the
//! message travels (SMTP, provider API, queue) is up to the implementation.
//! `send` reports delivery failure synchronously to its direct caller --
//! background callers (the lockout alert task) log and move on.

use anyhow::Result;
use async_trait::async_trait;
use tracing::info;

#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver a message or return an error.
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<()>;
}

/// Local dev sender that logs the message instead of delivering it.
#[derive(Clone, Debug)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<()> {
        info!(to, subject, body, "notification send stub");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn log_notifier_always_delivers() {
        let notifier = LogNotifier;
        assert!(notifier
            .send("alice@example.com", "subject", "body")
            .await
            .is_ok());
    }
}
