//! Recovery token issuance for credential reset.
//!
//! Tokens are 32 random bytes (256 bits) encoded URL-safe; the raw value
//! only travels in the reset link. Expiry is enforced lazily when the token
//! is consumed; there is no sweep.

use anyhow::{Context, Result};
use base64::Engine;
use rand::{rngs::OsRng, RngCore};
use std::time::Duration;

/// How long an issued token stays consumable.
pub const RESET_TOKEN_TTL: Duration = Duration::from_secs(60 * 60);

/// Create a new unguessable recovery token.
pub fn generate_token() -> Result<String> {
    let mut bytes = [0u8; 32];
    OsRng
        .try_fill_bytes(&mut bytes)
        .context("failed to generate reset token")?;
    Ok(base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes))
}

/// Build the reset link included in the recovery email.
#[must_use]
pub fn build_reset_url(base_url: &str, identity: &str, token: &str) -> String {
    let base = base_url.trim_end_matches('/');
    format!("{base}/reset?identity={identity}&token={token}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;

    #[test]
    fn generated_token_decodes_to_32_bytes() {
        let decoded_len = generate_token()
            .ok()
            .and_then(|token| URL_SAFE_NO_PAD.decode(token.as_bytes()).ok())
            .map(|bytes| bytes.len());
        assert_eq!(decoded_len, Some(32));
    }

    #[test]
    fn tokens_are_unique() {
        let first = generate_token().unwrap();
        let second = generate_token().unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn build_reset_url_trims_trailing_slash() {
        let url = build_reset_url("https://auth.example.com/", "alice", "token");
        assert_eq!(
            url,
            "https://auth.example.com/reset?identity=alice&token=token"
        );
    }
}
