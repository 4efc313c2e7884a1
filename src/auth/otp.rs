//! Time-windowed one-time codes derived from a per-account secret.
//!
//! Codes are 6 digits over a 300-second window with one window of skew
//! tolerance either side at validation. Validation never mutates stored
//! state: a code stays valid for its whole window and can be replayed
//! within it, which is a weaker guarantee than one-time consumption and is
//! accepted as such.

use anyhow::{anyhow, Context, Result};
use secrecy::{ExposeSecret, SecretString};
use totp_rs::{Algorithm, Secret, TOTP};

pub const DIGITS: usize = 6;
/// Window length in seconds (5 minutes of validity).
pub const STEP: u64 = 300;
/// Windows of clock skew tolerated either side at validation.
pub const SKEW: u8 = 1;

/// Generate a fresh base32 secret at registration; it stays stable for the
/// account's lifetime.
#[must_use]
pub fn generate_secret() -> SecretString {
    SecretString::from(Secret::generate_secret().to_encoded().to_string())
}

fn totp(secret: &SecretString, issuer: &str, identity: &str) -> Result<TOTP> {
    // A secret that no longer decodes is a fatal per-account configuration
    // failure; it cannot happen through the registration path.
    let bytes = Secret::Encoded(secret.expose_secret().to_string())
        .to_bytes()
        .map_err(|err| anyhow!("malformed OTP secret: {err:?}"))?;

    TOTP::new(
        Algorithm::SHA1,
        DIGITS,
        SKEW,
        STEP,
        bytes,
        Some(issuer.to_string()),
        identity.to_string(),
    )
    .map_err(|err| anyhow!("failed to build OTP generator: {err:?}"))
}

/// Derive the code for the current window.
pub fn issue(secret: &SecretString, issuer: &str, identity: &str) -> Result<String> {
    totp(secret, issuer, identity)?
        .generate_current()
        .context("failed to generate one-time code")
}

/// Recompute codes for the current window +/- skew and accept on any match.
pub fn validate(secret: &SecretString, issuer: &str, identity: &str, code: &str) -> Result<bool> {
    totp(secret, issuer, identity)?
        .check_current(code)
        .context("failed to validate one-time code")
}

#[cfg(test)]
mod tests {
    use super::*;

    // Divisible by STEP so window arithmetic in assertions stays exact.
    const T0: u64 = 1_700_000_400;

    fn secret() -> SecretString {
        generate_secret()
    }

    #[test]
    fn generated_secret_decodes() {
        let secret = secret();
        assert!(totp(&secret, "Spuro", "alice").is_ok());
    }

    #[test]
    fn code_is_six_digits() {
        let secret = secret();
        let generator = totp(&secret, "Spuro", "alice").unwrap();
        let code = generator.generate(T0);
        assert_eq!(code.len(), 6);
        assert!(code.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn code_valid_for_its_window() {
        let secret = secret();
        let generator = totp(&secret, "Spuro", "alice").unwrap();
        let code = generator.generate(T0);
        assert!(generator.check(&code, T0));
        assert!(generator.check(&code, T0 + STEP - 1));
    }

    #[test]
    fn code_valid_one_skew_window_either_side() {
        let secret = secret();
        let generator = totp(&secret, "Spuro", "alice").unwrap();
        let code = generator.generate(T0);
        assert!(generator.check(&code, T0 + STEP));
        assert!(generator.check(&code, T0 - 1));
    }

    #[test]
    fn code_invalid_outside_skew() {
        let secret = secret();
        let generator = totp(&secret, "Spuro", "alice").unwrap();
        let code = generator.generate(T0);
        assert!(!generator.check(&code, T0 + 2 * STEP));
        assert!(!generator.check(&code, T0.saturating_sub(2 * STEP)));
    }

    #[test]
    fn malformed_secret_is_an_error() {
        let secret = SecretString::from("not base32!!".to_string());
        assert!(issue(&secret, "Spuro", "alice").is_err());
    }

    #[test]
    fn issue_and_validate_agree_on_current_time() {
        let secret = secret();
        let code = issue(&secret, "Spuro", "alice").unwrap();
        assert!(validate(&secret, "Spuro", "alice", &code).unwrap());
        assert!(!validate(&secret, "Spuro", "alice", "000000").unwrap()
            || code == "000000");
    }
}
