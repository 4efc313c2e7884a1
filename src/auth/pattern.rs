//! Pattern credential hashing and comparison.
//!
//! The credential digest is a fast fixed-cost SHA-256 of the pattern
//! string; offline brute force is compensated entirely by the lockout
//! state machine, not by an adaptive hash. Comparison is constant time and
//! a malformed stored digest reads as a mismatch, never a crash.

use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

/// Hash a pattern string into the stored hex digest form.
#[must_use]
pub fn hash_pattern(pattern: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(pattern.as_bytes());
    hex::encode(hasher.finalize())
}

/// Compare a submitted pattern against a stored digest in constant time.
#[must_use]
pub fn verify_pattern(pattern: &str, stored_digest: &str) -> bool {
    let Ok(stored) = hex::decode(stored_digest) else {
        return false;
    };
    if stored.len() != Sha256::output_size() {
        return false;
    }

    let mut hasher = Sha256::new();
    hasher.update(pattern.as_bytes());
    let digest = hasher.finalize();

    digest.as_slice().ct_eq(&stored).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_deterministic_and_hex() {
        let first = hash_pattern("3-1-4");
        let second = hash_pattern("3-1-4");
        assert_eq!(first, second);
        assert_eq!(first.len(), 64);
        assert!(first.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn verify_accepts_matching_pattern() {
        let digest = hash_pattern("3-1-4");
        assert!(verify_pattern("3-1-4", &digest));
    }

    #[test]
    fn verify_rejects_wrong_pattern() {
        let digest = hash_pattern("3-1-4");
        assert!(!verify_pattern("9-9-9", &digest));
    }

    #[test]
    fn malformed_stored_digest_is_a_mismatch() {
        assert!(!verify_pattern("3-1-4", "not-hex"));
        assert!(!verify_pattern("3-1-4", "abcd"));
        assert!(!verify_pattern("3-1-4", ""));
    }
}
