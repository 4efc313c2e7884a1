//! Input shape checks applied before any store access.

use regex::Regex;

/// Basic email format check.
#[must_use]
pub fn valid_email(email: &str) -> bool {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").is_ok_and(|re| re.is_match(email))
}

/// Identities are short case-sensitive handles; the charset also keeps them
/// safe to embed in reset links and OTP provisioning labels.
#[must_use]
pub fn valid_identity(identity: &str) -> bool {
    Regex::new(r"^[A-Za-z0-9][A-Za-z0-9._-]{2,63}$").is_ok_and(|re| re.is_match(identity))
}

/// A pattern is an ordered selection sequence, serialized as dash-joined
/// grid indices with at least three selections.
#[must_use]
pub fn valid_pattern(pattern: &str) -> bool {
    Regex::new(r"^[0-9]+(-[0-9]+){2,}$").is_ok_and(|re| re.is_match(pattern))
}

/// One-time codes are exactly six digits.
#[must_use]
pub fn valid_otp_code(code: &str) -> bool {
    Regex::new(r"^[0-9]{6}$").is_ok_and(|re| re.is_match(code))
}
