//! Account security core: pattern verification, brute-force lockout,
//! OTP second factor, and reset-token lifecycle.

pub mod error;
pub mod lockout;
pub mod otp;
pub mod pattern;
pub mod reset;
pub mod service;
pub mod validate;

pub use error::AuthError;
pub use service::{AuthConfig, AuthService};
