//! Identity gating, email verification, and delivery contracts for Agromart.
//!
//! The identity store itself (credentials, sessions) is an external
//! collaborator; this crate defines what the marketplace trusts it for:
//!
//! - the request identity (`User`) with its `email_verified` flag
//! - explicit precondition gates replacing decorator-based access checks
//! - single-use, expiring email-verification tokens
//! - the `Mailer` collaborator contract for verification/welcome emails

mod email;
mod error;
mod gate;
mod token;
mod user;
mod verification;

pub use email::{
    send_verification_email, send_welcome_email, DeliveryError, EmailTemplate, Mailer,
};
pub use error::AuthError;
pub use gate::{require_authenticated, require_verified_email};
pub use token::{TokenKind, VerificationToken};
pub use user::User;
pub use verification::{confirm_verification, issue_verification};

/// Get current Unix timestamp in seconds.
pub(crate) fn current_timestamp() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}
