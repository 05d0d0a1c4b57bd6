//! Authentication errors.

use thiserror::Error;

/// Typed authorization/verification failures.
///
/// Handlers return these instead of redirecting; the caller decides how to
/// render them (login page, resend-verification prompt, 403).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// No authenticated user on the request.
    #[error("authentication required")]
    NotAuthenticated,

    /// Authenticated, but the email address has not been verified.
    #[error("email not verified")]
    EmailNotVerified,

    /// Token does not exist, does not match, or was already used.
    #[error("token invalid or already used")]
    InvalidToken,

    /// Token expired.
    #[error("token expired")]
    TokenExpired,
}

impl AuthError {
    /// Check if this failure should send the caller to login.
    pub fn requires_login(&self) -> bool {
        matches!(self, AuthError::NotAuthenticated)
    }

    /// Check if this failure should prompt re-verification.
    pub fn requires_verification(&self) -> bool {
        matches!(
            self,
            AuthError::EmailNotVerified | AuthError::InvalidToken | AuthError::TokenExpired
        )
    }
}
