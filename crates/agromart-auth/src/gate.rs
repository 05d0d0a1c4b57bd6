//! Explicit access-gate preconditions.
//!
//! Handlers call these at the top instead of relying on decorators or
//! middleware; the typed failure tells the caller whether to send the user
//! to login or to re-verification.

use crate::error::AuthError;
use crate::user::User;
use agromart_commerce::ids::UserId;

/// Require an authenticated user, returning their id.
pub fn require_authenticated(user: &User) -> Result<&UserId, AuthError> {
    user.user_id().ok_or(AuthError::NotAuthenticated)
}

/// Require an authenticated user with a verified email, returning their id.
///
/// Authentication is checked first so an anonymous caller is told to log in
/// rather than to verify.
pub fn require_verified_email(user: &User) -> Result<&UserId, AuthError> {
    let id = require_authenticated(user)?;
    if !user.is_email_verified() {
        return Err(AuthError::EmailNotVerified);
    }
    Ok(id)
}
