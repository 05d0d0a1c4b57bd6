//! Email verification flow glue.
//!
//! Issues a token and sends the verification email; confirms a supplied
//! token against the stored one. The caller owns persisting the token and
//! flipping the user's `email_verified` flag — a welcome-email failure
//! after that flip surfaces as a `DeliveryError` without undoing it.

use crate::email::{send_verification_email, DeliveryError, Mailer};
use crate::error::AuthError;
use crate::token::{TokenKind, VerificationToken};
use agromart_commerce::ids::UserId;

/// Issue an email-verification token and send its link.
///
/// Returns the token for the caller to persist. A delivery failure aborts
/// and nothing should be persisted.
pub fn issue_verification(
    mailer: &dyn Mailer,
    user_id: UserId,
    email: &str,
    base_url: &str,
) -> Result<VerificationToken, DeliveryError> {
    let token = VerificationToken::generate(TokenKind::EmailVerification, user_id);
    let verification_url = format!("{}/verify-email/{}", base_url.trim_end_matches('/'), token.token);
    send_verification_email(mailer, email, &verification_url)?;
    Ok(token)
}

/// Confirm a supplied token value against the stored token, consuming it.
///
/// Rejects mismatched, already-used, and expired tokens; on success the
/// stored token is marked used and the caller flips `email_verified`.
pub fn confirm_verification(
    stored: &mut VerificationToken,
    supplied: &str,
) -> Result<(), AuthError> {
    if stored.token != supplied {
        return Err(AuthError::InvalidToken);
    }
    stored.validate()?;
    stored.mark_used();
    Ok(())
}
