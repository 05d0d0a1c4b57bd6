//! Verification tokens.
//!
//! Single-use, expiring tokens for email verification and password reset.

use crate::current_timestamp;
use crate::error::AuthError;
use agromart_commerce::ids::UserId;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use rand::RngCore;
use serde::{Deserialize, Serialize};

/// Token kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenKind {
    /// Email verification link.
    EmailVerification,
    /// Password reset link.
    PasswordReset,
}

impl TokenKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::EmailVerification => "email_verification",
            TokenKind::PasswordReset => "password_reset",
        }
    }

    /// Default expiry for this kind, in seconds.
    pub fn default_expiry_secs(&self) -> i64 {
        match self {
            TokenKind::EmailVerification => 24 * 60 * 60,
            TokenKind::PasswordReset => 60 * 60,
        }
    }
}

/// A single-use token bound to a user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationToken {
    /// The url-safe token value.
    pub token: String,
    /// Token kind.
    pub kind: TokenKind,
    /// User this token belongs to.
    pub user_id: UserId,
    /// Unix timestamp of creation.
    pub created_at: i64,
    /// Unix timestamp of expiry.
    pub expires_at: i64,
    /// Whether the token has been consumed.
    pub used: bool,
}

impl VerificationToken {
    /// Generate a token with the kind's default expiry.
    pub fn generate(kind: TokenKind, user_id: UserId) -> Self {
        Self::generate_with_expiry(kind, user_id, kind.default_expiry_secs())
    }

    /// Generate a token with a custom expiry.
    pub fn generate_with_expiry(kind: TokenKind, user_id: UserId, expiry_secs: i64) -> Self {
        let now = current_timestamp();
        Self {
            token: generate_token_string(),
            kind,
            user_id,
            created_at: now,
            expires_at: now + expiry_secs,
            used: false,
        }
    }

    /// Check if the token has expired.
    pub fn is_expired(&self) -> bool {
        current_timestamp() > self.expires_at
    }

    /// Validate the token for use.
    pub fn validate(&self) -> Result<(), AuthError> {
        if self.used {
            return Err(AuthError::InvalidToken);
        }
        if self.is_expired() {
            return Err(AuthError::TokenExpired);
        }
        Ok(())
    }

    /// Consume the token.
    pub fn mark_used(&mut self) {
        self.used = true;
    }
}

/// Generate a url-safe random token string (32 bytes of entropy).
fn generate_token_string() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}
