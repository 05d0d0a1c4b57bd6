//! Request identity.

use agromart_commerce::ids::UserId;
use serde::{Deserialize, Serialize};

/// The identity attached to a request, as supplied by the external
/// identity store. The marketplace trusts these flags and performs no
/// verification of its own.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum User {
    /// Anonymous visitor with session tracking.
    Anonymous {
        /// Session identifier.
        session_id: String,
    },
    /// Authenticated user.
    Authenticated {
        /// User ID.
        id: UserId,
        /// Email address.
        email: String,
        /// Display name.
        name: Option<String>,
        /// Whether the email address has been verified.
        email_verified: bool,
    },
}

impl User {
    /// Create an anonymous identity.
    pub fn anonymous(session_id: impl Into<String>) -> Self {
        User::Anonymous {
            session_id: session_id.into(),
        }
    }

    /// Create an authenticated identity with an unverified email.
    pub fn authenticated(id: UserId, email: impl Into<String>) -> Self {
        User::Authenticated {
            id,
            email: email.into(),
            name: None,
            email_verified: false,
        }
    }

    /// Create an authenticated identity with a verified email.
    pub fn verified(id: UserId, email: impl Into<String>) -> Self {
        User::Authenticated {
            id,
            email: email.into(),
            name: None,
            email_verified: true,
        }
    }

    /// Check if the user is authenticated.
    pub fn is_authenticated(&self) -> bool {
        matches!(self, User::Authenticated { .. })
    }

    /// Get the user ID if authenticated.
    pub fn user_id(&self) -> Option<&UserId> {
        match self {
            User::Authenticated { id, .. } => Some(id),
            User::Anonymous { .. } => None,
        }
    }

    /// Get the email if authenticated.
    pub fn email(&self) -> Option<&str> {
        match self {
            User::Authenticated { email, .. } => Some(email),
            User::Anonymous { .. } => None,
        }
    }

    /// Check if the email is verified.
    pub fn is_email_verified(&self) -> bool {
        match self {
            User::Authenticated { email_verified, .. } => *email_verified,
            User::Anonymous { .. } => false,
        }
    }

    /// Get a display name for the user.
    pub fn display_name(&self) -> &str {
        match self {
            User::Authenticated { name, email, .. } => name.as_deref().unwrap_or(email.as_str()),
            User::Anonymous { session_id } => session_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anonymous_user() {
        let user = User::anonymous("sess-1");
        assert!(!user.is_authenticated());
        assert!(user.user_id().is_none());
        assert!(!user.is_email_verified());
    }

    #[test]
    fn test_authenticated_user() {
        let user = User::authenticated(UserId::new("u1"), "ada@example.com");
        assert!(user.is_authenticated());
        assert_eq!(user.email(), Some("ada@example.com"));
        assert!(!user.is_email_verified());
    }

    #[test]
    fn test_verified_user() {
        let user = User::verified(UserId::new("u1"), "ada@example.com");
        assert!(user.is_email_verified());
    }

    #[test]
    fn test_display_name_falls_back_to_email() {
        let user = User::authenticated(UserId::new("u1"), "ada@example.com");
        assert_eq!(user.display_name(), "ada@example.com");
    }
}
