//! Service-level error type.

use agromart_auth::{AuthError, DeliveryError};
use agromart_commerce::CommerceError;
use thiserror::Error;

/// Any failure a service operation can surface.
#[derive(Error, Debug)]
pub enum MarketError {
    /// Authorization precondition failed.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Domain validation, missing entity, or illegal transition.
    #[error(transparent)]
    Commerce(#[from] CommerceError),

    /// Email delivery failed. Committed state is not rolled back.
    #[error(transparent)]
    Delivery(#[from] DeliveryError),
}

impl MarketError {
    /// Check if this is a constraint/validation failure.
    pub fn is_validation(&self) -> bool {
        matches!(self, MarketError::Commerce(e) if e.is_validation())
    }

    /// Check if this is a missing-entity failure.
    pub fn is_not_found(&self) -> bool {
        matches!(self, MarketError::Commerce(e) if e.is_not_found())
    }

    /// Check if this is an illegal lifecycle transition.
    pub fn is_state(&self) -> bool {
        matches!(self, MarketError::Commerce(e) if e.is_state())
    }

    /// Check if this is an authorization failure.
    pub fn is_auth(&self) -> bool {
        matches!(self, MarketError::Auth(_))
    }
}
