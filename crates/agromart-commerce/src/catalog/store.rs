//! Vendor store profile.

use crate::current_timestamp;
use crate::ids::{StoreId, UserId};
use serde::{Deserialize, Serialize};

/// A vendor's store on the marketplace.
///
/// Every product belongs to exactly one store; every store belongs to
/// exactly one owning user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Store {
    /// Unique store identifier.
    pub id: StoreId,
    /// Owning vendor (one store per user).
    pub owner: UserId,
    /// Store name.
    pub name: String,
    /// URL-friendly slug (globally unique).
    pub slug: String,
    /// Store description.
    pub description: Option<String>,
    /// Contact email.
    pub email: Option<String>,
    /// Contact phone.
    pub phone: Option<String>,
    /// Street address.
    pub address: Option<String>,
    /// City.
    pub city: Option<String>,
    /// State.
    pub state: Option<String>,
    /// Country.
    pub country: Option<String>,
    /// Whether the store has been verified by a moderator.
    pub is_verified: bool,
    /// Whether the store is open for business.
    pub is_active: bool,
    /// Mean rating over approved reviews of this store's products, 0.0-5.0.
    pub rating: f64,
    /// Number of approved reviews counted into the rating.
    pub total_reviews: i64,
    /// Unix timestamp of creation.
    pub created_at: i64,
    /// Unix timestamp of last update.
    pub updated_at: i64,
}

impl Store {
    /// Create a new store for a vendor.
    pub fn new(owner: UserId, name: impl Into<String>, slug: impl Into<String>) -> Self {
        let now = current_timestamp();
        Self {
            id: StoreId::generate(),
            owner,
            name: name.into(),
            slug: slug.into(),
            description: None,
            email: None,
            phone: None,
            address: None,
            city: None,
            state: None,
            country: None,
            is_verified: false,
            is_active: true,
            rating: 0.0,
            total_reviews: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Mark the store verified.
    pub fn verify(&mut self) {
        self.is_verified = true;
        self.updated_at = current_timestamp();
    }

    /// Close the store.
    pub fn deactivate(&mut self) {
        self.is_active = false;
        self.updated_at = current_timestamp();
    }

    /// Reopen the store.
    pub fn activate(&mut self) {
        self.is_active = true;
        self.updated_at = current_timestamp();
    }

    /// Replace the review aggregate. `rating` is clamped to 0.0-5.0.
    pub fn apply_rating(&mut self, rating: f64, total_reviews: i64) {
        self.rating = rating.clamp(0.0, 5.0);
        self.total_reviews = total_reviews;
        self.updated_at = current_timestamp();
    }
}
