//! Post-purchase reviews and rating aggregation.

use crate::current_timestamp;
use crate::error::CommerceError;
use crate::ids::{OrderId, ProductId, ReviewId, UserId};
use serde::{Deserialize, Serialize};

/// A customer review of a product.
///
/// Anyone may review; `is_verified_purchase` marks reviews backed by a
/// delivered order for the same (customer, product). Only approved reviews
/// count toward rating aggregates.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Review {
    /// Unique review identifier.
    pub id: ReviewId,
    /// Reviewed product.
    pub product_id: ProductId,
    /// Reviewing customer.
    pub customer_id: UserId,
    /// Order the review is tied to, when the customer linked one.
    pub order_id: Option<OrderId>,
    /// Star rating, an integer from 1 to 5.
    pub rating: u8,
    /// Review headline.
    pub title: String,
    /// Review body.
    pub comment: String,
    /// Whether a delivered order backs this review.
    pub is_verified_purchase: bool,
    /// Whether a moderator approved this review.
    pub is_approved: bool,
    /// Unix timestamp of creation.
    pub created_at: i64,
    /// Unix timestamp of last update.
    pub updated_at: i64,
}

impl Review {
    /// Create a review. Fails when the rating falls outside 1-5.
    ///
    /// Reviews start unapproved; moderation toggles approval.
    pub fn new(
        product_id: ProductId,
        customer_id: UserId,
        order_id: Option<OrderId>,
        rating: u8,
        title: impl Into<String>,
        comment: impl Into<String>,
    ) -> Result<Self, CommerceError> {
        if !(1..=5).contains(&rating) {
            return Err(CommerceError::InvalidRating(rating as i32));
        }
        let now = current_timestamp();
        Ok(Self {
            id: ReviewId::generate(),
            product_id,
            customer_id,
            order_id,
            rating,
            title: title.into(),
            comment: comment.into(),
            is_verified_purchase: false,
            is_approved: false,
            created_at: now,
            updated_at: now,
        })
    }

    /// Flag the review as backed by a delivered purchase.
    pub fn mark_verified(&mut self) {
        self.is_verified_purchase = true;
        self.updated_at = current_timestamp();
    }

    /// Moderator approval.
    pub fn approve(&mut self) {
        self.is_approved = true;
        self.updated_at = current_timestamp();
    }

    /// Moderator disapproval.
    pub fn disapprove(&mut self) {
        self.is_approved = false;
        self.updated_at = current_timestamp();
    }
}

/// Aggregate rating over a set of reviews.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct RatingSummary {
    /// Mean of approved ratings; 0.0 when no review is approved.
    pub average: f64,
    /// Number of approved reviews.
    pub count: i64,
}

/// Compute the mean rating over approved reviews only.
pub fn aggregate_rating<'a>(reviews: impl Iterator<Item = &'a Review>) -> RatingSummary {
    let mut sum: i64 = 0;
    let mut count: i64 = 0;
    for review in reviews.filter(|r| r.is_approved) {
        sum += review.rating as i64;
        count += 1;
    }
    if count == 0 {
        RatingSummary::default()
    } else {
        RatingSummary {
            average: sum as f64 / count as f64,
            count,
        }
    }
}
