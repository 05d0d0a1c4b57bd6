//! Review submission, moderation, and rating aggregation.

use crate::error::MarketError;
use crate::store::{Market, Tables};
use agromart_auth::{require_verified_email, User};
use agromart_commerce::error::CommerceError;
use agromart_commerce::ids::{OrderId, ProductId, ReviewId, UserId};
use agromart_commerce::order::OrderStatus;
use agromart_commerce::review::{aggregate_rating, Review};

/// Check whether a delivered order links this (customer, product).
fn has_delivered_purchase(tables: &Tables, customer: &UserId, product_id: &ProductId) -> bool {
    tables.orders.values().any(|order| {
        &order.customer_id == customer
            && order.status == OrderStatus::Delivered
            && order.items.iter().any(|i| &i.product_id == product_id)
    })
}

/// Recompute the product's aggregate from approved reviews, then the
/// owning store's aggregate across all its products.
fn recompute_ratings(tables: &mut Tables, product_id: &ProductId) {
    let summary = aggregate_rating(
        tables
            .reviews
            .values()
            .filter(|r| &r.product_id == product_id),
    );
    let store_id = match tables.products.get_mut(product_id) {
        Some(product) => {
            product.apply_rating(summary.average, summary.count);
            product.store_id.clone()
        }
        None => return,
    };

    let store_product_ids: Vec<ProductId> = tables
        .products
        .values()
        .filter(|p| p.store_id == store_id)
        .map(|p| p.id.clone())
        .collect();
    let store_summary = aggregate_rating(
        tables
            .reviews
            .values()
            .filter(|r| store_product_ids.contains(&r.product_id)),
    );
    if let Some(store) = tables.stores.get_mut(&store_id) {
        store.apply_rating(store_summary.average, store_summary.count);
    }
}

impl Market {
    /// Submit a review for a product.
    ///
    /// Anyone with a verified email may review; the review is flagged as a
    /// verified purchase iff a delivered order links this customer to the
    /// product. At most one review per (customer, product, order).
    pub fn submit_review(
        &self,
        user: &User,
        product_id: &ProductId,
        order_id: Option<&OrderId>,
        rating: u8,
        title: &str,
        comment: &str,
    ) -> Result<Review, MarketError> {
        let customer = require_verified_email(user)?.clone();
        let mut tables = self.write();

        if !tables.products.contains_key(product_id) {
            return Err(CommerceError::ProductNotFound(product_id.to_string()).into());
        }
        if let Some(oid) = order_id {
            let order = tables
                .orders
                .get(oid)
                .ok_or_else(|| CommerceError::OrderNotFound(oid.to_string()))?;
            if order.customer_id != customer
                || !order.items.iter().any(|i| &i.product_id == product_id)
            {
                return Err(CommerceError::Validation(
                    "order does not cover this customer and product".to_string(),
                )
                .into());
            }
        }
        if tables.reviews.values().any(|r| {
            r.customer_id == customer
                && &r.product_id == product_id
                && r.order_id.as_ref() == order_id
        }) {
            return Err(CommerceError::DuplicateReview {
                product: product_id.to_string(),
            }
            .into());
        }

        let mut review = Review::new(
            product_id.clone(),
            customer.clone(),
            order_id.cloned(),
            rating,
            title,
            comment,
        )?;
        if has_delivered_purchase(&tables, &customer, product_id) {
            review.mark_verified();
        }
        tables.reviews.insert(review.id.clone(), review.clone());
        Ok(review)
    }

    /// Moderator action: approve a review and recompute aggregates.
    pub fn approve_review(&self, review_id: &ReviewId) -> Result<Review, MarketError> {
        self.moderate_review(review_id, true)
    }

    /// Moderator action: disapprove a review and recompute aggregates.
    pub fn disapprove_review(&self, review_id: &ReviewId) -> Result<Review, MarketError> {
        self.moderate_review(review_id, false)
    }

    fn moderate_review(&self, review_id: &ReviewId, approve: bool) -> Result<Review, MarketError> {
        let mut tables = self.write();
        let review = tables
            .reviews
            .get_mut(review_id)
            .ok_or_else(|| CommerceError::ReviewNotFound(review_id.to_string()))?;
        if approve {
            review.approve();
        } else {
            review.disapprove();
        }
        let product_id = review.product_id.clone();
        let review = review.clone();
        recompute_ratings(&mut tables, &product_id);
        Ok(review)
    }

    /// List a product's reviews, optionally approved only.
    pub fn product_reviews(&self, product_id: &ProductId, approved_only: bool) -> Vec<Review> {
        let tables = self.read();
        let mut reviews: Vec<Review> = tables
            .reviews
            .values()
            .filter(|r| &r.product_id == product_id && (!approved_only || r.is_approved))
            .cloned()
            .collect();
        reviews.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        reviews
    }
}
