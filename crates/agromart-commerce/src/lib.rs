//! Marketplace domain types and lifecycle rules for Agromart.
//!
//! This crate provides the data model shared by every layer of the
//! marketplace:
//!
//! - **Catalog**: categories, vendor stores, products, variants, images
//! - **Cart**: per-customer pending selections priced against the live catalog
//! - **Order**: committed, snapshot-priced transactions with status and
//!   payment lifecycles
//! - **Review**: post-purchase feedback with moderation and rating aggregation
//!
//! Types here hold the invariants (slug/sku uniqueness is enforced by the
//! service layer before persistence; lifecycle rules live on the types
//! themselves). Nothing in this crate performs I/O.

pub mod error;
pub mod ids;
pub mod money;

pub mod cart;
pub mod catalog;
pub mod order;
pub mod review;

pub use error::CommerceError;
pub use ids::*;
pub use money::{Currency, Money};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::error::CommerceError;
    pub use crate::ids::*;
    pub use crate::money::{Currency, Money};

    pub use crate::catalog::{
        Category, Product, ProductCondition, ProductImage, ProductVariant, StockStatus, Store,
    };

    pub use crate::cart::{Cart, CartItem};

    pub use crate::order::{
        Order, OrderItem, OrderStatus, PaymentStatus, ShippingDetails,
    };

    pub use crate::review::{aggregate_rating, RatingSummary, Review};
}

/// Get current Unix timestamp in seconds.
pub(crate) fn current_timestamp() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}
