//! Commerce error types.

use thiserror::Error;

/// Errors that can occur in marketplace operations.
#[derive(Error, Debug)]
pub enum CommerceError {
    /// Store not found.
    #[error("store not found: {0}")]
    StoreNotFound(String),

    /// Category not found.
    #[error("category not found: {0}")]
    CategoryNotFound(String),

    /// Product not found.
    #[error("product not found: {0}")]
    ProductNotFound(String),

    /// Variant not found.
    #[error("variant not found: {0}")]
    VariantNotFound(String),

    /// Cart not found.
    #[error("cart not found for customer: {0}")]
    CartNotFound(String),

    /// Item not in cart.
    #[error("item not in cart: {0}")]
    ItemNotInCart(String),

    /// Order not found.
    #[error("order not found: {0}")]
    OrderNotFound(String),

    /// Review not found.
    #[error("review not found: {0}")]
    ReviewNotFound(String),

    /// Registration profile not found.
    #[error("profile not found: {0}")]
    ProfileNotFound(String),

    /// Slug already taken within its scope.
    #[error("slug already taken: {slug}")]
    SlugTaken { slug: String },

    /// SKU already taken.
    #[error("sku already taken: {sku}")]
    SkuTaken { sku: String },

    /// Owner already has a store.
    #[error("store already exists for owner: {owner}")]
    StoreExists { owner: String },

    /// Registration profile already exists for the user.
    #[error("profile already exists for user: {user}")]
    ProfileExists { user: String },

    /// Phone number already registered.
    #[error("phone already registered: {phone}")]
    PhoneTaken { phone: String },

    /// Email address already registered.
    #[error("email already registered: {email}")]
    EmailTaken { email: String },

    /// Insufficient stock to satisfy a request.
    #[error("insufficient stock for {item}: requested {requested}, available {available}")]
    InsufficientStock {
        item: String,
        requested: i64,
        available: i64,
    },

    /// Quantity must be at least 1.
    #[error("invalid quantity: {0}")]
    InvalidQuantity(i64),

    /// Rating outside the 1-5 range.
    #[error("invalid rating: {0} (must be 1-5)")]
    InvalidRating(i32),

    /// Checkout attempted with an empty cart.
    #[error("cart is empty")]
    EmptyCart,

    /// A review for this (customer, product, order) already exists.
    #[error("duplicate review for product: {product}")]
    DuplicateReview { product: String },

    /// Invalid order status transition.
    #[error("invalid status transition from {from} to {to}")]
    InvalidTransition { from: String, to: String },

    /// Invalid payment status transition.
    #[error("invalid payment transition from {from} to {to}")]
    InvalidPaymentTransition { from: String, to: String },

    /// Arithmetic overflow in a money calculation.
    #[error("arithmetic overflow in money calculation")]
    Overflow,

    /// Currency mismatch.
    #[error("currency mismatch: expected {expected}, got {got}")]
    CurrencyMismatch { expected: String, got: String },

    /// Other validation failure.
    #[error("validation error: {0}")]
    Validation(String),
}

impl CommerceError {
    /// Check if this is a missing-entity error.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            CommerceError::StoreNotFound(_)
                | CommerceError::CategoryNotFound(_)
                | CommerceError::ProductNotFound(_)
                | CommerceError::VariantNotFound(_)
                | CommerceError::CartNotFound(_)
                | CommerceError::ItemNotInCart(_)
                | CommerceError::OrderNotFound(_)
                | CommerceError::ReviewNotFound(_)
                | CommerceError::ProfileNotFound(_)
        )
    }

    /// Check if this is a constraint/validation failure.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            CommerceError::SlugTaken { .. }
                | CommerceError::SkuTaken { .. }
                | CommerceError::StoreExists { .. }
                | CommerceError::ProfileExists { .. }
                | CommerceError::PhoneTaken { .. }
                | CommerceError::EmailTaken { .. }
                | CommerceError::InsufficientStock { .. }
                | CommerceError::InvalidQuantity(_)
                | CommerceError::InvalidRating(_)
                | CommerceError::EmptyCart
                | CommerceError::DuplicateReview { .. }
                | CommerceError::Overflow
                | CommerceError::CurrencyMismatch { .. }
                | CommerceError::Validation(_)
        )
    }

    /// Check if this is an illegal lifecycle transition.
    pub fn is_state(&self) -> bool {
        matches!(
            self,
            CommerceError::InvalidTransition { .. }
                | CommerceError::InvalidPaymentTransition { .. }
        )
    }
}
