//! Marketplace service API for Agromart.
//!
//! One fixed set of commands and queries over the marketplace state,
//! callable from any UI layer (admin panel, storefront, CLI). Handlers pass
//! the request identity explicitly; customer-facing commands gate on a
//! verified email at the top and return typed failures instead of
//! redirecting.
//!
//! State lives in an embedded, relational-style store behind a single
//! lock. The exclusive write guard is the transaction boundary: checkout
//! validates every cart line and only then mutates stock, orders, and the
//! cart, so a failure can never leave partial state behind.

mod cart;
mod catalog;
mod checkout;
mod config;
mod error;
mod orders;
mod registration;
mod reviews;
mod store;

pub use cart::{CartLine, CartView};
pub use catalog::{NewVariant, ProductPatch, ProductView, StorePatch};
pub use config::MarketConfig;
pub use error::MarketError;
pub use orders::BulkOutcome;
pub use registration::{Buyer, BuyerRegistration, Farmer, FarmerRegistration};
pub use store::Market;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{
        BulkOutcome, Buyer, BuyerRegistration, CartLine, CartView, Farmer, FarmerRegistration,
        Market, MarketConfig, MarketError, NewVariant, ProductPatch, ProductView, StorePatch,
    };
    pub use agromart_auth::User;
    pub use agromart_commerce::prelude::*;
}
