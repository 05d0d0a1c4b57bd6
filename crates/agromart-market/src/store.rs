//! Embedded marketplace state.

use crate::config::MarketConfig;
use agromart_commerce::cart::Cart;
use agromart_commerce::catalog::{Category, Product, ProductImage, ProductVariant, Store};
use agromart_commerce::error::CommerceError;
use agromart_commerce::ids::{
    BuyerId, CategoryId, FarmerId, ImageId, OrderId, ProductId, ReviewId, StoreId, UserId,
    VariantId,
};
use agromart_commerce::money::Money;
use agromart_commerce::order::Order;
use agromart_commerce::review::Review;
use crate::registration::{Buyer, Farmer};
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// The relational-style tables backing the marketplace.
#[derive(Debug, Default)]
pub(crate) struct Tables {
    pub stores: HashMap<StoreId, Store>,
    pub categories: HashMap<CategoryId, Category>,
    pub products: HashMap<ProductId, Product>,
    pub variants: HashMap<VariantId, ProductVariant>,
    pub images: HashMap<ImageId, ProductImage>,
    /// One cart per customer.
    pub carts: HashMap<UserId, Cart>,
    pub orders: HashMap<OrderId, Order>,
    pub reviews: HashMap<ReviewId, Review>,
    pub farmers: HashMap<FarmerId, Farmer>,
    pub buyers: HashMap<BuyerId, Buyer>,
}

impl Tables {
    /// Check whether a SKU is already used by any product or variant.
    pub fn sku_in_use(&self, sku: &str) -> bool {
        self.products.values().any(|p| p.sku == sku)
            || self.variants.values().any(|v| v.sku == sku)
    }

    /// Resolve the live unit price of a (product, variant) pair.
    ///
    /// Validates that the variant, when given, belongs to the product.
    pub fn unit_price(
        &self,
        product_id: &ProductId,
        variant_id: Option<&VariantId>,
    ) -> Result<Money, CommerceError> {
        let product = self
            .products
            .get(product_id)
            .ok_or_else(|| CommerceError::ProductNotFound(product_id.to_string()))?;
        match variant_id {
            None => Ok(product.price),
            Some(vid) => {
                let variant = self
                    .variants
                    .get(vid)
                    .filter(|v| &v.product_id == product_id)
                    .ok_or_else(|| CommerceError::VariantNotFound(vid.to_string()))?;
                Ok(variant.effective_price(product))
            }
        }
    }
}

/// The marketplace service.
///
/// All operations go through `&self`; interior state sits behind one lock
/// whose write guard doubles as the transaction boundary for checkout.
#[derive(Debug)]
pub struct Market {
    pub(crate) config: MarketConfig,
    pub(crate) tables: RwLock<Tables>,
}

impl Market {
    /// Create an empty marketplace with the given configuration.
    pub fn new(config: MarketConfig) -> Self {
        Self {
            config,
            tables: RwLock::new(Tables::default()),
        }
    }

    /// The active configuration.
    pub fn config(&self) -> &MarketConfig {
        &self.config
    }

    pub(crate) fn read(&self) -> RwLockReadGuard<'_, Tables> {
        self.tables.read().expect("tables lock poisoned")
    }

    pub(crate) fn write(&self) -> RwLockWriteGuard<'_, Tables> {
        self.tables.write().expect("tables lock poisoned")
    }
}

impl Default for Market {
    fn default() -> Self {
        Self::new(MarketConfig::default())
    }
}
