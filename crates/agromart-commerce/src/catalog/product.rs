//! Product, variant, and image types.

use crate::current_timestamp;
use crate::error::CommerceError;
use crate::ids::{CategoryId, ImageId, ProductId, StoreId, VariantId};
use crate::money::Money;
use serde::{Deserialize, Serialize};

/// Physical condition of a listed product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ProductCondition {
    #[default]
    New,
    Used,
    Refurbished,
}

impl ProductCondition {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductCondition::New => "new",
            ProductCondition::Used => "used",
            ProductCondition::Refurbished => "refurbished",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "new" => Some(ProductCondition::New),
            "used" => Some(ProductCondition::Used),
            "refurbished" => Some(ProductCondition::Refurbished),
            _ => None,
        }
    }
}

/// Stock availability, derived from quantity and threshold on read.
///
/// Never persisted; recompute whenever the product is displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StockStatus {
    InStock,
    LowStock,
    OutOfStock,
}

impl StockStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            StockStatus::InStock => "in_stock",
            StockStatus::LowStock => "low_stock",
            StockStatus::OutOfStock => "out_of_stock",
        }
    }

    /// Human-readable label, e.g. "Low Stock (3)".
    pub fn describe(&self, quantity: i64) -> String {
        match self {
            StockStatus::OutOfStock => "Out of Stock".to_string(),
            StockStatus::LowStock => format!("Low Stock ({})", quantity),
            StockStatus::InStock => format!("In Stock ({})", quantity),
        }
    }
}

/// A product listed by a vendor store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    /// Unique product identifier.
    pub id: ProductId,
    /// Owning store.
    pub store_id: StoreId,
    /// Category the product is listed under.
    pub category_id: CategoryId,
    /// Product name.
    pub name: String,
    /// URL-friendly slug (unique within the store).
    pub slug: String,
    /// Stock keeping unit (unique across the marketplace).
    pub sku: String,
    /// Full description.
    pub description: Option<String>,
    /// Short description for listings.
    pub short_description: Option<String>,
    /// Selling price.
    pub price: Money,
    /// Original price for showing markdowns.
    pub compare_price: Option<Money>,
    /// Units in stock.
    pub stock_quantity: i64,
    /// Quantity at or below which the product counts as low stock.
    pub low_stock_threshold: i64,
    /// Physical condition.
    pub condition: ProductCondition,
    /// Whether the product is purchasable.
    pub is_active: bool,
    /// Whether the product is featured on the storefront.
    pub is_featured: bool,
    /// Detail-page view counter (best-effort).
    pub views: i64,
    /// Units sold across all orders.
    pub total_sales: i64,
    /// Mean rating over approved reviews, 0.0-5.0.
    pub rating: f64,
    /// Number of approved reviews counted into the rating.
    pub total_reviews: i64,
    /// Unix timestamp of creation.
    pub created_at: i64,
    /// Unix timestamp of last update.
    pub updated_at: i64,
}

impl Product {
    /// Default low-stock threshold for new products.
    pub const DEFAULT_LOW_STOCK_THRESHOLD: i64 = 5;

    /// Create a new product listing.
    pub fn new(
        store_id: StoreId,
        category_id: CategoryId,
        name: impl Into<String>,
        slug: impl Into<String>,
        sku: impl Into<String>,
        price: Money,
        stock_quantity: i64,
    ) -> Self {
        let now = current_timestamp();
        Self {
            id: ProductId::generate(),
            store_id,
            category_id,
            name: name.into(),
            slug: slug.into(),
            sku: sku.into(),
            description: None,
            short_description: None,
            price,
            compare_price: None,
            stock_quantity: stock_quantity.max(0),
            low_stock_threshold: Self::DEFAULT_LOW_STOCK_THRESHOLD,
            condition: ProductCondition::New,
            is_active: true,
            is_featured: false,
            views: 0,
            total_sales: 0,
            rating: 0.0,
            total_reviews: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Derive the stock status from the current quantity.
    pub fn stock_status(&self) -> StockStatus {
        if self.stock_quantity == 0 {
            StockStatus::OutOfStock
        } else if self.stock_quantity <= self.low_stock_threshold {
            StockStatus::LowStock
        } else {
            StockStatus::InStock
        }
    }

    /// Check if the product is purchasable at all.
    pub fn is_available(&self) -> bool {
        self.is_active && self.stock_quantity > 0
    }

    /// Check if the given quantity can be fulfilled from stock.
    pub fn can_fulfill(&self, quantity: i64) -> bool {
        quantity >= 1 && self.stock_quantity >= quantity
    }

    /// Remove purchased units from stock.
    ///
    /// Fails without mutating when the quantity is invalid or exceeds stock.
    pub fn decrement_stock(&mut self, quantity: i64) -> Result<(), CommerceError> {
        if quantity < 1 {
            return Err(CommerceError::InvalidQuantity(quantity));
        }
        if self.stock_quantity < quantity {
            return Err(CommerceError::InsufficientStock {
                item: self.id.to_string(),
                requested: quantity,
                available: self.stock_quantity,
            });
        }
        self.stock_quantity -= quantity;
        self.updated_at = current_timestamp();
        Ok(())
    }

    /// Add restocked units.
    pub fn restock(&mut self, quantity: i64) {
        self.stock_quantity += quantity.max(0);
        self.updated_at = current_timestamp();
    }

    /// Record a detail-page view. Display-only counter, not guarded
    /// against concurrent lost updates.
    pub fn record_view(&mut self) {
        self.views += 1;
    }

    /// Record sold units against the sales counter.
    pub fn record_sale(&mut self, quantity: i64) {
        self.total_sales += quantity.max(0);
        self.updated_at = current_timestamp();
    }

    /// Replace the review aggregate. `rating` is clamped to 0.0-5.0.
    pub fn apply_rating(&mut self, rating: f64, total_reviews: i64) {
        self.rating = rating.clamp(0.0, 5.0);
        self.total_reviews = total_reviews;
        self.updated_at = current_timestamp();
    }

    /// Take the product off sale.
    pub fn deactivate(&mut self) {
        self.is_active = false;
        self.updated_at = current_timestamp();
    }
}

/// A product variant (e.g. a size/color combination), independently stocked.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductVariant {
    /// Unique variant identifier.
    pub id: VariantId,
    /// Parent product.
    pub product_id: ProductId,
    /// Variant name (e.g. "50kg bag").
    pub name: String,
    /// Stock keeping unit (unique across the marketplace).
    pub sku: String,
    /// Price override; falls back to the product price when None.
    pub price: Option<Money>,
    /// Units in stock for this variant.
    pub stock_quantity: i64,
    /// Size label.
    pub size: Option<String>,
    /// Color label.
    pub color: Option<String>,
    /// Whether the variant is purchasable.
    pub is_active: bool,
    /// Unix timestamp of creation.
    pub created_at: i64,
    /// Unix timestamp of last update.
    pub updated_at: i64,
}

impl ProductVariant {
    /// Create a new variant.
    pub fn new(
        product_id: ProductId,
        name: impl Into<String>,
        sku: impl Into<String>,
        stock_quantity: i64,
    ) -> Self {
        let now = current_timestamp();
        Self {
            id: VariantId::generate(),
            product_id,
            name: name.into(),
            sku: sku.into(),
            price: None,
            stock_quantity: stock_quantity.max(0),
            size: None,
            color: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Price for this variant, falling back to the parent product's price.
    pub fn effective_price(&self, product: &Product) -> Money {
        self.price.unwrap_or(product.price)
    }

    /// Check if the given quantity can be fulfilled from variant stock.
    pub fn can_fulfill(&self, quantity: i64) -> bool {
        quantity >= 1 && self.stock_quantity >= quantity
    }

    /// Remove purchased units from variant stock.
    pub fn decrement_stock(&mut self, quantity: i64) -> Result<(), CommerceError> {
        if quantity < 1 {
            return Err(CommerceError::InvalidQuantity(quantity));
        }
        if self.stock_quantity < quantity {
            return Err(CommerceError::InsufficientStock {
                item: self.id.to_string(),
                requested: quantity,
                available: self.stock_quantity,
            });
        }
        self.stock_quantity -= quantity;
        self.updated_at = current_timestamp();
        Ok(())
    }

    /// Add restocked units.
    pub fn restock(&mut self, quantity: i64) {
        self.stock_quantity += quantity.max(0);
        self.updated_at = current_timestamp();
    }
}

/// A product image.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductImage {
    /// Unique image identifier.
    pub id: ImageId,
    /// Parent product.
    pub product_id: ProductId,
    /// URL of the image file.
    pub url: String,
    /// Alt text for accessibility.
    pub alt_text: Option<String>,
    /// Whether this is the product's primary image.
    pub is_primary: bool,
    /// Sort order position.
    pub position: i32,
    /// Unix timestamp of creation.
    pub created_at: i64,
}

impl ProductImage {
    /// Create a new image record.
    pub fn new(product_id: ProductId, url: impl Into<String>) -> Self {
        Self {
            id: ImageId::generate(),
            product_id,
            url: url.into(),
            alt_text: None,
            is_primary: false,
            position: 0,
            created_at: current_timestamp(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Currency;

    fn sample_product(stock: i64) -> Product {
        Product::new(
            StoreId::new("s1"),
            CategoryId::new("c1"),
            "Yellow Maize",
            "yellow-maize",
            "MAIZE-001",
            Money::new(1000, Currency::NGN),
            stock,
        )
    }

    #[test]
    fn test_stock_status_boundaries() {
        let mut product = sample_product(0);
        assert_eq!(product.stock_status(), StockStatus::OutOfStock);

        product.stock_quantity = Product::DEFAULT_LOW_STOCK_THRESHOLD;
        assert_eq!(product.stock_status(), StockStatus::LowStock);

        product.stock_quantity = Product::DEFAULT_LOW_STOCK_THRESHOLD + 1;
        assert_eq!(product.stock_status(), StockStatus::InStock);
    }

    #[test]
    fn test_stock_status_describe() {
        let product = sample_product(3);
        assert_eq!(product.stock_status().describe(3), "Low Stock (3)");
    }

    #[test]
    fn test_decrement_stock() {
        let mut product = sample_product(10);
        product.decrement_stock(4).unwrap();
        assert_eq!(product.stock_quantity, 6);
    }

    #[test]
    fn test_decrement_stock_insufficient_leaves_stock() {
        let mut product = sample_product(2);
        let err = product.decrement_stock(3).unwrap_err();
        assert!(matches!(err, CommerceError::InsufficientStock { .. }));
        assert_eq!(product.stock_quantity, 2);
    }

    #[test]
    fn test_variant_effective_price() {
        let product = sample_product(10);
        let mut variant = ProductVariant::new(product.id.clone(), "50kg bag", "MAIZE-001-50", 5);
        assert_eq!(variant.effective_price(&product).minor_units, 1000);

        variant.price = Some(Money::new(500, Currency::NGN));
        assert_eq!(variant.effective_price(&product).minor_units, 500);
    }

    #[test]
    fn test_record_view_and_sale() {
        let mut product = sample_product(10);
        product.record_view();
        product.record_view();
        product.record_sale(3);
        assert_eq!(product.views, 2);
        assert_eq!(product.total_sales, 3);
    }
}
