//! Catalog operations: stores, categories, products, variants, images.
//!
//! Mutations are scoped to the owning vendor; uniqueness constraints are
//! checked before anything is inserted.

use crate::error::MarketError;
use crate::store::{Market, Tables};
use agromart_auth::{require_verified_email, User};
use agromart_commerce::catalog::{
    Category, Product, ProductCondition, ProductImage, ProductVariant, StockStatus, Store,
};
use agromart_commerce::error::CommerceError;
use agromart_commerce::ids::{CategoryId, ProductId, StoreId, UserId};
use agromart_commerce::money::Money;

/// Patch applied to an existing product. `None` fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub short_description: Option<String>,
    pub price: Option<Money>,
    pub compare_price: Option<Money>,
    pub stock_quantity: Option<i64>,
    pub low_stock_threshold: Option<i64>,
    pub condition: Option<ProductCondition>,
    pub is_active: Option<bool>,
    pub is_featured: Option<bool>,
}

/// Patch applied to an existing store. `None` fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct StorePatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
}

/// Input for creating a product variant.
#[derive(Debug, Clone)]
pub struct NewVariant {
    pub name: String,
    pub sku: String,
    /// Price override; None inherits the product price.
    pub price: Option<Money>,
    pub stock_quantity: i64,
    pub size: Option<String>,
    pub color: Option<String>,
}

/// A product as shown on its detail page.
#[derive(Debug, Clone)]
pub struct ProductView {
    pub product: Product,
    pub variants: Vec<ProductVariant>,
    pub images: Vec<ProductImage>,
    pub stock_status: StockStatus,
}

fn require_store_owner<'t>(
    tables: &'t Tables,
    store_id: &StoreId,
    vendor: &UserId,
) -> Result<&'t Store, CommerceError> {
    let store = tables
        .stores
        .get(store_id)
        .ok_or_else(|| CommerceError::StoreNotFound(store_id.to_string()))?;
    if &store.owner != vendor {
        return Err(CommerceError::Validation(
            "store does not belong to the acting vendor".to_string(),
        ));
    }
    Ok(store)
}

fn require_product_owner<'t>(
    tables: &'t Tables,
    product_id: &ProductId,
    vendor: &UserId,
) -> Result<&'t Product, CommerceError> {
    let product = tables
        .products
        .get(product_id)
        .ok_or_else(|| CommerceError::ProductNotFound(product_id.to_string()))?;
    require_store_owner(tables, &product.store_id, vendor)?;
    Ok(product)
}

impl Market {
    /// Create a category, optionally nested under a parent.
    pub fn create_category(
        &self,
        name: &str,
        slug: &str,
        parent_id: Option<&CategoryId>,
    ) -> Result<Category, MarketError> {
        let mut tables = self.write();
        if tables.categories.values().any(|c| c.slug == slug) {
            return Err(CommerceError::SlugTaken { slug: slug.into() }.into());
        }
        let category = match parent_id {
            None => Category::new(name, slug),
            Some(pid) => {
                let parent = tables
                    .categories
                    .get(pid)
                    .ok_or_else(|| CommerceError::CategoryNotFound(pid.to_string()))?;
                Category::child_of(parent, name, slug)
            }
        };
        tables.categories.insert(category.id.clone(), category.clone());
        Ok(category)
    }

    /// Open a store for the acting vendor. One store per user; the slug is
    /// globally unique.
    pub fn create_store(
        &self,
        user: &User,
        name: &str,
        slug: &str,
    ) -> Result<Store, MarketError> {
        let vendor = require_verified_email(user)?.clone();
        let mut tables = self.write();
        if tables.stores.values().any(|s| s.owner == vendor) {
            return Err(CommerceError::StoreExists {
                owner: vendor.to_string(),
            }
            .into());
        }
        if tables.stores.values().any(|s| s.slug == slug) {
            return Err(CommerceError::SlugTaken { slug: slug.into() }.into());
        }
        let store = Store::new(vendor, name, slug);
        tables.stores.insert(store.id.clone(), store.clone());
        tracing::info!(store = %store.id, slug = %store.slug, "store created");
        Ok(store)
    }

    /// Moderator action: mark a store verified.
    pub fn verify_store(&self, store_id: &StoreId) -> Result<Store, MarketError> {
        let mut tables = self.write();
        let store = tables
            .stores
            .get_mut(store_id)
            .ok_or_else(|| CommerceError::StoreNotFound(store_id.to_string()))?;
        store.verify();
        Ok(store.clone())
    }

    /// Apply a patch to the acting vendor's own store.
    pub fn edit_store(
        &self,
        user: &User,
        store_id: &StoreId,
        patch: StorePatch,
    ) -> Result<Store, MarketError> {
        let vendor = require_verified_email(user)?.clone();
        let mut tables = self.write();
        require_store_owner(&tables, store_id, &vendor)?;
        let store = tables.stores.get_mut(store_id).expect("checked above");
        if let Some(name) = patch.name {
            store.name = name;
        }
        if let Some(description) = patch.description {
            store.description = Some(description);
        }
        if let Some(email) = patch.email {
            store.email = Some(email);
        }
        if let Some(phone) = patch.phone {
            store.phone = Some(phone);
        }
        if let Some(address) = patch.address {
            store.address = Some(address);
        }
        if let Some(city) = patch.city {
            store.city = Some(city);
        }
        if let Some(state) = patch.state {
            store.state = Some(state);
        }
        if let Some(country) = patch.country {
            store.country = Some(country);
        }
        store.updated_at = current_timestamp();
        Ok(store.clone())
    }

    /// Close the acting vendor's store.
    pub fn deactivate_store(&self, user: &User, store_id: &StoreId) -> Result<(), MarketError> {
        let vendor = require_verified_email(user)?.clone();
        let mut tables = self.write();
        require_store_owner(&tables, store_id, &vendor)?;
        let store = tables.stores.get_mut(store_id).expect("checked above");
        store.deactivate();
        Ok(())
    }

    /// List a vendor product. The slug must be unique within the store and
    /// the SKU unique across the marketplace.
    #[allow(clippy::too_many_arguments)]
    pub fn create_product(
        &self,
        user: &User,
        store_id: &StoreId,
        category_id: &CategoryId,
        name: &str,
        slug: &str,
        sku: &str,
        price: Money,
        stock_quantity: i64,
    ) -> Result<Product, MarketError> {
        let vendor = require_verified_email(user)?.clone();
        let mut tables = self.write();
        let store = require_store_owner(&tables, store_id, &vendor)?;
        if !store.is_active {
            return Err(
                CommerceError::Validation("store is not active".to_string()).into(),
            );
        }
        if !tables.categories.contains_key(category_id) {
            return Err(CommerceError::CategoryNotFound(category_id.to_string()).into());
        }
        if tables
            .products
            .values()
            .any(|p| &p.store_id == store_id && p.slug == slug)
        {
            return Err(CommerceError::SlugTaken { slug: slug.into() }.into());
        }
        if tables.sku_in_use(sku) {
            return Err(CommerceError::SkuTaken { sku: sku.into() }.into());
        }
        let product = Product::new(
            store_id.clone(),
            category_id.clone(),
            name,
            slug,
            sku,
            price,
            stock_quantity,
        );
        tables.products.insert(product.id.clone(), product.clone());
        tracing::info!(product = %product.id, store = %store_id, "product created");
        Ok(product)
    }

    /// Apply a patch to a vendor's own product.
    pub fn edit_product(
        &self,
        user: &User,
        product_id: &ProductId,
        patch: ProductPatch,
    ) -> Result<Product, MarketError> {
        let vendor = require_verified_email(user)?.clone();
        let mut tables = self.write();
        require_product_owner(&tables, product_id, &vendor)?;
        if let Some(qty) = patch.stock_quantity {
            if qty < 0 {
                return Err(CommerceError::InvalidQuantity(qty).into());
            }
        }
        let product = tables.products.get_mut(product_id).expect("checked above");
        if let Some(name) = patch.name {
            product.name = name;
        }
        if let Some(description) = patch.description {
            product.description = Some(description);
        }
        if let Some(short) = patch.short_description {
            product.short_description = Some(short);
        }
        if let Some(price) = patch.price {
            product.price = price;
        }
        if let Some(compare) = patch.compare_price {
            product.compare_price = Some(compare);
        }
        if let Some(qty) = patch.stock_quantity {
            product.stock_quantity = qty;
        }
        if let Some(threshold) = patch.low_stock_threshold {
            product.low_stock_threshold = threshold;
        }
        if let Some(condition) = patch.condition {
            product.condition = condition;
        }
        if let Some(active) = patch.is_active {
            product.is_active = active;
        }
        if let Some(featured) = patch.is_featured {
            product.is_featured = featured;
        }
        product.updated_at = current_timestamp();
        Ok(product.clone())
    }

    /// Take a vendor's own product off sale.
    pub fn deactivate_product(
        &self,
        user: &User,
        product_id: &ProductId,
    ) -> Result<(), MarketError> {
        let vendor = require_verified_email(user)?.clone();
        let mut tables = self.write();
        require_product_owner(&tables, product_id, &vendor)?;
        let product = tables.products.get_mut(product_id).expect("checked above");
        product.deactivate();
        Ok(())
    }

    /// Add restocked units to a vendor's own product.
    pub fn restock_product(
        &self,
        user: &User,
        product_id: &ProductId,
        quantity: i64,
    ) -> Result<Product, MarketError> {
        if quantity < 1 {
            return Err(CommerceError::InvalidQuantity(quantity).into());
        }
        let vendor = require_verified_email(user)?.clone();
        let mut tables = self.write();
        require_product_owner(&tables, product_id, &vendor)?;
        let product = tables.products.get_mut(product_id).expect("checked above");
        product.restock(quantity);
        Ok(product.clone())
    }

    /// Add a variant to a vendor's own product.
    pub fn add_variant(
        &self,
        user: &User,
        product_id: &ProductId,
        variant: NewVariant,
    ) -> Result<ProductVariant, MarketError> {
        let vendor = require_verified_email(user)?.clone();
        let mut tables = self.write();
        require_product_owner(&tables, product_id, &vendor)?;
        if tables.sku_in_use(&variant.sku) {
            return Err(CommerceError::SkuTaken { sku: variant.sku }.into());
        }
        let mut record =
            ProductVariant::new(product_id.clone(), variant.name, variant.sku, variant.stock_quantity);
        record.price = variant.price;
        record.size = variant.size;
        record.color = variant.color;
        tables.variants.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    /// Attach an image to a vendor's own product. Marking it primary
    /// demotes the previous primary image.
    pub fn add_image(
        &self,
        user: &User,
        product_id: &ProductId,
        url: &str,
        alt_text: Option<String>,
        is_primary: bool,
    ) -> Result<ProductImage, MarketError> {
        let vendor = require_verified_email(user)?.clone();
        let mut tables = self.write();
        require_product_owner(&tables, product_id, &vendor)?;
        if is_primary {
            for image in tables
                .images
                .values_mut()
                .filter(|i| &i.product_id == product_id)
            {
                image.is_primary = false;
            }
        }
        let mut image = ProductImage::new(product_id.clone(), url);
        image.alt_text = alt_text;
        image.is_primary = is_primary;
        tables.images.insert(image.id.clone(), image.clone());
        Ok(image)
    }

    /// Read a product detail page, incrementing its view counter.
    ///
    /// The counter is display-only and deliberately not guarded against
    /// concurrent lost updates.
    pub fn product_detail(&self, product_id: &ProductId) -> Result<ProductView, MarketError> {
        let mut tables = self.write();
        let product = tables
            .products
            .get_mut(product_id)
            .ok_or_else(|| CommerceError::ProductNotFound(product_id.to_string()))?;
        product.record_view();
        let product = product.clone();
        let mut variants: Vec<ProductVariant> = tables
            .variants
            .values()
            .filter(|v| &v.product_id == product_id)
            .cloned()
            .collect();
        variants.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        let mut images: Vec<ProductImage> = tables
            .images
            .values()
            .filter(|i| &i.product_id == product_id)
            .cloned()
            .collect();
        images.sort_by_key(|i| i.position);
        let stock_status = product.stock_status();
        Ok(ProductView {
            product,
            variants,
            images,
            stock_status,
        })
    }

    /// Look up a store by slug.
    pub fn store_by_slug(&self, slug: &str) -> Option<Store> {
        self.read().stores.values().find(|s| s.slug == slug).cloned()
    }

    /// Look up a store by id.
    pub fn store(&self, store_id: &StoreId) -> Result<Store, MarketError> {
        self.read()
            .stores
            .get(store_id)
            .cloned()
            .ok_or_else(|| CommerceError::StoreNotFound(store_id.to_string()).into())
    }

    /// Look up a product by id, without counting a view.
    pub fn product(&self, product_id: &ProductId) -> Result<Product, MarketError> {
        self.read()
            .products
            .get(product_id)
            .cloned()
            .ok_or_else(|| CommerceError::ProductNotFound(product_id.to_string()).into())
    }

    /// List a store's active products.
    pub fn list_store_products(&self, store_id: &StoreId) -> Vec<Product> {
        let tables = self.read();
        let mut products: Vec<Product> = tables
            .products
            .values()
            .filter(|p| &p.store_id == store_id && p.is_active)
            .cloned()
            .collect();
        products.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        products
    }
}

/// Get current Unix timestamp in seconds.
fn current_timestamp() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use agromart_commerce::money::Currency;

    fn vendor() -> User {
        User::verified(UserId::new("vendor-1"), "vendor@example.com")
    }

    fn market_with_store() -> (Market, Store, Category) {
        let market = Market::default();
        let store = market.create_store(&vendor(), "Green Farms", "green-farms").unwrap();
        let category = market.create_category("Grains", "grains", None).unwrap();
        (market, store, category)
    }

    #[test]
    fn test_one_store_per_owner() {
        let (market, _store, _cat) = market_with_store();
        let err = market
            .create_store(&vendor(), "Second Store", "second-store")
            .unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_store_slug_unique() {
        let (market, _store, _cat) = market_with_store();
        let other = User::verified(UserId::new("vendor-2"), "other@example.com");
        let err = market
            .create_store(&other, "Copycat", "green-farms")
            .unwrap_err();
        assert!(matches!(
            err,
            MarketError::Commerce(CommerceError::SlugTaken { .. })
        ));
    }

    #[test]
    fn test_unverified_vendor_gated() {
        let market = Market::default();
        let user = User::authenticated(UserId::new("u1"), "u1@example.com");
        let err = market.create_store(&user, "Shop", "shop").unwrap_err();
        assert!(err.is_auth());
    }

    #[test]
    fn test_product_slug_unique_per_store() {
        let (market, store, category) = market_with_store();
        let price = Money::new(1000, Currency::NGN);
        market
            .create_product(&vendor(), &store.id, &category.id, "Maize", "maize", "SKU-1", price, 10)
            .unwrap();
        let err = market
            .create_product(&vendor(), &store.id, &category.id, "Maize 2", "maize", "SKU-2", price, 10)
            .unwrap_err();
        assert!(matches!(
            err,
            MarketError::Commerce(CommerceError::SlugTaken { .. })
        ));
    }

    #[test]
    fn test_sku_unique_across_products_and_variants() {
        let (market, store, category) = market_with_store();
        let price = Money::new(1000, Currency::NGN);
        let product = market
            .create_product(&vendor(), &store.id, &category.id, "Maize", "maize", "SKU-1", price, 10)
            .unwrap();
        market
            .add_variant(
                &vendor(),
                &product.id,
                NewVariant {
                    name: "50kg".into(),
                    sku: "SKU-1-50".into(),
                    price: None,
                    stock_quantity: 5,
                    size: Some("50kg".into()),
                    color: None,
                },
            )
            .unwrap();
        let err = market
            .create_product(&vendor(), &store.id, &category.id, "Other", "other", "SKU-1-50", price, 1)
            .unwrap_err();
        assert!(matches!(
            err,
            MarketError::Commerce(CommerceError::SkuTaken { .. })
        ));
    }

    #[test]
    fn test_edit_store_updates_contact_fields() {
        let (market, store, _cat) = market_with_store();
        let updated = market
            .edit_store(
                &vendor(),
                &store.id,
                StorePatch {
                    city: Some("Umuahia".into()),
                    phone: Some("08011111111".into()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(updated.city.as_deref(), Some("Umuahia"));
        assert_eq!(updated.phone.as_deref(), Some("08011111111"));

        let outsider = User::verified(UserId::new("vendor-2"), "other@example.com");
        let err = market
            .edit_store(&outsider, &store.id, StorePatch::default())
            .unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_vendor_scope_enforced() {
        let (market, _store, category) = market_with_store();
        let outsider = User::verified(UserId::new("vendor-2"), "other@example.com");
        let their_store = market
            .create_store(&outsider, "Other Farms", "other-farms")
            .unwrap();
        let price = Money::new(1000, Currency::NGN);
        let product = market
            .create_product(
                &outsider, &their_store.id, &category.id, "Rice", "rice", "RICE-1", price, 10,
            )
            .unwrap();

        let err = market
            .edit_product(&vendor(), &product.id, ProductPatch::default())
            .unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_product_detail_counts_views() {
        let (market, store, category) = market_with_store();
        let price = Money::new(1000, Currency::NGN);
        let product = market
            .create_product(&vendor(), &store.id, &category.id, "Maize", "maize", "SKU-1", price, 10)
            .unwrap();

        market.product_detail(&product.id).unwrap();
        let view = market.product_detail(&product.id).unwrap();
        assert_eq!(view.product.views, 2);
    }

    #[test]
    fn test_primary_image_demotes_previous() {
        let (market, store, category) = market_with_store();
        let price = Money::new(1000, Currency::NGN);
        let product = market
            .create_product(&vendor(), &store.id, &category.id, "Maize", "maize", "SKU-1", price, 10)
            .unwrap();
        let first = market
            .add_image(&vendor(), &product.id, "https://img/1.jpg", None, true)
            .unwrap();
        market
            .add_image(&vendor(), &product.id, "https://img/2.jpg", None, true)
            .unwrap();

        let view = market.product_detail(&product.id).unwrap();
        let primaries: Vec<_> = view.images.iter().filter(|i| i.is_primary).collect();
        assert_eq!(primaries.len(), 1);
        assert_ne!(primaries[0].id, first.id);
    }
}
