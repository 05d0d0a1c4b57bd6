//! Cart operations.
//!
//! Lines are validated against available stock when added or resized, but
//! prices are never frozen here: totals always reflect the live catalog
//! until checkout snapshots them.

use crate::error::MarketError;
use crate::store::{Market, Tables};
use agromart_auth::{require_verified_email, User};
use agromart_commerce::cart::{Cart, CartItem};
use agromart_commerce::error::CommerceError;
use agromart_commerce::ids::{CartItemId, ProductId, VariantId};
use agromart_commerce::money::Money;

/// A cart line priced against the live catalog.
#[derive(Debug, Clone)]
pub struct CartLine {
    pub item: CartItem,
    pub product_name: String,
    pub unit_price: Money,
    pub subtotal: Money,
}

/// A cart as shown to the customer.
#[derive(Debug, Clone)]
pub struct CartView {
    pub lines: Vec<CartLine>,
    pub total: Money,
}

/// Check that `requested` units of the (product, variant) pair can be
/// fulfilled from current stock.
fn check_stock(
    tables: &Tables,
    product_id: &ProductId,
    variant_id: Option<&VariantId>,
    requested: i64,
) -> Result<(), CommerceError> {
    let product = tables
        .products
        .get(product_id)
        .ok_or_else(|| CommerceError::ProductNotFound(product_id.to_string()))?;
    if !product.is_active {
        return Err(CommerceError::Validation(format!(
            "product no longer available: {}",
            product_id
        )));
    }
    match variant_id {
        None => {
            if !product.can_fulfill(requested) {
                return Err(CommerceError::InsufficientStock {
                    item: product_id.to_string(),
                    requested,
                    available: product.stock_quantity,
                });
            }
        }
        Some(vid) => {
            let variant = tables
                .variants
                .get(vid)
                .filter(|v| &v.product_id == product_id)
                .ok_or_else(|| CommerceError::VariantNotFound(vid.to_string()))?;
            if !variant.can_fulfill(requested) {
                return Err(CommerceError::InsufficientStock {
                    item: vid.to_string(),
                    requested,
                    available: variant.stock_quantity,
                });
            }
        }
    }
    Ok(())
}

impl Market {
    /// Add units of a product (optionally a specific variant) to the
    /// customer's cart, creating the cart lazily on first add.
    ///
    /// Fails when the resulting line quantity would exceed available stock;
    /// the cart is left unchanged in that case.
    pub fn add_to_cart(
        &self,
        user: &User,
        product_id: &ProductId,
        variant_id: Option<&VariantId>,
        quantity: i64,
    ) -> Result<CartItemId, MarketError> {
        if quantity < 1 {
            return Err(CommerceError::InvalidQuantity(quantity).into());
        }
        let customer = require_verified_email(user)?.clone();
        let mut tables = self.write();

        let already_in_cart = tables
            .carts
            .get(&customer)
            .and_then(|c| c.line_for(product_id, variant_id))
            .map(|line| line.quantity)
            .unwrap_or(0);
        let resulting = already_in_cart
            .checked_add(quantity)
            .ok_or(CommerceError::Overflow)?;
        check_stock(&tables, product_id, variant_id, resulting)?;

        let cart = tables
            .carts
            .entry(customer.clone())
            .or_insert_with(|| Cart::new(customer.clone()));
        let line_id = cart.add_line(product_id.clone(), variant_id.cloned(), quantity)?;
        tracing::debug!(customer = %customer, product = %product_id, quantity, "cart line added");
        Ok(line_id)
    }

    /// Replace a cart line's quantity, re-checking stock.
    pub fn set_cart_quantity(
        &self,
        user: &User,
        item_id: &CartItemId,
        quantity: i64,
    ) -> Result<(), MarketError> {
        if quantity < 1 {
            return Err(CommerceError::InvalidQuantity(quantity).into());
        }
        let customer = require_verified_email(user)?.clone();
        let mut tables = self.write();
        let cart = tables
            .carts
            .get(&customer)
            .ok_or_else(|| CommerceError::CartNotFound(customer.to_string()))?;
        let line = cart
            .line(item_id)
            .ok_or_else(|| CommerceError::ItemNotInCart(item_id.to_string()))?;
        let (product_id, variant_id) = (line.product_id.clone(), line.variant_id.clone());
        check_stock(&tables, &product_id, variant_id.as_ref(), quantity)?;

        let cart = tables.carts.get_mut(&customer).expect("checked above");
        cart.set_quantity(item_id, quantity)?;
        Ok(())
    }

    /// Remove a line from the customer's cart.
    pub fn remove_from_cart(&self, user: &User, item_id: &CartItemId) -> Result<(), MarketError> {
        let customer = require_verified_email(user)?.clone();
        let mut tables = self.write();
        let cart = tables
            .carts
            .get_mut(&customer)
            .ok_or_else(|| CommerceError::CartNotFound(customer.to_string()))?;
        if !cart.remove_line(item_id) {
            return Err(CommerceError::ItemNotInCart(item_id.to_string()).into());
        }
        Ok(())
    }

    /// The cart total at live prices. An absent cart totals to zero.
    pub fn cart_total(&self, user: &User) -> Result<Money, MarketError> {
        Ok(self.cart_view(user)?.total)
    }

    /// The customer's cart priced against the live catalog.
    pub fn cart_view(&self, user: &User) -> Result<CartView, MarketError> {
        let customer = require_verified_email(user)?.clone();
        let tables = self.read();
        let currency = self.config.currency;
        let Some(cart) = tables.carts.get(&customer) else {
            return Ok(CartView {
                lines: Vec::new(),
                total: Money::zero(currency),
            });
        };

        let mut lines = Vec::with_capacity(cart.items.len());
        for item in &cart.items {
            let unit_price = tables.unit_price(&item.product_id, item.variant_id.as_ref())?;
            let subtotal = item.subtotal(unit_price)?;
            let product_name = tables
                .products
                .get(&item.product_id)
                .map(|p| p.name.clone())
                .unwrap_or_default();
            lines.push(CartLine {
                item: item.clone(),
                product_name,
                unit_price,
                subtotal,
            });
        }
        let total = Money::try_sum(lines.iter().map(|l| &l.subtotal), currency)
            .ok_or(CommerceError::Overflow)?;
        Ok(CartView { lines, total })
    }
}
