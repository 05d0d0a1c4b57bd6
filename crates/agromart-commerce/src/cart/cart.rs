//! Cart and cart item types.
//!
//! Cart lines reference the live catalog and deliberately carry no price:
//! totals are always computed against current product/variant prices, and
//! prices are only frozen into order items at checkout.

use crate::current_timestamp;
use crate::error::CommerceError;
use crate::ids::{CartId, CartItemId, ProductId, UserId, VariantId};
use crate::money::Money;
use serde::{Deserialize, Serialize};

/// A customer's shopping cart. One cart per customer, created lazily on
/// first add and persisted across sessions until checkout clears it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Cart {
    /// Unique cart identifier.
    pub id: CartId,
    /// Owning customer.
    pub customer_id: UserId,
    /// Lines in the cart.
    pub items: Vec<CartItem>,
    /// Unix timestamp of creation.
    pub created_at: i64,
    /// Unix timestamp of last update.
    pub updated_at: i64,
}

impl Cart {
    /// Create an empty cart for a customer.
    pub fn new(customer_id: UserId) -> Self {
        let now = current_timestamp();
        Self {
            id: CartId::generate(),
            customer_id,
            items: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Add a line, or increment the existing line for the same
    /// (product, variant) pair. Returns the line's id.
    ///
    /// Stock sufficiency is the caller's responsibility; this only enforces
    /// quantity validity and line uniqueness.
    pub fn add_line(
        &mut self,
        product_id: ProductId,
        variant_id: Option<VariantId>,
        quantity: i64,
    ) -> Result<CartItemId, CommerceError> {
        if quantity < 1 {
            return Err(CommerceError::InvalidQuantity(quantity));
        }

        if let Some(existing) = self
            .items
            .iter_mut()
            .find(|i| i.product_id == product_id && i.variant_id == variant_id)
        {
            existing.quantity = existing
                .quantity
                .checked_add(quantity)
                .ok_or(CommerceError::Overflow)?;
            self.updated_at = current_timestamp();
            return Ok(existing.id.clone());
        }

        let item = CartItem::new(product_id, variant_id, quantity);
        let id = item.id.clone();
        self.items.push(item);
        self.updated_at = current_timestamp();
        Ok(id)
    }

    /// Replace a line's quantity.
    pub fn set_quantity(
        &mut self,
        item_id: &CartItemId,
        quantity: i64,
    ) -> Result<(), CommerceError> {
        if quantity < 1 {
            return Err(CommerceError::InvalidQuantity(quantity));
        }
        let item = self
            .items
            .iter_mut()
            .find(|i| &i.id == item_id)
            .ok_or_else(|| CommerceError::ItemNotInCart(item_id.to_string()))?;
        item.quantity = quantity;
        self.updated_at = current_timestamp();
        Ok(())
    }

    /// Remove a line. Returns true if a line was removed.
    pub fn remove_line(&mut self, item_id: &CartItemId) -> bool {
        let len_before = self.items.len();
        self.items.retain(|i| &i.id != item_id);
        let removed = self.items.len() < len_before;
        if removed {
            self.updated_at = current_timestamp();
        }
        removed
    }

    /// Remove every line (checkout).
    pub fn clear(&mut self) {
        self.items.clear();
        self.updated_at = current_timestamp();
    }

    /// Get a line by id.
    pub fn line(&self, item_id: &CartItemId) -> Option<&CartItem> {
        self.items.iter().find(|i| &i.id == item_id)
    }

    /// Get the line for a (product, variant) pair.
    pub fn line_for(
        &self,
        product_id: &ProductId,
        variant_id: Option<&VariantId>,
    ) -> Option<&CartItem> {
        self.items
            .iter()
            .find(|i| &i.product_id == product_id && i.variant_id.as_ref() == variant_id)
    }

    /// Total unit count (sum of quantities).
    pub fn item_count(&self) -> i64 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    /// Number of distinct lines.
    pub fn unique_item_count(&self) -> usize {
        self.items.len()
    }

    /// Check if the cart has no lines.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// A line in a cart: a product (optionally a specific variant) and a
/// quantity. (cart, product, variant) is unique.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CartItem {
    /// Unique line identifier.
    pub id: CartItemId,
    /// Referenced product.
    pub product_id: ProductId,
    /// Referenced variant, when the customer picked one.
    pub variant_id: Option<VariantId>,
    /// Units requested.
    pub quantity: i64,
    /// Unix timestamp the line was added.
    pub added_at: i64,
}

impl CartItem {
    fn new(product_id: ProductId, variant_id: Option<VariantId>, quantity: i64) -> Self {
        Self {
            id: CartItemId::generate(),
            product_id,
            variant_id,
            quantity,
            added_at: current_timestamp(),
        }
    }

    /// Line subtotal at the given live unit price.
    pub fn subtotal(&self, unit_price: Money) -> Result<Money, CommerceError> {
        unit_price
            .try_multiply(self.quantity)
            .ok_or(CommerceError::Overflow)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Currency;

    #[test]
    fn test_cart_starts_empty() {
        let cart = Cart::new(UserId::new("u1"));
        assert!(cart.is_empty());
        assert_eq!(cart.item_count(), 0);
    }

    #[test]
    fn test_add_line() {
        let mut cart = Cart::new(UserId::new("u1"));
        cart.add_line(ProductId::new("p1"), None, 2).unwrap();
        assert_eq!(cart.item_count(), 2);
        assert_eq!(cart.unique_item_count(), 1);
    }

    #[test]
    fn test_same_product_variant_increments() {
        let mut cart = Cart::new(UserId::new("u1"));
        cart.add_line(ProductId::new("p1"), None, 1).unwrap();
        cart.add_line(ProductId::new("p1"), None, 2).unwrap();
        assert_eq!(cart.unique_item_count(), 1);
        assert_eq!(cart.item_count(), 3);
    }

    #[test]
    fn test_distinct_variants_get_distinct_lines() {
        let mut cart = Cart::new(UserId::new("u1"));
        cart.add_line(ProductId::new("p1"), None, 1).unwrap();
        cart.add_line(ProductId::new("p1"), Some(VariantId::new("v1")), 1)
            .unwrap();
        assert_eq!(cart.unique_item_count(), 2);
    }

    #[test]
    fn test_invalid_quantity_rejected() {
        let mut cart = Cart::new(UserId::new("u1"));
        assert!(cart.add_line(ProductId::new("p1"), None, 0).is_err());
    }

    #[test]
    fn test_set_quantity() {
        let mut cart = Cart::new(UserId::new("u1"));
        let line = cart.add_line(ProductId::new("p1"), None, 1).unwrap();
        cart.set_quantity(&line, 5).unwrap();
        assert_eq!(cart.item_count(), 5);
    }

    #[test]
    fn test_remove_line() {
        let mut cart = Cart::new(UserId::new("u1"));
        let line = cart.add_line(ProductId::new("p1"), None, 1).unwrap();
        assert!(cart.remove_line(&line));
        assert!(cart.is_empty());
        assert!(!cart.remove_line(&line));
    }

    #[test]
    fn test_item_subtotal() {
        let mut cart = Cart::new(UserId::new("u1"));
        let line = cart.add_line(ProductId::new("p1"), None, 2).unwrap();
        let item = cart.line(&line).unwrap();
        let subtotal = item.subtotal(Money::new(1000, Currency::NGN)).unwrap();
        assert_eq!(subtotal.minor_units, 2000);
    }
}
