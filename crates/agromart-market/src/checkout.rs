//! Checkout: converting a cart into committed orders.
//!
//! The whole operation runs under one exclusive write guard, the service's
//! transaction boundary. Validation and order construction happen before
//! any mutation, so a failure anywhere aborts with the cart, stock, and
//! order tables untouched.

use crate::error::MarketError;
use crate::store::Market;
use agromart_auth::{require_verified_email, User};
use agromart_commerce::error::CommerceError;
use agromart_commerce::ids::{ProductId, StoreId, VariantId};
use agromart_commerce::money::Money;
use agromart_commerce::order::{Order, OrderItem, ShippingDetails};
use std::collections::BTreeMap;

/// A cart line resolved and priced, ready to snapshot.
struct PricedLine {
    store_id: StoreId,
    product_id: ProductId,
    variant_id: Option<VariantId>,
    product_name: String,
    product_sku: String,
    unit_price: Money,
    quantity: i64,
}

impl Market {
    /// Convert the customer's cart into one order per store, atomically.
    ///
    /// As a single unit: validates stock for every line, decrements
    /// product/variant stock, snapshots cart lines into order items,
    /// computes subtotal/tax/shipping/total per store, assigns order
    /// numbers, and clears the cart. Any failure leaves no partial state.
    pub fn checkout(
        &self,
        user: &User,
        shipping: ShippingDetails,
    ) -> Result<Vec<Order>, MarketError> {
        let customer = require_verified_email(user)?.clone();
        let currency = self.config.currency;

        let mut tables = self.write();

        let cart = tables
            .carts
            .get(&customer)
            .ok_or_else(|| CommerceError::CartNotFound(customer.to_string()))?;
        if cart.is_empty() {
            return Err(CommerceError::EmptyCart.into());
        }

        // Phase 1: resolve and validate every line before touching anything.
        let mut priced: Vec<PricedLine> = Vec::with_capacity(cart.items.len());
        for item in &cart.items {
            let product = tables
                .products
                .get(&item.product_id)
                .ok_or_else(|| CommerceError::ProductNotFound(item.product_id.to_string()))?;
            if !product.is_active {
                return Err(CommerceError::Validation(format!(
                    "product no longer available: {}",
                    product.id
                ))
                .into());
            }
            let (unit_price, sku) = match &item.variant_id {
                None => {
                    if !product.can_fulfill(item.quantity) {
                        return Err(CommerceError::InsufficientStock {
                            item: product.id.to_string(),
                            requested: item.quantity,
                            available: product.stock_quantity,
                        }
                        .into());
                    }
                    (product.price, product.sku.clone())
                }
                Some(vid) => {
                    let variant = tables
                        .variants
                        .get(vid)
                        .filter(|v| v.product_id == item.product_id)
                        .ok_or_else(|| CommerceError::VariantNotFound(vid.to_string()))?;
                    if !variant.can_fulfill(item.quantity) {
                        return Err(CommerceError::InsufficientStock {
                            item: vid.to_string(),
                            requested: item.quantity,
                            available: variant.stock_quantity,
                        }
                        .into());
                    }
                    (variant.effective_price(product), variant.sku.clone())
                }
            };
            priced.push(PricedLine {
                store_id: product.store_id.clone(),
                product_id: item.product_id.clone(),
                variant_id: item.variant_id.clone(),
                product_name: product.name.clone(),
                product_sku: sku,
                unit_price,
                quantity: item.quantity,
            });
        }

        // Phase 2: build every order. Still no mutation.
        let mut by_store: BTreeMap<StoreId, Vec<&PricedLine>> = BTreeMap::new();
        for line in &priced {
            by_store.entry(line.store_id.clone()).or_default().push(line);
        }

        let mut orders: Vec<Order> = Vec::with_capacity(by_store.len());
        for (store_id, lines) in &by_store {
            if !tables.stores.contains_key(store_id) {
                return Err(CommerceError::StoreNotFound(store_id.to_string()).into());
            }
            let mut items = Vec::with_capacity(lines.len());
            for line in lines {
                items.push(OrderItem::snapshot(
                    line.product_id.clone(),
                    line.variant_id.clone(),
                    line.product_name.clone(),
                    line.product_sku.clone(),
                    line.unit_price,
                    line.quantity,
                )?);
            }
            let subtotal = Money::try_sum(items.iter().map(|i| &i.subtotal), currency)
                .ok_or(CommerceError::Overflow)?;
            let tax = subtotal.percentage(self.config.tax_percent);
            let order = Order::place(
                customer.clone(),
                store_id.clone(),
                items,
                self.config.shipping_fee(),
                tax,
                Money::zero(currency),
                shipping.clone(),
                currency,
            )?;
            orders.push(order);
        }

        // Phase 3: commit. Nothing below can fail.
        for line in &priced {
            match &line.variant_id {
                None => {
                    let product = tables
                        .products
                        .get_mut(&line.product_id)
                        .expect("validated above");
                    product
                        .decrement_stock(line.quantity)
                        .expect("validated above");
                    product.record_sale(line.quantity);
                }
                Some(vid) => {
                    tables
                        .variants
                        .get_mut(vid)
                        .expect("validated above")
                        .decrement_stock(line.quantity)
                        .expect("validated above");
                    tables
                        .products
                        .get_mut(&line.product_id)
                        .expect("validated above")
                        .record_sale(line.quantity);
                }
            }
        }
        for order in &orders {
            tables.orders.insert(order.id.clone(), order.clone());
        }
        if let Some(cart) = tables.carts.get_mut(&customer) {
            cart.clear();
        }

        tracing::info!(
            customer = %customer,
            orders = orders.len(),
            "checkout completed"
        );
        Ok(orders)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::NewVariant;
    use agromart_commerce::ids::UserId;
    use agromart_commerce::money::Currency;
    use agromart_commerce::order::{OrderStatus, PaymentStatus};

    fn vendor() -> User {
        User::verified(UserId::new("vendor-1"), "vendor@example.com")
    }

    fn buyer() -> User {
        User::verified(UserId::new("buyer-1"), "buyer@example.com")
    }

    fn shipping() -> ShippingDetails {
        ShippingDetails {
            name: "Ada Obi".into(),
            email: "buyer@example.com".into(),
            phone: "08012345678".into(),
            address: "12 Market Road".into(),
            city: "Umuahia".into(),
            state: "Abia".into(),
            country: "Nigeria".into(),
            postal_code: "440001".into(),
        }
    }

    fn seeded_market() -> (Market, ProductId, ProductId, VariantId) {
        let market = Market::default();
        let store = market.create_store(&vendor(), "Green Farms", "green-farms").unwrap();
        let category = market.create_category("Grains", "grains", None).unwrap();
        let maize = market
            .create_product(
                &vendor(),
                &store.id,
                &category.id,
                "Yellow Maize",
                "yellow-maize",
                "MAIZE-001",
                Money::new(1000, Currency::NGN),
                10,
            )
            .unwrap();
        let beans = market
            .create_product(
                &vendor(),
                &store.id,
                &category.id,
                "Brown Beans",
                "brown-beans",
                "BEANS-001",
                Money::new(800, Currency::NGN),
                10,
            )
            .unwrap();
        let bag = market
            .add_variant(
                &vendor(),
                &beans.id,
                NewVariant {
                    name: "Half bag".into(),
                    sku: "BEANS-001-H".into(),
                    price: Some(Money::new(500, Currency::NGN)),
                    stock_quantity: 5,
                    size: Some("25kg".into()),
                    color: None,
                },
            )
            .unwrap();
        (market, maize.id, beans.id, bag.id)
    }

    #[test]
    fn test_checkout_snapshots_and_clears_cart() {
        let (market, maize, beans, bag) = seeded_market();
        market.add_to_cart(&buyer(), &maize, None, 2).unwrap();
        market.add_to_cart(&buyer(), &beans, Some(&bag), 1).unwrap();
        assert_eq!(market.cart_total(&buyer()).unwrap().minor_units, 2500);

        let orders = market.checkout(&buyer(), shipping()).unwrap();
        assert_eq!(orders.len(), 1);
        let order = &orders[0];
        assert_eq!(order.subtotal.minor_units, 2500);
        assert_eq!(order.total.minor_units, 2500);
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.payment_status, PaymentStatus::Unpaid);
        assert!(order.totals_consistent());

        // Cart is cleared.
        assert!(market.cart_view(&buyer()).unwrap().lines.is_empty());

        // Stock decremented where it was taken from.
        assert_eq!(market.product(&maize).unwrap().stock_quantity, 8);
        assert_eq!(market.product(&beans).unwrap().stock_quantity, 10);
        let view = market.product_detail(&beans).unwrap();
        assert_eq!(view.variants[0].stock_quantity, 4);
    }

    #[test]
    fn test_checkout_applies_tax_and_shipping() {
        let market = Market::new(
            crate::MarketConfig::new(Currency::NGN)
                .with_tax_percent(10.0)
                .with_shipping_flat(200),
        );
        let store = market.create_store(&vendor(), "Green Farms", "green-farms").unwrap();
        let category = market.create_category("Grains", "grains", None).unwrap();
        let maize = market
            .create_product(
                &vendor(),
                &store.id,
                &category.id,
                "Yellow Maize",
                "yellow-maize",
                "MAIZE-001",
                Money::new(1000, Currency::NGN),
                10,
            )
            .unwrap();
        market.add_to_cart(&buyer(), &maize.id, None, 2).unwrap();

        let orders = market.checkout(&buyer(), shipping()).unwrap();
        let order = &orders[0];
        assert_eq!(order.subtotal.minor_units, 2000);
        assert_eq!(order.tax.minor_units, 200);
        assert_eq!(order.shipping_cost.minor_units, 200);
        assert_eq!(order.total.minor_units, 2400);
        assert!(order.totals_consistent());
    }

    #[test]
    fn test_checkout_empty_cart_rejected() {
        let (market, _maize, _beans, _bag) = seeded_market();
        let err = market.checkout(&buyer(), shipping()).unwrap_err();
        assert!(err.is_not_found() || err.is_validation());
    }

    #[test]
    fn test_checkout_insufficient_stock_aborts_whole_cart() {
        let (market, maize, beans, _bag) = seeded_market();
        market.add_to_cart(&buyer(), &maize, None, 2).unwrap();
        market.add_to_cart(&buyer(), &beans, None, 4).unwrap();

        // Another customer takes most of the beans stock first.
        let rival = User::verified(UserId::new("buyer-2"), "rival@example.com");
        market.add_to_cart(&rival, &beans, None, 8).unwrap();
        market.checkout(&rival, shipping()).unwrap();

        let err = market.checkout(&buyer(), shipping()).unwrap_err();
        assert!(err.is_validation());

        // No partial mutation: cart intact, maize stock untouched.
        assert_eq!(market.cart_view(&buyer()).unwrap().lines.len(), 2);
        assert_eq!(market.product(&maize).unwrap().stock_quantity, 10);
        assert_eq!(market.product(&beans).unwrap().stock_quantity, 2);
    }

    #[test]
    fn test_checkout_splits_orders_per_store() {
        let (market, maize, _beans, _bag) = seeded_market();
        let other_vendor = User::verified(UserId::new("vendor-2"), "v2@example.com");
        let other_store = market
            .create_store(&other_vendor, "River Farms", "river-farms")
            .unwrap();
        let category = market.create_category("Tubers", "tubers", None).unwrap();
        let yam = market
            .create_product(
                &other_vendor,
                &other_store.id,
                &category.id,
                "Puna Yam",
                "puna-yam",
                "YAM-001",
                Money::new(700, Currency::NGN),
                10,
            )
            .unwrap();

        market.add_to_cart(&buyer(), &maize, None, 1).unwrap();
        market.add_to_cart(&buyer(), &yam.id, None, 2).unwrap();

        let mut orders = market.checkout(&buyer(), shipping()).unwrap();
        assert_eq!(orders.len(), 2);
        orders.sort_by_key(|o| o.subtotal.minor_units);
        assert_eq!(orders[0].subtotal.minor_units, 1000);
        assert_eq!(orders[1].subtotal.minor_units, 1400);
        assert_ne!(orders[0].order_number, orders[1].order_number);
    }

    #[test]
    fn test_order_items_immune_to_later_product_edits() {
        let (market, maize, _beans, _bag) = seeded_market();
        market.add_to_cart(&buyer(), &maize, None, 2).unwrap();
        let orders = market.checkout(&buyer(), shipping()).unwrap();
        let order_id = orders[0].id.clone();

        market
            .edit_product(
                &vendor(),
                &maize,
                crate::catalog::ProductPatch {
                    name: Some("Premium Maize".into()),
                    price: Some(Money::new(9999, Currency::NGN)),
                    ..Default::default()
                },
            )
            .unwrap();

        let order = market.order(&order_id).unwrap();
        assert_eq!(order.items[0].product_name, "Yellow Maize");
        assert_eq!(order.items[0].price.minor_units, 1000);
        assert_eq!(order.items[0].subtotal.minor_units, 2000);
    }
}
