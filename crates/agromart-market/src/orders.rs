//! Order administration: lifecycle transitions, single and bulk.

use crate::error::MarketError;
use crate::store::Market;
use agromart_commerce::error::CommerceError;
use agromart_commerce::ids::{OrderId, StoreId, UserId};
use agromart_commerce::order::{Order, OrderStatus};

/// Result of a bulk status action over selected orders.
#[derive(Debug, Default)]
pub struct BulkOutcome {
    /// Orders whose transition applied.
    pub applied: usize,
    /// Orders whose transition was rejected, with the reason.
    pub rejected: Vec<(OrderId, String)>,
}

impl Market {
    /// Look up an order by id.
    pub fn order(&self, order_id: &OrderId) -> Result<Order, MarketError> {
        self.read()
            .orders
            .get(order_id)
            .cloned()
            .ok_or_else(|| CommerceError::OrderNotFound(order_id.to_string()).into())
    }

    /// List a customer's orders, newest first.
    pub fn customer_orders(&self, customer: &UserId) -> Vec<Order> {
        let tables = self.read();
        let mut orders: Vec<Order> = tables
            .orders
            .values()
            .filter(|o| &o.customer_id == customer)
            .cloned()
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        orders
    }

    /// List a store's orders, newest first.
    pub fn store_orders(&self, store_id: &StoreId) -> Vec<Order> {
        let tables = self.read();
        let mut orders: Vec<Order> = tables
            .orders
            .values()
            .filter(|o| &o.store_id == store_id)
            .cloned()
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        orders
    }

    fn with_order(
        &self,
        order_id: &OrderId,
        f: impl FnOnce(&mut Order) -> Result<(), CommerceError>,
    ) -> Result<Order, MarketError> {
        let mut tables = self.write();
        let order = tables
            .orders
            .get_mut(order_id)
            .ok_or_else(|| CommerceError::OrderNotFound(order_id.to_string()))?;
        f(order)?;
        Ok(order.clone())
    }

    /// Record payment received for an order.
    pub fn mark_order_paid(&self, order_id: &OrderId) -> Result<Order, MarketError> {
        self.with_order(order_id, |o| o.mark_paid())
    }

    /// Refund an order's payment.
    pub fn refund_order(&self, order_id: &OrderId) -> Result<Order, MarketError> {
        self.with_order(order_id, |o| o.refund())
    }

    /// Move an order to processing.
    pub fn mark_order_processing(&self, order_id: &OrderId) -> Result<Order, MarketError> {
        self.with_order(order_id, |o| o.transition_to(OrderStatus::Processing))
    }

    /// Move an order to shipped, stamping `shipped_at` on first entry and
    /// optionally recording the carrier tracking number.
    pub fn mark_order_shipped(
        &self,
        order_id: &OrderId,
        tracking_number: Option<String>,
    ) -> Result<Order, MarketError> {
        self.with_order(order_id, |o| {
            o.transition_to(OrderStatus::Shipped)?;
            if tracking_number.is_some() {
                o.tracking_number = tracking_number;
            }
            Ok(())
        })
    }

    /// Move an order to delivered.
    pub fn mark_order_delivered(&self, order_id: &OrderId) -> Result<Order, MarketError> {
        self.with_order(order_id, |o| o.transition_to(OrderStatus::Delivered))
    }

    /// Cancel an order still in pending or processing.
    pub fn cancel_order(&self, order_id: &OrderId) -> Result<Order, MarketError> {
        self.with_order(order_id, |o| o.cancel())
    }

    /// Apply a status transition to each selected order.
    ///
    /// Unlike a blanket update, every order goes through the state machine;
    /// rejected transitions are reported rather than applied.
    pub fn bulk_transition(&self, order_ids: &[OrderId], status: OrderStatus) -> BulkOutcome {
        let mut tables = self.write();
        let mut outcome = BulkOutcome::default();
        for order_id in order_ids {
            let Some(order) = tables.orders.get_mut(order_id) else {
                outcome
                    .rejected
                    .push((order_id.clone(), "order not found".to_string()));
                continue;
            };
            match order.transition_to(status) {
                Ok(()) => outcome.applied += 1,
                Err(err) => {
                    tracing::warn!(
                        order = %order_id,
                        status = status.as_str(),
                        %err,
                        "bulk transition rejected"
                    );
                    outcome.rejected.push((order_id.clone(), err.to_string()));
                }
            }
        }
        outcome
    }

    /// Bulk action: mark selected orders as processing.
    pub fn bulk_mark_processing(&self, order_ids: &[OrderId]) -> BulkOutcome {
        self.bulk_transition(order_ids, OrderStatus::Processing)
    }

    /// Bulk action: mark selected orders as shipped.
    pub fn bulk_mark_shipped(&self, order_ids: &[OrderId]) -> BulkOutcome {
        self.bulk_transition(order_ids, OrderStatus::Shipped)
    }

    /// Bulk action: mark selected orders as delivered.
    pub fn bulk_mark_delivered(&self, order_ids: &[OrderId]) -> BulkOutcome {
        self.bulk_transition(order_ids, OrderStatus::Delivered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agromart_auth::User;
    use agromart_commerce::money::{Currency, Money};
    use agromart_commerce::order::ShippingDetails;

    fn vendor() -> User {
        User::verified(UserId::new("vendor-1"), "vendor@example.com")
    }

    fn buyer() -> User {
        User::verified(UserId::new("buyer-1"), "buyer@example.com")
    }

    fn placed_order(market: &Market) -> OrderId {
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
        market.add_to_cart(&buyer(), &maize.id, None, 1).unwrap();
        let orders = market.checkout(&buyer(), ShippingDetails::default()).unwrap();
        orders[0].id.clone()
    }

    #[test]
    fn test_lifecycle_happy_path() {
        let market = Market::default();
        let order_id = placed_order(&market);

        market.mark_order_paid(&order_id).unwrap();
        market.mark_order_processing(&order_id).unwrap();
        let shipped = market
            .mark_order_shipped(&order_id, Some("TRK-123".into()))
            .unwrap();
        assert_eq!(shipped.tracking_number.as_deref(), Some("TRK-123"));
        let delivered = market.mark_order_delivered(&order_id).unwrap();
        assert_eq!(delivered.status, OrderStatus::Delivered);
        assert!(delivered.paid_at.is_some());
        assert!(delivered.shipped_at.is_some());
        assert!(delivered.delivered_at.is_some());
    }

    #[test]
    fn test_illegal_transition_rejected() {
        let market = Market::default();
        let order_id = placed_order(&market);

        // pending -> shipped skips processing.
        let err = market.mark_order_shipped(&order_id, None).unwrap_err();
        assert!(err.is_state());
    }

    #[test]
    fn test_cancel_then_ship_rejected() {
        let market = Market::default();
        let order_id = placed_order(&market);
        market.cancel_order(&order_id).unwrap();
        let err = market.mark_order_shipped(&order_id, None).unwrap_err();
        assert!(err.is_state());
    }

    #[test]
    fn test_bulk_applies_state_machine_per_order() {
        let market = Market::default();
        let a = placed_order(&market);
        market.mark_order_processing(&a).unwrap();

        // Second buyer so each checkout yields a distinct order.
        let other = User::verified(UserId::new("buyer-2"), "b2@example.com");
        let maize = market
            .store_by_slug("green-farms")
            .map(|s| market.list_store_products(&s.id)[0].clone())
            .unwrap();
        market.add_to_cart(&other, &maize.id, None, 1).unwrap();
        let b = market.checkout(&other, ShippingDetails::default()).unwrap()[0]
            .id
            .clone();

        // a is processing (shippable); b is still pending (not shippable).
        let outcome = market.bulk_mark_shipped(&[a.clone(), b.clone()]);
        assert_eq!(outcome.applied, 1);
        assert_eq!(outcome.rejected.len(), 1);
        assert_eq!(outcome.rejected[0].0, b);

        assert_eq!(market.order(&a).unwrap().status, OrderStatus::Shipped);
        assert_eq!(market.order(&b).unwrap().status, OrderStatus::Pending);
    }
}
