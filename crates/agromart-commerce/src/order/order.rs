//! Order types and lifecycle state machines.

use crate::current_timestamp;
use crate::error::CommerceError;
use crate::ids::{OrderId, OrderItemId, ProductId, StoreId, UserId, VariantId};
use crate::money::{Currency, Money};
use serde::{Deserialize, Serialize};

/// Order fulfillment status.
///
/// Transitions run forward along `pending -> processing -> shipped ->
/// delivered` with no skipping and no backward moves; `cancelled` is
/// reachable from `pending` and `processing` only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum OrderStatus {
    /// Order placed, awaiting processing.
    #[default]
    Pending,
    /// Order accepted and being prepared.
    Processing,
    /// Order handed to the carrier.
    Shipped,
    /// Order received by the customer.
    Delivered,
    /// Order cancelled before shipment.
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Processing => "processing",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    /// Check if the order is in a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }

    /// Check if cancellation is still allowed from this state.
    pub fn can_cancel(&self) -> bool {
        matches!(self, OrderStatus::Pending | OrderStatus::Processing)
    }

    /// Check if a transition to `next` is legal. Re-entering the current
    /// state is not a transition and is handled by the caller.
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        matches!(
            (self, next),
            (OrderStatus::Pending, OrderStatus::Processing)
                | (OrderStatus::Processing, OrderStatus::Shipped)
                | (OrderStatus::Shipped, OrderStatus::Delivered)
                | (OrderStatus::Pending, OrderStatus::Cancelled)
                | (OrderStatus::Processing, OrderStatus::Cancelled)
        )
    }
}

/// Payment status, an axis independent of fulfillment.
///
/// Monotonic: `unpaid -> paid -> refunded`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum PaymentStatus {
    #[default]
    Unpaid,
    Paid,
    Refunded,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Unpaid => "unpaid",
            PaymentStatus::Paid => "paid",
            PaymentStatus::Refunded => "refunded",
        }
    }

    /// Check if a transition to `next` is legal.
    pub fn can_transition_to(&self, next: PaymentStatus) -> bool {
        matches!(
            (self, next),
            (PaymentStatus::Unpaid, PaymentStatus::Paid)
                | (PaymentStatus::Paid, PaymentStatus::Refunded)
        )
    }
}

/// Shipping destination captured at checkout.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ShippingDetails {
    /// Recipient name.
    pub name: String,
    /// Recipient email.
    pub email: String,
    /// Recipient phone.
    pub phone: String,
    /// Street address.
    pub address: String,
    /// City.
    pub city: String,
    /// State.
    pub state: String,
    /// Country.
    pub country: String,
    /// Postal code.
    pub postal_code: String,
}

/// A committed order against a single store.
///
/// Everything except `status`, `payment_status`, `tracking_number`, and
/// the lifecycle timestamps is immutable after placement.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Order {
    /// Unique order identifier.
    pub id: OrderId,
    /// Human-readable order number (unique).
    pub order_number: String,
    /// Purchasing customer.
    pub customer_id: UserId,
    /// Selling store.
    pub store_id: StoreId,
    /// Fulfillment status.
    pub status: OrderStatus,
    /// Payment status.
    pub payment_status: PaymentStatus,
    /// Line items snapshotted at checkout.
    pub items: Vec<OrderItem>,
    /// Sum of line subtotals.
    pub subtotal: Money,
    /// Shipping charge.
    pub shipping_cost: Money,
    /// Tax charged.
    pub tax: Money,
    /// Discount applied.
    pub discount: Money,
    /// Grand total: subtotal + shipping + tax - discount.
    pub total: Money,
    /// Shipping destination snapshot.
    pub shipping: ShippingDetails,
    /// Customer note.
    pub notes: Option<String>,
    /// Carrier tracking number, set when shipped.
    pub tracking_number: Option<String>,
    /// Unix timestamp of placement.
    pub created_at: i64,
    /// Unix timestamp of last update.
    pub updated_at: i64,
    /// Stamped once, on first entry to paid.
    pub paid_at: Option<i64>,
    /// Stamped once, on first entry to shipped.
    pub shipped_at: Option<i64>,
    /// Stamped once, on first entry to delivered.
    pub delivered_at: Option<i64>,
    /// Stamped once, on cancellation.
    pub cancelled_at: Option<i64>,
}

impl Order {
    /// Place a new order from snapshotted items and charge components.
    ///
    /// Computes `subtotal` from the items and enforces the total identity
    /// `total = subtotal + shipping + tax - discount`.
    pub fn place(
        customer_id: UserId,
        store_id: StoreId,
        items: Vec<OrderItem>,
        shipping_cost: Money,
        tax: Money,
        discount: Money,
        shipping: ShippingDetails,
        currency: Currency,
    ) -> Result<Self, CommerceError> {
        let subtotal = Money::try_sum(items.iter().map(|i| &i.subtotal), currency)
            .ok_or(CommerceError::Overflow)?;
        let total = subtotal
            .try_add(&shipping_cost)
            .and_then(|t| t.try_add(&tax))
            .and_then(|t| t.try_subtract(&discount))
            .ok_or(CommerceError::Overflow)?;

        let now = current_timestamp();
        Ok(Self {
            id: OrderId::generate(),
            order_number: generate_order_number(),
            customer_id,
            store_id,
            status: OrderStatus::Pending,
            payment_status: PaymentStatus::Unpaid,
            items,
            subtotal,
            shipping_cost,
            tax,
            discount,
            total,
            shipping,
            notes: None,
            tracking_number: None,
            created_at: now,
            updated_at: now,
            paid_at: None,
            shipped_at: None,
            delivered_at: None,
            cancelled_at: None,
        })
    }

    /// Move the order to `next`.
    ///
    /// Re-entering the current state is a no-op that leaves every timestamp
    /// untouched. Illegal transitions are rejected before any side effect.
    /// On first entry to a state, the matching timestamp is stamped.
    pub fn transition_to(&mut self, next: OrderStatus) -> Result<(), CommerceError> {
        if next == self.status {
            return Ok(());
        }
        if !self.status.can_transition_to(next) {
            return Err(CommerceError::InvalidTransition {
                from: self.status.as_str().to_string(),
                to: next.as_str().to_string(),
            });
        }

        let now = current_timestamp();
        match next {
            OrderStatus::Shipped => {
                self.shipped_at.get_or_insert(now);
            }
            OrderStatus::Delivered => {
                self.delivered_at.get_or_insert(now);
            }
            OrderStatus::Cancelled => {
                self.cancelled_at.get_or_insert(now);
            }
            OrderStatus::Pending | OrderStatus::Processing => {}
        }
        self.status = next;
        self.updated_at = now;
        Ok(())
    }

    /// Cancel the order, if still cancellable.
    pub fn cancel(&mut self) -> Result<(), CommerceError> {
        self.transition_to(OrderStatus::Cancelled)
    }

    /// Move the payment axis to `next`, stamping `paid_at` once on first
    /// entry to paid. Re-entering the current state is a no-op.
    pub fn transition_payment_to(&mut self, next: PaymentStatus) -> Result<(), CommerceError> {
        if next == self.payment_status {
            return Ok(());
        }
        if !self.payment_status.can_transition_to(next) {
            return Err(CommerceError::InvalidPaymentTransition {
                from: self.payment_status.as_str().to_string(),
                to: next.as_str().to_string(),
            });
        }

        let now = current_timestamp();
        if next == PaymentStatus::Paid {
            self.paid_at.get_or_insert(now);
        }
        self.payment_status = next;
        self.updated_at = now;
        Ok(())
    }

    /// Record payment received.
    pub fn mark_paid(&mut self) -> Result<(), CommerceError> {
        self.transition_payment_to(PaymentStatus::Paid)
    }

    /// Record the payment refunded.
    pub fn refund(&mut self) -> Result<(), CommerceError> {
        self.transition_payment_to(PaymentStatus::Refunded)
    }

    /// Total unit count across line items.
    pub fn item_count(&self) -> i64 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    /// Check if payment has been received.
    pub fn is_paid(&self) -> bool {
        self.payment_status == PaymentStatus::Paid
    }

    /// Check that the stored totals satisfy the order identity.
    pub fn totals_consistent(&self) -> bool {
        let expected = self
            .subtotal
            .try_add(&self.shipping_cost)
            .and_then(|t| t.try_add(&self.tax))
            .and_then(|t| t.try_subtract(&self.discount));
        expected.as_ref() == Some(&self.total)
            && self
                .items
                .iter()
                .all(|i| i.price.try_multiply(i.quantity).as_ref() == Some(&i.subtotal))
    }
}

/// A line item frozen into an order at checkout.
///
/// Product name, sku, and price are copies taken at purchase time; they
/// must never be re-synced from the live product.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderItem {
    /// Unique line identifier.
    pub id: OrderItemId,
    /// Product that was purchased (reference for review eligibility).
    pub product_id: ProductId,
    /// Variant that was purchased, when one was selected.
    pub variant_id: Option<VariantId>,
    /// Product name at time of purchase.
    pub product_name: String,
    /// SKU at time of purchase.
    pub product_sku: String,
    /// Unit price at time of purchase.
    pub price: Money,
    /// Units purchased.
    pub quantity: i64,
    /// price * quantity.
    pub subtotal: Money,
    /// Unix timestamp of creation.
    pub created_at: i64,
}

impl OrderItem {
    /// Snapshot a purchase into an immutable line item.
    pub fn snapshot(
        product_id: ProductId,
        variant_id: Option<VariantId>,
        product_name: impl Into<String>,
        product_sku: impl Into<String>,
        price: Money,
        quantity: i64,
    ) -> Result<Self, CommerceError> {
        if quantity < 1 {
            return Err(CommerceError::InvalidQuantity(quantity));
        }
        let subtotal = price.try_multiply(quantity).ok_or(CommerceError::Overflow)?;
        Ok(Self {
            id: OrderItemId::generate(),
            product_id,
            variant_id,
            product_name: product_name.into(),
            product_sku: product_sku.into(),
            price,
            quantity,
            subtotal,
            created_at: current_timestamp(),
        })
    }
}

/// Generate a unique order number.
///
/// Epoch seconds plus a process-wide sequence so orders placed in the same
/// second stay distinct.
pub fn generate_order_number() -> String {
    use std::sync::atomic::{AtomicU64, Ordering};

    static SEQUENCE: AtomicU64 = AtomicU64::new(0);

    let seq = SEQUENCE.fetch_add(1, Ordering::SeqCst);
    format!("ORD-{}-{:04}", current_timestamp(), seq % 10000)
}
