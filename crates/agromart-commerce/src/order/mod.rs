//! Order module.
//!
//! Orders are immutable-once-placed snapshots of a cart; only status,
//! payment status, and their timestamps may change after placement.

mod order;

pub use order::{
    generate_order_number, Order, OrderItem, OrderStatus, PaymentStatus, ShippingDetails,
};
