//! Marketplace configuration.

use agromart_commerce::{Currency, Money};
use serde::{Deserialize, Serialize};

/// Configuration for a marketplace instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketConfig {
    /// Currency every price and total is denominated in.
    pub currency: Currency,
    /// Tax applied to each order's subtotal, as a percentage.
    pub tax_percent: f64,
    /// Flat shipping fee per order, in minor currency units.
    pub shipping_flat: i64,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            currency: Currency::NGN,
            tax_percent: 0.0,
            shipping_flat: 0,
        }
    }
}

impl MarketConfig {
    /// Create a configuration with the given currency.
    pub fn new(currency: Currency) -> Self {
        Self {
            currency,
            ..Default::default()
        }
    }

    /// Set the tax percentage.
    pub fn with_tax_percent(mut self, percent: f64) -> Self {
        self.tax_percent = percent;
        self
    }

    /// Set the flat shipping fee in minor units.
    pub fn with_shipping_flat(mut self, minor_units: i64) -> Self {
        self.shipping_flat = minor_units;
        self
    }

    /// The flat shipping fee as Money.
    pub fn shipping_fee(&self) -> Money {
        Money::new(self.shipping_flat, self.currency)
    }
}
