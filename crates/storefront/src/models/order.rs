//! Orders created by the simulated checkout.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use kv_market_core::{OrderId, PaymentMethod, Price};

use super::cart::CartEntry;

/// A placed order. Orders are never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    /// Signed-in user name, or the checkout name for guests.
    pub user: String,
    pub name: String,
    pub email: String,
    pub method: PaymentMethod,
    pub items: Vec<CartEntry>,
    pub total: Price,
    pub created_at: DateTime<Utc>,
}

/// Input collected by the checkout form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CheckoutForm {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub method: PaymentMethod,
    /// Card number or wallet account; ignored for cash on delivery.
    #[serde(default)]
    pub payment_details: String,
}
