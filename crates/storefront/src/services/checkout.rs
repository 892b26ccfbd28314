//! Simulated checkout.
//!
//! No payment is processed. A valid form turns the cart into an [`Order`]
//! prepended to the persisted order log, and the cart is emptied.

use chrono::Utc;
use tracing::info;

use kv_market_core::{Email, OrderId};

use super::report_write;
use crate::error::{Result, StorefrontError};
use crate::models::{CheckoutForm, Order};
use crate::notice::Notice;
use crate::state::AppState;
use crate::store::{KeyValueStorage, PersistedStore, StorageKey};

/// Checkout against the current cart.
pub struct CheckoutService<'a, S> {
    state: &'a mut AppState,
    store: &'a PersistedStore<S>,
}

impl<'a, S: KeyValueStorage> CheckoutService<'a, S> {
    #[must_use]
    pub const fn new(state: &'a mut AppState, store: &'a PersistedStore<S>) -> Self {
        Self { state, store }
    }

    /// Validate `form` and place an order for the whole cart.
    ///
    /// All-or-nothing: on any error the cart and the order log are unchanged.
    ///
    /// # Errors
    ///
    /// Returns `StorefrontError::Validation` for an empty cart, a missing name
    /// or email, an unparseable email, or missing payment details for a method
    /// that needs them. Returns `StorefrontError::Storage` if the order log
    /// cannot be saved.
    pub fn checkout(&mut self, form: &CheckoutForm) -> Result<Order> {
        let email = validate(self.state, form)?;

        let order = Order {
            id: OrderId::generate(),
            user: self
                .state
                .user
                .as_ref()
                .map_or_else(|| form.name.trim().to_owned(), |u| u.name.clone()),
            name: form.name.trim().to_owned(),
            email: email.as_str().to_owned(),
            method: form.method,
            items: self.state.cart.entries(),
            total: self.state.cart.total(),
            created_at: Utc::now(),
        };

        let mut log = Vec::with_capacity(self.state.orders.len() + 1);
        log.push(order.clone());
        log.extend(self.state.orders.iter().cloned());
        self.store.save(StorageKey::Orders, &log)?;

        self.state.orders = log;
        self.state.cart.clear();
        let result = self.store.save(StorageKey::Cart, &self.state.cart);
        report_write(self.state, StorageKey::Cart, result);

        info!(
            order_id = %order.id,
            items = order.items.len(),
            total = %order.total,
            method = %order.method,
            "Order placed"
        );
        self.state.push_notice(Notice::success(format!(
            "Order placed! Links sent to {}",
            order.email
        )));
        Ok(order)
    }
}

fn validate(state: &AppState, form: &CheckoutForm) -> Result<Email> {
    if state.cart.is_empty() {
        return Err(StorefrontError::validation("Your cart is empty"));
    }
    if form.name.trim().is_empty() || form.email.trim().is_empty() {
        return Err(StorefrontError::validation("Enter your name and email"));
    }
    let email = Email::parse(form.email.trim())
        .map_err(|_| StorefrontError::validation("Enter a valid email address"))?;
    if form.method.requires_details() && form.payment_details.trim().is_empty() {
        return Err(StorefrontError::validation("Enter payment details"));
    }
    Ok(email)
}
