//! Cart service.

use std::num::NonZeroU32;

use tracing::debug;

use kv_market_core::{CartKey, CatalogKind, Price};

use super::report_write;
use crate::error::{Result, StorefrontError};
use crate::models::{CartEntry, CatalogItem, QuantityChange};
use crate::state::AppState;
use crate::store::{KeyValueStorage, PersistedStore, StorageKey};

/// Cart mutations with write-through persistence.
pub struct CartService<'a, S> {
    state: &'a mut AppState,
    store: &'a PersistedStore<S>,
}

impl<'a, S: KeyValueStorage> CartService<'a, S> {
    #[must_use]
    pub const fn new(state: &'a mut AppState, store: &'a PersistedStore<S>) -> Self {
        Self { state, store }
    }

    /// Add `qty` of the item `id` from the catalog of `kind`.
    ///
    /// Returns the resulting quantity of the cart entry.
    ///
    /// # Errors
    ///
    /// Returns `StorefrontError::NotFound` if the item is not in its catalog;
    /// the cart is left unchanged.
    pub fn add(&mut self, kind: CatalogKind, id: &str, qty: NonZeroU32) -> Result<u32> {
        let (key, entry) = self.resolve(kind, id, qty)?;
        let total = self.state.cart.add(key.clone(), entry);
        debug!(key = %key, qty = total, "Added to cart");
        self.persist();
        Ok(total)
    }

    fn resolve(
        &self,
        kind: CatalogKind,
        id: &str,
        qty: NonZeroU32,
    ) -> Result<(CartKey, CartEntry)> {
        let snapshot = match kind.listing_kind() {
            None => self
                .state
                .find_product(id)
                .map(|p| (p.cart_key(), CartEntry::from_item(p, qty))),
            Some(listing_kind) => self
                .state
                .find_listing(listing_kind, id)
                .map(|l| (l.cart_key(), CartEntry::from_item(l, qty))),
        };
        snapshot.ok_or_else(|| StorefrontError::NotFound {
            kind,
            id: id.to_owned(),
        })
    }

    /// Remove the entry under `key`. Returns whether an entry was removed.
    pub fn remove(&mut self, key: &CartKey) -> bool {
        let removed = self.state.cart.remove(key).is_some();
        self.persist();
        removed
    }

    /// Add `delta` to the quantity under `key`; a result of zero or below
    /// removes the entry.
    pub fn change_quantity(&mut self, key: &CartKey, delta: i64) -> QuantityChange {
        let change = self.state.cart.change_quantity(key, delta);
        if change != QuantityChange::Missing {
            self.persist();
        }
        change
    }

    /// Empty the cart.
    pub fn clear(&mut self) {
        self.state.cart.clear();
        self.persist();
    }

    /// Sum of `price × qty` over the cart.
    #[must_use]
    pub fn total(&self) -> Price {
        self.state.cart.total()
    }

    fn persist(&mut self) {
        let result = self.store.save(StorageKey::Cart, &self.state.cart);
        report_write(self.state, StorageKey::Cart, result);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::models::Cart;
    use crate::store::MemoryStorage;
    use crate::store::testing::ReadOnlyStorage;

    fn qty(n: u32) -> NonZeroU32 {
        NonZeroU32::new(n).unwrap()
    }

    #[test]
    fn test_adding_market_listing_twice_merges_under_prefixed_key() {
        let mut state = AppState::with_fallback_catalog();
        let store = PersistedStore::new(MemoryStorage::new());
        let mut cart = CartService::new(&mut state, &store);

        cart.add(CatalogKind::Market, "lst-1", qty(2)).unwrap();
        let total = cart.add(CatalogKind::Market, "lst-1", qty(1)).unwrap();

        assert_eq!(total, 3);
        let entry = state.cart.get(&CartKey::from_raw("listing-lst-1")).unwrap();
        assert_eq!(entry.qty(), 3);
        assert_eq!(entry.id, "lst-1");
    }

    #[test]
    fn test_unknown_item_is_not_found_and_cart_unchanged() {
        let mut state = AppState::with_fallback_catalog();
        let store = PersistedStore::new(MemoryStorage::new());

        let err = CartService::new(&mut state, &store)
            .add(CatalogKind::Account, "missing", qty(1))
            .unwrap_err();

        assert!(matches!(err, StorefrontError::NotFound { kind: CatalogKind::Account, .. }));
        assert!(state.cart.is_empty());
        assert!(store.load_raw(StorageKey::Cart).is_none());
    }

    #[test]
    fn test_every_mutation_writes_through() {
        let mut state = AppState::with_fallback_catalog();
        let store = PersistedStore::new(MemoryStorage::new());
        let mut cart = CartService::new(&mut state, &store);

        cart.add(CatalogKind::Product, "1", qty(2)).unwrap();
        cart.add(CatalogKind::Account, "acc-1", qty(1)).unwrap();
        let stored: Cart = store.load(StorageKey::Cart);
        assert_eq!(stored.len(), 2);

        cart.change_quantity(&CartKey::from_raw("1"), -2);
        let stored: Cart = store.load(StorageKey::Cart);
        assert_eq!(stored.len(), 1);

        cart.clear();
        let stored: Cart = store.load(StorageKey::Cart);
        assert!(stored.is_empty());
    }

    #[test]
    fn test_total_matches_entries() {
        let mut state = AppState::with_fallback_catalog();
        let store = PersistedStore::new(MemoryStorage::new());
        let mut cart = CartService::new(&mut state, &store);

        assert_eq!(cart.total(), Price::ZERO);
        cart.add(CatalogKind::Product, "1", qty(2)).unwrap();
        cart.add(CatalogKind::Market, "lst-2", qty(1)).unwrap();

        assert_eq!(cart.total(), Price::from_rubles(499 * 2 + 349));
    }

    #[test]
    fn test_remove_missing_key_is_noop() {
        let mut state = AppState::with_fallback_catalog();
        let store = PersistedStore::new(MemoryStorage::new());

        assert!(!CartService::new(&mut state, &store).remove(&CartKey::from_raw("zzz")));
        assert!(state.cart.is_empty());
    }

    #[test]
    fn test_storage_failure_keeps_memory_state_and_warns() {
        let mut state = AppState::with_fallback_catalog();
        let store = PersistedStore::new(ReadOnlyStorage);

        CartService::new(&mut state, &store)
            .add(CatalogKind::Product, "2", qty(1))
            .unwrap();

        assert_eq!(state.cart.len(), 1);
        assert_eq!(state.notices().len(), 1);
    }
}
