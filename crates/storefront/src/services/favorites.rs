//! Favorites service.

use tracing::debug;

use kv_market_core::{CatalogKind, FavoriteKey};

use super::report_write;
use crate::error::{Result, StorefrontError};
use crate::state::AppState;
use crate::store::{KeyValueStorage, PersistedStore, StorageKey};

/// Favorite toggling with write-through persistence.
pub struct FavoritesService<'a, S> {
    state: &'a mut AppState,
    store: &'a PersistedStore<S>,
}

impl<'a, S: KeyValueStorage> FavoritesService<'a, S> {
    #[must_use]
    pub const fn new(state: &'a mut AppState, store: &'a PersistedStore<S>) -> Self {
        Self { state, store }
    }

    /// Flip membership of `key`. Returns `true` if the key is now favorited.
    pub fn toggle(&mut self, key: FavoriteKey) -> bool {
        let now_favorited = self.state.favorites.toggle(key);
        let result = self.store.save(StorageKey::Favorites, &self.state.favorites);
        report_write(self.state, StorageKey::Favorites, result);
        now_favorited
    }

    /// Toggle the item `id` from the catalog of `kind`.
    ///
    /// # Errors
    ///
    /// Returns `StorefrontError::NotFound` when adding an item that is not in
    /// its catalog. Removing a stale favorite always succeeds.
    pub fn toggle_item(&mut self, kind: CatalogKind, id: &str) -> Result<bool> {
        let key = FavoriteKey::for_item(kind, id);
        if !self.state.favorites.contains(&key) && !self.state.contains_item(kind, id) {
            return Err(StorefrontError::NotFound {
                kind,
                id: id.to_owned(),
            });
        }
        let now_favorited = self.toggle(key);
        debug!(kind = %kind, id, favorited = now_favorited, "Toggled favorite");
        Ok(now_favorited)
    }

    #[must_use]
    pub fn is_favorited(&self, key: &FavoriteKey) -> bool {
        self.state.favorites.contains(key)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::models::Favorites;
    use crate::store::MemoryStorage;

    #[test]
    fn test_toggle_twice_restores_membership_and_persists_each_call() {
        let mut state = AppState::with_fallback_catalog();
        let store = PersistedStore::new(MemoryStorage::new());
        let mut favorites = FavoritesService::new(&mut state, &store);
        let key = FavoriteKey::for_item(CatalogKind::Market, "lst-1");

        assert!(favorites.toggle(key.clone()));
        assert!(favorites.is_favorited(&key));
        let stored: Favorites = store.load(StorageKey::Favorites);
        assert!(stored.contains(&key));

        assert!(!favorites.toggle(key.clone()));
        assert!(!favorites.is_favorited(&key));
        let stored: Favorites = store.load(StorageKey::Favorites);
        assert!(stored.is_empty());
    }

    #[test]
    fn test_toggle_item_uses_prefixed_keys() {
        let mut state = AppState::with_fallback_catalog();
        let store = PersistedStore::new(MemoryStorage::new());
        let mut favorites = FavoritesService::new(&mut state, &store);

        favorites.toggle_item(CatalogKind::Account, "acc-2").unwrap();
        favorites.toggle_item(CatalogKind::Product, "3").unwrap();

        assert!(favorites.is_favorited(&FavoriteKey::from_raw("account-acc-2")));
        assert!(favorites.is_favorited(&FavoriteKey::from_raw("3")));
    }

    #[test]
    fn test_toggle_unknown_item_is_not_found() {
        let mut state = AppState::with_fallback_catalog();
        let store = PersistedStore::new(MemoryStorage::new());

        let err = FavoritesService::new(&mut state, &store)
            .toggle_item(CatalogKind::Product, "999")
            .unwrap_err();

        assert!(matches!(err, StorefrontError::NotFound { .. }));
        assert!(state.favorites.is_empty());
    }

    #[test]
    fn test_stale_favorite_can_be_removed() {
        let mut state = AppState::new();
        state.favorites.toggle(FavoriteKey::for_item(CatalogKind::Market, "gone"));
        let store = PersistedStore::new(MemoryStorage::new());

        let now = FavoritesService::new(&mut state, &store)
            .toggle_item(CatalogKind::Market, "gone")
            .unwrap();

        assert!(!now);
        assert!(state.favorites.is_empty());
    }
}
