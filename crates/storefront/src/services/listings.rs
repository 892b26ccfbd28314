//! Publishing market and author listings.

use tracing::{info, warn};

use kv_market_core::ListingKind;

use super::report_write;
use crate::catalog::{Catalog, ListingDraft};
use crate::error::{Result, StorefrontError};
use crate::models::Listing;
use crate::notice::Notice;
use crate::state::{AppState, Feed};
use crate::store::{KeyValueStorage, PersistedStore, StorageKey};

/// Storage key mirroring the catalog of `kind`.
#[must_use]
pub const fn snapshot_key(kind: ListingKind) -> StorageKey {
    match kind {
        ListingKind::Market => StorageKey::MarketListings,
        ListingKind::Account => StorageKey::AccountListings,
    }
}

/// Listing publication for the signed-in user.
pub struct ListingService<'a, C, S> {
    state: &'a mut AppState,
    store: &'a PersistedStore<S>,
    catalog: &'a C,
}

impl<'a, C: Catalog, S: KeyValueStorage> ListingService<'a, C, S> {
    #[must_use]
    pub const fn new(
        state: &'a mut AppState,
        store: &'a PersistedStore<S>,
        catalog: &'a C,
    ) -> Self {
        Self {
            state,
            store,
            catalog,
        }
    }

    /// Publish `draft` to the catalog of `kind` and prepend the created listing.
    ///
    /// # Errors
    ///
    /// Returns `StorefrontError::Unauthorized` for guests,
    /// `StorefrontError::Validation` for a blank title or topic, and
    /// `StorefrontError::Fetch` if the API rejects the listing. State is
    /// unchanged on error.
    pub async fn publish(&mut self, kind: ListingKind, draft: &ListingDraft) -> Result<Listing> {
        let Some(owner) = self.state.user.clone() else {
            return Err(StorefrontError::Unauthorized(
                "Sign in to publish a listing".to_string(),
            ));
        };
        if draft.title.trim().is_empty() {
            return Err(StorefrontError::validation("Enter a listing title"));
        }
        if draft.topic.trim().is_empty() {
            return Err(StorefrontError::validation("Choose a game topic"));
        }

        let listing = self
            .catalog
            .create_listing(kind, draft, &owner)
            .await
            .inspect_err(|e| warn!(kind = %kind, error = %e, "Failed to publish listing"))?;

        self.state.invalidate(Feed::listings(kind));
        self.state.listings_mut(kind).insert(0, listing.clone());
        let key = snapshot_key(kind);
        let result = self.store.save(key, self.state.listings(kind));
        report_write(self.state, key, result);

        info!(kind = %kind, id = %listing.id, "Listing published");
        self.state.push_notice(Notice::success("Listing published!"));
        Ok(listing)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use kv_market_core::Price;

    use super::*;
    use crate::catalog::FetchError;
    use crate::catalog::testing::FakeCatalog;
    use crate::models::User;
    use crate::store::MemoryStorage;

    fn draft(title: &str, topic: &str) -> ListingDraft {
        ListingDraft {
            title: title.to_string(),
            topic: topic.to_string(),
            price: Price::from_rubles(150),
            image_url: None,
            description: Some("Region free".to_string()),
        }
    }

    fn signed_in() -> AppState {
        let mut state = AppState::with_fallback_catalog();
        state.user = Some(User {
            id: None,
            name: "Seller".to_string(),
            email: None,
        });
        state
    }

    #[tokio::test]
    async fn test_publish_prepends_and_persists() {
        let mut state = signed_in();
        let store = PersistedStore::new(MemoryStorage::new());
        let catalog = FakeCatalog::online();

        let listing = ListingService::new(&mut state, &store, &catalog)
            .publish(ListingKind::Account, &draft("Hades key", "roguelike"))
            .await
            .unwrap();

        assert_eq!(state.account_listings[0], listing);
        assert_eq!(state.account_listings.len(), 3);
        assert_eq!(catalog.calls(), vec!["create:account"]);
        let stored: Vec<Listing> = store.load(StorageKey::AccountListings);
        assert_eq!(stored.len(), 3);
    }

    #[tokio::test]
    async fn test_publish_discards_in_flight_refresh() {
        let mut state = signed_in();
        let store = PersistedStore::new(MemoryStorage::new());
        let catalog = FakeCatalog::online();
        let in_flight = state.issue_ticket(Feed::MarketListings);

        ListingService::new(&mut state, &store, &catalog)
            .publish(ListingKind::Market, &draft("Hades key", "roguelike"))
            .await
            .unwrap();

        assert!(!state.accept(in_flight));
    }

    #[tokio::test]
    async fn test_guest_cannot_publish() {
        let mut state = AppState::with_fallback_catalog();
        let store = PersistedStore::new(MemoryStorage::new());
        let catalog = FakeCatalog::online();

        let err = ListingService::new(&mut state, &store, &catalog)
            .publish(ListingKind::Market, &draft("Hades key", "roguelike"))
            .await
            .unwrap_err();

        assert!(matches!(err, StorefrontError::Unauthorized(_)));
        assert!(catalog.calls().is_empty());
    }

    #[tokio::test]
    async fn test_blank_fields_are_rejected_before_the_request() {
        let mut state = signed_in();
        let store = PersistedStore::new(MemoryStorage::new());
        let catalog = FakeCatalog::online();

        for bad in [draft(" ", "rpg"), draft("Hades key", "")] {
            let err = ListingService::new(&mut state, &store, &catalog)
                .publish(ListingKind::Market, &bad)
                .await
                .unwrap_err();
            assert!(matches!(err, StorefrontError::Validation(_)));
        }
        assert!(catalog.calls().is_empty());
        assert_eq!(state.market_listings.len(), 2);
    }

    #[tokio::test]
    async fn test_api_failure_leaves_catalog_unchanged() {
        let mut state = signed_in();
        let store = PersistedStore::new(MemoryStorage::new());
        let catalog = FakeCatalog {
            write_error: Some(FetchError::Http { status: 500 }),
            ..FakeCatalog::online()
        };

        let err = ListingService::new(&mut state, &store, &catalog)
            .publish(ListingKind::Market, &draft("Hades key", "roguelike"))
            .await
            .unwrap_err();

        assert!(matches!(err, StorefrontError::Fetch(FetchError::Http { status: 500 })));
        assert_eq!(state.market_listings.len(), 2);
        assert!(store.load_raw(StorageKey::MarketListings).is_none());
    }
}
