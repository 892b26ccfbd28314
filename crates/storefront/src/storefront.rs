//! The storefront session.
//!
//! [`Storefront`] owns the [`AppState`], the persisted store and the catalog.
//! Every operation takes `&mut self`; fetches run concurrently but results are
//! applied one at a time, guarded by per-feed generations.

use std::num::NonZeroU32;

use secrecy::SecretString;
use tracing::{debug, info, warn};

use kv_market_core::{CartKey, CatalogKind, FavoriteKey, ListingKind, Price};

use crate::catalog::{
    Catalog, FetchError, FetchResultExt, ListingDraft, Loaded, ProductQuery, fallback,
};
use crate::error::{Result, StorefrontError};
use crate::filter::{CategoryFilter, SortKey};
use crate::models::{
    Cart, ChatMessage, CheckoutForm, Favorites, Listing, Order, Product, QuantityChange, Review,
    User,
};
use crate::notice::Notice;
use crate::services::listings::snapshot_key;
use crate::services::{
    AuthService, CartService, ChatService, CheckoutService, FavoritesService, ListingService,
};
use crate::state::{AppState, Feed, FetchTicket};
use crate::store::{KeyValueStorage, PersistedStore, StorageKey};

/// A shopper's session: state, persistence and the remote catalog.
pub struct Storefront<C, S> {
    state: AppState,
    store: PersistedStore<S>,
    catalog: C,
    product_query: ProductQuery,
    check_availability: bool,
}

impl<C: Catalog, S: KeyValueStorage> Storefront<C, S> {
    /// Create a session and hydrate it from `storage`.
    ///
    /// Cart, favorites, user, orders and chat history are restored. Catalog
    /// snapshots saved by earlier sessions are shown until the first fetch.
    pub fn new(catalog: C, storage: S) -> Self {
        let store = PersistedStore::new(storage);
        let mut state = AppState::new();

        state.cart = store.load::<Cart>(StorageKey::Cart);
        state.favorites = store.load::<Favorites>(StorageKey::Favorites);
        state.user = store.load_optional::<User>(StorageKey::User);
        state.orders = store.load::<Vec<Order>>(StorageKey::Orders);
        state.chat = store.load::<Vec<ChatMessage>>(StorageKey::ChatHistory);
        state.products = store.load::<Vec<Product>>(StorageKey::ProductSnapshot);
        for kind in ListingKind::ALL {
            *state.listings_mut(kind) = store.load::<Vec<Listing>>(snapshot_key(kind));
        }

        if let Some(token) = store.load_raw(StorageKey::AccessToken) {
            catalog.set_bearer_token(Some(SecretString::from(token)));
        }

        info!(
            cart_entries = state.cart.len(),
            favorites = state.favorites.len(),
            signed_in = state.user.is_some(),
            orders = state.orders.len(),
            "Session restored"
        );

        Self {
            state,
            store,
            catalog,
            product_query: ProductQuery::default(),
            check_availability: true,
        }
    }

    /// Query used for product fetches.
    #[must_use]
    pub fn with_product_query(mut self, query: ProductQuery) -> Self {
        self.product_query = query;
        self
    }

    /// Whether [`bootstrap`](Self::bootstrap) checks API availability first.
    /// Without the check the API is assumed reachable.
    #[must_use]
    pub const fn with_availability_check(mut self, check: bool) -> Self {
        self.check_availability = check;
        self
    }

    // =========================================================================
    // Loading
    // =========================================================================

    /// Check the API and load every catalog.
    ///
    /// When the check fails, remote calls are skipped and the built-in data is
    /// used for the whole session.
    pub async fn bootstrap(&mut self) {
        let available = !self.check_availability || self.catalog.check_availability().await;
        self.state.api_available = available;

        if available {
            info!("Catalog API available");
            self.refresh_all().await;
        } else {
            warn!("Catalog API unavailable, using built-in catalog");
            for feed in Feed::ALL {
                let ticket = self.state.issue_ticket(feed);
                self.apply_builtin(ticket);
            }
            self.state.push_notice(Notice::warning(
                "The server is unavailable; showing the demo catalog",
            ));
        }
    }

    /// Reload every catalog concurrently.
    pub async fn refresh_all(&mut self) {
        if !self.state.api_available {
            debug!("Skipping refresh, API unavailable");
            return;
        }
        let tickets = Feed::ALL.map(|feed| self.state.issue_ticket(feed));
        let [products_ticket, market_ticket, account_ticket, reviews_ticket] = tickets;

        let (products, market, account, reviews) = tokio::join!(
            self.catalog.fetch_products(&self.product_query),
            self.catalog.fetch_listings(ListingKind::Market),
            self.catalog.fetch_listings(ListingKind::Account),
            self.catalog.fetch_reviews(),
        );

        self.apply_products(products_ticket, products);
        self.apply_listings(market_ticket, ListingKind::Market, market);
        self.apply_listings(account_ticket, ListingKind::Account, account);
        self.apply_reviews(reviews_ticket, reviews);
    }

    /// Reload a single catalog.
    pub async fn refresh(&mut self, feed: Feed) {
        if !self.state.api_available {
            debug!(feed = feed.as_str(), "Skipping refresh, API unavailable");
            return;
        }
        let ticket = self.state.issue_ticket(feed);
        match feed {
            Feed::Products => {
                let result = self.catalog.fetch_products(&self.product_query).await;
                self.apply_products(ticket, result);
            }
            Feed::MarketListings => {
                let result = self.catalog.fetch_listings(ListingKind::Market).await;
                self.apply_listings(ticket, ListingKind::Market, result);
            }
            Feed::AccountListings => {
                let result = self.catalog.fetch_listings(ListingKind::Account).await;
                self.apply_listings(ticket, ListingKind::Account, result);
            }
            Feed::Reviews => {
                let result = self.catalog.fetch_reviews().await;
                self.apply_reviews(ticket, result);
            }
        }
    }

    fn apply_builtin(&mut self, ticket: FetchTicket) {
        match ticket.feed {
            Feed::Products => {
                self.apply_loaded(ticket, Loaded::fallback(fallback::products(), None));
            }
            Feed::MarketListings => self.apply_loaded(
                ticket,
                Loaded::fallback(fallback::listings(ListingKind::Market), None),
            ),
            Feed::AccountListings => self.apply_loaded(
                ticket,
                Loaded::fallback(fallback::listings(ListingKind::Account), None),
            ),
            Feed::Reviews => {
                self.apply_loaded(ticket, Loaded::fallback(fallback::reviews(), None));
            }
        }
    }

    fn apply_products(
        &mut self,
        ticket: FetchTicket,
        result: std::result::Result<Vec<Product>, FetchError>,
    ) {
        let loaded = result.or_fallback(fallback::products);
        self.apply_loaded(ticket, loaded);
    }

    fn apply_listings(
        &mut self,
        ticket: FetchTicket,
        kind: ListingKind,
        result: std::result::Result<Vec<Listing>, FetchError>,
    ) {
        let loaded = result.or_fallback(|| fallback::listings(kind));
        self.apply_loaded(ticket, loaded);
    }

    fn apply_reviews(
        &mut self,
        ticket: FetchTicket,
        result: std::result::Result<Vec<Review>, FetchError>,
    ) {
        let loaded = result.or_fallback(fallback::reviews);
        self.apply_loaded(ticket, loaded);
    }

    fn apply_loaded<T: FeedData>(&mut self, ticket: FetchTicket, loaded: Loaded<T>) {
        let feed = ticket.feed;
        if !self.state.accept(ticket) {
            debug!(
                feed = feed.as_str(),
                generation = ticket.generation,
                "Discarding stale fetch result"
            );
            return;
        }

        if let Some(error) = &loaded.error {
            warn!(feed = feed.as_str(), error = %error, "Fetch failed, using built-in data");
            self.state.push_notice(Notice::warning(format!(
                "Could not load {}; showing saved examples",
                feed.as_str()
            )));
        }

        let count = loaded.data.count();
        if !loaded.is_fallback()
            && let Some(key) = T::snapshot_key(feed)
            && let Err(e) = self.store.save(key, &loaded.data)
        {
            warn!(key = %key, error = %e, "Failed to save catalog snapshot");
        }
        loaded.data.install(&mut self.state, feed);
        info!(
            feed = feed.as_str(),
            count,
            source = ?loaded.source,
            "Catalog loaded"
        );
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    #[must_use]
    pub const fn state(&self) -> &AppState {
        &self.state
    }

    #[must_use]
    pub const fn store(&self) -> &PersistedStore<S> {
        &self.store
    }

    #[must_use]
    pub const fn catalog(&self) -> &C {
        &self.catalog
    }

    /// Take every pending notice.
    pub fn drain_notices(&mut self) -> Vec<Notice> {
        self.state.drain_notices()
    }

    /// Record `error` as a notice for the shopper.
    pub fn report(&mut self, error: &StorefrontError) {
        debug!(error = %error, "Action failed");
        self.state.push_notice(error.notice());
    }

    // =========================================================================
    // Filtering
    // =========================================================================

    pub fn set_category(&mut self, category: &str) {
        self.state.filter.category = CategoryFilter::from(category);
    }

    pub fn set_query(&mut self, query: &str) {
        query.clone_into(&mut self.state.filter.query);
    }

    pub const fn set_sort(&mut self, sort: SortKey) {
        self.state.filter.sort = sort;
    }

    // =========================================================================
    // Cart and favorites
    // =========================================================================

    /// # Errors
    ///
    /// Returns `StorefrontError::NotFound` if the item is not in its catalog.
    pub fn add_to_cart(&mut self, kind: CatalogKind, id: &str, qty: NonZeroU32) -> Result<u32> {
        CartService::new(&mut self.state, &self.store).add(kind, id, qty)
    }

    pub fn remove_from_cart(&mut self, key: &CartKey) -> bool {
        CartService::new(&mut self.state, &self.store).remove(key)
    }

    pub fn change_quantity(&mut self, key: &CartKey, delta: i64) -> QuantityChange {
        CartService::new(&mut self.state, &self.store).change_quantity(key, delta)
    }

    pub fn clear_cart(&mut self) {
        CartService::new(&mut self.state, &self.store).clear();
    }

    #[must_use]
    pub fn cart_total(&self) -> Price {
        self.state.cart.total()
    }

    pub fn toggle_favorite(&mut self, key: FavoriteKey) -> bool {
        FavoritesService::new(&mut self.state, &self.store).toggle(key)
    }

    /// # Errors
    ///
    /// Returns `StorefrontError::NotFound` when favoriting an unknown item.
    pub fn toggle_favorite_item(&mut self, kind: CatalogKind, id: &str) -> Result<bool> {
        FavoritesService::new(&mut self.state, &self.store).toggle_item(kind, id)
    }

    #[must_use]
    pub fn is_favorited(&self, key: &FavoriteKey) -> bool {
        self.state.favorites.contains(key)
    }

    // =========================================================================
    // Checkout, chat and listings
    // =========================================================================

    /// # Errors
    ///
    /// See [`CheckoutService::checkout`].
    pub fn checkout(&mut self, form: &CheckoutForm) -> Result<Order> {
        CheckoutService::new(&mut self.state, &self.store).checkout(form)
    }

    /// # Errors
    ///
    /// Returns `StorefrontError::Validation` for a blank message.
    pub fn send_chat(&mut self, text: &str) -> Result<()> {
        ChatService::new(&mut self.state, &self.store).send(text)
    }

    /// # Errors
    ///
    /// See [`ListingService::publish`].
    pub async fn publish_listing(
        &mut self,
        kind: ListingKind,
        draft: &ListingDraft,
    ) -> Result<Listing> {
        ListingService::new(&mut self.state, &self.store, &self.catalog)
            .publish(kind, draft)
            .await
    }

    // =========================================================================
    // Account
    // =========================================================================

    /// # Errors
    ///
    /// See [`AuthService::register`].
    pub async fn register(
        &mut self,
        name: &str,
        email: &str,
        password: SecretString,
    ) -> Result<User> {
        let user = AuthService::new(&mut self.state, &self.store, &self.catalog)
            .register(name, email, password)
            .await?;
        Ok(user)
    }

    /// # Errors
    ///
    /// See [`AuthService::sign_in`].
    pub async fn sign_in(&mut self, email: &str, password: &SecretString) -> Result<User> {
        let user = AuthService::new(&mut self.state, &self.store, &self.catalog)
            .sign_in(email, password)
            .await?;
        Ok(user)
    }

    pub fn sign_out(&mut self) {
        AuthService::new(&mut self.state, &self.store, &self.catalog).sign_out();
    }
}

/// A catalog list that can be installed into [`AppState`].
trait FeedData: serde::Serialize {
    fn count(&self) -> usize;
    fn install(self, state: &mut AppState, feed: Feed);

    /// Storage key mirroring successful fetches, if the feed is mirrored.
    fn snapshot_key(feed: Feed) -> Option<StorageKey>;
}

impl FeedData for Vec<Product> {
    fn count(&self) -> usize {
        self.len()
    }

    fn install(self, state: &mut AppState, _feed: Feed) {
        state.products = self;
    }

    fn snapshot_key(_feed: Feed) -> Option<StorageKey> {
        Some(StorageKey::ProductSnapshot)
    }
}

impl FeedData for Vec<Listing> {
    fn count(&self) -> usize {
        self.len()
    }

    fn install(self, state: &mut AppState, feed: Feed) {
        match feed {
            Feed::AccountListings => state.account_listings = self,
            _ => state.market_listings = self,
        }
    }

    fn snapshot_key(feed: Feed) -> Option<StorageKey> {
        match feed {
            Feed::MarketListings => Some(snapshot_key(ListingKind::Market)),
            Feed::AccountListings => Some(snapshot_key(ListingKind::Account)),
            Feed::Products | Feed::Reviews => None,
        }
    }
}

impl FeedData for Vec<Review> {
    fn count(&self) -> usize {
        self.len()
    }

    fn install(self, state: &mut AppState, _feed: Feed) {
        state.reviews = self;
    }

    fn snapshot_key(_feed: Feed) -> Option<StorageKey> {
        None
    }
}
