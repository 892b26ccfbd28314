//! Application state.
//!
//! `AppState` is the single source of truth for rendering. It is owned by one
//! [`Storefront`](crate::Storefront) and mutated through `&mut` only.

use kv_market_core::{CatalogKind, ListingKind};

use crate::filter::ProductFilter;
use crate::models::{Cart, ChatMessage, Favorites, Listing, Order, Product, Review, User};
use crate::notice::Notice;

/// A catalog list refreshed from the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feed {
    Products,
    MarketListings,
    AccountListings,
    Reviews,
}

impl Feed {
    pub const ALL: [Self; 4] = [
        Self::Products,
        Self::MarketListings,
        Self::AccountListings,
        Self::Reviews,
    ];

    #[must_use]
    pub const fn listings(kind: ListingKind) -> Self {
        match kind {
            ListingKind::Market => Self::MarketListings,
            ListingKind::Account => Self::AccountListings,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Products => "products",
            Self::MarketListings => "market listings",
            Self::AccountListings => "author listings",
            Self::Reviews => "reviews",
        }
    }
}

/// Generation stamp handed out when a fetch starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    pub feed: Feed,
    pub generation: u64,
}

/// Request generations of one feed.
#[derive(Debug, Clone, Copy, Default)]
struct Generation {
    issued: u64,
    applied: u64,
}

/// Per-feed request generations.
///
/// A result is applied only if its generation is newer than the last one
/// applied to the same feed.
#[derive(Debug, Clone, Default)]
struct Generations {
    products: Generation,
    market_listings: Generation,
    account_listings: Generation,
    reviews: Generation,
}

impl Generations {
    const fn feed_mut(&mut self, feed: Feed) -> &mut Generation {
        match feed {
            Feed::Products => &mut self.products,
            Feed::MarketListings => &mut self.market_listings,
            Feed::AccountListings => &mut self.account_listings,
            Feed::Reviews => &mut self.reviews,
        }
    }
}

/// In-memory state of a storefront session.
#[derive(Debug, Clone, Default)]
pub struct AppState {
    pub products: Vec<Product>,
    pub market_listings: Vec<Listing>,
    pub account_listings: Vec<Listing>,
    pub reviews: Vec<Review>,
    pub cart: Cart,
    pub favorites: Favorites,
    pub user: Option<User>,
    /// Newest first.
    pub orders: Vec<Order>,
    pub chat: Vec<ChatMessage>,
    pub filter: ProductFilter,
    pub api_available: bool,
    notices: Vec<Notice>,
    generations: Generations,
}

impl AppState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// State holding the built-in catalogs.
    #[cfg(test)]
    #[must_use]
    pub fn with_fallback_catalog() -> Self {
        use crate::catalog::fallback;

        Self {
            products: fallback::products(),
            market_listings: fallback::listings(ListingKind::Market),
            account_listings: fallback::listings(ListingKind::Account),
            reviews: fallback::reviews(),
            ..Self::default()
        }
    }

    // =========================================================================
    // Catalog lookup
    // =========================================================================

    #[must_use]
    pub fn listings(&self, kind: ListingKind) -> &[Listing] {
        match kind {
            ListingKind::Market => &self.market_listings,
            ListingKind::Account => &self.account_listings,
        }
    }

    pub fn listings_mut(&mut self, kind: ListingKind) -> &mut Vec<Listing> {
        match kind {
            ListingKind::Market => &mut self.market_listings,
            ListingKind::Account => &mut self.account_listings,
        }
    }

    #[must_use]
    pub fn find_product(&self, id: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.id.as_str() == id)
    }

    #[must_use]
    pub fn find_listing(&self, kind: ListingKind, id: &str) -> Option<&Listing> {
        self.listings(kind).iter().find(|l| l.id.as_str() == id)
    }

    /// Whether an item with `id` exists in the catalog of `kind`.
    #[must_use]
    pub fn contains_item(&self, kind: CatalogKind, id: &str) -> bool {
        match kind.listing_kind() {
            None => self.find_product(id).is_some(),
            Some(kind) => self.find_listing(kind, id).is_some(),
        }
    }

    /// Products passing the current filter, in display order.
    #[must_use]
    pub fn visible_products(&self) -> Vec<&Product> {
        self.filter.apply(&self.products)
    }

    #[must_use]
    pub fn is_signed_in(&self) -> bool {
        self.user.is_some()
    }

    // =========================================================================
    // Notices
    // =========================================================================

    pub fn push_notice(&mut self, notice: Notice) {
        self.notices.push(notice);
    }

    #[must_use]
    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    /// Take every pending notice.
    pub fn drain_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    // =========================================================================
    // Fetch generations
    // =========================================================================

    /// Start a fetch of `feed`.
    pub fn issue_ticket(&mut self, feed: Feed) -> FetchTicket {
        let slot = self.generations.feed_mut(feed);
        slot.issued += 1;
        FetchTicket {
            feed,
            generation: slot.issued,
        }
    }

    /// Whether a result stamped with `ticket` is still newer than the data
    /// currently applied to its feed. Accepting records the ticket as applied.
    pub fn accept(&mut self, ticket: FetchTicket) -> bool {
        let slot = self.generations.feed_mut(ticket.feed);
        if ticket.generation <= slot.applied {
            return false;
        }
        slot.applied = ticket.generation;
        true
    }

    /// Mark `feed` as changed locally: fetches started before now are stale.
    pub fn invalidate(&mut self, feed: Feed) {
        let ticket = self.issue_ticket(feed);
        self.generations.feed_mut(feed).applied = ticket.generation;
    }
}
