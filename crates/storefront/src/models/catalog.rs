//! Catalog domain types: products, listings and reviews.
//!
//! These are validated domain objects produced from API DTOs (or the built-in
//! fallback datasets). They are immutable once loaded.

use serde::{Deserialize, Serialize};

use kv_market_core::{
    CartKey, CatalogKind, FavoriteKey, ListingId, ListingKind, Price, ProductId, ReviewId,
};

/// Anything that can be put in the cart or marked as a favorite.
pub trait CatalogItem {
    /// Catalog the item belongs to.
    fn kind(&self) -> CatalogKind;
    /// Raw item id within its catalog.
    fn item_id(&self) -> &str;
    fn title(&self) -> &str;
    fn price(&self) -> Price;
    fn thumb(&self) -> &str;

    /// Key of this item in the cart map.
    fn cart_key(&self) -> CartKey {
        CartKey::for_item(self.kind(), self.item_id())
    }

    /// Key of this item in the favorites set.
    fn favorite_key(&self) -> FavoriteKey {
        FavoriteKey::for_item(self.kind(), self.item_id())
    }
}

/// A product sold by the shop itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub title: String,
    pub category: String,
    pub price: Price,
    /// Thumbnail URL (or inline placeholder image).
    pub thumb: String,
    pub tag: String,
    pub desc: String,
}

impl CatalogItem for Product {
    fn kind(&self) -> CatalogKind {
        CatalogKind::Product
    }

    fn item_id(&self) -> &str {
        self.id.as_str()
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn price(&self) -> Price {
        self.price
    }

    fn thumb(&self) -> &str {
        &self.thumb
    }
}

/// A listing published by a user: either a market listing or an author edition.
///
/// Market and author listings have independent id namespaces; `kind` tells
/// them apart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Listing {
    pub id: ListingId,
    pub kind: ListingKind,
    pub title: String,
    /// Game topic the listing is about.
    pub category: String,
    pub price: Price,
    pub thumb: String,
    pub tag: String,
    pub desc: String,
    /// Display name of the seller.
    pub seller: String,
}

impl CatalogItem for Listing {
    fn kind(&self) -> CatalogKind {
        self.kind.into()
    }

    fn item_id(&self) -> &str {
        self.id.as_str()
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn price(&self) -> Price {
        self.price
    }

    fn thumb(&self) -> &str {
        &self.thumb
    }
}

/// A customer review shown on the home page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    pub id: ReviewId,
    pub author: String,
    /// Star rating, 1 through 5.
    pub rating: u8,
    pub text: String,
    /// Product the review is attached to, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product: Option<ProductId>,
}

impl Review {
    pub const MIN_RATING: u8 = 1;
    pub const MAX_RATING: u8 = 5;

    /// Clamp an arbitrary API rating into the displayable range.
    #[must_use]
    pub fn clamp_rating(raw: i64) -> u8 {
        let clamped = raw.clamp(i64::from(Self::MIN_RATING), i64::from(Self::MAX_RATING));
        u8::try_from(clamped).unwrap_or(Self::MAX_RATING)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing(kind: ListingKind, id: &str) -> Listing {
        Listing {
            id: ListingId::new(id),
            kind,
            title: "Courier stories".to_string(),
            category: "Dota 2".to_string(),
            price: Price::from_rubles(349),
            thumb: String::new(),
            tag: "Dota 2".to_string(),
            desc: String::new(),
            seller: "MarketPro".to_string(),
        }
    }

    #[test]
    fn test_listing_keys_depend_on_kind() {
        let market = listing(ListingKind::Market, "m1");
        let account = listing(ListingKind::Account, "m1");

        assert_eq!(market.cart_key().as_str(), "listing-m1");
        assert_eq!(market.favorite_key().as_str(), "market-m1");
        assert_eq!(account.cart_key().as_str(), "account-m1");
        assert_eq!(account.favorite_key().as_str(), "account-m1");
    }

    #[test]
    fn test_review_rating_clamped() {
        assert_eq!(Review::clamp_rating(0), 1);
        assert_eq!(Review::clamp_rating(4), 4);
        assert_eq!(Review::clamp_rating(11), 5);
    }
}
