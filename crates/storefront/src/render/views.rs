//! View models: display-ready projections of [`AppState`].

use kv_market_core::{ChatAuthor, ListingKind};

use crate::filter::categories;
use crate::models::{CatalogItem, ChatMessage, Listing, Product, Review};
use crate::notice::Notice;
use crate::services::chat::transcript;
use crate::state::AppState;

/// Cart line display data for templates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartItemView {
    pub key: String,
    pub title: String,
    pub thumb: String,
    pub quantity: u32,
    pub price: String,
    pub line_price: String,
}

/// Cart display data for templates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub total: String,
    /// Distinct entries.
    pub entry_count: usize,
    /// Sum of quantities.
    pub item_count: u64,
}

impl CartView {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl From<&AppState> for CartView {
    fn from(state: &AppState) -> Self {
        let items = state
            .cart
            .iter()
            .map(|(key, entry)| CartItemView {
                key: key.as_str().to_owned(),
                title: entry.title.clone(),
                thumb: entry.thumb.clone(),
                quantity: entry.qty(),
                price: entry.price.display(),
                line_price: entry.line_total().display(),
            })
            .collect();

        Self {
            items,
            total: state.cart.total().display(),
            entry_count: state.cart.len(),
            item_count: state.cart.total_quantity(),
        }
    }
}

/// Product card display data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductCardView {
    pub id: String,
    pub title: String,
    pub category: String,
    pub tag: String,
    pub desc: String,
    pub price: String,
    pub thumb: String,
    pub favorite_key: String,
    pub favorited: bool,
}

impl ProductCardView {
    fn new(product: &Product, state: &AppState) -> Self {
        let favorite_key = product.favorite_key();
        Self {
            id: product.id.as_str().to_owned(),
            title: product.title.clone(),
            category: product.category.clone(),
            tag: product.tag.clone(),
            desc: product.desc.clone(),
            price: product.price.display(),
            thumb: product.thumb.clone(),
            favorited: state.favorites.contains(&favorite_key),
            favorite_key: favorite_key.as_str().to_owned(),
        }
    }
}

/// The filtered product grid with its filter controls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductGridView {
    pub products: Vec<ProductCardView>,
    pub categories: Vec<String>,
    pub selected_category: String,
    pub query: String,
    pub sort: &'static str,
}

impl From<&AppState> for ProductGridView {
    fn from(state: &AppState) -> Self {
        Self {
            products: state
                .visible_products()
                .into_iter()
                .map(|p| ProductCardView::new(p, state))
                .collect(),
            categories: categories(&state.products)
                .into_iter()
                .map(str::to_owned)
                .collect(),
            selected_category: state.filter.category.as_str().to_owned(),
            query: state.filter.query.clone(),
            sort: state.filter.sort.as_str(),
        }
    }
}

/// Listing card display data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingCardView {
    pub id: String,
    pub kind: &'static str,
    pub title: String,
    pub category: String,
    pub price: String,
    pub thumb: String,
    pub seller: String,
    pub favorite_key: String,
    pub favorited: bool,
}

impl ListingCardView {
    fn new(listing: &Listing, state: &AppState) -> Self {
        let favorite_key = listing.favorite_key();
        Self {
            id: listing.id.as_str().to_owned(),
            kind: listing.kind.as_str(),
            title: listing.title.clone(),
            category: listing.category.clone(),
            price: listing.price.display(),
            thumb: listing.thumb.clone(),
            seller: listing.seller.clone(),
            favorited: state.favorites.contains(&favorite_key),
            favorite_key: favorite_key.as_str().to_owned(),
        }
    }
}

/// One listing grid (market or author listings).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingGridView {
    pub kind: &'static str,
    pub heading: &'static str,
    pub listings: Vec<ListingCardView>,
    pub can_publish: bool,
}

impl ListingGridView {
    #[must_use]
    pub fn new(state: &AppState, kind: ListingKind) -> Self {
        Self {
            kind: kind.as_str(),
            heading: match kind {
                ListingKind::Market => "Marketplace",
                ListingKind::Account => "Author listings",
            },
            listings: state
                .listings(kind)
                .iter()
                .map(|l| ListingCardView::new(l, state))
                .collect(),
            can_publish: state.is_signed_in(),
        }
    }
}

/// Review display data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewView {
    pub author: String,
    pub rating: u8,
    pub text: String,
}

impl From<&Review> for ReviewView {
    fn from(review: &Review) -> Self {
        Self {
            author: review.author.clone(),
            rating: review.rating,
            text: review.text.clone(),
        }
    }
}

/// Chat message display data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessageView {
    /// CSS modifier: `user` or `support`.
    pub author: &'static str,
    pub text: String,
}

impl From<&ChatMessage> for ChatMessageView {
    fn from(message: &ChatMessage) -> Self {
        Self {
            author: match message.author {
                ChatAuthor::User => "user",
                ChatAuthor::Support => "support",
            },
            text: message.text.clone(),
        }
    }
}

/// The chat transcript, with the welcome message when empty.
#[must_use]
pub fn chat_view(state: &AppState) -> Vec<ChatMessageView> {
    transcript(&state.chat)
        .iter()
        .map(ChatMessageView::from)
        .collect()
}

/// Notice display data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoticeView {
    pub level: &'static str,
    pub message: String,
}

impl From<&Notice> for NoticeView {
    fn from(notice: &Notice) -> Self {
        Self {
            level: notice.level.as_str(),
            message: notice.message.clone(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::num::NonZeroU32;

    use kv_market_core::{CatalogKind, FavoriteKey};

    use super::*;
    use crate::services::CartService;
    use crate::store::{MemoryStorage, PersistedStore};

    #[test]
    fn test_cart_view_counts_and_formats() {
        let mut state = AppState::with_fallback_catalog();
        let store = PersistedStore::new(MemoryStorage::new());
        let mut cart = CartService::new(&mut state, &store);
        cart.add(CatalogKind::Product, "1", NonZeroU32::new(3).unwrap())
            .unwrap();
        cart.add(CatalogKind::Market, "lst-2", NonZeroU32::MIN).unwrap();

        let view = CartView::from(&state);

        assert_eq!(view.entry_count, 2);
        assert_eq!(view.item_count, 4);
        assert_eq!(view.total, "1 846 ₽");
        let line = view.items.iter().find(|i| i.key == "1").unwrap();
        assert_eq!(line.line_price, "1 497 ₽");
    }

    #[test]
    fn test_empty_cart_view() {
        let view = CartView::from(&AppState::new());
        assert!(view.is_empty());
        assert_eq!(view.total, "Free");
    }

    #[test]
    fn test_product_grid_marks_favorites_and_follows_filter() {
        let mut state = AppState::with_fallback_catalog();
        state.favorites.toggle(FavoriteKey::from_raw("2"));
        state.filter.category = "rpg".into();

        let view = ProductGridView::from(&state);

        assert!(view.products.iter().all(|p| p.category == "rpg"));
        assert_eq!(view.selected_category, "rpg");
        let favorited: Vec<_> = view
            .products
            .iter()
            .filter(|p| p.favorited)
            .map(|p| p.id.as_str())
            .collect();
        assert!(favorited.iter().all(|id| *id == "2"));
    }

    #[test]
    fn test_listing_grid_uses_prefixed_favorite_keys() {
        let mut state = AppState::with_fallback_catalog();
        state.favorites.toggle(FavoriteKey::for_item(CatalogKind::Account, "acc-1"));

        let view = ListingGridView::new(&state, ListingKind::Account);

        assert_eq!(view.listings[0].favorite_key, "account-acc-1");
        assert!(view.listings[0].favorited);
        assert!(!view.can_publish);
    }

    #[test]
    fn test_chat_view_welcome() {
        let view = chat_view(&AppState::new());
        assert_eq!(view.len(), 1);
        assert_eq!(view[0].author, "support");
    }
}
