//! Render layer.
//!
//! Projects [`AppState`] into view models ([`views`]) and renders them as HTML
//! fragments with Askama. Each [`Fragment`] is one independently replaceable
//! region of the page.

mod filters;
pub mod views;

use askama::Template;

use kv_market_core::ListingKind;

use crate::state::AppState;
use views::{
    CartView, ChatMessageView, ListingGridView, NoticeView, ProductGridView, ReviewView,
    chat_view,
};

/// A page region that can be redrawn on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Fragment {
    CartCount,
    CartItems,
    FavoriteCount,
    ProductGrid,
    MarketListings,
    AccountListings,
    Reviews,
    Chat,
    Account,
    Notices,
}

impl Fragment {
    pub const ALL: [Self; 10] = [
        Self::CartCount,
        Self::CartItems,
        Self::FavoriteCount,
        Self::ProductGrid,
        Self::MarketListings,
        Self::AccountListings,
        Self::Reviews,
        Self::Chat,
        Self::Account,
        Self::Notices,
    ];

    #[must_use]
    pub const fn listings(kind: ListingKind) -> Self {
        match kind {
            ListingKind::Market => Self::MarketListings,
            ListingKind::Account => Self::AccountListings,
        }
    }

    /// DOM id of the region the fragment replaces.
    #[must_use]
    pub const fn target_id(self) -> &'static str {
        match self {
            Self::CartCount => "cart-count",
            Self::CartItems => "cart-items",
            Self::FavoriteCount => "fav-count",
            Self::ProductGrid => "products",
            Self::MarketListings => "market-listings",
            Self::AccountListings => "account-listings",
            Self::Reviews => "reviews",
            Self::Chat => "chat",
            Self::Account => "account",
            Self::Notices => "notices",
        }
    }
}

/// A rendered fragment ready to be swapped into its region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedFragment {
    pub fragment: Fragment,
    pub html: String,
}

// =============================================================================
// Templates
// =============================================================================

/// Cart count badge fragment template.
#[derive(Template)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub count: u64,
}

/// Favorites count badge fragment template.
#[derive(Template)]
#[template(path = "partials/favorite_count.html")]
pub struct FavoriteCountTemplate {
    pub count: usize,
}

/// Cart items fragment template.
#[derive(Template)]
#[template(path = "partials/cart_items.html")]
pub struct CartItemsTemplate {
    pub cart: CartView,
}

/// Product grid fragment template.
#[derive(Template)]
#[template(path = "partials/product_grid.html")]
pub struct ProductGridTemplate {
    pub grid: ProductGridView,
}

/// Listing grid fragment template.
#[derive(Template)]
#[template(path = "partials/listing_grid.html")]
pub struct ListingGridTemplate {
    pub grid: ListingGridView,
}

/// Reviews fragment template.
#[derive(Template)]
#[template(path = "partials/reviews.html")]
pub struct ReviewsTemplate {
    pub reviews: Vec<ReviewView>,
}

/// Support chat fragment template.
#[derive(Template)]
#[template(path = "partials/chat.html")]
pub struct ChatTemplate {
    pub messages: Vec<ChatMessageView>,
}

/// Account box fragment template.
#[derive(Template)]
#[template(path = "partials/account.html")]
pub struct AccountTemplate {
    pub name: Option<String>,
    pub order_count: usize,
}

/// Notices fragment template.
#[derive(Template)]
#[template(path = "partials/notices.html")]
pub struct NoticesTemplate {
    pub notices: Vec<NoticeView>,
}

/// Render `fragment` from the current state.
///
/// # Errors
///
/// Returns `askama::Error` if the template fails to render.
pub fn render(state: &AppState, fragment: Fragment) -> askama::Result<RenderedFragment> {
    let html = match fragment {
        Fragment::CartCount => CartCountTemplate {
            count: state.cart.total_quantity(),
        }
        .render()?,
        Fragment::CartItems => CartItemsTemplate {
            cart: CartView::from(state),
        }
        .render()?,
        Fragment::FavoriteCount => FavoriteCountTemplate {
            count: state.favorites.len(),
        }
        .render()?,
        Fragment::ProductGrid => ProductGridTemplate {
            grid: ProductGridView::from(state),
        }
        .render()?,
        Fragment::MarketListings => ListingGridTemplate {
            grid: ListingGridView::new(state, ListingKind::Market),
        }
        .render()?,
        Fragment::AccountListings => ListingGridTemplate {
            grid: ListingGridView::new(state, ListingKind::Account),
        }
        .render()?,
        Fragment::Reviews => ReviewsTemplate {
            reviews: state.reviews.iter().map(ReviewView::from).collect(),
        }
        .render()?,
        Fragment::Chat => ChatTemplate {
            messages: chat_view(state),
        }
        .render()?,
        Fragment::Account => AccountTemplate {
            name: state.user.as_ref().map(|u| u.name.clone()),
            order_count: state.orders.len(),
        }
        .render()?,
        Fragment::Notices => NoticesTemplate {
            notices: state.notices().iter().map(NoticeView::from).collect(),
        }
        .render()?,
    };
    Ok(RenderedFragment { fragment, html })
}

/// Render several fragments in order.
///
/// # Errors
///
/// Returns the first rendering error.
pub fn render_all(
    state: &AppState,
    fragments: impl IntoIterator<Item = Fragment>,
) -> askama::Result<Vec<RenderedFragment>> {
    fragments
        .into_iter()
        .map(|fragment| render(state, fragment))
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::num::NonZeroU32;

    use kv_market_core::{CatalogKind, FavoriteKey};

    use super::*;
    use crate::notice::Notice;
    use crate::services::CartService;
    use crate::store::{MemoryStorage, PersistedStore};

    #[test]
    fn test_cart_count_is_total_quantity() {
        let mut state = AppState::with_fallback_catalog();
        let store = PersistedStore::new(MemoryStorage::new());
        CartService::new(&mut state, &store)
            .add(CatalogKind::Product, "1", NonZeroU32::new(3).unwrap())
            .unwrap();

        let rendered = render(&state, Fragment::CartCount).unwrap();

        assert!(rendered.html.contains('3'));
    }

    #[test]
    fn test_cart_items_lists_entries_and_total() {
        let mut state = AppState::with_fallback_catalog();
        let store = PersistedStore::new(MemoryStorage::new());
        CartService::new(&mut state, &store)
            .add(CatalogKind::Market, "lst-1", NonZeroU32::MIN)
            .unwrap();

        let html = render(&state, Fragment::CartItems).unwrap().html;

        assert!(html.contains("listing-lst-1"));
        assert!(html.contains("399 ₽"));
    }

    #[test]
    fn test_favorite_count_follows_favorites() {
        let mut state = AppState::new();
        let empty = render(&state, Fragment::FavoriteCount).unwrap().html;
        assert!(empty.contains("fav-count--empty"));
        assert!(empty.contains(">0<"));

        state.favorites.toggle(FavoriteKey::from_raw("1"));
        state.favorites.toggle(FavoriteKey::from_raw("market-lst-1"));
        let html = render(&state, Fragment::FavoriteCount).unwrap().html;

        assert!(html.contains("id=\"fav-count\""));
        assert!(html.contains(">2<"));
        assert!(!html.contains("fav-count--empty"));
    }

    #[test]
    fn test_empty_cart_message() {
        let html = render(&AppState::new(), Fragment::CartItems).unwrap().html;
        assert!(html.contains("Your cart is empty"));
    }

    #[test]
    fn test_product_grid_escapes_titles() {
        let mut state = AppState::with_fallback_catalog();
        state.products[0].title = "<script>alert(1)</script>".to_string();

        let html = render(&state, Fragment::ProductGrid).unwrap().html;

        assert!(!html.contains("<script>"));
        assert!(html.contains("alert(1)"));
    }

    #[test]
    fn test_reviews_render_stars() {
        let state = AppState::with_fallback_catalog();
        let html = render(&state, Fragment::Reviews).unwrap().html;
        assert!(html.contains('★'));
    }

    #[test]
    fn test_every_fragment_renders() {
        let mut state = AppState::with_fallback_catalog();
        state.push_notice(Notice::warning("Offline"));

        let rendered = render_all(&state, Fragment::ALL).unwrap();

        assert_eq!(rendered.len(), Fragment::ALL.len());
        let notices = rendered.last().unwrap();
        assert_eq!(notices.fragment, Fragment::Notices);
        assert!(notices.html.contains("Offline"));
    }
}
