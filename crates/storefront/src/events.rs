//! Event router.
//!
//! Typed UI events are dispatched to the engine (cart, favorites, checkout,
//! chat, listings, account) or applied as filter changes. Each dispatch
//! returns the fragments whose content may have changed, always followed by
//! the pending notices.

use std::num::NonZeroU32;

use secrecy::SecretString;
use tracing::{debug, error};

use kv_market_core::{CartKey, CatalogKind, ListingKind};

use crate::catalog::{Catalog, ListingDraft};
use crate::error::Result;
use crate::filter::SortKey;
use crate::models::CheckoutForm;
use crate::render::{self, Fragment, RenderedFragment};
use crate::state::Feed;
use crate::store::KeyValueStorage;
use crate::storefront::Storefront;

/// A user interaction.
#[derive(Debug, Clone)]
pub enum UiEvent {
    AddToCart {
        kind: CatalogKind,
        id: String,
        qty: NonZeroU32,
    },
    RemoveFromCart(CartKey),
    ChangeQuantity {
        key: CartKey,
        delta: i64,
    },
    ClearCart,
    ToggleFavorite {
        kind: CatalogKind,
        id: String,
    },
    SetCategory(String),
    SetQuery(String),
    SetSort(SortKey),
    Checkout(CheckoutForm),
    SendChat(String),
    PublishListing {
        kind: ListingKind,
        draft: ListingDraft,
    },
    Register {
        name: String,
        email: String,
        password: SecretString,
    },
    SignIn {
        email: String,
        password: SecretString,
    },
    SignOut,
    Refresh,
}

impl UiEvent {
    /// Short name for logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::AddToCart { .. } => "add_to_cart",
            Self::RemoveFromCart(_) => "remove_from_cart",
            Self::ChangeQuantity { .. } => "change_quantity",
            Self::ClearCart => "clear_cart",
            Self::ToggleFavorite { .. } => "toggle_favorite",
            Self::SetCategory(_) => "set_category",
            Self::SetQuery(_) => "set_query",
            Self::SetSort(_) => "set_sort",
            Self::Checkout(_) => "checkout",
            Self::SendChat(_) => "send_chat",
            Self::PublishListing { .. } => "publish_listing",
            Self::Register { .. } => "register",
            Self::SignIn { .. } => "sign_in",
            Self::SignOut => "sign_out",
            Self::Refresh => "refresh",
        }
    }

    /// Fragments to redraw after this event, not counting notices.
    #[must_use]
    pub fn affected(&self) -> Vec<Fragment> {
        match self {
            Self::AddToCart { .. }
            | Self::RemoveFromCart(_)
            | Self::ChangeQuantity { .. }
            | Self::ClearCart => vec![Fragment::CartCount, Fragment::CartItems],
            Self::ToggleFavorite { .. } => vec![
                Fragment::FavoriteCount,
                Fragment::ProductGrid,
                Fragment::MarketListings,
                Fragment::AccountListings,
            ],
            Self::SetCategory(_) | Self::SetQuery(_) | Self::SetSort(_) => {
                vec![Fragment::ProductGrid]
            }
            Self::Checkout(_) => vec![Fragment::CartCount, Fragment::CartItems, Fragment::Account],
            Self::SendChat(_) => vec![Fragment::Chat],
            Self::PublishListing { kind, .. } => vec![Fragment::listings(*kind)],
            Self::Register { .. } | Self::SignIn { .. } | Self::SignOut => vec![
                Fragment::Account,
                Fragment::MarketListings,
                Fragment::AccountListings,
            ],
            Self::Refresh => vec![
                Fragment::ProductGrid,
                Fragment::MarketListings,
                Fragment::AccountListings,
                Fragment::Reviews,
            ],
        }
    }
}

impl<C: Catalog, S: KeyValueStorage> Storefront<C, S> {
    /// Apply `event` and render the affected fragments.
    ///
    /// A failed action blocks only itself: its error becomes a notice and the
    /// session continues. Pending notices are rendered and then cleared.
    ///
    /// # Errors
    ///
    /// Returns `StorefrontError::Render` if a fragment fails to render.
    pub async fn dispatch(&mut self, event: UiEvent) -> Result<Vec<RenderedFragment>> {
        let name = event.name();
        let mut fragments = event.affected();
        debug!(event = name, "Dispatching UI event");

        if let Err(e) = self.apply(event).await {
            debug!(event = name, error = %e, "UI event failed");
            self.report(&e);
        }

        fragments.push(Fragment::Notices);
        let rendered = render::render_all(self.state(), fragments).inspect_err(|e| {
            error!(event = name, error = %e, "Failed to render fragments");
        })?;
        self.drain_notices();
        Ok(rendered)
    }

    async fn apply(&mut self, event: UiEvent) -> Result<()> {
        match event {
            UiEvent::AddToCart { kind, id, qty } => {
                self.add_to_cart(kind, &id, qty)?;
            }
            UiEvent::RemoveFromCart(key) => {
                self.remove_from_cart(&key);
            }
            UiEvent::ChangeQuantity { key, delta } => {
                self.change_quantity(&key, delta);
            }
            UiEvent::ClearCart => self.clear_cart(),
            UiEvent::ToggleFavorite { kind, id } => {
                self.toggle_favorite_item(kind, &id)?;
            }
            UiEvent::SetCategory(category) => self.set_category(&category),
            UiEvent::SetQuery(query) => self.set_query(&query),
            UiEvent::SetSort(sort) => self.set_sort(sort),
            UiEvent::Checkout(form) => {
                self.checkout(&form)?;
            }
            UiEvent::SendChat(text) => self.send_chat(&text)?,
            UiEvent::PublishListing { kind, draft } => {
                self.publish_listing(kind, &draft).await?;
            }
            UiEvent::Register {
                name,
                email,
                password,
            } => {
                self.register(&name, &email, password).await?;
            }
            UiEvent::SignIn { email, password } => {
                self.sign_in(&email, &password).await?;
            }
            UiEvent::SignOut => self.sign_out(),
            UiEvent::Refresh => self.refresh_all().await,
        }
        Ok(())
    }

    /// Reload one catalog and render its fragment.
    ///
    /// # Errors
    ///
    /// Returns `StorefrontError::Render` if a fragment fails to render.
    pub async fn refresh_feed(&mut self, feed: Feed) -> Result<Vec<RenderedFragment>> {
        self.refresh(feed).await;
        let fragment = match feed {
            Feed::Products => Fragment::ProductGrid,
            Feed::MarketListings => Fragment::MarketListings,
            Feed::AccountListings => Fragment::AccountListings,
            Feed::Reviews => Fragment::Reviews,
        };
        let rendered = render::render_all(self.state(), [fragment, Fragment::Notices])?;
        self.drain_notices();
        Ok(rendered)
    }
}
