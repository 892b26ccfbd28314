//! Business logic services for the storefront.
//!
//! # Services
//!
//! - `cart` - Cart mutations and totals
//! - `favorites` - Favorite toggling
//! - `checkout` - Simulated checkout and the order log
//! - `chat` - Simulated support chat
//! - `listings` - Publishing market and author listings
//! - `auth` - Registration and sign-in (remote first, local directory fallback)
//!
//! Every service borrows the session's [`AppState`](crate::state::AppState)
//! mutably and writes each mutation through to the
//! [`PersistedStore`](crate::store::PersistedStore) before returning.

pub mod auth;
pub mod cart;
pub mod chat;
pub mod checkout;
pub mod favorites;
pub mod listings;

pub use auth::AuthService;
pub use cart::CartService;
pub use chat::ChatService;
pub use checkout::CheckoutService;
pub use favorites::FavoritesService;
pub use listings::ListingService;

use tracing::error;

use crate::notice::Notice;
use crate::state::AppState;
use crate::store::{StorageError, StorageKey};

/// Report the outcome of a write-through save. A failed write is logged and
/// surfaced as a notice while the in-memory state stays authoritative.
fn report_write(state: &mut AppState, key: StorageKey, result: Result<(), StorageError>) {
    if let Err(e) = result {
        error!(key = %key, error = %e, "Failed to persist state");
        state.push_notice(Notice::warning(
            "Could not save your changes; they are kept for this session only",
        ));
    }
}
