//! Domain models for the storefront.

mod cart;
mod catalog;
mod chat;
mod favorites;
mod order;
mod user;

pub use cart::{Cart, CartEntry, QuantityChange};
pub use catalog::{CatalogItem, Listing, Product, Review};
pub use chat::ChatMessage;
pub use favorites::Favorites;
pub use order::{CheckoutForm, Order};
pub use user::{RegisteredUser, User};
