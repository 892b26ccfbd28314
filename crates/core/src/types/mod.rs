//! Core types for KV Market.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod key;
pub mod price;
pub mod status;

pub use email::{Email, EmailError};
pub use id::*;
pub use key::{CartKey, CatalogKind, FavoriteKey, ListingKind};
pub use price::{Price, PriceError};
pub use status::*;
