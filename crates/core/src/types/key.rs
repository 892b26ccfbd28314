//! Cart and favorite keys.
//!
//! Products, market listings and author listings share a single cart map and a
//! single favorites set, but their ids come from independent namespaces. The
//! keys below encode the catalog of origin so that `"1"` the product and `"1"`
//! the market listing never collide.
//!
//! | Catalog  | Cart key        | Favorite key    |
//! |----------|-----------------|-----------------|
//! | product  | `<id>`          | `<id>`          |
//! | market   | `listing-<id>`  | `market-<id>`   |
//! | account  | `account-<id>`  | `account-<id>`  |

use core::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// One of the three item sources that feed the cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CatalogKind {
    /// Store products.
    #[default]
    Product,
    /// User-published market listings.
    Market,
    /// Author (account) listings.
    Account,
}

impl CatalogKind {
    /// All catalog kinds, in display order.
    pub const ALL: [Self; 3] = [Self::Product, Self::Market, Self::Account];

    /// Wire name of the kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Product => "product",
            Self::Market => "market",
            Self::Account => "account",
        }
    }

    const fn cart_prefix(self) -> Option<&'static str> {
        match self {
            Self::Product => None,
            Self::Market => Some("listing-"),
            Self::Account => Some("account-"),
        }
    }

    const fn favorite_prefix(self) -> Option<&'static str> {
        match self {
            Self::Product => None,
            Self::Market => Some("market-"),
            Self::Account => Some("account-"),
        }
    }
}

impl fmt::Display for CatalogKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CatalogKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "product" => Ok(Self::Product),
            "market" | "listing" => Ok(Self::Market),
            "account" | "author" => Ok(Self::Account),
            _ => Err(format!("invalid catalog kind: {s}")),
        }
    }
}

/// The two user-published catalogs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListingKind {
    /// Market listings (`/listings/`).
    Market,
    /// Author editions (`/author-listings/`).
    Account,
}

impl ListingKind {
    pub const ALL: [Self; 2] = [Self::Market, Self::Account];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        CatalogKind::from_listing(self).as_str()
    }
}

impl CatalogKind {
    /// Catalog holding listings of `kind`.
    #[must_use]
    pub const fn from_listing(kind: ListingKind) -> Self {
        match kind {
            ListingKind::Market => Self::Market,
            ListingKind::Account => Self::Account,
        }
    }

    /// The listing kind of this catalog; `None` for store products.
    #[must_use]
    pub const fn listing_kind(self) -> Option<ListingKind> {
        match self {
            Self::Product => None,
            Self::Market => Some(ListingKind::Market),
            Self::Account => Some(ListingKind::Account),
        }
    }
}

impl From<ListingKind> for CatalogKind {
    fn from(kind: ListingKind) -> Self {
        Self::from_listing(kind)
    }
}

impl fmt::Display for ListingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn prefixed(prefix: Option<&str>, id: &str) -> String {
    prefix.map_or_else(|| id.to_owned(), |p| format!("{p}{id}"))
}

/// Key of an entry in the cart map.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CartKey(String);

impl CartKey {
    /// Derive the cart key of an item from its catalog and id.
    ///
    /// ```
    /// use kv_market_core::{CartKey, CatalogKind};
    ///
    /// assert_eq!(CartKey::for_item(CatalogKind::Product, "p1").as_str(), "p1");
    /// assert_eq!(CartKey::for_item(CatalogKind::Market, "m1").as_str(), "listing-m1");
    /// assert_eq!(CartKey::for_item(CatalogKind::Account, "a1").as_str(), "account-a1");
    /// ```
    #[must_use]
    pub fn for_item(kind: CatalogKind, id: &str) -> Self {
        Self(prefixed(kind.cart_prefix(), id))
    }

    /// Wrap an already-derived key (e.g. one read back from a rendered view).
    #[must_use]
    pub fn from_raw(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Returns the key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CartKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CartKey {
    fn from(key: &str) -> Self {
        Self(key.to_owned())
    }
}

/// Key of an entry in the favorites set.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FavoriteKey(String);

impl FavoriteKey {
    /// Derive the favorite key of an item from its catalog and id.
    ///
    /// ```
    /// use kv_market_core::{CatalogKind, FavoriteKey};
    ///
    /// assert_eq!(FavoriteKey::for_item(CatalogKind::Product, "1").as_str(), "1");
    /// assert_eq!(FavoriteKey::for_item(CatalogKind::Market, "m1").as_str(), "market-m1");
    /// ```
    #[must_use]
    pub fn for_item(kind: CatalogKind, id: &str) -> Self {
        Self(prefixed(kind.favorite_prefix(), id))
    }

    /// Wrap an already-derived key.
    #[must_use]
    pub fn from_raw(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Returns the key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FavoriteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FavoriteKey {
    fn from(key: &str) -> Self {
        Self(key.to_owned())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_same_id_distinct_catalogs_never_collide() {
        let keys: Vec<CartKey> = CatalogKind::ALL
            .iter()
            .map(|kind| CartKey::for_item(*kind, "1"))
            .collect();
        assert_eq!(keys[0].as_str(), "1");
        assert_ne!(keys[0], keys[1]);
        assert_ne!(keys[1], keys[2]);
        assert_ne!(keys[0], keys[2]);
    }

    #[test]
    fn test_favorite_prefix_differs_from_cart_prefix_for_market() {
        let cart = CartKey::for_item(CatalogKind::Market, "m1");
        let fav = FavoriteKey::for_item(CatalogKind::Market, "m1");
        assert_eq!(cart.as_str(), "listing-m1");
        assert_eq!(fav.as_str(), "market-m1");
    }

    #[test]
    fn test_catalog_kind_from_str() {
        assert_eq!("product".parse::<CatalogKind>().unwrap(), CatalogKind::Product);
        assert_eq!("market".parse::<CatalogKind>().unwrap(), CatalogKind::Market);
        assert_eq!("account".parse::<CatalogKind>().unwrap(), CatalogKind::Account);
        assert!("basket".parse::<CatalogKind>().is_err());
    }

    #[test]
    fn test_listing_kind_maps_to_catalog() {
        assert_eq!(CatalogKind::from(ListingKind::Market), CatalogKind::Market);
        assert_eq!(CatalogKind::Account.listing_kind(), Some(ListingKind::Account));
        assert_eq!(CatalogKind::Product.listing_kind(), None);
    }

    #[test]
    fn test_keys_serialize_as_plain_strings() {
        let key = CartKey::for_item(CatalogKind::Account, "a1");
        assert_eq!(serde_json::to_string(&key).unwrap(), "\"account-a1\"");
    }
}
