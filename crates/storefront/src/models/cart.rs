//! Shopping cart.
//!
//! The cart maps a [`CartKey`] to a [`CartEntry`]. Every entry always holds a
//! quantity of at least one: any change that would bring it to zero or below
//! removes the entry instead.

use std::collections::BTreeMap;
use std::num::NonZeroU32;

use serde::{Deserialize, Deserializer, Serialize};

use kv_market_core::{CartKey, Price};

use super::catalog::CatalogItem;

/// A single line in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartEntry {
    /// Raw item id (without the cart-key prefix).
    pub id: String,
    pub title: String,
    pub price: Price,
    pub thumb: String,
    qty: u32,
}

impl CartEntry {
    /// Snapshot a catalog item into a cart entry.
    #[must_use]
    pub fn from_item(item: &impl CatalogItem, qty: NonZeroU32) -> Self {
        Self {
            id: item.item_id().to_owned(),
            title: item.title().to_owned(),
            price: item.price(),
            thumb: item.thumb().to_owned(),
            qty: qty.get(),
        }
    }

    /// Quantity (always ≥ 1 for entries held by a [`Cart`]).
    #[must_use]
    pub const fn qty(&self) -> u32 {
        self.qty
    }

    /// `price × qty`.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.price.times(self.qty)
    }
}

/// Outcome of [`Cart::change_quantity`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantityChange {
    /// The entry now holds this quantity.
    Updated(u32),
    /// The quantity dropped to zero or below and the entry was removed.
    Removed,
    /// No entry exists under the key.
    Missing,
}

/// The shopping cart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Cart {
    entries: BTreeMap<CartKey, CartEntry>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `entry` under `key`, merging quantities with an existing entry.
    ///
    /// Returns the resulting quantity.
    pub fn add(&mut self, key: CartKey, entry: CartEntry) -> u32 {
        let added = entry.qty.max(1);
        let slot = self
            .entries
            .entry(key)
            .and_modify(|existing| existing.qty = existing.qty.saturating_add(added))
            .or_insert(CartEntry { qty: added, ..entry });
        slot.qty
    }

    /// Remove the entry under `key`, if any.
    pub fn remove(&mut self, key: &CartKey) -> Option<CartEntry> {
        self.entries.remove(key)
    }

    /// Add `delta` to the quantity under `key`, removing the entry when the
    /// result is not positive.
    pub fn change_quantity(&mut self, key: &CartKey, delta: i64) -> QuantityChange {
        let Some(entry) = self.entries.get_mut(key) else {
            return QuantityChange::Missing;
        };

        let next = i64::from(entry.qty).saturating_add(delta);
        match u32::try_from(next) {
            Ok(qty) if qty > 0 => {
                entry.qty = qty;
                QuantityChange::Updated(qty)
            }
            Ok(_) => {
                self.entries.remove(key);
                QuantityChange::Removed
            }
            Err(_) if next > 0 => {
                entry.qty = u32::MAX;
                QuantityChange::Updated(u32::MAX)
            }
            Err(_) => {
                self.entries.remove(key);
                QuantityChange::Removed
            }
        }
    }

    /// Remove every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Sum of `price × qty` over all entries; zero for an empty cart.
    #[must_use]
    pub fn total(&self) -> Price {
        self.entries.values().map(CartEntry::line_total).sum()
    }

    /// Number of distinct entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of all quantities.
    #[must_use]
    pub fn total_quantity(&self) -> u64 {
        self.entries.values().map(|e| u64::from(e.qty)).sum()
    }

    #[must_use]
    pub fn get(&self, key: &CartKey) -> Option<&CartEntry> {
        self.entries.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&CartKey, &CartEntry)> {
        self.entries.iter()
    }

    /// Entries in key order (used to snapshot the cart into an order).
    #[must_use]
    pub fn entries(&self) -> Vec<CartEntry> {
        self.entries.values().cloned().collect()
    }
}

impl<'de> Deserialize<'de> for Cart {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let mut entries = BTreeMap::<CartKey, CartEntry>::deserialize(deserializer)?;
        // Stored data written by older clients may hold empty lines
        entries.retain(|_, entry| entry.qty > 0);
        Ok(Self { entries })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use kv_market_core::{CatalogKind, ProductId};

    use super::*;
    use crate::models::Product;

    fn product(id: &str, price: u32) -> Product {
        Product {
            id: ProductId::new(id),
            title: format!("Product {id}"),
            category: "guides".to_string(),
            price: Price::from_rubles(price),
            thumb: String::new(),
            tag: "Guide".to_string(),
            desc: String::new(),
        }
    }

    fn qty(n: u32) -> NonZeroU32 {
        NonZeroU32::new(n).unwrap()
    }

    fn add(cart: &mut Cart, item: &Product, n: u32) -> u32 {
        cart.add(item.cart_key(), CartEntry::from_item(item, qty(n)))
    }

    #[test]
    fn test_add_merges_quantities() {
        let mut cart = Cart::new();
        let p = product("1", 499);

        assert_eq!(add(&mut cart, &p, 2), 2);
        assert_eq!(add(&mut cart, &p, 1), 3);
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.get(&CartKey::from_raw("1")).unwrap().qty(), 3);
    }

    #[test]
    fn test_decrement_to_zero_removes_entry() {
        let mut cart = Cart::new();
        add(&mut cart, &product("p1", 500), 1);

        let change = cart.change_quantity(&CartKey::from_raw("p1"), -1);

        assert_eq!(change, QuantityChange::Removed);
        assert!(cart.is_empty());
        assert_eq!(cart.total(), Price::ZERO);
    }

    #[test]
    fn test_large_negative_delta_removes_entry() {
        let mut cart = Cart::new();
        add(&mut cart, &product("p1", 500), 3);

        assert_eq!(
            cart.change_quantity(&CartKey::from_raw("p1"), i64::MIN),
            QuantityChange::Removed
        );
        assert!(cart.is_empty());
    }

    #[test]
    fn test_change_quantity_missing_key() {
        let mut cart = Cart::new();
        assert_eq!(
            cart.change_quantity(&CartKey::from_raw("nope"), 1),
            QuantityChange::Missing
        );
        assert!(cart.is_empty());
    }

    #[test]
    fn test_total_of_maximal_price_saturates() {
        let mut cart = Cart::new();
        let mut expensive = product("big", 0);
        expensive.price = Price::parse("79228162514264337593543950335").unwrap();
        add(&mut cart, &expensive, 2);
        add(&mut cart, &product("1", 499), 1);

        assert_eq!(cart.total(), Price::MAX);
        assert_eq!(
            cart.get(&CartKey::from_raw("big")).unwrap().line_total(),
            Price::MAX
        );
    }

    #[test]
    fn test_total_is_sum_of_lines() {
        let mut cart = Cart::new();
        add(&mut cart, &product("1", 499), 2);
        add(&mut cart, &product("2", 399), 1);

        assert_eq!(cart.total(), Price::from_rubles(499 * 2 + 399));
        assert_eq!(cart.total_quantity(), 3);
        assert_eq!(cart.len(), 2);
    }

    #[test]
    fn test_no_entry_ever_reaches_zero() {
        let mut cart = Cart::new();
        let items = [product("1", 100), product("2", 200), product("3", 300)];
        let deltas = [-3_i64, 2, -1, 5, -7, 1, 0, -2];

        for (step, delta) in deltas.iter().enumerate() {
            let item = &items[step % items.len()];
            add(&mut cart, item, 1);
            cart.change_quantity(&item.cart_key(), *delta);
            if step % 3 == 0 {
                cart.remove(&items[(step + 1) % items.len()].cart_key());
            }
            assert!(cart.iter().all(|(_, e)| e.qty() >= 1));
        }
    }

    #[test]
    fn test_deserialize_drops_empty_lines() {
        let json = r#"{
            "1": {"id": "1", "title": "A", "price": 499, "thumb": "", "qty": 2},
            "listing-m1": {"id": "m1", "title": "B", "price": 349, "thumb": "", "qty": 0}
        }"#;
        let cart: Cart = serde_json::from_str(json).unwrap();

        assert_eq!(cart.len(), 1);
        assert!(cart.get(&CartKey::from_raw("listing-m1")).is_none());
    }

    #[test]
    fn test_serializes_as_flat_map() {
        let mut cart = Cart::new();
        let listing_key = CartKey::for_item(CatalogKind::Market, "m1");
        cart.add(listing_key, CartEntry::from_item(&product("m1", 349), qty(1)));

        let value = serde_json::to_value(&cart).unwrap();
        assert_eq!(value["listing-m1"]["qty"], 1);
        assert_eq!(value["listing-m1"]["price"], 349);
    }
}
