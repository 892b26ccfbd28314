//! Favorites set.

use serde::{Deserialize, Deserializer, Serialize};

use kv_market_core::FavoriteKey;

/// Insertion-ordered set of favorite keys.
///
/// Equality ignores order: two values are equal when they hold the same keys.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct Favorites {
    keys: Vec<FavoriteKey>,
}

impl Favorites {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the key if absent, remove it if present.
    ///
    /// Returns `true` when the key is now a favorite.
    pub fn toggle(&mut self, key: FavoriteKey) -> bool {
        if let Some(pos) = self.keys.iter().position(|k| *k == key) {
            self.keys.remove(pos);
            false
        } else {
            self.keys.push(key);
            true
        }
    }

    #[must_use]
    pub fn contains(&self, key: &FavoriteKey) -> bool {
        self.keys.contains(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FavoriteKey> {
        self.keys.iter()
    }
}

impl PartialEq for Favorites {
    fn eq(&self, other: &Self) -> bool {
        self.keys.len() == other.keys.len() && self.keys.iter().all(|k| other.contains(k))
    }
}

impl Eq for Favorites {}

impl<'de> Deserialize<'de> for Favorites {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Vec::<FavoriteKey>::deserialize(deserializer)?;
        let mut keys = Vec::with_capacity(raw.len());
        for key in raw {
            if !keys.contains(&key) {
                keys.push(key);
            }
        }
        Ok(Self { keys })
    }
}
