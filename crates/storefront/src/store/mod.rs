//! Persisted store for storefront state.
//!
//! # Storage layout
//!
//! The store mirrors browser `localStorage`: a flat map of string keys to
//! JSON-encoded string values. Keys match the ones the browser client uses so
//! existing data keeps loading:
//!
//! - `kv_cart` - cart map (cart key → entry)
//! - `kv_favs` - favorite keys
//! - `kv_user` - signed-in user or `null`
//! - `kv_products_snapshot` - last products fetched from the API
//! - `kv_market_listings` / `kv_account_listings` - last listings fetched
//! - `kv_chat` - support chat history
//! - `kv_orders` - order log, newest first
//! - `kv_users` - local registered-user directory
//! - `access_token` - bearer token (raw string, not JSON)
//!
//! # Backends
//!
//! - [`MemoryStorage`] - in-process map
//! - [`FileStorage`] - JSON document on disk, written atomically

mod file;
mod memory;

pub use file::FileStorage;
pub use memory::MemoryStorage;

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::warn;

/// Errors raised by a storage backend.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading or writing the backing file failed.
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A value could not be serialized.
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The backend lock was poisoned by a panicking writer.
    #[error("storage lock poisoned")]
    Poisoned,
}

/// A synchronous string key-value store (the `localStorage` contract).
pub trait KeyValueStorage: Send + Sync {
    /// Read the raw value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be written.
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete the value stored under `key`. Missing keys are not an error.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be written.
    fn remove_item(&self, key: &str) -> Result<(), StorageError>;
}

/// Keys of every value the storefront persists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageKey {
    Cart,
    Favorites,
    User,
    ProductSnapshot,
    MarketListings,
    AccountListings,
    ChatHistory,
    Orders,
    UserDirectory,
    AccessToken,
}

impl StorageKey {
    /// The raw storage key.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cart => "kv_cart",
            Self::Favorites => "kv_favs",
            Self::User => "kv_user",
            Self::ProductSnapshot => "kv_products_snapshot",
            Self::MarketListings => "kv_market_listings",
            Self::AccountListings => "kv_account_listings",
            Self::ChatHistory => "kv_chat",
            Self::Orders => "kv_orders",
            Self::UserDirectory => "kv_users",
            Self::AccessToken => "access_token",
        }
    }
}

impl std::fmt::Display for StorageKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Typed repository over a [`KeyValueStorage`] backend.
///
/// Reads never fail: an absent, unreadable or corrupted value is replaced by
/// the type's default and logged. Writes report backend failures so callers
/// can surface them without aborting the in-memory mutation.
#[derive(Debug, Clone, Default)]
pub struct PersistedStore<S> {
    backend: S,
}

impl<S: KeyValueStorage> PersistedStore<S> {
    /// Wrap a storage backend.
    #[must_use]
    pub const fn new(backend: S) -> Self {
        Self { backend }
    }

    /// Access the underlying backend.
    #[must_use]
    pub const fn backend(&self) -> &S {
        &self.backend
    }

    /// Unwrap the underlying backend.
    #[must_use]
    pub fn into_backend(self) -> S {
        self.backend
    }

    /// Load a value, substituting `T::default()` when absent or corrupted.
    #[must_use]
    pub fn load<T>(&self, key: StorageKey) -> T
    where
        T: DeserializeOwned + Default,
    {
        self.load_optional(key).unwrap_or_default()
    }

    /// Load a value that may legitimately be absent (`null` or missing).
    #[must_use]
    pub fn load_optional<T>(&self, key: StorageKey) -> Option<T>
    where
        T: DeserializeOwned,
    {
        let raw = self.load_raw(key)?;
        match serde_json::from_str::<Option<T>>(&raw) {
            Ok(value) => value,
            Err(e) => {
                warn!(key = %key, error = %e, "Discarding corrupted stored value");
                None
            }
        }
    }

    /// Load a raw string value (used for the access token).
    #[must_use]
    pub fn load_raw(&self, key: StorageKey) -> Option<String> {
        match self.backend.get_item(key.as_str()) {
            Ok(value) => value,
            Err(e) => {
                warn!(key = %key, error = %e, "Failed to read stored value");
                None
            }
        }
    }

    /// Serialize and store a value.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if serialization or the backend write fails.
    pub fn save<T>(&self, key: StorageKey, value: &T) -> Result<(), StorageError>
    where
        T: Serialize + ?Sized,
    {
        let json = serde_json::to_string(value)?;
        self.backend.set_item(key.as_str(), &json)
    }

    /// Store a raw string value.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend write fails.
    pub fn save_raw(&self, key: StorageKey, value: &str) -> Result<(), StorageError> {
        self.backend.set_item(key.as_str(), value)
    }

    /// Remove a value.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend write fails.
    pub fn remove(&self, key: StorageKey) -> Result<(), StorageError> {
        self.backend.remove_item(key.as_str())
    }
}

#[cfg(test)]
pub mod testing {
    //! Storage backends for exercising failure paths.

    use super::{KeyValueStorage, StorageError};

    /// Backend whose reads succeed empty and whose writes always fail.
    #[derive(Debug, Default)]
    pub struct ReadOnlyStorage;

    impl KeyValueStorage for ReadOnlyStorage {
        fn get_item(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Ok(None)
        }

        fn set_item(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::Io(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "read-only storage",
            )))
        }

        fn remove_item(&self, key: &str) -> Result<(), StorageError> {
            self.set_item(key, "")
        }
    }
}
