//! Remote catalog: products, listings and reviews from the KV Market API.
//!
//! # Architecture
//!
//! - [`Catalog`] is the seam between the storefront and the API; the
//!   production implementation is [`CatalogClient`] (`reqwest`)
//! - API payloads are decoded into lenient DTOs ([`types`]) and converted to
//!   domain models at the boundary ([`conversions`])
//! - Every fetch returns `Result<_, FetchError>`; callers recover with
//!   [`FetchResultExt::or_fallback`] and the built-in datasets in
//!   [`fallback`]
//!
//! # Example
//!
//! ```rust,ignore
//! use kv_market_storefront::catalog::{CatalogClient, FetchResultExt, ProductQuery, fallback};
//!
//! let client = CatalogClient::new(&config.api)?;
//! let loaded = client
//!     .fetch_products(&ProductQuery::default())
//!     .await
//!     .or_fallback(fallback::products);
//! if loaded.is_fallback() {
//!     // show a notice
//! }
//! ```

mod client;
pub mod conversions;
pub mod fallback;
pub mod types;

pub use client::CatalogClient;

use std::future::Future;

use secrecy::SecretString;
use thiserror::Error;

use kv_market_core::{Email, ListingKind, Price};

use crate::models::{Listing, Product, Review, User};

/// Errors that can occur when talking to the catalog API.
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    /// The request could not be sent or the response could not be received.
    #[error("network error: {0}")]
    Network(String),

    /// The request did not complete within the configured timeout.
    #[error("request timed out")]
    Timeout,

    /// The API answered with a non-2xx status.
    #[error("HTTP error: {status}")]
    Http { status: u16 },

    /// The response body was not the expected JSON.
    #[error("malformed response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout
        } else if e.is_decode() {
            Self::Decode(e.to_string())
        } else if let Some(status) = e.status() {
            Self::Http {
                status: status.as_u16(),
            }
        } else {
            Self::Network(e.to_string())
        }
    }
}

impl FetchError {
    /// Whether the API rejected the caller's credentials.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Http { status: 401 | 403 })
    }
}

/// Parameters of `GET /products/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductQuery {
    pub skip: u32,
    pub limit: u32,
    /// Server-side category filter; `None` fetches every category.
    pub category: Option<String>,
}

impl Default for ProductQuery {
    fn default() -> Self {
        Self {
            skip: 0,
            limit: 100,
            category: None,
        }
    }
}

/// A listing the signed-in user wants to publish.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingDraft {
    pub title: String,
    /// Game topic (`game_topic` / `topics_games` on the wire).
    pub topic: String,
    pub price: Price,
    pub image_url: Option<String>,
    pub description: Option<String>,
}

/// Account registration request.
#[derive(Debug, Clone)]
pub struct Registration {
    pub name: String,
    pub email: Email,
    pub password: SecretString,
}

/// Result of a successful sign-in.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub user: User,
    pub access_token: Option<SecretString>,
}

/// Source of catalog data.
///
/// Methods return `Send` futures so catalogs can be driven from any Tokio
/// runtime flavor.
pub trait Catalog: Send + Sync {
    /// Whether the API is reachable at all.
    fn check_availability(&self) -> impl Future<Output = bool> + Send;

    /// `GET /products/`.
    fn fetch_products(
        &self,
        query: &ProductQuery,
    ) -> impl Future<Output = Result<Vec<Product>, FetchError>> + Send;

    /// `GET /listings/` or `GET /author-listings/`.
    fn fetch_listings(
        &self,
        kind: ListingKind,
    ) -> impl Future<Output = Result<Vec<Listing>, FetchError>> + Send;

    /// `GET /reviews/`.
    fn fetch_reviews(&self) -> impl Future<Output = Result<Vec<Review>, FetchError>> + Send;

    /// `POST /listings/` or `POST /author-listings/`.
    fn create_listing(
        &self,
        kind: ListingKind,
        draft: &ListingDraft,
        owner: &User,
    ) -> impl Future<Output = Result<Listing, FetchError>> + Send;

    /// `POST /users/`.
    fn register_user(
        &self,
        registration: &Registration,
    ) -> impl Future<Output = Result<User, FetchError>> + Send;

    /// `GET /users/authenticate`.
    fn authenticate(
        &self,
        email: &Email,
        password: &SecretString,
    ) -> impl Future<Output = Result<AuthSession, FetchError>> + Send;

    /// Replace the bearer token attached to subsequent requests.
    fn set_bearer_token(&self, _token: Option<SecretString>) {}
}

/// Where loaded data came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSource {
    Remote,
    Fallback,
}

/// Data together with its provenance.
#[derive(Debug, Clone)]
pub struct Loaded<T> {
    pub data: T,
    pub source: DataSource,
    /// The failure that caused a fallback; `None` when the fetch was skipped.
    pub error: Option<FetchError>,
}

impl<T> Loaded<T> {
    #[must_use]
    pub const fn remote(data: T) -> Self {
        Self {
            data,
            source: DataSource::Remote,
            error: None,
        }
    }

    #[must_use]
    pub const fn fallback(data: T, error: Option<FetchError>) -> Self {
        Self {
            data,
            source: DataSource::Fallback,
            error,
        }
    }

    #[must_use]
    pub fn is_fallback(&self) -> bool {
        self.source == DataSource::Fallback
    }
}

/// Explicit fallback combinator for fetch results.
pub trait FetchResultExt<T> {
    /// Keep the fetched data, or substitute `fallback()` and remember why.
    fn or_fallback(self, fallback: impl FnOnce() -> T) -> Loaded<T>;
}

impl<T> FetchResultExt<T> for Result<T, FetchError> {
    fn or_fallback(self, fallback: impl FnOnce() -> T) -> Loaded<T> {
        match self {
            Ok(data) => Loaded::remote(data),
            Err(e) => Loaded::fallback(fallback(), Some(e)),
        }
    }
}

// =============================================================================
// Test double
// =============================================================================

#[cfg(test)]
pub mod testing {
    //! In-process [`Catalog`] with scripted responses.

    use std::sync::Mutex;

    use secrecy::ExposeSecret;

    use kv_market_core::{ListingId, UserId};

    use super::*;

    /// Scripted catalog. Unset responses succeed with empty lists.
    #[derive(Debug, Default)]
    pub struct FakeCatalog {
        pub available: bool,
        pub products: Option<Result<Vec<Product>, FetchError>>,
        pub market: Option<Result<Vec<Listing>, FetchError>>,
        pub account: Option<Result<Vec<Listing>, FetchError>>,
        pub reviews: Option<Result<Vec<Review>, FetchError>>,
        /// Accepted `(email, password, user)` triples.
        pub accounts: Vec<(String, String, User)>,
        /// Error returned by every write endpoint, if set.
        pub write_error: Option<FetchError>,
        pub calls: Mutex<Vec<String>>,
        pub token: Mutex<Option<String>>,
    }

    impl FakeCatalog {
        /// A reachable API serving empty catalogs.
        #[must_use]
        pub fn online() -> Self {
            Self {
                available: true,
                ..Self::default()
            }
        }

        fn record(&self, call: impl Into<String>) {
            if let Ok(mut calls) = self.calls.lock() {
                calls.push(call.into());
            }
        }

        #[must_use]
        pub fn calls(&self) -> Vec<String> {
            self.calls.lock().map(|c| c.clone()).unwrap_or_default()
        }

        fn write_result(&self) -> Result<(), FetchError> {
            self.write_error.clone().map_or(Ok(()), Err)
        }
    }

    impl Catalog for FakeCatalog {
        async fn check_availability(&self) -> bool {
            self.record("health");
            self.available
        }

        async fn fetch_products(&self, query: &ProductQuery) -> Result<Vec<Product>, FetchError> {
            self.record(format!("products:{}", query.category.as_deref().unwrap_or("")));
            self.products.clone().unwrap_or(Ok(Vec::new()))
        }

        async fn fetch_listings(&self, kind: ListingKind) -> Result<Vec<Listing>, FetchError> {
            self.record(format!("listings:{kind}"));
            let scripted = match kind {
                ListingKind::Market => &self.market,
                ListingKind::Account => &self.account,
            };
            scripted.clone().unwrap_or(Ok(Vec::new()))
        }

        async fn fetch_reviews(&self) -> Result<Vec<Review>, FetchError> {
            self.record("reviews");
            self.reviews.clone().unwrap_or(Ok(Vec::new()))
        }

        async fn create_listing(
            &self,
            kind: ListingKind,
            draft: &ListingDraft,
            owner: &User,
        ) -> Result<Listing, FetchError> {
            self.record(format!("create:{kind}"));
            self.write_result()?;
            Ok(Listing {
                id: ListingId::new(format!("new-{}", draft.title.len())),
                kind,
                title: draft.title.clone(),
                category: draft.topic.clone(),
                price: draft.price,
                thumb: draft.image_url.clone().unwrap_or_default(),
                tag: draft.topic.clone(),
                desc: draft.description.clone().unwrap_or_default(),
                seller: owner.name.clone(),
            })
        }

        async fn register_user(&self, registration: &Registration) -> Result<User, FetchError> {
            self.record("register");
            self.write_result()?;
            Ok(User {
                id: Some(UserId::new("100")),
                name: registration.name.clone(),
                email: Some(registration.email.as_str().to_owned()),
            })
        }

        async fn authenticate(
            &self,
            email: &Email,
            password: &SecretString,
        ) -> Result<AuthSession, FetchError> {
            self.record("authenticate");
            self.write_result()?;
            self.accounts
                .iter()
                .find(|(e, p, _)| e == email.as_str() && p == password.expose_secret())
                .map(|(_, _, user)| AuthSession {
                    user: user.clone(),
                    access_token: Some(SecretString::from("fake-token")),
                })
                .ok_or(FetchError::Http { status: 401 })
        }

        fn set_bearer_token(&self, token: Option<SecretString>) {
            if let Ok(mut slot) = self.token.lock() {
                *slot = token.map(|t| t.expose_secret().to_owned());
            }
        }
    }
}
