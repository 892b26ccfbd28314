//! HTTP implementation of [`Catalog`] using `reqwest` 0.13.

use std::sync::{Arc, RwLock};

use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};
use url::Url;

use kv_market_core::{Email, ListingKind};

use super::conversions::{
    convert_auth_response, convert_author_listing, convert_author_listings, convert_listing,
    convert_listings, convert_products, convert_reviews, convert_user,
};
use super::types::{
    AuthResponseDto, AuthorListingDto, IdValue, ListingDto, NewAuthorListingBody, NewListingBody,
    NewUserBody, ProductDto, ReviewDto, UserDto,
};
use super::{AuthSession, Catalog, FetchError, ListingDraft, ProductQuery, Registration};
use crate::config::ApiConfig;
use crate::models::{Listing, Product, Review, User};

/// Role assigned to accounts created from the storefront.
const DEFAULT_ROLE_ID: i64 = 2;

/// Endpoints tried, in order, by the availability check.
const AVAILABILITY_PATHS: [&str; 2] = ["/health", "/products/"];

const fn listings_path(kind: ListingKind) -> &'static str {
    match kind {
        ListingKind::Market => "/listings/",
        ListingKind::Account => "/author-listings/",
    }
}

// =============================================================================
// CatalogClient
// =============================================================================

/// Client for the KV Market catalog API.
///
/// Cheap to clone; clones share the connection pool and bearer token.
#[derive(Clone)]
pub struct CatalogClient {
    inner: Arc<CatalogClientInner>,
}

struct CatalogClientInner {
    client: reqwest::Client,
    base_url: Url,
    page_limit: u32,
    token: RwLock<Option<SecretString>>,
}

impl std::fmt::Debug for CatalogClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogClient")
            .field("base_url", &self.inner.base_url.as_str())
            .field("page_limit", &self.inner.page_limit)
            .finish_non_exhaustive()
    }
}

impl CatalogClient {
    /// Create a new catalog API client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &ApiConfig) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            inner: Arc::new(CatalogClientInner {
                client,
                base_url: config.base_url.clone(),
                page_limit: config.page_limit,
                token: RwLock::new(config.token.clone()),
            }),
        })
    }

    /// Base URL every endpoint path is appended to.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Build the URL of `path` (which starts with `/`) under the base URL.
    fn endpoint(&self, path: &str) -> Result<Url, FetchError> {
        let base = self.inner.base_url.as_str().trim_end_matches('/');
        Url::parse(&format!("{base}{path}"))
            .map_err(|e| FetchError::Network(format!("invalid endpoint URL: {e}")))
    }

    fn paged_endpoint(&self, path: &str, skip: u32, limit: u32) -> Result<Url, FetchError> {
        let mut url = self.endpoint(path)?;
        url.query_pairs_mut()
            .append_pair("skip", &skip.to_string())
            .append_pair("limit", &limit.to_string());
        Ok(url)
    }

    fn bearer_token(&self) -> Option<SecretString> {
        self.inner.token.read().ok().and_then(|token| token.clone())
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.bearer_token() {
            Some(token) => request.bearer_auth(token.expose_secret()),
            None => request,
        }
    }

    /// Send a request and decode a 2xx JSON body.
    async fn send<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, FetchError> {
        let response = self.authorize(request).send().await?;
        let status = response.status();

        if !status.is_success() {
            warn!(status = %status, url = %response.url(), "Catalog API returned non-success status");
            return Err(FetchError::Http {
                status: status.as_u16(),
            });
        }

        response.json::<T>().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout
            } else {
                FetchError::Decode(e.to_string())
            }
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, FetchError> {
        debug!(method = "GET", url = %url, "Catalog API request");
        self.send(self.inner.client.get(url)).await
    }

    async fn post_json<B, T>(&self, url: Url, body: &B) -> Result<T, FetchError>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        debug!(method = "POST", url = %url, "Catalog API request");
        self.send(self.inner.client.post(url).json(body)).await
    }

    async fn ping(&self, path: &str) -> Result<(), FetchError> {
        let url = if path == "/products/" {
            self.paged_endpoint(path, 0, 1)?
        } else {
            self.endpoint(path)?
        };
        let response = self.authorize(self.inner.client.get(url)).send().await?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(FetchError::Http {
                status: response.status().as_u16(),
            })
        }
    }
}

impl Catalog for CatalogClient {
    #[instrument(skip(self))]
    async fn check_availability(&self) -> bool {
        for path in AVAILABILITY_PATHS {
            match self.ping(path).await {
                Ok(()) => {
                    debug!(path, "Catalog API reachable");
                    return true;
                }
                Err(e) => debug!(path, error = %e, "Catalog API check failed"),
            }
        }
        false
    }

    #[instrument(skip(self, query), fields(category = ?query.category))]
    async fn fetch_products(&self, query: &ProductQuery) -> Result<Vec<Product>, FetchError> {
        let mut url = self.paged_endpoint("/products/", query.skip, query.limit)?;
        if let Some(category) = query.category.as_deref().filter(|c| !c.is_empty()) {
            url.query_pairs_mut().append_pair("category", category);
        }

        let dtos: Vec<ProductDto> = self.get_json(url).await?;
        Ok(convert_products(dtos))
    }

    #[instrument(skip(self))]
    async fn fetch_listings(&self, kind: ListingKind) -> Result<Vec<Listing>, FetchError> {
        let mut url = self.paged_endpoint(listings_path(kind), 0, self.inner.page_limit)?;
        url.query_pairs_mut().append_pair("active_only", "true");

        match kind {
            ListingKind::Market => {
                let dtos: Vec<ListingDto> = self.get_json(url).await?;
                Ok(convert_listings(dtos))
            }
            ListingKind::Account => {
                let dtos: Vec<AuthorListingDto> = self.get_json(url).await?;
                Ok(convert_author_listings(dtos))
            }
        }
    }

    #[instrument(skip(self))]
    async fn fetch_reviews(&self) -> Result<Vec<Review>, FetchError> {
        let url = self.paged_endpoint("/reviews/", 0, self.inner.page_limit)?;
        let dtos: Vec<ReviewDto> = self.get_json(url).await?;
        Ok(convert_reviews(dtos))
    }

    #[instrument(skip(self, draft, owner), fields(title = %draft.title))]
    async fn create_listing(
        &self,
        kind: ListingKind,
        draft: &ListingDraft,
        owner: &User,
    ) -> Result<Listing, FetchError> {
        let url = self.endpoint(listings_path(kind))?;
        let user_id = owner.id.as_ref().map(|id| IdValue::from_id(id.as_str()));

        let created = match kind {
            ListingKind::Market => {
                let body = NewListingBody {
                    title: &draft.title,
                    price: draft.price,
                    game_topic: &draft.topic,
                    image_url: draft.image_url.as_deref(),
                    description: draft.description.as_deref(),
                    user_id,
                    status: "active",
                };
                let dto: ListingDto = self.post_json(url, &body).await?;
                convert_listing(dto)
            }
            ListingKind::Account => {
                let body = NewAuthorListingBody {
                    title: &draft.title,
                    prise: draft.price,
                    topics_games: &draft.topic,
                    image_url: draft.image_url.as_deref(),
                    description: draft.description.as_deref(),
                    user_id,
                    status: "active",
                };
                let dto: AuthorListingDto = self.post_json(url, &body).await?;
                convert_author_listing(dto)
            }
        };

        created.ok_or_else(|| FetchError::Decode("created listing has no id".to_string()))
    }

    #[instrument(skip(self, registration), fields(email = %registration.email.as_str()))]
    async fn register_user(&self, registration: &Registration) -> Result<User, FetchError> {
        let url = self.endpoint("/users/")?;
        let body = NewUserBody {
            name: &registration.name,
            email: registration.email.as_str(),
            password: registration.password.expose_secret(),
            role_id: DEFAULT_ROLE_ID,
        };

        let dto: UserDto = self.post_json(url, &body).await?;
        Ok(convert_user(dto))
    }

    #[instrument(skip(self, email, password), fields(email = %email.as_str()))]
    async fn authenticate(
        &self,
        email: &Email,
        password: &SecretString,
    ) -> Result<AuthSession, FetchError> {
        let mut url = self.endpoint("/users/authenticate")?;
        url.query_pairs_mut()
            .append_pair("email", email.as_str())
            .append_pair("password", password.expose_secret());

        // Not logged through get_json: the query string carries the password
        let dto: AuthResponseDto = self.send(self.inner.client.get(url)).await?;
        let (user, token) = convert_auth_response(dto);
        Ok(AuthSession {
            user,
            access_token: token.map(SecretString::from),
        })
    }

    fn set_bearer_token(&self, token: Option<SecretString>) {
        match self.inner.token.write() {
            Ok(mut slot) => *slot = token,
            Err(_) => warn!("Bearer token lock poisoned, keeping previous token"),
        }
    }
}
