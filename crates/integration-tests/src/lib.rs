//! Integration tests for KV Market.
//!
//! The storefront engine is exercised end to end against [`FakeApi`], an
//! in-process `axum` server on an ephemeral port that speaks the catalog API
//! and records every request it receives.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p kv-market-integration-tests
//! ```

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::header::{ACCEPT, AUTHORIZATION};
use axum::http::{HeaderMap, HeaderName, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use url::Url;

use kv_market_storefront::catalog::CatalogClient;
use kv_market_storefront::config::ApiConfig;

/// Email and password accepted by `GET /users/authenticate`.
pub const KNOWN_EMAIL: &str = "olga@example.com";
pub const KNOWN_PASSWORD: &str = "password123";
/// Token returned for the known account.
pub const ISSUED_TOKEN: &str = "tok-7";

/// A request seen by the fake API.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub query: HashMap<String, String>,
    pub authorization: Option<String>,
    pub accept: Option<String>,
    pub body: Option<Value>,
}

#[derive(Clone, Default)]
struct ApiState {
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    failures: Arc<HashMap<String, u16>>,
    delays: Arc<HashMap<String, Duration>>,
}

/// Builder for [`FakeApi`].
#[derive(Debug, Default)]
pub struct FakeApiBuilder {
    failures: HashMap<String, u16>,
    delays: HashMap<String, Duration>,
}

impl FakeApiBuilder {
    /// Answer every request to `path` with `status` and an error body.
    #[must_use]
    pub fn fail(mut self, path: &str, status: u16) -> Self {
        self.failures.insert(path.to_string(), status);
        self
    }

    /// Delay every response for `path`.
    #[must_use]
    pub fn delay(mut self, path: &str, delay: Duration) -> Self {
        self.delays.insert(path.to_string(), delay);
        self
    }

    /// Bind to an ephemeral port and start serving.
    ///
    /// # Panics
    ///
    /// Panics if the listener cannot be bound.
    pub async fn start(self) -> FakeApi {
        let state = ApiState {
            requests: Arc::default(),
            failures: Arc::new(self.failures),
            delays: Arc::new(self.delays),
        };
        let app = Router::new().fallback(handle).with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind fake API listener");
        let addr = listener.local_addr().expect("Listener has no address");
        let handle = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        FakeApi {
            addr,
            state,
            handle,
        }
    }
}

/// In-process catalog API.
pub struct FakeApi {
    addr: SocketAddr,
    state: ApiState,
    handle: JoinHandle<()>,
}

impl FakeApi {
    #[must_use]
    pub fn builder() -> FakeApiBuilder {
        FakeApiBuilder::default()
    }

    /// A fake API with default responses for every endpoint.
    pub async fn start() -> Self {
        Self::builder().start().await
    }

    /// Base URL including the `/api` prefix.
    ///
    /// # Panics
    ///
    /// Panics if the address does not form a valid URL.
    #[must_use]
    pub fn base_url(&self) -> Url {
        Url::parse(&format!("http://{}/api", self.addr)).expect("Invalid fake API URL")
    }

    /// Client configuration pointing at this server.
    #[must_use]
    pub fn api_config(&self) -> ApiConfig {
        ApiConfig {
            timeout: Duration::from_millis(500),
            ..ApiConfig::with_base_url(self.base_url())
        }
    }

    /// A catalog client pointing at this server.
    ///
    /// # Panics
    ///
    /// Panics if the client cannot be built.
    #[must_use]
    pub fn client(&self) -> CatalogClient {
        CatalogClient::new(&self.api_config()).expect("Failed to build catalog client")
    }

    /// Every request received so far.
    ///
    /// # Panics
    ///
    /// Panics if the request log is poisoned.
    #[must_use]
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().expect("Request log poisoned").clone()
    }

    /// Requests received for `path` (without the `/api` prefix).
    #[must_use]
    pub fn requests_to(&self, path: &str) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.path == path)
            .collect()
    }
}

impl Drop for FakeApi {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn handle(
    State(state): State<ApiState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let path = uri
        .path()
        .strip_prefix("/api")
        .unwrap_or_else(|| uri.path())
        .to_string();
    let query: HashMap<String, String> = uri
        .query()
        .map(|q| {
            url::form_urlencoded::parse(q.as_bytes())
                .into_owned()
                .collect()
        })
        .unwrap_or_default();
    let header = |name: HeaderName| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    let body: Option<Value> = serde_json::from_slice(&body).ok();

    if let Ok(mut requests) = state.requests.lock() {
        requests.push(RecordedRequest {
            method: method.clone(),
            path: path.clone(),
            query: query.clone(),
            authorization: header(AUTHORIZATION),
            accept: header(ACCEPT),
            body: body.clone(),
        });
    }

    if let Some(delay) = state.delays.get(&path) {
        tokio::time::sleep(*delay).await;
    }
    if let Some(status) = state.failures.get(&path) {
        let status = StatusCode::from_u16(*status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        return (status, Json(json!({ "detail": "scripted failure" }))).into_response();
    }

    match (method, path.as_str()) {
        (Method::GET, "/health") => Json(json!({ "status": "ok" })).into_response(),
        (Method::GET, "/products/") => Json(products()).into_response(),
        (Method::GET, "/listings/") => Json(listings()).into_response(),
        (Method::GET, "/author-listings/") => Json(author_listings()).into_response(),
        (Method::GET, "/reviews/") => Json(reviews()).into_response(),
        (Method::POST, "/listings/") => created_listing(body, 99),
        (Method::POST, "/author-listings/") => created_listing(body, 77),
        (Method::POST, "/users/") => created_user(body),
        (Method::GET, "/users/authenticate") => authenticate(&query),
        _ => (StatusCode::NOT_FOUND, Json(json!({ "detail": "Not Found" }))).into_response(),
    }
}

fn products() -> Value {
    json!([
        {
            "id": 10,
            "title": "Elden Ring",
            "description": "Steam key",
            "price": "2999.00",
            "category": "rpg",
            "image_url": "https://img.example.com/er.jpg"
        },
        {
            "id": 11,
            "title": "Hades",
            "price": 499,
            "category": "roguelike"
        },
        { "id": 12, "title": "Delisted", "price": 100, "is_active": false },
        { "title": "No id", "price": 1 }
    ])
}

fn listings() -> Value {
    json!([
        {
            "id": 1,
            "title": "Hollow Knight key",
            "price": "199",
            "game_topic": "metroidvania",
            "user_id": 3,
            "status": "active"
        },
        { "id": 2, "title": "Sold out", "price": 10, "status": "sold" }
    ])
}

fn author_listings() -> Value {
    json!([
        {
            "id": 5,
            "title": "Account lvl 80",
            "prise": 1200,
            "topics_games": "mmo",
            "user_id": 4
        }
    ])
}

fn reviews() -> Value {
    json!([
        { "id": 1, "user_id": 2, "rating": 4, "comment": "Fast delivery" },
        { "id": 2, "rating": 11, "title": "Great" }
    ])
}

fn created_listing(body: Option<Value>, id: i64) -> Response {
    let Some(Value::Object(mut listing)) = body else {
        return (StatusCode::UNPROCESSABLE_ENTITY, Json(json!({ "detail": "invalid body" })))
            .into_response();
    };
    listing.insert("id".to_string(), json!(id));
    (StatusCode::CREATED, Json(Value::Object(listing))).into_response()
}

fn created_user(body: Option<Value>) -> Response {
    let body = body.unwrap_or(Value::Null);
    if body.get("email").and_then(Value::as_str) == Some(KNOWN_EMAIL) {
        return (StatusCode::CONFLICT, Json(json!({ "detail": "Email already registered" })))
            .into_response();
    }
    (
        StatusCode::CREATED,
        Json(json!({
            "id": 42,
            "name": body.get("name").cloned().unwrap_or(Value::Null),
            "email": body.get("email").cloned().unwrap_or(Value::Null),
        })),
    )
        .into_response()
}

fn authenticate(query: &HashMap<String, String>) -> Response {
    let email = query.get("email").map(String::as_str);
    let password = query.get("password").map(String::as_str);
    if email == Some(KNOWN_EMAIL) && password == Some(KNOWN_PASSWORD) {
        Json(json!({
            "user_id": 7,
            "name": "Olga",
            "email": KNOWN_EMAIL,
            "access_token": ISSUED_TOKEN,
        }))
        .into_response()
    } else {
        (StatusCode::UNAUTHORIZED, Json(json!({ "detail": "Invalid credentials" }))).into_response()
    }
}
