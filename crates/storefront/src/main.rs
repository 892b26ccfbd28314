//! KV Market storefront - headless session runner.
//!
//! Boots a storefront session from environment configuration: restores the
//! persisted state, checks the catalog API, loads every catalog (falling back
//! to built-in data) and logs the result. Takes no arguments.
//!
//! # Storage
//!
//! With `KV_STORAGE_PATH` set, state lives in that JSON file and survives
//! restarts; otherwise it is kept in memory for the run only.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::process::ExitCode;

use tracing::{debug, error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use kv_market_storefront::Storefront;
use kv_market_storefront::catalog::{CatalogClient, ProductQuery};
use kv_market_storefront::config::StorefrontConfig;
use kv_market_storefront::notice::NoticeLevel;
use kv_market_storefront::render::{self, Fragment};
use kv_market_storefront::store::{FileStorage, KeyValueStorage, MemoryStorage};

#[tokio::main]
async fn main() -> ExitCode {
    // Defaults to info level for our crate if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "kv_market_storefront=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match StorefrontConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Failed to load configuration");
            return ExitCode::FAILURE;
        }
    };
    debug!(?config, "Configuration loaded");

    let client = match CatalogClient::new(&config.api) {
        Ok(client) => client,
        Err(e) => {
            error!(error = %e, "Failed to build catalog client");
            return ExitCode::FAILURE;
        }
    };
    info!(base_url = %client.base_url(), "Catalog client ready");

    match &config.storage_path {
        Some(path) => {
            info!(path = %path.display(), "Using file storage");
            run(client, FileStorage::open(path), &config).await
        }
        None => {
            info!("Using in-memory storage");
            run(client, MemoryStorage::new(), &config).await
        }
    }
}

async fn run<S: KeyValueStorage>(
    client: CatalogClient,
    storage: S,
    config: &StorefrontConfig,
) -> ExitCode {
    let query = ProductQuery {
        limit: config.api.page_limit,
        ..ProductQuery::default()
    };
    let mut storefront = Storefront::new(client, storage)
        .with_product_query(query)
        .with_availability_check(config.api.check_availability);

    storefront.bootstrap().await;

    let state = storefront.state();
    info!(
        api_available = state.api_available,
        products = state.products.len(),
        market_listings = state.market_listings.len(),
        account_listings = state.account_listings.len(),
        reviews = state.reviews.len(),
        cart_entries = state.cart.len(),
        cart_total = %state.cart.total(),
        favorites = state.favorites.len(),
        signed_in = state.is_signed_in(),
        "Storefront ready"
    );

    match render::render_all(state, Fragment::ALL) {
        Ok(fragments) => {
            for fragment in &fragments {
                debug!(
                    target_id = fragment.fragment.target_id(),
                    bytes = fragment.html.len(),
                    "Rendered fragment"
                );
            }
        }
        Err(e) => {
            error!(error = %e, "Failed to render page fragments");
            return ExitCode::FAILURE;
        }
    }

    for notice in storefront.drain_notices() {
        match notice.level {
            NoticeLevel::Info | NoticeLevel::Success => info!(message = %notice.message, "Notice"),
            NoticeLevel::Warning | NoticeLevel::Error => warn!(message = %notice.message, "Notice"),
        }
    }

    ExitCode::SUCCESS
}
