//! KV Market Core - Shared types library.
//!
//! This crate provides the value types used by the storefront engine:
//! - `storefront` - Client-side catalog, cart, favorites and checkout engine
//! - `integration-tests` - End-to-end tests against a fake catalog API
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no storage access,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for catalog IDs, cart keys, prices, emails and enums

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
