//! KV Market storefront engine.
//!
//! A client-side storefront: catalog browsing, cart, favorites, a simulated
//! checkout and support chat, backed by the KV Market HTTP API with built-in
//! fallback data when the API is unavailable.
//!
//! # Architecture
//!
//! - [`store`] - Typed, write-through persistence over a key-value backend
//! - [`catalog`] - Remote catalog client, DTOs and fallback datasets
//! - [`state`] - In-memory session state and fetch generations
//! - [`services`] - Cart, favorites, checkout, chat, listings and account logic
//! - [`render`] - View models and Askama HTML fragments
//! - [`events`] - Typed UI events dispatched to the engine
//! - [`Storefront`] - The session facade tying them together

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod catalog;
pub mod config;
pub mod error;
pub mod events;
pub mod filter;
pub mod models;
pub mod notice;
pub mod render;
pub mod services;
pub mod state;
pub mod store;
pub mod storefront;

pub use storefront::Storefront;
