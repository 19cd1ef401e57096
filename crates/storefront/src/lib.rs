//! Kehillah storefront library.
//!
//! The storefront is exposed as a library so that route handlers, the cart
//! store and the CMS client can be exercised from integration tests.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod config;
pub mod db;
pub mod error;
pub mod filters;
pub mod i18n;
pub mod middleware;
pub mod routes;
pub mod sanity;
pub mod services;
pub mod state;
