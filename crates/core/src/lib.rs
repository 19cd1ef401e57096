//! Kehillah Core - Shared types library.
//!
//! This crate provides common types used across all Kehillah components:
//! - `storefront` - Public-facing community site and shop
//! - `cli` - Command-line tools for content migration
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access, no HTTP
//! clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Money (integer minor units), locale-aware strings, and
//!   type-safe CMS document IDs

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
