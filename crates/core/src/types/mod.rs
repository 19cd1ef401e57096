//! Core types for Kehillah.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod locale;
pub mod money;

pub use id::DocumentId;
pub use locale::{Locale, LocaleString, LocaleText, UnsupportedLocale};
pub use money::{Money, MoneyError};
