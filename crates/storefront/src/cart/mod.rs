//! The shopping cart: line state, derived pricing, session persistence.

pub mod session;
mod store;

pub use store::{Cart, CartLine, FREE_SHIPPING_THRESHOLD, SHIPPING_RATE};
