//! Session persistence for the cart.
//!
//! The cart's line set is stored under a fixed session key: read at the start
//! of each cart request, written back after every mutation. A failed write
//! leaves the in-memory cart correct for the current request and is logged
//! rather than surfaced.

use tower_sessions::Session;

use super::Cart;

/// Session key for the serialized cart.
pub const CART_KEY: &str = "kh_cart";

/// Load the cart from the session, empty if absent or unreadable.
pub async fn load(session: &Session) -> Cart {
    match session.get::<Cart>(CART_KEY).await {
        Ok(Some(cart)) => cart,
        Ok(None) => Cart::new(),
        Err(e) => {
            tracing::warn!("Failed to read cart from session: {e}");
            Cart::new()
        }
    }
}

/// Persist the cart to the session, degrading silently on failure.
pub async fn save(session: &Session, cart: &Cart) {
    if let Err(e) = session.insert(CART_KEY, cart).await {
        tracing::warn!("Failed to persist cart to session: {e}");
    }
}
