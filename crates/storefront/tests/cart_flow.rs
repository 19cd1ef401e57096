//! Cart persistence tests: the store operations driven through the session
//! layer, using an in-memory session store.

use std::sync::Arc;

use tower_sessions::{MemoryStore, Session};

use kehillah_core::{DocumentId, LocaleString, Money};
use kehillah_storefront::cart::{self, Cart, session};
use kehillah_storefront::sanity::types::{Product, Slug};

fn product(id: &str, price_cents: i64) -> Product {
    Product {
        id: DocumentId::new(id),
        name: LocaleString::english(id),
        slug: Slug {
            current: id.to_string(),
        },
        description: None,
        price: Money::from_cents(price_cents),
        category: None,
        kashrut: None,
        images: Vec::new(),
        sku: None,
        in_stock: true,
        featured: false,
    }
}

fn memory_session() -> Session {
    Session::new(None, Arc::new(MemoryStore::default()), None)
}

#[tokio::test]
async fn fresh_session_yields_an_empty_cart() {
    let session = memory_session();
    let loaded = session::load(&session).await;
    assert!(loaded.is_empty());
    assert_eq!(loaded.item_count(), 0);
}

#[tokio::test]
async fn cart_round_trips_through_the_session() {
    let session = memory_session();

    let mut shopping_cart = Cart::new();
    shopping_cart.add_item(product("challah", 650), 2);
    shopping_cart.add_item(product("wine", 3200), 1);
    session::save(&session, &shopping_cart).await;

    let restored = session::load(&session).await;
    assert_eq!(restored.item_count(), 3);
    assert_eq!(restored.subtotal(), Money::from_cents(4500));
    assert_eq!(restored.item_quantity(&DocumentId::new("challah")), 2);
}

#[tokio::test]
async fn mutations_survive_a_save_load_cycle() {
    let session = memory_session();

    let mut shopping_cart = session::load(&session).await;
    shopping_cart.add_item(product("challah", 650), 2);
    session::save(&session, &shopping_cart).await;

    let mut shopping_cart = session::load(&session).await;
    shopping_cart.update_quantity(&DocumentId::new("challah"), 5);
    session::save(&session, &shopping_cart).await;

    let mut shopping_cart = session::load(&session).await;
    assert_eq!(shopping_cart.item_quantity(&DocumentId::new("challah")), 5);

    shopping_cart.remove_item(&DocumentId::new("challah"));
    session::save(&session, &shopping_cart).await;

    let restored = session::load(&session).await;
    assert!(restored.is_empty());
}

#[tokio::test]
async fn shipping_is_recomputed_from_the_persisted_lines() {
    let session = memory_session();

    let mut shopping_cart = Cart::new();
    shopping_cart.add_item(product("candles", 2500), 1);
    session::save(&session, &shopping_cart).await;

    let restored = session::load(&session).await;
    assert_eq!(restored.shipping(), cart::SHIPPING_RATE);
    assert_eq!(restored.total(), Money::from_cents(3300));

    let mut shopping_cart = restored;
    shopping_cart.add_item(product("wine", 3200), 2);
    session::save(&session, &shopping_cart).await;

    // Subtotal $89 crosses the $80 threshold; shipping drops to zero.
    let restored = session::load(&session).await;
    assert_eq!(restored.subtotal(), Money::from_cents(8900));
    assert!(restored.shipping().is_zero());
    assert_eq!(restored.total(), restored.subtotal());
}

#[tokio::test]
async fn clearing_the_cart_persists() {
    let session = memory_session();

    let mut shopping_cart = Cart::new();
    shopping_cart.add_item(product("challah", 650), 4);
    session::save(&session, &shopping_cart).await;

    shopping_cart.clear();
    session::save(&session, &shopping_cart).await;

    let restored = session::load(&session).await;
    assert!(restored.is_empty());
    assert_eq!(restored.subtotal(), Money::ZERO);
}
