//! HTTP route handlers.
//!
//! # Route Structure
//!
//! All pages are locale-prefixed (`en` or `he`); the bare root redirects to
//! English.
//!
//! ```text
//! GET  /                               - Redirect to /en
//! GET  /{locale}                       - Home page
//!
//! # Shop
//! GET  /{locale}/shop                  - Product listing (?category=, ?q=)
//! GET  /{locale}/shop/{slug}           - Product detail
//!
//! # Cart (HTMX fragments)
//! GET  /{locale}/shop/cart             - Cart page
//! POST /{locale}/shop/cart/add         - Add to cart (returns count fragment)
//! POST /{locale}/shop/cart/update      - Update quantity (returns cart_items fragment)
//! POST /{locale}/shop/cart/remove      - Remove item (returns cart_items fragment)
//! GET  /{locale}/shop/cart/count       - Cart count badge (fragment)
//!
//! # Checkout (local demo flow, no payment backend)
//! GET  /{locale}/shop/checkout         - Checkout form
//! POST /{locale}/shop/checkout         - Place order (clears cart)
//! GET  /{locale}/shop/checkout/success - Order confirmation
//!
//! # Donations
//! GET  /{locale}/donate                - Donation page
//! GET  /{locale}/donate/success        - Post-payment thank-you
//! GET  /{locale}/donate/cancel         - Cancelled payment
//! POST /api/donate/checkout            - Create Stripe Checkout session (JSON)
//!
//! # Events
//! GET  /{locale}/events                - Upcoming events
//! GET  /{locale}/events/{slug}         - Event detail
//! POST /{locale}/events/{slug}/rsvp    - RSVP (local demo flow, logged only)
//!
//! # Community
//! GET  /{locale}/synagogues            - Synagogue listing
//! GET  /{locale}/synagogues/{slug}     - Synagogue detail
//! GET  /{locale}/leadership            - Leadership, grouped by category
//! GET  /{locale}/leadership/{slug}     - Person biography
//! GET  /{locale}/education             - Education program listing
//! GET  /{locale}/education/{slug}      - Program detail
//!
//! # Content
//! GET  /{locale}/{slug}                - Generic CMS page
//! ```

pub mod cart;
pub mod donate;
pub mod education;
pub mod events;
pub mod home;
pub mod leadership;
pub mod pages;
pub mod shop;
pub mod synagogues;

use axum::{
    Router,
    response::Redirect,
    routing::{get, post},
};
use tower_sessions::Session;

use kehillah_core::Locale;

use crate::error::AppError;
use crate::state::AppState;

/// Create the application router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(|| async { Redirect::to("/en") }))
        .route("/api/donate/checkout", post(donate::checkout))
        .route("/{locale}", get(home::show))
        .route("/{locale}/shop", get(shop::index))
        .route("/{locale}/shop/cart", get(cart::show))
        .route("/{locale}/shop/cart/add", post(cart::add))
        .route("/{locale}/shop/cart/update", post(cart::update))
        .route("/{locale}/shop/cart/remove", post(cart::remove))
        .route("/{locale}/shop/cart/count", get(cart::count))
        .route(
            "/{locale}/shop/checkout",
            get(cart::checkout_form).post(cart::checkout_submit),
        )
        .route("/{locale}/shop/checkout/success", get(cart::checkout_success))
        .route("/{locale}/shop/{slug}", get(shop::product))
        .route("/{locale}/donate", get(donate::show))
        .route("/{locale}/donate/success", get(donate::success))
        .route("/{locale}/donate/cancel", get(donate::cancel))
        .route("/{locale}/events", get(events::index))
        .route("/{locale}/events/{slug}", get(events::show))
        .route("/{locale}/events/{slug}/rsvp", post(events::rsvp))
        .route("/{locale}/synagogues", get(synagogues::index))
        .route("/{locale}/synagogues/{slug}", get(synagogues::show))
        .route("/{locale}/leadership", get(leadership::index))
        .route("/{locale}/leadership/{slug}", get(leadership::show))
        .route("/{locale}/education", get(education::index))
        .route("/{locale}/education/{slug}", get(education::show))
        .route("/{locale}/{slug}", get(pages::show))
}

/// Parse a path locale segment, rejecting unknown languages as 404.
pub(crate) fn parse_locale(raw: &str) -> Result<Locale, AppError> {
    raw.parse::<Locale>()
        .map_err(|_| AppError::NotFound(format!("no such page: /{raw}")))
}

/// Shared chrome data for every page template.
#[derive(Clone)]
pub struct BaseView {
    pub locale: String,
    pub dir: String,
    pub title: String,
    pub nav_home: String,
    pub nav_shop: String,
    pub nav_events: String,
    pub nav_synagogues: String,
    pub nav_leadership: String,
    pub nav_education: String,
    pub nav_donate: String,
    pub nav_cart: String,
    pub cart_count: u32,
}

impl BaseView {
    /// Assemble the chrome for one request.
    pub async fn build(state: &AppState, session: &Session, locale: Locale, title: &str) -> Self {
        let messages = state.messages();
        let cart = crate::cart::session::load(session).await;
        Self {
            locale: locale.to_string(),
            dir: locale.dir().to_string(),
            title: title.to_string(),
            nav_home: messages.lookup(locale, "nav.home").to_string(),
            nav_shop: messages.lookup(locale, "nav.shop").to_string(),
            nav_events: messages.lookup(locale, "nav.events").to_string(),
            nav_synagogues: messages.lookup(locale, "nav.synagogues").to_string(),
            nav_leadership: messages.lookup(locale, "nav.leadership").to_string(),
            nav_education: messages.lookup(locale, "nav.education").to_string(),
            nav_donate: messages.lookup(locale, "nav.donate").to_string(),
            nav_cart: messages.lookup(locale, "nav.cart").to_string(),
            cart_count: cart.item_count(),
        }
    }
}
