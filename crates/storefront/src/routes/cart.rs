//! Cart route handlers.
//!
//! Cart operations use HTMX for dynamic updates without full page reloads.
//! The cart itself lives in the session; every mutation loads it, applies
//! one store operation, and persists it back.
//!
//! The checkout flow here is local-only: it never contacts a payment
//! backend. Placing an order clears the cart and shows a confirmation page
//! (orders are settled in person on collection).

use askama::Template;
use askama_web::WebTemplate;
use crate::filters;
use axum::{
    Form,
    extract::{Path, State},
    http::StatusCode,
    response::{AppendHeaders, Html, IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use kehillah_core::{DocumentId, Locale, Money};

use crate::cart::{Cart, FREE_SHIPPING_THRESHOLD, session};
use crate::error::Result;
use crate::i18n::Messages;
use crate::state::AppState;

use super::{BaseView, parse_locale};

/// Cart item display data for templates.
#[derive(Clone)]
pub struct CartItemView {
    pub product_id: String,
    pub slug: String,
    pub name: String,
    pub quantity: u32,
    pub price: String,
    pub line_price: String,
    pub image: Option<String>,
}

/// Cart display data for templates, shared by the page and the HTMX
/// fragment.
#[derive(Clone)]
pub struct CartView {
    pub locale: String,
    pub items: Vec<CartItemView>,
    pub subtotal: String,
    pub shipping: String,
    pub shipping_is_free: bool,
    pub total: String,
    pub item_count: u32,
    /// Amount still needed for free shipping, when below the threshold.
    pub free_shipping_gap: Option<String>,
    // Labels resolved for the request locale.
    pub label_subtotal: String,
    pub label_shipping: String,
    pub label_shipping_free: String,
    pub label_total: String,
    pub label_remove: String,
    pub label_checkout: String,
    pub label_empty: String,
}

impl CartView {
    fn build(cart: &Cart, locale: Locale, state: &AppState) -> Self {
        let messages = state.messages();
        let subtotal = cart.subtotal();
        let shipping = cart.shipping();

        let items = cart
            .lines()
            .iter()
            .map(|line| CartItemView {
                product_id: line.product.id.to_string(),
                slug: line.product.slug.current.clone(),
                name: line.product.name.resolve_or_empty(locale).to_string(),
                quantity: line.quantity,
                price: line.product.price.to_string(),
                line_price: line.line_price().to_string(),
                image: line
                    .product
                    .images
                    .first()
                    .and_then(|img| state.images().url_with_width(&img.asset, 160).ok()),
            })
            .collect();

        let free_shipping_gap = (!subtotal.is_zero() && subtotal < FREE_SHIPPING_THRESHOLD)
            .then(|| {
                let gap = Money::from_cents(FREE_SHIPPING_THRESHOLD.cents() - subtotal.cents());
                messages
                    .lookup(locale, "cart.free_shipping_gap")
                    .replace("{amount}", &gap.to_string())
            });

        Self {
            locale: locale.to_string(),
            items,
            subtotal: subtotal.to_string(),
            shipping: shipping.to_string(),
            shipping_is_free: shipping.is_zero() && !subtotal.is_zero(),
            total: cart.total().to_string(),
            item_count: cart.item_count(),
            free_shipping_gap,
            label_subtotal: lookup(messages, locale, "cart.subtotal"),
            label_shipping: lookup(messages, locale, "cart.shipping"),
            label_shipping_free: lookup(messages, locale, "cart.shipping_free"),
            label_total: lookup(messages, locale, "cart.total"),
            label_remove: lookup(messages, locale, "cart.remove"),
            label_checkout: lookup(messages, locale, "cart.checkout"),
            label_empty: lookup(messages, locale, "cart.empty"),
        }
    }
}

fn lookup(messages: &Messages, locale: Locale, key: &str) -> String {
    messages.lookup(locale, key).to_string()
}

// =============================================================================
// Forms
// =============================================================================

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub slug: String,
    pub quantity: Option<u32>,
}

/// Update cart form data. Quantity is signed so that zero-or-below maps to
/// removal, matching the store contract.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub product_id: String,
    pub quantity: i64,
}

/// Remove from cart form data.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub product_id: String,
}

/// Demo checkout form data; logged, never charged.
#[derive(Debug, Deserialize)]
pub struct CheckoutForm {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
}

// =============================================================================
// Templates
// =============================================================================

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub base: BaseView,
    pub cart: CartView,
}

/// Cart items fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_items.html")]
pub struct CartItemsTemplate {
    pub cart: CartView,
}

/// Cart count badge fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub count: u32,
}

/// Checkout form template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/show.html")]
pub struct CheckoutTemplate {
    pub base: BaseView,
    pub cart: CartView,
    pub label_name: String,
    pub label_email: String,
    pub label_phone: String,
    pub label_place_order: String,
}

/// Checkout success template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/success.html")]
pub struct CheckoutSuccessTemplate {
    pub base: BaseView,
    pub heading: String,
    pub message: String,
}

// =============================================================================
// Handlers
// =============================================================================

/// Display cart page.
#[instrument(skip(state, session))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    Path(locale): Path<String>,
) -> Result<CartShowTemplate> {
    let locale = parse_locale(&locale)?;
    let cart = session::load(&session).await;
    let view = CartView::build(&cart, locale, &state);
    let base = BaseView::build(
        &state,
        &session,
        locale,
        state.messages().lookup(locale, "cart.title"),
    )
    .await;
    Ok(CartShowTemplate { base, cart: view })
}

/// Add item to cart (HTMX).
///
/// Fetches the product snapshot by slug and adds it to the session cart.
/// Returns an HTMX trigger to update the cart count badge.
#[instrument(skip(state, session))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    Path(locale): Path<String>,
    Form(form): Form<AddToCartForm>,
) -> Response {
    let Ok(locale) = parse_locale(&locale) else {
        return StatusCode::NOT_FOUND.into_response();
    };

    let product = match state.sanity().product_by_slug(&form.slug).await {
        Ok(Some(product)) => product,
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Html("<span class=\"cart-error\">Product not found</span>"),
            )
                .into_response();
        }
        Err(e) => {
            tracing::error!("Failed to fetch product {}: {e}", form.slug);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Html(format!(
                    "<span class=\"cart-error\">{}</span>",
                    state.messages().lookup(locale, "cart.add_failed")
                )),
            )
                .into_response();
        }
    };

    let mut cart = session::load(&session).await;
    cart.add_item(product, form.quantity.unwrap_or(1));
    session::save(&session, &cart).await;

    (
        AppendHeaders([("HX-Trigger", "cart-updated")]),
        CartCountTemplate {
            count: cart.item_count(),
        },
    )
        .into_response()
}

/// Update cart item quantity (HTMX).
#[instrument(skip(state, session))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    Path(locale): Path<String>,
    Form(form): Form<UpdateCartForm>,
) -> Response {
    let Ok(locale) = parse_locale(&locale) else {
        return StatusCode::NOT_FOUND.into_response();
    };

    let mut cart = session::load(&session).await;
    cart.update_quantity(&DocumentId::new(form.product_id), form.quantity);
    session::save(&session, &cart).await;

    (
        AppendHeaders([("HX-Trigger", "cart-updated")]),
        CartItemsTemplate {
            cart: CartView::build(&cart, locale, &state),
        },
    )
        .into_response()
}

/// Remove item from cart (HTMX).
#[instrument(skip(state, session))]
pub async fn remove(
    State(state): State<AppState>,
    session: Session,
    Path(locale): Path<String>,
    Form(form): Form<RemoveFromCartForm>,
) -> Response {
    let Ok(locale) = parse_locale(&locale) else {
        return StatusCode::NOT_FOUND.into_response();
    };

    let mut cart = session::load(&session).await;
    cart.remove_item(&DocumentId::new(form.product_id));
    session::save(&session, &cart).await;

    (
        AppendHeaders([("HX-Trigger", "cart-updated")]),
        CartItemsTemplate {
            cart: CartView::build(&cart, locale, &state),
        },
    )
        .into_response()
}

/// Get cart count badge (HTMX).
#[instrument(skip(session))]
pub async fn count(session: Session, Path(_locale): Path<String>) -> impl IntoResponse {
    let cart = session::load(&session).await;
    CartCountTemplate {
        count: cart.item_count(),
    }
}

/// Checkout form page.
#[instrument(skip(state, session))]
pub async fn checkout_form(
    State(state): State<AppState>,
    session: Session,
    Path(locale): Path<String>,
) -> Result<Response> {
    let locale = parse_locale(&locale)?;
    let cart = session::load(&session).await;
    if cart.is_empty() {
        return Ok(Redirect::to(&format!("/{locale}/shop/cart")).into_response());
    }

    let messages = state.messages();
    let view = CartView::build(&cart, locale, &state);
    let base = BaseView::build(&state, &session, locale, messages.lookup(locale, "checkout.title")).await;

    Ok(CheckoutTemplate {
        base,
        cart: view,
        label_name: lookup(messages, locale, "checkout.name"),
        label_email: lookup(messages, locale, "checkout.email"),
        label_phone: lookup(messages, locale, "checkout.phone"),
        label_place_order: lookup(messages, locale, "checkout.place_order"),
    }
    .into_response())
}

/// Place the order: log it, clear the cart, redirect to the confirmation.
#[instrument(skip(session, form))]
pub async fn checkout_submit(
    session: Session,
    Path(locale): Path<String>,
    Form(form): Form<CheckoutForm>,
) -> Result<Redirect> {
    let locale = parse_locale(&locale)?;

    let mut cart = session::load(&session).await;
    if cart.is_empty() {
        return Ok(Redirect::to(&format!("/{locale}/shop/cart")));
    }

    tracing::info!(
        customer = %form.name,
        email = %form.email,
        items = cart.item_count(),
        total = %cart.total(),
        "Order placed for collection"
    );

    cart.clear();
    session::save(&session, &cart).await;

    Ok(Redirect::to(&format!("/{locale}/shop/checkout/success")))
}

/// Order confirmation page.
#[instrument(skip(state, session))]
pub async fn checkout_success(
    State(state): State<AppState>,
    session: Session,
    Path(locale): Path<String>,
) -> Result<CheckoutSuccessTemplate> {
    let locale = parse_locale(&locale)?;
    let messages = state.messages();
    let base = BaseView::build(
        &state,
        &session,
        locale,
        messages.lookup(locale, "checkout.success_title"),
    )
    .await;
    Ok(CheckoutSuccessTemplate {
        base,
        heading: lookup(messages, locale, "checkout.success_title"),
        message: lookup(messages, locale, "checkout.success_message"),
    })
}
