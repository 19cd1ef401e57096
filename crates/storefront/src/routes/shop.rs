//! Shop route handlers: product listing, search, and product detail.

use askama::Template;
use askama_web::WebTemplate;
use crate::filters;
use axum::extract::{Path, Query, State};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use kehillah_core::Locale;

use crate::cart;
use crate::error::{AppError, Result};
use crate::sanity::portable_text;
use crate::sanity::types::{Product, ProductCategory};
use crate::state::AppState;

use super::{BaseView, parse_locale};

/// Product card display data for listing templates.
#[derive(Clone)]
pub struct ProductCardView {
    pub slug: String,
    pub name: String,
    pub price: String,
    pub image: Option<String>,
    pub kashrut: Option<&'static str>,
    pub in_stock: bool,
}

impl ProductCardView {
    pub(crate) fn build(product: &Product, locale: Locale, state: &AppState) -> Self {
        let image = product
            .images
            .first()
            .and_then(|img| state.images().url_with_width(&img.asset, 480).ok());
        Self {
            slug: product.slug.current.clone(),
            name: product.name.resolve_or_empty(locale).to_string(),
            price: product.price.to_string(),
            image,
            kashrut: product.kashrut.map(crate::sanity::types::KashrutCertification::label),
            in_stock: product.in_stock,
        }
    }
}

/// Category filter display data.
#[derive(Clone)]
pub struct CategoryView {
    pub slug: String,
    pub name: String,
    pub active: bool,
}

impl CategoryView {
    fn build(category: &ProductCategory, locale: Locale, selected: Option<&str>) -> Self {
        Self {
            slug: category.slug.current.clone(),
            name: category.name.resolve_or_empty(locale).to_string(),
            active: selected == Some(category.slug.current.as_str()),
        }
    }
}

/// Shop listing query parameters.
#[derive(Debug, Deserialize)]
pub struct ShopQuery {
    pub category: Option<String>,
    pub q: Option<String>,
}

/// Shop index template.
#[derive(Template, WebTemplate)]
#[template(path = "shop/index.html")]
pub struct ShopIndexTemplate {
    pub base: BaseView,
    pub products: Vec<ProductCardView>,
    pub categories: Vec<CategoryView>,
    pub search_query: String,
    pub empty_message: String,
    pub label_all: String,
    pub label_search: String,
}

/// Product detail template.
#[derive(Template, WebTemplate)]
#[template(path = "shop/product.html")]
pub struct ProductTemplate {
    pub base: BaseView,
    pub slug: String,
    pub name: String,
    pub price: String,
    pub description_html: String,
    pub image: Option<String>,
    pub kashrut: Option<&'static str>,
    pub sku: Option<String>,
    pub in_stock: bool,
    pub in_cart: u32,
    pub label_add_to_cart: String,
    pub label_out_of_stock: String,
    pub label_in_cart: String,
}

/// Product listing, filtered by category or search term.
#[instrument(skip(state, session))]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    Path(locale): Path<String>,
    Query(query): Query<ShopQuery>,
) -> Result<ShopIndexTemplate> {
    let locale = parse_locale(&locale)?;

    let search_query = query.q.unwrap_or_default();
    let products = if !search_query.trim().is_empty() {
        state.sanity().search_products(&search_query).await?
    } else if let Some(category) = query.category.as_deref() {
        state.sanity().products_by_category(category).await?
    } else {
        state.sanity().all_products().await?
    };

    let categories = state.sanity().all_categories().await?;
    let base = BaseView::build(
        &state,
        &session,
        locale,
        state.messages().lookup(locale, "shop.title"),
    )
    .await;

    Ok(ShopIndexTemplate {
        products: products
            .iter()
            .map(|p| ProductCardView::build(p, locale, &state))
            .collect(),
        categories: categories
            .iter()
            .map(|c| CategoryView::build(c, locale, query.category.as_deref()))
            .collect(),
        empty_message: state.messages().lookup(locale, "shop.empty").to_string(),
        label_all: state.messages().lookup(locale, "shop.all").to_string(),
        label_search: state.messages().lookup(locale, "shop.search").to_string(),
        search_query,
        base,
    })
}

/// Product detail page.
#[instrument(skip(state, session))]
pub async fn product(
    State(state): State<AppState>,
    session: Session,
    Path((locale, slug)): Path<(String, String)>,
) -> Result<ProductTemplate> {
    let locale = parse_locale(&locale)?;

    let product = state
        .sanity()
        .product_by_slug(&slug)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product: {slug}")))?;

    let name = product.name.resolve_or_empty(locale).to_string();
    let description_html = product
        .description
        .as_ref()
        .and_then(|content| content.resolve(locale))
        .map(portable_text::render)
        .unwrap_or_default();
    let image = product
        .images
        .first()
        .and_then(|img| state.images().url_with_width(&img.asset, 960).ok());

    let shopping_cart = cart::session::load(&session).await;
    let base = BaseView::build(&state, &session, locale, &name).await;

    Ok(ProductTemplate {
        base,
        slug: product.slug.current.clone(),
        name,
        price: product.price.to_string(),
        description_html,
        image,
        kashrut: product.kashrut.map(crate::sanity::types::KashrutCertification::label),
        sku: product.sku.clone(),
        in_stock: product.in_stock,
        in_cart: shopping_cart.item_quantity(&product.id),
        label_add_to_cart: state.messages().lookup(locale, "shop.add_to_cart").to_string(),
        label_out_of_stock: state.messages().lookup(locale, "shop.out_of_stock").to_string(),
        label_in_cart: state.messages().lookup(locale, "shop.in_cart").to_string(),
    })
}
