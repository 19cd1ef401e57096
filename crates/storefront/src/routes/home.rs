//! Home page: site settings, featured products and the next few events.

use askama::Template;
use askama_web::WebTemplate;
use crate::filters;
use axum::extract::{Path, State};
use tower_sessions::Session;
use tracing::instrument;

use crate::error::Result;
use crate::routes::events::EventView;
use crate::routes::shop::ProductCardView;
use crate::state::AppState;

use super::{BaseView, parse_locale};

/// Shabbat times display data.
pub struct ShabbatView {
    pub candle_lighting: Option<String>,
    pub havdalah: Option<String>,
    pub parasha: Option<String>,
}

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub base: BaseView,
    pub heading: String,
    pub tagline: Option<String>,
    pub featured: Vec<ProductCardView>,
    pub events: Vec<EventView>,
    pub shabbat: Option<ShabbatView>,
    pub label_featured: String,
    pub label_events: String,
    pub label_shabbat: String,
    pub label_candle_lighting: String,
    pub label_havdalah: String,
}

/// Display the home page.
#[instrument(skip(state, session))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    Path(locale): Path<String>,
) -> Result<HomeTemplate> {
    let locale = parse_locale(&locale)?;
    let messages = state.messages();

    let (settings, featured, events) = tokio::join!(
        state.sanity().site_settings(),
        state.sanity().featured_products(),
        state.sanity().upcoming_events(),
    );
    let settings = settings?;
    let featured = featured?;
    let events = events?;

    let heading = settings
        .site_title
        .as_ref()
        .map(|title| title.resolve_or_empty(locale).to_string())
        .filter(|title| !title.is_empty())
        .unwrap_or_else(|| messages.lookup(locale, "home.title").to_string());
    let tagline = settings
        .site_description
        .as_ref()
        .and_then(|d| d.resolve(locale))
        .map(ToString::to_string);

    let shabbat = settings.shabbat_times.as_ref().map(|times| ShabbatView {
        candle_lighting: times.candle_lighting.clone(),
        havdalah: times.havdalah.clone(),
        parasha: times
            .parasha
            .as_ref()
            .and_then(|p| p.resolve(locale))
            .map(ToString::to_string),
    });

    let base = BaseView::build(&state, &session, locale, &heading).await;
    Ok(HomeTemplate {
        base,
        heading,
        tagline,
        featured: featured
            .iter()
            .map(|product| ProductCardView::build(product, locale, &state))
            .collect(),
        events: events
            .iter()
            .take(3)
            .map(|event| EventView::build(event, locale, &state))
            .collect(),
        shabbat,
        label_featured: messages.lookup(locale, "home.featured").to_string(),
        label_events: messages.lookup(locale, "home.events").to_string(),
        label_shabbat: messages.lookup(locale, "home.shabbat").to_string(),
        label_candle_lighting: messages.lookup(locale, "home.candle_lighting").to_string(),
        label_havdalah: messages.lookup(locale, "home.havdalah").to_string(),
    })
}
