//! Generic CMS content pages, matched last in the router so that every
//! `/{locale}/{slug}` not claimed by a dedicated section falls through to
//! the CMS.

use askama::Template;
use askama_web::WebTemplate;
use crate::filters;
use axum::extract::{Path, State};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::sanity::portable_text;
use crate::state::AppState;

use super::{BaseView, parse_locale};

/// CMS page template.
#[derive(Template, WebTemplate)]
#[template(path = "page.html")]
pub struct PageTemplate {
    pub base: BaseView,
    pub heading: String,
    pub excerpt: Option<String>,
    pub image: Option<String>,
    pub content_html: String,
}

/// Path parameters for a content page.
#[derive(Debug, Deserialize)]
pub struct PagePath {
    pub locale: String,
    pub slug: String,
}

/// Display a CMS content page by slug.
#[instrument(skip(state, session))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    Path(path): Path<PagePath>,
) -> Result<PageTemplate> {
    let locale = parse_locale(&path.locale)?;
    let page = state
        .sanity()
        .page_by_slug(&path.slug)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("no such page: {}", path.slug)))?;

    let content_html = page
        .content
        .as_ref()
        .and_then(|content| content.resolve(locale))
        .map(portable_text::render)
        .unwrap_or_default();

    let heading = page.title.resolve_or_empty(locale).to_string();
    let base = BaseView::build(&state, &session, locale, &heading).await;
    Ok(PageTemplate {
        base,
        heading,
        excerpt: page
            .excerpt
            .as_ref()
            .and_then(|e| e.resolve(locale))
            .map(ToString::to_string),
        image: page
            .main_image
            .as_ref()
            .and_then(|img| state.images().url_with_width(&img.asset, 960).ok()),
        content_html,
    })
}
