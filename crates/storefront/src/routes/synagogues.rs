//! Synagogue route handlers: the congregation listing and per-synagogue
//! detail pages with service schedules.

use askama::Template;
use askama_web::WebTemplate;
use crate::filters;
use axum::extract::{Path, State};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use kehillah_core::Locale;

use crate::error::{AppError, Result};
use crate::i18n::Messages;
use crate::sanity::portable_text;
use crate::sanity::types::{ServiceTime, Synagogue};
use crate::state::AppState;

use super::{BaseView, parse_locale};

/// Synagogue display data for templates.
pub struct SynagogueView {
    pub slug: String,
    pub name: String,
    pub meaning_of_name: Option<String>,
    pub established: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub address: Option<String>,
    pub service_times: Vec<ServiceTimeView>,
    pub features: Vec<String>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
}

/// One service schedule row.
pub struct ServiceTimeView {
    pub day: Option<&'static str>,
    pub time: Option<String>,
    pub service: Option<String>,
    pub notes: Option<String>,
}

/// A gallery image with its resolved caption.
pub struct GalleryImageView {
    pub url: String,
    pub caption: Option<String>,
}

impl SynagogueView {
    pub(crate) fn build(synagogue: &Synagogue, locale: Locale, state: &AppState) -> Self {
        let messages = state.messages();
        let resolve = |value: &Option<kehillah_core::LocaleString>| {
            value
                .as_ref()
                .and_then(|v| v.resolve(locale))
                .map(ToString::to_string)
        };
        Self {
            slug: synagogue.slug.current.clone(),
            name: synagogue.name.resolve_or_empty(locale).to_string(),
            meaning_of_name: resolve(&synagogue.meaning_of_name),
            established: synagogue.year_established.map(|year| {
                messages
                    .lookup(locale, "synagogues.established")
                    .replace("{year}", &year.to_string())
            }),
            description: synagogue
                .description
                .as_ref()
                .and_then(|d| d.resolve(locale))
                .map(ToString::to_string),
            image: synagogue
                .main_image
                .as_ref()
                .and_then(|img| state.images().url_with_width(&img.asset, 640).ok()),
            address: synagogue
                .address
                .as_ref()
                .map(crate::sanity::types::Address::display)
                .filter(|a| !a.is_empty()),
            service_times: synagogue
                .service_times
                .iter()
                .map(|slot| ServiceTimeView::build(slot, locale))
                .collect(),
            features: synagogue
                .features
                .iter()
                .map(|f| f.resolve_or_empty(locale).to_string())
                .collect(),
            contact_email: synagogue.contact_email.clone(),
            contact_phone: synagogue.contact_phone.clone(),
        }
    }
}

impl ServiceTimeView {
    fn build(slot: &ServiceTime, locale: Locale) -> Self {
        let resolve = |value: &Option<kehillah_core::LocaleString>| {
            value
                .as_ref()
                .and_then(|v| v.resolve(locale))
                .map(ToString::to_string)
        };
        Self {
            day: slot.day.map(crate::sanity::types::ServiceDay::label),
            time: slot.time.clone(),
            service: resolve(&slot.service),
            notes: resolve(&slot.notes),
        }
    }
}

/// Synagogue listing template.
#[derive(Template, WebTemplate)]
#[template(path = "synagogues/index.html")]
pub struct SynagoguesIndexTemplate {
    pub base: BaseView,
    pub synagogues: Vec<SynagogueView>,
    pub empty_message: String,
}

/// Synagogue detail template.
#[derive(Template, WebTemplate)]
#[template(path = "synagogues/show.html")]
pub struct SynagogueShowTemplate {
    pub base: BaseView,
    pub synagogue: SynagogueView,
    pub history_html: String,
    pub gallery: Vec<GalleryImageView>,
    pub label_services: String,
    pub label_features: String,
    pub label_contact: String,
}

/// Display all synagogues, oldest congregation first.
#[instrument(skip(state, session))]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    Path(locale): Path<String>,
) -> Result<SynagoguesIndexTemplate> {
    let locale = parse_locale(&locale)?;
    let synagogues = state.sanity().all_synagogues().await?;
    let messages = state.messages();
    let base = BaseView::build(
        &state,
        &session,
        locale,
        messages.lookup(locale, "synagogues.title"),
    )
    .await;
    Ok(SynagoguesIndexTemplate {
        base,
        synagogues: synagogues
            .iter()
            .map(|synagogue| SynagogueView::build(synagogue, locale, &state))
            .collect(),
        empty_message: messages.lookup(locale, "synagogues.empty").to_string(),
    })
}

/// Path parameters for the synagogue detail page.
#[derive(Debug, Deserialize)]
pub struct SynagoguePath {
    pub locale: String,
    pub slug: String,
}

/// Display one synagogue.
#[instrument(skip(state, session))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    Path(path): Path<SynagoguePath>,
) -> Result<SynagogueShowTemplate> {
    let locale = parse_locale(&path.locale)?;
    let synagogue = state
        .sanity()
        .synagogue_by_slug(&path.slug)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("no such synagogue: {}", path.slug)))?;

    let history_html = synagogue
        .history
        .as_ref()
        .and_then(|content| content.resolve(locale))
        .map(portable_text::render)
        .unwrap_or_default();

    let gallery = synagogue
        .gallery
        .iter()
        .filter_map(|img| {
            let url = state.images().url_with_width(&img.asset, 960).ok()?;
            Some(GalleryImageView {
                url,
                caption: img
                    .caption
                    .as_ref()
                    .and_then(|c| c.resolve(locale))
                    .map(ToString::to_string),
            })
        })
        .collect();

    let messages = state.messages();
    let view = SynagogueView::build(&synagogue, locale, &state);
    let base = BaseView::build(&state, &session, locale, &view.name).await;
    Ok(SynagogueShowTemplate {
        base,
        synagogue: view,
        history_html,
        gallery,
        label_services: lookup(messages, locale, "synagogues.services"),
        label_features: lookup(messages, locale, "synagogues.features"),
        label_contact: lookup(messages, locale, "synagogues.contact"),
    })
}

fn lookup(messages: &Messages, locale: Locale, key: &str) -> String {
    messages.lookup(locale, key).to_string()
}
