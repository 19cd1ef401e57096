//! Event route handlers: the upcoming-events listing, event detail pages
//! and the RSVP form.
//!
//! RSVPs are local-only, like the shop checkout: a submission is validated,
//! logged and acknowledged, never forwarded to a backend.

use std::sync::LazyLock;

use askama::Template;
use askama_web::WebTemplate;
use crate::filters;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::Redirect,
};
use regex::Regex;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use kehillah_core::Locale;

use crate::error::{AppError, Result};
use crate::sanity::portable_text;
use crate::sanity::types::Event;
use crate::state::AppState;

use super::{BaseView, parse_locale};

/// Largest party size one RSVP may cover.
pub const MAX_RSVP_ATTENDEES: u32 = 20;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("Invalid regex"));

/// Event display data for templates.
pub struct EventView {
    pub slug: String,
    pub name: String,
    pub event_type: Option<&'static str>,
    pub date: String,
    pub end_date: Option<String>,
    pub recurring_schedule: Option<String>,
    pub location: Option<String>,
    pub price: Option<String>,
    pub price_note: Option<String>,
    pub image: Option<String>,
    pub registration_link: Option<String>,
}

impl EventView {
    pub(crate) fn build(event: &Event, locale: Locale, state: &AppState) -> Self {
        let resolve = |value: &Option<kehillah_core::LocaleString>| {
            value
                .as_ref()
                .and_then(|v| v.resolve(locale))
                .map(ToString::to_string)
        };
        Self {
            slug: event.slug.current.clone(),
            name: event.name.resolve_or_empty(locale).to_string(),
            event_type: event.event_type.map(crate::sanity::types::EventType::label),
            date: format_datetime(&event.date),
            end_date: event.end_date.as_ref().map(format_datetime),
            recurring_schedule: resolve(&event.recurring_schedule),
            location: resolve(&event.location),
            price: event.price.map(|p| p.to_string()),
            price_note: resolve(&event.price_note),
            image: event
                .main_image
                .as_ref()
                .and_then(|img| state.images().url_with_width(&img.asset, 640).ok()),
            registration_link: event.registration_link.clone(),
        }
    }
}

// Singapore is UTC+8 year-round; event times are stored in UTC.
fn format_datetime(date: &chrono::DateTime<chrono::Utc>) -> String {
    let formatted = match chrono::FixedOffset::east_opt(8 * 3600) {
        Some(sgt) => date.with_timezone(&sgt).format("%e %B %Y, %H:%M").to_string(),
        None => date.format("%e %B %Y, %H:%M").to_string(),
    };
    formatted.trim_start().to_string()
}

/// Events listing template.
#[derive(Template, WebTemplate)]
#[template(path = "events/index.html")]
pub struct EventsIndexTemplate {
    pub base: BaseView,
    pub events: Vec<EventView>,
    pub empty_message: String,
}

/// Event detail template.
#[derive(Template, WebTemplate)]
#[template(path = "events/show.html")]
pub struct EventShowTemplate {
    pub base: BaseView,
    pub event: EventView,
    pub description_html: String,
    pub label_register: String,
    pub rsvp_confirmed: bool,
    pub label_rsvp_heading: String,
    pub label_rsvp_name: String,
    pub label_rsvp_email: String,
    pub label_rsvp_phone: String,
    pub label_rsvp_attendees: String,
    pub label_rsvp_submit: String,
    pub rsvp_success_message: String,
}

/// Display upcoming events.
#[instrument(skip(state, session))]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    Path(locale): Path<String>,
) -> Result<EventsIndexTemplate> {
    let locale = parse_locale(&locale)?;
    let events = state.sanity().upcoming_events().await?;
    let messages = state.messages();
    let base = BaseView::build(&state, &session, locale, messages.lookup(locale, "events.title")).await;
    Ok(EventsIndexTemplate {
        base,
        events: events
            .iter()
            .map(|event| EventView::build(event, locale, &state))
            .collect(),
        empty_message: messages.lookup(locale, "events.empty").to_string(),
    })
}

/// Path parameters for the event detail page.
#[derive(Debug, Deserialize)]
pub struct EventPath {
    pub locale: String,
    pub slug: String,
}

/// Query parameters for the event detail page.
#[derive(Debug, Default, Deserialize)]
pub struct EventShowQuery {
    /// Set after a successful RSVP redirect.
    pub rsvp: Option<String>,
}

/// Display one event.
#[instrument(skip(state, session))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    Path(path): Path<EventPath>,
    Query(query): Query<EventShowQuery>,
) -> Result<EventShowTemplate> {
    let locale = parse_locale(&path.locale)?;
    let event = state
        .sanity()
        .event_by_slug(&path.slug)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("no such event: {}", path.slug)))?;

    let description_html = event
        .description
        .as_ref()
        .and_then(|content| content.resolve(locale))
        .map(portable_text::render)
        .unwrap_or_default();

    let messages = state.messages();
    let lookup = |key: &str| messages.lookup(locale, key).to_string();
    let view = EventView::build(&event, locale, &state);
    let base = BaseView::build(&state, &session, locale, &view.name).await;
    Ok(EventShowTemplate {
        base,
        event: view,
        description_html,
        label_register: lookup("events.register"),
        rsvp_confirmed: query.rsvp.as_deref() == Some("ok"),
        label_rsvp_heading: lookup("events.rsvp.heading"),
        label_rsvp_name: lookup("events.rsvp.name"),
        label_rsvp_email: lookup("events.rsvp.email"),
        label_rsvp_phone: lookup("events.rsvp.phone"),
        label_rsvp_attendees: lookup("events.rsvp.attendees"),
        label_rsvp_submit: lookup("events.rsvp.submit"),
        rsvp_success_message: lookup("events.rsvp.success"),
    })
}

/// RSVP form data; logged, never forwarded.
#[derive(Debug, Deserialize)]
pub struct RsvpForm {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub attendees: u32,
}

/// Whether an RSVP submission is acceptable: a non-blank name, a plausible
/// email address and a party size between one and [`MAX_RSVP_ATTENDEES`].
pub fn validate_rsvp(form: &RsvpForm) -> bool {
    !form.name.trim().is_empty()
        && EMAIL_RE.is_match(form.email.trim())
        && (1..=MAX_RSVP_ATTENDEES).contains(&form.attendees)
}

/// Record an RSVP: log it and redirect back to the event with a
/// confirmation. Invalid submissions redirect back without one; the form's
/// own constraints catch them before they reach the server in normal use.
#[instrument(skip(state, form))]
pub async fn rsvp(
    State(state): State<AppState>,
    Path(path): Path<EventPath>,
    Form(form): Form<RsvpForm>,
) -> Result<Redirect> {
    let locale = parse_locale(&path.locale)?;
    let event_url = format!("/{locale}/events/{}", path.slug);

    if !validate_rsvp(&form) {
        return Ok(Redirect::to(&event_url));
    }

    // The event must exist for the confirmation to mean anything.
    state
        .sanity()
        .event_by_slug(&path.slug)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("no such event: {}", path.slug)))?;

    tracing::info!(
        event = %path.slug,
        guest = %form.name,
        email = %form.email,
        attendees = form.attendees,
        "RSVP received"
    );

    Ok(Redirect::to(&format!("{event_url}?rsvp=ok")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rsvp(name: &str, email: &str, attendees: u32) -> RsvpForm {
        RsvpForm {
            name: name.to_string(),
            email: email.to_string(),
            phone: None,
            attendees,
        }
    }

    #[test]
    fn accepts_a_complete_submission() {
        assert!(validate_rsvp(&rsvp("Sarah Cohen", "sarah@example.com", 4)));
    }

    #[test]
    fn rejects_blank_names() {
        assert!(!validate_rsvp(&rsvp("   ", "sarah@example.com", 1)));
    }

    #[test]
    fn rejects_implausible_emails() {
        for email in ["", "no-at-sign", "two@@example.com ok", "name@nodot"] {
            assert!(!validate_rsvp(&rsvp("Sarah", email, 1)), "email {email:?}");
        }
    }

    #[test]
    fn rejects_party_sizes_outside_the_range() {
        assert!(!validate_rsvp(&rsvp("Sarah", "sarah@example.com", 0)));
        assert!(!validate_rsvp(&rsvp(
            "Sarah",
            "sarah@example.com",
            MAX_RSVP_ATTENDEES + 1
        )));
        assert!(validate_rsvp(&rsvp(
            "Sarah",
            "sarah@example.com",
            MAX_RSVP_ATTENDEES
        )));
    }
}
