//! Education route handlers: the program listing and per-program detail
//! pages.

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
use crate::sanity::types::EducationProgram;
use crate::state::AppState;

use super::{BaseView, parse_locale};

/// Education program display data for templates.
pub struct ProgramView {
    pub slug: String,
    pub name: String,
    pub program_type: Option<&'static str>,
    pub age_range: Option<String>,
    pub schedule: Option<String>,
    pub image: Option<String>,
    pub contact_name: Option<String>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub registration_link: Option<String>,
}

impl ProgramView {
    pub(crate) fn build(program: &EducationProgram, locale: Locale, state: &AppState) -> Self {
        Self {
            slug: program.slug.current.clone(),
            name: program.name.resolve_or_empty(locale).to_string(),
            program_type: program
                .program_type
                .map(crate::sanity::types::ProgramType::label),
            age_range: program
                .age_range
                .as_ref()
                .and_then(|r| r.resolve(locale))
                .map(ToString::to_string),
            schedule: program
                .schedule
                .as_ref()
                .and_then(|s| s.resolve(locale))
                .map(ToString::to_string),
            image: program
                .main_image
                .as_ref()
                .and_then(|img| state.images().url_with_width(&img.asset, 640).ok()),
            contact_name: program.contact_name.clone(),
            contact_email: program.contact_email.clone(),
            contact_phone: program.contact_phone.clone(),
            registration_link: program.registration_link.clone(),
        }
    }
}

/// Program listing template.
#[derive(Template, WebTemplate)]
#[template(path = "education/index.html")]
pub struct EducationIndexTemplate {
    pub base: BaseView,
    pub programs: Vec<ProgramView>,
    pub empty_message: String,
    pub label_ages: String,
}

/// Program detail template.
#[derive(Template, WebTemplate)]
#[template(path = "education/show.html")]
pub struct ProgramShowTemplate {
    pub base: BaseView,
    pub program: ProgramView,
    pub description_html: String,
    pub label_ages: String,
    pub label_schedule: String,
    pub label_contact: String,
    pub label_register: String,
}

/// Display all education programs.
#[instrument(skip(state, session))]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    Path(locale): Path<String>,
) -> Result<EducationIndexTemplate> {
    let locale = parse_locale(&locale)?;
    let programs = state.sanity().all_education_programs().await?;
    let messages = state.messages();
    let base = BaseView::build(
        &state,
        &session,
        locale,
        messages.lookup(locale, "education.title"),
    )
    .await;
    Ok(EducationIndexTemplate {
        base,
        programs: programs
            .iter()
            .map(|program| ProgramView::build(program, locale, &state))
            .collect(),
        empty_message: messages.lookup(locale, "education.empty").to_string(),
        label_ages: lookup(messages, locale, "education.ages"),
    })
}

/// Path parameters for the program detail page.
#[derive(Debug, Deserialize)]
pub struct ProgramPath {
    pub locale: String,
    pub slug: String,
}

/// Display one education program.
#[instrument(skip(state, session))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    Path(path): Path<ProgramPath>,
) -> Result<ProgramShowTemplate> {
    let locale = parse_locale(&path.locale)?;
    let program = state
        .sanity()
        .education_program_by_slug(&path.slug)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("no such program: {}", path.slug)))?;

    let description_html = program
        .description
        .as_ref()
        .and_then(|content| content.resolve(locale))
        .map(portable_text::render)
        .unwrap_or_default();

    let messages = state.messages();
    let view = ProgramView::build(&program, locale, &state);
    let base = BaseView::build(&state, &session, locale, &view.name).await;
    Ok(ProgramShowTemplate {
        base,
        program: view,
        description_html,
        label_ages: lookup(messages, locale, "education.ages"),
        label_schedule: lookup(messages, locale, "education.schedule"),
        label_contact: lookup(messages, locale, "education.contact"),
        label_register: lookup(messages, locale, "education.register"),
    })
}

fn lookup(messages: &Messages, locale: Locale, key: &str) -> String {
    messages.lookup(locale, key).to_string()
}
