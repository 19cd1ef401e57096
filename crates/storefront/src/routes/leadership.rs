//! Leadership route handlers: community leaders grouped by category, with
//! per-person biography pages.

use askama::Template;
use askama_web::WebTemplate;
use crate::filters;
use axum::extract::{Path, State};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use kehillah_core::Locale;

use crate::error::{AppError, Result};
use crate::sanity::portable_text;
use crate::sanity::types::{Person, PersonCategory};
use crate::state::AppState;

use super::{BaseView, parse_locale};

/// Person display data for templates.
pub struct PersonView {
    pub slug: String,
    pub name: String,
    pub role: Option<String>,
    pub photo: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl PersonView {
    pub(crate) fn build(person: &Person, locale: Locale, state: &AppState) -> Self {
        Self {
            slug: person.slug.current.clone(),
            name: person.name.clone(),
            role: person
                .role
                .as_ref()
                .and_then(|r| r.resolve(locale))
                .map(ToString::to_string),
            photo: person
                .photo
                .as_ref()
                .and_then(|img| state.images().url_with_width(&img.asset, 320).ok()),
            email: person.email.clone(),
            phone: person.phone.clone(),
        }
    }
}

/// One category section on the listing page.
pub struct LeadershipGroup {
    pub heading: String,
    pub people: Vec<PersonView>,
}

/// Group people by category in the site's fixed category order, dropping
/// empty categories. The input keeps the CMS ordering (explicit order first,
/// then name) within each group.
pub(crate) fn group_by_category<T>(
    people: &[Person],
    mut view: impl FnMut(&Person) -> T,
    mut heading: impl FnMut(PersonCategory) -> String,
) -> Vec<(PersonCategory, String, Vec<T>)> {
    PersonCategory::ALL
        .into_iter()
        .filter_map(|category| {
            let members: Vec<T> = people
                .iter()
                .filter(|person| person.category == category)
                .map(&mut view)
                .collect();
            (!members.is_empty()).then(|| (category, heading(category), members))
        })
        .collect()
}

/// Leadership listing template.
#[derive(Template, WebTemplate)]
#[template(path = "leadership/index.html")]
pub struct LeadershipIndexTemplate {
    pub base: BaseView,
    pub groups: Vec<LeadershipGroup>,
    pub empty_message: String,
}

/// Person detail template.
#[derive(Template, WebTemplate)]
#[template(path = "leadership/show.html")]
pub struct PersonShowTemplate {
    pub base: BaseView,
    pub person: PersonView,
    pub bio_html: String,
    pub category_heading: String,
}

/// Display community leadership, grouped by category.
#[instrument(skip(state, session))]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    Path(locale): Path<String>,
) -> Result<LeadershipIndexTemplate> {
    let locale = parse_locale(&locale)?;
    let people = state.sanity().all_people().await?;
    let messages = state.messages();
    let base = BaseView::build(
        &state,
        &session,
        locale,
        messages.lookup(locale, "leadership.title"),
    )
    .await;

    let groups = group_by_category(
        &people,
        |person| PersonView::build(person, locale, &state),
        |category| messages.lookup(locale, category.message_key()).to_string(),
    )
    .into_iter()
    .map(|(_, heading, people)| LeadershipGroup { heading, people })
    .collect();

    Ok(LeadershipIndexTemplate {
        base,
        groups,
        empty_message: messages.lookup(locale, "leadership.empty").to_string(),
    })
}

/// Path parameters for the person detail page.
#[derive(Debug, Deserialize)]
pub struct PersonPath {
    pub locale: String,
    pub slug: String,
}

/// Display one person's biography.
#[instrument(skip(state, session))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    Path(path): Path<PersonPath>,
) -> Result<PersonShowTemplate> {
    let locale = parse_locale(&path.locale)?;
    let person = state
        .sanity()
        .person_by_slug(&path.slug)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("no such person: {}", path.slug)))?;

    let bio_html = person
        .bio
        .as_ref()
        .and_then(|content| content.resolve(locale))
        .map(portable_text::render)
        .unwrap_or_default();

    let messages = state.messages();
    let view = PersonView::build(&person, locale, &state);
    let base = BaseView::build(&state, &session, locale, &view.name).await;
    Ok(PersonShowTemplate {
        base,
        person: view,
        bio_html,
        category_heading: messages
            .lookup(locale, person.category.message_key())
            .to_string(),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use kehillah_core::DocumentId;

    use super::*;
    use crate::sanity::types::Slug;

    fn person(name: &str, category: PersonCategory, order: i64) -> Person {
        Person {
            id: DocumentId::new(name),
            name: name.to_string(),
            slug: Slug {
                current: name.to_lowercase(),
            },
            role: None,
            category,
            photo: None,
            bio: None,
            email: None,
            phone: None,
            order: Some(order),
        }
    }

    #[test]
    fn groups_follow_category_order_and_skip_empty_ones() {
        // No staff entries; clergy and board out of input order.
        let people = [
            person("Board Member", PersonCategory::Board, 1),
            person("Rabbi", PersonCategory::Clergy, 1),
            person("Educator", PersonCategory::Educator, 1),
        ];

        let groups = group_by_category(
            &people,
            |p| p.name.clone(),
            |category| format!("{category:?}"),
        );

        let order: Vec<PersonCategory> = groups.iter().map(|(c, _, _)| *c).collect();
        assert_eq!(
            order,
            [
                PersonCategory::Clergy,
                PersonCategory::Board,
                PersonCategory::Educator,
            ]
        );
    }

    #[test]
    fn grouping_preserves_member_order_within_a_category() {
        let people = [
            person("First", PersonCategory::Clergy, 1),
            person("Second", PersonCategory::Clergy, 2),
        ];

        let groups = group_by_category(&people, |p| p.name.clone(), |_| String::new());
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].2, ["First", "Second"]);
    }
}
