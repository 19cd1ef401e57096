//! Typed GROQ queries for the documents the site renders.
//!
//! Query text lives here so route handlers only deal in typed documents.
//! All reads go through the client's 5-minute cache except product search,
//! which is keyed by arbitrary user input.

use chrono::Utc;
use serde_json::json;

use super::types::{
    EducationProgram, Event, Page, Person, Product, ProductCategory, SiteSettings, Synagogue,
};
use super::{SanityClient, SanityError};

const PRODUCT_FIELDS: &str = r"
  _id,
  name,
  slug,
  description,
  price,
  category->{_id, name, slug, description, image, order},
  kashrut,
  images,
  sku,
  inStock,
  featured
";

const PAGE_FIELDS: &str = r"
  _id,
  title,
  slug,
  excerpt,
  mainImage,
  content
";

const EVENT_FIELDS: &str = r"
  _id,
  name,
  slug,
  eventType,
  description,
  date,
  endDate,
  isRecurring,
  recurringSchedule,
  location,
  price,
  priceNote,
  mainImage,
  registrationLink
";

const SYNAGOGUE_FIELDS: &str = r"
  _id,
  name,
  slug,
  meaningOfName,
  yearEstablished,
  mainImage,
  gallery,
  description,
  history,
  address,
  serviceTimes,
  features,
  contactEmail,
  contactPhone
";

const PERSON_FIELDS: &str = r"
  _id,
  name,
  slug,
  role,
  category,
  photo,
  bio,
  email,
  phone,
  order
";

const PROGRAM_FIELDS: &str = r"
  _id,
  name,
  slug,
  type,
  ageRange,
  mainImage,
  description,
  schedule,
  contactName,
  contactEmail,
  contactPhone,
  registrationLink
";

const NO_PARAMS: &serde_json::Value = &serde_json::Value::Null;

impl SanityClient {
    /// Fetch a single content page by slug.
    ///
    /// # Errors
    ///
    /// Returns `SanityError` on query failure.
    pub async fn page_by_slug(&self, slug: &str) -> Result<Option<Page>, SanityError> {
        self.fetch_cached(
            &format!(r#"*[_type == "page" && slug.current == $slug][0]{{{PAGE_FIELDS}}}"#),
            &json!({ "slug": slug }),
        )
        .await
    }

    /// Fetch all products, ordered by English name.
    ///
    /// # Errors
    ///
    /// Returns `SanityError` on query failure.
    pub async fn all_products(&self) -> Result<Vec<Product>, SanityError> {
        self.fetch_cached(
            &format!(r#"*[_type == "product"] | order(name.en asc){{{PRODUCT_FIELDS}}}"#),
            NO_PARAMS,
        )
        .await
    }

    /// Fetch products in one category, ordered by English name.
    ///
    /// # Errors
    ///
    /// Returns `SanityError` on query failure.
    pub async fn products_by_category(
        &self,
        category_slug: &str,
    ) -> Result<Vec<Product>, SanityError> {
        self.fetch_cached(
            &format!(
                r#"*[_type == "product" && category->slug.current == $categorySlug]
                   | order(name.en asc){{{PRODUCT_FIELDS}}}"#
            ),
            &json!({ "categorySlug": category_slug }),
        )
        .await
    }

    /// Fetch a single product by slug.
    ///
    /// # Errors
    ///
    /// Returns `SanityError` on query failure.
    pub async fn product_by_slug(&self, slug: &str) -> Result<Option<Product>, SanityError> {
        self.fetch_cached(
            &format!(r#"*[_type == "product" && slug.current == $slug][0]{{{PRODUCT_FIELDS}}}"#),
            &json!({ "slug": slug }),
        )
        .await
    }

    /// Fetch featured, in-stock products for the home page.
    ///
    /// # Errors
    ///
    /// Returns `SanityError` on query failure.
    pub async fn featured_products(&self) -> Result<Vec<Product>, SanityError> {
        self.fetch_cached(
            &format!(
                r#"*[_type == "product" && featured == true && inStock == true]
                   | order(name.en asc){{{PRODUCT_FIELDS}}}"#
            ),
            NO_PARAMS,
        )
        .await
    }

    /// Free-text product search over localized names and SKU.
    ///
    /// Queries shorter than two characters return no results.
    ///
    /// # Errors
    ///
    /// Returns `SanityError` on query failure.
    pub async fn search_products(&self, term: &str) -> Result<Vec<Product>, SanityError> {
        let term = term.trim();
        if term.chars().count() < 2 {
            return Ok(Vec::new());
        }

        self.fetch(
            &format!(
                r#"*[_type == "product" && (
                     name.en match $searchQuery ||
                     name.he match $searchQuery ||
                     sku match $searchQuery
                   )] | order(name.en asc){{{PRODUCT_FIELDS}}}"#
            ),
            &json!({ "searchQuery": format!("*{term}*") }),
        )
        .await
    }

    /// Fetch all product categories in display order.
    ///
    /// # Errors
    ///
    /// Returns `SanityError` on query failure.
    pub async fn all_categories(&self) -> Result<Vec<ProductCategory>, SanityError> {
        self.fetch_cached(
            r#"*[_type == "productCategory"] | order(order asc, name.en asc)
               {_id, name, slug, description, image, order}"#,
            NO_PARAMS,
        )
        .await
    }

    /// Fetch upcoming events (end date, or date, not yet past).
    ///
    /// Filters at day granularity so the cache key stays stable within a day.
    ///
    /// # Errors
    ///
    /// Returns `SanityError` on query failure.
    pub async fn upcoming_events(&self) -> Result<Vec<Event>, SanityError> {
        self.fetch_cached(
            &format!(
                r#"*[_type == "event" && coalesce(endDate, date) >= $today]
                   | order(date asc){{{EVENT_FIELDS}}}"#
            ),
            &json!({ "today": Utc::now().date_naive().to_string() }),
        )
        .await
    }

    /// Fetch a single event by slug.
    ///
    /// # Errors
    ///
    /// Returns `SanityError` on query failure.
    pub async fn event_by_slug(&self, slug: &str) -> Result<Option<Event>, SanityError> {
        self.fetch_cached(
            &format!(r#"*[_type == "event" && slug.current == $slug][0]{{{EVENT_FIELDS}}}"#),
            &json!({ "slug": slug }),
        )
        .await
    }

    /// Fetch all synagogues, oldest congregation first.
    ///
    /// # Errors
    ///
    /// Returns `SanityError` on query failure.
    pub async fn all_synagogues(&self) -> Result<Vec<Synagogue>, SanityError> {
        self.fetch_cached(
            &format!(
                r#"*[_type == "synagogue"] | order(yearEstablished asc){{{SYNAGOGUE_FIELDS}}}"#
            ),
            NO_PARAMS,
        )
        .await
    }

    /// Fetch a single synagogue by slug.
    ///
    /// # Errors
    ///
    /// Returns `SanityError` on query failure.
    pub async fn synagogue_by_slug(&self, slug: &str) -> Result<Option<Synagogue>, SanityError> {
        self.fetch_cached(
            &format!(
                r#"*[_type == "synagogue" && slug.current == $slug][0]{{{SYNAGOGUE_FIELDS}}}"#
            ),
            &json!({ "slug": slug }),
        )
        .await
    }

    /// Fetch all people in display order (explicit order first, then name).
    ///
    /// # Errors
    ///
    /// Returns `SanityError` on query failure.
    pub async fn all_people(&self) -> Result<Vec<Person>, SanityError> {
        self.fetch_cached(
            &format!(r#"*[_type == "person"] | order(order asc, name asc){{{PERSON_FIELDS}}}"#),
            NO_PARAMS,
        )
        .await
    }

    /// Fetch a single person by slug.
    ///
    /// # Errors
    ///
    /// Returns `SanityError` on query failure.
    pub async fn person_by_slug(&self, slug: &str) -> Result<Option<Person>, SanityError> {
        self.fetch_cached(
            &format!(r#"*[_type == "person" && slug.current == $slug][0]{{{PERSON_FIELDS}}}"#),
            &json!({ "slug": slug }),
        )
        .await
    }

    /// Fetch all education programs, ordered by English name.
    ///
    /// # Errors
    ///
    /// Returns `SanityError` on query failure.
    pub async fn all_education_programs(&self) -> Result<Vec<EducationProgram>, SanityError> {
        self.fetch_cached(
            &format!(
                r#"*[_type == "educationProgram"] | order(name.en asc){{{PROGRAM_FIELDS}}}"#
            ),
            NO_PARAMS,
        )
        .await
    }

    /// Fetch a single education program by slug.
    ///
    /// # Errors
    ///
    /// Returns `SanityError` on query failure.
    pub async fn education_program_by_slug(
        &self,
        slug: &str,
    ) -> Result<Option<EducationProgram>, SanityError> {
        self.fetch_cached(
            &format!(
                r#"*[_type == "educationProgram" && slug.current == $slug][0]{{{PROGRAM_FIELDS}}}"#
            ),
            &json!({ "slug": slug }),
        )
        .await
    }

    /// Fetch the site settings singleton.
    ///
    /// # Errors
    ///
    /// Returns `SanityError` on query failure.
    pub async fn site_settings(&self) -> Result<SiteSettings, SanityError> {
        let settings: Option<SiteSettings> = self
            .fetch_cached(r#"*[_type == "settings"][0]"#, NO_PARAMS)
            .await?;
        Ok(settings.unwrap_or_default())
    }
}
