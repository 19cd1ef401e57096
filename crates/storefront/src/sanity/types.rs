//! Document types for the Sanity content lake.
//!
//! These mirror the CMS schema (`product`, `productCategory`, `page`,
//! `event`, `synagogue`, `person`, `educationProgram`, `settings`).
//! Field-level localization uses the core
//! [`LocaleString`]/[`LocaleText`] types; rich text (Portable Text) is kept
//! as raw JSON and rendered by [`super::portable_text`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use kehillah_core::{DocumentId, LocaleString, LocaleText, Money, money};

/// A document slug (`{ "current": "grape-juice" }` in the CMS).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slug {
    pub current: String,
}

/// A reference to an uploaded image asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageAssetRef {
    #[serde(rename = "_ref")]
    pub id: String,
}

/// An image field: asset reference plus optional localized alt text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SanityImage {
    pub asset: ImageAssetRef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<LocaleString>,
}

/// Localized Portable Text: one block array per locale, kept as raw JSON.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LocaleBlockContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub en: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub he: Option<serde_json::Value>,
}

impl LocaleBlockContent {
    /// Blocks for `locale`, falling back to English.
    #[must_use]
    pub fn resolve(&self, locale: kehillah_core::Locale) -> Option<&serde_json::Value> {
        let preferred = match locale {
            kehillah_core::Locale::En => self.en.as_ref(),
            kehillah_core::Locale::He => self.he.as_ref(),
        };
        preferred.or(self.en.as_ref())
    }
}

// =============================================================================
// Shop Documents
// =============================================================================

/// Kashrut certification carried by a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KashrutCertification {
    #[serde(rename = "OU")]
    Ou,
    #[serde(rename = "OK")]
    Ok,
    #[serde(rename = "Star-K")]
    StarK,
    #[serde(rename = "Kof-K")]
    KofK,
    #[serde(rename = "Singapore-Rabbinate")]
    SingaporeRabbinate,
    #[serde(rename = "CRC")]
    Crc,
    #[serde(rename = "Badatz")]
    Badatz,
    #[serde(rename = "Other")]
    Other,
}

impl KashrutCertification {
    /// Display label for the certification badge.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Ou => "OU",
            Self::Ok => "OK",
            Self::StarK => "Star-K",
            Self::KofK => "Kof-K",
            Self::SingaporeRabbinate => "Singapore Rabbinate",
            Self::Crc => "CRC",
            Self::Badatz => "Badatz",
            Self::Other => "Certified",
        }
    }
}

/// A product category document (expanded reference).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductCategory {
    #[serde(rename = "_id")]
    pub id: DocumentId,
    pub name: LocaleString,
    pub slug: Slug,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<LocaleText>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<SanityImage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i64>,
}

/// A shop product.
///
/// The cart embeds a full snapshot of this struct at add time, so later
/// catalog price edits do not reprice existing cart lines.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    #[serde(rename = "_id")]
    pub id: DocumentId,
    pub name: LocaleString,
    pub slug: Slug,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<LocaleBlockContent>,
    /// Unit price; decimal SGD in the CMS, cents in memory.
    #[serde(with = "money::major")]
    pub price: Money,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<ProductCategory>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kashrut: Option<KashrutCertification>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<SanityImage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    #[serde(default, rename = "inStock")]
    pub in_stock: bool,
    #[serde(default)]
    pub featured: bool,
}

// =============================================================================
// Content Documents
// =============================================================================

/// A generic CMS page (history, mikvah, travel, ...).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page {
    #[serde(rename = "_id")]
    pub id: DocumentId,
    pub title: LocaleString,
    pub slug: Slug,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<LocaleText>,
    #[serde(default, rename = "mainImage", skip_serializing_if = "Option::is_none")]
    pub main_image: Option<SanityImage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<LocaleBlockContent>,
}

/// Event categorization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    Community,
    Youth,
    Education,
    Holiday,
    Shabbat,
    Sports,
}

impl EventType {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Community => "Community",
            Self::Youth => "Youth",
            Self::Education => "Education",
            Self::Holiday => "Holiday",
            Self::Shabbat => "Shabbat",
            Self::Sports => "Sports",
        }
    }
}

/// A community event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    #[serde(rename = "_id")]
    pub id: DocumentId,
    pub name: LocaleString,
    pub slug: Slug,
    #[serde(default, rename = "eventType", skip_serializing_if = "Option::is_none")]
    pub event_type: Option<EventType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<LocaleBlockContent>,
    pub date: DateTime<Utc>,
    #[serde(default, rename = "endDate", skip_serializing_if = "Option::is_none")]
    pub end_date: Option<DateTime<Utc>>,
    #[serde(default, rename = "isRecurring")]
    pub is_recurring: bool,
    #[serde(
        default,
        rename = "recurringSchedule",
        skip_serializing_if = "Option::is_none"
    )]
    pub recurring_schedule: Option<LocaleString>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<LocaleString>,
    #[serde(default, with = "money::major_opt", skip_serializing_if = "Option::is_none")]
    pub price: Option<Money>,
    #[serde(default, rename = "priceNote", skip_serializing_if = "Option::is_none")]
    pub price_note: Option<LocaleString>,
    #[serde(default, rename = "mainImage", skip_serializing_if = "Option::is_none")]
    pub main_image: Option<SanityImage>,
    #[serde(
        default,
        rename = "registrationLink",
        skip_serializing_if = "Option::is_none"
    )]
    pub registration_link: Option<String>,
}

// =============================================================================
// Community Documents
// =============================================================================

/// A street address. Coordinates are kept in the CMS for map embeds but the
/// site renders addresses as text only.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Address {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub street: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, rename = "postalCode", skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

impl Address {
    /// Single-line rendering of the populated parts.
    #[must_use]
    pub fn display(&self) -> String {
        [
            self.street.as_deref(),
            self.city.as_deref(),
            self.postal_code.as_deref(),
            self.country.as_deref(),
        ]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(", ")
    }
}

/// When a synagogue service runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ServiceDay {
    Friday,
    Saturday,
    WeekdayMorning,
    WeekdayEvening,
    Holiday,
}

impl ServiceDay {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Friday => "Friday Evening",
            Self::Saturday => "Saturday Morning",
            Self::WeekdayMorning => "Weekday Morning",
            Self::WeekdayEvening => "Weekday Evening",
            Self::Holiday => "Holiday",
        }
    }
}

/// One entry in a synagogue's service schedule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceTime {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day: Option<ServiceDay>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service: Option<LocaleString>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<LocaleString>,
}

/// A gallery image: asset plus optional localized alt text and caption.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GalleryImage {
    pub asset: ImageAssetRef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<LocaleString>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<LocaleString>,
}

/// A synagogue document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Synagogue {
    #[serde(rename = "_id")]
    pub id: DocumentId,
    pub name: LocaleString,
    pub slug: Slug,
    #[serde(
        default,
        rename = "meaningOfName",
        skip_serializing_if = "Option::is_none"
    )]
    pub meaning_of_name: Option<LocaleString>,
    #[serde(
        default,
        rename = "yearEstablished",
        skip_serializing_if = "Option::is_none"
    )]
    pub year_established: Option<i32>,
    #[serde(default, rename = "mainImage", skip_serializing_if = "Option::is_none")]
    pub main_image: Option<SanityImage>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub gallery: Vec<GalleryImage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<LocaleText>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub history: Option<LocaleBlockContent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,
    #[serde(default, rename = "serviceTimes", skip_serializing_if = "Vec::is_empty")]
    pub service_times: Vec<ServiceTime>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub features: Vec<LocaleString>,
    #[serde(
        default,
        rename = "contactEmail",
        skip_serializing_if = "Option::is_none"
    )]
    pub contact_email: Option<String>,
    #[serde(
        default,
        rename = "contactPhone",
        skip_serializing_if = "Option::is_none"
    )]
    pub contact_phone: Option<String>,
}

/// Leadership categorization, in the order the site lists them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PersonCategory {
    Clergy,
    Staff,
    Board,
    Educator,
}

impl PersonCategory {
    /// All categories in display order.
    pub const ALL: [Self; 4] = [Self::Clergy, Self::Staff, Self::Board, Self::Educator];

    /// Message key suffix for the localized group heading.
    #[must_use]
    pub const fn message_key(self) -> &'static str {
        match self {
            Self::Clergy => "leadership.clergy",
            Self::Staff => "leadership.staff",
            Self::Board => "leadership.board",
            Self::Educator => "leadership.educator",
        }
    }
}

/// A community leader, staff member or educator.
///
/// Names are not localized in the CMS; roles and biographies are.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Person {
    #[serde(rename = "_id")]
    pub id: DocumentId,
    pub name: String,
    pub slug: Slug,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<LocaleString>,
    pub category: PersonCategory,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<SanityImage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<LocaleBlockContent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i64>,
}

/// Education program categorization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProgramType {
    Preschool,
    SundaySchool,
    DaySchool,
    Adult,
    Youth,
}

impl ProgramType {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Preschool => "Preschool",
            Self::SundaySchool => "Sunday School",
            Self::DaySchool => "Day School",
            Self::Adult => "Adult Education",
            Self::Youth => "Youth Program",
        }
    }
}

/// An education program document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EducationProgram {
    #[serde(rename = "_id")]
    pub id: DocumentId,
    pub name: LocaleString,
    pub slug: Slug,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub program_type: Option<ProgramType>,
    #[serde(default, rename = "ageRange", skip_serializing_if = "Option::is_none")]
    pub age_range: Option<LocaleString>,
    #[serde(default, rename = "mainImage", skip_serializing_if = "Option::is_none")]
    pub main_image: Option<SanityImage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<LocaleBlockContent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule: Option<LocaleText>,
    #[serde(
        default,
        rename = "contactName",
        skip_serializing_if = "Option::is_none"
    )]
    pub contact_name: Option<String>,
    #[serde(
        default,
        rename = "contactEmail",
        skip_serializing_if = "Option::is_none"
    )]
    pub contact_email: Option<String>,
    #[serde(
        default,
        rename = "contactPhone",
        skip_serializing_if = "Option::is_none"
    )]
    pub contact_phone: Option<String>,
    #[serde(
        default,
        rename = "registrationLink",
        skip_serializing_if = "Option::is_none"
    )]
    pub registration_link: Option<String>,
}

// =============================================================================
// Settings
// =============================================================================

/// Site settings singleton (contact info, Shabbat times, footer text).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SiteSettings {
    #[serde(default, rename = "siteTitle", skip_serializing_if = "Option::is_none")]
    pub site_title: Option<LocaleString>,
    #[serde(
        default,
        rename = "siteDescription",
        skip_serializing_if = "Option::is_none"
    )]
    pub site_description: Option<LocaleText>,
    #[serde(default, rename = "contactInfo", skip_serializing_if = "Option::is_none")]
    pub contact_info: Option<ContactInfo>,
    #[serde(default, rename = "shabbatTimes", skip_serializing_if = "Option::is_none")]
    pub shabbat_times: Option<ShabbatTimes>,
    #[serde(default, rename = "footerText", skip_serializing_if = "Option::is_none")]
    pub footer_text: Option<LocaleText>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContactInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShabbatTimes {
    #[serde(
        default,
        rename = "candleLighting",
        skip_serializing_if = "Option::is_none"
    )]
    pub candle_lighting: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub havdalah: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parasha: Option<LocaleString>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn product_deserializes_from_cms_json() {
        let json = serde_json::json!({
            "_id": "prod-1",
            "name": { "en": "Grape Juice", "he": "מיץ ענבים" },
            "slug": { "current": "grape-juice" },
            "price": 12.5,
            "sku": "KDM-189",
            "inStock": true,
            "kashrut": "OU",
            "images": [{ "asset": { "_ref": "image-abc123-800x600-jpg" } }]
        });

        let product: Product = serde_json::from_value(json).unwrap();
        assert_eq!(product.price, Money::from_cents(1250));
        assert!(product.in_stock);
        assert_eq!(product.kashrut, Some(KashrutCertification::Ou));
        assert_eq!(product.images.len(), 1);
    }

    #[test]
    fn synagogue_deserializes_with_schedule_and_address() {
        let json = serde_json::json!({
            "_id": "syn-1",
            "name": { "en": "Maghain Aboth", "he": "מגן אבות" },
            "slug": { "current": "maghain-aboth" },
            "meaningOfName": { "en": "Shield of our Fathers" },
            "yearEstablished": 1878,
            "address": { "street": "24 Waterloo Street", "postalCode": "187950" },
            "serviceTimes": [
                { "day": "friday", "time": "7:00 PM", "service": { "en": "Kabbalat Shabbat" } },
                { "day": "weekday-morning", "time": "7:30 AM" }
            ],
            "features": [{ "en": "Air conditioned" }]
        });

        let synagogue: Synagogue = serde_json::from_value(json).unwrap();
        assert_eq!(synagogue.year_established, Some(1878));
        assert_eq!(synagogue.service_times.len(), 2);
        assert_eq!(synagogue.service_times[0].day, Some(ServiceDay::Friday));
        assert_eq!(
            synagogue.service_times[1].day,
            Some(ServiceDay::WeekdayMorning)
        );
        assert_eq!(
            synagogue.address.unwrap().display(),
            "24 Waterloo Street, 187950"
        );
    }

    #[test]
    fn person_deserializes_with_category() {
        let json = serde_json::json!({
            "_id": "person-1",
            "name": "Aaron Levy",
            "slug": { "current": "aaron-levy" },
            "role": { "en": "Community Rabbi", "he": "רב הקהילה" },
            "category": "clergy",
            "order": 1
        });

        let person: Person = serde_json::from_value(json).unwrap();
        assert_eq!(person.category, PersonCategory::Clergy);
        assert_eq!(person.order, Some(1));
        assert!(person.photo.is_none());
    }

    #[test]
    fn education_program_type_parses_kebab_case() {
        let json = serde_json::json!({
            "_id": "edu-1",
            "name": { "en": "Sunday School" },
            "slug": { "current": "sunday-school" },
            "type": "sunday-school",
            "ageRange": { "en": "5 - 12 years" }
        });

        let program: EducationProgram = serde_json::from_value(json).unwrap();
        assert_eq!(program.program_type, Some(ProgramType::SundaySchool));
        assert_eq!(program.program_type.unwrap().label(), "Sunday School");
    }

    #[test]
    fn missing_optional_fields_default() {
        let json = serde_json::json!({
            "_id": "prod-2",
            "name": { "en": "Candles" },
            "slug": { "current": "candles" },
            "price": 4
        });

        let product: Product = serde_json::from_value(json).unwrap();
        assert!(!product.in_stock);
        assert!(!product.featured);
        assert!(product.images.is_empty());
        assert!(product.category.is_none());
    }
}
