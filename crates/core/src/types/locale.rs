//! Locale handling for the bilingual (English/Hebrew) site.
//!
//! CMS documents use field-level localization: a localized field carries an
//! optional value per locale, and lookup falls back to English when the
//! requested language is missing.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A locale tag outside the supported set.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unsupported locale: {0}")]
pub struct UnsupportedLocale(pub String);

/// Supported UI languages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    He,
}

impl Locale {
    pub const ALL: [Self; 2] = [Self::En, Self::He];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::He => "he",
        }
    }

    /// Text direction for the `dir` attribute.
    #[must_use]
    pub const fn dir(self) -> &'static str {
        match self {
            Self::En => "ltr",
            Self::He => "rtl",
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Locale {
    type Err = UnsupportedLocale;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "en" => Ok(Self::En),
            "he" => Ok(Self::He),
            other => Err(UnsupportedLocale(other.to_string())),
        }
    }
}

/// A field-localized string: at most one value per locale.
///
/// Mirrors the CMS `localeString` object. `resolve` prefers the requested
/// locale and falls back to English.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocaleString {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub en: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub he: Option<String>,
}

/// Longer localized text; the CMS distinguishes the two but the shape is
/// identical.
pub type LocaleText = LocaleString;

impl LocaleString {
    /// A value present only in English.
    #[must_use]
    pub fn english(value: impl Into<String>) -> Self {
        Self {
            en: Some(value.into()),
            he: None,
        }
    }

    /// The value for `locale`, falling back to English.
    #[must_use]
    pub fn resolve(&self, locale: Locale) -> Option<&str> {
        let preferred = match locale {
            Locale::En => self.en.as_deref(),
            Locale::He => self.he.as_deref(),
        };
        preferred.or(self.en.as_deref())
    }

    /// Like [`resolve`](Self::resolve), with an empty string for missing values.
    #[must_use]
    pub fn resolve_or_empty(&self, locale: Locale) -> &str {
        self.resolve(locale).unwrap_or_default()
    }

    /// Whether a value exists for `locale` (counting the English fallback).
    #[must_use]
    pub fn has_value(&self, locale: Locale) -> bool {
        self.resolve(locale).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locale_round_trips_through_str() {
        for locale in Locale::ALL {
            assert_eq!(locale.as_str().parse::<Locale>(), Ok(locale));
        }
        assert!("fr".parse::<Locale>().is_err());
    }

    #[test]
    fn resolve_prefers_requested_locale() {
        let s = LocaleString {
            en: Some("Shop".into()),
            he: Some("חנות".into()),
        };
        assert_eq!(s.resolve(Locale::He), Some("חנות"));
        assert_eq!(s.resolve(Locale::En), Some("Shop"));
    }

    #[test]
    fn resolve_falls_back_to_english() {
        let s = LocaleString::english("History");
        assert_eq!(s.resolve(Locale::He), Some("History"));
        assert!(s.has_value(Locale::He));
        assert_eq!(LocaleString::default().resolve(Locale::He), None);
    }
}
