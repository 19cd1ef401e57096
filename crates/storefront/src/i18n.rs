//! UI translation strings.
//!
//! Messages live in `messages/{en,he}.json` as nested objects and are loaded
//! once at startup, flattened to dotted keys (`"cart.title"`). Lookup falls
//! back to English and finally to the key itself, so a missing translation
//! degrades visibly instead of panicking.

use std::collections::HashMap;
use std::path::Path;

use serde_json::Value;
use thiserror::Error;

use kehillah_core::Locale;

/// Errors loading message files.
#[derive(Debug, Error)]
pub enum I18nError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: String,
        source: serde_json::Error,
    },
}

/// All translation tables, one per locale.
#[derive(Debug, Clone, Default)]
pub struct Messages {
    tables: HashMap<Locale, HashMap<String, String>>,
}

impl Messages {
    /// Load `<dir>/<locale>.json` for every supported locale.
    ///
    /// # Errors
    ///
    /// Returns `I18nError` if a message file is missing or malformed.
    pub fn load(dir: &Path) -> Result<Self, I18nError> {
        let mut tables = HashMap::new();
        for locale in Locale::ALL {
            let path = dir.join(format!("{locale}.json"));
            let display = path.display().to_string();
            let raw = std::fs::read_to_string(&path).map_err(|source| I18nError::Io {
                path: display.clone(),
                source,
            })?;
            let value: Value = serde_json::from_str(&raw).map_err(|source| I18nError::Parse {
                path: display,
                source,
            })?;
            tables.insert(locale, flatten(&value));
        }
        Ok(Self { tables })
    }

    /// Build from in-memory JSON (tests and tooling).
    #[must_use]
    pub fn from_values(en: &Value, he: &Value) -> Self {
        let mut tables = HashMap::new();
        tables.insert(Locale::En, flatten(en));
        tables.insert(Locale::He, flatten(he));
        Self { tables }
    }

    /// Look up a dotted key, falling back to English, then the key itself.
    #[must_use]
    pub fn lookup<'a>(&'a self, locale: Locale, key: &'a str) -> &'a str {
        self.table_get(locale, key)
            .or_else(|| self.table_get(Locale::En, key))
            .unwrap_or(key)
    }

    fn table_get(&self, locale: Locale, key: &str) -> Option<&str> {
        self.tables
            .get(&locale)
            .and_then(|table| table.get(key))
            .map(String::as_str)
    }
}

/// Flatten a nested JSON object into dotted string keys.
fn flatten(value: &Value) -> HashMap<String, String> {
    let mut table = HashMap::new();
    flatten_into(value, String::new(), &mut table);
    table
}

fn flatten_into(value: &Value, prefix: String, table: &mut HashMap<String, String>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                let child_key = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{prefix}.{key}")
                };
                flatten_into(child, child_key, table);
            }
        }
        Value::String(s) => {
            table.insert(prefix, s.clone());
        }
        // Non-string leaves are not valid messages; skip them.
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn messages() -> Messages {
        Messages::from_values(
            &json!({
                "cart": { "title": "Your Cart", "empty": "Your cart is empty" },
                "nav": { "shop": "Shop" }
            }),
            &json!({
                "cart": { "title": "העגלה שלך" }
            }),
        )
    }

    #[test]
    fn lookup_resolves_nested_keys() {
        let m = messages();
        assert_eq!(m.lookup(Locale::En, "cart.title"), "Your Cart");
        assert_eq!(m.lookup(Locale::He, "cart.title"), "העגלה שלך");
    }

    #[test]
    fn lookup_falls_back_to_english() {
        let m = messages();
        assert_eq!(m.lookup(Locale::He, "cart.empty"), "Your cart is empty");
    }

    #[test]
    fn unknown_key_returns_the_key() {
        let m = messages();
        assert_eq!(m.lookup(Locale::En, "nav.missing"), "nav.missing");
    }
}
