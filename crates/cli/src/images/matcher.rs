//! Fuzzy matcher between scraped products and the CMS catalog.
//!
//! Product names differ between the two sources in predictable ways:
//! parenthetical tags like "(KLP)" or "(64oz)", commas, and units glued to
//! numbers. Names are normalized before comparison, then scored with
//! Jaro-Winkler similarity. Two thresholds split the results: at or above
//! 0.7 a match is taken as-is, between 0.5 and 0.7 it is flagged for human
//! review, below 0.5 the product stays unmatched.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use strsim::jaro_winkler;

use kehillah_core::{DocumentId, Locale, LocaleString};
use kehillah_storefront::sanity::{SanityClient, SanityError};

/// Similarity at or above which a match needs no review.
pub const HIGH_CONFIDENCE: f64 = 0.7;

/// Similarity at or above which a match is kept but flagged.
pub const LOW_CONFIDENCE: f64 = 0.5;

/// Catalog product, as much of it as matching needs.
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogProduct {
    #[serde(rename = "_id")]
    pub id: DocumentId,
    pub name: LocaleString,
}

/// Outcome class for one catalog product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    Matched,
    LowConfidence,
    Unmatched,
}

/// One catalog product's match result.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchRecord {
    pub sanity_id: String,
    pub sanity_name: String,
    pub source_name: Option<String>,
    pub image_url: Option<String>,
    pub confidence: f64,
    pub status: MatchStatus,
}

/// Match phase statistics.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchStats {
    pub total: usize,
    pub matched: usize,
    pub low_confidence: usize,
    pub unmatched: usize,
}

/// Match phase output.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchOutput {
    pub matched: Vec<MatchRecord>,
    pub low_confidence: Vec<MatchRecord>,
    pub unmatched: Vec<MatchRecord>,
    pub stats: MatchStats,
    pub matched_at: String,
}

static PARENTHETICAL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\([^)]*\)").expect("Invalid regex"));
static SPECIAL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9\s.]").expect("Invalid regex"));
static GLUED_UNIT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d)(ml|g|kg|l|oz)\b").expect("Invalid regex"));
static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("Invalid regex"));

/// Normalize a product name for comparison.
///
/// `"Achva Tahini, Plain 500g (KLP)"` becomes `"achva tahini plain 500 g"`.
#[must_use]
pub fn normalize_name(name: &str) -> String {
    let lowered = name.to_lowercase();
    let no_parens = PARENTHETICAL_RE.replace_all(&lowered, "");
    let no_commas = no_parens.replace(',', "");
    let cleaned = SPECIAL_RE.replace_all(&no_commas, "");
    let spaced_units = GLUED_UNIT_RE.replace_all(&cleaned, "${1} ${2}");
    WHITESPACE_RE
        .replace_all(&spaced_units, " ")
        .trim()
        .to_string()
}

/// Fetch all published catalog products (drafts excluded).
///
/// # Errors
///
/// Returns `SanityError` on query failure.
pub async fn load_catalog(client: &SanityClient) -> Result<Vec<CatalogProduct>, SanityError> {
    let products: Vec<CatalogProduct> = client
        .fetch(
            r#"*[_type == "product" && !(_id match "drafts.*")]{ _id, name }"#,
            &serde_json::Value::Null,
        )
        .await?;
    tracing::info!(count = products.len(), "Fetched catalog products");
    Ok(products)
}

/// Match every catalog product against the scraped set.
#[must_use]
pub fn match_products(
    scraped: &[super::scrape::ScrapedProduct],
    catalog: &[CatalogProduct],
) -> MatchOutput {
    let normalized_scraped: Vec<(String, &super::scrape::ScrapedProduct)> = scraped
        .iter()
        .map(|product| (normalize_name(&product.name), product))
        .collect();

    let mut matched = Vec::new();
    let mut low_confidence = Vec::new();
    let mut unmatched = Vec::new();

    for product in catalog {
        let sanity_name = product.name.resolve_or_empty(Locale::En).to_string();
        let target = normalize_name(&sanity_name);

        let best = normalized_scraped
            .iter()
            .map(|(candidate, source)| (jaro_winkler(&target, candidate), *source))
            .max_by(|(a, _), (b, _)| a.total_cmp(b));

        let record = match best {
            Some((score, source)) if score >= LOW_CONFIDENCE => MatchRecord {
                sanity_id: product.id.to_string(),
                sanity_name,
                source_name: Some(source.name.clone()),
                image_url: Some(source.image_url.clone()),
                confidence: score,
                status: if score >= HIGH_CONFIDENCE {
                    MatchStatus::Matched
                } else {
                    MatchStatus::LowConfidence
                },
            },
            _ => MatchRecord {
                sanity_id: product.id.to_string(),
                sanity_name,
                source_name: None,
                image_url: None,
                confidence: 0.0,
                status: MatchStatus::Unmatched,
            },
        };

        match record.status {
            MatchStatus::Matched => matched.push(record),
            MatchStatus::LowConfidence => low_confidence.push(record),
            MatchStatus::Unmatched => unmatched.push(record),
        }
    }

    let stats = MatchStats {
        total: catalog.len(),
        matched: matched.len(),
        low_confidence: low_confidence.len(),
        unmatched: unmatched.len(),
    };
    tracing::info!(
        total = stats.total,
        matched = stats.matched,
        low_confidence = stats.low_confidence,
        unmatched = stats.unmatched,
        "Match complete"
    );
    for record in low_confidence.iter().take(5) {
        tracing::info!(
            cms = %record.sanity_name,
            source = record.source_name.as_deref().unwrap_or_default(),
            confidence = record.confidence,
            "Low confidence match, review recommended"
        );
    }

    MatchOutput {
        matched,
        low_confidence,
        unmatched,
        stats,
        matched_at: chrono::Utc::now().to_rfc3339(),
    }
}

#[cfg(test)]
mod tests {
    use super::super::scrape::ScrapedProduct;
    use super::*;

    fn scraped(name: &str) -> ScrapedProduct {
        ScrapedProduct {
            name: name.to_string(),
            image_url: format!("https://example.com/{}.jpg", name.len()),
            product_url: format!("https://example.com/{name}"),
        }
    }

    fn catalog(id: &str, name: &str) -> CatalogProduct {
        CatalogProduct {
            id: DocumentId::new(id),
            name: LocaleString::english(name),
        }
    }

    #[test]
    fn normalization_strips_noise() {
        assert_eq!(
            normalize_name("Achva Tahini, Plain 500g (KLP)"),
            "achva tahini plain 500 g"
        );
        assert_eq!(
            normalize_name("Kedem 100% Pure Grape Juice, Original 1.89L (64oz)"),
            "kedem 100 pure grape juice original 1.89 l"
        );
        assert_eq!(normalize_name("  Matzah   Meal  "), "matzah meal");
    }

    #[test]
    fn identical_names_match_with_high_confidence() {
        let scraped_products = vec![scraped("Achva Tahini, Plain 500g (KLP)")];
        let catalog_products = vec![catalog("p1", "Achva Tahini Plain 500g")];

        let output = match_products(&scraped_products, &catalog_products);
        assert_eq!(output.stats.matched, 1);
        assert_eq!(output.matched[0].status, MatchStatus::Matched);
        assert!(output.matched[0].confidence >= HIGH_CONFIDENCE);
        assert!(output.matched[0].image_url.is_some());
    }

    #[test]
    fn dissimilar_names_stay_unmatched() {
        let scraped_products = vec![scraped("Grape Juice")];
        let catalog_products = vec![catalog("p1", "Mezuzah Klaf")];

        let output = match_products(&scraped_products, &catalog_products);
        assert_eq!(output.stats.unmatched, 1);
        assert_eq!(output.unmatched[0].status, MatchStatus::Unmatched);
        assert!(output.unmatched[0].image_url.is_none());
        assert_eq!(output.unmatched[0].confidence, 0.0);
    }

    #[test]
    fn best_of_several_candidates_wins() {
        let scraped_products = vec![
            scraped("Osem Chicken Soup Mix 400g"),
            scraped("Osem Mushroom Soup Mix 400g"),
        ];
        let catalog_products = vec![catalog("p1", "Osem Chicken Soup Mix, 400g")];

        let output = match_products(&scraped_products, &catalog_products);
        assert_eq!(output.stats.matched, 1);
        assert_eq!(
            output.matched[0].source_name.as_deref(),
            Some("Osem Chicken Soup Mix 400g")
        );
    }

    #[test]
    fn empty_scrape_set_leaves_everything_unmatched() {
        let output = match_products(&[], &[catalog("p1", "Challah Board")]);
        assert_eq!(output.stats.unmatched, 1);
        assert_eq!(output.stats.matched, 0);
    }
}
