//! Product image migration pipeline.
//!
//! Three phases, each persisting its output as JSON under `data/`:
//!
//! 1. **scrape** - pull product name / image URL pairs off the legacy
//!    WooCommerce shop ([`scrape`]).
//! 2. **match** - fuzzy-match scraped names against the CMS catalog
//!    ([`matcher`]).
//! 3. **upload** - download each matched image, push it to the CMS asset
//!    store, and patch all products in one transaction ([`upload`]).
//!
//! The intermediate files make each phase independently rerunnable; matching
//! in particular is expected to be reviewed by hand before uploading.

pub mod matcher;
pub mod scrape;
pub mod upload;

use std::path::{Path, PathBuf};

use serde::{Serialize, de::DeserializeOwned};
use thiserror::Error;

use kehillah_storefront::config::{ConfigError, SanityConfig};
use kehillah_storefront::sanity::{SanityClient, SanityError};

/// Directory for intermediate pipeline files.
const DATA_DIR: &str = "data";

/// Scrape phase output file.
pub const SCRAPED_FILE: &str = "scraped-products.json";

/// Match phase output file.
pub const MATCHED_FILE: &str = "matched-products.json";

/// Upload phase output file.
pub const UPLOAD_FILE: &str = "upload-results.json";

/// Errors from any pipeline phase.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0} not found; run the previous phase first")]
    MissingInput(String),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("CMS error: {0}")]
    Sanity(#[from] SanityError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("failed to fetch {url}: HTTP {status}")]
    FetchFailed { url: String, status: u16 },
}

fn data_path(filename: &str) -> PathBuf {
    Path::new(DATA_DIR).join(filename)
}

fn save_json<T: Serialize>(filename: &str, data: &T) -> Result<(), PipelineError> {
    std::fs::create_dir_all(DATA_DIR)?;
    let path = data_path(filename);
    std::fs::write(&path, serde_json::to_vec_pretty(data)?)?;
    tracing::info!("Saved {}", path.display());
    Ok(())
}

fn load_json<T: DeserializeOwned>(filename: &str) -> Result<T, PipelineError> {
    let path = data_path(filename);
    if !path.exists() {
        return Err(PipelineError::MissingInput(path.display().to_string()));
    }
    Ok(serde_json::from_slice(&std::fs::read(&path)?)?)
}

fn sanity_client() -> Result<SanityClient, PipelineError> {
    Ok(SanityClient::new(&SanityConfig::from_env()?))
}

/// Run the scrape phase and persist its output.
pub async fn scrape_phase() -> Result<(), PipelineError> {
    let output = scrape::scrape_all().await?;
    tracing::info!(
        products = output.total_products,
        pages = output.total_pages,
        "Scrape complete"
    );
    save_json(SCRAPED_FILE, &output)
}

/// Run the match phase against the CMS catalog and persist its output.
pub async fn match_phase() -> Result<(), PipelineError> {
    let scraped: scrape::ScrapeOutput = load_json(SCRAPED_FILE)?;
    tracing::info!(count = scraped.products.len(), "Loaded scraped products");

    let client = sanity_client()?;
    let catalog = matcher::load_catalog(&client).await?;
    let output = matcher::match_products(&scraped.products, &catalog);
    save_json(MATCHED_FILE, &output)
}

/// Run the upload phase from the persisted match results.
pub async fn upload_phase(dry_run: bool) -> Result<(), PipelineError> {
    let matches: matcher::MatchOutput = load_json(MATCHED_FILE)?;

    let client = sanity_client()?;
    let output = upload::upload_all(&client, &matches, dry_run).await?;
    save_json(UPLOAD_FILE, &output)
}

/// Run all three phases in sequence.
pub async fn run_all(dry_run: bool) -> Result<(), PipelineError> {
    scrape_phase().await?;
    match_phase().await?;
    upload_phase(dry_run).await?;
    if dry_run {
        tracing::info!("Dry run complete; nothing was written to the CMS");
    }
    Ok(())
}
