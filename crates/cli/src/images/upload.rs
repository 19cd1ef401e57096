//! Image upload phase.
//!
//! Downloads each matched image from the legacy site, pushes it to the CMS
//! asset store through a bounded worker pool, then patches every product
//! whose upload succeeded in a single transaction. The patch also writes
//! English alt text from the product name; Hebrew alt text stays empty for
//! editors to fill in.

use std::sync::Arc;

use rand::Rng;
use rand::distr::Alphanumeric;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use kehillah_storefront::sanity::SanityClient;

use super::PipelineError;
use super::matcher::{MatchOutput, MatchRecord};

/// Concurrent downloads/uploads in flight at once.
const CONCURRENT_UPLOADS: usize = 3;

const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36";

/// Per-product upload outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UploadStatus {
    Uploaded,
    Failed,
    Skipped,
}

/// One product's upload result.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadRecord {
    pub sanity_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asset_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub status: UploadStatus,
}

/// Upload phase statistics.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadStats {
    pub total: usize,
    pub uploaded: usize,
    pub failed: usize,
    pub skipped: usize,
}

/// Upload phase output.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadOutput {
    pub results: Vec<UploadRecord>,
    pub stats: UploadStats,
    pub uploaded_at: String,
}

/// Random key for CMS array items.
fn generate_key() -> String {
    rand::rng()
        .sample_iter(Alphanumeric)
        .take(8)
        .map(char::from)
        .collect()
}

/// Asset filename derived from the document id.
fn asset_filename(sanity_id: &str) -> String {
    let prefix: String = sanity_id.chars().take(8).collect();
    format!("product-{prefix}.jpg")
}

async fn download_image(
    client: &reqwest::Client,
    url: &str,
) -> Result<Vec<u8>, PipelineError> {
    let response = client
        .get(url)
        .header("User-Agent", USER_AGENT)
        .send()
        .await?;
    let status = response.status();
    if !status.is_success() {
        return Err(PipelineError::FetchFailed {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }
    Ok(response.bytes().await?.to_vec())
}

/// The patch committed per product: replace the image array with one image
/// referencing the uploaded asset.
fn image_patch(sanity_id: &str, asset_id: &str, alt_en: &str) -> serde_json::Value {
    json!({
        "patch": {
            "id": sanity_id,
            "set": {
                "images": [{
                    "_type": "image",
                    "_key": generate_key(),
                    "asset": { "_type": "reference", "_ref": asset_id },
                    "alt": { "en": alt_en, "he": "" }
                }]
            }
        }
    })
}

/// Upload every matched image and patch the catalog.
///
/// High-confidence and review-flagged matches both upload; unmatched
/// products are untouched. With `dry_run` nothing leaves the machine.
///
/// # Errors
///
/// Returns `PipelineError` if the final patch transaction fails; individual
/// download or upload failures are recorded per product and do not abort
/// the phase.
pub async fn upload_all(
    client: &SanityClient,
    matches: &MatchOutput,
    dry_run: bool,
) -> Result<UploadOutput, PipelineError> {
    let to_upload: Vec<&MatchRecord> = matches
        .matched
        .iter()
        .chain(&matches.low_confidence)
        .filter(|record| record.image_url.is_some())
        .collect();
    tracing::info!(count = to_upload.len(), dry_run, "Starting uploads");

    if dry_run {
        for record in to_upload.iter().take(5) {
            tracing::info!(product = %record.sanity_name, "Would upload image");
        }
        let total = to_upload.len();
        return Ok(UploadOutput {
            results: to_upload
                .into_iter()
                .map(|record| UploadRecord {
                    sanity_id: record.sanity_id.clone(),
                    asset_id: None,
                    error: None,
                    status: UploadStatus::Skipped,
                })
                .collect(),
            stats: UploadStats {
                total,
                uploaded: 0,
                failed: 0,
                skipped: total,
            },
            uploaded_at: chrono::Utc::now().to_rfc3339(),
        });
    }

    let http = reqwest::Client::new();
    let semaphore = Arc::new(Semaphore::new(CONCURRENT_UPLOADS));
    let mut tasks = JoinSet::new();

    for record in to_upload {
        let Some(image_url) = record.image_url.clone() else {
            continue;
        };
        let semaphore = Arc::clone(&semaphore);
        let http = http.clone();
        let cms = client.clone();
        let sanity_id = record.sanity_id.clone();
        let sanity_name = record.sanity_name.clone();

        tasks.spawn(async move {
            // Closed only if the semaphore is dropped, which it never is here.
            let Ok(_permit) = semaphore.acquire_owned().await else {
                return UploadRecord {
                    sanity_id,
                    asset_id: None,
                    error: Some("worker pool closed".to_string()),
                    status: UploadStatus::Failed,
                };
            };

            let upload = async {
                let bytes = download_image(&http, &image_url).await?;
                let asset = cms
                    .upload_image(bytes, &asset_filename(&sanity_id))
                    .await?;
                Ok::<_, PipelineError>(asset)
            };

            match upload.await {
                Ok(asset) => {
                    tracing::info!(product = %sanity_name, asset = %asset.id, "Uploaded");
                    UploadRecord {
                        sanity_id,
                        asset_id: Some(asset.id),
                        error: None,
                        status: UploadStatus::Uploaded,
                    }
                }
                Err(e) => {
                    tracing::warn!(product = %sanity_name, "Upload failed: {e}");
                    UploadRecord {
                        sanity_id,
                        asset_id: None,
                        error: Some(e.to_string()),
                        status: UploadStatus::Failed,
                    }
                }
            }
        });
    }

    let mut results = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(record) => results.push(record),
            Err(e) => tracing::error!("Upload task panicked: {e}"),
        }
    }

    // Alt text comes from the match records; index them once.
    let names: std::collections::HashMap<&str, &str> = matches
        .matched
        .iter()
        .chain(&matches.low_confidence)
        .map(|record| (record.sanity_id.as_str(), record.sanity_name.as_str()))
        .collect();

    let mutations: Vec<serde_json::Value> = results
        .iter()
        .filter(|record| record.status == UploadStatus::Uploaded)
        .filter_map(|record| {
            record.asset_id.as_ref().map(|asset_id| {
                let alt = names.get(record.sanity_id.as_str()).copied().unwrap_or("");
                image_patch(&record.sanity_id, asset_id, alt)
            })
        })
        .collect();

    if mutations.is_empty() {
        tracing::warn!("No successful uploads; skipping patch transaction");
    } else {
        tracing::info!(count = mutations.len(), "Patching products");
        client.mutate(mutations).await?;
    }

    let stats = UploadStats {
        total: results.len(),
        uploaded: results
            .iter()
            .filter(|r| r.status == UploadStatus::Uploaded)
            .count(),
        failed: results
            .iter()
            .filter(|r| r.status == UploadStatus::Failed)
            .count(),
        skipped: results
            .iter()
            .filter(|r| r.status == UploadStatus::Skipped)
            .count(),
    };
    tracing::info!(
        uploaded = stats.uploaded,
        failed = stats.failed,
        skipped = stats.skipped,
        "Upload complete"
    );

    Ok(UploadOutput {
        results,
        stats,
        uploaded_at: chrono::Utc::now().to_rfc3339(),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::super::matcher::{MatchOutput, MatchRecord, MatchStats, MatchStatus};
    use super::*;

    fn record(id: &str, image: Option<&str>, status: MatchStatus) -> MatchRecord {
        MatchRecord {
            sanity_id: id.to_string(),
            sanity_name: format!("Product {id}"),
            source_name: image.map(|_| "Source".to_string()),
            image_url: image.map(ToString::to_string),
            confidence: 0.9,
            status,
        }
    }

    fn output(matched: Vec<MatchRecord>, low: Vec<MatchRecord>) -> MatchOutput {
        let stats = MatchStats {
            total: matched.len() + low.len(),
            matched: matched.len(),
            low_confidence: low.len(),
            unmatched: 0,
        };
        MatchOutput {
            matched,
            low_confidence: low,
            unmatched: Vec::new(),
            stats,
            matched_at: String::new(),
        }
    }

    #[test]
    fn generated_keys_are_short_and_alphanumeric() {
        let key = generate_key();
        assert_eq!(key.len(), 8);
        assert!(key.chars().all(char::is_alphanumeric));
        assert_ne!(key, generate_key());
    }

    #[test]
    fn filenames_derive_from_the_document_id() {
        assert_eq!(asset_filename("abc123def456"), "product-abc123de.jpg");
        assert_eq!(asset_filename("p1"), "product-p1.jpg");
    }

    #[test]
    fn patch_shape_matches_the_catalog_schema() {
        let patch = image_patch("p1", "image-abc-800x600-jpg", "Challah");
        let set = &patch["patch"]["set"]["images"][0];
        assert_eq!(set["_type"], "image");
        assert_eq!(set["asset"]["_ref"], "image-abc-800x600-jpg");
        assert_eq!(set["alt"]["en"], "Challah");
        assert_eq!(set["alt"]["he"], "");
        assert_eq!(set["_key"].as_str().map(str::len), Some(8));
    }

    #[tokio::test]
    async fn dry_run_skips_everything_and_touches_nothing() {
        let matches = output(
            vec![record("p1", Some("https://example.com/a.jpg"), MatchStatus::Matched)],
            vec![record(
                "p2",
                Some("https://example.com/b.jpg"),
                MatchStatus::LowConfidence,
            )],
        );

        // No CMS credentials configured; a non-dry run would error, a dry
        // run must not even try.
        let client = SanityClient::new(&kehillah_storefront::config::SanityConfig {
            project_id: "test".to_string(),
            dataset: "test".to_string(),
            api_version: "2024-01-01".to_string(),
            token: None,
        });

        let result = upload_all(&client, &matches, true).await.unwrap();
        assert_eq!(result.stats.total, 2);
        assert_eq!(result.stats.skipped, 2);
        assert_eq!(result.stats.uploaded, 0);
        assert!(
            result
                .results
                .iter()
                .all(|r| r.status == UploadStatus::Skipped)
        );
    }

    #[tokio::test]
    async fn unmatched_records_never_upload() {
        let mut matches = output(Vec::new(), Vec::new());
        matches.unmatched.push(record("p3", None, MatchStatus::Unmatched));

        let client = SanityClient::new(&kehillah_storefront::config::SanityConfig {
            project_id: "test".to_string(),
            dataset: "test".to_string(),
            api_version: "2024-01-01".to_string(),
            token: None,
        });

        let result = upload_all(&client, &matches, false).await.unwrap();
        assert_eq!(result.stats.total, 0);
        assert!(result.results.is_empty());
    }
}
