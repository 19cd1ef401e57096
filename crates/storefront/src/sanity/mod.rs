//! Sanity content lake client.
//!
//! Speaks GROQ over HTTP against the query endpoint, with read results
//! cached in `moka` (5-minute TTL). The mutate and asset endpoints are used
//! only by the migration CLI and require an API token.

pub mod image;
pub mod portable_text;
pub mod queries;
pub mod types;

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use secrecy::ExposeSecret;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, instrument};

use crate::config::SanityConfig;

pub use image::ImageUrlBuilder;

/// Errors from the Sanity API.
#[derive(Debug, Error)]
pub enum SanityError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Response body did not match the expected document shape.
    #[error("Decode error: {0}")]
    Decode(String),

    /// A write operation was attempted without an API token.
    #[error("Missing API token for write operation")]
    MissingToken,
}

/// Query response envelope (`{ "result": ... }`).
#[derive(Debug, serde::Deserialize)]
struct QueryResponse {
    result: Value,
}

/// An uploaded image asset document.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct UploadedAsset {
    #[serde(rename = "_id")]
    pub id: String,
    pub url: String,
}

#[derive(Debug, serde::Deserialize)]
struct AssetResponse {
    document: UploadedAsset,
}

/// Client for one Sanity project/dataset.
///
/// Cheap to clone; the HTTP client and cache are shared via `Arc`.
#[derive(Clone)]
pub struct SanityClient {
    inner: Arc<SanityClientInner>,
}

struct SanityClientInner {
    client: reqwest::Client,
    query_url: String,
    mutate_url: String,
    assets_url: String,
    token: Option<String>,
    cache: Cache<String, Value>,
}

impl SanityClient {
    /// Create a new client.
    #[must_use]
    pub fn new(config: &SanityConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(Duration::from_secs(300)) // 5 minutes
            .build();

        let api_base = format!(
            "https://{}.api.sanity.io/v{}",
            config.project_id, config.api_version
        );

        Self {
            inner: Arc::new(SanityClientInner {
                client: reqwest::Client::new(),
                query_url: format!("{api_base}/data/query/{}", config.dataset),
                mutate_url: format!("{api_base}/data/mutate/{}", config.dataset),
                assets_url: format!("{api_base}/assets/images/{}", config.dataset),
                token: config
                    .token
                    .as_ref()
                    .map(|t| t.expose_secret().to_string()),
                cache,
            }),
        }
    }

    /// Run a GROQ query, bypassing the cache.
    ///
    /// # Errors
    ///
    /// Returns `SanityError` on HTTP failure, API error status, or when the
    /// result does not deserialize into `T`.
    #[instrument(skip(self, params), fields(query = %query))]
    pub async fn fetch<T: DeserializeOwned>(
        &self,
        query: &str,
        params: &impl Serialize,
    ) -> Result<T, SanityError> {
        let value = self.fetch_raw(query, params).await?;
        serde_json::from_value(value).map_err(|e| SanityError::Decode(e.to_string()))
    }

    /// Run a GROQ query through the 5-minute read cache.
    ///
    /// # Errors
    ///
    /// Same as [`fetch`](Self::fetch).
    pub async fn fetch_cached<T: DeserializeOwned>(
        &self,
        query: &str,
        params: &impl Serialize,
    ) -> Result<T, SanityError> {
        let key = format!(
            "{query}\u{0}{}",
            serde_json::to_string(params).map_err(|e| SanityError::Decode(e.to_string()))?
        );

        if let Some(value) = self.inner.cache.get(&key).await {
            debug!("sanity cache hit");
            return serde_json::from_value(value).map_err(|e| SanityError::Decode(e.to_string()));
        }

        let value = self.fetch_raw(query, params).await?;
        self.inner.cache.insert(key, value.clone()).await;
        serde_json::from_value(value).map_err(|e| SanityError::Decode(e.to_string()))
    }

    async fn fetch_raw(
        &self,
        query: &str,
        params: &impl Serialize,
    ) -> Result<Value, SanityError> {
        let body = serde_json::json!({
            "query": query,
            "params": params,
        });

        let mut request = self.inner.client.post(&self.inner.query_url).json(&body);
        if let Some(token) = &self.inner.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(SanityError::Api {
                status: status.as_u16(),
                message: message.chars().take(500).collect(),
            });
        }

        let envelope: QueryResponse = response.json().await?;
        Ok(envelope.result)
    }

    /// Commit a batch of mutations in one transaction.
    ///
    /// # Errors
    ///
    /// Returns `MissingToken` without a configured API token, or the usual
    /// HTTP/API errors.
    #[instrument(skip(self, mutations), fields(count = mutations.len()))]
    pub async fn mutate(&self, mutations: Vec<Value>) -> Result<(), SanityError> {
        let token = self.inner.token.as_ref().ok_or(SanityError::MissingToken)?;

        let response = self
            .inner
            .client
            .post(&self.inner.mutate_url)
            .bearer_auth(token)
            .json(&serde_json::json!({ "mutations": mutations }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(SanityError::Api {
                status: status.as_u16(),
                message: message.chars().take(500).collect(),
            });
        }
        Ok(())
    }

    /// Upload an image to the asset store.
    ///
    /// # Errors
    ///
    /// Returns `MissingToken` without a configured API token, or the usual
    /// HTTP/API errors.
    #[instrument(skip(self, bytes), fields(filename = %filename, size = bytes.len()))]
    pub async fn upload_image(
        &self,
        bytes: Vec<u8>,
        filename: &str,
    ) -> Result<UploadedAsset, SanityError> {
        let token = self.inner.token.as_ref().ok_or(SanityError::MissingToken)?;

        let response = self
            .inner
            .client
            .post(&self.inner.assets_url)
            .query(&[("filename", filename)])
            .bearer_auth(token)
            .header("Content-Type", "application/octet-stream")
            .body(bytes)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(SanityError::Api {
                status: status.as_u16(),
                message: message.chars().take(500).collect(),
            });
        }

        let envelope: AssetResponse = response.json().await?;
        Ok(envelope.document)
    }
}
