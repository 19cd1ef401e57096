//! Application state shared across handlers.

use std::path::Path;
use std::sync::Arc;

use sqlx::PgPool;

use crate::config::KehillahConfig;
use crate::i18n::{I18nError, Messages};
use crate::sanity::{ImageUrlBuilder, SanityClient};
use crate::services::stripe::StripeClient;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`; gives handlers access to configuration, the
/// session database pool, the CMS client, and translations.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: KehillahConfig,
    pool: PgPool,
    sanity: SanityClient,
    stripe: StripeClient,
    images: ImageUrlBuilder,
    messages: Messages,
}

impl AppState {
    /// Build the application state.
    ///
    /// # Errors
    ///
    /// Returns `I18nError` if the message files cannot be loaded.
    pub fn new(
        config: KehillahConfig,
        pool: PgPool,
        messages_dir: &Path,
    ) -> Result<Self, I18nError> {
        let sanity = SanityClient::new(&config.sanity);
        let stripe = StripeClient::new(&config.stripe);
        let images = ImageUrlBuilder::new(&config.sanity.project_id, &config.sanity.dataset);
        let messages = Messages::load(messages_dir)?;

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                sanity,
                stripe,
                images,
                messages,
            }),
        })
    }

    #[must_use]
    pub fn config(&self) -> &KehillahConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    #[must_use]
    pub fn sanity(&self) -> &SanityClient {
        &self.inner.sanity
    }

    #[must_use]
    pub fn stripe(&self) -> &StripeClient {
        &self.inner.stripe
    }

    #[must_use]
    pub fn images(&self) -> &ImageUrlBuilder {
        &self.inner.images
    }

    #[must_use]
    pub fn messages(&self) -> &Messages {
        &self.inner.messages
    }
}
