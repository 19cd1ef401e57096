//! Stripe Checkout client for the donation flow.
//!
//! Creates a hosted Checkout session and hands back the redirect URL; the
//! application owns no payment state beyond that. One-time donations use
//! `payment` mode, monthly donations a `subscription` with a monthly
//! recurring price. Amounts are SGD.

use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::instrument;

use kehillah_core::{Locale, Money};

use crate::config::StripeConfig;

const CHECKOUT_SESSIONS_URL: &str = "https://api.stripe.com/v1/checkout/sessions";

/// Errors from the Stripe API.
#[derive(Debug, Error)]
pub enum StripeError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Session created without a redirect URL.
    #[error("No checkout URL returned")]
    MissingUrl,
}

/// How often a donation recurs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DonationFrequency {
    Once,
    Monthly,
}

impl DonationFrequency {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Once => "once",
            Self::Monthly => "monthly",
        }
    }

    const fn is_recurring(self) -> bool {
        matches!(self, Self::Monthly)
    }
}

/// A created Checkout session.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutSession {
    pub id: String,
    /// Hosted payment page to redirect the donor to.
    pub url: Option<String>,
}

/// Parameters for a donation Checkout session.
#[derive(Debug, Clone)]
pub struct DonationSession {
    pub amount: Money,
    pub frequency: DonationFrequency,
    pub locale: Locale,
    /// Origin the success/cancel pages live under.
    pub origin: String,
}

/// Stripe API client.
#[derive(Clone)]
pub struct StripeClient {
    client: reqwest::Client,
    secret_key: String,
}

impl StripeClient {
    #[must_use]
    pub fn new(config: &StripeConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            secret_key: config.secret_key.expose_secret().to_string(),
        }
    }

    /// Create a donation Checkout session and return its redirect URL.
    ///
    /// # Errors
    ///
    /// Returns `StripeError` on HTTP failure, an API error status, or a
    /// session without a URL.
    #[instrument(skip(self, session), fields(amount = %session.amount, frequency = session.frequency.as_str()))]
    pub async fn create_donation_session(
        &self,
        session: &DonationSession,
    ) -> Result<(String, String), StripeError> {
        let recurring = session.frequency.is_recurring();
        let amount_in_cents = session.amount.cents().to_string();

        let name = if recurring {
            "Monthly Donation to Kehillah"
        } else {
            "Donation to Kehillah"
        };
        let description = if recurring {
            "Recurring monthly support for our community"
        } else {
            "One-time support for our community"
        };

        let success_url = format!(
            "{}/{}/donate/success?session_id={{CHECKOUT_SESSION_ID}}&frequency={}",
            session.origin,
            session.locale,
            session.frequency.as_str()
        );
        let cancel_url = format!("{}/{}/donate/cancel", session.origin, session.locale);

        let mut form: Vec<(&str, String)> = vec![
            (
                "mode",
                if recurring { "subscription" } else { "payment" }.to_string(),
            ),
            ("line_items[0][price_data][currency]", "sgd".to_string()),
            ("line_items[0][price_data][unit_amount]", amount_in_cents),
            (
                "line_items[0][price_data][product_data][name]",
                name.to_string(),
            ),
            (
                "line_items[0][price_data][product_data][description]",
                description.to_string(),
            ),
            ("line_items[0][quantity]", "1".to_string()),
            ("success_url", success_url),
            ("cancel_url", cancel_url),
            ("metadata[locale]", session.locale.to_string()),
            ("metadata[frequency]", session.frequency.as_str().to_string()),
            ("metadata[source]", "website".to_string()),
        ];
        if recurring {
            form.push((
                "line_items[0][price_data][recurring][interval]",
                "month".to_string(),
            ));
        }

        let response = self
            .client
            .post(CHECKOUT_SESSIONS_URL)
            .basic_auth(&self.secret_key, None::<&str>)
            .form(&form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(StripeError::Api {
                status: status.as_u16(),
                message: message.chars().take(500).collect(),
            });
        }

        let created: CheckoutSession = response.json().await?;
        let url = created.url.ok_or(StripeError::MissingUrl)?;
        Ok((created.id, url))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn frequency_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&DonationFrequency::Monthly).unwrap(),
            "\"monthly\""
        );
        let parsed: DonationFrequency = serde_json::from_str("\"once\"").unwrap();
        assert_eq!(parsed, DonationFrequency::Once);
    }
}
