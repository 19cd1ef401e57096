//! Donation routes.
//!
//! The donation page posts to `/api/donate/checkout`, which validates the
//! request, creates a Stripe Checkout session and returns its redirect URL
//! as JSON. The success and cancel pages are plain content pages Stripe
//! redirects back to.

use askama::Template;
use askama_web::WebTemplate;
use crate::filters;
use axum::{
    Json,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode, header::ORIGIN},
    response::{IntoResponse, Response},
};
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::instrument;

use kehillah_core::{Locale, Money};

use crate::error::Result;
use crate::services::stripe::{DonationFrequency, DonationSession};
use crate::state::AppState;

use super::{BaseView, parse_locale};

/// Suggested donation amounts in whole dollars (multiples of 18).
pub const PRESET_AMOUNTS: [i64; 5] = [18, 36, 72, 180, 360];

/// Smallest accepted donation: one dollar.
pub const MIN_AMOUNT: Money = Money::from_major(1);

/// Largest accepted donation.
pub const MAX_AMOUNT: Money = Money::from_major(100_000);

// =============================================================================
// Checkout API
// =============================================================================

/// Body of a donation checkout request.
///
/// Everything arrives untyped so that validation failures produce our own
/// error messages instead of deserializer rejections.
#[derive(Debug, Deserialize)]
pub struct CheckoutRequest {
    pub amount: f64,
    pub frequency: String,
    pub locale: String,
}

/// A checkout request that passed validation.
#[derive(Debug, PartialEq, Eq)]
pub struct ValidDonation {
    pub amount: Money,
    pub frequency: DonationFrequency,
    pub locale: Locale,
}

/// Why a checkout request was rejected.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DonationError {
    #[error("Donation amount must be between $1 and $100,000")]
    AmountOutOfRange,
    #[error("Donation amount must be a whole number of cents")]
    AmountNotRepresentable,
    #[error("Frequency must be 'once' or 'monthly'")]
    BadFrequency,
    #[error("Unsupported locale")]
    BadLocale,
}

/// Validate a raw checkout request into typed donation parameters.
///
/// # Errors
///
/// Returns `DonationError` when the amount is outside `$1..=$100,000` or
/// carries sub-cent precision, or when frequency or locale is not one of
/// the accepted values.
pub fn validate_request(request: &CheckoutRequest) -> std::result::Result<ValidDonation, DonationError> {
    let amount = Decimal::from_f64(request.amount)
        .ok_or(DonationError::AmountNotRepresentable)?
        .round_dp(2);
    let amount = Money::from_decimal(amount).map_err(|_| DonationError::AmountNotRepresentable)?;
    if amount < MIN_AMOUNT || amount > MAX_AMOUNT {
        return Err(DonationError::AmountOutOfRange);
    }

    let frequency = match request.frequency.as_str() {
        "once" => DonationFrequency::Once,
        "monthly" => DonationFrequency::Monthly,
        _ => return Err(DonationError::BadFrequency),
    };

    let locale = request
        .locale
        .parse::<Locale>()
        .map_err(|_| DonationError::BadLocale)?;

    Ok(ValidDonation {
        amount,
        frequency,
        locale,
    })
}

#[derive(Debug, Serialize)]
struct CheckoutResponse {
    #[serde(rename = "sessionId")]
    session_id: String,
    url: String,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

fn error_json(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
        .into_response()
}

/// Create a Stripe Checkout session for a donation.
///
/// Only requests from an allowed origin are accepted. The origin is also
/// what Stripe redirects back to after payment.
#[instrument(skip(state, headers, request), fields(amount = request.amount, frequency = %request.frequency))]
pub async fn checkout(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<CheckoutRequest>,
) -> Response {
    let origin = headers
        .get(ORIGIN)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();
    if !state.config().stripe.is_allowed_origin(origin) {
        tracing::warn!(origin, "Donation checkout from disallowed origin");
        return error_json(StatusCode::FORBIDDEN, "Origin not allowed");
    }

    let donation = match validate_request(&request) {
        Ok(donation) => donation,
        Err(e) => return error_json(StatusCode::BAD_REQUEST, e.to_string()),
    };

    let session = DonationSession {
        amount: donation.amount,
        frequency: donation.frequency,
        locale: donation.locale,
        origin: origin.to_string(),
    };

    match state.stripe().create_donation_session(&session).await {
        Ok((session_id, url)) => Json(CheckoutResponse { session_id, url }).into_response(),
        Err(e) => {
            tracing::error!("Failed to create checkout session: {e}");
            error_json(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Unable to start the donation checkout",
            )
        }
    }
}

// =============================================================================
// Pages
// =============================================================================

/// Donation page template.
#[derive(Template, WebTemplate)]
#[template(path = "donate/show.html")]
pub struct DonateTemplate {
    pub base: BaseView,
    pub heading: String,
    pub intro: String,
    pub presets: Vec<i64>,
    pub label_custom_amount: String,
    pub label_once: String,
    pub label_monthly: String,
    pub label_submit: String,
    pub label_error: String,
}

/// Donation success template.
#[derive(Template, WebTemplate)]
#[template(path = "donate/success.html")]
pub struct DonateSuccessTemplate {
    pub base: BaseView,
    pub heading: String,
    pub message: String,
    pub recurring_note: Option<String>,
}

/// Donation cancel template.
#[derive(Template, WebTemplate)]
#[template(path = "donate/cancel.html")]
pub struct DonateCancelTemplate {
    pub base: BaseView,
    pub heading: String,
    pub message: String,
}

/// Display donation page.
#[instrument(skip(state, session))]
pub async fn show(
    State(state): State<AppState>,
    session: tower_sessions::Session,
    Path(locale): Path<String>,
) -> Result<DonateTemplate> {
    let locale = parse_locale(&locale)?;
    let messages = state.messages();
    let base = BaseView::build(&state, &session, locale, messages.lookup(locale, "donate.title")).await;
    Ok(DonateTemplate {
        base,
        heading: messages.lookup(locale, "donate.heading").to_string(),
        intro: messages.lookup(locale, "donate.intro").to_string(),
        presets: PRESET_AMOUNTS.to_vec(),
        label_custom_amount: messages.lookup(locale, "donate.custom_amount").to_string(),
        label_once: messages.lookup(locale, "donate.once").to_string(),
        label_monthly: messages.lookup(locale, "donate.monthly").to_string(),
        label_submit: messages.lookup(locale, "donate.submit").to_string(),
        label_error: messages.lookup(locale, "donate.error").to_string(),
    })
}

/// Query parameters on the Stripe success redirect.
#[derive(Debug, Deserialize)]
pub struct SuccessQuery {
    #[serde(default)]
    pub frequency: Option<String>,
}

/// Display donation success page.
#[instrument(skip(state, session))]
pub async fn success(
    State(state): State<AppState>,
    session: tower_sessions::Session,
    Path(locale): Path<String>,
    Query(query): Query<SuccessQuery>,
) -> Result<DonateSuccessTemplate> {
    let locale = parse_locale(&locale)?;
    let messages = state.messages();
    let base = BaseView::build(
        &state,
        &session,
        locale,
        messages.lookup(locale, "donate.success_title"),
    )
    .await;
    let recurring_note = (query.frequency.as_deref() == Some("monthly"))
        .then(|| messages.lookup(locale, "donate.recurring_note").to_string());
    Ok(DonateSuccessTemplate {
        base,
        heading: messages.lookup(locale, "donate.success_title").to_string(),
        message: messages.lookup(locale, "donate.success_message").to_string(),
        recurring_note,
    })
}

/// Display donation cancel page.
#[instrument(skip(state, session))]
pub async fn cancel(
    State(state): State<AppState>,
    session: tower_sessions::Session,
    Path(locale): Path<String>,
) -> Result<DonateCancelTemplate> {
    let locale = parse_locale(&locale)?;
    let messages = state.messages();
    let base = BaseView::build(
        &state,
        &session,
        locale,
        messages.lookup(locale, "donate.cancel_title"),
    )
    .await;
    Ok(DonateCancelTemplate {
        base,
        heading: messages.lookup(locale, "donate.cancel_title").to_string(),
        message: messages.lookup(locale, "donate.cancel_message").to_string(),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn request(amount: f64, frequency: &str, locale: &str) -> CheckoutRequest {
        CheckoutRequest {
            amount,
            frequency: frequency.to_string(),
            locale: locale.to_string(),
        }
    }

    #[test]
    fn accepts_amounts_inside_the_range() {
        for amount in [1.0, 18.0, 36.5, 100_000.0] {
            let valid = validate_request(&request(amount, "once", "en")).unwrap();
            assert_eq!(valid.frequency, DonationFrequency::Once);
        }
        let valid = validate_request(&request(36.5, "monthly", "he")).unwrap();
        assert_eq!(valid.amount, Money::from_cents(3650));
        assert_eq!(valid.locale, Locale::He);
    }

    #[test]
    fn rejects_amounts_outside_the_range() {
        for amount in [0.0, 0.99, -5.0, 100_000.01, 1_000_000.0] {
            assert_eq!(
                validate_request(&request(amount, "once", "en")).unwrap_err(),
                DonationError::AmountOutOfRange,
                "amount {amount}"
            );
        }
    }

    #[test]
    fn rejects_non_finite_amounts() {
        for amount in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            assert_eq!(
                validate_request(&request(amount, "once", "en")).unwrap_err(),
                DonationError::AmountNotRepresentable
            );
        }
    }

    #[test]
    fn rejects_unknown_frequency_and_locale() {
        assert_eq!(
            validate_request(&request(18.0, "weekly", "en")).unwrap_err(),
            DonationError::BadFrequency
        );
        assert_eq!(
            validate_request(&request(18.0, "once", "fr")).unwrap_err(),
            DonationError::BadLocale
        );
    }

    #[test]
    fn fractional_cents_round_to_the_nearest_cent() {
        // Float noise like 18.000000000000004 must not fail validation.
        let valid = validate_request(&request(18.000_000_000_000_004, "once", "en")).unwrap();
        assert_eq!(valid.amount, Money::from_cents(1800));
    }
}
