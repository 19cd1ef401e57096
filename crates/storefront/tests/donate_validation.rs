//! Donation request validation and origin allowlisting, exercised from
//! outside the crate the way the checkout handler uses them.

#![allow(clippy::unwrap_used)]

use secrecy::SecretString;

use kehillah_core::{Locale, Money};
use kehillah_storefront::config::StripeConfig;
use kehillah_storefront::routes::donate::{
    CheckoutRequest, DonationError, MAX_AMOUNT, MIN_AMOUNT, PRESET_AMOUNTS, validate_request,
};
use kehillah_storefront::services::stripe::DonationFrequency;

fn request(amount: f64, frequency: &str, locale: &str) -> CheckoutRequest {
    CheckoutRequest {
        amount,
        frequency: frequency.to_string(),
        locale: locale.to_string(),
    }
}

#[test]
fn every_preset_amount_validates() {
    for preset in PRESET_AMOUNTS {
        #[allow(clippy::cast_precision_loss)]
        let valid = validate_request(&request(preset as f64, "monthly", "he"))
            .unwrap_or_else(|e| panic!("preset {preset} rejected: {e}"));
        assert_eq!(valid.amount, Money::from_major(preset));
        assert_eq!(valid.frequency, DonationFrequency::Monthly);
        assert_eq!(valid.locale, Locale::He);
    }
}

#[test]
fn range_boundaries_are_inclusive() {
    let low = validate_request(&request(1.0, "once", "en")).unwrap();
    assert_eq!(low.amount, MIN_AMOUNT);

    let high = validate_request(&request(100_000.0, "once", "en")).unwrap();
    assert_eq!(high.amount, MAX_AMOUNT);

    assert_eq!(
        validate_request(&request(0.99, "once", "en")).unwrap_err(),
        DonationError::AmountOutOfRange
    );
    assert_eq!(
        validate_request(&request(100_000.01, "once", "en")).unwrap_err(),
        DonationError::AmountOutOfRange
    );
}

#[test]
fn rejection_messages_are_donor_facing() {
    let err = validate_request(&request(0.0, "once", "en")).unwrap_err();
    assert_eq!(err.to_string(), "Donation amount must be between $1 and $100,000");

    let err = validate_request(&request(18.0, "forever", "en")).unwrap_err();
    assert_eq!(err.to_string(), "Frequency must be 'once' or 'monthly'");
}

#[test]
fn origin_allowlist_matches_exactly() {
    let config = StripeConfig {
        secret_key: SecretString::from("sk_test_0000000000000000000000000000"),
        allowed_origins: vec![
            "https://kehillah.sg".to_string(),
            "http://localhost:3000".to_string(),
        ],
    };

    assert!(config.is_allowed_origin("https://kehillah.sg"));
    assert!(config.is_allowed_origin("https://kehillah.sg/"));
    assert!(config.is_allowed_origin("http://localhost:3000"));

    assert!(!config.is_allowed_origin("https://evil.example"));
    assert!(!config.is_allowed_origin("https://kehillah.sg.evil.example"));
    assert!(!config.is_allowed_origin(""));
}
