//! Fixed-point money in integer minor units.
//!
//! All monetary amounts in the system are Singapore dollars. Internally a
//! [`Money`] is an `i64` number of cents, so repeated additions and the
//! free-shipping threshold comparison are exact. Conversion to and from
//! decimal major units happens only at the boundaries: deserializing CMS
//! prices and formatting for display.

use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul};

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors converting decimal amounts into [`Money`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MoneyError {
    /// The amount has more than two fractional digits of precision.
    #[error("amount {0} is not representable in cents")]
    PrecisionLoss(Decimal),
    /// The amount does not fit in an `i64` number of cents.
    #[error("amount {0} is out of range")]
    OutOfRange(Decimal),
}

/// A monetary amount in cents (SGD).
///
/// Serializes transparently as the integer cent count, which is the form
/// persisted in the session cart.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Self = Self(0);

    /// Create a money amount from a cent count.
    #[must_use]
    pub const fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    /// Create a money amount from whole dollars.
    #[must_use]
    pub const fn from_major(dollars: i64) -> Self {
        Self(dollars * 100)
    }

    /// The underlying cent count.
    #[must_use]
    pub const fn cents(self) -> i64 {
        self.0
    }

    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Convert a decimal major-unit amount (e.g. `12.50`) into cents.
    ///
    /// # Errors
    ///
    /// Returns `MoneyError` if the amount carries sub-cent precision or does
    /// not fit in an `i64`.
    pub fn from_decimal(amount: Decimal) -> Result<Self, MoneyError> {
        let cents = amount
            .checked_mul(Decimal::ONE_HUNDRED)
            .ok_or(MoneyError::OutOfRange(amount))?;
        if cents.fract() != Decimal::ZERO {
            return Err(MoneyError::PrecisionLoss(amount));
        }
        cents
            .to_i64()
            .map(Self)
            .ok_or(MoneyError::OutOfRange(amount))
    }

    /// The amount in decimal major units, e.g. `Decimal(12.50)`.
    #[must_use]
    pub fn to_decimal(self) -> Decimal {
        Decimal::new(self.0, 2)
    }
}

impl fmt::Display for Money {
    /// Formats as a display price, e.g. `$12.50` or `-$0.75`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let cents = self.0.unsigned_abs();
        write!(f, "{sign}${}.{:02}", cents / 100, cents % 100)
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Mul<u32> for Money {
    type Output = Self;

    fn mul(self, rhs: u32) -> Self {
        Self(self.0 * i64::from(rhs))
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

/// Serde helpers for monetary fields expressed in decimal major units.
///
/// CMS product prices arrive as JSON numbers like `12.5`; these helpers
/// convert them to and from cents at the deserialization boundary.
pub mod major {
    use rust_decimal::Decimal;
    use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
    use serde::{Deserialize, Deserializer, Serializer, de};

    use super::Money;

    /// # Errors
    ///
    /// Fails if the underlying serializer rejects the value.
    pub fn serialize<S: Serializer>(money: &Money, serializer: S) -> Result<S::Ok, S::Error> {
        let amount = money
            .to_decimal()
            .to_f64()
            .ok_or_else(|| serde::ser::Error::custom("amount out of range"))?;
        serializer.serialize_f64(amount)
    }

    /// # Errors
    ///
    /// Fails on non-finite numbers or sub-cent precision.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Money, D::Error> {
        let raw = f64::deserialize(deserializer)?;
        let amount = Decimal::from_f64(raw)
            .ok_or_else(|| de::Error::custom(format!("invalid amount: {raw}")))?
            // CMS editors enter prices with at most two decimals; anything
            // beyond that is float noise from the JSON number itself.
            .round_dp(2);
        Money::from_decimal(amount).map_err(de::Error::custom)
    }
}

/// Like [`major`], for optional fields.
pub mod major_opt {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use super::Money;

    #[derive(serde::Serialize, serde::Deserialize)]
    #[serde(transparent)]
    struct Wrapper(#[serde(with = "super::major")] Money);

    /// # Errors
    ///
    /// Fails if the underlying serializer rejects the value.
    pub fn serialize<S: Serializer>(
        money: &Option<Money>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        money.map(Wrapper).serialize(serializer)
    }

    /// # Errors
    ///
    /// Fails on non-finite numbers or sub-cent precision.
    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Money>, D::Error> {
        Ok(Option::<Wrapper>::deserialize(deserializer)?.map(|w| w.0))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    #[test]
    fn from_decimal_exact_cents() {
        let m = Money::from_decimal(Decimal::new(1250, 2)).unwrap();
        assert_eq!(m.cents(), 1250);
    }

    #[test]
    fn from_decimal_rejects_sub_cent_precision() {
        let err = Money::from_decimal(Decimal::new(12505, 3)).unwrap_err();
        assert!(matches!(err, MoneyError::PrecisionLoss(_)));
    }

    #[test]
    fn display_formats_dollars_and_cents() {
        assert_eq!(Money::from_cents(805).to_string(), "$8.05");
        assert_eq!(Money::from_cents(80).to_string(), "$0.80");
        assert_eq!(Money::from_major(150).to_string(), "$150.00");
        assert_eq!(Money::from_cents(-75).to_string(), "-$0.75");
    }

    #[test]
    fn arithmetic_is_exact() {
        // 0.10 + 0.20 drifts under f64; cents must not.
        let sum: Money = std::iter::repeat_n(Money::from_cents(10), 3).sum();
        assert_eq!(sum, Money::from_cents(30));
        assert_eq!(Money::from_cents(550) * 3, Money::from_cents(1650));
    }

    #[test]
    fn major_serde_round_trip() {
        #[derive(serde::Serialize, serde::Deserialize)]
        struct Priced {
            #[serde(with = "major")]
            price: Money,
        }

        let parsed: Priced = serde_json::from_str(r#"{"price":36.5}"#).unwrap();
        assert_eq!(parsed.price, Money::from_cents(3650));

        let json = serde_json::to_string(&parsed).unwrap();
        assert_eq!(json, r#"{"price":36.5}"#);
    }
}
