//! Asking price for a listing.
//!
//! Prices are whole-currency amounts in USD held as a [`Decimal`] so that the
//! inventory filter compares exact values. Form input such as `"$1,250,000"`
//! is accepted; anything that is not a non-negative number is rejected rather
//! than stored as a sentinel.

use core::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

/// Errors that can occur when parsing a [`Price`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// The input is empty.
    #[error("price is required")]
    Empty,
    /// The input is not a number.
    #[error("price must be a number")]
    NotANumber,
    /// The input is negative.
    #[error("price cannot be negative")]
    Negative,
}

/// A non-negative asking price in whole US dollars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Price(Decimal);

impl Price {
    /// A zero price, shown as "Contact for Price".
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a price from a whole-dollar amount.
    ///
    /// # Errors
    ///
    /// Returns `PriceError::Negative` for negative amounts.
    pub fn from_dollars(dollars: i64) -> Result<Self, PriceError> {
        if dollars < 0 {
            return Err(PriceError::Negative);
        }
        Ok(Self(Decimal::from(dollars)))
    }

    /// Parse a price from form input.
    ///
    /// Leading `$`, thousands separators and surrounding whitespace are
    /// ignored. Fractional cents are truncated to whole dollars.
    ///
    /// # Errors
    ///
    /// Returns a [`PriceError`] if the input is empty, not numeric or negative.
    pub fn parse(input: &str) -> Result<Self, PriceError> {
        let cleaned: String = input
            .trim()
            .trim_start_matches('$')
            .chars()
            .filter(|c| *c != ',' && !c.is_whitespace())
            .collect();

        if cleaned.is_empty() {
            return Err(PriceError::Empty);
        }

        let amount = Decimal::from_str(&cleaned).map_err(|_| PriceError::NotANumber)?;
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PriceError::Negative);
        }

        Ok(Self(amount.trunc()))
    }

    /// The underlying amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Whether the seller left the price open.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Human readable price, e.g. `$1,250,000` or `Contact for Price`.
    #[must_use]
    pub fn display(&self) -> String {
        if self.is_zero() {
            return "Contact for Price".to_owned();
        }

        let digits = self.0.trunc().abs().to_string();
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
        for (i, c) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(c);
        }
        format!("${grouped}")
    }
}

impl Default for Price {
    fn default() -> Self {
        Self::ZERO
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

impl FromStr for Price {
    type Err = PriceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Accepts form-style strings and JSON numbers, both through [`Price::parse`].
impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Whole(i64),
            Fractional(f64),
        }

        let raw = match Raw::deserialize(deserializer)? {
            Raw::Text(text) => text,
            Raw::Whole(n) => n.to_string(),
            Raw::Fractional(n) => n.to_string(),
        };
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Price {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <Decimal as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <Decimal as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Price {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let amount = <Decimal as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self(amount))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Price {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <Decimal as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_and_formatted() {
        assert_eq!(
            Price::parse("250000").unwrap(),
            Price::from_dollars(250_000).unwrap()
        );
        assert_eq!(
            Price::parse(" $1,250,000 ").unwrap(),
            Price::from_dollars(1_250_000).unwrap()
        );
        assert_eq!(
            Price::parse("99999.99").unwrap(),
            Price::from_dollars(99_999).unwrap()
        );
    }

    #[test]
    fn test_parse_rejects_non_numeric() {
        assert_eq!(Price::parse("call me"), Err(PriceError::NotANumber));
        assert_eq!(Price::parse("NaN"), Err(PriceError::NotANumber));
        assert_eq!(Price::parse(""), Err(PriceError::Empty));
        assert_eq!(Price::parse("-5"), Err(PriceError::Negative));
    }

    #[test]
    fn test_deserialize_goes_through_parse() {
        let text: Price = serde_json::from_str("\"$1,250,000\"").unwrap();
        assert_eq!(text, Price::from_dollars(1_250_000).unwrap());

        let number: Price = serde_json::from_str("425000").unwrap();
        assert_eq!(number, Price::from_dollars(425_000).unwrap());

        let cents: Price = serde_json::from_str("99.5").unwrap();
        assert_eq!(cents, Price::from_dollars(99).unwrap());

        assert!(serde_json::from_str::<Price>("-5").is_err());
        assert!(serde_json::from_str::<Price>("\"call me\"").is_err());
    }

    #[test]
    fn test_serialized_price_deserializes() {
        let price = Price::from_dollars(1_450_000).unwrap();
        let json = serde_json::to_string(&price).unwrap();
        assert_eq!(serde_json::from_str::<Price>(&json).unwrap(), price);
    }

    #[test]
    fn test_display_groups_thousands() {
        assert_eq!(Price::from_dollars(950).unwrap().display(), "$950");
        assert_eq!(Price::from_dollars(1_000).unwrap().display(), "$1,000");
        assert_eq!(
            Price::from_dollars(2_450_000).unwrap().display(),
            "$2,450,000"
        );
        assert_eq!(Price::ZERO.display(), "Contact for Price");
    }

    #[test]
    fn test_ordering_follows_amount() {
        let low = Price::from_dollars(100_000).unwrap();
        let high = Price::from_dollars(3_000_000).unwrap();
        assert!(low < high);
    }
}
