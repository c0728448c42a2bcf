//! Status and category enums for marketplace records.

use core::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Moderation status of a listing.
///
/// Public submissions start `Pending` and only appear in the storefront once
/// an admin approves them. Listings created by an admin start `Approved`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ListingStatus {
    #[default]
    Pending,
    Approved,
}

impl ListingStatus {
    /// Lowercase name as stored and serialized.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
        }
    }
}

impl fmt::Display for ListingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ListingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            other => Err(format!("invalid listing status: {other}")),
        }
    }
}

/// Body style of a coach.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CoachType {
    /// Private motorhome conversion.
    #[default]
    Motorhome,
    /// Entertainer coach (touring bus with bunks and lounges).
    Entertainer,
}

impl CoachType {
    /// All coach types, in display order.
    pub const ALL: [Self; 2] = [Self::Motorhome, Self::Entertainer];

    /// Display name, e.g. `Motorhome`.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Motorhome => "Motorhome",
            Self::Entertainer => "Entertainer",
        }
    }
}

impl fmt::Display for CoachType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CoachType {
    type Err = String;

    /// Case-insensitive: `"motorhome"`, `"Motorhome"` and `"MOTORHOME"` all parse.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("invalid coach type: {s}"))
    }
}

/// Stores an enum as lowercase `TEXT` (the columns carry a `CHECK`
/// constraint listing the allowed values).
#[cfg(feature = "postgres")]
macro_rules! text_column {
    ($name:ident, $to_db:expr) => {
        impl sqlx::Type<sqlx::Postgres> for $name {
            fn type_info() -> sqlx::postgres::PgTypeInfo {
                <String as sqlx::Type<sqlx::Postgres>>::type_info()
            }

            fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
                <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
            }
        }

        impl<'r> sqlx::Decode<'r, sqlx::Postgres> for $name {
            fn decode(
                value: sqlx::postgres::PgValueRef<'r>,
            ) -> Result<Self, sqlx::error::BoxDynError> {
                let s = <&str as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
                Ok(s.parse::<Self>()?)
            }
        }

        impl sqlx::Encode<'_, sqlx::Postgres> for $name {
            fn encode_by_ref(
                &self,
                buf: &mut sqlx::postgres::PgArgumentBuffer,
            ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
                let to_db: fn(&Self) -> String = $to_db;
                <String as sqlx::Encode<sqlx::Postgres>>::encode(to_db(self), buf)
            }
        }
    };
}

#[cfg(feature = "postgres")]
text_column!(ListingStatus, |s| s.as_str().to_owned());
#[cfg(feature = "postgres")]
text_column!(CoachType, |t| t.as_str().to_ascii_lowercase());

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_coach_type_parse_ignores_case() {
        assert_eq!(
            "entertainer".parse::<CoachType>().unwrap(),
            CoachType::Entertainer
        );
        assert_eq!(
            " MOTORHOME ".parse::<CoachType>().unwrap(),
            CoachType::Motorhome
        );
        assert!("bus".parse::<CoachType>().is_err());
    }

    #[test]
    fn test_coach_type_serializes_display_name() {
        assert_eq!(
            serde_json::to_string(&CoachType::Entertainer).unwrap(),
            "\"Entertainer\""
        );
    }

    #[test]
    fn test_listing_status_roundtrip() {
        assert_eq!(
            serde_json::to_string(&ListingStatus::Approved).unwrap(),
            "\"approved\""
        );
        assert_eq!(
            "Pending".parse::<ListingStatus>().unwrap(),
            ListingStatus::Pending
        );
    }
}
