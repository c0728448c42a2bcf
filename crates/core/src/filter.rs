//! Inventory filtering.
//!
//! The storefront loads every approved listing and narrows the collection in
//! memory. A listing passes when it satisfies every criterion at once:
//!
//! - price, year and mileage fall inside their ranges (bounds inclusive, an
//!   absent bound is open)
//! - the coach type matches ignoring case, unless the filter leaves it blank
//! - the location contains the filter text ignoring case, unless blank
//!
//! Input order is preserved. There is no pagination.

use serde::{Deserialize, Serialize};

use crate::listing::Listing;
use crate::types::Price;

/// An inclusive range with optional bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeFilter<T> {
    pub min: Option<T>,
    pub max: Option<T>,
}

impl<T> Default for RangeFilter<T> {
    fn default() -> Self {
        Self::unbounded()
    }
}

impl<T> RangeFilter<T> {
    #[must_use]
    pub const fn unbounded() -> Self {
        Self {
            min: None,
            max: None,
        }
    }

    #[must_use]
    pub const fn between(min: T, max: T) -> Self {
        Self {
            min: Some(min),
            max: Some(max),
        }
    }
}

impl<T: PartialOrd> RangeFilter<T> {
    /// Whether `value` satisfies both bounds.
    pub fn contains(&self, value: &T) -> bool {
        self.min.as_ref().is_none_or(|min| value >= min)
            && self.max.as_ref().is_none_or(|max| value <= max)
    }
}

/// Storefront inventory filter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingFilter {
    pub price: RangeFilter<Price>,
    pub year: RangeFilter<i32>,
    pub mileage: RangeFilter<i32>,
    pub coach_type: Option<String>,
    pub location: Option<String>,
}

impl ListingFilter {
    /// Whether one listing passes every criterion.
    #[must_use]
    pub fn matches(&self, listing: &Listing) -> bool {
        self.price.contains(&listing.price)
            && self.year.contains(&listing.year)
            && self.mileage.contains(&listing.mileage)
            && self.matches_coach_type(listing)
            && self.matches_location(listing)
    }

    /// The listings that pass, in their original order.
    #[must_use]
    pub fn apply(&self, listings: &[Listing]) -> Vec<Listing> {
        listings
            .iter()
            .filter(|listing| self.matches(listing))
            .cloned()
            .collect()
    }

    fn matches_coach_type(&self, listing: &Listing) -> bool {
        match non_blank(self.coach_type.as_deref()) {
            None => true,
            Some(wanted) => listing.coach_type.as_str().eq_ignore_ascii_case(wanted),
        }
    }

    fn matches_location(&self, listing: &Listing) -> bool {
        match non_blank(self.location.as_deref()) {
            None => true,
            Some(wanted) => listing
                .location
                .to_lowercase()
                .contains(&wanted.to_lowercase()),
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::types::{CoachType, ListingId, ListingStatus, Slug};

    fn listing(id: i32, price: i64, year: i32, mileage: i32, kind: CoachType, location: &str) -> Listing {
        let now = Utc::now();
        Listing {
            id: ListingId::new(id),
            slug: Slug::parse(&format!("listing-{id}")).unwrap(),
            title: format!("Listing {id}"),
            year,
            make: "Prevost".to_owned(),
            model: "H3-45".to_owned(),
            mileage,
            price: Price::from_dollars(price).unwrap(),
            location: location.to_owned(),
            coach_type: kind,
            hero_image_url: None,
            gallery: Vec::new(),
            comments: String::new(),
            status: ListingStatus::Approved,
            created_at: now,
            updated_at: now,
        }
    }

    fn inventory() -> Vec<Listing> {
        vec![
            listing(1, 950_000, 2015, 210_000, CoachType::Motorhome, "Dallas, TX"),
            listing(2, 1_850_000, 2020, 48_000, CoachType::Entertainer, "Nashville, TN"),
            listing(3, 2_400_000, 2023, 9_000, CoachType::Motorhome, "Naples, FL"),
            listing(4, 3_000_000, 2025, 0, CoachType::Entertainer, "Austin, TX"),
        ]
    }

    fn ids(listings: &[Listing]) -> Vec<i32> {
        listings.iter().map(|l| l.id.as_i32()).collect()
    }

    #[test]
    fn test_default_filter_keeps_everything_in_order() {
        let all = inventory();
        assert_eq!(ids(&ListingFilter::default().apply(&all)), [1, 2, 3, 4]);
    }

    #[test]
    fn test_bounds_are_inclusive() {
        let filter = ListingFilter {
            price: RangeFilter::between(
                Price::from_dollars(950_000).unwrap(),
                Price::from_dollars(2_400_000).unwrap(),
            ),
            year: RangeFilter::between(2015, 2023),
            mileage: RangeFilter::between(9_000, 210_000),
            ..ListingFilter::default()
        };
        assert_eq!(ids(&filter.apply(&inventory())), [1, 2, 3]);
    }

    #[test]
    fn test_open_bounds() {
        let filter = ListingFilter {
            year: RangeFilter {
                min: Some(2020),
                max: None,
            },
            mileage: RangeFilter {
                min: None,
                max: Some(48_000),
            },
            ..ListingFilter::default()
        };
        assert_eq!(ids(&filter.apply(&inventory())), [2, 3, 4]);
    }

    #[test]
    fn test_coach_type_ignores_case() {
        let filter = ListingFilter {
            coach_type: Some("ENTERTAINER".to_owned()),
            ..ListingFilter::default()
        };
        assert_eq!(ids(&filter.apply(&inventory())), [2, 4]);

        let blank = ListingFilter {
            coach_type: Some("  ".to_owned()),
            ..ListingFilter::default()
        };
        assert_eq!(blank.apply(&inventory()).len(), 4);
    }

    #[test]
    fn test_location_is_case_insensitive_substring() {
        let filter = ListingFilter {
            location: Some("tx".to_owned()),
            ..ListingFilter::default()
        };
        assert_eq!(ids(&filter.apply(&inventory())), [1, 4]);
    }

    #[test]
    fn test_criteria_are_conjunctive() {
        let filter = ListingFilter {
            coach_type: Some("entertainer".to_owned()),
            location: Some("tx".to_owned()),
            price: RangeFilter {
                min: None,
                max: Some(Price::from_dollars(2_999_999).unwrap()),
            },
            ..ListingFilter::default()
        };
        assert!(filter.apply(&inventory()).is_empty());
    }
}
