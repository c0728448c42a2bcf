//! Coach listings and the forms that create and edit them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{CoachType, ListingId, ListingStatus, Price, Slug};
use crate::validation::{ValidationError, optional_text};

/// A coach for sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
pub struct Listing {
    pub id: ListingId,
    pub slug: Slug,
    pub title: String,
    pub year: i32,
    pub make: String,
    pub model: String,
    pub mileage: i32,
    pub price: Price,
    pub location: String,
    pub coach_type: CoachType,
    pub hero_image_url: Option<String>,
    /// Gallery image URLs in upload order.
    pub gallery: Vec<String>,
    pub comments: String,
    pub status: ListingStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Listing {
    /// Whether the listing is visible on the storefront.
    #[must_use]
    pub fn is_public(&self) -> bool {
        self.status == ListingStatus::Approved
    }

    /// Apply an edit in place.
    pub fn apply(&mut self, changes: &ListingChanges, now: DateTime<Utc>) {
        self.title.clone_from(&changes.title);
        self.year = changes.year;
        self.make.clone_from(&changes.make);
        self.model.clone_from(&changes.model);
        self.mileage = changes.mileage;
        self.price = changes.price;
        self.location.clone_from(&changes.location);
        self.coach_type = changes.coach_type;
        self.hero_image_url.clone_from(&changes.hero_image_url);
        self.gallery.clone_from(&changes.gallery);
        self.comments.clone_from(&changes.comments);
        self.updated_at = now;
    }
}

/// Default listing title: `"{year} {make} {model}"`.
#[must_use]
pub fn derive_title(year: i32, make: &str, model: &str) -> String {
    format!("{year} {make} {model}")
}

/// Listing form fields exactly as submitted.
///
/// Numbers arrive as text; [`ListingForm::validate`] parses them.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListingForm {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub year: String,
    #[serde(default)]
    pub make: String,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub mileage: String,
    #[serde(default)]
    pub price: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub coach_type: Option<String>,
    #[serde(default)]
    pub comments: Option<String>,
    /// Admin edit only: replace the hero image URL without uploading.
    #[serde(default)]
    pub hero_image_url: Option<String>,
}

impl ListingForm {
    /// Parse and check every field, collecting all failures.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] naming each blank required field and each
    /// numeric field (`year`, `mileage`, `price`) that is not a number.
    pub fn validate(&self) -> Result<ListingDraft, ValidationError> {
        let mut errors = ValidationError::new();

        let year = errors.whole_number("year", &self.year);
        let make = errors.required_text("make", &self.make);
        let model = errors.required_text("model", &self.model);
        let mileage = errors.whole_number("mileage", &self.mileage);
        let price = match Price::parse(&self.price) {
            Ok(price) => Some(price),
            Err(e) => {
                errors.add("price", e.to_string());
                None
            }
        };
        let location = errors.required_text("location", &self.location);

        let coach_type = match optional_text(self.coach_type.as_deref()) {
            None => CoachType::default(),
            Some(raw) => raw.parse().unwrap_or_else(|e: String| {
                errors.add("coach_type", e);
                CoachType::default()
            }),
        };

        match (year, mileage, price) {
            (Some(year), Some(mileage), Some(price)) if errors.is_empty() => Ok(ListingDraft {
                title: optional_text(self.title.as_deref()),
                year,
                make,
                model,
                mileage,
                price,
                location,
                coach_type,
                comments: optional_text(self.comments.as_deref()).unwrap_or_default(),
                hero_image_url: optional_text(self.hero_image_url.as_deref()),
            }),
            _ => Err(errors),
        }
    }
}

/// A validated listing form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingDraft {
    /// Explicit title, if the form supplied one.
    pub title: Option<String>,
    pub year: i32,
    pub make: String,
    pub model: String,
    pub mileage: i32,
    pub price: Price,
    pub location: String,
    pub coach_type: CoachType,
    pub comments: String,
    pub hero_image_url: Option<String>,
}

impl ListingDraft {
    /// Slug derived from make, model and year.
    #[must_use]
    pub fn slug(&self) -> Slug {
        Slug::for_listing(&self.make, &self.model, &self.year.to_string())
    }

    /// The explicit title, or the derived one.
    #[must_use]
    pub fn title(&self) -> String {
        self.title
            .clone()
            .unwrap_or_else(|| derive_title(self.year, &self.make, &self.model))
    }

    /// Compose a record ready for insertion.
    #[must_use]
    pub fn into_new_listing(
        self,
        slug: Slug,
        hero_image_url: Option<String>,
        gallery: Vec<String>,
        status: ListingStatus,
    ) -> NewListing {
        let title = self.title();
        NewListing {
            slug,
            title,
            year: self.year,
            make: self.make,
            model: self.model,
            mileage: self.mileage,
            price: self.price,
            location: self.location,
            coach_type: self.coach_type,
            hero_image_url: hero_image_url.or(self.hero_image_url),
            gallery,
            comments: self.comments,
            status,
        }
    }

    /// Compose an edit of `existing`.
    ///
    /// A blank title keeps the current one. A new hero upload wins over a
    /// typed URL, which wins over the current image. New gallery images are
    /// appended.
    #[must_use]
    pub fn into_changes(
        self,
        existing: &Listing,
        uploaded_hero: Option<String>,
        uploaded_gallery: Vec<String>,
    ) -> ListingChanges {
        let mut gallery = existing.gallery.clone();
        gallery.extend(uploaded_gallery);
        ListingChanges {
            title: self.title.unwrap_or_else(|| existing.title.clone()),
            year: self.year,
            make: self.make,
            model: self.model,
            mileage: self.mileage,
            price: self.price,
            location: self.location,
            coach_type: self.coach_type,
            hero_image_url: uploaded_hero
                .or(self.hero_image_url)
                .or_else(|| existing.hero_image_url.clone()),
            gallery,
            comments: self.comments,
        }
    }
}

/// A listing to insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewListing {
    pub slug: Slug,
    pub title: String,
    pub year: i32,
    pub make: String,
    pub model: String,
    pub mileage: i32,
    pub price: Price,
    pub location: String,
    pub coach_type: CoachType,
    pub hero_image_url: Option<String>,
    pub gallery: Vec<String>,
    pub comments: String,
    pub status: ListingStatus,
}

/// Full replacement of a listing's editable fields. Slug and status are
/// not editable here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingChanges {
    pub title: String,
    pub year: i32,
    pub make: String,
    pub model: String,
    pub mileage: i32,
    pub price: Price,
    pub location: String,
    pub coach_type: CoachType,
    pub hero_image_url: Option<String>,
    pub gallery: Vec<String>,
    pub comments: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn form() -> ListingForm {
        ListingForm {
            year: "2020".to_owned(),
            make: "Prevost".to_owned(),
            model: "H3-45".to_owned(),
            mileage: "48,000".to_owned(),
            price: "$1,850,000".to_owned(),
            location: "Nashville, TN".to_owned(),
            coach_type: Some("entertainer".to_owned()),
            ..ListingForm::default()
        }
    }

    #[test]
    fn test_validate_parses_numbers_and_derives_title() {
        let draft = form().validate().unwrap();
        assert_eq!(draft.year, 2020);
        assert_eq!(draft.mileage, 48_000);
        assert_eq!(draft.price, Price::from_dollars(1_850_000).unwrap());
        assert_eq!(draft.coach_type, CoachType::Entertainer);
        assert_eq!(draft.title(), "2020 Prevost H3-45");
        assert_eq!(draft.slug().as_str(), "prevost-h3-45-2020");
    }

    #[test]
    fn test_validate_rejects_non_numeric_price() {
        let mut form = form();
        form.price = "make an offer".to_owned();
        let err = form.validate().unwrap_err();
        assert!(err.has("price"));
        assert!(!err.has("year"));
    }

    #[test]
    fn test_validate_collects_every_failure() {
        let form = ListingForm {
            coach_type: Some("tour bus".to_owned()),
            ..ListingForm::default()
        };
        let err = form.validate().unwrap_err();
        for field in [
            "year",
            "make",
            "model",
            "mileage",
            "price",
            "location",
            "coach_type",
        ] {
            assert!(err.has(field), "missing error for {field}");
        }
    }

    #[test]
    fn test_coach_type_defaults_to_motorhome() {
        let mut form = form();
        form.coach_type = None;
        assert_eq!(form.validate().unwrap().coach_type, CoachType::Motorhome);
    }

    #[test]
    fn test_into_changes_keeps_title_and_appends_gallery() {
        let now = Utc::now();
        let existing = Listing {
            id: ListingId::new(1),
            slug: Slug::parse("prevost-h3-45-2020").unwrap(),
            title: "Custom Title".to_owned(),
            year: 2020,
            make: "Prevost".to_owned(),
            model: "H3-45".to_owned(),
            mileage: 40_000,
            price: Price::from_dollars(1_900_000).unwrap(),
            location: "Nashville, TN".to_owned(),
            coach_type: CoachType::Entertainer,
            hero_image_url: Some("https://img/hero.jpg".to_owned()),
            gallery: vec!["https://img/1.jpg".to_owned()],
            comments: String::new(),
            status: ListingStatus::Approved,
            created_at: now,
            updated_at: now,
        };

        let changes =
            form()
                .validate()
                .unwrap()
                .into_changes(&existing, None, vec!["https://img/2.jpg".to_owned()]);
        assert_eq!(changes.title, "Custom Title");
        assert_eq!(changes.hero_image_url.as_deref(), Some("https://img/hero.jpg"));
        assert_eq!(changes.gallery, ["https://img/1.jpg", "https://img/2.jpg"]);
        assert_eq!(changes.mileage, 48_000);
    }
}
