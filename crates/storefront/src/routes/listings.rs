//! Coach listing route handlers.

use axum::{
    Json,
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use tracing::instrument;

use coach_exchange_core::{Listing, ListingFilter, Price, RangeFilter, Slug, ValidationError};
use coach_exchange_store::multipart::{FormSubmission, GALLERY_FIELDS};
use coach_exchange_store::Origin;

use crate::error::{AppError, Result};
use crate::middleware::RequireUser;
use crate::state::AppState;

/// Inventory filter as query parameters. Blank values leave a criterion
/// open.
#[derive(Debug, Default, Deserialize)]
pub struct FilterParams {
    pub price_min: Option<String>,
    pub price_max: Option<String>,
    pub year_min: Option<String>,
    pub year_max: Option<String>,
    pub mileage_min: Option<String>,
    pub mileage_max: Option<String>,
    pub coach_type: Option<String>,
    pub location: Option<String>,
}

fn present(value: Option<&String>) -> Option<&str> {
    value.map(|v| v.trim()).filter(|v| !v.is_empty())
}

impl FilterParams {
    /// Parse the bounds.
    ///
    /// # Errors
    ///
    /// Names every bound that is not a whole non-negative number.
    pub fn into_filter(self) -> std::result::Result<ListingFilter, ValidationError> {
        let mut errors = ValidationError::new();

        let mut price = |field: &str, value: Option<&String>| {
            let raw = present(value)?;
            Price::parse(raw)
                .map_err(|e| errors.add(field, e.to_string()))
                .ok()
        };
        let price_range = RangeFilter {
            min: price("price_min", self.price_min.as_ref()),
            max: price("price_max", self.price_max.as_ref()),
        };

        let mut number = |field: &str, value: Option<&String>| {
            present(value).and_then(|raw| errors.whole_number(field, raw))
        };
        let year = RangeFilter {
            min: number("year_min", self.year_min.as_ref()),
            max: number("year_max", self.year_max.as_ref()),
        };
        let mileage = RangeFilter {
            min: number("mileage_min", self.mileage_min.as_ref()),
            max: number("mileage_max", self.mileage_max.as_ref()),
        };

        errors.finish(ListingFilter {
            price: price_range,
            year,
            mileage,
            coach_type: present(self.coach_type.as_ref()).map(ToOwned::to_owned),
            location: present(self.location.as_ref()).map(ToOwned::to_owned),
        })
    }
}

/// `GET /api/listings` - approved listings passing the filter.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(params): Query<FilterParams>,
) -> Result<Json<Vec<Listing>>> {
    let filter = params.into_filter()?;
    let listings = state.catalog().search(&filter).await?;
    Ok(Json(listings))
}

/// `GET /api/listings/featured` - the newest approved listings.
pub async fn featured(State(state): State<AppState>) -> Result<Json<Vec<Listing>>> {
    Ok(Json(state.catalog().featured().await?))
}

/// `GET /api/listings/{slug}` - one approved listing.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<Listing>> {
    let not_found = || AppError::NotFound("Listing".to_string());
    let slug = Slug::parse(&slug).map_err(|_| not_found())?;
    let listing = state.catalog().find(&slug).await?.ok_or_else(not_found)?;
    Ok(Json(listing))
}

/// `POST /api/listings` - "list your coach".
///
/// Multipart fields as in the listing form, plus a `hero` file and any
/// number of `gallery`/`photos` files. The listing waits for approval.
#[instrument(skip(state, user, multipart), fields(user_id = %user.id))]
pub async fn create(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    multipart: Multipart,
) -> Result<(StatusCode, Json<Listing>)> {
    let mut submission = FormSubmission::read(multipart).await?;
    let form = submission.listing_form();
    let hero = submission.take_file("hero");
    let gallery = submission.take_files(&GALLERY_FIELDS);

    let listing = state
        .submissions()
        .submit_listing(&form, hero, gallery, Origin::Public)
        .await?;

    state.catalog().invalidate().await;
    tracing::info!(listing_id = %listing.id, slug = %listing.slug, "Listing submitted for review");

    Ok((StatusCode::CREATED, Json(listing)))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> FilterParams {
        let mut params = FilterParams::default();
        for (key, value) in pairs {
            let value = Some((*value).to_string());
            match *key {
                "price_min" => params.price_min = value,
                "price_max" => params.price_max = value,
                "year_min" => params.year_min = value,
                "year_max" => params.year_max = value,
                "mileage_max" => params.mileage_max = value,
                "coach_type" => params.coach_type = value,
                "location" => params.location = value,
                _ => unreachable!(),
            }
        }
        params
    }

    #[test]
    fn test_blank_params_leave_filter_open() {
        let filter = params(&[("price_min", ""), ("coach_type", "  "), ("location", "")])
            .into_filter()
            .unwrap();
        assert_eq!(filter, ListingFilter::default());
    }

    #[test]
    fn test_bounds_are_parsed() {
        let filter = params(&[
            ("price_min", "$500,000"),
            ("year_max", "2022"),
            ("mileage_max", "100,000"),
            ("coach_type", "entertainer"),
        ])
        .into_filter()
        .unwrap();

        assert_eq!(filter.price.min, Some(Price::from_dollars(500_000).unwrap()));
        assert_eq!(filter.year.max, Some(2022));
        assert_eq!(filter.mileage.max, Some(100_000));
        assert_eq!(filter.coach_type.as_deref(), Some("entertainer"));
    }

    #[test]
    fn test_bad_bounds_are_named() {
        let err = params(&[("price_max", "lots"), ("year_min", "soon")])
            .into_filter()
            .unwrap_err();
        assert!(err.has("price_max"));
        assert!(err.has("year_min"));
    }
}
