//! Listing management handlers.

use axum::{
    Json,
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
};
use tracing::instrument;

use coach_exchange_core::search::matches_query;
use coach_exchange_core::{Listing, ListingId, ListingStatus};
use coach_exchange_store::multipart::{FormSubmission, GALLERY_FIELDS};
use coach_exchange_store::{ListingQuery, Origin, StoreError};

use crate::error::{AppError, Result};
use crate::middleware::RequireAdminAuth;
use crate::routes::SearchParams;
use crate::state::AppState;

fn not_found() -> AppError {
    AppError::NotFound("Listing".to_string())
}

/// Keep listings whose title, make, model or location contains `query`.
fn search(listings: Vec<Listing>, query: &str) -> Vec<Listing> {
    listings
        .into_iter()
        .filter(|l| matches_query(query, &[&l.title, &l.make, &l.model, &l.location]))
        .collect()
}

/// `GET /api/listings?q=` - every listing, any status, newest first.
pub async fn index(
    _admin: RequireAdminAuth,
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<Listing>>> {
    let listings = state.records().list_listings(ListingQuery::all()).await?;
    Ok(Json(search(listings, params.query())))
}

/// `POST /api/listings` - create an approved listing.
#[instrument(skip_all)]
pub async fn create(
    _admin: RequireAdminAuth,
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<Listing>)> {
    let mut submission = FormSubmission::read(multipart).await?;
    let form = submission.listing_form();
    let hero = submission.take_file("hero");
    let gallery = submission.take_files(&GALLERY_FIELDS);

    let listing = state
        .submissions()
        .submit_listing(&form, hero, gallery, Origin::Admin)
        .await?;

    Ok((StatusCode::CREATED, Json(listing)))
}

/// `GET /api/listings/{id}`
pub async fn show(
    _admin: RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<ListingId>,
) -> Result<Json<Listing>> {
    let listing = state.records().get_listing(id).await?.ok_or_else(not_found)?;
    Ok(Json(listing))
}

/// `PUT /api/listings/{id}` - multipart edit. `title` and `hero_image_url`
/// may be set directly; uploaded gallery images are appended.
#[instrument(skip_all, fields(listing_id = %id))]
pub async fn update(
    _admin: RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<ListingId>,
    multipart: Multipart,
) -> Result<Json<Listing>> {
    let mut submission = FormSubmission::read(multipart).await?;
    let form = submission.listing_form();
    let hero = submission.take_file("hero");
    let gallery = submission.take_files(&GALLERY_FIELDS);

    let listing = state
        .submissions()
        .update_listing(id, &form, hero, gallery)
        .await?;
    Ok(Json(listing))
}

/// `DELETE /api/listings/{id}`
#[instrument(skip_all, fields(listing_id = %id))]
pub async fn delete(
    _admin: RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<ListingId>,
) -> Result<StatusCode> {
    if !state.records().delete_listing(id).await? {
        return Err(not_found());
    }
    tracing::info!(listing_id = %id, "Listing deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// `POST /api/listings/{id}/approve` - approving twice is harmless.
#[instrument(skip_all, fields(listing_id = %id))]
pub async fn approve(
    _admin: RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<ListingId>,
) -> Result<Json<Listing>> {
    let listing = state
        .records()
        .set_listing_status(id, ListingStatus::Approved)
        .await
        .map_err(|e| match e {
            StoreError::NotFound => not_found(),
            other => other.into(),
        })?;

    tracing::info!(listing_id = %id, slug = %listing.slug, "Listing approved");
    Ok(Json(listing))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;
    use coach_exchange_core::{CoachType, Price, Slug};

    use super::*;

    fn listing(title: &str, location: &str) -> Listing {
        let now = Utc::now();
        Listing {
            id: ListingId::new(1),
            slug: Slug::parse("x").unwrap(),
            title: title.to_string(),
            year: 2019,
            make: "Marathon".to_string(),
            model: "XLII".to_string(),
            mileage: 1,
            price: Price::from_dollars(1).unwrap(),
            location: location.to_string(),
            coach_type: CoachType::Entertainer,
            hero_image_url: None,
            gallery: Vec::new(),
            comments: "one owner, garaged in Tampa".to_string(),
            status: ListingStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_search_covers_title_make_model_location() {
        let all = vec![
            listing("2019 Marathon XLII", "Ocala, FL"),
            listing("Tour bus", "Austin, TX"),
        ];

        assert_eq!(search(all.clone(), "austin").len(), 1);
        assert_eq!(search(all.clone(), "xlii").len(), 2);
        assert_eq!(search(all.clone(), "").len(), 2);
        // Comments are not searched
        assert!(search(all, "tampa").is_empty());
    }
}
