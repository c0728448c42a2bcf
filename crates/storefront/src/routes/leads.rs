//! Lead inquiry handler.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use tracing::instrument;

use coach_exchange_core::{Lead, LeadForm, Slug};

use crate::error::{AppError, Result};
use crate::state::AppState;

/// `POST /api/listings/{slug}/leads` - a buyer asks about a listing.
///
/// Only approved listings accept inquiries.
#[instrument(skip(state, form))]
pub async fn create(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Json(form): Json<LeadForm>,
) -> Result<(StatusCode, Json<Lead>)> {
    let not_found = || AppError::NotFound("Listing".to_string());
    let slug = Slug::parse(&slug).map_err(|_| not_found())?;
    let listing = state.catalog().find(&slug).await?.ok_or_else(not_found)?;

    let lead = form.validate(listing.slug)?;
    let lead = state.records().insert_lead(&lead).await?;

    tracing::info!(lead_id = %lead.id, slug = %lead.listing, "Lead received");
    Ok((StatusCode::CREATED, Json(lead)))
}
