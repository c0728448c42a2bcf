//! Lead inbox handler.

use axum::{
    Json,
    extract::{Query, State},
};

use coach_exchange_store::ListingQuery;

use crate::error::Result;
use crate::middleware::RequireAdminAuth;
use crate::routes::SearchParams;
use crate::services::{LeadView, lead_views};
use crate::state::AppState;

/// `GET /api/leads?q=` - newest first, with listing titles.
pub async fn index(
    _admin: RequireAdminAuth,
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<LeadView>>> {
    let records = state.records();
    let (leads, listings) = tokio::try_join!(
        records.list_leads(),
        records.list_listings(ListingQuery::all()),
    )?;

    Ok(Json(lead_views(leads, &listings, params.query())))
}
