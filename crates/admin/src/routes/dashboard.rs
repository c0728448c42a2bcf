//! Dashboard route handler.

use axum::{Json, extract::State};
use serde::Serialize;

use coach_exchange_core::ListingStatus;

use crate::error::Result;
use crate::middleware::RequireAdminAuth;
use crate::state::AppState;

/// Record counts shown on the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DashboardCounts {
    pub listings: i64,
    pub pending_listings: i64,
    pub users: i64,
    pub leads: i64,
    pub blogs: i64,
}

/// `GET /api/dashboard`
pub async fn index(
    _admin: RequireAdminAuth,
    State(state): State<AppState>,
) -> Result<Json<DashboardCounts>> {
    let records = state.records();

    // Fetch all counts concurrently
    let (listings, pending_listings, users, leads, blogs) = tokio::try_join!(
        records.count_listings(None),
        records.count_listings(Some(ListingStatus::Pending)),
        records.count_users(),
        records.count_leads(),
        records.count_blogs(),
    )?;

    Ok(Json(DashboardCounts {
        listings,
        pending_listings,
        users,
        leads,
        blogs,
    }))
}
