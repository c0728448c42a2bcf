//! Published blog handlers.

use axum::{
    Json,
    extract::{Path, State},
};

use coach_exchange_core::{Blog, Slug};

use crate::error::{AppError, Result};
use crate::state::AppState;

/// `GET /api/blogs` - published posts, newest first.
pub async fn index(State(state): State<AppState>) -> Result<Json<Vec<Blog>>> {
    Ok(Json(state.records().list_blogs(true).await?))
}

/// `GET /api/blogs/{slug}` - one published post.
pub async fn show(State(state): State<AppState>, Path(slug): Path<String>) -> Result<Json<Blog>> {
    let not_found = || AppError::NotFound("Post".to_string());
    let slug = Slug::parse(&slug).map_err(|_| not_found())?;
    let blog = state
        .records()
        .get_blog_by_slug(&slug, true)
        .await?
        .ok_or_else(not_found)?;
    Ok(Json(blog))
}
