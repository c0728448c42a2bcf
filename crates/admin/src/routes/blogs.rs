//! Blog management handlers.

use axum::{
    Json,
    extract::{Multipart, Path, State},
    http::StatusCode,
};
use tracing::instrument;

use coach_exchange_core::{Blog, BlogId};
use coach_exchange_store::multipart::FormSubmission;

use crate::error::{AppError, Result};
use crate::middleware::RequireAdminAuth;
use crate::state::AppState;

/// Multipart field carrying the cover image.
const COVER_FIELD: &str = "cover_image";

fn not_found() -> AppError {
    AppError::NotFound("Blog".to_string())
}

/// `GET /api/blogs` - all posts, published or not.
pub async fn index(
    _admin: RequireAdminAuth,
    State(state): State<AppState>,
) -> Result<Json<Vec<Blog>>> {
    Ok(Json(state.records().list_blogs(false).await?))
}

/// `POST /api/blogs` - create an unpublished post. The cover is required.
#[instrument(skip_all)]
pub async fn create(
    _admin: RequireAdminAuth,
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<Blog>)> {
    let mut submission = FormSubmission::read(multipart).await?;
    let form = submission.blog_form();
    let cover = submission.take_file(COVER_FIELD);

    let blog = state.submissions().create_blog(&form, cover).await?;
    Ok((StatusCode::CREATED, Json(blog)))
}

/// `GET /api/blogs/{id}`
pub async fn show(
    _admin: RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<BlogId>,
) -> Result<Json<Blog>> {
    let blog = state.records().get_blog(id).await?.ok_or_else(not_found)?;
    Ok(Json(blog))
}

/// `PUT /api/blogs/{id}` - the slug follows the new title.
#[instrument(skip_all, fields(blog_id = %id))]
pub async fn update(
    _admin: RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<BlogId>,
    multipart: Multipart,
) -> Result<Json<Blog>> {
    let mut submission = FormSubmission::read(multipart).await?;
    let form = submission.blog_form();
    let cover = submission.take_file(COVER_FIELD);

    let blog = state.submissions().update_blog(id, &form, cover).await?;
    Ok(Json(blog))
}

/// `DELETE /api/blogs/{id}`
#[instrument(skip_all, fields(blog_id = %id))]
pub async fn delete(
    _admin: RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<BlogId>,
) -> Result<StatusCode> {
    if !state.records().delete_blog(id).await? {
        return Err(not_found());
    }
    tracing::info!(blog_id = %id, "Blog deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// `POST /api/blogs/{id}/publish` - toggle between published and draft.
#[instrument(skip_all, fields(blog_id = %id))]
pub async fn toggle_publish(
    _admin: RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<BlogId>,
) -> Result<Json<Blog>> {
    let records = state.records();
    let current = records.get_blog(id).await?.ok_or_else(not_found)?;
    let blog = records.set_blog_published(id, !current.published).await?;

    tracing::info!(blog_id = %id, published = blog.published, "Blog publish state changed");
    Ok(Json(blog))
}
