//! Blog post queries.

use async_trait::async_trait;

use coach_exchange_core::{Blog, BlogChanges, BlogId, NewBlog, Slug};

use super::PgRecordStore;
use crate::error::StoreError;
use crate::records::BlogStore;

macro_rules! blog_columns {
    () => {
        "id, slug, title, content, cover_image_url, meta_title, meta_description, tags, \
         published, created_at, updated_at"
    };
}

#[async_trait]
impl BlogStore for PgRecordStore {
    async fn list_blogs(&self, published_only: bool) -> Result<Vec<Blog>, StoreError> {
        let blogs = sqlx::query_as::<_, Blog>(concat!(
            "SELECT ",
            blog_columns!(),
            " FROM marketplace.blog
              WHERE (NOT $1 OR published)
              ORDER BY created_at DESC, id DESC"
        ))
        .bind(published_only)
        .fetch_all(&self.pool)
        .await?;

        Ok(blogs)
    }

    async fn get_blog(&self, id: BlogId) -> Result<Option<Blog>, StoreError> {
        let blog = sqlx::query_as::<_, Blog>(concat!(
            "SELECT ",
            blog_columns!(),
            " FROM marketplace.blog WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(blog)
    }

    async fn get_blog_by_slug(
        &self,
        slug: &Slug,
        published_only: bool,
    ) -> Result<Option<Blog>, StoreError> {
        let blog = sqlx::query_as::<_, Blog>(concat!(
            "SELECT ",
            blog_columns!(),
            " FROM marketplace.blog WHERE slug = $1 AND (NOT $2 OR published)"
        ))
        .bind(slug)
        .bind(published_only)
        .fetch_optional(&self.pool)
        .await?;

        Ok(blog)
    }

    async fn insert_blog(&self, blog: &NewBlog) -> Result<Blog, StoreError> {
        sqlx::query_as::<_, Blog>(concat!(
            "INSERT INTO marketplace.blog
                (slug, title, content, cover_image_url, meta_title, meta_description, tags,
                 published)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING ",
            blog_columns!()
        ))
        .bind(&blog.slug)
        .bind(&blog.title)
        .bind(&blog.content)
        .bind(&blog.cover_image_url)
        .bind(&blog.meta_title)
        .bind(&blog.meta_description)
        .bind(&blog.tags)
        .bind(blog.published)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| StoreError::from_insert(e, "blog slug"))
    }

    async fn update_blog(&self, id: BlogId, changes: &BlogChanges) -> Result<Blog, StoreError> {
        sqlx::query_as::<_, Blog>(concat!(
            "UPDATE marketplace.blog
             SET slug = $2, title = $3, content = $4, cover_image_url = $5, meta_title = $6,
                 meta_description = $7, tags = $8, updated_at = now()
             WHERE id = $1
             RETURNING ",
            blog_columns!()
        ))
        .bind(id)
        .bind(&changes.slug)
        .bind(&changes.title)
        .bind(&changes.content)
        .bind(&changes.cover_image_url)
        .bind(&changes.meta_title)
        .bind(&changes.meta_description)
        .bind(&changes.tags)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::from_insert(e, "blog slug"))?
        .ok_or(StoreError::NotFound)
    }

    async fn set_blog_published(&self, id: BlogId, published: bool) -> Result<Blog, StoreError> {
        sqlx::query_as::<_, Blog>(concat!(
            "UPDATE marketplace.blog SET published = $2, updated_at = now()
             WHERE id = $1
             RETURNING ",
            blog_columns!()
        ))
        .bind(id)
        .bind(published)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::NotFound)
    }

    async fn delete_blog(&self, id: BlogId) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM marketplace.blog WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn count_blogs(&self) -> Result<i64, StoreError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM marketplace.blog")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}
