//! Listing queries.

use async_trait::async_trait;

use coach_exchange_core::{Listing, ListingChanges, ListingId, ListingStatus, NewListing, Slug};

use super::PgRecordStore;
use crate::error::StoreError;
use crate::records::{ListingQuery, ListingStore};

macro_rules! listing_columns {
    () => {
        "id, slug, title, year, make, model, mileage, price, location, coach_type, \
         hero_image_url, gallery, comments, status, created_at, updated_at"
    };
}

#[async_trait]
impl ListingStore for PgRecordStore {
    async fn list_listings(&self, query: ListingQuery) -> Result<Vec<Listing>, StoreError> {
        let listings = sqlx::query_as::<_, Listing>(concat!(
            "SELECT ",
            listing_columns!(),
            " FROM marketplace.listing
              WHERE ($1::text IS NULL OR status = $1)
              ORDER BY created_at DESC, id DESC
              LIMIT $2"
        ))
        .bind(query.status)
        .bind(query.limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(listings)
    }

    async fn get_listing(&self, id: ListingId) -> Result<Option<Listing>, StoreError> {
        let listing = sqlx::query_as::<_, Listing>(concat!(
            "SELECT ",
            listing_columns!(),
            " FROM marketplace.listing WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(listing)
    }

    async fn get_listing_by_slug(&self, slug: &Slug) -> Result<Option<Listing>, StoreError> {
        let listing = sqlx::query_as::<_, Listing>(concat!(
            "SELECT ",
            listing_columns!(),
            " FROM marketplace.listing WHERE slug = $1"
        ))
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;

        Ok(listing)
    }

    async fn insert_listing(&self, listing: &NewListing) -> Result<Listing, StoreError> {
        sqlx::query_as::<_, Listing>(concat!(
            "INSERT INTO marketplace.listing
                (slug, title, year, make, model, mileage, price, location, coach_type,
                 hero_image_url, gallery, comments, status)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
             RETURNING ",
            listing_columns!()
        ))
        .bind(&listing.slug)
        .bind(&listing.title)
        .bind(listing.year)
        .bind(&listing.make)
        .bind(&listing.model)
        .bind(listing.mileage)
        .bind(listing.price)
        .bind(&listing.location)
        .bind(listing.coach_type)
        .bind(&listing.hero_image_url)
        .bind(&listing.gallery)
        .bind(&listing.comments)
        .bind(listing.status)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| StoreError::from_insert(e, "listing slug"))
    }

    async fn update_listing(
        &self,
        id: ListingId,
        changes: &ListingChanges,
    ) -> Result<Listing, StoreError> {
        sqlx::query_as::<_, Listing>(concat!(
            "UPDATE marketplace.listing
             SET title = $2, year = $3, make = $4, model = $5, mileage = $6, price = $7,
                 location = $8, coach_type = $9, hero_image_url = $10, gallery = $11,
                 comments = $12, updated_at = now()
             WHERE id = $1
             RETURNING ",
            listing_columns!()
        ))
        .bind(id)
        .bind(&changes.title)
        .bind(changes.year)
        .bind(&changes.make)
        .bind(&changes.model)
        .bind(changes.mileage)
        .bind(changes.price)
        .bind(&changes.location)
        .bind(changes.coach_type)
        .bind(&changes.hero_image_url)
        .bind(&changes.gallery)
        .bind(&changes.comments)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::NotFound)
    }

    async fn set_listing_status(
        &self,
        id: ListingId,
        status: ListingStatus,
    ) -> Result<Listing, StoreError> {
        sqlx::query_as::<_, Listing>(concat!(
            "UPDATE marketplace.listing SET status = $2, updated_at = now()
             WHERE id = $1
             RETURNING ",
            listing_columns!()
        ))
        .bind(id)
        .bind(status)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::NotFound)
    }

    async fn delete_listing(&self, id: ListingId) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM marketplace.listing WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn count_listings(&self, status: Option<ListingStatus>) -> Result<i64, StoreError> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM marketplace.listing WHERE ($1::text IS NULL OR status = $1)",
        )
        .bind(status)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }
}
