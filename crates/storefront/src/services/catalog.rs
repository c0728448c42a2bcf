//! Public inventory.
//!
//! Every approved listing is fetched in one query and kept in a short-lived
//! cache; filtering happens in memory on the cached collection. A public
//! submission invalidates the cache. Admin approvals show up once the TTL
//! runs out.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use tracing::{debug, instrument};

use coach_exchange_core::{Listing, ListingFilter, Slug};
use coach_exchange_store::{ListingQuery, RecordStore, StoreError};

/// Listings shown on the home page.
pub const FEATURED_COUNT: usize = 3;

#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
enum CacheKey {
    Approved,
}

/// Cached view of approved listings.
#[derive(Clone)]
pub struct Catalog {
    records: Arc<dyn RecordStore>,
    cache: Cache<CacheKey, Arc<Vec<Listing>>>,
}

impl Catalog {
    #[must_use]
    pub fn new(records: Arc<dyn RecordStore>, ttl: Duration) -> Self {
        let cache = Cache::builder().max_capacity(1).time_to_live(ttl).build();
        Self { records, cache }
    }

    /// Every approved listing, newest first.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the listings cannot be loaded.
    #[instrument(skip(self))]
    pub async fn approved(&self) -> Result<Arc<Vec<Listing>>, StoreError> {
        if let Some(listings) = self.cache.get(&CacheKey::Approved).await {
            debug!("Cache hit for approved listings");
            return Ok(listings);
        }

        let listings = Arc::new(self.records.list_listings(ListingQuery::approved()).await?);
        self.cache
            .insert(CacheKey::Approved, Arc::clone(&listings))
            .await;
        debug!(count = listings.len(), "Loaded approved listings");
        Ok(listings)
    }

    /// Approved listings passing `filter`, newest first.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the listings cannot be loaded.
    pub async fn search(&self, filter: &ListingFilter) -> Result<Vec<Listing>, StoreError> {
        Ok(filter.apply(&self.approved().await?))
    }

    /// The newest [`FEATURED_COUNT`] approved listings.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the listings cannot be loaded.
    pub async fn featured(&self) -> Result<Vec<Listing>, StoreError> {
        Ok(self
            .approved()
            .await?
            .iter()
            .take(FEATURED_COUNT)
            .cloned()
            .collect())
    }

    /// One listing by slug, only while it is approved.
    ///
    /// Reads the record store directly so a listing taken down by an admin
    /// disappears immediately.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the lookup fails.
    pub async fn find(&self, slug: &Slug) -> Result<Option<Listing>, StoreError> {
        Ok(self
            .records
            .get_listing_by_slug(slug)
            .await?
            .filter(Listing::is_public))
    }

    /// Drop the cached collection.
    pub async fn invalidate(&self) {
        self.cache.invalidate_all();
        self.cache.run_pending_tasks().await;
    }
}
