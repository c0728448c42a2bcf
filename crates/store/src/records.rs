//! Record store traits.
//!
//! Each collection gets its own trait; [`RecordStore`] combines them and is
//! what the binaries hold as `Arc<dyn RecordStore>`. Implementations:
//! [`PgRecordStore`](crate::PgRecordStore) and
//! [`MemoryRecordStore`](crate::MemoryRecordStore).

use async_trait::async_trait;

use coach_exchange_core::{
    Blog, BlogChanges, BlogId, Email, Lead, Listing, ListingChanges, ListingId, ListingStatus,
    NewBlog, NewLead, NewListing, NewUser, Slug, User, UserId,
};

use crate::error::StoreError;

/// Which listings to fetch. Results are always newest first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListingQuery {
    /// Only listings with this status; `None` for all.
    pub status: Option<ListingStatus>,
    /// At most this many.
    pub limit: Option<i64>,
}

impl ListingQuery {
    /// Every listing regardless of status.
    #[must_use]
    pub const fn all() -> Self {
        Self {
            status: None,
            limit: None,
        }
    }

    /// Listings visible on the storefront.
    #[must_use]
    pub const fn approved() -> Self {
        Self {
            status: Some(ListingStatus::Approved),
            limit: None,
        }
    }

    #[must_use]
    pub const fn with_limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }
}

#[async_trait]
pub trait ListingStore: Send + Sync {
    async fn list_listings(&self, query: ListingQuery) -> Result<Vec<Listing>, StoreError>;

    async fn get_listing(&self, id: ListingId) -> Result<Option<Listing>, StoreError>;

    async fn get_listing_by_slug(&self, slug: &Slug) -> Result<Option<Listing>, StoreError>;

    /// # Errors
    ///
    /// Returns `StoreError::Conflict` if the slug is taken.
    async fn insert_listing(&self, listing: &NewListing) -> Result<Listing, StoreError>;

    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if no listing has this ID.
    async fn update_listing(
        &self,
        id: ListingId,
        changes: &ListingChanges,
    ) -> Result<Listing, StoreError>;

    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if no listing has this ID.
    async fn set_listing_status(
        &self,
        id: ListingId,
        status: ListingStatus,
    ) -> Result<Listing, StoreError>;

    /// Returns whether a listing was deleted.
    async fn delete_listing(&self, id: ListingId) -> Result<bool, StoreError>;

    async fn count_listings(&self, status: Option<ListingStatus>) -> Result<i64, StoreError>;
}

#[async_trait]
pub trait BlogStore: Send + Sync {
    /// Newest first.
    async fn list_blogs(&self, published_only: bool) -> Result<Vec<Blog>, StoreError>;

    async fn get_blog(&self, id: BlogId) -> Result<Option<Blog>, StoreError>;

    async fn get_blog_by_slug(
        &self,
        slug: &Slug,
        published_only: bool,
    ) -> Result<Option<Blog>, StoreError>;

    /// # Errors
    ///
    /// Returns `StoreError::Conflict` if the slug is taken.
    async fn insert_blog(&self, blog: &NewBlog) -> Result<Blog, StoreError>;

    /// # Errors
    ///
    /// Returns `StoreError::NotFound` for an unknown ID and
    /// `StoreError::Conflict` if the new slug belongs to another post.
    async fn update_blog(&self, id: BlogId, changes: &BlogChanges) -> Result<Blog, StoreError>;

    async fn set_blog_published(&self, id: BlogId, published: bool) -> Result<Blog, StoreError>;

    async fn delete_blog(&self, id: BlogId) -> Result<bool, StoreError>;

    async fn count_blogs(&self) -> Result<i64, StoreError>;
}

#[async_trait]
pub trait LeadStore: Send + Sync {
    /// Newest first.
    async fn list_leads(&self) -> Result<Vec<Lead>, StoreError>;

    async fn insert_lead(&self, lead: &NewLead) -> Result<Lead, StoreError>;

    async fn count_leads(&self) -> Result<i64, StoreError>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_user_by_email(&self, email: &Email) -> Result<Option<User>, StoreError>;

    /// The user together with their password hash, for login only.
    async fn find_credentials(&self, email: &Email)
    -> Result<Option<(User, String)>, StoreError>;

    async fn get_user(&self, id: UserId) -> Result<Option<User>, StoreError>;

    /// # Errors
    ///
    /// Returns `StoreError::Conflict` if the email is already registered.
    async fn insert_user(&self, user: &NewUser) -> Result<User, StoreError>;

    async fn count_users(&self) -> Result<i64, StoreError>;
}

/// All record collections behind one handle.
#[async_trait]
pub trait RecordStore: ListingStore + BlogStore + LeadStore + UserStore {
    /// Short backend name for logs, e.g. `postgres`.
    fn backend_name(&self) -> &'static str;

    /// Check that the backend is reachable.
    async fn ping(&self) -> Result<(), StoreError>;
}
