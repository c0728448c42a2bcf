//! In-memory record store.
//!
//! Used by the integration tests and for running the binaries without a
//! database (`*_RECORD_BACKEND=memory`). Enforces the same uniqueness rules
//! as the `PostgreSQL` schema: listing and blog slugs, customer emails.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use coach_exchange_core::{
    Blog, BlogChanges, BlogId, Email, Lead, LeadId, Listing, ListingChanges, ListingId,
    ListingStatus, NewBlog, NewLead, NewListing, NewUser, Slug, User, UserId,
};

use crate::error::StoreError;
use crate::records::{BlogStore, LeadStore, ListingQuery, ListingStore, RecordStore, UserStore};

#[derive(Default)]
struct Tables {
    listings: BTreeMap<ListingId, Listing>,
    blogs: BTreeMap<BlogId, Blog>,
    leads: BTreeMap<LeadId, Lead>,
    users: BTreeMap<UserId, (User, String)>,
    next_id: i32,
}

impl Tables {
    fn next_id(&mut self) -> i32 {
        self.next_id += 1;
        self.next_id
    }
}

/// Record store held in process memory.
#[derive(Default)]
pub struct MemoryRecordStore {
    tables: RwLock<Tables>,
}

impl MemoryRecordStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

/// Newest first; IDs break ties since they are assigned in insert order.
fn newest_first<T>(items: &mut [T], key: impl Fn(&T) -> (chrono::DateTime<Utc>, i32)) {
    items.sort_by(|a, b| key(b).cmp(&key(a)));
}

#[async_trait]
impl ListingStore for MemoryRecordStore {
    async fn list_listings(&self, query: ListingQuery) -> Result<Vec<Listing>, StoreError> {
        let tables = self.tables.read().await;
        let mut listings: Vec<Listing> = tables
            .listings
            .values()
            .filter(|l| query.status.is_none_or(|status| l.status == status))
            .cloned()
            .collect();
        newest_first(&mut listings, |l| (l.created_at, l.id.as_i32()));
        if let Some(limit) = query.limit {
            listings.truncate(usize::try_from(limit).unwrap_or(0));
        }
        Ok(listings)
    }

    async fn get_listing(&self, id: ListingId) -> Result<Option<Listing>, StoreError> {
        Ok(self.tables.read().await.listings.get(&id).cloned())
    }

    async fn get_listing_by_slug(&self, slug: &Slug) -> Result<Option<Listing>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.listings.values().find(|l| &l.slug == slug).cloned())
    }

    async fn insert_listing(&self, listing: &NewListing) -> Result<Listing, StoreError> {
        let mut tables = self.tables.write().await;
        if tables.listings.values().any(|l| l.slug == listing.slug) {
            return Err(StoreError::Conflict("listing slug already exists".to_owned()));
        }

        let now = Utc::now();
        let id = ListingId::new(tables.next_id());
        let record = Listing {
            id,
            slug: listing.slug.clone(),
            title: listing.title.clone(),
            year: listing.year,
            make: listing.make.clone(),
            model: listing.model.clone(),
            mileage: listing.mileage,
            price: listing.price,
            location: listing.location.clone(),
            coach_type: listing.coach_type,
            hero_image_url: listing.hero_image_url.clone(),
            gallery: listing.gallery.clone(),
            comments: listing.comments.clone(),
            status: listing.status,
            created_at: now,
            updated_at: now,
        };
        tables.listings.insert(id, record.clone());
        Ok(record)
    }

    async fn update_listing(
        &self,
        id: ListingId,
        changes: &ListingChanges,
    ) -> Result<Listing, StoreError> {
        let mut tables = self.tables.write().await;
        let listing = tables.listings.get_mut(&id).ok_or(StoreError::NotFound)?;
        listing.apply(changes, Utc::now());
        Ok(listing.clone())
    }

    async fn set_listing_status(
        &self,
        id: ListingId,
        status: ListingStatus,
    ) -> Result<Listing, StoreError> {
        let mut tables = self.tables.write().await;
        let listing = tables.listings.get_mut(&id).ok_or(StoreError::NotFound)?;
        listing.status = status;
        listing.updated_at = Utc::now();
        Ok(listing.clone())
    }

    async fn delete_listing(&self, id: ListingId) -> Result<bool, StoreError> {
        Ok(self.tables.write().await.listings.remove(&id).is_some())
    }

    async fn count_listings(&self, status: Option<ListingStatus>) -> Result<i64, StoreError> {
        let tables = self.tables.read().await;
        let count = tables
            .listings
            .values()
            .filter(|l| status.is_none_or(|s| l.status == s))
            .count();
        Ok(i64::try_from(count).unwrap_or(i64::MAX))
    }
}

#[async_trait]
impl BlogStore for MemoryRecordStore {
    async fn list_blogs(&self, published_only: bool) -> Result<Vec<Blog>, StoreError> {
        let tables = self.tables.read().await;
        let mut blogs: Vec<Blog> = tables
            .blogs
            .values()
            .filter(|b| !published_only || b.published)
            .cloned()
            .collect();
        newest_first(&mut blogs, |b| (b.created_at, b.id.as_i32()));
        Ok(blogs)
    }

    async fn get_blog(&self, id: BlogId) -> Result<Option<Blog>, StoreError> {
        Ok(self.tables.read().await.blogs.get(&id).cloned())
    }

    async fn get_blog_by_slug(
        &self,
        slug: &Slug,
        published_only: bool,
    ) -> Result<Option<Blog>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .blogs
            .values()
            .find(|b| &b.slug == slug && (!published_only || b.published))
            .cloned())
    }

    async fn insert_blog(&self, blog: &NewBlog) -> Result<Blog, StoreError> {
        let mut tables = self.tables.write().await;
        if tables.blogs.values().any(|b| b.slug == blog.slug) {
            return Err(StoreError::Conflict("blog slug already exists".to_owned()));
        }

        let now = Utc::now();
        let id = BlogId::new(tables.next_id());
        let record = Blog {
            id,
            slug: blog.slug.clone(),
            title: blog.title.clone(),
            content: blog.content.clone(),
            cover_image_url: blog.cover_image_url.clone(),
            meta_title: blog.meta_title.clone(),
            meta_description: blog.meta_description.clone(),
            tags: blog.tags.clone(),
            published: blog.published,
            created_at: now,
            updated_at: now,
        };
        tables.blogs.insert(id, record.clone());
        Ok(record)
    }

    async fn update_blog(&self, id: BlogId, changes: &BlogChanges) -> Result<Blog, StoreError> {
        let mut tables = self.tables.write().await;
        if tables
            .blogs
            .values()
            .any(|b| b.id != id && b.slug == changes.slug)
        {
            return Err(StoreError::Conflict("blog slug already exists".to_owned()));
        }
        let blog = tables.blogs.get_mut(&id).ok_or(StoreError::NotFound)?;
        blog.apply(changes, Utc::now());
        Ok(blog.clone())
    }

    async fn set_blog_published(&self, id: BlogId, published: bool) -> Result<Blog, StoreError> {
        let mut tables = self.tables.write().await;
        let blog = tables.blogs.get_mut(&id).ok_or(StoreError::NotFound)?;
        blog.published = published;
        blog.updated_at = Utc::now();
        Ok(blog.clone())
    }

    async fn delete_blog(&self, id: BlogId) -> Result<bool, StoreError> {
        Ok(self.tables.write().await.blogs.remove(&id).is_some())
    }

    async fn count_blogs(&self) -> Result<i64, StoreError> {
        let count = self.tables.read().await.blogs.len();
        Ok(i64::try_from(count).unwrap_or(i64::MAX))
    }
}

#[async_trait]
impl LeadStore for MemoryRecordStore {
    async fn list_leads(&self) -> Result<Vec<Lead>, StoreError> {
        let tables = self.tables.read().await;
        let mut leads: Vec<Lead> = tables.leads.values().cloned().collect();
        newest_first(&mut leads, |l| (l.created_at, l.id.as_i32()));
        Ok(leads)
    }

    async fn insert_lead(&self, lead: &NewLead) -> Result<Lead, StoreError> {
        let mut tables = self.tables.write().await;
        let id = LeadId::new(tables.next_id());
        let record = Lead {
            id,
            name: lead.name.clone(),
            email: lead.email.clone(),
            phone: lead.phone.clone(),
            comments: lead.comments.clone(),
            listing: lead.listing.clone(),
            created_at: Utc::now(),
        };
        tables.leads.insert(id, record.clone());
        Ok(record)
    }

    async fn count_leads(&self) -> Result<i64, StoreError> {
        let count = self.tables.read().await.leads.len();
        Ok(i64::try_from(count).unwrap_or(i64::MAX))
    }
}

#[async_trait]
impl UserStore for MemoryRecordStore {
    async fn find_user_by_email(&self, email: &Email) -> Result<Option<User>, StoreError> {
        Ok(self
            .find_credentials(email)
            .await?
            .map(|(user, _)| user))
    }

    async fn find_credentials(
        &self,
        email: &Email,
    ) -> Result<Option<(User, String)>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .values()
            .find(|(user, _)| &user.email == email)
            .cloned())
    }

    async fn get_user(&self, id: UserId) -> Result<Option<User>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.users.get(&id).map(|(user, _)| user.clone()))
    }

    async fn insert_user(&self, user: &NewUser) -> Result<User, StoreError> {
        let mut tables = self.tables.write().await;
        if tables.users.values().any(|(u, _)| u.email == user.email) {
            return Err(StoreError::Conflict("email already exists".to_owned()));
        }

        let id = UserId::new(tables.next_id());
        let record = User {
            id,
            name: user.name.clone(),
            email: user.email.clone(),
            created_at: Utc::now(),
        };
        tables
            .users
            .insert(id, (record.clone(), user.password_hash.clone()));
        Ok(record)
    }

    async fn count_users(&self) -> Result<i64, StoreError> {
        let count = self.tables.read().await.users.len();
        Ok(i64::try_from(count).unwrap_or(i64::MAX))
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use coach_exchange_core::{CoachType, Price};

    use super::*;

    fn new_listing(slug: &str, status: ListingStatus) -> NewListing {
        NewListing {
            slug: Slug::parse(slug).unwrap(),
            title: "2020 Prevost H3-45".to_owned(),
            year: 2020,
            make: "Prevost".to_owned(),
            model: "H3-45".to_owned(),
            mileage: 50_000,
            price: Price::from_dollars(1_500_000).unwrap(),
            location: "Nashville, TN".to_owned(),
            coach_type: CoachType::Entertainer,
            hero_image_url: None,
            gallery: Vec::new(),
            comments: String::new(),
            status,
        }
    }

    #[tokio::test]
    async fn test_listing_slug_is_unique() {
        let store = MemoryRecordStore::new();
        store
            .insert_listing(&new_listing("a", ListingStatus::Pending))
            .await
            .unwrap();
        let err = store
            .insert_listing(&new_listing("a", ListingStatus::Approved))
            .await
            .unwrap_err();
        assert!(err.is_conflict());
    }

    #[tokio::test]
    async fn test_list_filters_status_newest_first_with_limit() {
        let store = MemoryRecordStore::new();
        for (slug, status) in [
            ("one", ListingStatus::Approved),
            ("two", ListingStatus::Pending),
            ("three", ListingStatus::Approved),
            ("four", ListingStatus::Approved),
        ] {
            store.insert_listing(&new_listing(slug, status)).await.unwrap();
        }

        let approved = store
            .list_listings(ListingQuery::approved().with_limit(2))
            .await
            .unwrap();
        let slugs: Vec<&str> = approved.iter().map(|l| l.slug.as_str()).collect();
        assert_eq!(slugs, ["four", "three"]);

        assert_eq!(store.count_listings(None).await.unwrap(), 4);
        assert_eq!(
            store
                .count_listings(Some(ListingStatus::Pending))
                .await
                .unwrap(),
            1
        );
    }

    #[tokio::test]
    async fn test_update_unknown_listing_is_not_found() {
        let store = MemoryRecordStore::new();
        let err = store
            .set_listing_status(ListingId::new(99), ListingStatus::Approved)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound));
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let store = MemoryRecordStore::new();
        let user = NewUser {
            name: "Pat".to_owned(),
            email: Email::parse("pat@example.com").unwrap(),
            password_hash: "$argon2id$stub".to_owned(),
        };
        store.insert_user(&user).await.unwrap();
        assert!(store.insert_user(&user).await.unwrap_err().is_conflict());
        assert_eq!(store.count_users().await.unwrap(), 1);

        let (found, hash) = store
            .find_credentials(&user.email)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.name, "Pat");
        assert_eq!(hash, "$argon2id$stub");
    }

    #[tokio::test]
    async fn test_blog_published_filter() {
        let store = MemoryRecordStore::new();
        let blog = store
            .insert_blog(&NewBlog {
                slug: Slug::parse("post").unwrap(),
                title: "Post".to_owned(),
                content: "body".to_owned(),
                cover_image_url: "https://img/c.jpg".to_owned(),
                meta_title: None,
                meta_description: None,
                tags: Vec::new(),
                published: false,
            })
            .await
            .unwrap();

        assert!(store.list_blogs(true).await.unwrap().is_empty());
        assert!(
            store
                .get_blog_by_slug(&blog.slug, true)
                .await
                .unwrap()
                .is_none()
        );

        store.set_blog_published(blog.id, true).await.unwrap();
        assert_eq!(store.list_blogs(true).await.unwrap().len(), 1);
    }
}
