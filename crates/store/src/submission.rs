//! Listing and blog submission flow.
//!
//! Every create or edit runs the same steps in order:
//!
//! 1. validate the form (nothing is uploaded or written on failure)
//! 2. derive the slug
//! 3. upload images one at a time, collecting their public URLs
//! 4. write one record
//!
//! A failed upload aborts the submission. Objects uploaded before the
//! failure stay in the bucket; their keys are logged at `warn`.

use chrono::Utc;
use tracing::instrument;

use coach_exchange_core::{
    Blog, BlogForm, BlogId, Listing, ListingForm, ListingId, ListingStatus, NewBlog, NewListing,
    Slug, ValidationError,
};

use crate::error::StoreError;
use crate::object::{Bucket, ObjectKey, ObjectStore, ObjectStoreError};
use crate::records::RecordStore;

/// How many times an insert is retried with a suffixed slug after a
/// uniqueness conflict.
pub const SLUG_RETRIES: usize = 3;

/// An uploaded file from a submission form.
#[derive(Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl std::fmt::Debug for ImageUpload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageUpload")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("size", &self.bytes.len())
            .finish()
    }
}

/// Who submitted a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// A customer through "list your coach"; held for review.
    Public,
    /// An admin; published immediately.
    Admin,
}

impl Origin {
    #[must_use]
    pub const fn initial_status(self) -> ListingStatus {
        match self {
            Self::Public => ListingStatus::Pending,
            Self::Admin => ListingStatus::Approved,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SubmissionError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("image upload failed: {0}")]
    Upload(#[from] ObjectStoreError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("record not found")]
    NotFound,
}

/// Runs submissions against the configured record and object stores.
pub struct SubmissionService<'a> {
    records: &'a dyn RecordStore,
    objects: &'a dyn ObjectStore,
}

impl<'a> SubmissionService<'a> {
    #[must_use]
    pub const fn new(records: &'a dyn RecordStore, objects: &'a dyn ObjectStore) -> Self {
        Self { records, objects }
    }

    /// Create a listing. The title is always derived and the hero comes
    /// only from an upload; both become editable afterwards.
    ///
    /// # Errors
    ///
    /// - `Validation` if any field is invalid (nothing uploaded or written)
    /// - `Upload` if an image upload fails (no record written)
    /// - `Store` if the insert fails, including a slug conflict that
    ///   survived [`SLUG_RETRIES`] suffixed attempts
    #[instrument(skip(self, form, hero, gallery), fields(slug))]
    pub async fn submit_listing(
        &self,
        form: &ListingForm,
        hero: Option<ImageUpload>,
        gallery: Vec<ImageUpload>,
        origin: Origin,
    ) -> Result<Listing, SubmissionError> {
        let mut draft = form.validate()?;
        draft.title = None;
        draft.hero_image_url = None;
        let slug = draft.slug();
        tracing::Span::current().record("slug", slug.as_str());

        let mut uploads = Uploads::new(self.objects, Bucket::CoachImages, &slug);
        let hero_url = match hero {
            Some(image) => Some(uploads.push(image).await?),
            None => None,
        };
        let mut gallery_urls = Vec::with_capacity(gallery.len());
        for image in gallery {
            gallery_urls.push(uploads.push(image).await?);
        }

        let new = draft.into_new_listing(slug, hero_url, gallery_urls, origin.initial_status());
        let listing = self
            .insert_listing(new)
            .await
            .inspect_err(|_| uploads.log_orphans())?;

        tracing::info!(listing_id = %listing.id, slug = %listing.slug, status = %listing.status, "Listing submitted");
        Ok(listing)
    }

    /// Edit a listing. A new hero image replaces the old one; new gallery
    /// images are appended.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown ID, otherwise as [`Self::submit_listing`].
    #[instrument(skip(self, form, hero, gallery), fields(listing_id = %id))]
    pub async fn update_listing(
        &self,
        id: ListingId,
        form: &ListingForm,
        hero: Option<ImageUpload>,
        gallery: Vec<ImageUpload>,
    ) -> Result<Listing, SubmissionError> {
        let existing = self
            .records
            .get_listing(id)
            .await?
            .ok_or(SubmissionError::NotFound)?;
        let draft = form.validate()?;

        let mut uploads = Uploads::new(self.objects, Bucket::CoachImages, &existing.slug);
        let hero_url = match hero {
            Some(image) => Some(uploads.push(image).await?),
            None => None,
        };
        let mut gallery_urls = Vec::with_capacity(gallery.len());
        for image in gallery {
            gallery_urls.push(uploads.push(image).await?);
        }

        let changes = draft.into_changes(&existing, hero_url, gallery_urls);
        let listing = self
            .records
            .update_listing(id, &changes)
            .await
            .map_err(|e| match e {
                StoreError::NotFound => SubmissionError::NotFound,
                other => other.into(),
            })
            .inspect_err(|_| uploads.log_orphans())?;

        tracing::info!(listing_id = %listing.id, "Listing updated");
        Ok(listing)
    }

    /// Create an unpublished blog post. A cover image is required.
    ///
    /// # Errors
    ///
    /// As [`Self::submit_listing`]; a missing cover is a validation error on
    /// `cover_image`.
    #[instrument(skip(self, form, cover), fields(slug))]
    pub async fn create_blog(
        &self,
        form: &BlogForm,
        cover: Option<ImageUpload>,
    ) -> Result<Blog, SubmissionError> {
        let (draft, cover) = match (form.validate(), cover) {
            (Ok(draft), Some(cover)) => (draft, cover),
            (result, cover) => {
                let mut errors = result.err().unwrap_or_default();
                if cover.is_none() {
                    errors.add("cover_image", "cover image is required");
                }
                return Err(errors.into());
            }
        };
        let slug = draft.slug();
        tracing::Span::current().record("slug", slug.as_str());

        let mut uploads = Uploads::new(self.objects, Bucket::BlogImages, &slug);
        let cover_url = uploads.push(cover).await?;

        let new = draft.into_new_blog(slug, cover_url);
        let blog = self
            .insert_blog(new)
            .await
            .inspect_err(|_| uploads.log_orphans())?;

        tracing::info!(blog_id = %blog.id, slug = %blog.slug, "Blog created");
        Ok(blog)
    }

    /// Edit a blog post. The slug is re-derived from the title.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown ID, otherwise as [`Self::create_blog`].
    #[instrument(skip(self, form, cover), fields(blog_id = %id))]
    pub async fn update_blog(
        &self,
        id: BlogId,
        form: &BlogForm,
        cover: Option<ImageUpload>,
    ) -> Result<Blog, SubmissionError> {
        let existing = self
            .records
            .get_blog(id)
            .await?
            .ok_or(SubmissionError::NotFound)?;
        let draft = form.validate()?;

        let slug = draft.slug();
        let mut uploads = Uploads::new(self.objects, Bucket::BlogImages, &slug);
        let cover_url = match cover {
            Some(image) => Some(uploads.push(image).await?),
            None => None,
        };

        let mut changes = draft.into_changes(&existing, cover_url);
        let base = changes.slug.clone();
        let mut retries = 0;
        let blog = loop {
            match self.records.update_blog(id, &changes).await {
                Err(e) if e.is_conflict() && retries < SLUG_RETRIES => {
                    retries += 1;
                    changes.slug = base.with_suffix();
                    tracing::debug!(slug = %changes.slug, "Blog slug taken, retrying");
                }
                Err(StoreError::NotFound) => {
                    uploads.log_orphans();
                    return Err(SubmissionError::NotFound);
                }
                Err(e) => {
                    uploads.log_orphans();
                    return Err(e.into());
                }
                Ok(blog) => break blog,
            }
        };

        tracing::info!(blog_id = %blog.id, slug = %blog.slug, "Blog updated");
        Ok(blog)
    }

    async fn insert_listing(&self, mut new: NewListing) -> Result<Listing, StoreError> {
        let base = new.slug.clone();
        let mut retries = 0;
        loop {
            match self.records.insert_listing(&new).await {
                Err(e) if e.is_conflict() && retries < SLUG_RETRIES => {
                    retries += 1;
                    new.slug = base.with_suffix();
                    tracing::debug!(slug = %new.slug, "Listing slug taken, retrying");
                }
                result => return result,
            }
        }
    }

    async fn insert_blog(&self, mut new: NewBlog) -> Result<Blog, StoreError> {
        let base = new.slug.clone();
        let mut retries = 0;
        loop {
            match self.records.insert_blog(&new).await {
                Err(e) if e.is_conflict() && retries < SLUG_RETRIES => {
                    retries += 1;
                    new.slug = base.with_suffix();
                    tracing::debug!(slug = %new.slug, "Blog slug taken, retrying");
                }
                result => return result,
            }
        }
    }
}

/// Sequential uploads for one submission.
struct Uploads<'a> {
    objects: &'a dyn ObjectStore,
    bucket: Bucket,
    slug: Slug,
    done: Vec<ObjectKey>,
}

impl<'a> Uploads<'a> {
    fn new(objects: &'a dyn ObjectStore, bucket: Bucket, slug: &Slug) -> Self {
        Self {
            objects,
            bucket,
            slug: slug.clone(),
            done: Vec::new(),
        }
    }

    async fn push(&mut self, image: ImageUpload) -> Result<String, ObjectStoreError> {
        let key = ObjectKey::for_upload(&self.slug, Utc::now(), &image.file_name);
        match self
            .objects
            .upload(self.bucket, &key, &image.content_type, image.bytes)
            .await
        {
            Ok(url) => {
                tracing::debug!(bucket = %self.bucket, key = %key, "Image uploaded");
                self.done.push(key);
                Ok(url)
            }
            Err(e) => {
                tracing::error!(bucket = %self.bucket, key = %key, error = %e, "Image upload failed");
                self.log_orphans();
                Err(e)
            }
        }
    }

    fn log_orphans(&self) {
        if !self.done.is_empty() {
            let keys: Vec<&str> = self.done.iter().map(ObjectKey::as_str).collect();
            tracing::warn!(bucket = %self.bucket, ?keys, "Submission aborted; uploaded objects left behind");
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::memory::MemoryRecordStore;
    use crate::object::MemoryObjectStore;
    use crate::records::{BlogStore, ListingQuery, ListingStore};

    fn form() -> ListingForm {
        ListingForm {
            year: "2020".to_owned(),
            make: "Prevost".to_owned(),
            model: "H3-45".to_owned(),
            mileage: "48000".to_owned(),
            price: "1850000".to_owned(),
            location: "Nashville, TN".to_owned(),
            ..ListingForm::default()
        }
    }

    fn image(name: &str) -> ImageUpload {
        ImageUpload {
            file_name: name.to_owned(),
            content_type: "image/jpeg".to_owned(),
            bytes: vec![0xFF, 0xD8, 0xFF],
        }
    }

    #[tokio::test]
    async fn test_public_submission_is_pending_with_images() {
        let records = MemoryRecordStore::new();
        let objects = MemoryObjectStore::new();
        let service = SubmissionService::new(&records, &objects);

        let listing = service
            .submit_listing(
                &form(),
                Some(image("hero.jpg")),
                vec![image("a.jpg"), image("b.jpg")],
                Origin::Public,
            )
            .await
            .unwrap();

        assert_eq!(listing.status, ListingStatus::Pending);
        assert_eq!(listing.slug.as_str(), "prevost-h3-45-2020");
        assert_eq!(listing.title, "2020 Prevost H3-45");
        assert!(listing.hero_image_url.unwrap().contains("coach-images/prevost-h3-45-2020/"));
        assert_eq!(listing.gallery.len(), 2);
        assert!(listing.gallery[0].ends_with("-a.jpg"));
        assert_eq!(objects.len().await, 3);
    }

    #[tokio::test]
    async fn test_non_numeric_price_uploads_and_writes_nothing() {
        let records = MemoryRecordStore::new();
        let objects = MemoryObjectStore::new();
        let service = SubmissionService::new(&records, &objects);
        let mut form = form();
        form.price = "abc".to_owned();

        let err = service
            .submit_listing(&form, Some(image("hero.jpg")), Vec::new(), Origin::Public)
            .await
            .unwrap_err();

        match err {
            SubmissionError::Validation(fields) => assert!(fields.has("price")),
            other => panic!("expected validation error, got {other:?}"),
        }
        assert!(objects.is_empty().await);
        assert_eq!(records.count_listings(None).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_upload_failure_aborts_without_record() {
        let records = MemoryRecordStore::new();
        let objects = MemoryObjectStore::failing_after(1);
        let service = SubmissionService::new(&records, &objects);

        let err = service
            .submit_listing(
                &form(),
                Some(image("hero.jpg")),
                vec![image("a.jpg")],
                Origin::Public,
            )
            .await
            .unwrap_err();

        assert!(matches!(err, SubmissionError::Upload(_)));
        assert_eq!(records.count_listings(None).await.unwrap(), 0);
        assert_eq!(objects.len().await, 1);
    }

    #[tokio::test]
    async fn test_slug_collision_gets_suffix() {
        let records = MemoryRecordStore::new();
        let objects = MemoryObjectStore::new();
        let service = SubmissionService::new(&records, &objects);

        let first = service
            .submit_listing(&form(), None, Vec::new(), Origin::Admin)
            .await
            .unwrap();
        let second = service
            .submit_listing(&form(), None, Vec::new(), Origin::Admin)
            .await
            .unwrap();

        assert_eq!(first.status, ListingStatus::Approved);
        assert_ne!(first.slug, second.slug);
        assert!(second.slug.as_str().starts_with("prevost-h3-45-2020-"));
        assert_eq!(
            records
                .list_listings(ListingQuery::approved())
                .await
                .unwrap()
                .len(),
            2
        );
    }

    #[tokio::test]
    async fn test_update_listing_unknown_id() {
        let records = MemoryRecordStore::new();
        let objects = MemoryObjectStore::new();
        let service = SubmissionService::new(&records, &objects);

        let err = service
            .update_listing(ListingId::new(404), &form(), None, Vec::new())
            .await
            .unwrap_err();
        assert!(matches!(err, SubmissionError::NotFound));
    }

    #[tokio::test]
    async fn test_update_listing_replaces_hero_and_appends_gallery() {
        let records = MemoryRecordStore::new();
        let objects = MemoryObjectStore::new();
        let service = SubmissionService::new(&records, &objects);
        let created = service
            .submit_listing(&form(), Some(image("old.jpg")), vec![image("1.jpg")], Origin::Admin)
            .await
            .unwrap();

        let mut edit = form();
        edit.title = Some("Featured Prevost".to_owned());
        edit.price = "1,700,000".to_owned();
        let updated = service
            .update_listing(created.id, &edit, Some(image("new.jpg")), vec![image("2.jpg")])
            .await
            .unwrap();

        assert_eq!(updated.title, "Featured Prevost");
        assert_eq!(updated.slug, created.slug);
        assert!(updated.hero_image_url.unwrap().ends_with("-new.jpg"));
        assert_eq!(updated.gallery.len(), 2);
        assert_eq!(updated.price.to_string(), "$1,700,000");
    }

    #[tokio::test]
    async fn test_blog_requires_cover_and_starts_unpublished() {
        let records = MemoryRecordStore::new();
        let objects = MemoryObjectStore::new();
        let service = SubmissionService::new(&records, &objects);
        let form = BlogForm {
            title: "Choosing a Conversion".to_owned(),
            content: "<p>Start with the shell.</p>".to_owned(),
            ..BlogForm::default()
        };

        let err = service.create_blog(&form, None).await.unwrap_err();
        match err {
            SubmissionError::Validation(fields) => assert!(fields.has("cover_image")),
            other => panic!("expected validation error, got {other:?}"),
        }

        let blog = service
            .create_blog(&form, Some(image("cover.png")))
            .await
            .unwrap();
        assert!(!blog.published);
        assert_eq!(blog.slug.as_str(), "choosing-a-conversion");
        assert!(blog.cover_image_url.contains("blog-images/"));
    }

    /// Deletes a blog post while its new cover is being uploaded.
    struct DeletingObjectStore<'a> {
        records: &'a MemoryRecordStore,
        id: BlogId,
        inner: MemoryObjectStore,
    }

    #[async_trait::async_trait]
    impl ObjectStore for DeletingObjectStore<'_> {
        fn backend_name(&self) -> &'static str {
            "deleting"
        }

        async fn upload(
            &self,
            bucket: Bucket,
            key: &ObjectKey,
            content_type: &str,
            bytes: Vec<u8>,
        ) -> Result<String, ObjectStoreError> {
            self.records.delete_blog(self.id).await.unwrap();
            self.inner.upload(bucket, key, content_type, bytes).await
        }
    }

    #[tokio::test]
    async fn test_blog_deleted_during_edit_is_not_found() {
        let records = MemoryRecordStore::new();
        let objects = MemoryObjectStore::new();
        let form = BlogForm {
            title: "Going Away".to_owned(),
            content: "body".to_owned(),
            ..BlogForm::default()
        };
        let blog = SubmissionService::new(&records, &objects)
            .create_blog(&form, Some(image("cover.png")))
            .await
            .unwrap();

        let deleting = DeletingObjectStore {
            records: &records,
            id: blog.id,
            inner: MemoryObjectStore::new(),
        };
        let err = SubmissionService::new(&records, &deleting)
            .update_blog(blog.id, &form, Some(image("new.png")))
            .await
            .unwrap_err();

        assert!(matches!(err, SubmissionError::NotFound));
        assert_eq!(deleting.inner.len().await, 1);
    }

    #[tokio::test]
    async fn test_blog_edit_rederives_slug() {
        let records = MemoryRecordStore::new();
        let objects = MemoryObjectStore::new();
        let service = SubmissionService::new(&records, &objects);
        let mut form = BlogForm {
            title: "First Title".to_owned(),
            content: "body".to_owned(),
            ..BlogForm::default()
        };
        let blog = service
            .create_blog(&form, Some(image("cover.png")))
            .await
            .unwrap();

        form.title = "Second Title".to_owned();
        let updated = service.update_blog(blog.id, &form, None).await.unwrap();
        assert_eq!(updated.slug.as_str(), "second-title");
        assert_eq!(updated.cover_image_url, blog.cover_image_url);
        assert!(
            records
                .get_blog_by_slug(&updated.slug, false)
                .await
                .unwrap()
                .is_some()
        );
    }
}
