//! Hosted storage HTTP API.
//!
//! Uploads are `POST {base}/storage/v1/object/{bucket}/{key}` authenticated
//! with the service key; public objects are served from
//! `{base}/storage/v1/object/public/{bucket}/{key}`.

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use secrecy::{ExposeSecret, SecretString};
use tracing::instrument;
use url::Url;

use super::{Bucket, ObjectKey, ObjectStore, ObjectStoreError};

pub struct HostedObjectStore {
    base_url: Url,
    service_key: SecretString,
    client: Client,
}

impl HostedObjectStore {
    #[must_use]
    pub fn new(base_url: Url, service_key: SecretString) -> Self {
        Self {
            base_url,
            service_key,
            client: Client::new(),
        }
    }

    #[must_use]
    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    /// `{base}/storage/v1/object/{prefix...}/{bucket}/{key}`, with every key
    /// segment percent-encoded.
    fn object_url(
        &self,
        prefix: &[&str],
        bucket: Bucket,
        key: &ObjectKey,
    ) -> Result<Url, ObjectStoreError> {
        let mut url = self.base_url.clone();
        url.set_query(None);
        url.set_fragment(None);
        url.path_segments_mut()
            .map_err(|()| ObjectStoreError::InvalidKey(key.to_string()))?
            .pop_if_empty()
            .extend(["storage", "v1", "object"])
            .extend(prefix)
            .push(bucket.as_str())
            .extend(key.as_str().split('/'));
        Ok(url)
    }

    fn upload_url(&self, bucket: Bucket, key: &ObjectKey) -> Result<Url, ObjectStoreError> {
        self.object_url(&[], bucket, key)
    }

    /// Public URL of an uploaded object.
    ///
    /// # Errors
    ///
    /// Returns `InvalidKey` if the base URL cannot carry a path.
    pub fn public_url(&self, bucket: Bucket, key: &ObjectKey) -> Result<Url, ObjectStoreError> {
        self.object_url(&["public"], bucket, key)
    }
}

impl std::fmt::Debug for HostedObjectStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostedObjectStore")
            .field("base_url", &self.base_url)
            .field("service_key", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl ObjectStore for HostedObjectStore {
    fn backend_name(&self) -> &'static str {
        "hosted"
    }

    #[instrument(skip(self, bytes), fields(bucket = %bucket, key = %key, size = bytes.len()))]
    async fn upload(
        &self,
        bucket: Bucket,
        key: &ObjectKey,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<String, ObjectStoreError> {
        let response = self
            .client
            .post(self.upload_url(bucket, key)?)
            .bearer_auth(self.service_key.expose_secret())
            .header("apikey", self.service_key.expose_secret())
            .header(CONTENT_TYPE, content_type)
            .header("x-upsert", "false")
            .body(bytes)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), %message, "Storage upload rejected");
            return Err(ObjectStoreError::Status {
                status: status.as_u16(),
                message,
            });
        }

        Ok(self.public_url(bucket, key)?.into())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;
    use coach_exchange_core::Slug;

    use super::*;

    fn store(base: &str, key: &str) -> HostedObjectStore {
        HostedObjectStore::new(Url::parse(base).unwrap(), SecretString::from(key))
    }

    #[test]
    fn test_urls_follow_storage_layout() {
        let store = store("https://project.storage.example.com/", "key");
        let key = ObjectKey::for_upload(&Slug::parse("s").unwrap(), Utc::now(), "a.jpg");
        assert!(
            store
                .upload_url(Bucket::CoachImages, &key)
                .unwrap()
                .as_str()
                .starts_with("https://project.storage.example.com/storage/v1/object/coach-images/s/")
        );
        assert!(
            store
                .public_url(Bucket::BlogImages, &key)
                .unwrap()
                .as_str()
                .starts_with("https://project.storage.example.com/storage/v1/object/public/blog-images/s/")
        );
    }

    #[test]
    fn test_reserved_characters_in_key_are_encoded() {
        let store = store("https://project.storage.example.com", "key");
        let slug = Slug::for_listing("Liberty #2", "H3?", "2020");
        let key = ObjectKey::for_upload(&slug, Utc::now(), "a.jpg");

        let url = store.upload_url(Bucket::CoachImages, &key).unwrap();
        assert!(url.query().is_none());
        assert!(url.fragment().is_none());

        let segments: Vec<&str> = url.path_segments().unwrap().collect();
        assert_eq!(segments.len(), 6);
        assert_eq!(segments[..4], ["storage", "v1", "object", "coach-images"]);
        assert_eq!(segments[4], slug.as_str().replace('#', "%23").replace('?', "%3F"));
        assert!(segments[5].ends_with("-a.jpg"));

        let public = store.public_url(Bucket::CoachImages, &key).unwrap();
        assert!(public.fragment().is_none());
        assert!(public.path().starts_with("/storage/v1/object/public/coach-images/"));
    }

    #[test]
    fn test_base_path_is_kept() {
        let store = store("https://example.com/project/", "key");
        let key = ObjectKey::for_upload(&Slug::parse("s").unwrap(), Utc::now(), "a.jpg");
        let url = store.upload_url(Bucket::BlogImages, &key).unwrap();
        assert!(url.path().starts_with("/project/storage/v1/object/blog-images/s/"));
    }

    #[test]
    fn test_debug_redacts_key() {
        let store = store("https://x.example.com", "hunter2");
        assert!(!format!("{store:?}").contains("hunter2"));
    }
}
