//! Filesystem object store.
//!
//! Writes `{root}/{bucket}/{key}`; the binaries serve `root` under their
//! `/uploads` path so the returned URL is `{public_base_url}/{bucket}/{key}`.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use tracing::instrument;

use super::{Bucket, ObjectKey, ObjectStore, ObjectStoreError};

#[derive(Debug, Clone)]
pub struct LocalObjectStore {
    root: PathBuf,
    public_base_url: String,
}

impl LocalObjectStore {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>, public_base_url: &str) -> Self {
        Self {
            root: root.into(),
            public_base_url: public_base_url.trim_end_matches('/').to_owned(),
        }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, bucket: Bucket, key: &ObjectKey) -> Result<PathBuf, ObjectStoreError> {
        let relative = Path::new(key.as_str());
        if relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)))
        {
            return Err(ObjectStoreError::InvalidKey(key.to_string()));
        }
        Ok(self.root.join(bucket.as_str()).join(relative))
    }
}

#[async_trait]
impl ObjectStore for LocalObjectStore {
    fn backend_name(&self) -> &'static str {
        "local"
    }

    #[instrument(skip(self, bytes, _content_type), fields(bucket = %bucket, key = %key))]
    async fn upload(
        &self,
        bucket: Bucket,
        key: &ObjectKey,
        _content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<String, ObjectStoreError> {
        let path = self.path_for(bucket, key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, bytes).await?;

        Ok(format!("{}/{bucket}/{key}", self.public_base_url))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;
    use coach_exchange_core::Slug;

    use super::*;

    #[tokio::test]
    async fn test_upload_writes_file_and_returns_url() {
        let root = std::env::temp_dir().join(format!("ce-local-store-{}", uuid::Uuid::new_v4()));
        let store = LocalObjectStore::new(&root, "http://localhost:3000/uploads/");
        let key = ObjectKey::for_upload(&Slug::parse("coach").unwrap(), Utc::now(), "hero.jpg");

        let url = store
            .upload(Bucket::CoachImages, &key, "image/jpeg", b"jpeg".to_vec())
            .await
            .unwrap();

        assert_eq!(url, format!("http://localhost:3000/uploads/coach-images/{key}"));
        let written = tokio::fs::read(root.join("coach-images").join(key.as_str()))
            .await
            .unwrap();
        assert_eq!(written, b"jpeg");

        tokio::fs::remove_dir_all(&root).await.unwrap();
    }
}
