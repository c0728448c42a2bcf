//! In-memory object store.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{Bucket, ObjectKey, ObjectStore, ObjectStoreError};

/// Keeps uploads in memory. Can be told to start failing after a number of
/// successful uploads.
#[derive(Default)]
pub struct MemoryObjectStore {
    objects: RwLock<BTreeMap<(Bucket, String), Vec<u8>>>,
    uploads: AtomicUsize,
    fail_after: Option<usize>,
}

impl MemoryObjectStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that accepts `successes` uploads and rejects every later one.
    #[must_use]
    pub fn failing_after(successes: usize) -> Self {
        Self {
            fail_after: Some(successes),
            ..Self::default()
        }
    }

    /// Number of stored objects.
    pub async fn len(&self) -> usize {
        self.objects.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.objects.read().await.is_empty()
    }

    pub async fn get(&self, bucket: Bucket, key: &str) -> Option<Vec<u8>> {
        self.objects
            .read()
            .await
            .get(&(bucket, key.to_owned()))
            .cloned()
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn upload(
        &self,
        bucket: Bucket,
        key: &ObjectKey,
        _content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<String, ObjectStoreError> {
        let attempt = self.uploads.fetch_add(1, Ordering::SeqCst);
        if self.fail_after.is_some_and(|limit| attempt >= limit) {
            return Err(ObjectStoreError::Status {
                status: 503,
                message: "storage unavailable".to_owned(),
            });
        }

        self.objects
            .write()
            .await
            .insert((bucket, key.as_str().to_owned()), bytes);
        Ok(format!("memory://{bucket}/{key}"))
    }
}
