//! Object store for uploaded images.
//!
//! Images are written once under a key derived from the record slug and
//! served from a public URL returned by the upload. Backends:
//!
//! - [`HostedObjectStore`] - hosted storage HTTP API (bearer service key)
//! - [`LocalObjectStore`] - files on disk behind a public base URL
//! - [`MemoryObjectStore`] - process memory, for tests

mod hosted;
mod local;
mod memory;

use core::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use coach_exchange_core::Slug;

pub use hosted::HostedObjectStore;
pub use local::LocalObjectStore;
pub use memory::MemoryObjectStore;

/// Errors from object store uploads.
#[derive(Debug, thiserror::Error)]
pub enum ObjectStoreError {
    /// The request could not be sent or the response not read.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The storage service answered with a non-success status.
    #[error("storage returned {status}: {message}")]
    Status { status: u16, message: String },

    /// Filesystem error in the local backend.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid object key: {0}")]
    InvalidKey(String),
}

/// Storage bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Bucket {
    /// Listing hero and gallery images.
    CoachImages,
    /// Blog cover images.
    BlogImages,
}

impl Bucket {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::CoachImages => "coach-images",
            Self::BlogImages => "blog-images",
        }
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Object key of the form `{slug}/{unix_millis}-{file name}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectKey(String);

impl ObjectKey {
    /// Key for an image uploaded for `slug` at `at`.
    ///
    /// The file name is reduced to lowercase `[a-z0-9._-]`; anything else
    /// becomes `-`.
    #[must_use]
    pub fn for_upload(slug: &Slug, at: DateTime<Utc>, file_name: &str) -> Self {
        Self(format!(
            "{}/{}-{}",
            slug.as_str(),
            at.timestamp_millis(),
            sanitize_file_name(file_name)
        ))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn sanitize_file_name(file_name: &str) -> String {
    let base = file_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(file_name)
        .to_lowercase();

    let mut out = String::with_capacity(base.len());
    for c in base.chars() {
        if c.is_ascii_alphanumeric() || c == '.' || c == '_' {
            out.push(c);
        } else if !out.ends_with('-') {
            out.push('-');
        }
    }
    let out = out.trim_matches(|c| c == '-' || c == '.');
    if out.is_empty() {
        "image".to_owned()
    } else {
        out.to_owned()
    }
}

/// Write-once image storage.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Short backend name for logs.
    fn backend_name(&self) -> &'static str;

    /// Store `bytes` under `bucket/key` and return the public URL.
    async fn upload(
        &self,
        bucket: Bucket,
        key: &ObjectKey,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<String, ObjectStoreError>;
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_key_layout() {
        let slug = Slug::parse("prevost-h3-45-2020").unwrap();
        let at = Utc.timestamp_millis_opt(1_700_000_000_123).unwrap();
        let key = ObjectKey::for_upload(&slug, at, "Front View (1).JPG");
        assert_eq!(key.as_str(), "prevost-h3-45-2020/1700000000123-front-view-1-.jpg");
    }

    #[test]
    fn test_sanitize_strips_paths_and_blank_names() {
        assert_eq!(sanitize_file_name("C:\\photos\\rear.png"), "rear.png");
        assert_eq!(sanitize_file_name("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_file_name("???"), "image");
        assert_eq!(sanitize_file_name(""), "image");
    }
}
