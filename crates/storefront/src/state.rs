//! Application state shared across handlers.

use std::path::PathBuf;
use std::sync::Arc;

use coach_exchange_store::{Backends, ObjectStore, RecordStore, SubmissionService};

use crate::config::StorefrontConfig;
use crate::services::auth::AuthService;
use crate::services::catalog::Catalog;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// the configured backends and the listing cache.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    records: Arc<dyn RecordStore>,
    objects: Arc<dyn ObjectStore>,
    catalog: Catalog,
    upload_dir: Option<PathBuf>,
}

impl AppState {
    /// Create a new application state over connected backends.
    #[must_use]
    pub fn new(config: StorefrontConfig, backends: &Backends) -> Self {
        let catalog = Catalog::new(Arc::clone(&backends.records), config.listing_cache_ttl);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                records: Arc::clone(&backends.records),
                objects: Arc::clone(&backends.objects),
                catalog,
                upload_dir: backends.local_upload_dir.clone(),
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn records(&self) -> &dyn RecordStore {
        self.inner.records.as_ref()
    }

    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.inner.catalog
    }

    /// Directory of locally stored uploads, served under `/uploads`.
    #[must_use]
    pub fn upload_dir(&self) -> Option<&PathBuf> {
        self.inner.upload_dir.as_ref()
    }

    #[must_use]
    pub fn auth(&self) -> AuthService<'_> {
        AuthService::new(self.records())
    }

    #[must_use]
    pub fn submissions(&self) -> SubmissionService<'_> {
        SubmissionService::new(self.inner.records.as_ref(), self.inner.objects.as_ref())
    }
}
