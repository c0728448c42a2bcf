//! Application state shared across handlers.

use std::path::PathBuf;
use std::sync::Arc;

use coach_exchange_store::{Backends, ObjectStore, RecordStore, SubmissionService};

use crate::config::AdminConfig;
use crate::services::AdminAuthService;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AdminConfig,
    records: Arc<dyn RecordStore>,
    objects: Arc<dyn ObjectStore>,
    upload_dir: Option<PathBuf>,
}

impl AppState {
    /// Create a new application state over connected backends.
    #[must_use]
    pub fn new(config: AdminConfig, backends: &Backends) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                records: Arc::clone(&backends.records),
                objects: Arc::clone(&backends.objects),
                upload_dir: backends.local_upload_dir.clone(),
            }),
        }
    }

    /// Get a reference to the admin configuration.
    #[must_use]
    pub fn config(&self) -> &AdminConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn records(&self) -> &dyn RecordStore {
        self.inner.records.as_ref()
    }

    /// Directory of locally stored uploads, served under `/uploads`.
    #[must_use]
    pub fn upload_dir(&self) -> Option<&PathBuf> {
        self.inner.upload_dir.as_ref()
    }

    #[must_use]
    pub fn auth(&self) -> AdminAuthService<'_> {
        AdminAuthService::new(&self.inner.config)
    }

    #[must_use]
    pub fn submissions(&self) -> SubmissionService<'_> {
        SubmissionService::new(self.inner.records.as_ref(), self.inner.objects.as_ref())
    }
}
