//! Coach Exchange Store - persistence and file storage.
//!
//! Both HTTP binaries talk to their collaborators through this crate:
//!
//! - [`records`] - The record store traits (listings, blogs, leads, users)
//! - [`postgres`] - `PostgreSQL` record store with embedded migrations
//! - [`memory`] - In-memory record store for tests and local demos
//! - [`object`] - Object store for uploaded images (hosted, local, memory)
//! - [`submission`] - Validate, upload, then write: the listing and blog
//!   submission flow shared by storefront and admin
//! - [`multipart`] - Decoding `multipart/form-data` submissions
//! - [`config`] - Backend selection from environment variables
//!
//! Exactly one record backend and one object backend are active per
//! process, chosen by configuration.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod memory;
pub mod multipart;
pub mod object;
pub mod postgres;
pub mod records;
pub mod submission;

pub use config::{Backends, ConfigError, Env, ObjectBackendConfig, RecordBackend, StoreConfig};
pub use error::StoreError;
pub use memory::MemoryRecordStore;
pub use object::{Bucket, ObjectKey, ObjectStore, ObjectStoreError};
pub use postgres::PgRecordStore;
pub use records::{BlogStore, LeadStore, ListingQuery, ListingStore, RecordStore, UserStore};
pub use submission::{ImageUpload, Origin, SubmissionError, SubmissionService};
