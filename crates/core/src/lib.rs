//! Coach Exchange Core - Shared domain library.
//!
//! This crate provides the domain model used across all Coach Exchange components:
//! - `store` - Record and object store clients, submission flow
//! - `storefront` - Public marketplace (inventory, leads, blog, customer accounts)
//! - `admin` - Internal administration panel
//! - `cli` - Command-line tools for migrations and management
//!
//! # Architecture
//!
//! The core crate contains only types and pure logic - no database access,
//! no HTTP clients. Everything here can be unit tested without a runtime.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, prices, emails, slugs and statuses
//! - [`listing`], [`blog`], [`lead`], [`user`] - Marketplace records and their forms
//! - [`filter`] - The inventory filter applied to fetched listings
//! - [`password`] - Argon2id password hashing for customer and admin logins
//! - [`search`] - Case-insensitive text search used by the admin lists
//! - [`validation`] - Field-level validation errors for submitted forms

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod blog;
pub mod filter;
pub mod lead;
pub mod listing;
pub mod password;
pub mod search;
pub mod types;
pub mod user;
pub mod validation;

pub use blog::{Blog, BlogChanges, BlogDraft, BlogForm, NewBlog};
pub use filter::{ListingFilter, RangeFilter};
pub use lead::{Lead, LeadForm, NewLead};
pub use listing::{Listing, ListingChanges, ListingDraft, ListingForm, NewListing};
pub use types::*;
pub use user::{NewUser, User};
pub use validation::ValidationError;
