//! Business logic services for storefront.
//!
//! - `auth` - Customer registration and password login
//! - `catalog` - The approved listing collection, cached and filtered

pub mod auth;
pub mod catalog;
