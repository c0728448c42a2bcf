//! Business logic services for admin.
//!
//! # Services
//!
//! - `auth` - Login against the configured administrator
//! - `inbox` - Leads with their listing titles resolved

pub mod auth;
pub mod inbox;

pub use auth::{AdminAuthError, AdminAuthService};
pub use inbox::{LeadView, lead_views};
