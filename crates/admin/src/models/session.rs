//! Session-related types for admin authentication.
//!
//! Types stored in the session for authentication state.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use coach_exchange_core::Email;

/// Session-stored admin identity.
///
/// The panel has a single configured administrator, so the email is the
/// whole identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentAdmin {
    /// Admin's email address.
    pub email: Email,
    /// When this identity stops being accepted.
    pub expires_at: DateTime<Utc>,
}

impl CurrentAdmin {
    #[must_use]
    pub fn new(email: Email, now: DateTime<Utc>, lifetime: Duration) -> Self {
        Self {
            email,
            expires_at: now + lifetime,
        }
    }

    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Session keys for admin authentication data.
pub mod keys {
    /// Key for storing the current logged-in admin.
    pub const CURRENT_ADMIN: &str = "current_admin";
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_expires_after_lifetime() {
        let now = Utc::now();
        let admin = CurrentAdmin::new(
            Email::parse("owner@coaches.test").unwrap(),
            now,
            Duration::hours(12),
        );
        assert!(!admin.is_expired(now + Duration::hours(11)));
        assert!(admin.is_expired(now + Duration::hours(12)));
    }
}
