//! Session-related types.
//!
//! Types stored in the session for authentication state.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use coach_exchange_core::{Email, User, UserId};

/// Session-stored customer identity.
///
/// Minimal data stored in the session to identify the logged-in customer.
/// Never carries the password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    /// Customer's database ID.
    pub id: UserId,
    pub name: String,
    /// Customer's email address.
    pub email: Email,
    /// When this identity stops being accepted.
    pub expires_at: DateTime<Utc>,
}

impl CurrentUser {
    /// Identity for `user`, valid for `lifetime` from `now`.
    #[must_use]
    pub fn for_user(user: &User, now: DateTime<Utc>, lifetime: Duration) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            expires_at: now + lifetime,
        }
    }

    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Session keys for authentication data.
pub mod keys {
    /// Key for storing the current logged-in customer.
    pub const CURRENT_USER: &str = "current_user";
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_expires_after_lifetime() {
        let now = Utc::now();
        let user = User {
            id: UserId::new(4),
            name: "Dana".to_string(),
            email: Email::parse("dana@example.com").unwrap(),
            created_at: now,
        };

        let current = CurrentUser::for_user(&user, now, Duration::days(7));
        assert_eq!(current.id, user.id);
        assert!(!current.is_expired(now + Duration::days(6)));
        assert!(current.is_expired(now + Duration::days(7)));
    }
}
