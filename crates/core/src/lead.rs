//! Buyer inquiries about a listing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{Email, LeadId, Slug};
use crate::validation::{ValidationError, optional_text};

/// A buyer inquiry. Leads reference their listing by slug and are never
/// edited after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
pub struct Lead {
    pub id: LeadId,
    pub name: String,
    pub email: Email,
    pub phone: String,
    pub comments: String,
    pub listing: Slug,
    pub created_at: DateTime<Utc>,
}

/// Inquiry form as submitted.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LeadForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub comments: Option<String>,
}

impl LeadForm {
    /// Validate the form for an inquiry about `listing`.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] for a blank name or phone, or an
    /// invalid email.
    pub fn validate(&self, listing: Slug) -> Result<NewLead, ValidationError> {
        let mut errors = ValidationError::new();
        let name = errors.required_text("name", &self.name);
        let email = Email::parse(&self.email)
            .map_err(|e| errors.add("email", e.to_string()))
            .ok();
        let phone = errors.required_text("phone", &self.phone);

        match email {
            Some(email) if errors.is_empty() => Ok(NewLead {
                name,
                email,
                phone,
                comments: optional_text(self.comments.as_deref()).unwrap_or_default(),
                listing,
            }),
            _ => Err(errors),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLead {
    pub name: String,
    pub email: Email,
    pub phone: String,
    pub comments: String,
    pub listing: Slug,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_builds_lead() {
        let form = LeadForm {
            name: " Dolly ".to_owned(),
            email: "Dolly@Example.com".to_owned(),
            phone: "615-555-0100".to_owned(),
            comments: Some("Is it still available?".to_owned()),
        };
        let slug = Slug::parse("prevost-h3-45-2020").unwrap();
        let lead = form.validate(slug.clone()).unwrap();
        assert_eq!(lead.name, "Dolly");
        assert_eq!(lead.email.as_str(), "dolly@example.com");
        assert_eq!(lead.listing, slug);
    }

    #[test]
    fn test_validate_reports_bad_email_and_blank_phone() {
        let form = LeadForm {
            name: "Dolly".to_owned(),
            email: "dolly".to_owned(),
            ..LeadForm::default()
        };
        let err = form.validate(Slug::random()).unwrap_err();
        assert!(err.has("email"));
        assert!(err.has("phone"));
        assert!(!err.has("name"));
    }
}
