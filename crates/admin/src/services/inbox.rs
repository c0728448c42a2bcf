//! Lead inbox: leads joined with the title of the listing they ask about.

use std::collections::HashMap;

use serde::Serialize;

use coach_exchange_core::search::matches_query;
use coach_exchange_core::{Lead, Listing, Slug};

/// A lead as shown in the admin inbox.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LeadView {
    #[serde(flatten)]
    pub lead: Lead,
    /// Title of the referenced listing; `None` once the listing is gone.
    pub listing_title: Option<String>,
}

/// Attach listing titles to `leads`, keeping only those matching `query`
/// on name, email, phone or comments. Order is preserved.
#[must_use]
pub fn lead_views(leads: Vec<Lead>, listings: &[Listing], query: &str) -> Vec<LeadView> {
    let titles: HashMap<&Slug, &str> = listings
        .iter()
        .map(|listing| (&listing.slug, listing.title.as_str()))
        .collect();

    leads
        .into_iter()
        .filter(|lead| {
            matches_query(
                query,
                &[&lead.name, lead.email.as_str(), &lead.phone, &lead.comments],
            )
        })
        .map(|lead| {
            let listing_title = titles.get(&lead.listing).map(|t| (*t).to_string());
            LeadView {
                lead,
                listing_title,
            }
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;
    use coach_exchange_core::{CoachType, Email, LeadId, ListingId, ListingStatus, Price};

    use super::*;

    fn listing(slug: &str, title: &str) -> Listing {
        let now = Utc::now();
        Listing {
            id: ListingId::new(1),
            slug: Slug::parse(slug).unwrap(),
            title: title.to_string(),
            year: 2020,
            make: "Prevost".to_string(),
            model: "H3-45".to_string(),
            mileage: 40_000,
            price: Price::from_dollars(1_200_000).unwrap(),
            location: "Nashville, TN".to_string(),
            coach_type: CoachType::Motorhome,
            hero_image_url: None,
            gallery: Vec::new(),
            comments: String::new(),
            status: ListingStatus::Approved,
            created_at: now,
            updated_at: now,
        }
    }

    fn lead(id: i32, name: &str, slug: &str) -> Lead {
        Lead {
            id: LeadId::new(id),
            name: name.to_string(),
            email: Email::parse("buyer@example.com").unwrap(),
            phone: "615-555-0100".to_string(),
            comments: "Still available?".to_string(),
            listing: Slug::parse(slug).unwrap(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_titles_resolve_and_missing_listing_has_none() {
        let listings = [listing("prevost-h3-45-2020", "2020 Prevost H3-45")];
        let views = lead_views(
            vec![
                lead(2, "Ann", "prevost-h3-45-2020"),
                lead(1, "Bo", "sold-and-deleted"),
            ],
            &listings,
            "",
        );

        assert_eq!(views.len(), 2);
        assert_eq!(views[0].listing_title.as_deref(), Some("2020 Prevost H3-45"));
        assert_eq!(views[1].listing_title, None);
    }

    #[test]
    fn test_query_filters_on_contact_fields() {
        let views = lead_views(
            vec![lead(1, "Ann Smith", "a"), lead(2, "Bo Jones", "b")],
            &[],
            "jones",
        );
        assert_eq!(views.len(), 1);
        assert_eq!(views[0].lead.name, "Bo Jones");

        let json = serde_json::to_value(&views[0]).unwrap();
        assert_eq!(json["name"], "Bo Jones");
        assert!(json["listing_title"].is_null());
    }
}
