//! Seed the database with demo inventory.
//!
//! Inserts three approved listings and one published blog post through the
//! record store traits. Records whose slug already exists are skipped, so
//! running the command twice is harmless.

use thiserror::Error;

use coach_exchange_core::{BlogForm, ListingForm, ListingStatus, ValidationError};
use coach_exchange_store::{PgRecordStore, RecordStore, StoreError};

/// Placeholder cover for the demo post, served from the local upload dir.
pub const DEFAULT_COVER_URL: &str = "/uploads/blog-images/welcome/cover.jpg";

/// (year, make, model, mileage, price, location, coach type, comments)
type DemoListing = (
    &'static str,
    &'static str,
    &'static str,
    &'static str,
    &'static str,
    &'static str,
    &'static str,
    &'static str,
);

const DEMO_LISTINGS: [DemoListing; 3] = [
    (
        "2020",
        "Prevost",
        "H3-45",
        "42,000",
        "$1,450,000",
        "Nashville, TN",
        "motorhome",
        "Double slide, Marathon conversion, one owner.",
    ),
    (
        "2018",
        "Prevost",
        "X3-45",
        "88,500",
        "$895,000",
        "Ocala, FL",
        "motorhome",
        "Triple slide with full wall entertainment center.",
    ),
    (
        "2016",
        "Van Hool",
        "TX45",
        "310,000",
        "$425,000",
        "Austin, TX",
        "entertainer",
        "12 bunks, rear lounge, fresh inspection.",
    ),
];

/// Errors that can occur while seeding.
#[derive(Debug, Error)]
pub enum SeedError {
    #[error("Invalid demo record: {0}")]
    Validation(#[from] ValidationError),

    #[error("Database error: {0}")]
    Store(#[from] StoreError),
}

/// What a seed run inserted.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub listings: usize,
    pub blogs: usize,
}

/// Insert the demo records into `records`.
///
/// # Errors
///
/// Returns an error if a write fails.
pub async fn seed(records: &dyn RecordStore, cover_url: &str) -> Result<SeedReport, SeedError> {
    let mut report = SeedReport::default();

    for (year, make, model, mileage, price, location, coach_type, comments) in DEMO_LISTINGS {
        let form = ListingForm {
            year: year.to_string(),
            make: make.to_string(),
            model: model.to_string(),
            mileage: mileage.to_string(),
            price: price.to_string(),
            location: location.to_string(),
            coach_type: Some(coach_type.to_string()),
            comments: Some(comments.to_string()),
            ..ListingForm::default()
        };
        let draft = form.validate()?;
        let slug = draft.slug();

        if records.get_listing_by_slug(&slug).await?.is_some() {
            tracing::info!(slug = %slug, "Listing already present, skipping");
            continue;
        }

        let listing = records
            .insert_listing(&draft.into_new_listing(
                slug,
                None,
                Vec::new(),
                ListingStatus::Approved,
            ))
            .await?;
        tracing::info!(listing_id = %listing.id, slug = %listing.slug, "Seeded listing");
        report.listings += 1;
    }

    let form = BlogForm {
        title: "Welcome to Coach Exchange".to_string(),
        content: "Browse converted coaches from owners and dealers across the country. \
                  Every listing is reviewed before it goes live."
            .to_string(),
        tags: Some("news, marketplace".to_string()),
        ..BlogForm::default()
    };
    let draft = form.validate()?;
    let slug = draft.slug();

    if records.get_blog_by_slug(&slug, false).await?.is_some() {
        tracing::info!(slug = %slug, "Blog post already present, skipping");
    } else {
        let blog = records
            .insert_blog(&draft.into_new_blog(slug, cover_url.to_string()))
            .await?;
        records.set_blog_published(blog.id, true).await?;
        tracing::info!(blog_id = %blog.id, slug = %blog.slug, "Seeded blog post");
        report.blogs += 1;
    }

    Ok(report)
}

/// Seed the database named by the environment.
///
/// # Errors
///
/// Returns an error if the database is unreachable or a write fails.
pub async fn demo(cover_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    let pool = super::connect().await?;
    let records = PgRecordStore::new(pool);

    let report = seed(&records, cover_url).await?;
    tracing::info!(
        listings = report.listings,
        blogs = report.blogs,
        "Seeding complete!"
    );
    Ok(())
}
