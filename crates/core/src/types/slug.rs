//! URL slugs for listings and blog posts.
//!
//! Listings and posts are addressed publicly by slug rather than by numeric
//! ID. A slug is never empty and never contains whitespace or `/`.

use core::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// Errors that can occur when parsing a [`Slug`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SlugError {
    #[error("slug cannot be empty")]
    Empty,
    #[error("slug must be at most {max} characters")]
    TooLong { max: usize },
    #[error("slug cannot contain whitespace or '/'")]
    InvalidCharacter,
}

/// A URL-safe identifier for a listing or blog post.
///
/// ```
/// use coach_exchange_core::Slug;
///
/// let slug = Slug::for_listing("Prevost", "H3-45", "2020");
/// assert_eq!(slug.as_str(), "prevost-h3-45-2020");
///
/// let post = Slug::for_blog("Buying Your First Coach: A Guide!");
/// assert_eq!(post.as_str(), "buying-your-first-coach-a-guide");
/// ```
#[derive(Debug, Clone, Serialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct Slug(String);

impl Slug {
    pub const MAX_LENGTH: usize = 200;

    /// Parse an existing slug, e.g. from a URL path segment.
    ///
    /// # Errors
    ///
    /// Returns a [`SlugError`] if the input is blank, too long, or contains
    /// whitespace or a path separator.
    pub fn parse(s: &str) -> Result<Self, SlugError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(SlugError::Empty);
        }
        if trimmed.len() > Self::MAX_LENGTH {
            return Err(SlugError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }
        if trimmed.chars().any(|c| c.is_whitespace() || c == '/') {
            return Err(SlugError::InvalidCharacter);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Derive a listing slug as `make-model-year`, lowercased, with every
    /// whitespace run replaced by a single `-`.
    ///
    /// When make, model and year are all blank a random slug is returned.
    #[must_use]
    pub fn for_listing(make: &str, model: &str, year: &str) -> Self {
        let parts = [make.trim(), model.trim(), year.trim()];
        if parts.iter().all(|p| p.is_empty()) {
            return Self::random();
        }

        let base = parts.join("-").to_lowercase();
        let mut slug = String::with_capacity(base.len());
        let mut in_whitespace = false;
        for c in base.chars() {
            if c.is_whitespace() {
                if !in_whitespace {
                    slug.push('-');
                }
                in_whitespace = true;
            } else {
                slug.push(c);
                in_whitespace = false;
            }
        }
        slug = slug.replace('/', "-");
        Self::truncated(slug)
    }

    /// Derive a blog slug from a post title.
    ///
    /// Runs of characters outside `[a-z0-9]` collapse to `-` and leading or
    /// trailing dashes are dropped. Titles with no usable characters get a
    /// random slug.
    #[must_use]
    pub fn for_blog(title: &str) -> Self {
        let mut slug = String::with_capacity(title.len());
        for c in title.to_lowercase().chars() {
            if c.is_ascii_alphanumeric() {
                slug.push(c);
            } else if !slug.is_empty() && !slug.ends_with('-') {
                slug.push('-');
            }
        }
        let slug = slug.trim_end_matches('-');
        if slug.is_empty() {
            return Self::random();
        }
        Self::truncated(slug.to_owned())
    }

    /// A fresh random slug (UUID v4, simple form).
    #[must_use]
    pub fn random() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    /// This slug with a short random suffix, used after a uniqueness conflict.
    #[must_use]
    pub fn with_suffix(&self) -> Self {
        let suffix = Uuid::new_v4().simple().to_string();
        let short = suffix.get(..6).unwrap_or(&suffix);
        Self(format!("{}-{short}", self.0))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }

    fn truncated(mut slug: String) -> Self {
        if slug.len() > Self::MAX_LENGTH {
            let mut end = Self::MAX_LENGTH;
            while !slug.is_char_boundary(end) {
                end -= 1;
            }
            slug.truncate(end);
        }
        Self(slug)
    }
}

impl fmt::Display for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for Slug {
    type Err = SlugError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for Slug {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl<'de> Deserialize<'de> for Slug {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Slug {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Slug {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self::parse(&s)?)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Slug {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <String as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_listing_slug_from_make_model_year() {
        assert_eq!(
            Slug::for_listing("Prevost", "H3-45", "2020").as_str(),
            "prevost-h3-45-2020"
        );
    }

    #[test]
    fn test_listing_slug_collapses_whitespace_runs() {
        assert_eq!(
            Slug::for_listing("Prevost  Liberty", "H3 45\tVIP", "2019").as_str(),
            "prevost-liberty-h3-45-vip-2019"
        );
    }

    #[test]
    fn test_listing_slug_blank_inputs_are_random_and_unique() {
        let a = Slug::for_listing("", "", "");
        let b = Slug::for_listing("  ", "", " ");
        assert!(!a.as_str().is_empty());
        assert_ne!(a, b);
    }

    #[test]
    fn test_blog_slug_strips_punctuation() {
        assert_eq!(
            Slug::for_blog("  Top 5 Entertainer Coaches (2025) ").as_str(),
            "top-5-entertainer-coaches-2025"
        );
        assert_eq!(Slug::for_blog("!!!").as_str().len(), 32);
    }

    #[test]
    fn test_with_suffix_keeps_prefix() {
        let slug = Slug::parse("prevost-h3-45-2020").unwrap();
        let suffixed = slug.with_suffix();
        assert!(suffixed.as_str().starts_with("prevost-h3-45-2020-"));
        assert_eq!(suffixed.as_str().len(), "prevost-h3-45-2020-".len() + 6);
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert_eq!(Slug::parse(" "), Err(SlugError::Empty));
        assert_eq!(Slug::parse("a b"), Err(SlugError::InvalidCharacter));
        assert_eq!(Slug::parse("a/b"), Err(SlugError::InvalidCharacter));
    }
}
