//! Blog posts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{BlogId, Slug};
use crate::validation::{ValidationError, optional_text};

/// A blog post. `content` is raw markup, stored and returned verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
pub struct Blog {
    pub id: BlogId,
    pub slug: Slug,
    pub title: String,
    pub content: String,
    pub cover_image_url: String,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub tags: Vec<String>,
    pub published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Blog {
    pub const EXCERPT_LENGTH: usize = 160;

    /// The meta description, or the start of the content cut at a word
    /// boundary.
    #[must_use]
    pub fn excerpt(&self) -> String {
        if let Some(meta) = &self.meta_description {
            return meta.clone();
        }

        let text = self.content.trim();
        if text.chars().count() <= Self::EXCERPT_LENGTH {
            return text.to_owned();
        }

        let cut: String = text.chars().take(Self::EXCERPT_LENGTH).collect();
        let cut = cut.rsplit_once(char::is_whitespace).map_or(cut.as_str(), |(head, _)| head);
        format!("{}...", cut.trim_end())
    }

    pub fn apply(&mut self, changes: &BlogChanges, now: DateTime<Utc>) {
        self.slug = changes.slug.clone();
        self.title.clone_from(&changes.title);
        self.content.clone_from(&changes.content);
        self.cover_image_url.clone_from(&changes.cover_image_url);
        self.meta_title.clone_from(&changes.meta_title);
        self.meta_description.clone_from(&changes.meta_description);
        self.tags.clone_from(&changes.tags);
        self.updated_at = now;
    }
}

/// Split comma-separated tags, trimming and dropping blanks and repeats.
#[must_use]
pub fn parse_tags(raw: &str) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    for tag in raw.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        if !tags.iter().any(|t| t.eq_ignore_ascii_case(tag)) {
            tags.push(tag.to_owned());
        }
    }
    tags
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BlogForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub meta_title: Option<String>,
    #[serde(default)]
    pub meta_description: Option<String>,
    /// Comma-separated.
    #[serde(default)]
    pub tags: Option<String>,
}

impl BlogForm {
    /// # Errors
    ///
    /// Returns a [`ValidationError`] if the title or content is blank.
    pub fn validate(&self) -> Result<BlogDraft, ValidationError> {
        let mut errors = ValidationError::new();
        let title = errors.required_text("title", &self.title);
        let content = errors.required_text("content", &self.content);
        errors.finish(BlogDraft {
            title,
            content,
            meta_title: optional_text(self.meta_title.as_deref()),
            meta_description: optional_text(self.meta_description.as_deref()),
            tags: self.tags.as_deref().map(parse_tags).unwrap_or_default(),
        })
    }
}

/// A validated blog form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlogDraft {
    pub title: String,
    pub content: String,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub tags: Vec<String>,
}

impl BlogDraft {
    #[must_use]
    pub fn slug(&self) -> Slug {
        Slug::for_blog(&self.title)
    }

    /// New posts always start unpublished.
    #[must_use]
    pub fn into_new_blog(self, slug: Slug, cover_image_url: String) -> NewBlog {
        NewBlog {
            slug,
            title: self.title,
            content: self.content,
            cover_image_url,
            meta_title: self.meta_title,
            meta_description: self.meta_description,
            tags: self.tags,
            published: false,
        }
    }

    /// Compose an edit. The slug is re-derived from the (possibly new)
    /// title; the cover is replaced only when a new one was uploaded.
    #[must_use]
    pub fn into_changes(self, existing: &Blog, uploaded_cover: Option<String>) -> BlogChanges {
        BlogChanges {
            slug: self.slug(),
            title: self.title,
            content: self.content,
            cover_image_url: uploaded_cover.unwrap_or_else(|| existing.cover_image_url.clone()),
            meta_title: self.meta_title,
            meta_description: self.meta_description,
            tags: self.tags,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBlog {
    pub slug: Slug,
    pub title: String,
    pub content: String,
    pub cover_image_url: String,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub tags: Vec<String>,
    pub published: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlogChanges {
    pub slug: Slug,
    pub title: String,
    pub content: String,
    pub cover_image_url: String,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub tags: Vec<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn blog(content: &str) -> Blog {
        let now = Utc::now();
        Blog {
            id: BlogId::new(1),
            slug: Slug::parse("post").unwrap(),
            title: "Post".to_owned(),
            content: content.to_owned(),
            cover_image_url: "https://img/cover.jpg".to_owned(),
            meta_title: None,
            meta_description: None,
            tags: Vec::new(),
            published: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_parse_tags_dedupes_ignoring_case() {
        assert_eq!(
            parse_tags(" buying, Prevost,, prevost ,maintenance "),
            ["buying", "Prevost", "maintenance"]
        );
    }

    #[test]
    fn test_validate_requires_title_and_content() {
        let err = BlogForm::default().validate().unwrap_err();
        assert!(err.has("title"));
        assert!(err.has("content"));
    }

    #[test]
    fn test_new_blog_is_unpublished() {
        let form = BlogForm {
            title: "Winterizing Your Coach".to_owned(),
            content: "<p>Drain the tanks.</p>".to_owned(),
            ..BlogForm::default()
        };
        let draft = form.validate().unwrap();
        let slug = draft.slug();
        let new = draft.into_new_blog(slug, "https://img/c.jpg".to_owned());
        assert!(!new.published);
        assert_eq!(new.slug.as_str(), "winterizing-your-coach");
    }

    #[test]
    fn test_edit_rederives_slug_and_keeps_cover() {
        let existing = blog("old");
        let form = BlogForm {
            title: "A New Title".to_owned(),
            content: "new".to_owned(),
            ..BlogForm::default()
        };
        let changes = form.validate().unwrap().into_changes(&existing, None);
        assert_eq!(changes.slug.as_str(), "a-new-title");
        assert_eq!(changes.cover_image_url, "https://img/cover.jpg");
    }

    #[test]
    fn test_excerpt_cuts_at_word_boundary() {
        let long = "word ".repeat(60);
        let excerpt = blog(&long).excerpt();
        assert!(excerpt.ends_with("word..."));
        assert!(excerpt.chars().count() <= Blog::EXCERPT_LENGTH + 3);
        assert_eq!(blog("short post").excerpt(), "short post");
    }
}
