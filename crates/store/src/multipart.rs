//! Decoding `multipart/form-data` submissions.
//!
//! Listing and blog forms arrive as multipart bodies: text parts for the
//! fields, file parts for images. Empty file parts (a file input left
//! blank) are ignored.

use std::collections::HashMap;

use axum::extract::Multipart;
use axum::extract::multipart::MultipartError;

use coach_exchange_core::{BlogForm, ListingForm, ValidationError};

use crate::submission::ImageUpload;

/// Field names accepted for listing gallery images.
pub const GALLERY_FIELDS: [&str; 2] = ["gallery", "photos"];

#[derive(Debug, thiserror::Error)]
pub enum FormError {
    #[error("malformed form data: {0}")]
    Read(#[from] MultipartError),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// A decoded multipart body.
#[derive(Debug, Default)]
pub struct FormSubmission {
    fields: HashMap<String, String>,
    files: Vec<(String, ImageUpload)>,
}

impl FormSubmission {
    /// Read every part of the body.
    ///
    /// # Errors
    ///
    /// `Read` if the body is malformed, `Validation` if a file part is not
    /// an image.
    pub async fn read(mut multipart: Multipart) -> Result<Self, FormError> {
        let mut submission = Self::default();
        let mut errors = ValidationError::new();

        while let Some(field) = multipart.next_field().await? {
            let Some(name) = field.name().map(ToOwned::to_owned) else {
                continue;
            };

            if let Some(file_name) = field.file_name().map(ToOwned::to_owned) {
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_owned();
                let bytes = field.bytes().await?;
                if bytes.is_empty() && file_name.is_empty() {
                    continue;
                }
                if !content_type.starts_with("image/") {
                    errors.add(&name, format!("{file_name} is not an image"));
                    continue;
                }
                submission.files.push((
                    name,
                    ImageUpload {
                        file_name,
                        content_type,
                        bytes: bytes.to_vec(),
                    },
                ));
            } else {
                let value = field.text().await?;
                submission.fields.insert(name, value);
            }
        }

        Ok(errors.finish(submission)?)
    }

    #[must_use]
    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    fn text_or_empty(&self, name: &str) -> String {
        self.text(name).unwrap_or_default().to_owned()
    }

    fn optional(&self, name: &str) -> Option<String> {
        self.text(name).map(ToOwned::to_owned)
    }

    /// Remove and return the first file sent under `name`.
    pub fn take_file(&mut self, name: &str) -> Option<ImageUpload> {
        let index = self.files.iter().position(|(field, _)| field == name)?;
        Some(self.files.remove(index).1)
    }

    /// Remove and return every file sent under any of `names`, in order.
    pub fn take_files(&mut self, names: &[&str]) -> Vec<ImageUpload> {
        let (taken, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.files)
            .into_iter()
            .partition(|(field, _)| names.contains(&field.as_str()));
        self.files = kept;
        taken.into_iter().map(|(_, image)| image).collect()
    }

    #[must_use]
    pub fn listing_form(&self) -> ListingForm {
        ListingForm {
            title: self.optional("title"),
            year: self.text_or_empty("year"),
            make: self.text_or_empty("make"),
            model: self.text_or_empty("model"),
            mileage: self.text_or_empty("mileage"),
            price: self.text_or_empty("price"),
            location: self.text_or_empty("location"),
            coach_type: self.optional("coach_type"),
            comments: self.optional("comments"),
            hero_image_url: self.optional("hero_image_url"),
        }
    }

    #[must_use]
    pub fn blog_form(&self) -> BlogForm {
        BlogForm {
            title: self.text_or_empty("title"),
            content: self.text_or_empty("content"),
            meta_title: self.optional("meta_title"),
            meta_description: self.optional("meta_description"),
            tags: self.optional("tags"),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn image(name: &str) -> ImageUpload {
        ImageUpload {
            file_name: name.to_owned(),
            content_type: "image/png".to_owned(),
            bytes: vec![1],
        }
    }

    #[test]
    fn test_take_files_keeps_order_and_other_fields() {
        let mut submission = FormSubmission {
            fields: HashMap::new(),
            files: vec![
                ("photos".to_owned(), image("1.png")),
                ("hero".to_owned(), image("hero.png")),
                ("gallery".to_owned(), image("2.png")),
            ],
        };

        let gallery = submission.take_files(&GALLERY_FIELDS);
        let names: Vec<&str> = gallery.iter().map(|i| i.file_name.as_str()).collect();
        assert_eq!(names, ["1.png", "2.png"]);

        assert_eq!(submission.take_file("hero").unwrap().file_name, "hero.png");
        assert!(submission.take_file("hero").is_none());
    }

    #[test]
    fn test_listing_form_reads_text_fields() {
        let mut fields = HashMap::new();
        fields.insert("year".to_owned(), "2019".to_owned());
        fields.insert("coach_type".to_owned(), "Entertainer".to_owned());
        let submission = FormSubmission {
            fields,
            files: Vec::new(),
        };

        let form = submission.listing_form();
        assert_eq!(form.year, "2019");
        assert_eq!(form.coach_type.as_deref(), Some("Entertainer"));
        assert!(form.make.is_empty());
        assert!(form.title.is_none());
    }
}
