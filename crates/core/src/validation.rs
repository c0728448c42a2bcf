//! Field-level form validation errors.

use core::fmt;
use std::collections::BTreeMap;

use serde::Serialize;

/// Validation failures keyed by form field name.
///
/// Serializes as `{"price": ["price must be a number"], ...}` so the HTTP
/// layers can return it under a `fields` key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationError {
    fields: BTreeMap<String, Vec<String>>,
}

impl ValidationError {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// An error holding a single field message.
    #[must_use]
    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut err = Self::new();
        err.add(field, message);
        err
    }

    /// Record a message against a field.
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.fields
            .entry(field.to_owned())
            .or_default()
            .push(message.into());
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Whether any message was recorded for `field`.
    #[must_use]
    pub fn has(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    #[must_use]
    pub fn messages(&self, field: &str) -> &[String] {
        self.fields.get(field).map_or(&[], Vec::as_slice)
    }

    #[must_use]
    pub fn field_names(&self) -> Vec<&str> {
        self.fields.keys().map(String::as_str).collect()
    }

    /// `Ok(value)` if nothing was recorded, otherwise `Err(self)`.
    ///
    /// # Errors
    ///
    /// Returns `self` when at least one field failed.
    pub fn finish<T>(self, value: T) -> Result<T, Self> {
        if self.is_empty() { Ok(value) } else { Err(self) }
    }

    /// Trimmed text that must not be blank.
    pub fn required_text(&mut self, field: &str, value: &str) -> String {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            self.add(field, format!("{field} is required"));
        }
        trimmed.to_owned()
    }

    /// A whole, non-negative number. Thousands separators are accepted.
    ///
    /// Records an error and returns `None` for blank or non-numeric input.
    pub fn whole_number(&mut self, field: &str, value: &str) -> Option<i32> {
        let cleaned: String = value
            .trim()
            .chars()
            .filter(|c| *c != ',')
            .collect();
        if cleaned.is_empty() {
            self.add(field, format!("{field} is required"));
            return None;
        }
        match cleaned.parse::<i32>() {
            Ok(n) if n >= 0 => Some(n),
            Ok(_) => {
                self.add(field, format!("{field} cannot be negative"));
                None
            }
            Err(_) => {
                self.add(field, format!("{field} must be a whole number"));
                None
            }
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid fields: {}", self.field_names().join(", "))
    }
}

impl std::error::Error for ValidationError {}

/// Trimmed optional text; blank becomes `None`.
#[must_use]
pub fn optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(ToOwned::to_owned)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_whole_number_accepts_separators() {
        let mut errors = ValidationError::new();
        assert_eq!(errors.whole_number("mileage", " 120,500 "), Some(120_500));
        assert!(errors.is_empty());
    }

    #[test]
    fn test_whole_number_rejects_garbage() {
        let mut errors = ValidationError::new();
        assert_eq!(errors.whole_number("year", "twenty"), None);
        assert_eq!(errors.whole_number("mileage", "-3"), None);
        assert_eq!(errors.whole_number("price", ""), None);
        assert_eq!(errors.field_names(), vec!["mileage", "price", "year"]);
        assert_eq!(errors.messages("year"), ["year must be a whole number"]);
    }

    #[test]
    fn test_serializes_as_field_map() {
        let err = ValidationError::single("email", "email is required");
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json, serde_json::json!({"email": ["email is required"]}));
        assert_eq!(err.to_string(), "invalid fields: email");
    }

    #[test]
    fn test_optional_text_blank_is_none() {
        assert_eq!(optional_text(Some("  ")), None);
        assert_eq!(optional_text(Some(" hi ")), Some("hi".to_owned()));
        assert_eq!(optional_text(None), None);
    }
}
