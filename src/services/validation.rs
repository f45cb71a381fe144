//! Field checks shared by the resource services. Failures accumulate into one
//! `ValidationError` so callers see every bad field at once.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{AppError, FieldErrors};

pub const MAX_TITLE_LEN: usize = 200;
pub const MAX_NAME_LEN: usize = 100;
pub const MAX_COMMENT_LEN: usize = 2000;
pub const MAX_MESSAGE_LEN: usize = 5000;
pub const MIN_PASSWORD_LEN: usize = 8;

static EMAIL_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email regex"));

static URL_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^https?://[^\s/$.?#][^\s]*$").expect("valid url regex"));

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_REGEX.is_match(email)
}

pub fn is_valid_url(url: &str) -> bool {
    URL_REGEX.is_match(url)
}

#[derive(Default)]
pub struct Validator {
    errors: FieldErrors,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail(&mut self, field: &str, reason: impl Into<String>) {
        self.errors
            .entry(field.to_string())
            .or_insert_with(|| reason.into());
    }

    /// Required, non-blank, at most `max` characters. Returns the trimmed value.
    pub fn required(&mut self, field: &str, value: Option<&str>, max: usize) -> String {
        match value.map(str::trim) {
            None | Some("") => {
                self.fail(field, format!("{} is required", label(field)));
                String::new()
            }
            Some(v) => {
                self.max_len(field, v, max);
                v.to_string()
            }
        }
    }

    /// Present-but-blank is an error; absent means "leave unchanged".
    pub fn optional_non_blank(
        &mut self,
        field: &str,
        value: Option<&str>,
        max: usize,
    ) -> Option<String> {
        let v = value?.trim();
        if v.is_empty() {
            self.fail(field, format!("{} cannot be empty", label(field)));
            return None;
        }
        self.max_len(field, v, max);
        Some(v.to_string())
    }

    pub fn max_len(&mut self, field: &str, value: &str, max: usize) {
        if value.chars().count() > max {
            self.fail(
                field,
                format!("{} must be at most {} characters", label(field), max),
            );
        }
    }

    pub fn email(&mut self, field: &str, value: &str) {
        if !value.is_empty() && !is_valid_email(value) {
            self.fail(field, "Invalid email format");
        }
    }

    /// Optional URL: blank clears it, anything else must be http(s).
    pub fn url(&mut self, field: &str, value: Option<&str>) -> Option<String> {
        let v = value.map(str::trim).filter(|v| !v.is_empty())?;
        if !is_valid_url(v) {
            self.fail(field, "Must be an http(s) URL");
        }
        Some(v.to_string())
    }

    pub fn finish(self) -> Result<(), AppError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(self.errors))
        }
    }
}

/// "imageUrl" -> "Image url"
fn label(field: &str) -> String {
    let mut out = String::with_capacity(field.len() + 2);
    for (i, ch) in field.chars().enumerate() {
        if i == 0 {
            out.extend(ch.to_uppercase());
        } else if ch.is_uppercase() {
            out.push(' ');
            out.extend(ch.to_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_collects_missing_and_blank() {
        let mut v = Validator::new();
        assert_eq!(v.required("title", None, 10), "");
        assert_eq!(v.required("content", Some("   "), 10), "");
        assert_eq!(v.required("name", Some("  Ada "), 10), "Ada");

        let Err(AppError::Validation(fields)) = v.finish() else {
            panic!("expected validation error");
        };
        assert_eq!(fields.len(), 2);
        assert_eq!(fields["title"], "Title is required");
    }

    #[test]
    fn test_max_len_counts_chars() {
        let mut v = Validator::new();
        v.required("title", Some("ééé"), 3);
        assert!(v.finish().is_ok());

        let mut v = Validator::new();
        v.required("title", Some("abcd"), 3);
        assert!(v.finish().is_err());
    }

    #[test]
    fn test_optional_non_blank() {
        let mut v = Validator::new();
        assert_eq!(v.optional_non_blank("title", None, 10), None);
        assert_eq!(v.optional_non_blank("title", Some("x"), 10).as_deref(), Some("x"));
        assert!(v.finish().is_ok());

        let mut v = Validator::new();
        v.optional_non_blank("title", Some(""), 10);
        assert!(v.finish().is_err());
    }

    #[test]
    fn test_email_and_url_formats() {
        assert!(is_valid_email("alice@example.com"));
        assert!(!is_valid_email("no-at-sign"));
        assert!(!is_valid_email("a@b"));

        assert!(is_valid_url("https://github.com/alice/site"));
        assert!(is_valid_url("http://localhost:3000"));
        assert!(!is_valid_url("ftp://example.com"));
        assert!(!is_valid_url("javascript:alert(1)"));
    }

    #[test]
    fn test_blank_url_clears() {
        let mut v = Validator::new();
        assert_eq!(v.url("repoUrl", Some("  ")), None);
        assert!(v.finish().is_ok());
    }

    #[test]
    fn test_label_splits_camel_case() {
        assert_eq!(label("imageUrl"), "Image url");
        assert_eq!(label("title"), "Title");
    }
}
