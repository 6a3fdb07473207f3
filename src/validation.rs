//! Field validation for the article forms.
//!
//! Produces a flat list of field/message pairs that the error layer echoes
//! back to the client together with the submitted form.

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use utoipa::ToSchema;

use crate::models::ArticleInput;

pub const TITLE_MAX_LEN: usize = 255;

/// FieldError
///
/// One failed constraint. `field` is empty for form-level errors.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, PartialEq, Eq)]
#[ts(export)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }

    /// An error about the form as a whole rather than one field.
    pub fn form(message: impl Into<String>) -> Self {
        Self::new("", message)
    }
}

/// ArticleFields
///
/// Title and content that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleFields {
    pub title: String,
    pub content: String,
}

/// Checks the title/content constraints shared by create and edit.
///
/// A value that is absent, empty or only whitespace counts as missing. Title
/// length is measured in characters.
pub fn validate_article(input: &ArticleInput) -> Result<ArticleFields, Vec<FieldError>> {
    let mut errors = Vec::new();

    let title = required(input.title.as_deref(), "title", "Title", &mut errors);
    if let Some(title) = title {
        if title.chars().count() > TITLE_MAX_LEN {
            errors.push(FieldError::new(
                "title",
                format!("The field Title must be a string with a maximum length of {TITLE_MAX_LEN}."),
            ));
        }
    }

    let content = required(input.content.as_deref(), "content", "Content", &mut errors);

    match (title, content) {
        (Some(title), Some(content)) if errors.is_empty() => Ok(ArticleFields {
            title: title.to_string(),
            content: content.to_string(),
        }),
        _ => Err(errors),
    }
}

fn required<'a>(
    value: Option<&'a str>,
    field: &str,
    label: &str,
    errors: &mut Vec<FieldError>,
) -> Option<&'a str> {
    match value {
        Some(v) if !v.trim().is_empty() => Some(v),
        _ => {
            errors.push(FieldError::new(field, format!("The {label} field is required.")));
            None
        }
    }
}
