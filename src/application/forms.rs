//! Typed form validation for write endpoints.
//!
//! Each submitted form validates into either a cleaned value or a set of
//! per-field errors the caller re-renders; nothing is persisted on failure.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FieldErrors {
    pub errors: Vec<FieldError>,
}

impl FieldErrors {
    pub fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.errors.push(FieldError {
            field,
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    fn into_result<T>(self, value: T) -> Result<T, FieldErrors> {
        if self.is_empty() { Ok(value) } else { Err(self) }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PostInput {
    pub text: String,
    pub group_id: Option<Uuid>,
    pub image_ref: Option<String>,
}

/// A post form that passed validation: trimmed non-empty text, optional
/// group and image references.
#[derive(Debug, Clone)]
pub struct ValidPost {
    pub text: String,
    pub group_id: Option<Uuid>,
    pub image_ref: Option<String>,
}

impl PostInput {
    pub fn validate(self) -> Result<ValidPost, FieldErrors> {
        let mut errors = FieldErrors::default();

        let text = self.text.trim().to_string();
        if text.is_empty() {
            errors.push("text", "post text must not be empty");
        }

        let image_ref = self
            .image_ref
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty());

        errors.into_result(ValidPost {
            text,
            group_id: self.group_id,
            image_ref,
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CommentInput {
    pub text: String,
}

#[derive(Debug, Clone)]
pub struct ValidComment {
    pub text: String,
}

impl CommentInput {
    pub fn validate(self) -> Result<ValidComment, FieldErrors> {
        let mut errors = FieldErrors::default();

        let text = self.text.trim().to_string();
        if text.is_empty() {
            errors.push("text", "comment text must not be empty");
        }

        errors.into_result(ValidComment { text })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn post_input_requires_text() {
        let err = PostInput::default().validate().expect_err("empty rejected");
        assert_eq!(err.errors.len(), 1);
        assert_eq!(err.errors[0].field, "text");
    }

    #[test]
    fn whitespace_only_text_is_rejected() {
        let input = PostInput {
            text: "   \n\t".to_string(),
            ..Default::default()
        };
        assert!(input.validate().is_err());
    }

    #[test]
    fn post_input_trims_and_keeps_optional_fields() {
        let group_id = Uuid::new_v4();
        let input = PostInput {
            text: "  hello feed  ".to_string(),
            group_id: Some(group_id),
            image_ref: Some("media/abc123".to_string()),
        };
        let valid = input.validate().expect("valid input");
        assert_eq!(valid.text, "hello feed");
        assert_eq!(valid.group_id, Some(group_id));
        assert_eq!(valid.image_ref.as_deref(), Some("media/abc123"));
    }

    #[test]
    fn blank_image_ref_collapses_to_none() {
        let input = PostInput {
            text: "hello".to_string(),
            group_id: None,
            image_ref: Some("   ".to_string()),
        };
        let valid = input.validate().expect("valid input");
        assert!(valid.image_ref.is_none());
    }

    #[test]
    fn comment_input_requires_text() {
        assert!(CommentInput::default().validate().is_err());
        let valid = CommentInput {
            text: "nice post".to_string(),
        }
        .validate()
        .expect("valid comment");
        assert_eq!(valid.text, "nice post");
    }
}
