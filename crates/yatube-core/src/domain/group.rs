use serde::{Deserialize, Serialize};

use crate::error::{DomainError, FieldError};

/// Group entity - a named community posts may belong to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub description: String,
}

impl Group {
    pub const TITLE_MAX_LEN: usize = 200;
    pub const SLUG_MAX_LEN: usize = 200;
}

impl std::fmt::Display for Group {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.title)
    }
}

/// A group about to be inserted.
#[derive(Debug, Clone)]
pub struct NewGroup {
    pub title: String,
    pub slug: String,
    pub description: String,
}

impl NewGroup {
    pub fn new(title: &str, slug: &str, description: &str) -> Self {
        Self {
            title: title.trim().to_string(),
            slug: slug.trim().to_string(),
            description: description.trim().to_string(),
        }
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        let mut errors = Vec::new();

        required_bounded(&mut errors, "title", &self.title, Some(Group::TITLE_MAX_LEN));
        required_bounded(&mut errors, "slug", &self.slug, Some(Group::SLUG_MAX_LEN));
        required_bounded(&mut errors, "description", &self.description, None);

        if !self.slug.is_empty() && !is_valid_slug(&self.slug) {
            errors.push(FieldError::new(
                "slug",
                "Enter a valid \"slug\" consisting of letters, numbers, underscores or hyphens.",
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(DomainError::Validation(errors))
        }
    }
}

fn required_bounded(
    errors: &mut Vec<FieldError>,
    field: &'static str,
    value: &str,
    max_len: Option<usize>,
) {
    if value.is_empty() {
        errors.push(FieldError::new(field, "This field is required."));
        return;
    }
    if let Some(max) = max_len {
        let len = value.chars().count();
        if len > max {
            errors.push(FieldError::new(
                field,
                format!("Ensure this value has at most {max} characters (it has {len})."),
            ));
        }
    }
}

/// Slugs are ASCII letters, digits, hyphens and underscores.
pub fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slug_rules() {
        assert!(is_valid_slug("group_test-1"));
        assert!(!is_valid_slug("with space"));
        assert!(!is_valid_slug("кириллица"));
        assert!(!is_valid_slug(""));
    }

    #[test]
    fn test_new_group_validation() {
        assert!(NewGroup::new("Cats", "cats", "All about cats").validate().is_ok());

        let err = NewGroup::new("", "bad slug", "").validate().unwrap_err();
        let DomainError::Validation(errors) = err else {
            panic!("expected validation error");
        };
        assert_eq!(errors.len(), 3);
        assert!(errors.iter().any(|e| e.field == Some("slug")));
    }

    #[test]
    fn test_title_length_limit() {
        let title = "x".repeat(Group::TITLE_MAX_LEN + 1);
        assert!(NewGroup::new(&title, "long", "desc").validate().is_err());
    }
}
