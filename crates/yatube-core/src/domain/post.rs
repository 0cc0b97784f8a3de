use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, FieldError};

/// Post entity - a short text entry written by a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: i64,
    pub text: String,
    pub pub_date: DateTime<Utc>,
    pub author_id: i64,
    pub group_id: Option<i64>,
}

impl Post {
    pub const TEXT_MAX_LEN: usize = 200;
    /// Length of the text prefix used as the post's display string.
    pub const SUMMARY_LEN: usize = 15;

    /// The first characters of the text, used in titles and listings.
    pub fn summary(&self) -> String {
        self.text.chars().take(Self::SUMMARY_LEN).collect()
    }

    pub fn is_authored_by(&self, user_id: i64) -> bool {
        self.author_id == user_id
    }
}

impl std::fmt::Display for Post {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.summary())
    }
}

/// The author-editable part of a post, as submitted through the post form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostDraft {
    pub text: String,
    pub group_id: Option<i64>,
}

impl PostDraft {
    pub fn new(text: &str, group_id: Option<i64>) -> Self {
        Self {
            text: text.trim().to_string(),
            group_id,
        }
    }

    /// Checks the text field. Group existence is checked against storage by the caller.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.text.is_empty() {
            return Err(DomainError::Validation(vec![FieldError::new(
                "text",
                "This field is required.",
            )]));
        }
        let len = self.text.chars().count();
        if len > Post::TEXT_MAX_LEN {
            return Err(DomainError::Validation(vec![FieldError::new(
                "text",
                format!(
                    "Ensure this value has at most {} characters (it has {len}).",
                    Post::TEXT_MAX_LEN
                ),
            )]));
        }
        Ok(())
    }
}

/// A post about to be inserted; the store assigns `id` and `pub_date`.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub author_id: i64,
    pub text: String,
    pub group_id: Option<i64>,
}

impl NewPost {
    pub fn new(author_id: i64, draft: PostDraft) -> Self {
        Self {
            author_id,
            text: draft.text,
            group_id: draft.group_id,
        }
    }
}

/// Which posts a listing shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostFilter {
    All,
    Group(i64),
    Author(i64),
}

impl PostFilter {
    pub fn matches(&self, post: &Post) -> bool {
        match *self {
            PostFilter::All => true,
            PostFilter::Group(id) => post.group_id == Some(id),
            PostFilter::Author(id) => post.author_id == id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post(text: &str) -> Post {
        Post {
            id: 1,
            text: text.to_string(),
            pub_date: Utc::now(),
            author_id: 7,
            group_id: Some(3),
        }
    }

    #[test]
    fn test_summary_counts_characters() {
        let p = post("Тестовый пост с длинным текстом");
        assert_eq!(p.summary(), "Тестовый пост с");
        assert_eq!(p.to_string(), p.summary());
        assert_eq!(post("short").summary(), "short");
    }

    #[test]
    fn test_draft_is_trimmed_and_required() {
        let draft = PostDraft::new("  hello  ", None);
        assert_eq!(draft.text, "hello");
        assert!(draft.validate().is_ok());
        assert!(PostDraft::new("   ", None).validate().is_err());
    }

    #[test]
    fn test_draft_length_limit_is_in_characters() {
        let exact = "ж".repeat(Post::TEXT_MAX_LEN);
        assert!(PostDraft::new(&exact, None).validate().is_ok());

        let over = "ж".repeat(Post::TEXT_MAX_LEN + 1);
        let err = PostDraft::new(&over, None).validate().unwrap_err();
        assert!(err.to_string().contains("at most 200 characters (it has 201)"));
    }

    #[test]
    fn test_filter_matches() {
        let p = post("text");
        assert!(PostFilter::All.matches(&p));
        assert!(PostFilter::Group(3).matches(&p));
        assert!(!PostFilter::Group(4).matches(&p));
        assert!(PostFilter::Author(7).matches(&p));
        assert!(!PostFilter::Author(8).matches(&p));
    }
}
