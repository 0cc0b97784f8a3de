//! Template contexts.

use std::collections::HashMap;

use chrono::{Datelike, Utc};
use serde::Serialize;
use serde_json::{Value, json};

use yatube_core::domain::{Group, Page, Post};
use yatube_core::error::FieldError;

use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;
use crate::urls;

/// Base context shared by every page: title, navigation user, footer year.
pub fn page_context(viewer: Option<&Identity>, title: &str, body: Value) -> Value {
    let mut context = json!({
        "title": title,
        "year": Utc::now().year(),
        "viewer": viewer.map(|identity| json!({
            "username": identity.username,
            "profile_url": urls::profile(&identity.username),
        })),
    });

    if let (Value::Object(base), Value::Object(extra)) = (&mut context, body) {
        base.extend(extra);
    }
    context
}

#[derive(Debug, Clone, Serialize)]
pub struct GroupLink {
    pub title: String,
    pub slug: String,
    pub url: String,
}

impl From<&Group> for GroupLink {
    fn from(group: &Group) -> Self {
        Self {
            title: group.title.clone(),
            slug: group.slug.clone(),
            url: urls::group(&group.slug),
        }
    }
}

/// A post as listings and the detail page show it.
#[derive(Debug, Clone, Serialize)]
pub struct PostView {
    pub id: i64,
    pub text: String,
    pub summary: String,
    pub pub_date: String,
    pub author: String,
    pub author_url: String,
    pub detail_url: String,
    pub edit_url: String,
    pub group: Option<GroupLink>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PaginatorView {
    pub show: bool,
    pub number: u64,
    pub num_pages: u64,
    pub has_previous: bool,
    pub has_next: bool,
    pub previous: u64,
    pub next: u64,
}

impl<T> From<&Page<T>> for PaginatorView {
    fn from(page: &Page<T>) -> Self {
        Self {
            show: page.num_pages() > 1,
            number: page.number,
            num_pages: page.num_pages(),
            has_previous: page.has_previous(),
            has_next: page.has_next(),
            previous: page.number.saturating_sub(1).max(1),
            next: page.number + 1,
        }
    }
}

/// Resolves authors and groups for a batch of posts, each looked up once.
async fn present_posts(state: &AppState, posts: Vec<Post>) -> AppResult<Vec<PostView>> {
    let mut authors: HashMap<i64, String> = HashMap::new();
    let mut groups: HashMap<i64, Option<GroupLink>> = HashMap::new();
    let mut views = Vec::with_capacity(posts.len());

    for post in posts {
        if !authors.contains_key(&post.author_id) {
            let username = state
                .users
                .find_by_id(post.author_id)
                .await?
                .map(|user| user.username)
                .unwrap_or_default();
            authors.insert(post.author_id, username);
        }

        let group = match post.group_id {
            Some(group_id) => {
                if !groups.contains_key(&group_id) {
                    let link = state
                        .groups
                        .find_by_id(group_id)
                        .await?
                        .as_ref()
                        .map(GroupLink::from);
                    groups.insert(group_id, link);
                }
                groups.get(&group_id).cloned().flatten()
            }
            None => None,
        };

        let author = authors.get(&post.author_id).cloned().unwrap_or_default();
        views.push(PostView {
            id: post.id,
            summary: post.summary(),
            pub_date: post.pub_date.format("%d.%m.%Y %H:%M").to_string(),
            author_url: urls::profile(&author),
            detail_url: urls::post_detail(post.id),
            edit_url: urls::post_edit(post.id),
            author,
            group,
            text: post.text,
        });
    }

    Ok(views)
}

pub async fn present_post(state: &AppState, post: Post) -> AppResult<PostView> {
    let mut views = present_posts(state, vec![post]).await?;
    views
        .pop()
        .ok_or_else(|| AppError::Internal("empty post view".into()))
}

/// Listing context: `posts` and `paginator`.
pub async fn present_page(state: &AppState, page: Page<Post>) -> AppResult<Value> {
    let paginator = PaginatorView::from(&page);
    let posts = present_posts(state, page.items).await?;
    Ok(json!({ "posts": posts, "paginator": paginator }))
}

/// Post form state for re-rendering, with errors grouped by field.
#[derive(Debug, Clone, Serialize)]
pub struct PostFormView {
    pub action: String,
    pub text: String,
    pub text_max_len: usize,
    pub groups: Vec<GroupOption>,
    pub text_errors: Vec<String>,
    pub group_errors: Vec<String>,
    pub non_field_errors: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GroupOption {
    pub id: i64,
    pub title: String,
    pub selected: bool,
}

impl PostFormView {
    pub fn new(action: String, text: &str, selected: Option<i64>, groups: &[Group]) -> Self {
        Self {
            action,
            text: text.to_string(),
            text_max_len: Post::TEXT_MAX_LEN,
            groups: groups
                .iter()
                .map(|group| GroupOption {
                    id: group.id,
                    title: group.title.clone(),
                    selected: Some(group.id) == selected,
                })
                .collect(),
            text_errors: Vec::new(),
            group_errors: Vec::new(),
            non_field_errors: Vec::new(),
        }
    }

    pub fn with_errors(mut self, errors: Vec<FieldError>) -> Self {
        for error in errors {
            match error.field {
                Some("text") => self.text_errors.push(error.message),
                Some("group") => self.group_errors.push(error.message),
                _ => self.non_field_errors.push(error.message),
            }
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_context_merges_body() {
        let identity = Identity {
            user_id: 1,
            username: "UserTest".into(),
            is_staff: false,
        };
        let context = page_context(Some(&identity), "Title", json!({ "extra": 5 }));

        assert_eq!(context["title"], "Title");
        assert_eq!(context["extra"], 5);
        assert_eq!(context["viewer"]["profile_url"], "/profile/UserTest/");
        assert!(page_context(None, "T", json!({}))["viewer"].is_null());
    }

    #[test]
    fn test_paginator_view() {
        let page = Page::new(vec![1, 2], 2, 2, 5);
        let view = PaginatorView::from(&page);
        assert!(view.show);
        assert_eq!((view.previous, view.next, view.num_pages), (1, 3, 3));

        let single = Page::new(vec![1], 1, 10, 1);
        assert!(!PaginatorView::from(&single).show);
    }

    #[test]
    fn test_form_errors_grouped_by_field() {
        let form = PostFormView::new("/create/".into(), "", None, &[]).with_errors(vec![
            FieldError::new("text", "This field is required."),
            FieldError::new("group", "Select a valid choice."),
            FieldError::non_field("Oops"),
        ]);
        assert_eq!(form.text_errors, vec!["This field is required."]);
        assert_eq!(form.group_errors, vec!["Select a valid choice."]);
        assert_eq!(form.non_field_errors, vec!["Oops"]);
    }
}
