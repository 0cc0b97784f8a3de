//! Blog pages: listings, post detail, and the create/edit form.

use actix_web::{HttpResponse, http::header, web};
use serde_json::json;

use yatube_core::domain::{NewPost, Post, PostDraft, PostFilter, User};
use yatube_core::error::{DomainError, FieldError};
use yatube_shared::dto::{PageQuery, PostForm};

use super::views::{self, PostFormView};
use crate::middleware::auth::{CurrentUser, OptionalIdentity};
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;
use crate::templates;
use crate::urls;

pub(crate) fn redirect(location: &str) -> HttpResponse {
    HttpResponse::Found()
        .insert_header((header::LOCATION, location))
        .finish()
}

/// GET /
pub async fn index(
    state: web::Data<AppState>,
    viewer: OptionalIdentity,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let request = state.page_request(query.page.as_deref());
    let page = state.posts.page(PostFilter::All, request).await?;
    let body = views::present_page(&state, page).await?;

    let context = views::page_context(
        viewer.0.as_ref(),
        "Последние обновления на сайте",
        body,
    );
    Ok(state.templates.page(templates::INDEX, &context)?)
}

/// GET /group/{slug}/
pub async fn group_posts(
    state: web::Data<AppState>,
    viewer: OptionalIdentity,
    slug: web::Path<String>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let group = state
        .groups
        .find_by_slug(&slug)
        .await?
        .ok_or_else(|| DomainError::not_found("Group", slug.as_str()))?;

    let request = state.page_request(query.page.as_deref());
    let page = state.posts.page(PostFilter::Group(group.id), request).await?;
    let mut body = views::present_page(&state, page).await?;
    body["group"] = json!(group);

    let title = format!("Записи сообщества {}", group.title);
    let context = views::page_context(viewer.0.as_ref(), &title, body);
    Ok(state.templates.page(templates::GROUP_LIST, &context)?)
}

/// GET /profile/{username}/
pub async fn profile(
    state: web::Data<AppState>,
    viewer: OptionalIdentity,
    username: web::Path<String>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let author = state
        .users
        .find_by_username(&username)
        .await?
        .ok_or_else(|| DomainError::not_found("User", username.as_str()))?;

    let request = state.page_request(query.page.as_deref());
    let page = state.posts.page(PostFilter::Author(author.id), request).await?;
    let posts_count = page.total;
    let mut body = views::present_page(&state, page).await?;
    body["author"] = json!({ "username": author.username });
    body["posts_count"] = json!(posts_count);

    let title = format!("Профайл пользователя {}", author.username);
    let context = views::page_context(viewer.0.as_ref(), &title, body);
    Ok(state.templates.page(templates::PROFILE, &context)?)
}

/// GET /posts/{post_id}/
pub async fn post_detail(
    state: web::Data<AppState>,
    viewer: OptionalIdentity,
    post_id: web::Path<i64>,
) -> AppResult<HttpResponse> {
    let post = find_post(&state, *post_id).await?;
    let can_edit = viewer.user_id() == Some(post.author_id);
    let author_posts_count = state.posts.count_by_author(post.author_id).await?;
    let title = format!("Пост {}", post.summary());
    let view = views::present_post(&state, post).await?;

    let context = views::page_context(
        viewer.0.as_ref(),
        &title,
        json!({
            "post": view,
            "author_posts_count": author_posts_count,
            "can_edit": can_edit,
        }),
    );
    Ok(state.templates.page(templates::POST_DETAIL, &context)?)
}

/// GET /create/
pub async fn post_create_form(
    state: web::Data<AppState>,
    viewer: OptionalIdentity,
    CurrentUser(_user): CurrentUser,
) -> AppResult<HttpResponse> {
    let groups = state.groups.list().await?;
    let form = PostFormView::new(urls::CREATE_POST.to_string(), "", None, &groups);
    render_form(&state, &viewer, form, false)
}

/// POST /create/
pub async fn post_create(
    state: web::Data<AppState>,
    viewer: OptionalIdentity,
    CurrentUser(user): CurrentUser,
    form: web::Form<PostForm>,
) -> AppResult<HttpResponse> {
    let form = form.into_inner();
    match bind_post_form(&state, &form).await? {
        Ok(draft) => {
            let post = state.posts.create(NewPost::new(user.id, draft)).await?;
            tracing::info!(post_id = post.id, author = %user.username, "Post published");
            Ok(redirect(&urls::profile(&user.username)))
        }
        Err(errors) => {
            let groups = state.groups.list().await?;
            let selected = form.group.trim().parse().ok();
            let view = PostFormView::new(urls::CREATE_POST.to_string(), &form.text, selected, &groups)
                .with_errors(errors);
            render_form(&state, &viewer, view, false)
        }
    }
}

/// GET /posts/{post_id}/edit/
pub async fn post_edit_form(
    state: web::Data<AppState>,
    viewer: OptionalIdentity,
    CurrentUser(user): CurrentUser,
    post_id: web::Path<i64>,
) -> AppResult<HttpResponse> {
    let post = find_post(&state, *post_id).await?;
    if let Some(response) = reject_non_author(&post, &user) {
        return Ok(response);
    }

    let groups = state.groups.list().await?;
    let form = PostFormView::new(urls::post_edit(post.id), &post.text, post.group_id, &groups);
    render_form(&state, &viewer, form, true)
}

/// POST /posts/{post_id}/edit/
pub async fn post_edit(
    state: web::Data<AppState>,
    viewer: OptionalIdentity,
    CurrentUser(user): CurrentUser,
    post_id: web::Path<i64>,
    form: web::Form<PostForm>,
) -> AppResult<HttpResponse> {
    let post = find_post(&state, *post_id).await?;
    if let Some(response) = reject_non_author(&post, &user) {
        return Ok(response);
    }

    let form = form.into_inner();
    match bind_post_form(&state, &form).await? {
        Ok(draft) => {
            state.posts.update(post.id, draft).await?;
            tracing::info!(post_id = post.id, author = %user.username, "Post edited");
            Ok(redirect(&urls::post_detail(post.id)))
        }
        Err(errors) => {
            let groups = state.groups.list().await?;
            let selected = form.group.trim().parse().ok();
            let view = PostFormView::new(urls::post_edit(post.id), &form.text, selected, &groups)
                .with_errors(errors);
            render_form(&state, &viewer, view, true)
        }
    }
}

async fn find_post(state: &AppState, post_id: i64) -> AppResult<Post> {
    Ok(state
        .posts
        .find_by_id(post_id)
        .await?
        .ok_or_else(|| DomainError::not_found("Post", post_id))?)
}

/// Only the author may edit; anyone else is sent back to the post.
fn reject_non_author(post: &Post, user: &User) -> Option<HttpResponse> {
    if post.is_authored_by(user.id) {
        return None;
    }
    tracing::debug!(post_id = post.id, user = %user.username, "Edit attempt by non-author");
    Some(redirect(&urls::post_detail(post.id)))
}

/// Turn the submitted form into a draft, or the list of field errors to show.
async fn bind_post_form(
    state: &AppState,
    form: &PostForm,
) -> AppResult<Result<PostDraft, Vec<FieldError>>> {
    let mut errors = Vec::new();

    let group_id = match form.group.trim() {
        "" => None,
        raw => match raw.parse::<i64>() {
            Ok(id) if state.groups.find_by_id(id).await?.is_some() => Some(id),
            _ => {
                errors.push(FieldError::new(
                    "group",
                    "Select a valid choice. That choice is not one of the available choices.",
                ));
                None
            }
        },
    };

    let draft = PostDraft::new(&form.text, group_id);
    match draft.validate() {
        Ok(()) => {}
        Err(DomainError::Validation(field_errors)) => errors.extend(field_errors),
        Err(other) => return Err(other.into()),
    }

    if errors.is_empty() {
        Ok(Ok(draft))
    } else {
        Ok(Err(errors))
    }
}

fn render_form(
    state: &AppState,
    viewer: &OptionalIdentity,
    form: PostFormView,
    is_edit: bool,
) -> AppResult<HttpResponse> {
    let title = if is_edit {
        "Редактировать запись"
    } else {
        "Новая запись"
    };
    let context = views::page_context(
        viewer.0.as_ref(),
        title,
        json!({ "form": form, "is_edit": is_edit }),
    );
    state
        .templates
        .page(templates::CREATE_POST, &context)
        .map_err(AppError::from)
}
