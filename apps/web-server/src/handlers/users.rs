//! Account pages: login, logout and signup.

use actix_web::{
    HttpResponse,
    cookie::{Cookie, SameSite, time},
    web,
};
use serde_json::json;

use yatube_core::domain::{NewAccount, NewUser, User};
use yatube_core::error::{DomainError, RepoError};
use yatube_shared::dto::{LoginForm, NextQuery, SignupForm};

use super::posts::redirect;
use super::views;
use crate::middleware::auth::OptionalIdentity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;
use crate::templates;
use crate::urls;

const USERNAME_TAKEN: &str = "A user with that username already exists.";
const BAD_CREDENTIALS: &str =
    "Please enter a correct username and password. Note that both fields may be case-sensitive.";

/// GET /auth/login/
pub async fn login_form(
    state: web::Data<AppState>,
    viewer: OptionalIdentity,
    query: web::Query<NextQuery>,
) -> AppResult<HttpResponse> {
    render_login(&state, &viewer, "", query.next.as_deref(), &[])
}

/// POST /auth/login/
pub async fn login(
    state: web::Data<AppState>,
    viewer: OptionalIdentity,
    form: web::Form<LoginForm>,
) -> AppResult<HttpResponse> {
    let form = form.into_inner();
    let username = form.username.trim();

    let Some(user) = authenticate(&state, username, &form.password).await? else {
        tracing::info!(username, "Failed login attempt");
        return render_login(
            &state,
            &viewer,
            username,
            form.next.as_deref(),
            &[BAD_CREDENTIALS],
        );
    };

    let token = state.tokens.issue(&user)?;

    let target = form
        .next
        .as_deref()
        .filter(|next| urls::is_safe_next(next))
        .unwrap_or(urls::INDEX);

    tracing::info!(username = %user.username, "User logged in");
    let mut response = redirect(target);
    response
        .add_cookie(&session_cookie(&state, token))
        .map_err(|e| AppError::Internal(e.to_string()))?;
    Ok(response)
}

/// GET|POST /auth/logout/
pub async fn logout(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let context = views::page_context(None, "Вы вышли из системы", json!({}));
    let mut response = state.templates.page(templates::LOGGED_OUT, &context)?;

    let mut cookie = Cookie::build(state.site.session_cookie.clone(), "")
        .path("/")
        .finish();
    cookie.make_removal();
    response
        .add_cookie(&cookie)
        .map_err(|e| AppError::Internal(e.to_string()))?;
    Ok(response)
}

/// GET /auth/signup/
pub async fn signup_form(
    state: web::Data<AppState>,
    viewer: OptionalIdentity,
) -> AppResult<HttpResponse> {
    render_signup(&state, &viewer, "", Vec::new())
}

/// POST /auth/signup/
pub async fn signup(
    state: web::Data<AppState>,
    viewer: OptionalIdentity,
    form: web::Form<SignupForm>,
) -> AppResult<HttpResponse> {
    let form = form.into_inner();
    let account = NewAccount::new(&form.username, form.password, form.password_confirm);

    let mut errors: Vec<String> = match account.validate() {
        Ok(()) => Vec::new(),
        Err(DomainError::Validation(field_errors)) => {
            field_errors.into_iter().map(|e| e.message).collect()
        }
        Err(other) => return Err(other.into()),
    };
    if errors.is_empty() && state.users.find_by_username(&account.username).await?.is_some() {
        errors.push(USERNAME_TAKEN.to_string());
    }
    if !errors.is_empty() {
        return render_signup(&state, &viewer, &account.username, errors);
    }

    let password_hash = state.passwords.hash(&account.password)?;
    match state
        .users
        .create(NewUser::new(account.username.clone(), password_hash))
        .await
    {
        Ok(user) => {
            tracing::info!(user_id = user.id, username = %user.username, "Account created");
            Ok(redirect(urls::INDEX))
        }
        Err(RepoError::Constraint(_)) => render_signup(
            &state,
            &viewer,
            &account.username,
            vec![USERNAME_TAKEN.to_string()],
        ),
        Err(e) => Err(e.into()),
    }
}

/// Look up and check credentials. `None` means they do not match an account.
pub(crate) async fn authenticate(
    state: &AppState,
    username: &str,
    password: &str,
) -> AppResult<Option<User>> {
    let Some(user) = state.users.find_by_username(username).await? else {
        return Ok(None);
    };
    if state.passwords.verify(password, &user.password_hash)? {
        Ok(Some(user))
    } else {
        Ok(None)
    }
}

fn session_cookie(state: &AppState, token: String) -> Cookie<'static> {
    Cookie::build(state.site.session_cookie.clone(), token)
        .path("/")
        .http_only(true)
        .secure(state.site.secure_cookie)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::seconds(state.tokens.lifetime().num_seconds()))
        .finish()
}

fn render_login(
    state: &AppState,
    viewer: &OptionalIdentity,
    username: &str,
    next: Option<&str>,
    errors: &[&str],
) -> AppResult<HttpResponse> {
    let context = views::page_context(
        viewer.0.as_ref(),
        "Войти",
        json!({ "username": username, "next": next, "errors": errors }),
    );
    Ok(state.templates.page(templates::LOGIN, &context)?)
}

fn render_signup(
    state: &AppState,
    viewer: &OptionalIdentity,
    username: &str,
    errors: Vec<String>,
) -> AppResult<HttpResponse> {
    let context = views::page_context(
        viewer.0.as_ref(),
        "Зарегистрироваться",
        json!({ "username": username, "errors": errors }),
    );
    Ok(state.templates.page(templates::SIGNUP, &context)?)
}
