//! Authentication extractors.
//!
//! A request is authenticated by a token in the session cookie or, for API
//! clients, an `Authorization: Bearer` header.
//!
//! - [`Identity`] rejects anonymous requests with a JSON 401 (API routes).
//! - [`CurrentUser`] redirects anonymous requests to the login page (HTML routes).
//! - [`OptionalIdentity`] never fails.

use std::future::{Ready, ready};

use actix_web::{
    FromRequest, HttpRequest, HttpResponse, ResponseError, dev::Payload, http::StatusCode,
    http::header, web,
};
use futures::future::LocalBoxFuture;

use yatube_core::domain::User;
use yatube_core::ports::{AuthError, SessionClaims};
use yatube_shared::ErrorResponse;

use crate::middleware::error::AppError;
use crate::state::AppState;
use crate::urls;

/// Authenticated user identity, decoded from the token alone.
#[derive(Debug, Clone)]
pub struct Identity {
    pub user_id: i64,
    pub username: String,
    pub is_staff: bool,
}

impl From<SessionClaims> for Identity {
    fn from(claims: SessionClaims) -> Self {
        Self {
            user_id: claims.user_id,
            username: claims.username,
            is_staff: claims.is_staff,
        }
    }
}

fn request_token(req: &HttpRequest, state: &AppState) -> Result<String, AuthError> {
    if let Some(value) = req.headers().get(header::AUTHORIZATION) {
        let auth_str = value
            .to_str()
            .map_err(|_| AuthError::InvalidToken("Invalid authorization header".to_string()))?;
        return auth_str
            .strip_prefix("Bearer ")
            .map(str::to_owned)
            .ok_or_else(|| AuthError::InvalidToken("Expected Bearer token".to_string()));
    }

    req.cookie(&state.site.session_cookie)
        .map(|cookie| cookie.value().to_owned())
        .filter(|value| !value.is_empty())
        .ok_or(AuthError::MissingAuth)
}

fn identify(req: &HttpRequest) -> Result<Identity, AuthError> {
    let Some(state) = req.app_data::<web::Data<AppState>>() else {
        tracing::error!("AppState not found in app data");
        return Err(AuthError::InvalidToken(
            "Server configuration error".to_string(),
        ));
    };

    let token = request_token(req, state)?;
    state.tokens.parse(&token).map(Identity::from)
}

/// Error type for authentication failures on API routes.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct AuthenticationError(pub AuthError);

impl ResponseError for AuthenticationError {
    fn status_code(&self) -> StatusCode {
        match &self.0 {
            AuthError::HashingError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::UNAUTHORIZED,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let problem = ErrorResponse::for_status(status.as_u16());
        let problem = match &self.0 {
            AuthError::TokenExpired => problem.with_detail("Session expired. Log in again."),
            AuthError::InvalidToken(msg) => problem.with_detail(msg.clone()),
            AuthError::MissingAuth => problem
                .with_detail("Log in or send a Bearer token in the Authorization header."),
            AuthError::HashingError(_) => problem,
        };

        HttpResponse::build(status).json(problem)
    }
}

impl FromRequest for Identity {
    type Error = AuthenticationError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(identify(req).map_err(AuthenticationError))
    }
}

/// Optional identity extractor - doesn't fail if not authenticated.
pub struct OptionalIdentity(pub Option<Identity>);

impl OptionalIdentity {
    pub fn user_id(&self) -> Option<i64> {
        self.0.as_ref().map(|identity| identity.user_id)
    }
}

impl FromRequest for OptionalIdentity {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(Ok(OptionalIdentity(identify(req).ok())))
    }
}

/// Redirect to the login page, remembering where the user was going.
#[derive(Debug, thiserror::Error)]
#[error("login required to access {next}")]
pub struct LoginRedirect {
    pub next: String,
}

impl LoginRedirect {
    fn for_request(req: &HttpRequest) -> Self {
        let next = req
            .uri()
            .path_and_query()
            .map(|pq| pq.as_str())
            .unwrap_or_else(|| req.path());
        Self {
            next: next.to_string(),
        }
    }
}

impl ResponseError for LoginRedirect {
    fn status_code(&self) -> StatusCode {
        StatusCode::FOUND
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::Found()
            .insert_header((header::LOCATION, urls::login_with_next(&self.next)))
            .finish()
    }
}

/// The logged-in account, loaded from storage. Anonymous requests are
/// redirected to the login page and never reach the handler.
pub struct CurrentUser(pub User);

impl FromRequest for CurrentUser {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let login = LoginRedirect::for_request(req);
        let identity = identify(req);
        let state = req.app_data::<web::Data<AppState>>().cloned();

        Box::pin(async move {
            let (Ok(identity), Some(state)) = (identity, state) else {
                return Err(login.into());
            };

            match state.users.find_by_id(identity.user_id).await {
                Ok(Some(user)) => Ok(CurrentUser(user)),
                Ok(None) => {
                    tracing::debug!(
                        user_id = identity.user_id,
                        "Session refers to a deleted account"
                    );
                    Err(login.into())
                }
                Err(e) => Err(AppError::from(e).into()),
            }
        })
    }
}
