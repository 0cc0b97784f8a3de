//! JSON API: bearer tokens and group administration.

use actix_web::{HttpResponse, web};

use yatube_core::domain::{Group, NewGroup};
use yatube_core::error::RepoError;
use yatube_shared::ListResponse;
use yatube_shared::dto::{AuthResponse, CreateGroupRequest, GroupResponse, TokenRequest};

use super::users::authenticate;
use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

fn group_response(group: Group) -> GroupResponse {
    GroupResponse {
        id: group.id,
        title: group.title,
        slug: group.slug,
        description: group.description,
    }
}

/// POST /api/auth/token
pub async fn issue_token(
    state: web::Data<AppState>,
    body: web::Json<TokenRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    let user = authenticate(&state, req.username.trim(), &req.password)
        .await?
        .ok_or(AppError::Unauthorized)?;

    let token = state.tokens.issue(&user)?;

    Ok(HttpResponse::Ok().json(AuthResponse {
        access_token: token,
        token_type: "Bearer".to_string(),
        expires_in: state.tokens.lifetime().num_seconds().max(0) as u64,
    }))
}

/// GET /api/groups
pub async fn list_groups(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let groups: Vec<GroupResponse> = state
        .groups
        .list()
        .await?
        .into_iter()
        .map(group_response)
        .collect();

    Ok(HttpResponse::Ok().json(ListResponse::from(groups)))
}

/// POST /api/groups - staff only
pub async fn create_group(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<CreateGroupRequest>,
) -> AppResult<HttpResponse> {
    if !identity.is_staff {
        tracing::warn!(user = %identity.username, "Group creation denied");
        return Err(AppError::Forbidden);
    }

    let req = body.into_inner();
    let new_group = NewGroup::new(&req.title, &req.slug, &req.description);
    new_group.validate()?;

    let group = match state.groups.create(new_group).await {
        Ok(group) => group,
        Err(RepoError::Constraint(_)) => {
            return Err(AppError::Conflict(format!(
                "Group with slug '{}' already exists",
                req.slug.trim()
            )));
        }
        Err(e) => return Err(e.into()),
    };

    tracing::info!(group_id = group.id, slug = %group.slug, by = %identity.username, "Group created");
    Ok(HttpResponse::Created().json(group_response(group)))
}
