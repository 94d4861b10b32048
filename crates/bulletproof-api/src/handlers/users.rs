use std::sync::Arc;

use axum::{extract::State, Json};
use bulletproof_auth::{Gate, Role, Subject};
use bulletproof_db::UserRepository;
use tracing::{debug, info};

use super::require;
use crate::error::ApiError;
use crate::middleware::{CurrentUser, PathId};
use crate::models::{ErrorResponse, SuccessResponse, User, UserList};
use crate::AppState;

/// List the members of the caller's team (ADMIN only)
#[utoipa::path(
    get,
    path = "/api/users",
    responses(
        (status = 200, description = "Team members", body = UserList),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Not an admin", body = ErrorResponse)
    ),
    tag = "users"
)]
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
) -> Result<Json<UserList>, ApiError> {
    require(&user, &Gate::roles(&[Role::Admin]))?;

    let members = UserRepository::new(&state.db)
        .find_by_team(user.team_id())
        .await?;
    debug!("Listing {} users of team {}", members.len(), user.team_id());

    Ok(Json(UserList {
        data: members.into_iter().map(Into::into).collect(),
    }))
}

/// Get a user of the caller's team
#[utoipa::path(
    get,
    path = "/api/users/{id}",
    params(
        ("id" = uuid::Uuid, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User", body = User),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    tag = "users"
)]
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    PathId(id): PathId,
) -> Result<Json<User>, ApiError> {
    let found = UserRepository::new(&state.db)
        .find_by_id(id)
        .await?
        .filter(|found| found.team_id == user.team_id())
        .ok_or_else(|| ApiError::not_found("User"))?;

    Ok(Json(found.into()))
}

/// Remove a member of the caller's team (ADMIN only, not yourself)
///
/// Their discussions and comments are removed with them.
#[utoipa::path(
    delete,
    path = "/api/users/{id}",
    params(
        ("id" = uuid::Uuid, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User deleted", body = SuccessResponse),
        (status = 400, description = "Cannot delete yourself", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Not an admin", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    tag = "users"
)]
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    PathId(id): PathId,
) -> Result<Json<SuccessResponse>, ApiError> {
    let users = UserRepository::new(&state.db);

    let target = users
        .find_by_id(id)
        .await?
        .filter(|found| found.team_id == user.team_id())
        .ok_or_else(|| ApiError::not_found("User"))?;

    require(&user, &Gate::roles(&[Role::Admin]))?;

    if target.id == user.id() {
        return Err(ApiError::field("id", "You cannot delete yourself"));
    }

    if !users.delete(target.id).await? {
        return Err(ApiError::not_found("User"));
    }

    info!("User {} deleted user {} ({})", user.id(), target.id, target.email);

    Ok(Json(SuccessResponse::ok()))
}
