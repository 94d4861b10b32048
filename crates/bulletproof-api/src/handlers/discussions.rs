use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use bulletproof_auth::{Gate, Policy, Role, Subject};
use bulletproof_db::{
    DiscussionChanges, DiscussionRepository, NewDiscussion, Page, UserRepository,
};
use tracing::{debug, info};

use super::{load_authors, page_meta, require};
use crate::error::ApiError;
use crate::middleware::{ApiQuery, CurrentUser, PathId, ValidatedJson};
use crate::models::{
    CreateDiscussionRequest, Discussion, DiscussionList, ErrorResponse, PaginationQuery,
    SuccessResponse, UpdateDiscussionRequest, User,
};
use crate::AppState;

/// List discussions of the caller's team, newest first
#[utoipa::path(
    get,
    path = "/api/discussions",
    params(PaginationQuery),
    responses(
        (status = 200, description = "One page of discussions", body = DiscussionList),
        (status = 400, description = "Invalid query", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse)
    ),
    tag = "discussions"
)]
pub async fn list_discussions(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    ApiQuery(query): ApiQuery<PaginationQuery>,
) -> Result<Json<DiscussionList>, ApiError> {
    let page = Page::new(query.page, query.per_page);

    let (rows, total) = DiscussionRepository::new(&state.db)
        .find_by_team(user.team_id(), page)
        .await?;
    debug!(
        "Listing page {} of discussions for team {} ({} total)",
        page.page,
        user.team_id(),
        total
    );

    let authors = load_authors(&state.db, rows.iter().map(|d| d.author_id)).await?;
    let data = rows
        .into_iter()
        .map(|d| {
            let author = authors.get(&d.author_id).cloned();
            Discussion::from_model(d, author)
        })
        .collect();

    Ok(Json(DiscussionList {
        data,
        meta: page_meta(page, total),
    }))
}

/// Start a discussion in the caller's team (ADMIN only)
#[utoipa::path(
    post,
    path = "/api/discussions",
    request_body = CreateDiscussionRequest,
    responses(
        (status = 201, description = "Discussion created", body = Discussion),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Not an admin", body = ErrorResponse)
    ),
    tag = "discussions"
)]
pub async fn create_discussion(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    payload: Result<ValidatedJson<CreateDiscussionRequest>, ApiError>,
) -> Result<(StatusCode, Json<Discussion>), ApiError> {
    require(&user, &Gate::roles(&[Role::Admin]))?;
    let ValidatedJson(req) = payload?;

    let discussion = DiscussionRepository::new(&state.db)
        .create(NewDiscussion {
            title: req.title.trim().to_string(),
            body: req.body,
            author_id: user.id(),
            team_id: user.team_id(),
        })
        .await?;

    info!(
        "User {} created discussion {} in team {}",
        user.id(),
        discussion.id,
        discussion.team_id
    );

    let author = User::from(user.0);
    Ok((
        StatusCode::CREATED,
        Json(Discussion::from_model(discussion, Some(author))),
    ))
}

/// Get a discussion of the caller's team
#[utoipa::path(
    get,
    path = "/api/discussions/{id}",
    params(
        ("id" = uuid::Uuid, Path, description = "Discussion ID")
    ),
    responses(
        (status = 200, description = "Discussion with its author", body = Discussion),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 404, description = "Discussion not found", body = ErrorResponse)
    ),
    tag = "discussions"
)]
pub async fn get_discussion(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    PathId(id): PathId,
) -> Result<Json<Discussion>, ApiError> {
    let discussion = DiscussionRepository::new(&state.db)
        .find_in_team(id, user.team_id())
        .await?
        .ok_or_else(|| ApiError::not_found("Discussion"))?;

    let author = UserRepository::new(&state.db)
        .find_by_id(discussion.author_id)
        .await?
        .map(User::from);

    Ok(Json(Discussion::from_model(discussion, author)))
}

/// Edit a discussion (ADMIN, `discussion:update`)
#[utoipa::path(
    patch,
    path = "/api/discussions/{id}",
    params(
        ("id" = uuid::Uuid, Path, description = "Discussion ID")
    ),
    request_body = UpdateDiscussionRequest,
    responses(
        (status = 200, description = "Discussion updated", body = Discussion),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Not allowed", body = ErrorResponse),
        (status = 404, description = "Discussion not found", body = ErrorResponse)
    ),
    tag = "discussions"
)]
pub async fn update_discussion(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    PathId(id): PathId,
    payload: Result<ValidatedJson<UpdateDiscussionRequest>, ApiError>,
) -> Result<Json<Discussion>, ApiError> {
    let discussions = DiscussionRepository::new(&state.db);

    let existing = discussions
        .find_in_team(id, user.team_id())
        .await?
        .ok_or_else(|| ApiError::not_found("Discussion"))?;

    require(
        &user,
        &Gate::roles(&[Role::Admin]).and_policy(Policy::DiscussionUpdate.check(&user, &existing)),
    )?;
    let ValidatedJson(req) = payload?;

    let changes = DiscussionChanges {
        title: req.title.map(|t| t.trim().to_string()),
        body: req.body,
    };
    let updated = discussions
        .update(existing.id, changes)
        .await?
        .ok_or_else(|| ApiError::not_found("Discussion"))?;

    info!("User {} updated discussion {}", user.id(), updated.id);

    let author = UserRepository::new(&state.db)
        .find_by_id(updated.author_id)
        .await?
        .map(User::from);

    Ok(Json(Discussion::from_model(updated, author)))
}

/// Delete a discussion and its comments (ADMIN, `discussion:delete`)
#[utoipa::path(
    delete,
    path = "/api/discussions/{id}",
    params(
        ("id" = uuid::Uuid, Path, description = "Discussion ID")
    ),
    responses(
        (status = 200, description = "Discussion deleted", body = SuccessResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Not allowed", body = ErrorResponse),
        (status = 404, description = "Discussion not found", body = ErrorResponse)
    ),
    tag = "discussions"
)]
pub async fn delete_discussion(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    PathId(id): PathId,
) -> Result<Json<SuccessResponse>, ApiError> {
    let discussions = DiscussionRepository::new(&state.db);

    let existing = discussions
        .find_in_team(id, user.team_id())
        .await?
        .ok_or_else(|| ApiError::not_found("Discussion"))?;

    require(
        &user,
        &Gate::roles(&[Role::Admin]).and_policy(Policy::DiscussionDelete.check(&user, &existing)),
    )?;

    if !discussions.delete(existing.id).await? {
        return Err(ApiError::not_found("Discussion"));
    }

    info!("User {} deleted discussion {}", user.id(), existing.id);

    Ok(Json(SuccessResponse::ok()))
}
