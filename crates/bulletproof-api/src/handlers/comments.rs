use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use bulletproof_auth::{Gate, Policy, Subject};
use bulletproof_db::{CommentRepository, DiscussionRepository, NewComment, Page};
use tracing::{debug, info};

use super::{load_authors, page_meta, require};
use crate::error::ApiError;
use crate::middleware::{ApiQuery, CurrentUser, PathId, ValidatedJson};
use crate::models::{
    Comment, CommentList, CommentQuery, CreateCommentRequest, ErrorResponse, SuccessResponse,
    User,
};
use crate::AppState;

/// List the comments of a discussion, oldest first
#[utoipa::path(
    get,
    path = "/api/comments",
    params(CommentQuery),
    responses(
        (status = 200, description = "One page of comments", body = CommentList),
        (status = 400, description = "Missing or invalid discussionId", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 404, description = "Discussion not found", body = ErrorResponse)
    ),
    tag = "comments"
)]
pub async fn list_comments(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    ApiQuery(query): ApiQuery<CommentQuery>,
) -> Result<Json<CommentList>, ApiError> {
    let discussion = DiscussionRepository::new(&state.db)
        .find_in_team(query.discussion_id, user.team_id())
        .await?
        .ok_or_else(|| ApiError::not_found("Discussion"))?;

    let page = Page::new(query.page, query.per_page);
    let (rows, total) = CommentRepository::new(&state.db)
        .find_by_discussion(discussion.id, page)
        .await?;
    debug!(
        "Listing page {} of comments for discussion {} ({} total)",
        page.page, discussion.id, total
    );

    let authors = load_authors(&state.db, rows.iter().map(|c| c.author_id)).await?;
    let data = rows
        .into_iter()
        .map(|c| {
            let author = authors.get(&c.author_id).cloned();
            Comment::from_model(c, author)
        })
        .collect();

    Ok(Json(CommentList {
        data,
        meta: page_meta(page, total),
    }))
}

/// Comment on a discussion of the caller's team
#[utoipa::path(
    post,
    path = "/api/comments",
    request_body = CreateCommentRequest,
    responses(
        (status = 201, description = "Comment created", body = Comment),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 404, description = "Discussion not found", body = ErrorResponse)
    ),
    tag = "comments"
)]
pub async fn create_comment(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    ValidatedJson(req): ValidatedJson<CreateCommentRequest>,
) -> Result<(StatusCode, Json<Comment>), ApiError> {
    let discussion = DiscussionRepository::new(&state.db)
        .find_in_team(req.discussion_id, user.team_id())
        .await?
        .ok_or_else(|| ApiError::not_found("Discussion"))?;

    let comment = CommentRepository::new(&state.db)
        .create(NewComment {
            body: req.body,
            discussion_id: discussion.id,
            author_id: user.id(),
        })
        .await?;

    info!(
        "User {} commented on discussion {} ({})",
        user.id(),
        discussion.id,
        comment.id
    );

    let author = User::from(user.0);
    Ok((
        StatusCode::CREATED,
        Json(Comment::from_model(comment, Some(author))),
    ))
}

/// Delete a comment (`comment:delete`: its author or an ADMIN)
#[utoipa::path(
    delete,
    path = "/api/comments/{id}",
    params(
        ("id" = uuid::Uuid, Path, description = "Comment ID")
    ),
    responses(
        (status = 200, description = "Comment deleted", body = SuccessResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Not allowed", body = ErrorResponse),
        (status = 404, description = "Comment not found", body = ErrorResponse)
    ),
    tag = "comments"
)]
pub async fn delete_comment(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    PathId(id): PathId,
) -> Result<Json<SuccessResponse>, ApiError> {
    let comments = CommentRepository::new(&state.db);

    let comment = comments
        .find_in_team(id, user.team_id())
        .await?
        .ok_or_else(|| ApiError::not_found("Comment"))?;

    require(&user, &Gate::policy(Policy::CommentDelete.check(&user, &comment)))?;

    if !comments.delete(comment.id).await? {
        return Err(ApiError::not_found("Comment"));
    }

    info!("User {} deleted comment {}", user.id(), comment.id);

    Ok(Json(SuccessResponse::ok()))
}
