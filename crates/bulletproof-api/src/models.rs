use bulletproof_auth::Role;
use bulletproof_db::entities::{comment, discussion, team, user};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// Error body returned by every failing endpoint
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    /// HTTP status code
    pub status_code: u16,
    /// Human-readable message
    pub status_message: String,
    /// Field-level issues for validation failures
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub data: Option<serde_json::Value>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Returned by every delete endpoint and by logout
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SuccessResponse {
    pub success: bool,
}

impl SuccessResponse {
    pub fn ok() -> Self {
        Self { success: true }
    }
}

// ============================================================
// Auth
// ============================================================

/// Registration request. Give `teamId` to join a team, or `teamName` to
/// create one and become its admin.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_team_choice"))]
pub struct RegisterRequest {
    #[validate(email(message = "Invalid email"))]
    pub email: String,
    #[validate(
        length(min = 1, max = 100, message = "Required"),
        custom(function = "not_blank")
    )]
    pub first_name: String,
    #[validate(
        length(min = 1, max = 100, message = "Required"),
        custom(function = "not_blank")
    )]
    pub last_name: String,
    #[validate(length(min = 5, message = "Password must be at least 5 characters"))]
    pub password: String,
    /// Existing team to join
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team_id: Option<Uuid>,
    /// New team to create. Ignored when `teamId` is given; checked by
    /// [`RegisterRequest::new_team_name`] otherwise.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team_name: Option<String>,
}

fn validate_team_choice(req: &RegisterRequest) -> Result<(), ValidationError> {
    if req.team_id.is_none() && req.team_name.is_none() {
        let mut err = ValidationError::new("team_required");
        err.message = Some("Either teamId or teamName is required".into());
        return Err(err);
    }
    Ok(())
}

impl RegisterRequest {
    /// Trimmed name of the team to create, `None` when joining by `teamId`.
    /// The error is the message for the `teamName` field.
    pub fn new_team_name(&self) -> Result<Option<String>, &'static str> {
        if self.team_id.is_some() {
            return Ok(None);
        }
        match self.team_name.as_deref().map(str::trim) {
            None => Ok(None),
            Some(name) if name.is_empty() || name.chars().count() > TEAM_NAME_MAX => {
                Err("Team name must be 1-100 characters")
            }
            Some(name) => Ok(Some(name.to_string())),
        }
    }
}

const TEAM_NAME_MAX: usize = 100;

/// Rejects strings that are empty once trimmed
fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("Required".into());
        return Err(err);
    }
    Ok(())
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email"))]
    pub email: String,
    #[validate(length(min = 1, message = "Required"))]
    pub password: String,
}

/// Body of register, login and profile update. The session itself travels
/// in the `Set-Cookie` header.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthResponse {
    pub user: User,
}

// ============================================================
// Users
// ============================================================

/// User as exposed by the API (never includes the password hash)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    pub role: Role,
    pub team_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<user::Model> for User {
    fn from(model: user::Model) -> Self {
        Self {
            id: model.id,
            email: model.email,
            first_name: model.first_name,
            last_name: model.last_name,
            bio: model.bio,
            role: model.role.into(),
            team_id: model.team_id,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserList {
    pub data: Vec<User>,
}

/// Profile update. An empty `bio` clears it.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(email(message = "Invalid email"))]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(
        length(min = 1, max = 100, message = "Required"),
        custom(function = "not_blank")
    )]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(
        length(min = 1, max = 100, message = "Required"),
        custom(function = "not_blank")
    )]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 1000, message = "Bio must be at most 1000 characters"))]
    pub bio: Option<String>,
}

// ============================================================
// Teams
// ============================================================

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    pub id: Uuid,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<team::Model> for Team {
    fn from(model: team::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            description: model.description,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TeamList {
    pub data: Vec<Team>,
}

// ============================================================
// Pagination
// ============================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct PaginationQuery {
    /// 1-based page number (default 1)
    pub page: Option<u64>,
    /// Page size (default 10, max 100)
    pub per_page: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    pub page: u64,
    pub total: u64,
    pub total_pages: u64,
}

// ============================================================
// Discussions
// ============================================================

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Discussion {
    pub id: Uuid,
    pub title: String,
    pub body: String,
    pub team_id: Uuid,
    pub author_id: Uuid,
    /// Missing when the author could not be loaded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<User>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Discussion {
    pub fn from_model(model: discussion::Model, author: Option<User>) -> Self {
        Self {
            id: model.id,
            title: model.title,
            body: model.body,
            team_id: model.team_id,
            author_id: model.author_id,
            author,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DiscussionList {
    pub data: Vec<Discussion>,
    pub meta: PageMeta,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate)]
pub struct CreateDiscussionRequest {
    #[validate(
        length(min = 1, max = 255, message = "Required"),
        custom(function = "not_blank")
    )]
    pub title: String,
    #[validate(length(min = 1, message = "Required"), custom(function = "not_blank"))]
    pub body: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, Validate)]
pub struct UpdateDiscussionRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(
        length(min = 1, max = 255, message = "Required"),
        custom(function = "not_blank")
    )]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, message = "Required"), custom(function = "not_blank"))]
    pub body: Option<String>,
}

// ============================================================
// Comments
// ============================================================

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: Uuid,
    pub body: String,
    pub discussion_id: Uuid,
    pub author_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<User>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Comment {
    pub fn from_model(model: comment::Model, author: Option<User>) -> Self {
        Self {
            id: model.id,
            body: model.body,
            discussion_id: model.discussion_id,
            author_id: model.author_id,
            author,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CommentList {
    pub data: Vec<Comment>,
    pub meta: PageMeta,
}

#[derive(Debug, Clone, Serialize, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct CommentQuery {
    /// Discussion whose comments to list
    pub discussion_id: Uuid,
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentRequest {
    pub discussion_id: Uuid,
    #[validate(length(min = 1, message = "Required"), custom(function = "not_blank"))]
    pub body: String,
}
