use std::sync::Arc;

use axum::{extract::State, Json};
use bulletproof_db::{UserChanges, UserRepository};
use tracing::info;

use super::auth::{normalize_email, start_session, SessionHeader, EMAIL_IN_USE};
use super::unique_field_error;
use crate::error::ApiError;
use crate::middleware::{CurrentUser, ValidatedJson};
use crate::models::{AuthResponse, ErrorResponse, UpdateProfileRequest, User};
use crate::AppState;

/// The current user, fresh from the database
#[utoipa::path(
    get,
    path = "/api/profile",
    responses(
        (status = 200, description = "Current user", body = User),
        (status = 401, description = "Not authenticated", body = ErrorResponse)
    ),
    tag = "profile"
)]
pub async fn get_profile(CurrentUser(user): CurrentUser) -> Json<User> {
    Json(user.into())
}

/// Update the current user's own profile
///
/// The session cookie is re-issued so its payload matches the new profile.
#[utoipa::path(
    patch,
    path = "/api/profile",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Profile updated", body = AuthResponse),
        (status = 400, description = "Invalid input or email in use", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "profile"
)]
pub async fn update_profile(
    State(state): State<Arc<AppState>>,
    CurrentUser(current): CurrentUser,
    ValidatedJson(req): ValidatedJson<UpdateProfileRequest>,
) -> Result<(SessionHeader, Json<AuthResponse>), ApiError> {
    let users = UserRepository::new(&state.db);

    let email = req
        .email
        .as_deref()
        .map(normalize_email)
        .filter(|email| *email != current.email);

    if let Some(email) = &email {
        if users.find_by_email(email).await?.is_some() {
            return Err(ApiError::field("email", EMAIL_IN_USE));
        }
    }

    let changes = UserChanges {
        email,
        first_name: req.first_name.map(|s| s.trim().to_string()),
        last_name: req.last_name.map(|s| s.trim().to_string()),
        bio: req.bio.map(|bio| {
            let bio = bio.trim();
            (!bio.is_empty()).then(|| bio.to_string())
        }),
    };

    let user = if changes.is_empty() {
        current
    } else {
        users
            .update(current.id, changes)
            .await
            .map_err(|e| unique_field_error(e, "email", EMAIL_IN_USE))?
            .ok_or_else(|| ApiError::not_found("User"))?
    };

    info!("User {} updated their profile", user.id);

    let cookie = start_session(&state, &user)?;
    Ok((cookie, Json(AuthResponse { user: user.into() })))
}
