//! Registration, login and logout

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderName, HeaderValue, StatusCode},
    Json,
};
use bulletproof_auth::{hash_password, verify_credentials, SessionUser};
use bulletproof_db::{
    entities::user::{self, UserRole},
    NewTeam, NewUser, TeamRepository, UserRepository,
};
use sea_orm::TransactionTrait;
use tracing::{debug, info, warn};

use crate::error::{ApiError, SCHEMA_FIELD};
use crate::handlers::unique_field_error;
use crate::middleware::{
    clear_session_cookie, session_cookie, session_user, CurrentUser, ValidatedJson,
};
use crate::models::{AuthResponse, ErrorResponse, LoginRequest, RegisterRequest, SuccessResponse};
use crate::AppState;

pub(crate) const EMAIL_IN_USE: &str = "The email is already in use";
const TEAM_NAME_TAKEN: &str = "The team name is already taken";
const INVALID_CREDENTIALS: &str = "Invalid username or password";

pub(crate) type SessionHeader = [(HeaderName, HeaderValue); 1];

/// Issue a session for `user` and build its `Set-Cookie` header
pub(crate) fn start_session(state: &AppState, user: &user::Model) -> Result<SessionHeader, ApiError> {
    let issued = state.sessions.issue(&session_user(user))?;
    let cookie = session_cookie(
        &issued.token,
        state.sessions.ttl().num_seconds(),
        state.secure_cookies,
    )?;
    Ok([(header::SET_COOKIE, cookie)])
}

/// Emails are stored and compared trimmed and lowercased
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Register a new user
///
/// With `teamId` the user joins that team as USER. With `teamName` a new team
/// is created and the user becomes its ADMIN. `teamId` wins if both are given.
#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered, session cookie set", body = AuthResponse),
        (status = 400, description = "Invalid input, email in use or unknown team", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn register(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<RegisterRequest>,
) -> Result<(StatusCode, SessionHeader, Json<AuthResponse>), ApiError> {
    let email = normalize_email(&req.email);
    debug!("Registration attempt for {}", email);

    let new_team_name = req
        .new_team_name()
        .map_err(|message| ApiError::field("teamName", message))?;

    if UserRepository::new(&state.db)
        .find_by_email(&email)
        .await?
        .is_some()
    {
        return Err(ApiError::field("email", EMAIL_IN_USE));
    }

    let password_hash = hash_password(&req.password)?;

    // Team and user are created together or not at all
    let txn = state.db.begin().await?;
    let teams = TeamRepository::new(&txn);

    let (team_id, role) = match (req.team_id, new_team_name) {
        (Some(team_id), _) => {
            let team = teams
                .find_by_id(team_id)
                .await?
                .ok_or_else(|| ApiError::field("teamId", "Team not found"))?;
            (team.id, UserRole::User)
        }
        (None, Some(name)) => {
            if teams.find_by_name(&name).await?.is_some() {
                return Err(ApiError::field("teamName", TEAM_NAME_TAKEN));
            }
            let team = teams
                .create(NewTeam {
                    name,
                    description: None,
                })
                .await
                .map_err(|e| unique_field_error(e, "teamName", TEAM_NAME_TAKEN))?;
            info!("Created team {} ({})", team.name, team.id);
            (team.id, UserRole::Admin)
        }
        (None, None) => {
            return Err(ApiError::field(
                SCHEMA_FIELD,
                "Either teamId or teamName is required",
            ));
        }
    };

    let user = UserRepository::new(&txn)
        .create(NewUser {
            email,
            first_name: req.first_name.trim().to_string(),
            last_name: req.last_name.trim().to_string(),
            bio: None,
            password_hash,
            role,
            team_id,
        })
        .await
        .map_err(|e| unique_field_error(e, "email", EMAIL_IN_USE))?;

    txn.commit().await?;

    info!(
        "Registered user {} ({}) as {:?} in team {}",
        user.email, user.id, user.role, user.team_id
    );

    let cookie = start_session(&state, &user)?;
    Ok((
        StatusCode::CREATED,
        cookie,
        Json(AuthResponse { user: user.into() }),
    ))
}

/// Log in with email and password
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in, session cookie set", body = AuthResponse),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 401, description = "Invalid username or password", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn login(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> Result<(SessionHeader, Json<AuthResponse>), ApiError> {
    let email = normalize_email(&req.email);

    let user = UserRepository::new(&state.db).find_by_email(&email).await?;

    // Unknown emails still pay for a hash so timing does not leak accounts
    let stored_hash = user.as_ref().map(|u| u.password_hash.as_str());
    let valid = verify_credentials(&req.password, stored_hash)?;

    let user = match user {
        Some(user) if valid => user,
        _ => {
            warn!("Failed login for {}", email);
            return Err(ApiError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        }
    };

    info!("User {} logged in", user.id);

    let cookie = start_session(&state, &user)?;
    Ok((cookie, Json(AuthResponse { user: user.into() })))
}

/// Clear the session cookie
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    responses(
        (status = 200, description = "Session cookie cleared", body = SuccessResponse)
    ),
    tag = "auth"
)]
pub async fn logout(State(state): State<Arc<AppState>>) -> (SessionHeader, Json<SuccessResponse>) {
    (
        [(header::SET_COOKIE, clear_session_cookie(state.secure_cookies))],
        Json(SuccessResponse::ok()),
    )
}

/// The session payload of the current user
#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses(
        (status = 200, description = "Current session user", body = SessionUser),
        (status = 401, description = "Not authenticated", body = ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn me(user: CurrentUser) -> Json<SessionUser> {
    Json(user.session_user())
}
