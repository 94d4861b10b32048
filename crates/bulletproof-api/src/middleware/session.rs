//! Session authentication middleware
//!
//! Reads the session token from the `bulletproof_session` cookie (browsers)
//! or an `Authorization: Bearer` header (API clients), verifies it, reloads
//! the user so role and team are current, and makes it available to
//! handlers as [`CurrentUser`].

use std::sync::Arc;

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};
use bulletproof_auth::{Role, SessionUser, Subject};
use bulletproof_db::{entities::user, UserRepository};
use tracing::debug;
use uuid::Uuid;

use crate::error::ApiError;
use crate::AppState;

/// Name of the session cookie
pub const SESSION_COOKIE: &str = "bulletproof_session";

/// The authenticated user, freshly loaded for this request
#[derive(Debug, Clone)]
pub struct CurrentUser(pub user::Model);

impl CurrentUser {
    pub fn team_id(&self) -> Uuid {
        self.0.team_id
    }

    /// The payload stored in the session token
    pub fn session_user(&self) -> SessionUser {
        session_user(&self.0)
    }
}

impl Subject for CurrentUser {
    fn id(&self) -> Uuid {
        self.0.id
    }

    fn role(&self) -> Role {
        self.0.role.into()
    }
}

impl<S: Send + Sync> FromRequestParts<S> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or_else(ApiError::unauthorized)
    }
}

/// Build the session payload for a user row
pub fn session_user(model: &user::Model) -> SessionUser {
    SessionUser {
        id: model.id,
        email: model.email.clone(),
        first_name: model.first_name.clone(),
        last_name: model.last_name.clone(),
        bio: model.bio.clone(),
        role: model.role.into(),
        team_id: model.team_id,
        created_at: model.created_at,
    }
}

/// Reject the request with 401 unless it carries a valid session whose user
/// still exists.
pub async fn require_session(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = session_token(request.headers()).ok_or_else(ApiError::unauthorized)?;

    let claims = state.sessions.verify(token).map_err(|e| {
        debug!("Rejected session: {}", e);
        ApiError::unauthorized()
    })?;

    let user = UserRepository::new(&state.db)
        .find_by_id(claims.user.id)
        .await?
        .ok_or_else(|| {
            debug!("Session for deleted user {}", claims.user.id);
            ApiError::unauthorized()
        })?;

    request.extensions_mut().insert(CurrentUser(user));

    Ok(next.run(request).await)
}

/// Cookie first, then bearer header
fn session_token(headers: &HeaderMap) -> Option<&str> {
    let from_cookie = headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|cookies| cookies.split(';'))
        .map(str::trim)
        .find_map(|cookie| {
            cookie
                .strip_prefix(SESSION_COOKIE)
                .and_then(|rest| rest.strip_prefix('='))
        })
        .filter(|token| !token.is_empty());

    from_cookie.or_else(|| {
        headers
            .get(header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .and_then(|h| h.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|token| !token.is_empty())
    })
}

/// `Set-Cookie` value that stores a session
pub fn session_cookie(token: &str, max_age_secs: i64, secure: bool) -> Result<HeaderValue, ApiError> {
    let mut cookie = format!(
        "{SESSION_COOKIE}={token}; HttpOnly; SameSite=Lax; Path=/; Max-Age={}",
        max_age_secs.max(0)
    );
    if secure {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie).map_err(|e| ApiError::Internal(e.into()))
}

/// `Set-Cookie` value that removes the session
pub fn clear_session_cookie(secure: bool) -> HeaderValue {
    let cookie = if secure {
        "bulletproof_session=; HttpOnly; SameSite=Lax; Path=/; Max-Age=0; Secure"
    } else {
        "bulletproof_session=; HttpOnly; SameSite=Lax; Path=/; Max-Age=0"
    };
    HeaderValue::from_static(cookie)
}
