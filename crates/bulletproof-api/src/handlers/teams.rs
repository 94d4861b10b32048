use std::sync::Arc;

use axum::{extract::State, Json};
use bulletproof_db::TeamRepository;
use tracing::debug;

use crate::error::ApiError;
use crate::models::{ErrorResponse, TeamList};
use crate::AppState;

/// List all teams
///
/// Public: the registration form offers them for joining.
#[utoipa::path(
    get,
    path = "/api/teams",
    responses(
        (status = 200, description = "All teams", body = TeamList),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "teams"
)]
pub async fn list_teams(State(state): State<Arc<AppState>>) -> Result<Json<TeamList>, ApiError> {
    let teams = TeamRepository::new(&state.db).find_all().await?;
    debug!("Listing {} teams", teams.len());

    Ok(Json(TeamList {
        data: teams.into_iter().map(Into::into).collect(),
    }))
}
