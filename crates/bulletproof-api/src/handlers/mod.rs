//! API route handlers
//!
//! Protected handlers run their checks in a fixed order: role gate (403),
//! body validation (400), team-scoped lookup (404), policy (403), then the
//! database operation. When a route addresses an existing resource the
//! lookup comes first, so another team's resources are always 404.

pub mod auth;
pub mod comments;
pub mod discussions;
pub mod profile;
pub mod system;
pub mod teams;
pub mod users;

use std::collections::HashMap;

use bulletproof_auth::{authorize, Gate, Subject};
use bulletproof_db::{Page, UserRepository};
use sea_orm::{ConnectionTrait, DbErr, SqlErr};
use uuid::Uuid;

use crate::error::ApiError;
use crate::models::{PageMeta, User};

/// 403 unless the gate lets the user through
pub(crate) fn require<S: Subject + ?Sized>(user: &S, gate: &Gate) -> Result<(), ApiError> {
    if authorize(user.role(), gate) {
        Ok(())
    } else {
        Err(ApiError::forbidden())
    }
}

/// Load the authors of a page of resources in one query
pub(crate) async fn load_authors<C: ConnectionTrait>(
    db: &C,
    ids: impl IntoIterator<Item = Uuid>,
) -> Result<HashMap<Uuid, User>, DbErr> {
    let mut ids: Vec<Uuid> = ids.into_iter().collect();
    ids.sort_unstable();
    ids.dedup();

    let users = UserRepository::new(db).find_many(&ids).await?;
    Ok(users.into_iter().map(|u| (u.id, User::from(u))).collect())
}

/// A concurrent insert beat our existence check
fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

/// 400 on `field` for a unique violation, otherwise an internal error
pub(crate) fn unique_field_error(
    err: DbErr,
    field: &'static str,
    message: &'static str,
) -> ApiError {
    if is_unique_violation(&err) {
        ApiError::field(field, message)
    } else {
        err.into()
    }
}

pub(crate) fn page_meta(page: Page, total: u64) -> PageMeta {
    PageMeta {
        page: page.page,
        total,
        total_pages: page.total_pages(total),
    }
}
