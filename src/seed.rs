//! Demo data for local development

use anyhow::{bail, Context, Result};
use bulletproof_api::handlers::auth::normalize_email;
use bulletproof_auth::hash_password;
use bulletproof_db::{
    entities::user::UserRole, DiscussionRepository, NewDiscussion, NewTeam, NewUser,
    TeamRepository, UserRepository,
};
use sea_orm::{DatabaseConnection, TransactionTrait};
use tracing::info;

#[derive(Debug, Clone)]
pub struct SeedOptions {
    pub team_name: String,
    pub admin_email: String,
    pub user_email: String,
    pub password: String,
}

/// Create a team with one ADMIN, one USER and a welcome discussion.
///
/// Refuses to run twice against the same team name.
pub async fn seed(db: &DatabaseConnection, options: SeedOptions) -> Result<()> {
    if TeamRepository::new(db)
        .find_by_name(&options.team_name)
        .await?
        .is_some()
    {
        bail!("Team '{}' already exists; nothing to seed", options.team_name);
    }

    let admin_email = normalize_email(&options.admin_email);
    let user_email = normalize_email(&options.user_email);
    let password_hash = hash_password(&options.password).context("Failed to hash password")?;

    let txn = db.begin().await?;

    let team = TeamRepository::new(&txn)
        .create(NewTeam {
            name: options.team_name.clone(),
            description: Some("Seeded for local development".to_string()),
        })
        .await?;

    let users = UserRepository::new(&txn);
    let admin = users
        .create(NewUser {
            email: admin_email.clone(),
            first_name: "Admin".to_string(),
            last_name: "Demo".to_string(),
            bio: None,
            password_hash: password_hash.clone(),
            role: UserRole::Admin,
            team_id: team.id,
        })
        .await
        .with_context(|| format!("Failed to create {}", admin_email))?;

    users
        .create(NewUser {
            email: user_email.clone(),
            first_name: "User".to_string(),
            last_name: "Demo".to_string(),
            bio: None,
            password_hash,
            role: UserRole::User,
            team_id: team.id,
        })
        .await
        .with_context(|| format!("Failed to create {}", user_email))?;

    DiscussionRepository::new(&txn)
        .create(NewDiscussion {
            title: "Welcome".to_string(),
            body: "Say hello to the team here.".to_string(),
            author_id: admin.id,
            team_id: team.id,
        })
        .await?;

    txn.commit().await?;

    info!(
        "Seeded team '{}' with {} (ADMIN) and {} (USER)",
        team.name, admin_email, user_email
    );
    Ok(())
}
