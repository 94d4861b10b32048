//! Persistence for teams, users, discussions and comments
//!
//! SQLite is the primary backend:
//! - file database: `"sqlite://./bulletproof.db?mode=rwc"`
//! - ephemeral (tests): `"sqlite::memory:"`

pub mod entities;
pub mod migrator;
pub mod repository;

use sea_orm::{ConnectionTrait, Database, DatabaseBackend, DatabaseConnection, DbErr};
use tracing::{debug, info};

pub use repository::{
    CommentRepository, DiscussionChanges, DiscussionRepository, NewComment, NewDiscussion,
    NewTeam, NewUser, Page, TeamChanges, TeamRepository, UserChanges, UserRepository,
};

/// Open the database and make sure foreign keys are enforced, so the
/// RESTRICT/CASCADE rules of the schema actually apply.
pub async fn connect(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    let db = Database::connect(database_url).await?;

    let backend = db.get_database_backend();
    info!("Connected to database backend: {:?}", backend);

    if backend == DatabaseBackend::Sqlite {
        db.execute_unprepared("PRAGMA foreign_keys = ON").await?;
        debug!("SQLite foreign key enforcement enabled");
    }

    Ok(db)
}

/// Run pending migrations
pub async fn migrate(db: &DatabaseConnection) -> Result<(), DbErr> {
    use sea_orm_migration::MigratorTrait;

    info!("Running database migrations...");
    migrator::Migrator::up(db, None).await?;
    info!("Database migrations completed");

    Ok(())
}
