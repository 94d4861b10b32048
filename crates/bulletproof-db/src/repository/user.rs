use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder,
    Set,
};
use uuid::Uuid;

use crate::entities::user::{self, Column, Entity as User, UserRole};

#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub bio: Option<String>,
    pub password_hash: String,
    pub role: UserRole,
    pub team_id: Uuid,
}

/// Profile fields a user may change about themselves
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    /// `Some(None)` clears the bio
    pub bio: Option<Option<String>>,
}

impl UserChanges {
    pub fn is_empty(&self) -> bool {
        self.email.is_none()
            && self.first_name.is_none()
            && self.last_name.is_none()
            && self.bio.is_none()
    }
}

pub struct UserRepository<'a, C> {
    db: &'a C,
}

impl<'a, C: ConnectionTrait> UserRepository<'a, C> {
    pub fn new(db: &'a C) -> Self {
        Self { db }
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<user::Model>, DbErr> {
        User::find_by_id(id).one(self.db).await
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<user::Model>, DbErr> {
        User::find().filter(Column::Email.eq(email)).one(self.db).await
    }

    /// Members of a team, oldest account first
    pub async fn find_by_team(&self, team_id: Uuid) -> Result<Vec<user::Model>, DbErr> {
        User::find()
            .filter(Column::TeamId.eq(team_id))
            .order_by_asc(Column::CreatedAt)
            .order_by_asc(Column::Id)
            .all(self.db)
            .await
    }

    /// Batch lookup used to embed authors into list responses
    pub async fn find_many(&self, ids: &[Uuid]) -> Result<Vec<user::Model>, DbErr> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        User::find()
            .filter(Column::Id.is_in(ids.iter().copied()))
            .all(self.db)
            .await
    }

    pub async fn create(&self, new: NewUser) -> Result<user::Model, DbErr> {
        let now = Utc::now();
        user::ActiveModel {
            id: Set(Uuid::new_v4()),
            email: Set(new.email),
            first_name: Set(new.first_name),
            last_name: Set(new.last_name),
            bio: Set(new.bio),
            password_hash: Set(new.password_hash),
            role: Set(new.role),
            team_id: Set(new.team_id),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(self.db)
        .await
    }

    pub async fn update(
        &self,
        id: Uuid,
        changes: UserChanges,
    ) -> Result<Option<user::Model>, DbErr> {
        let Some(existing) = self.find_by_id(id).await? else {
            return Ok(None);
        };

        let mut active: user::ActiveModel = existing.into();
        if let Some(email) = changes.email {
            active.email = Set(email);
        }
        if let Some(first_name) = changes.first_name {
            active.first_name = Set(first_name);
        }
        if let Some(last_name) = changes.last_name {
            active.last_name = Set(last_name);
        }
        if let Some(bio) = changes.bio {
            active.bio = Set(bio);
        }
        active.updated_at = Set(Utc::now());

        active.update(self.db).await.map(Some)
    }

    /// Returns whether a row was removed
    pub async fn delete(&self, id: Uuid) -> Result<bool, DbErr> {
        let result = User::delete_by_id(id).exec(self.db).await?;
        Ok(result.rows_affected > 0)
    }
}
