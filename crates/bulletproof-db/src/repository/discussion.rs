use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use super::Page;
use crate::entities::discussion::{self, Column, Entity as Discussion};

#[derive(Debug, Clone)]
pub struct NewDiscussion {
    pub title: String,
    pub body: String,
    pub author_id: Uuid,
    pub team_id: Uuid,
}

#[derive(Debug, Clone, Default)]
pub struct DiscussionChanges {
    pub title: Option<String>,
    pub body: Option<String>,
}

pub struct DiscussionRepository<'a, C> {
    db: &'a C,
}

impl<'a, C: ConnectionTrait> DiscussionRepository<'a, C> {
    pub fn new(db: &'a C) -> Self {
        Self { db }
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<discussion::Model>, DbErr> {
        Discussion::find_by_id(id).one(self.db).await
    }

    /// Lookup scoped to a team; a discussion of another team is `None`.
    pub async fn find_in_team(
        &self,
        id: Uuid,
        team_id: Uuid,
    ) -> Result<Option<discussion::Model>, DbErr> {
        Discussion::find_by_id(id)
            .filter(Column::TeamId.eq(team_id))
            .one(self.db)
            .await
    }

    /// One page of a team's discussions, newest first, plus the total count
    pub async fn find_by_team(
        &self,
        team_id: Uuid,
        page: Page,
    ) -> Result<(Vec<discussion::Model>, u64), DbErr> {
        let paginator = Discussion::find()
            .filter(Column::TeamId.eq(team_id))
            .order_by_desc(Column::CreatedAt)
            .order_by_desc(Column::Id)
            .paginate(self.db, page.per_page);

        let total = paginator.num_items().await?;
        let rows = paginator.fetch_page(page.index()).await?;

        Ok((rows, total))
    }

    pub async fn create(&self, new: NewDiscussion) -> Result<discussion::Model, DbErr> {
        let now = Utc::now();
        discussion::ActiveModel {
            id: Set(Uuid::new_v4()),
            title: Set(new.title),
            body: Set(new.body),
            author_id: Set(new.author_id),
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
        changes: DiscussionChanges,
    ) -> Result<Option<discussion::Model>, DbErr> {
        let Some(existing) = self.find_by_id(id).await? else {
            return Ok(None);
        };

        let mut active: discussion::ActiveModel = existing.into();
        if let Some(title) = changes.title {
            active.title = Set(title);
        }
        if let Some(body) = changes.body {
            active.body = Set(body);
        }
        active.updated_at = Set(Utc::now());

        active.update(self.db).await.map(Some)
    }

    /// Comments go with it (ON DELETE CASCADE)
    pub async fn delete(&self, id: Uuid) -> Result<bool, DbErr> {
        let result = Discussion::delete_by_id(id).exec(self.db).await?;
        Ok(result.rows_affected > 0)
    }
}
