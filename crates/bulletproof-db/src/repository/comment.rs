use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set,
};
use uuid::Uuid;

use super::Page;
use crate::entities::comment::{self, Column, Entity as Comment, Relation};
use crate::entities::discussion;

#[derive(Debug, Clone)]
pub struct NewComment {
    pub body: String,
    pub discussion_id: Uuid,
    pub author_id: Uuid,
}

pub struct CommentRepository<'a, C> {
    db: &'a C,
}

impl<'a, C: ConnectionTrait> CommentRepository<'a, C> {
    pub fn new(db: &'a C) -> Self {
        Self { db }
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<comment::Model>, DbErr> {
        Comment::find_by_id(id).one(self.db).await
    }

    /// Lookup scoped to the team owning the comment's discussion
    pub async fn find_in_team(
        &self,
        id: Uuid,
        team_id: Uuid,
    ) -> Result<Option<comment::Model>, DbErr> {
        Comment::find_by_id(id)
            .join(sea_orm::JoinType::InnerJoin, Relation::Discussion.def())
            .filter(discussion::Column::TeamId.eq(team_id))
            .one(self.db)
            .await
    }

    /// One page of a discussion's comments, oldest first, plus the total count
    pub async fn find_by_discussion(
        &self,
        discussion_id: Uuid,
        page: Page,
    ) -> Result<(Vec<comment::Model>, u64), DbErr> {
        let paginator = Comment::find()
            .filter(Column::DiscussionId.eq(discussion_id))
            .order_by_asc(Column::CreatedAt)
            .order_by_asc(Column::Id)
            .paginate(self.db, page.per_page);

        let total = paginator.num_items().await?;
        let rows = paginator.fetch_page(page.index()).await?;

        Ok((rows, total))
    }

    pub async fn create(&self, new: NewComment) -> Result<comment::Model, DbErr> {
        let now = Utc::now();
        comment::ActiveModel {
            id: Set(Uuid::new_v4()),
            body: Set(new.body),
            discussion_id: Set(new.discussion_id),
            author_id: Set(new.author_id),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(self.db)
        .await
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool, DbErr> {
        let result = Comment::delete_by_id(id).exec(self.db).await?;
        Ok(result.rows_affected > 0)
    }
}
