use crate::{
    error::{AppError, AppResult},
    models::{topic, user, Category, LikeStatus, Topic, TopicModel},
    response::Page,
    services::like::{like_count, viewer_status},
};
use sea_orm::{
    prelude::DateTime, ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait,
    FromQueryResult, JoinType, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, QueryTrait,
    RelationTrait, Select,
};
use serde::Deserialize;
use utoipa::ToSchema;

/// Number of entries returned by the hot-topics listing.
pub const HOT_TOPICS_LIMIT: u64 = 10;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TopicOrder {
    Asc,
    #[default]
    Desc,
    /// Most liked first.
    Hot,
}

/// Editable topic fields.
#[derive(Debug, Clone)]
pub struct TopicInput {
    pub title: String,
    pub description: String,
    pub category: Category,
}

/// A topic joined with its author and like aggregates.
#[derive(Debug, Clone, FromQueryResult)]
pub struct TopicRow {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub category: Category,
    pub posted_by_id: i32,
    pub created_at: DateTime,
    pub updated_at: DateTime,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub avatar_url: Option<String>,
    pub likes: i64,
    pub dislikes: i64,
    pub user_like_status: Option<LikeStatus>,
}

pub struct TopicService {
    db: DatabaseConnection,
}

impl TopicService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn select_with_likes(viewer: Option<i32>) -> Select<Topic> {
        Topic::find()
            .select_only()
            .columns([
                topic::Column::Id,
                topic::Column::Title,
                topic::Column::Description,
                topic::Column::Category,
                topic::Column::PostedById,
                topic::Column::CreatedAt,
                topic::Column::UpdatedAt,
            ])
            .column(user::Column::FirstName)
            .column(user::Column::LastName)
            .column(user::Column::AvatarUrl)
            .column_as(like_count(LikeStatus::Like), "likes")
            .column_as(like_count(LikeStatus::Dislike), "dislikes")
            .column_as(viewer_status(viewer), "user_like_status")
            .join(JoinType::LeftJoin, topic::Relation::Like.def())
            .join(JoinType::LeftJoin, topic::Relation::PostedBy.def())
            .group_by(topic::Column::Id)
            .group_by(user::Column::FirstName)
            .group_by(user::Column::LastName)
            .group_by(user::Column::AvatarUrl)
    }

    fn apply_order(select: Select<Topic>, order: TopicOrder) -> Select<Topic> {
        match order {
            TopicOrder::Asc => select
                .order_by_asc(topic::Column::CreatedAt)
                .order_by_asc(topic::Column::Id),
            TopicOrder::Desc => select
                .order_by_desc(topic::Column::CreatedAt)
                .order_by_desc(topic::Column::Id),
            TopicOrder::Hot => select
                .order_by_desc(like_count(LikeStatus::Like))
                .order_by_desc(topic::Column::CreatedAt)
                .order_by_desc(topic::Column::Id),
        }
    }

    /// One page of topics with like aggregates, optionally restricted to one owner.
    pub async fn list(
        &self,
        page: Page,
        order: TopicOrder,
        viewer: Option<i32>,
        owner: Option<i32>,
    ) -> AppResult<(Vec<TopicRow>, u64)> {
        let select = Self::select_with_likes(viewer)
            .apply_if(owner, |q, owner| q.filter(topic::Column::PostedById.eq(owner)));

        let topics = Self::apply_order(select, order)
            .limit(page.page_size)
            .offset(page.offset())
            .into_model::<TopicRow>()
            .all(&self.db)
            .await?;

        let total = Topic::find()
            .apply_if(owner, |q, owner| q.filter(topic::Column::PostedById.eq(owner)))
            .count(&self.db)
            .await?;

        Ok((topics, total))
    }

    /// Most recently created topics.
    pub async fn hot(&self) -> AppResult<Vec<TopicRow>> {
        let topics = Self::apply_order(Self::select_with_likes(None), TopicOrder::Desc)
            .limit(HOT_TOPICS_LIMIT)
            .into_model::<TopicRow>()
            .all(&self.db)
            .await?;
        Ok(topics)
    }

    pub async fn get_with_likes(&self, id: i32, viewer: Option<i32>) -> AppResult<TopicRow> {
        Self::select_with_likes(viewer)
            .filter(topic::Column::Id.eq(id))
            .into_model::<TopicRow>()
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<TopicModel> {
        Topic::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)
    }

    pub async fn create(&self, owner_id: i32, input: TopicInput) -> AppResult<TopicModel> {
        let now = chrono::Utc::now().naive_utc();

        let new_topic = topic::ActiveModel {
            title: sea_orm::ActiveValue::Set(input.title),
            description: sea_orm::ActiveValue::Set(input.description),
            category: sea_orm::ActiveValue::Set(input.category),
            posted_by_id: sea_orm::ActiveValue::Set(owner_id),
            created_at: sea_orm::ActiveValue::Set(now),
            updated_at: sea_orm::ActiveValue::Set(now),
            ..Default::default()
        };

        let topic = new_topic.insert(&self.db).await?;
        tracing::info!(topic_id = topic.id, owner_id, "topic created");
        Ok(topic)
    }

    /// Update an existing topic; only its owner may do so.
    pub async fn update(&self, id: i32, owner_id: i32, input: TopicInput) -> AppResult<TopicModel> {
        let existing = self.get_by_id(id).await?;
        if existing.posted_by_id != owner_id {
            return Err(AppError::Forbidden("You are not allowed to update this topic"));
        }

        let now = chrono::Utc::now().naive_utc();

        let mut active: topic::ActiveModel = existing.into();
        active.title = sea_orm::ActiveValue::Set(input.title);
        active.description = sea_orm::ActiveValue::Set(input.description);
        active.category = sea_orm::ActiveValue::Set(input.category);
        active.updated_at = sea_orm::ActiveValue::Set(now);

        let updated = active.update(&self.db).await?;
        Ok(updated)
    }

    pub async fn delete(&self, id: i32, user_id: i32) -> AppResult<()> {
        let owner = Topic::find_by_id(id)
            .one(&self.db)
            .await?
            .map(|t| t.posted_by_id);

        if owner != Some(user_id) {
            return Err(AppError::Forbidden("You are not allowed to delete this topic"));
        }

        Topic::delete_by_id(id).exec(&self.db).await?;
        tracing::info!(topic_id = id, user_id, "topic deleted");
        Ok(())
    }
}
