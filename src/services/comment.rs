use crate::{
    error::{AppError, AppResult},
    models::{comment, user, Comment, CommentModel, LikeStatus, Topic},
    services::like::{like_count, viewer_status},
};
use sea_orm::{
    prelude::DateTime, ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait,
    FromQueryResult, JoinType, QueryFilter, QueryOrder, QuerySelect, RelationTrait, Select,
};

/// A comment joined with its author and like aggregates.
#[derive(Debug, Clone, FromQueryResult)]
pub struct CommentRow {
    pub id: i32,
    pub content: String,
    pub topic_id: i32,
    pub author_id: i32,
    pub created_at: DateTime,
    pub updated_at: DateTime,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub avatar_url: Option<String>,
    pub likes: i64,
    pub dislikes: i64,
    pub user_like_status: Option<LikeStatus>,
}

pub struct CommentService {
    db: DatabaseConnection,
}

impl CommentService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn select_with_likes(viewer: Option<i32>) -> Select<Comment> {
        Comment::find()
            .select_only()
            .columns([
                comment::Column::Id,
                comment::Column::Content,
                comment::Column::TopicId,
                comment::Column::AuthorId,
                comment::Column::CreatedAt,
                comment::Column::UpdatedAt,
            ])
            .column(user::Column::FirstName)
            .column(user::Column::LastName)
            .column(user::Column::AvatarUrl)
            .column_as(like_count(LikeStatus::Like), "likes")
            .column_as(like_count(LikeStatus::Dislike), "dislikes")
            .column_as(viewer_status(viewer), "user_like_status")
            .join(JoinType::LeftJoin, comment::Relation::Like.def())
            .join(JoinType::LeftJoin, comment::Relation::Author.def())
            .group_by(comment::Column::Id)
            .group_by(user::Column::FirstName)
            .group_by(user::Column::LastName)
            .group_by(user::Column::AvatarUrl)
    }

    /// All comments on a topic, most liked first.
    pub async fn list_by_topic(
        &self,
        topic_id: i32,
        viewer: Option<i32>,
    ) -> AppResult<Vec<CommentRow>> {
        Topic::find_by_id(topic_id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)?;

        let comments = Self::select_with_likes(viewer)
            .filter(comment::Column::TopicId.eq(topic_id))
            .order_by_desc(like_count(LikeStatus::Like))
            .order_by_asc(comment::Column::CreatedAt)
            .order_by_asc(comment::Column::Id)
            .into_model::<CommentRow>()
            .all(&self.db)
            .await?;
        Ok(comments)
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<CommentModel> {
        Comment::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)
    }

    pub async fn create(
        &self,
        author_id: i32,
        topic_id: i32,
        content: &str,
    ) -> AppResult<CommentModel> {
        Topic::find_by_id(topic_id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)?;

        let now = chrono::Utc::now().naive_utc();

        let new_comment = comment::ActiveModel {
            content: sea_orm::ActiveValue::Set(content.to_string()),
            topic_id: sea_orm::ActiveValue::Set(topic_id),
            author_id: sea_orm::ActiveValue::Set(author_id),
            created_at: sea_orm::ActiveValue::Set(now),
            updated_at: sea_orm::ActiveValue::Set(now),
            ..Default::default()
        };

        let comment = new_comment.insert(&self.db).await?;
        Ok(comment)
    }

    /// Rewrite a comment's content; only its author may do so.
    pub async fn update(&self, id: i32, author_id: i32, content: &str) -> AppResult<CommentModel> {
        let existing = self.get_by_id(id).await?;
        if existing.author_id != author_id {
            return Err(AppError::Forbidden("You are not allowed to update this comment"));
        }

        let now = chrono::Utc::now().naive_utc();

        let mut active: comment::ActiveModel = existing.into();
        active.content = sea_orm::ActiveValue::Set(content.to_string());
        active.updated_at = sea_orm::ActiveValue::Set(now);

        let updated = active.update(&self.db).await?;
        Ok(updated)
    }

    pub async fn delete(&self, id: i32, author_id: i32) -> AppResult<()> {
        let owner = Comment::find_by_id(id)
            .one(&self.db)
            .await?
            .map(|c| c.author_id);

        if owner != Some(author_id) {
            return Err(AppError::Forbidden(
                "You are not allowed to delete this comment",
            ));
        }

        Comment::delete_by_id(id).exec(&self.db).await?;
        Ok(())
    }
}
