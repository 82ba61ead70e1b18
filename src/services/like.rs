use crate::{
    error::{AppError, AppResult},
    models::{like, Comment, Like, LikeStatus, LikeType, Topic},
};
use sea_orm::{
    sea_query::{Expr, Func, OnConflict, SimpleExpr},
    ActiveEnum, ColumnTrait, DatabaseConnection, EntityTrait, FromQueryResult, QueryFilter,
    QuerySelect,
};

pub const LIKE_FAILED: &str = "An error occurred while processing your like/dislike.";

/// The record a like points at, carrying its kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LikeTarget {
    Topic(i32),
    Comment(i32),
}

impl LikeTarget {
    pub fn kind(&self) -> LikeType {
        match self {
            LikeTarget::Topic(_) => LikeType::Topic,
            LikeTarget::Comment(_) => LikeType::Comment,
        }
    }

    pub fn id(&self) -> i32 {
        match *self {
            LikeTarget::Topic(id) | LikeTarget::Comment(id) => id,
        }
    }

    fn target_column(&self) -> like::Column {
        match self {
            LikeTarget::Topic(_) => like::Column::TopicId,
            LikeTarget::Comment(_) => like::Column::CommentId,
        }
    }
}

/// Aggregate counts for one target plus the viewer's own stance.
#[derive(Debug, Clone, PartialEq, FromQueryResult)]
pub struct LikeSummary {
    pub likes: i64,
    pub dislikes: i64,
    pub user_like_status: Option<LikeStatus>,
}

/// `COUNT(CASE WHEN likes.like_status = <status> THEN 1 END)`
pub(crate) fn like_count(status: LikeStatus) -> SimpleExpr {
    Func::count(Expr::case(
        Expr::col((Like, like::Column::LikeStatus)).eq(status.to_value()),
        Expr::val(1),
    ))
    .into()
}

/// `MAX(CASE WHEN likes.user_id = <viewer> THEN likes.like_status END)`, NULL without a viewer.
pub(crate) fn viewer_status(viewer: Option<i32>) -> SimpleExpr {
    Func::max(Expr::case(
        Expr::col((Like, like::Column::UserId)).eq(viewer),
        Expr::col((Like, like::Column::LikeStatus)),
    ))
    .into()
}

pub struct LikeService {
    db: DatabaseConnection,
}

impl LikeService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Record `status` as the user's stance on `target`.
    ///
    /// A single `INSERT .. ON CONFLICT (user_id, <target>) DO UPDATE` keeps at
    /// most one row per (user, target) even under concurrent requests.
    pub async fn set_like(
        &self,
        user_id: i32,
        target: LikeTarget,
        status: LikeStatus,
    ) -> AppResult<()> {
        self.ensure_target_exists(target).await?;

        let now = chrono::Utc::now().naive_utc();
        let (topic_id, comment_id) = match target {
            LikeTarget::Topic(id) => (Some(id), None),
            LikeTarget::Comment(id) => (None, Some(id)),
        };

        let vote = like::ActiveModel {
            user_id: sea_orm::ActiveValue::Set(user_id),
            topic_id: sea_orm::ActiveValue::Set(topic_id),
            comment_id: sea_orm::ActiveValue::Set(comment_id),
            like_type: sea_orm::ActiveValue::Set(target.kind()),
            like_status: sea_orm::ActiveValue::Set(status),
            created_at: sea_orm::ActiveValue::Set(now),
            updated_at: sea_orm::ActiveValue::Set(now),
            ..Default::default()
        };

        Like::insert(vote)
            .on_conflict(
                OnConflict::columns([like::Column::UserId, target.target_column()])
                    .update_columns([like::Column::LikeStatus, like::Column::UpdatedAt])
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await
            .map_err(AppError::persistence(LIKE_FAILED))?;

        tracing::debug!(user_id, ?target, ?status, "like recorded");
        Ok(())
    }

    pub async fn summary(&self, target: LikeTarget, viewer: Option<i32>) -> AppResult<LikeSummary> {
        let summary = Like::find()
            .select_only()
            .column_as(like_count(LikeStatus::Like), "likes")
            .column_as(like_count(LikeStatus::Dislike), "dislikes")
            .column_as(viewer_status(viewer), "user_like_status")
            .filter(target.target_column().eq(target.id()))
            .filter(like::Column::LikeType.eq(target.kind()))
            .into_model::<LikeSummary>()
            .one(&self.db)
            .await?
            .unwrap_or(LikeSummary {
                likes: 0,
                dislikes: 0,
                user_like_status: None,
            });

        Ok(summary)
    }

    async fn ensure_target_exists(&self, target: LikeTarget) -> AppResult<()> {
        let found = match target {
            LikeTarget::Topic(id) => Topic::find_by_id(id).one(&self.db).await?.is_some(),
            LikeTarget::Comment(id) => Comment::find_by_id(id).one(&self.db).await?.is_some(),
        };

        if found {
            Ok(())
        } else {
            Err(AppError::NotFound)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DbBackend, QueryTrait};

    #[test]
    fn target_kind_matches_variant() {
        assert_eq!(LikeTarget::Topic(3).kind(), LikeType::Topic);
        assert_eq!(LikeTarget::Comment(3).kind(), LikeType::Comment);
        assert_eq!(LikeTarget::Comment(7).id(), 7);
    }

    #[test]
    fn counts_split_by_status() {
        let sql = Like::find()
            .select_only()
            .column_as(like_count(LikeStatus::Like), "likes")
            .column_as(like_count(LikeStatus::Dislike), "dislikes")
            .build(DbBackend::Postgres)
            .to_string();

        assert_eq!(sql.matches("COUNT(").count(), 2);
        assert!(sql.contains(r#""likes"."like_status""#));
        assert!(sql.contains("'LIKE'"));
        assert!(sql.contains("'DISLIKE'"));
    }

    #[test]
    fn viewer_status_picks_viewer_rows() {
        let sql = Like::find()
            .select_only()
            .column_as(viewer_status(Some(9)), "user_like_status")
            .build(DbBackend::Postgres)
            .to_string();

        assert!(sql.contains("MAX("));
        assert!(sql.contains(r#""likes"."user_id""#));
        assert!(sql.contains("9"));
    }
}
