use crate::error::{AppError, AppResult};
use crate::extract::{AppJson, AppPath};
use crate::middleware::AuthUser;
use crate::models::LikeStatus;
use crate::response::{to_string_repr, ApiResponse};
use crate::services::like::{LikeService, LikeSummary, LikeTarget};
use axum::{response::IntoResponse, Extension};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

const LIKE_PROCESSED: &str = "Like/dislike processed successfully";

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LikeRequest {
    pub like_status: LikeStatus,
}

/// Counts for the target after the vote was applied.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LikeResponse {
    #[serde(serialize_with = "to_string_repr")]
    #[schema(value_type = String)]
    pub likes: i64,
    #[serde(serialize_with = "to_string_repr")]
    #[schema(value_type = String)]
    pub dislikes: i64,
    pub user_like_status: Option<LikeStatus>,
}

impl From<LikeSummary> for LikeResponse {
    fn from(s: LikeSummary) -> Self {
        Self {
            likes: s.likes,
            dislikes: s.dislikes,
            user_like_status: s.user_like_status,
        }
    }
}

async fn apply(
    db: DatabaseConnection,
    user_id: i32,
    target: LikeTarget,
    status: LikeStatus,
) -> AppResult<LikeResponse> {
    let service = LikeService::new(db);
    service.set_like(user_id, target, status).await?;
    let summary = service.summary(target, Some(user_id)).await?;
    Ok(summary.into())
}

#[utoipa::path(
    post,
    path = "/topics/{id}/like",
    security(("jwt_token" = [])),
    params(("id" = i32, Path, description = "Topic ID")),
    request_body = LikeRequest,
    responses(
        (status = 200, description = "Vote recorded", body = LikeResponse),
        (status = 400, description = "Vote could not be stored", body = AppError),
        (status = 401, description = "Unauthorized", body = AppError),
        (status = 404, description = "Topic not found", body = AppError),
    ),
    tag = "likes"
)]
pub async fn like_topic(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    AppPath(id): AppPath<i32>,
    AppJson(payload): AppJson<LikeRequest>,
) -> AppResult<impl IntoResponse> {
    let response = apply(db, auth_user.id, LikeTarget::Topic(id), payload.like_status).await?;
    Ok(ApiResponse::with_message(response, LIKE_PROCESSED))
}

#[utoipa::path(
    post,
    path = "/comments/{id}/like",
    security(("jwt_token" = [])),
    params(("id" = i32, Path, description = "Comment ID")),
    request_body = LikeRequest,
    responses(
        (status = 200, description = "Vote recorded", body = LikeResponse),
        (status = 400, description = "Vote could not be stored", body = AppError),
        (status = 401, description = "Unauthorized", body = AppError),
        (status = 404, description = "Comment not found", body = AppError),
    ),
    tag = "likes"
)]
pub async fn like_comment(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    AppPath(id): AppPath<i32>,
    AppJson(payload): AppJson<LikeRequest>,
) -> AppResult<impl IntoResponse> {
    let response = apply(db, auth_user.id, LikeTarget::Comment(id), payload.like_status).await?;
    Ok(ApiResponse::with_message(response, LIKE_PROCESSED))
}
