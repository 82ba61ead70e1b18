use crate::error::{AppError, AppResult};
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::handlers::topic::{AuthorSummary, ViewerQuery};
use crate::middleware::AuthUser;
use crate::models::{CommentModel, LikeStatus};
use crate::response::{to_string_repr, ApiResponse};
use crate::services::comment::{CommentRow, CommentService};
use axum::{response::IntoResponse, Extension};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommentRequest {
    /// Comment text
    #[validate(length(min = 1, max = 10000))]
    #[schema(example = "Comment on topic")]
    pub content: String,
    /// Topic the comment belongs to
    pub topic_id: i32,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommentResponse {
    pub id: i32,
    pub content: String,
    pub topic_id: i32,
    pub author_id: i32,
    pub created_at: String,
    pub updated_at: String,
}

impl From<CommentModel> for CommentResponse {
    fn from(c: CommentModel) -> Self {
        Self {
            id: c.id,
            content: c.content,
            topic_id: c.topic_id,
            author_id: c.author_id,
            created_at: c.created_at.to_string(),
            updated_at: c.updated_at.to_string(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommentWithLikesResponse {
    pub id: i32,
    pub content: String,
    pub topic_id: i32,
    pub author_id: i32,
    pub author: AuthorSummary,
    pub created_at: String,
    pub updated_at: String,
    #[serde(serialize_with = "to_string_repr")]
    #[schema(value_type = String)]
    pub likes: i64,
    #[serde(serialize_with = "to_string_repr")]
    #[schema(value_type = String)]
    pub dislikes: i64,
    pub user_like_status: Option<LikeStatus>,
}

impl From<CommentRow> for CommentWithLikesResponse {
    fn from(row: CommentRow) -> Self {
        Self {
            id: row.id,
            content: row.content,
            topic_id: row.topic_id,
            author_id: row.author_id,
            author: AuthorSummary {
                first_name: row.first_name,
                last_name: row.last_name,
                avatar_url: row.avatar_url,
            },
            created_at: row.created_at.to_string(),
            updated_at: row.updated_at.to_string(),
            likes: row.likes,
            dislikes: row.dislikes,
            user_like_status: row.user_like_status,
        }
    }
}

#[utoipa::path(
    get,
    path = "/comments/all/{topic_id}",
    params(
        ("topic_id" = i32, Path, description = "Topic ID"),
        ("userId" = Option<i32>, Query, description = "Viewer for userLikeStatus"),
    ),
    responses(
        (status = 200, description = "Comments, most liked first", body = Vec<CommentWithLikesResponse>),
        (status = 404, description = "Topic not found", body = AppError),
    ),
    tag = "comments"
)]
pub async fn list_comments(
    Extension(db): Extension<DatabaseConnection>,
    AppPath(topic_id): AppPath<i32>,
    AppQuery(viewer): AppQuery<ViewerQuery>,
) -> AppResult<impl IntoResponse> {
    let rows = CommentService::new(db)
        .list_by_topic(topic_id, viewer.user_id)
        .await?;
    let items: Vec<CommentWithLikesResponse> =
        rows.into_iter().map(CommentWithLikesResponse::from).collect();
    Ok(ApiResponse::ok(items))
}

#[utoipa::path(
    post,
    path = "/comments",
    security(("jwt_token" = [])),
    request_body = CommentRequest,
    responses(
        (status = 200, description = "Comment created", body = CommentResponse),
        (status = 400, description = "Validation error", body = AppError),
        (status = 404, description = "Topic not found", body = AppError),
    ),
    tag = "comments"
)]
pub async fn create_comment(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    AppJson(payload): AppJson<CommentRequest>,
) -> AppResult<impl IntoResponse> {
    payload.validate()?;

    let comment = CommentService::new(db)
        .create(auth_user.id, payload.topic_id, &payload.content)
        .await?;
    Ok(ApiResponse::ok(CommentResponse::from(comment)))
}

#[utoipa::path(
    post,
    path = "/comments/{id}",
    security(("jwt_token" = [])),
    params(("id" = i32, Path, description = "Comment ID")),
    request_body = CommentRequest,
    responses(
        (status = 200, description = "Comment updated", body = CommentResponse),
        (status = 403, description = "Not the author", body = AppError),
        (status = 404, description = "Comment not found", body = AppError),
    ),
    tag = "comments"
)]
pub async fn update_comment(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    AppPath(id): AppPath<i32>,
    AppJson(payload): AppJson<CommentRequest>,
) -> AppResult<impl IntoResponse> {
    payload.validate()?;

    let comment = CommentService::new(db)
        .update(id, auth_user.id, &payload.content)
        .await?;
    Ok(ApiResponse::ok(CommentResponse::from(comment)))
}

#[utoipa::path(
    delete,
    path = "/comments/{id}",
    security(("jwt_token" = [])),
    params(("id" = i32, Path, description = "Comment ID")),
    responses(
        (status = 200, description = "Comment deleted"),
        (status = 403, description = "Not the author, or no such comment", body = AppError),
    ),
    tag = "comments"
)]
pub async fn delete_comment(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    AppPath(id): AppPath<i32>,
) -> AppResult<impl IntoResponse> {
    CommentService::new(db).delete(id, auth_user.id).await?;
    Ok(ApiResponse::<()>::with_message((), "Comment deleted"))
}
