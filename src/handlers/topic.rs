use crate::error::{AppError, AppResult};
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::middleware::AuthUser;
use crate::models::{Category, LikeStatus, TopicModel};
use crate::response::{to_string_repr, ApiResponse, Page, PaginatedResponse, PaginationQuery};
use crate::services::topic::{TopicInput, TopicOrder, TopicRow, TopicService};
use axum::{response::IntoResponse, Extension};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TopicRequest {
    #[validate(length(min = 1, max = 255))]
    #[schema(example = "My First Topic")]
    pub title: String,
    #[validate(length(min = 1))]
    #[schema(example = "This is a detailed description of my topic.")]
    pub description: String,
    pub category: Category,
}

impl From<TopicRequest> for TopicInput {
    fn from(req: TopicRequest) -> Self {
        Self {
            title: req.title,
            description: req.description,
            category: req.category,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TopicListQuery {
    /// Page number, 1-based
    pub page: Option<u64>,
    /// Items per page
    pub page_size: Option<u64>,
    /// asc, desc or hot
    pub order_by: Option<TopicOrder>,
    /// Viewer whose own like status is reported
    pub user_id: Option<i32>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ViewerQuery {
    pub user_id: Option<i32>,
}

/// A topic as stored.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TopicResponse {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub category: Category,
    pub posted_by_id: i32,
    pub created_at: String,
    pub updated_at: String,
}

impl From<TopicModel> for TopicResponse {
    fn from(t: TopicModel) -> Self {
        Self {
            id: t.id,
            title: t.title,
            description: t.description,
            category: t.category,
            posted_by_id: t.posted_by_id,
            created_at: t.created_at.to_string(),
            updated_at: t.updated_at.to_string(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthorSummary {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub avatar_url: Option<String>,
}

/// A topic with its author and like aggregates.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TopicWithLikesResponse {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub category: Category,
    pub posted_by_id: i32,
    pub posted_by: AuthorSummary,
    pub created_at: String,
    pub updated_at: String,
    #[serde(serialize_with = "to_string_repr")]
    #[schema(value_type = String)]
    pub likes: i64,
    #[serde(serialize_with = "to_string_repr")]
    #[schema(value_type = String)]
    pub dislikes: i64,
    /// The viewer's own vote, null when absent or no viewer given
    pub user_like_status: Option<LikeStatus>,
}

impl From<TopicRow> for TopicWithLikesResponse {
    fn from(row: TopicRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            description: row.description,
            category: row.category,
            posted_by_id: row.posted_by_id,
            posted_by: AuthorSummary {
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

fn page_of(params: &TopicListQuery) -> Page {
    Page::from(PaginationQuery {
        page: params.page,
        page_size: params.page_size,
    })
}

#[utoipa::path(
    get,
    path = "/topics/all",
    params(
        ("page" = Option<u64>, Query, description = "Page number"),
        ("pageSize" = Option<u64>, Query, description = "Items per page"),
        ("orderBy" = Option<TopicOrder>, Query, description = "Sort order: asc, desc, hot"),
        ("userId" = Option<i32>, Query, description = "Viewer for userLikeStatus"),
    ),
    responses(
        (status = 200, description = "List of topics", body = PaginatedResponse<TopicWithLikesResponse>),
    ),
    tag = "topics"
)]
pub async fn list_topics(
    Extension(db): Extension<DatabaseConnection>,
    AppQuery(params): AppQuery<TopicListQuery>,
) -> AppResult<impl IntoResponse> {
    let page = page_of(&params);
    let order = params.order_by.unwrap_or_default();

    let service = TopicService::new(db);
    let (rows, total) = service.list(page, order, params.user_id, None).await?;

    let items: Vec<TopicWithLikesResponse> =
        rows.into_iter().map(TopicWithLikesResponse::from).collect();
    Ok(ApiResponse::ok(PaginatedResponse::new(
        items,
        total,
        page.page,
        page.page_size,
    )))
}

#[utoipa::path(
    get,
    path = "/topics/hot",
    responses(
        (status = 200, description = "Most recent topics", body = Vec<TopicWithLikesResponse>),
    ),
    tag = "topics"
)]
pub async fn hot_topics(
    Extension(db): Extension<DatabaseConnection>,
) -> AppResult<impl IntoResponse> {
    let rows = TopicService::new(db).hot().await?;
    let items: Vec<TopicWithLikesResponse> =
        rows.into_iter().map(TopicWithLikesResponse::from).collect();
    Ok(ApiResponse::ok(items))
}

#[utoipa::path(
    get,
    path = "/topics/my",
    security(("jwt_token" = [])),
    params(
        ("page" = Option<u64>, Query, description = "Page number"),
        ("pageSize" = Option<u64>, Query, description = "Items per page"),
        ("orderBy" = Option<TopicOrder>, Query, description = "Sort order: asc, desc, hot"),
    ),
    responses(
        (status = 200, description = "Topics posted by the caller", body = PaginatedResponse<TopicWithLikesResponse>),
        (status = 401, description = "Unauthorized", body = AppError),
    ),
    tag = "topics"
)]
pub async fn my_topics(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    AppQuery(params): AppQuery<TopicListQuery>,
) -> AppResult<impl IntoResponse> {
    let page = page_of(&params);
    let order = params.order_by.unwrap_or_default();

    let service = TopicService::new(db);
    let (rows, total) = service
        .list(page, order, Some(auth_user.id), Some(auth_user.id))
        .await?;

    let items: Vec<TopicWithLikesResponse> =
        rows.into_iter().map(TopicWithLikesResponse::from).collect();
    Ok(ApiResponse::ok(PaginatedResponse::new(
        items,
        total,
        page.page,
        page.page_size,
    )))
}

#[utoipa::path(
    get,
    path = "/topics/{id}",
    params(
        ("id" = i32, Path, description = "Topic ID"),
        ("userId" = Option<i32>, Query, description = "Viewer for userLikeStatus"),
    ),
    responses(
        (status = 200, description = "Topic details", body = TopicWithLikesResponse),
        (status = 404, description = "Topic not found", body = AppError),
    ),
    tag = "topics"
)]
pub async fn get_topic(
    Extension(db): Extension<DatabaseConnection>,
    AppPath(id): AppPath<i32>,
    AppQuery(viewer): AppQuery<ViewerQuery>,
) -> AppResult<impl IntoResponse> {
    let row = TopicService::new(db)
        .get_with_likes(id, viewer.user_id)
        .await?;
    Ok(ApiResponse::ok(TopicWithLikesResponse::from(row)))
}

#[utoipa::path(
    post,
    path = "/topics",
    security(("jwt_token" = [])),
    request_body = TopicRequest,
    responses(
        (status = 200, description = "Topic created", body = TopicResponse),
        (status = 400, description = "Validation error", body = AppError),
        (status = 401, description = "Unauthorized", body = AppError),
    ),
    tag = "topics"
)]
pub async fn create_topic(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    AppJson(payload): AppJson<TopicRequest>,
) -> AppResult<impl IntoResponse> {
    payload.validate()?;

    let topic = TopicService::new(db)
        .create(auth_user.id, payload.into())
        .await?;
    Ok(ApiResponse::ok(TopicResponse::from(topic)))
}

#[utoipa::path(
    post,
    path = "/topics/{id}",
    security(("jwt_token" = [])),
    params(("id" = i32, Path, description = "Topic ID")),
    request_body = TopicRequest,
    responses(
        (status = 200, description = "Topic updated", body = TopicResponse),
        (status = 403, description = "Not the owner", body = AppError),
        (status = 404, description = "Topic not found", body = AppError),
    ),
    tag = "topics"
)]
pub async fn update_topic(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    AppPath(id): AppPath<i32>,
    AppJson(payload): AppJson<TopicRequest>,
) -> AppResult<impl IntoResponse> {
    payload.validate()?;

    let topic = TopicService::new(db)
        .update(id, auth_user.id, payload.into())
        .await?;
    Ok(ApiResponse::ok(TopicResponse::from(topic)))
}

#[utoipa::path(
    delete,
    path = "/topics/{id}",
    security(("jwt_token" = [])),
    params(("id" = i32, Path, description = "Topic ID")),
    responses(
        (status = 200, description = "Topic deleted"),
        (status = 403, description = "Not the owner, or no such topic", body = AppError),
    ),
    tag = "topics"
)]
pub async fn delete_topic(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    AppPath(id): AppPath<i32>,
) -> AppResult<impl IntoResponse> {
    TopicService::new(db).delete(id, auth_user.id).await?;
    Ok(ApiResponse::<()>::with_message((), "Topic deleted"))
}
