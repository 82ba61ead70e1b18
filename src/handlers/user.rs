use crate::config::auth::AuthConfig;
use crate::error::{AppError, AppResult};
use crate::extract::{AppJson, AppPath};
use crate::handlers::auth::MessageResponse;
use crate::handlers::topic::TopicResponse;
use crate::middleware::AuthUser;
use crate::models::{Gender, UserModel};
use crate::response::{to_string_repr, ApiResponse};
use crate::services::user::{CommenterRow, NewUser, ProfileUpdate, UserService};
use axum::{response::IntoResponse, Extension};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    /// Email address
    #[validate(email)]
    #[schema(example = "user@example.com")]
    pub email: String,
    /// Password
    #[validate(length(min = 1))]
    pub password: String,
    #[validate(length(max = 100))]
    pub first_name: Option<String>,
    #[validate(length(max = 100))]
    pub last_name: Option<String>,
    pub gender: Gender,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(max = 100))]
    pub first_name: Option<String>,
    #[validate(length(max = 100))]
    pub last_name: Option<String>,
    pub gender: Option<Gender>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub old_password: Option<String>,
    #[validate(length(min = 1))]
    pub new_password: String,
    pub confirm_password: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: i32,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub gender: Gender,
    pub avatar_url: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<UserModel> for UserResponse {
    fn from(u: UserModel) -> Self {
        Self {
            id: u.id,
            email: u.email,
            first_name: u.first_name,
            last_name: u.last_name,
            gender: u.gender,
            avatar_url: u.avatar_url,
            created_at: u.created_at.to_string(),
            updated_at: u.updated_at.to_string(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserWithTopicsResponse {
    #[serde(flatten)]
    pub user: UserResponse,
    pub topics: Vec<TopicResponse>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TopCommenterResponse {
    pub id: i32,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub avatar_url: Option<String>,
    /// Number of comments written
    #[serde(serialize_with = "to_string_repr")]
    #[schema(value_type = String)]
    pub comment_count: i64,
}

impl From<CommenterRow> for TopCommenterResponse {
    fn from(row: CommenterRow) -> Self {
        Self {
            id: row.id,
            first_name: row.first_name,
            last_name: row.last_name,
            avatar_url: row.avatar_url,
            comment_count: row.comment_count,
        }
    }
}

#[utoipa::path(
    post,
    path = "/user",
    request_body = CreateUserRequest,
    responses(
        (status = 200, description = "User created", body = UserResponse),
        (status = 400, description = "Validation error or email taken", body = AppError),
    ),
    tag = "users"
)]
pub async fn create_user(
    Extension(db): Extension<DatabaseConnection>,
    Extension(auth_config): Extension<AuthConfig>,
    AppJson(payload): AppJson<CreateUserRequest>,
) -> AppResult<impl IntoResponse> {
    payload.validate()?;

    let service = UserService::new(db, auth_config);
    let user = service
        .create(NewUser {
            email: payload.email,
            password: payload.password,
            first_name: payload.first_name,
            last_name: payload.last_name,
            gender: payload.gender,
        })
        .await?;

    Ok(ApiResponse::ok(UserResponse::from(user)))
}

#[utoipa::path(
    get,
    path = "/user",
    responses(
        (status = 200, description = "All users", body = Vec<UserResponse>),
    ),
    tag = "users"
)]
pub async fn list_users(
    Extension(db): Extension<DatabaseConnection>,
    Extension(auth_config): Extension<AuthConfig>,
) -> AppResult<impl IntoResponse> {
    let users = UserService::new(db, auth_config).list().await?;
    let items: Vec<UserResponse> = users.into_iter().map(UserResponse::from).collect();
    Ok(ApiResponse::ok(items))
}

#[utoipa::path(
    get,
    path = "/user/top-commenters",
    responses(
        (status = 200, description = "Users with the most comments", body = Vec<TopCommenterResponse>),
    ),
    tag = "users"
)]
pub async fn top_commenters(
    Extension(db): Extension<DatabaseConnection>,
    Extension(auth_config): Extension<AuthConfig>,
) -> AppResult<impl IntoResponse> {
    let rows = UserService::new(db, auth_config).top_commenters().await?;
    let items: Vec<TopCommenterResponse> =
        rows.into_iter().map(TopCommenterResponse::from).collect();
    Ok(ApiResponse::ok(items))
}

#[utoipa::path(
    get,
    path = "/user/me",
    security(("jwt_token" = [])),
    responses(
        (status = 200, description = "Current user", body = UserResponse),
        (status = 401, description = "Unauthorized", body = AppError),
    ),
    tag = "users"
)]
pub async fn get_me(
    Extension(db): Extension<DatabaseConnection>,
    Extension(auth_config): Extension<AuthConfig>,
    auth_user: AuthUser,
) -> AppResult<impl IntoResponse> {
    let user = UserService::new(db, auth_config).get_by_id(auth_user.id).await?;
    Ok(ApiResponse::ok(UserResponse::from(user)))
}

#[utoipa::path(
    get,
    path = "/user/{id}",
    params(("id" = i32, Path, description = "User ID")),
    responses(
        (status = 200, description = "User with their topics", body = UserWithTopicsResponse),
        (status = 404, description = "User not found", body = AppError),
    ),
    tag = "users"
)]
pub async fn get_user(
    Extension(db): Extension<DatabaseConnection>,
    Extension(auth_config): Extension<AuthConfig>,
    AppPath(id): AppPath<i32>,
) -> AppResult<impl IntoResponse> {
    let (user, topics) = UserService::new(db, auth_config).get_with_topics(id).await?;
    Ok(ApiResponse::ok(UserWithTopicsResponse {
        user: UserResponse::from(user),
        topics: topics.into_iter().map(TopicResponse::from).collect(),
    }))
}

#[utoipa::path(
    put,
    path = "/user",
    security(("jwt_token" = [])),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "Profile updated", body = UserResponse),
        (status = 400, description = "Validation error or email taken", body = AppError),
        (status = 401, description = "Unauthorized", body = AppError),
    ),
    tag = "users"
)]
pub async fn update_user(
    Extension(db): Extension<DatabaseConnection>,
    Extension(auth_config): Extension<AuthConfig>,
    auth_user: AuthUser,
    AppJson(payload): AppJson<UpdateUserRequest>,
) -> AppResult<impl IntoResponse> {
    payload.validate()?;

    let service = UserService::new(db, auth_config);
    let user = service
        .update(
            auth_user.id,
            ProfileUpdate {
                email: payload.email,
                first_name: payload.first_name,
                last_name: payload.last_name,
                gender: payload.gender,
            },
        )
        .await?;

    Ok(ApiResponse::ok(UserResponse::from(user)))
}

#[utoipa::path(
    post,
    path = "/user/change-password",
    security(("jwt_token" = [])),
    request_body = ChangePasswordRequest,
    responses(
        (status = 200, description = "Password changed", body = MessageResponse),
        (status = 400, description = "Confirmation does not match", body = AppError),
        (status = 401, description = "Old password does not match", body = AppError),
    ),
    tag = "users"
)]
pub async fn change_password(
    Extension(db): Extension<DatabaseConnection>,
    Extension(auth_config): Extension<AuthConfig>,
    auth_user: AuthUser,
    AppJson(payload): AppJson<ChangePasswordRequest>,
) -> AppResult<impl IntoResponse> {
    payload.validate()?;

    UserService::new(db, auth_config)
        .change_password(
            auth_user.id,
            payload.old_password.as_deref(),
            &payload.new_password,
            &payload.confirm_password,
        )
        .await?;

    Ok(ApiResponse::ok(MessageResponse {
        message: "Password successfully changed.".to_string(),
    }))
}

#[utoipa::path(
    delete,
    path = "/user",
    security(("jwt_token" = [])),
    responses(
        (status = 200, description = "Account deleted with its topics and comments"),
        (status = 400, description = "Error while deleting user", body = AppError),
        (status = 401, description = "Unauthorized", body = AppError),
    ),
    tag = "users"
)]
pub async fn delete_user(
    Extension(db): Extension<DatabaseConnection>,
    Extension(auth_config): Extension<AuthConfig>,
    auth_user: AuthUser,
) -> AppResult<impl IntoResponse> {
    UserService::new(db, auth_config).delete(auth_user.id).await?;
    Ok(ApiResponse::<()>::with_message((), "User deleted"))
}
