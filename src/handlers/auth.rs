use crate::config::jwt::JwtConfig;
use crate::error::{AppError, AppResult};
use crate::extract::AppJson;
use crate::middleware::AuthUser;
use crate::response::ApiResponse;
use crate::services::auth::AuthService;
use axum::{response::IntoResponse, Extension};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    /// Email address
    #[validate(email)]
    #[schema(example = "user@example.com")]
    pub email: String,
    /// User password
    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TokenResponse {
    /// Signed JWT, valid for 24 hours by default
    pub access_token: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = TokenResponse),
        (status = 400, description = "Validation error", body = AppError),
        (status = 401, description = "Invalid credentials", body = AppError),
    ),
    tag = "auth"
)]
pub async fn login(
    Extension(db): Extension<DatabaseConnection>,
    Extension(jwt): Extension<JwtConfig>,
    AppJson(payload): AppJson<LoginRequest>,
) -> AppResult<impl IntoResponse> {
    payload.validate()?;

    let service = AuthService::new(db, jwt);
    let (_, access_token) = service.login(&payload.email, &payload.password).await?;

    Ok(ApiResponse::ok(TokenResponse { access_token }))
}

#[utoipa::path(
    post,
    path = "/auth/protected",
    security(("jwt_token" = [])),
    responses(
        (status = 200, description = "Token accepted", body = MessageResponse),
        (status = 401, description = "Unauthorized", body = AppError),
    ),
    tag = "auth"
)]
pub async fn protected(auth_user: AuthUser) -> AppResult<impl IntoResponse> {
    tracing::debug!(user_id = auth_user.id, "protected route reached");
    Ok(ApiResponse::ok(MessageResponse {
        message: "This is a protected route".to_string(),
    }))
}
