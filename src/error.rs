use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::{json, Value};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// A persistence failure reported with a caller-facing explanation.
    #[error("{context}: {source}")]
    Persistence {
        context: &'static str,
        #[source]
        source: sea_orm::DbErr,
    },

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Authentication failed")]
    Unauthorized,

    #[error("JWT error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    #[error("Not found")]
    NotFound,

    #[error("Forbidden: {0}")]
    Forbidden(&'static str),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Validation failed: {0}")]
    InvalidPayload(#[from] validator::ValidationErrors),

    #[error("Malformed request body: {0}")]
    MalformedBody(#[from] JsonRejection),

    #[error("Invalid path parameter: {0}")]
    MalformedPath(#[from] PathRejection),

    #[error("Invalid query string: {0}")]
    MalformedQuery(#[from] QueryRejection),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn persistence(context: &'static str) -> impl FnOnce(sea_orm::DbErr) -> Self {
        move |source| AppError::Persistence { context, source }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Database(_)
            | AppError::Persistence { .. }
            | AppError::Validation(_)
            | AppError::InvalidPayload(_)
            | AppError::MalformedBody(_)
            | AppError::MalformedPath(_)
            | AppError::MalformedQuery(_) => StatusCode::BAD_REQUEST,
            AppError::InvalidCredentials | AppError::Unauthorized | AppError::Jwt(_) => {
                StatusCode::UNAUTHORIZED
            }
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(serde::Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<Value>,
}

impl utoipa::ToSchema for AppError {
    fn name() -> std::borrow::Cow<'static, str> {
        "ErrorResponse".into()
    }
}

impl utoipa::PartialSchema for AppError {
    fn schema() -> utoipa::openapi::RefOr<utoipa::openapi::schema::Schema> {
        ErrorResponse::schema()
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (error_message, detail) = match self {
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                ("Database error".to_string(), Some(json!(e.to_string())))
            }
            AppError::Persistence { context, source } => {
                tracing::error!("{}: {:?}", context, source);
                (context.to_string(), Some(json!(source.to_string())))
            }
            AppError::InvalidCredentials => ("Invalid credentials".to_string(), None),
            AppError::Unauthorized => ("Unauthorized".to_string(), None),
            AppError::Jwt(e) => {
                tracing::debug!("JWT error: {:?}", e);
                ("Invalid token".to_string(), None)
            }
            AppError::NotFound => ("Resource not found".to_string(), None),
            AppError::Forbidden(msg) => (msg.to_string(), None),
            AppError::Validation(msg) => (msg, None),
            AppError::InvalidPayload(errors) => {
                ("Validation failed".to_string(), Some(json!(errors)))
            }
            AppError::MalformedBody(rejection) => {
                ("Malformed request body".to_string(), Some(json!(rejection.body_text())))
            }
            AppError::MalformedPath(rejection) => {
                ("Invalid path parameter".to_string(), Some(json!(rejection.body_text())))
            }
            AppError::MalformedQuery(rejection) => {
                ("Invalid query string".to_string(), Some(json!(rejection.body_text())))
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {:?}", e);
                ("Internal server error".to_string(), None)
            }
        };

        let body = ErrorResponse {
            error: error_message,
            detail,
        };

        (status, Json(body)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
