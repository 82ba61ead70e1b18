use axum::{extract::Extension, response::IntoResponse, routing::get, Json, Router};
use outecho::{config, migration, routes};
use sea_orm::DatabaseConnection;
use sea_orm_migration::MigratorTrait;
use serde_json::json;
use std::env;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(
        health_check,
        // Auth routes
        outecho::handlers::auth::login,
        outecho::handlers::auth::protected,
        // User routes
        outecho::handlers::user::create_user,
        outecho::handlers::user::list_users,
        outecho::handlers::user::top_commenters,
        outecho::handlers::user::get_me,
        outecho::handlers::user::get_user,
        outecho::handlers::user::update_user,
        outecho::handlers::user::change_password,
        outecho::handlers::user::delete_user,
        // Topic routes
        outecho::handlers::topic::list_topics,
        outecho::handlers::topic::hot_topics,
        outecho::handlers::topic::my_topics,
        outecho::handlers::topic::get_topic,
        outecho::handlers::topic::create_topic,
        outecho::handlers::topic::update_topic,
        outecho::handlers::topic::delete_topic,
        // Comment routes
        outecho::handlers::comment::list_comments,
        outecho::handlers::comment::create_comment,
        outecho::handlers::comment::update_comment,
        outecho::handlers::comment::delete_comment,
        // Like routes
        outecho::handlers::like::like_topic,
        outecho::handlers::like::like_comment,
    ),
    components(
        schemas(
            outecho::response::ApiResponse<serde_json::Value>,
            outecho::response::PaginatedResponse<serde_json::Value>,
            outecho::response::PaginationQuery,
            outecho::error::AppError,
            outecho::models::Category,
            outecho::models::Gender,
            outecho::models::LikeStatus,
            outecho::services::topic::TopicOrder,
            // Auth
            outecho::handlers::auth::LoginRequest,
            outecho::handlers::auth::TokenResponse,
            outecho::handlers::auth::MessageResponse,
            // User
            outecho::handlers::user::CreateUserRequest,
            outecho::handlers::user::UpdateUserRequest,
            outecho::handlers::user::ChangePasswordRequest,
            outecho::handlers::user::UserResponse,
            outecho::handlers::user::UserWithTopicsResponse,
            outecho::handlers::user::TopCommenterResponse,
            // Topic
            outecho::handlers::topic::TopicRequest,
            outecho::handlers::topic::TopicListQuery,
            outecho::handlers::topic::TopicResponse,
            outecho::handlers::topic::TopicWithLikesResponse,
            outecho::handlers::topic::AuthorSummary,
            // Comment
            outecho::handlers::comment::CommentRequest,
            outecho::handlers::comment::CommentResponse,
            outecho::handlers::comment::CommentWithLikesResponse,
            // Like
            outecho::handlers::like::LikeRequest,
            outecho::handlers::like::LikeResponse,
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "auth", description = "Authentication operations"),
        (name = "users", description = "User account operations"),
        (name = "topics", description = "Topic management operations"),
        (name = "comments", description = "Comment management operations"),
        (name = "likes", description = "Like/dislike operations"),
    )
)]
struct ApiDoc;

/// Registers the `jwt_token` bearer scheme referenced by protected paths.
struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "jwt_token",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "outecho=debug,tower_http=debug,axum=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Validate configuration before doing anything else
    let (jwt_config, auth_config) = validate_config()?;

    tracing::info!("Starting Outecho API v{}...", env!("CARGO_PKG_VERSION"));

    let db = config::database::get_database().await?;
    tracing::info!("Database connected successfully");

    migration::Migrator::up(&db, None).await?;
    tracing::info!("Database migrations applied successfully");

    let app = create_app()
        .layer(Extension(db))
        .layer(Extension(jwt_config))
        .layer(Extension(auth_config));

    let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port = env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let addr = format!("{}:{}", host, port);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on http://{}", addr);
    tracing::info!("Swagger UI available at http://{}/api", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shut down gracefully");
    Ok(())
}

/// Validate all required configuration at startup (fail-fast).
fn validate_config() -> anyhow::Result<(config::jwt::JwtConfig, config::auth::AuthConfig)> {
    let jwt_config = config::jwt::JwtConfig::from_env()?;

    // DATABASE_URL: checked here for an early error, the connection happens later
    if env::var("DATABASE_URL").is_err() {
        return Err(anyhow::anyhow!(
            "DATABASE_URL environment variable must be set"
        ));
    }

    let auth_config = config::auth::AuthConfig::from_env();
    tracing::debug!(bcrypt_cost = auth_config.bcrypt_cost, "auth config loaded");

    Ok((jwt_config, auth_config))
}

fn build_cors_layer() -> CorsLayer {
    use axum::http::{header, HeaderValue, Method};

    let origins_str = env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".to_string());

    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    if origins_str == "*" {
        cors.allow_origin(tower_http::cors::Any)
    } else {
        let origins: Vec<HeaderValue> = origins_str
            .split(',')
            .filter_map(|s| s.trim().parse().ok())
            .collect();
        cors.allow_origin(origins)
    }
}

fn create_app() -> Router {
    Router::new()
        .route("/", get(health_check))
        .merge(routes::create_routes())
        .merge(SwaggerUi::new("/api").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(build_cors_layer())
}

#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Health check successful", body = serde_json::Value)
    )
)]
async fn health_check(Extension(db): Extension<DatabaseConnection>) -> impl IntoResponse {
    let db_ok = db.ping().await.is_ok();
    let status = if db_ok { "ok" } else { "degraded" };

    Json(json!({
        "status": status,
        "service": "Outecho API",
        "version": env!("CARGO_PKG_VERSION"),
        "database": db_ok,
    }))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to install CTRL+C signal handler: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received, gracefully shutting down...");
}
