use crate::handlers;
use crate::middleware::auth::auth_middleware;
use axum::{middleware, routing, Router};

pub fn create_routes() -> Router {
    let public = public_routes();
    let protected = protected_routes().layer(middleware::from_fn(auth_middleware));

    public.merge(protected)
}

/// Login, signup and all public reads.
fn public_routes() -> Router {
    Router::new()
        // Auth
        .route("/auth/login", routing::post(handlers::login))
        // Users
        .route(
            "/user",
            routing::post(handlers::user::create_user).get(handlers::user::list_users),
        )
        .route(
            "/user/top-commenters",
            routing::get(handlers::user::top_commenters),
        )
        .route("/user/{id}", routing::get(handlers::user::get_user))
        // Topics
        .route("/topics/all", routing::get(handlers::topic::list_topics))
        .route("/topics/hot", routing::get(handlers::topic::hot_topics))
        .route("/topics/{id}", routing::get(handlers::topic::get_topic))
        // Comments
        .route(
            "/comments/all/{topic_id}",
            routing::get(handlers::comment::list_comments),
        )
}

/// Routes behind the bearer-token guard.
fn protected_routes() -> Router {
    Router::new()
        .route("/auth/protected", routing::post(handlers::protected))
        // Users
        .route("/user/me", routing::get(handlers::user::get_me))
        .route(
            "/user",
            routing::put(handlers::user::update_user).delete(handlers::user::delete_user),
        )
        .route(
            "/user/change-password",
            routing::post(handlers::user::change_password),
        )
        // Topics
        .route("/topics/my", routing::get(handlers::topic::my_topics))
        .route("/topics", routing::post(handlers::topic::create_topic))
        .route(
            "/topics/{id}",
            routing::post(handlers::topic::update_topic).delete(handlers::topic::delete_topic),
        )
        .route("/topics/{id}/like", routing::post(handlers::like::like_topic))
        // Comments
        .route("/comments", routing::post(handlers::comment::create_comment))
        .route(
            "/comments/{id}",
            routing::post(handlers::comment::update_comment)
                .delete(handlers::comment::delete_comment),
        )
        .route(
            "/comments/{id}/like",
            routing::post(handlers::like::like_comment),
        )
}
