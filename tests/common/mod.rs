#![allow(dead_code)]

use reqwest::Client;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;
use serde_json::{json, Value};
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Once,
};

static INIT: Once = Once::new();
static USER_COUNTER: AtomicUsize = AtomicUsize::new(0);

pub const TEST_PASSWORD: &str = "test_password_123";
/// Cheapest bcrypt cost keeps signup fast.
pub const TEST_BCRYPT_COST: u32 = 4;
const TEST_JWT_SECRET: &str = "integration_test_secret_that_is_at_least_32_characters_long";

fn init_env() {
    INIT.call_once(|| {
        dotenv::dotenv().ok();
    });
}

pub struct TestApp {
    pub addr: String,
    pub db: DatabaseConnection,
    pub client: Client,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.addr, path)
    }
}

/// Each app gets its own fresh database: an in-memory SQLite unless
/// `TEST_DATABASE_URL` points somewhere else.
pub async fn spawn_app() -> TestApp {
    init_env();

    let database_url =
        std::env::var("TEST_DATABASE_URL").unwrap_or_else(|_| "sqlite::memory:".to_string());

    let mut opt = ConnectOptions::new(database_url);
    // An in-memory SQLite database lives exactly as long as its one connection.
    opt.max_connections(1).min_connections(1).sqlx_logging(false);

    let db = Database::connect(opt)
        .await
        .expect("Failed to connect to test database");

    outecho::migration::Migrator::fresh(&db)
        .await
        .expect("Failed to run migrations");

    let jwt = outecho::config::jwt::JwtConfig::new(TEST_JWT_SECRET, 86_400)
        .expect("Invalid test JWT config");

    let app = axum::Router::new()
        .route("/", axum::routing::get(|| async { "ok" }))
        .merge(outecho::routes::create_routes())
        .layer(axum::extract::Extension(db.clone()))
        .layer(axum::extract::Extension(jwt))
        .layer(axum::extract::Extension(outecho::config::auth::AuthConfig {
            bcrypt_cost: TEST_BCRYPT_COST,
        }));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    TestApp {
        addr: format!("http://{}", addr),
        db,
        client: Client::new(),
    }
}

/// A fresh, unique email address.
pub fn unique_email(prefix: &str) -> String {
    let counter = USER_COUNTER.fetch_add(1, Ordering::SeqCst);
    format!("{}_{}@test.com", prefix, counter)
}

/// Sign up through the API and return the created user's id.
pub async fn signup(app: &TestApp, email: &str) -> i32 {
    let resp = app
        .client
        .post(app.url("/user"))
        .json(&json!({
            "email": email,
            "password": TEST_PASSWORD,
            "gender": "FEMALE",
            "firstName": "Test",
            "lastName": "User"
        }))
        .send()
        .await
        .expect("Failed to sign up");

    let status = resp.status();
    let body: Value = resp.json().await.expect("Failed to parse signup response");
    if !body["success"].as_bool().unwrap_or(false) {
        panic!("Failed to sign up '{}': status={}, body={}", email, status, body);
    }

    body["data"]["id"]
        .as_i64()
        .unwrap_or_else(|| panic!("Signup response missing id: {}", body)) as i32
}

pub async fn login(app: &TestApp, email: &str, password: &str) -> reqwest::Response {
    app.client
        .post(app.url("/auth/login"))
        .json(&json!({ "email": email, "password": password }))
        .send()
        .await
        .expect("Failed to send login request")
}

/// Sign up a new user and log in; returns (user_id, token).
pub async fn create_test_user(app: &TestApp, prefix: &str) -> (i32, String) {
    let email = unique_email(prefix);
    let user_id = signup(app, &email).await;

    let resp = login(app, &email, TEST_PASSWORD).await;
    let body: Value = resp.json().await.expect("Failed to parse login response");
    let token = body["data"]["access_token"]
        .as_str()
        .unwrap_or_else(|| panic!("Login response missing access_token: {}", body))
        .to_string();

    (user_id, token)
}

/// Create a topic as the token's owner and return its id.
pub async fn create_test_topic(app: &TestApp, token: &str, title: &str) -> i32 {
    let resp = app
        .client
        .post(app.url("/topics"))
        .bearer_auth(token)
        .json(&json!({
            "title": title,
            "description": "A topic used in tests",
            "category": "GENERAL"
        }))
        .send()
        .await
        .expect("Failed to create topic");

    let status = resp.status();
    let body: Value = resp.json().await.expect("Failed to parse topic response");
    if !body["success"].as_bool().unwrap_or(false) {
        panic!("Failed to create topic: status={}, body={}", status, body);
    }
    body["data"]["id"].as_i64().expect("Topic response missing id") as i32
}

pub async fn create_test_comment(app: &TestApp, token: &str, topic_id: i32, content: &str) -> i32 {
    let resp = app
        .client
        .post(app.url("/comments"))
        .bearer_auth(token)
        .json(&json!({ "content": content, "topicId": topic_id }))
        .send()
        .await
        .expect("Failed to create comment");

    let status = resp.status();
    let body: Value = resp.json().await.expect("Failed to parse comment response");
    if !body["success"].as_bool().unwrap_or(false) {
        panic!("Failed to create comment: status={}, body={}", status, body);
    }
    body["data"]["id"].as_i64().expect("Comment response missing id") as i32
}

pub async fn like(app: &TestApp, token: &str, path: &str, status: &str) -> reqwest::Response {
    app.client
        .post(app.url(path))
        .bearer_auth(token)
        .json(&json!({ "likeStatus": status }))
        .send()
        .await
        .expect("Failed to send like request")
}
