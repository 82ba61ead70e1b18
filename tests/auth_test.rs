mod common;

use serde_json::Value;

#[tokio::test]
async fn test_login_returns_access_token() {
    let app = common::spawn_app().await;
    let email = common::unique_email("login");
    let user_id = common::signup(&app, &email).await;

    let resp = common::login(&app, &email, common::TEST_PASSWORD).await;
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], true);

    let token = body["data"]["access_token"].as_str().unwrap();
    let config = outecho::config::jwt::JwtConfig::new(
        "integration_test_secret_that_is_at_least_32_characters_long",
        86_400,
    )
    .unwrap();
    let claims = outecho::utils::decode_jwt(&config, token).unwrap();
    assert_eq!(claims.id, user_id);
    assert_eq!(claims.email, email);
    assert_eq!(claims.exp - claims.iat, 86_400);
}

#[tokio::test]
async fn test_login_wrong_password() {
    let app = common::spawn_app().await;
    let email = common::unique_email("wrongpw");
    common::signup(&app, &email).await;

    let resp = common::login(&app, &email, "not_the_password").await;
    assert_eq!(resp.status(), 401);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "Invalid credentials");
}

#[tokio::test]
async fn test_login_unknown_email() {
    let app = common::spawn_app().await;

    let resp = common::login(&app, "nobody@test.com", common::TEST_PASSWORD).await;
    assert_eq!(resp.status(), 401);
}

#[tokio::test]
async fn test_login_rejects_invalid_email() {
    let app = common::spawn_app().await;

    let resp = common::login(&app, "not-an-email", common::TEST_PASSWORD).await;
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "Validation failed");
    assert!(body["detail"]["email"].is_array());
}

#[tokio::test]
async fn test_malformed_body_is_bad_request() {
    let app = common::spawn_app().await;

    let resp = app
        .client
        .post(app.url("/auth/login"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "Malformed request body");
}

#[tokio::test]
async fn test_protected_route_requires_token() {
    let app = common::spawn_app().await;

    let resp = app
        .client
        .post(app.url("/auth/protected"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);

    let resp = app
        .client
        .post(app.url("/auth/protected"))
        .bearer_auth("garbage.token.value")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);
}

#[tokio::test]
async fn test_protected_route_accepts_valid_token() {
    let app = common::spawn_app().await;
    let (_, token) = common::create_test_user(&app, "guarded").await;

    let resp = app
        .client
        .post(app.url("/auth/protected"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["message"], "This is a protected route");
}

#[tokio::test]
async fn test_token_of_deleted_user_is_rejected() {
    let app = common::spawn_app().await;
    let (_, token) = common::create_test_user(&app, "gone").await;

    let resp = app
        .client
        .delete(app.url("/user"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let resp = app
        .client
        .post(app.url("/auth/protected"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);
}
