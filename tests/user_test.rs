mod common;

use outecho::models::{comment, like, topic, Comment, Like, Topic, User};
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};
use serde_json::{json, Value};

#[tokio::test]
async fn test_signup_stores_bcrypt_hash() {
    let app = common::spawn_app().await;
    let email = common::unique_email("hash");
    let user_id = common::signup(&app, &email).await;

    let stored = User::find_by_id(user_id)
        .one(&app.db)
        .await
        .unwrap()
        .expect("user row");
    assert_ne!(stored.password, common::TEST_PASSWORD);
    assert!(stored.password.starts_with("$2"));
    assert!(outecho::utils::verify_password(common::TEST_PASSWORD, &stored.password).unwrap());
}

#[tokio::test]
async fn test_signup_uses_configured_bcrypt_cost() {
    let app = common::spawn_app().await;
    let email = common::unique_email("cost");
    let user_id = common::signup(&app, &email).await;

    let stored = User::find_by_id(user_id)
        .one(&app.db)
        .await
        .unwrap()
        .expect("user row");
    let prefix = format!("$2b${:02}$", common::TEST_BCRYPT_COST);
    assert!(stored.password.starts_with(&prefix), "hash {}", stored.password);
}

#[tokio::test]
async fn test_signup_response_hides_password_and_assigns_avatar() {
    let app = common::spawn_app().await;
    let email = common::unique_email("avatar");

    let resp = app
        .client
        .post(app.url("/user"))
        .json(&json!({
            "email": email,
            "password": common::TEST_PASSWORD,
            "gender": "MALE"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    let data = &body["data"];

    assert!(data.get("password").is_none());
    assert_eq!(data["email"], email.as_str());
    assert_eq!(data["gender"], "MALE");
    assert!(data["firstName"].is_null());
    let avatar = data["avatarUrl"].as_str().unwrap();
    assert!(avatar.starts_with("https://robohash.org/"));
    assert!(avatar.ends_with(".png?set=set3"));
}

#[tokio::test]
async fn test_signup_duplicate_email() {
    let app = common::spawn_app().await;
    let email = common::unique_email("dup");
    common::signup(&app, &email).await;

    let resp = app
        .client
        .post(app.url("/user"))
        .json(&json!({
            "email": email,
            "password": "another_password",
            "gender": "FEMALE"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "User with that email already exist");
}

#[tokio::test]
async fn test_signup_rejects_unknown_gender() {
    let app = common::spawn_app().await;

    let resp = app
        .client
        .post(app.url("/user"))
        .json(&json!({
            "email": common::unique_email("gender"),
            "password": common::TEST_PASSWORD,
            "gender": "OTHER"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn test_get_me() {
    let app = common::spawn_app().await;
    let (user_id, token) = common::create_test_user(&app, "me").await;

    let resp = app
        .client
        .get(app.url("/user/me"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["id"], user_id);
}

#[tokio::test]
async fn test_get_user_with_topics() {
    let app = common::spawn_app().await;
    let (user_id, token) = common::create_test_user(&app, "withtopics").await;
    common::create_test_topic(&app, &token, "First").await;
    common::create_test_topic(&app, &token, "Second").await;

    let resp = app
        .client
        .get(app.url(&format!("/user/{}", user_id)))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["id"], user_id);
    assert_eq!(body["data"]["topics"].as_array().unwrap().len(), 2);

    let resp = app
        .client
        .get(app.url("/user/999999"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn test_list_users() {
    let app = common::spawn_app().await;
    common::create_test_user(&app, "list").await;
    common::create_test_user(&app, "list").await;

    let resp = app.client.get(app.url("/user")).send().await.unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_update_profile() {
    let app = common::spawn_app().await;
    let (_, token) = common::create_test_user(&app, "update").await;

    let resp = app
        .client
        .put(app.url("/user"))
        .bearer_auth(&token)
        .json(&json!({ "firstName": "Renamed", "gender": "MALE" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["firstName"], "Renamed");
    assert_eq!(body["data"]["lastName"], "User");
    assert_eq!(body["data"]["gender"], "MALE");
}

#[tokio::test]
async fn test_update_profile_email_taken() {
    let app = common::spawn_app().await;
    let taken = common::unique_email("taken");
    common::signup(&app, &taken).await;
    let (_, token) = common::create_test_user(&app, "mover").await;

    let resp = app
        .client
        .put(app.url("/user"))
        .bearer_auth(&token)
        .json(&json!({ "email": taken }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "User already exists with that email");
}

#[tokio::test]
async fn test_change_password_flow() {
    let app = common::spawn_app().await;
    let email = common::unique_email("pw");
    common::signup(&app, &email).await;
    let body: Value = common::login(&app, &email, common::TEST_PASSWORD)
        .await
        .json()
        .await
        .unwrap();
    let token = body["data"]["access_token"].as_str().unwrap().to_string();

    // Wrong old password
    let resp = app
        .client
        .post(app.url("/user/change-password"))
        .bearer_auth(&token)
        .json(&json!({
            "oldPassword": "wrong",
            "newPassword": "new_password_456",
            "confirmPassword": "new_password_456"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);

    // Confirmation mismatch
    let resp = app
        .client
        .post(app.url("/user/change-password"))
        .bearer_auth(&token)
        .json(&json!({
            "oldPassword": common::TEST_PASSWORD,
            "newPassword": "new_password_456",
            "confirmPassword": "something_else"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "Confirmation password does not match");

    // Success
    let resp = app
        .client
        .post(app.url("/user/change-password"))
        .bearer_auth(&token)
        .json(&json!({
            "oldPassword": common::TEST_PASSWORD,
            "newPassword": "new_password_456",
            "confirmPassword": "new_password_456"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let resp = common::login(&app, &email, common::TEST_PASSWORD).await;
    assert_eq!(resp.status(), 401);
    let resp = common::login(&app, &email, "new_password_456").await;
    assert_eq!(resp.status(), 200);
}

#[tokio::test]
async fn test_delete_user_cascades() {
    let app = common::spawn_app().await;
    let (alice_id, alice) = common::create_test_user(&app, "alice").await;
    let (bob_id, bob) = common::create_test_user(&app, "bob").await;

    let alice_topic = common::create_test_topic(&app, &alice, "Alice's topic").await;
    let bob_topic = common::create_test_topic(&app, &bob, "Bob's topic").await;
    common::create_test_comment(&app, &alice, bob_topic, "alice on bob").await;
    common::create_test_comment(&app, &bob, alice_topic, "bob on alice").await;
    common::like(&app, &bob, &format!("/topics/{}/like", alice_topic), "LIKE").await;
    common::like(&app, &alice, &format!("/topics/{}/like", bob_topic), "LIKE").await;

    let resp = app
        .client
        .delete(app.url("/user"))
        .bearer_auth(&alice)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    assert!(User::find_by_id(alice_id).one(&app.db).await.unwrap().is_none());
    assert!(User::find_by_id(bob_id).one(&app.db).await.unwrap().is_some());

    let alice_topics = Topic::find()
        .filter(topic::Column::PostedById.eq(alice_id))
        .count(&app.db)
        .await
        .unwrap();
    assert_eq!(alice_topics, 0);

    let alice_comments = Comment::find()
        .filter(comment::Column::AuthorId.eq(alice_id))
        .count(&app.db)
        .await
        .unwrap();
    assert_eq!(alice_comments, 0);

    // Bob's comment lived under Alice's topic and went with it.
    let remaining_comments = Comment::find().count(&app.db).await.unwrap();
    assert_eq!(remaining_comments, 0);

    let alice_likes = Like::find()
        .filter(like::Column::UserId.eq(alice_id))
        .count(&app.db)
        .await
        .unwrap();
    assert_eq!(alice_likes, 0);
    assert_eq!(Like::find().count(&app.db).await.unwrap(), 0);

    // Bob's own topic survives.
    assert!(Topic::find_by_id(bob_topic).one(&app.db).await.unwrap().is_some());
}

#[tokio::test]
async fn test_top_commenters() {
    let app = common::spawn_app().await;
    let (busy_id, busy) = common::create_test_user(&app, "busy").await;
    let (quiet_id, quiet) = common::create_test_user(&app, "quiet").await;
    let (_, silent) = common::create_test_user(&app, "silent").await;
    let topic_id = common::create_test_topic(&app, &silent, "Discussion").await;

    for i in 0..3 {
        common::create_test_comment(&app, &busy, topic_id, &format!("busy {}", i)).await;
    }
    common::create_test_comment(&app, &quiet, topic_id, "quiet").await;

    let resp = app
        .client
        .get(app.url("/user/top-commenters"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    let rows = body["data"].as_array().unwrap();

    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0]["id"], busy_id);
    assert_eq!(rows[0]["commentCount"], "3");
    assert_eq!(rows[1]["id"], quiet_id);
    assert_eq!(rows[1]["commentCount"], "1");
    assert_eq!(rows[2]["commentCount"], "0");
}
