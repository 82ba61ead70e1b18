mod common;

use serde_json::{json, Value};

#[tokio::test]
async fn test_health_check() {
    let app = common::spawn_app().await;

    let resp = app.client.get(app.url("/")).send().await.unwrap();
    assert_eq!(resp.status(), 200);
}

#[tokio::test]
async fn test_full_like_flow_between_two_users() {
    let app = common::spawn_app().await;

    // A signs up, logs in and opens a topic.
    let (a_id, a_token) = common::create_test_user(&app, "flow_a").await;
    let resp = app
        .client
        .post(app.url("/topics"))
        .bearer_auth(&a_token)
        .json(&json!({
            "title": "What should we build?",
            "description": "Ideas welcome",
            "category": "GENERAL"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    let topic_id = body["data"]["id"].as_i64().unwrap();

    // B signs up, logs in and likes it.
    let (b_id, b_token) = common::create_test_user(&app, "flow_b").await;
    let resp = common::like(&app, &b_token, &format!("/topics/{}/like", topic_id), "LIKE").await;
    assert_eq!(resp.status(), 200);

    // Seen by B.
    let body: Value = app
        .client
        .get(app.url(&format!("/topics/{}?userId={}", topic_id, b_id)))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["data"]["likes"], "1");
    assert_eq!(body["data"]["dislikes"], "0");
    assert_eq!(body["data"]["userLikeStatus"], "LIKE");

    // Seen by A, who has not voted.
    let body: Value = app
        .client
        .get(app.url(&format!("/topics/{}?userId={}", topic_id, a_id)))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["data"]["likes"], "1");
    assert!(body["data"]["userLikeStatus"].is_null());

    // The listing reports the same aggregates.
    let body: Value = app
        .client
        .get(app.url(&format!("/topics/all?userId={}", b_id)))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let item = &body["data"]["items"][0];
    assert_eq!(item["id"], topic_id);
    assert_eq!(item["likes"], "1");
    assert_eq!(item["userLikeStatus"], "LIKE");

    // B comments; A replies; A's comment gets B's dislike.
    let b_comment = common::create_test_comment(&app, &b_token, topic_id as i32, "Ship it").await;
    let a_comment = common::create_test_comment(&app, &a_token, topic_id as i32, "Agreed").await;
    common::like(&app, &b_token, &format!("/comments/{}/like", a_comment), "DISLIKE").await;
    common::like(&app, &a_token, &format!("/comments/{}/like", b_comment), "LIKE").await;

    let body: Value = app
        .client
        .get(app.url(&format!("/comments/all/{}?userId={}", topic_id, a_id)))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let items = body["data"].as_array().unwrap();
    assert_eq!(items[0]["id"], b_comment);
    assert_eq!(items[0]["userLikeStatus"], "LIKE");
    assert_eq!(items[1]["id"], a_comment);
    assert_eq!(items[1]["dislikes"], "1");
    assert!(items[1]["userLikeStatus"].is_null());
}
