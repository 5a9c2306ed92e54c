mod common;

use axum::http::StatusCode;
use social_api::db::PostRepository;
use social_common::{PostId, UserId};

async fn app_with_two_users() -> (common::TestApp, String, String) {
    let (app, _kv) = common::test_app();
    common::create_user(&app.repo, 14, "blink", "password").await;
    common::create_user(&app.repo, 15, "jisoo", "password2").await;
    let owner = common::login(&app.server, "blink", "password").await;
    let other = common::login(&app.server, "jisoo", "password2").await;
    (app, owner, other)
}

async fn create_post(app: &common::TestApp, token: &str, content: &str) -> i64 {
    let (name, value) = common::bearer(token);
    let resp = app
        .server
        .post("/users/14/posts")
        .add_header(name, value)
        .json(&serde_json::json!({ "content": content }))
        .await;
    resp.assert_status(StatusCode::CREATED);
    resp.json::<serde_json::Value>()["id"].as_i64().unwrap()
}

#[tokio::test]
async fn owner_creates_and_anyone_reads() {
    let (app, owner, _other) = app_with_two_users().await;
    let pid = create_post(&app, &owner, "TESTING").await;

    let post: serde_json::Value = app.server.get(&format!("/users/14/posts/{pid}")).await.json();
    assert_eq!(post["content"], "TESTING");
    assert_eq!(post["user_id"], 14);
    assert_eq!(post["likes"], 0);

    let list: Vec<serde_json::Value> = app.server.get("/users/14/posts").await.json();
    assert_eq!(list.len(), 1);
}

#[tokio::test]
async fn non_owner_cannot_post_on_someone_elses_behalf() {
    let (app, _owner, other) = app_with_two_users().await;

    let (name, value) = common::bearer(&other);
    let resp = app
        .server
        .post("/users/14/posts")
        .add_header(name, value)
        .json(&serde_json::json!({ "content": "spoofed" }))
        .await;

    resp.assert_status(StatusCode::UNAUTHORIZED);
    assert_eq!(resp.json::<serde_json::Value>()["error"]["code"], "NOT_OWNER");
    assert!(app
        .repo
        .list_for_user(UserId::new(14))
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn owner_updates_post() {
    let (app, owner, _other) = app_with_two_users().await;
    let pid = create_post(&app, &owner, "TESTING").await;

    let (name, value) = common::bearer(&owner);
    let resp = app
        .server
        .put(&format!("/users/14/posts/{pid}"))
        .add_header(name, value)
        .json(&serde_json::json!({ "content": "TESTING UPDATE", "likes": 1 }))
        .await;

    resp.assert_status_ok();
    let body: serde_json::Value = resp.json();
    assert_eq!(body["content"], "TESTING UPDATE");
    assert_eq!(body["likes"], 1);
}

#[tokio::test]
async fn non_owner_update_and_delete_leave_post_untouched() {
    let (app, owner, other) = app_with_two_users().await;
    let pid = create_post(&app, &owner, "TESTING").await;
    let path = format!("/users/14/posts/{pid}");

    let (name, value) = common::bearer(&other);
    app.server
        .put(&path)
        .add_header(name.clone(), value.clone())
        .json(&serde_json::json!({ "content": "defaced" }))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
    app.server
        .delete(&path)
        .add_header(name, value)
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    let stored = PostRepository::get(app.repo.as_ref(), UserId::new(14), PostId::new(pid))
        .await
        .unwrap()
        .expect("post still exists");
    assert_eq!(stored.content, "TESTING");
}

#[tokio::test]
async fn owner_deletes_post() {
    let (app, owner, _other) = app_with_two_users().await;
    let pid = create_post(&app, &owner, "TESTING").await;
    let path = format!("/users/14/posts/{pid}");

    let (name, value) = common::bearer(&owner);
    let resp = app.server.delete(&path).add_header(name, value).await;

    resp.assert_status_ok();
    assert_eq!(resp.json::<serde_json::Value>()["content"], "TESTING");
    app.server.get(&path).await.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn post_under_wrong_author_path_is_not_found() {
    let (app, owner, _other) = app_with_two_users().await;
    let pid = create_post(&app, &owner, "TESTING").await;

    app.server
        .get(&format!("/users/15/posts/{pid}"))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn empty_content_and_bad_ids_are_client_errors() {
    let (app, owner, _other) = app_with_two_users().await;

    let (name, value) = common::bearer(&owner);
    app.server
        .post("/users/14/posts")
        .add_header(name.clone(), value.clone())
        .json(&serde_json::json!({ "content": "   " }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
    app.server
        .delete("/users/14/posts/abc")
        .add_header(name, value)
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn non_owner_without_json_content_type_is_still_not_owner() {
    let (app, _owner, other) = app_with_two_users().await;

    let (name, value) = common::bearer(&other);
    let resp = app
        .server
        .post("/users/14/posts")
        .add_header(name, value)
        .text("spoofed")
        .await;

    resp.assert_status(StatusCode::UNAUTHORIZED);
    assert_eq!(resp.json::<serde_json::Value>()["error"]["code"], "NOT_OWNER");
}

#[tokio::test]
async fn owner_without_json_content_type_gets_error_envelope() {
    let (app, owner, _other) = app_with_two_users().await;

    let (name, value) = common::bearer(&owner);
    let resp = app
        .server
        .post("/users/14/posts")
        .add_header(name, value)
        .text("hello")
        .await;

    resp.assert_status(StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert_eq!(resp.json::<serde_json::Value>()["error"]["code"], "INVALID_BODY");
}
