use std::time::Duration;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
};
use serde_json::{json, Value as JsonValue};
use tower::ServiceExt;

use examlock_backend::config::{default_departments, Config};
use examlock_backend::AppState;

fn test_config(data_dir: &std::path::Path) -> Config {
    Config {
        server_address: "127.0.0.1:0".to_string(),
        data_dir: data_dir.to_path_buf(),
        public_rps: 100,
        admin_rps: 100,
        focus_debounce: Duration::from_millis(100),
        departments: default_departments(),
    }
}

async fn body_json(resp: axum::response::Response) -> JsonValue {
    let bytes = to_bytes(resp.into_body(), 1024 * 1024).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn post_json(uri: &str, body: JsonValue) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn signup_body(email: &str) -> JsonValue {
    json!({
        "email": email,
        "password": "hunter2",
        "firstName": "Alice",
        "lastName": "Smith",
        "department": "QA"
    })
}

#[tokio::test]
async fn signup_login_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let state = AppState::new(test_config(dir.path())).await.unwrap();
    let app = examlock_backend::router(state);

    let resp = app
        .clone()
        .oneshot(post_json("/api/auth/signup", signup_body("alice@example.com")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created = body_json(resp).await;
    let user_id = created["userId"].as_str().unwrap().to_string();

    let resp = app
        .clone()
        .oneshot(post_json(
            "/api/auth/login",
            json!({ "email": "Alice@Example.com", "password": "hunter2" }),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let logged_in = body_json(resp).await;
    assert_eq!(logged_in["user"]["id"].as_str().unwrap(), user_id);
    assert_eq!(logged_in["user"]["department"], "QA");
    // The password never comes back.
    assert!(logged_in["user"].get("password").is_none());
}

#[tokio::test]
async fn duplicate_email_conflicts() {
    let dir = tempfile::tempdir().unwrap();
    let state = AppState::new(test_config(dir.path())).await.unwrap();
    let app = examlock_backend::router(state);

    let resp = app
        .clone()
        .oneshot(post_json("/api/auth/signup", signup_body("alice@example.com")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);

    let resp = app
        .clone()
        .oneshot(post_json("/api/auth/signup", signup_body("ALICE@example.com")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn bad_credentials_are_unauthorized() {
    let dir = tempfile::tempdir().unwrap();
    let state = AppState::new(test_config(dir.path())).await.unwrap();
    let app = examlock_backend::router(state);

    app.clone()
        .oneshot(post_json("/api/auth/signup", signup_body("alice@example.com")))
        .await
        .unwrap();

    let resp = app
        .clone()
        .oneshot(post_json(
            "/api/auth/login",
            json!({ "email": "alice@example.com", "password": "wrong" }),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = app
        .clone()
        .oneshot(post_json(
            "/api/auth/login",
            json!({ "email": "nobody@example.com", "password": "hunter2" }),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn signup_validates_its_input() {
    let dir = tempfile::tempdir().unwrap();
    let state = AppState::new(test_config(dir.path())).await.unwrap();
    let app = examlock_backend::router(state);

    let resp = app
        .clone()
        .oneshot(post_json("/api/auth/signup", signup_body("not-an-email")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let mut missing = signup_body("bob@example.com");
    missing["firstName"] = json!("");
    let resp = app
        .clone()
        .oneshot(post_json("/api/auth/signup", missing))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}
