use std::time::Duration;

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
};
use chrono::Utc;
use serde_json::{json, Value as JsonValue};
use tower::ServiceExt;
use uuid::Uuid;

use examlock_backend::config::{default_departments, Config};
use examlock_backend::models::test_result::TestResult;
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

fn multipart_import(csv: &str, department: &str) -> Request<Body> {
    let boundary = "X-IMPORT-BOUNDARY";
    let mut body = String::new();
    for (name, value) in [
        ("title", "Imported Quiz"),
        ("department", department),
        ("timeLimit", "10"),
    ] {
        body.push_str(&format!(
            "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
            boundary, name, value
        ));
    }
    body.push_str(&format!(
        "--{}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"questions.csv\"\r\nContent-Type: text/csv\r\n\r\n{}\r\n--{}--\r\n",
        boundary, csv, boundary
    ));

    Request::builder()
        .method("POST")
        .uri("/api/admin/tests/import")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={}", boundary),
        )
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn create_list_delete_tests() {
    let dir = tempfile::tempdir().unwrap();
    let state = AppState::new(test_config(dir.path())).await.unwrap();
    let app = examlock_backend::router(state);

    let payload = json!({
        "title": "Arithmetic",
        "timeLimit": 10,
        "department": "QA",
        "questions": [{
            "question": "What is 2 + 2?",
            "options": ["3", "4", "5", "6"],
            "correctAnswer": "4",
            "points": 10
        }]
    });
    let resp = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/admin/tests")
                .header("content-type", "application/json")
                .body(Body::from(payload.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created = body_json(resp).await;
    let test_id = created["testId"].as_str().unwrap().to_string();

    let resp = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/admin/tests")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let grouped = body_json(resp).await;
    assert_eq!(grouped["QA"].as_array().unwrap().len(), 1);
    assert_eq!(grouped["QA"][0]["description"], "A new test for QA.");

    let resp = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/admin/tests/{}", test_id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/admin/tests/{}", test_id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn rejects_invalid_test_payloads() {
    let dir = tempfile::tempdir().unwrap();
    let state = AppState::new(test_config(dir.path())).await.unwrap();
    let app = examlock_backend::router(state.clone());

    // Correct answer not among the options.
    let payload = json!({
        "title": "Broken",
        "timeLimit": 10,
        "department": "QA",
        "questions": [{
            "question": "What is 2 + 2?",
            "options": ["3", "5"],
            "correctAnswer": "4",
            "points": 10
        }]
    });
    let resp = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/admin/tests")
                .header("content-type", "application/json")
                .body(Body::from(payload.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    // No side effects.
    assert!(state.test_service.list_grouped().await.is_empty());
}

#[tokio::test]
async fn imports_a_question_file() {
    let dir = tempfile::tempdir().unwrap();
    let state = AppState::new(test_config(dir.path())).await.unwrap();
    let app = examlock_backend::router(state.clone());

    let csv = "Question,Option A,Option B,Option C,Option D,Answer,Point\n\
               What is the capital of France?,Berlin,Madrid,Paris,Rome,Paris,10\n\
               What is 2 + 2?,3,4,5,6,4,10\n";
    let resp = app.clone().oneshot(multipart_import(csv, "General")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let imported = body_json(resp).await;
    assert_eq!(imported["questionCount"], 2);

    let grouped = state.test_service.list_grouped().await;
    assert_eq!(grouped["General"].len(), 1);
    assert_eq!(grouped["General"][0].questions.len(), 2);
}

#[tokio::test]
async fn a_bad_row_aborts_the_import_with_its_row_number() {
    let dir = tempfile::tempdir().unwrap();
    let state = AppState::new(test_config(dir.path())).await.unwrap();
    let app = examlock_backend::router(state.clone());

    let csv = "Question,Option A,Option B,Option C,Option D,Answer,Point\n\
               What is the capital of France?,Berlin,Madrid,Paris,Rome,Paris,10\n\
               What is 2 + 2?,3,4,5,6,7,10\n";
    let resp = app.clone().oneshot(multipart_import(csv, "General")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let error = body_json(resp).await;
    assert!(error["error"].as_str().unwrap().contains("Row 3"));

    // Nothing was written.
    assert!(state.test_service.list_grouped().await.is_empty());
}

fn sample_result(user_id: Uuid) -> TestResult {
    TestResult {
        id: Uuid::new_v4(),
        user_id,
        first_name: "Alice".to_string(),
        last_name: "Smith".to_string(),
        department: "QA".to_string(),
        test_id: Uuid::new_v4(),
        test_title: "General Knowledge Quiz".to_string(),
        score: 35,
        total_points: 55,
        answers: vec![],
        auto_submit_reason: None,
        submitted_at: Utc::now(),
    }
}

#[tokio::test]
async fn lists_deletes_and_exports_results() {
    let dir = tempfile::tempdir().unwrap();
    let state = AppState::new(test_config(dir.path())).await.unwrap();
    let result_id = state
        .result_store
        .save(sample_result(Uuid::new_v4()))
        .await
        .unwrap();
    let app = examlock_backend::router(state);

    let resp = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/admin/results")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let results = body_json(resp).await;
    assert_eq!(results.as_array().unwrap().len(), 1);

    let resp = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/admin/results/export")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers().get(header::CONTENT_TYPE).unwrap(),
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
    );
    let bytes = to_bytes(resp.into_body(), 10 * 1024 * 1024).await.unwrap();
    assert_eq!(&bytes[..2], b"PK");

    let resp = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/admin/results/{}", result_id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/admin/results/{}", result_id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
