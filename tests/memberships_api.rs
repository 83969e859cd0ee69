mod common;

use axum::http::StatusCode;
use common::{student_body, TestApp};
use serde_json::json;

fn membership() -> serde_json::Value {
    json!({"issueDate": "2024-07-01", "expiryDate": "2025-06-30"})
}

#[tokio::test]
async fn membership_lifecycle() {
    let app = TestApp::new();
    app.post("/students", student_body("Asha", 1)).await;
    let path = "/students/1/library-membership";

    assert_eq!(app.get(path).await.status, StatusCode::NOT_FOUND);

    let created = app.post(path, membership()).await;
    assert_eq!(created.status, StatusCode::CREATED);
    assert_eq!(created.body["studentId"], 1);
    assert_eq!(created.body["expiryDate"], "2025-06-30");

    let fetched = app.get(path).await;
    assert_eq!(fetched.status, StatusCode::OK);
    assert_eq!(fetched.body, created.body);

    let updated = app.patch(path, json!({"expiryDate": "2026-06-30"})).await;
    assert_eq!(updated.status, StatusCode::OK);
    assert_eq!(updated.body["expiryDate"], "2026-06-30");
    assert_eq!(updated.body["issueDate"], "2024-07-01");

    let deleted = app.delete(path).await;
    assert_eq!(deleted.status, StatusCode::OK);
    assert_eq!(deleted.body["message"], "library membership deleted");
    assert_eq!(app.get(path).await.status, StatusCode::NOT_FOUND);
    assert_eq!(app.delete(path).await.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn second_membership_is_500() {
    let app = TestApp::new();
    app.post("/students", student_body("Asha", 1)).await;
    let path = "/students/1/library-membership";
    assert_eq!(app.post(path, membership()).await.status, StatusCode::CREATED);
    let res = app.post(path, membership()).await;
    assert_eq!(res.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(res.body["error"].is_string());
}

#[tokio::test]
async fn invalid_membership_payloads() {
    let app = TestApp::new();
    app.post("/students", student_body("Asha", 1)).await;
    let path = "/students/1/library-membership";
    let bad_date = app.post(path, json!({"issueDate": "2024/07/01", "expiryDate": "2025-06-30"})).await;
    assert_eq!(bad_date.status, StatusCode::BAD_REQUEST);
    let reversed = app.post(path, json!({"issueDate": "2025-07-01", "expiryDate": "2024-06-30"})).await;
    assert_eq!(reversed.status, StatusCode::BAD_REQUEST);
    let unknown = app.patch(path, json!({"studentId": 2})).await;
    assert_eq!(unknown.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn membership_for_missing_student_is_404() {
    let app = TestApp::new();
    let res = app.post("/students/8/library-membership", membership()).await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn student_holding_membership_cannot_be_deleted() {
    let app = TestApp::new();
    app.post("/students", student_body("Asha", 1)).await;
    app.post("/students/1/library-membership", membership()).await;
    assert_eq!(app.delete("/students/1").await.status, StatusCode::INTERNAL_SERVER_ERROR);
    app.delete("/students/1/library-membership").await;
    assert_eq!(app.delete("/students/1").await.status, StatusCode::OK);
}
