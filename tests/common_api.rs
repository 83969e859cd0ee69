mod common;

use axum::http::StatusCode;
use common::TestApp;

#[tokio::test]
async fn health_ready_version() {
    let app = TestApp::new();
    let health = app.get("/health").await;
    assert_eq!(health.status, StatusCode::OK);
    assert_eq!(health.body["status"], "ok");

    let ready = app.get("/ready").await;
    assert_eq!(ready.status, StatusCode::OK);
    assert_eq!(ready.body["database"], "ok");

    let version = app.get("/version").await;
    assert_eq!(version.body["name"], "campus-records");
}

#[tokio::test]
async fn unknown_route_is_404() {
    let app = TestApp::new();
    assert_eq!(app.get("/courses").await.status, StatusCode::NOT_FOUND);
}
