//! In-process test client: the full router over a fresh `MemoryStore`, driven with `oneshot`.
#![allow(dead_code)]

pub mod postgres;

use axum::body::Body;
use axum::http::{header::CONTENT_TYPE, Method, Request, StatusCode};
use axum::Router;
use campus_records::{build_router, AppState, MemoryStore, Store};
use http_body_util::BodyExt;
use serde_json::Value;
use std::sync::Arc;
use tower::util::ServiceExt;

pub struct TestApp {
    router: Router,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

const BODY_LIMIT: usize = 64 * 1024;

impl TestApp {
    pub fn new() -> Self {
        Self::with_store(Arc::new(MemoryStore::new()))
    }

    pub fn with_store(store: Arc<dyn Store>) -> Self {
        Self::build(store, BODY_LIMIT)
    }

    pub fn with_body_limit(body_limit_bytes: usize) -> Self {
        Self::build(Arc::new(MemoryStore::new()), body_limit_bytes)
    }

    fn build(store: Arc<dyn Store>, body_limit_bytes: usize) -> Self {
        TestApp {
            router: build_router(AppState::new(store), body_limit_bytes),
        }
    }

    pub async fn send(&self, method: Method, path: &str, body: Option<Value>) -> TestResponse {
        let builder = Request::builder().method(method).uri(path);
        let request = match body {
            Some(json) => builder
                .header(CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.dispatch(request).await
    }

    pub async fn send_raw(&self, method: Method, path: &str, raw: &str) -> TestResponse {
        let request = Request::builder()
            .method(method)
            .uri(path)
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(raw.to_string()))
            .unwrap();
        self.dispatch(request).await
    }

    /// Sends `raw` with no `Content-Type` header at all.
    pub async fn send_untyped(&self, method: Method, path: &str, raw: &str) -> TestResponse {
        let request = Request::builder()
            .method(method)
            .uri(path)
            .body(Body::from(raw.to_string()))
            .unwrap();
        self.dispatch(request).await
    }

    async fn dispatch(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice::<Value>(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };
        TestResponse { status, body }
    }

    pub async fn get(&self, path: &str) -> TestResponse {
        self.send(Method::GET, path, None).await
    }

    pub async fn post(&self, path: &str, body: Value) -> TestResponse {
        self.send(Method::POST, path, Some(body)).await
    }

    pub async fn patch(&self, path: &str, body: Value) -> TestResponse {
        self.send(Method::PATCH, path, Some(body)).await
    }

    pub async fn delete(&self, path: &str) -> TestResponse {
        self.send(Method::DELETE, path, None).await
    }
}

/// A valid 12-digit national ID derived from `n`.
pub fn aadhar(n: u32) -> String {
    format!("{:012}", n)
}

pub fn student_body(name: &str, n: u32) -> Value {
    serde_json::json!({"name": name, "dateOfBirth": "2003-09-14", "aadharNumber": aadhar(n)})
}

pub fn professor_body(name: &str, seniority: &str, n: u32) -> Value {
    serde_json::json!({"name": name, "seniority": seniority, "aadharNumber": aadhar(n)})
}
