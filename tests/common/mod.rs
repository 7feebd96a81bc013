//! Common test utilities.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use tower::ServiceExt;

use students_api::server::{self, AppState};
use students_api::store::{MemoryStudentStore, SqliteStudentStore, StudentStore};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Create a test app backed by the in-memory store.
pub fn memory_app() -> Router {
    let store: Arc<dyn StudentStore> = Arc::new(MemoryStudentStore::new());
    server::build_app(AppState::new(store, "test"), REQUEST_TIMEOUT)
}

/// Create a test app backed by a SQLite file in a temporary directory.
pub fn sqlite_app() -> Router {
    use tempfile::TempDir;

    // Leak the TempDir so it doesn't get cleaned up during the test.
    // This is fine for tests - the OS will clean up on process exit.
    let tmp = Box::leak(Box::new(TempDir::new().unwrap()));
    let store: Arc<dyn StudentStore> =
        Arc::new(SqliteStudentStore::open(tmp.path().join("storage.db")).unwrap());
    server::build_app(AppState::new(store, "test"), REQUEST_TIMEOUT)
}

/// Build a request with a raw body.
pub fn request(method: &str, uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Send a request and decode the JSON response body.
pub async fn send(app: &Router, req: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json = if body.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&body).unwrap()
    };
    (status, json)
}

/// POST a student and return its id.
pub async fn create(app: &Router, name: &str, email: &str, age: i64) -> i64 {
    let body = serde_json::json!({"name": name, "email": email, "age": age}).to_string();
    let (status, json) = send(app, request("POST", "/api/students", &body)).await;
    assert_eq!(status, StatusCode::CREATED, "create failed: {json}");
    json["id"].as_i64().unwrap()
}
