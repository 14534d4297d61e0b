//! Shared helpers for HTTP-level integration tests.
//!
//! Requests are driven through the full router with `tower::ServiceExt`,
//! without binding a TCP listener.

#![allow(dead_code)]

use std::path::PathBuf;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::SqlitePool;
use tower::ServiceExt;

use focus_api::config::ServerConfig;
use focus_api::router::build_app_router;
use focus_api::state::AppState;

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        database_path: PathBuf::from(":memory:"),
        log_level: "debug".to_string(),
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        rate_limit_max_requests: 10_000,
        rate_limit_window_secs: 60,
        max_body_bytes: 10 * 1024 * 1024,
    }
}

/// Apply the schema to a fresh test database.
pub async fn migrate(pool: &SqlitePool) {
    focus_db::run_migrations(pool).await.unwrap();
}

/// Build the full application router, middleware included.
pub fn build_test_app(pool: SqlitePool) -> Router {
    build_app_with_config(pool, test_config())
}

pub fn build_app_with_config(pool: SqlitePool, config: ServerConfig) -> Router {
    let state = AppState::new(pool, config.clone());
    build_app_router(state, &config)
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn send(app: Router, request: Request<Body>) -> Response<Body> {
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(app, request).await
}

pub async fn delete(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::DELETE)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

async fn with_json(app: Router, method: Method, uri: &str, json: serde_json::Value) -> Response<Body> {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(json.to_string()))
        .unwrap();
    send(app, request).await
}

pub async fn post_json(app: Router, uri: &str, json: serde_json::Value) -> Response<Body> {
    with_json(app, Method::POST, uri, json).await
}

pub async fn put_json(app: Router, uri: &str, json: serde_json::Value) -> Response<Body> {
    with_json(app, Method::PUT, uri, json).await
}

pub async fn patch_json(app: Router, uri: &str, json: serde_json::Value) -> Response<Body> {
    with_json(app, Method::PATCH, uri, json).await
}

pub async fn post_empty(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

/// Create a project through the API and return its id.
pub async fn create_project(app: &Router, name: &str) -> i64 {
    let response = post_json(
        app.clone(),
        "/api/v1/projects",
        serde_json::json!({"name": name, "color": "#3366FF", "icon": "folder"}),
    )
    .await;
    body_json(response).await["data"]["id"].as_i64().unwrap()
}

/// Create a task through the API and return its id.
pub async fn create_task(app: &Router, project_id: i64, title: &str, priority: i64) -> i64 {
    let response = post_json(
        app.clone(),
        "/api/v1/tasks",
        serde_json::json!({"project_id": project_id, "title": title, "priority": priority}),
    )
    .await;
    body_json(response).await["data"]["id"].as_i64().unwrap()
}
