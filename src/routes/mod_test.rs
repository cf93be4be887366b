use axum::body::{Body, to_bytes};
use axum::http::Request;
use tower::ServiceExt;

use super::*;
use crate::config::ServerConfig;
use crate::state::test_helpers;

#[tokio::test]
async fn healthz_returns_ok() {
    let app = app(test_helpers::test_app_state());
    let response = app
        .oneshot(Request::get("/healthz").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn unknown_path_is_not_found_without_static_dir() {
    let app = app(test_helpers::test_app_state());
    let response = app
        .oneshot(Request::get("/index.html").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn socket_route_requires_upgrade() {
    let app = app(test_helpers::test_app_state());
    let response = app
        .oneshot(Request::get("/socket").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn static_dir_is_served_as_fallback() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("index.html"), "<h1>Name Cheer</h1>").unwrap();

    let state = AppState::new(ServerConfig { static_dir: Some(dir.path().to_path_buf()), ..ServerConfig::default() });
    let response = app(state)
        .oneshot(Request::get("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = to_bytes(response.into_body(), 1024).await.unwrap();
    assert_eq!(&body[..], b"<h1>Name Cheer</h1>");
}
