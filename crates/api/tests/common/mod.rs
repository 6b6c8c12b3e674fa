#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use remix_api::config::ServerConfig;
use remix_api::router::build_app_router;
use remix_api::state::AppState;
use remix_pipeline::collaborators::Collaborators;
use remix_pipeline::toolkit::Toolkit;
use remix_pipeline::{Dispatcher, PipelineRunner};
use remix_storage::ObjectStorage;
use remix_tools::config::ToolConfig;
use tower::ServiceExt;

/// A source URL nothing listens on; fetches fail immediately.
pub const UNREACHABLE_URL: &str = "http://127.0.0.1:9/track.wav";

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
    }
}

/// A local-backend dispatcher with real adapters, short download timeout
/// and no object storage.
pub fn test_dispatcher() -> Arc<Dispatcher> {
    let tools = ToolConfig {
        download_timeout: Duration::from_secs(2),
        ..ToolConfig::default()
    };
    let toolkit = Toolkit::new(tools, ObjectStorage::unconfigured("OSS_ENDPOINT"));
    let runner = PipelineRunner::new(Collaborators::uniform(Arc::new(toolkit)));
    Arc::new(Dispatcher::local(runner, 2))
}

/// Build the full application router around `dispatcher`.
pub fn build_app_with(dispatcher: Arc<Dispatcher>) -> Router {
    let config = test_config();
    let state = AppState {
        config: Arc::new(config.clone()),
        dispatcher,
        storage: ObjectStorage::unconfigured("OSS_ENDPOINT"),
    };
    build_app_router(state, &config)
}

/// Build the full application router with a fresh local dispatcher.
pub fn build_test_app() -> Router {
    build_app_with(test_dispatcher())
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
