#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use peekit_core::plan::Plan;
use peekit_core::types::EntityId;
use peekit_db::memory::MemoryStore;
use peekit_db::models::profile::UpsertProfile;
use peekit_db::store::StudioStore;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use peekit_api::auth::jwt::{generate_access_token, JwtConfig};
use peekit_api::config::{ServerConfig, StoreBackend};
use peekit_api::router::build_app_router;
use peekit_api::state::AppState;
use peekit_api::storage::LocalBlobStorage;

pub const PUBLIC_ORIGIN: &str = "https://peekit.test";
pub const FILES_URL: &str = "http://files.test";

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config(storage_root: PathBuf) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        jwt: JwtConfig {
            secret: "test-secret-do-not-use-in-production".to_string(),
            access_token_expiry_mins: 60,
        },
        public_origin: PUBLIC_ORIGIN.to_string(),
        storage_root,
        storage_public_url: FILES_URL.to_string(),
        max_upload_bytes: 1024 * 1024,
        store_backend: StoreBackend::Memory,
    }
}

/// The production router over an in-memory store and a temporary upload
/// directory.
pub struct TestApp {
    pub router: Router,
    pub store: Arc<dyn StudioStore>,
    pub config: ServerConfig,
    storage_dir: TempDir,
}

impl TestApp {
    pub fn storage_root(&self) -> &std::path::Path {
        self.storage_dir.path()
    }

    /// A bearer token for `user_id`.
    pub fn token(&self, user_id: EntityId) -> String {
        generate_access_token(user_id, "owner", &self.config.jwt).unwrap()
    }
}

pub fn build_test_app() -> TestApp {
    build_test_app_with_store(Arc::new(MemoryStore::new()))
}

pub fn build_test_app_with_store(store: Arc<dyn StudioStore>) -> TestApp {
    let storage_dir = tempfile::tempdir().unwrap();
    let config = test_config(storage_dir.path().to_path_buf());
    let state = AppState {
        store: Arc::clone(&store),
        storage: Arc::new(LocalBlobStorage::new(storage_dir.path(), FILES_URL)),
        config: Arc::new(config.clone()),
    };
    TestApp {
        router: build_app_router(state, &config),
        store,
        config,
        storage_dir,
    }
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

fn request(method: Method, uri: &str, token: Option<&str>) -> axum::http::request::Builder {
    let builder = Request::builder().method(method).uri(uri);
    match token {
        Some(t) => builder.header("authorization", format!("Bearer {t}")),
        None => builder,
    }
}

pub async fn send(app: &TestApp, req: Request<Body>) -> Response<Body> {
    app.router.clone().oneshot(req).await.unwrap()
}

pub async fn get(app: &TestApp, uri: &str, token: Option<&str>) -> Response<Body> {
    send(app, request(Method::GET, uri, token).body(Body::empty()).unwrap()).await
}

pub async fn delete(app: &TestApp, uri: &str, token: Option<&str>) -> Response<Body> {
    send(app, request(Method::DELETE, uri, token).body(Body::empty()).unwrap()).await
}

pub async fn post_empty(app: &TestApp, uri: &str, token: Option<&str>) -> Response<Body> {
    send(app, request(Method::POST, uri, token).body(Body::empty()).unwrap()).await
}

pub async fn post_json(app: &TestApp, uri: &str, token: Option<&str>, body: Value) -> Response<Body> {
    json_request(app, Method::POST, uri, token, body).await
}

pub async fn put_json(app: &TestApp, uri: &str, token: Option<&str>, body: Value) -> Response<Body> {
    json_request(app, Method::PUT, uri, token, body).await
}

async fn json_request(
    app: &TestApp,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Value,
) -> Response<Body> {
    let req = request(method, uri, token)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap();
    send(app, req).await
}

/// One part of a multipart form.
pub struct Part {
    pub name: &'static str,
    pub file_name: Option<&'static str>,
    pub content_type: Option<&'static str>,
    pub data: Vec<u8>,
}

impl Part {
    pub fn file(file_name: &'static str, content_type: &'static str, data: &[u8]) -> Self {
        Self {
            name: "file",
            file_name: Some(file_name),
            content_type: Some(content_type),
            data: data.to_vec(),
        }
    }

    pub fn text(name: &'static str, value: &str) -> Self {
        Self {
            name,
            file_name: None,
            content_type: None,
            data: value.as_bytes().to_vec(),
        }
    }
}

const BOUNDARY: &str = "peekit-test-boundary";

pub async fn post_multipart(
    app: &TestApp,
    uri: &str,
    token: Option<&str>,
    parts: Vec<Part>,
) -> Response<Body> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        let disposition = match part.file_name {
            Some(f) => format!(
                "Content-Disposition: form-data; name=\"{}\"; filename=\"{f}\"\r\n",
                part.name
            ),
            None => format!("Content-Disposition: form-data; name=\"{}\"\r\n", part.name),
        };
        body.extend_from_slice(disposition.as_bytes());
        if let Some(ct) = part.content_type {
            body.extend_from_slice(format!("Content-Type: {ct}\r\n").as_bytes());
        }
        body.extend_from_slice(b"\r\n");
        body.extend_from_slice(&part.data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    let req = request(Method::POST, uri, token)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap();
    send(app, req).await
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// A signed-in studio that completed onboarding.
pub struct Studio {
    pub user_id: EntityId,
    pub token: String,
}

impl Studio {
    pub fn auth(&self) -> Option<&str> {
        Some(&self.token)
    }
}

pub async fn onboard(app: &TestApp, studio_name: &str) -> Studio {
    let user_id = EntityId::new_v4();
    let token = app.token(user_id);
    let response = post_json(
        app,
        "/api/v1/studio/onboarding",
        Some(&token),
        serde_json::json!({ "studio_name": studio_name }),
    )
    .await;
    assert_eq!(response.status(), axum::http::StatusCode::CREATED);
    Studio { user_id, token }
}

/// Move an onboarded studio to another plan.
pub async fn set_plan(app: &TestApp, studio: &Studio, studio_name: &str, plan: Plan) {
    app.store
        .upsert_profile(
            studio.user_id,
            &UpsertProfile {
                studio_name: studio_name.to_string(),
                plan: Some(plan),
                ..Default::default()
            },
        )
        .await
        .unwrap();
}

/// Create a project and return its JSON detail.
pub async fn create_project(app: &TestApp, studio: &Studio, body: Value) -> Value {
    let response = post_json(app, "/api/v1/projects", studio.auth(), body).await;
    assert_eq!(response.status(), axum::http::StatusCode::CREATED);
    body_json(response).await["data"].clone()
}

pub fn project_body(client_name: &str) -> Value {
    serde_json::json!({
        "client_name": client_name,
        "client_email": "client@example.com",
        "project_type": "Mariage",
        "location": "Lyon",
    })
}

/// Three short steps `a`, `b`, `c`.
pub fn abc_steps() -> Value {
    serde_json::json!([
        { "id": "a", "label": "A", "message": "ma", "minDays": 0, "maxDays": 1 },
        { "id": "b", "label": "B", "message": "mb", "minDays": 0, "maxDays": 1 },
        { "id": "c", "label": "C", "message": "mc", "minDays": 0, "maxDays": 1 },
    ])
}
