#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Mutex;

use anyhow::{Context, Result};
use axum::{
    extract::RawQuery,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use pickleball_portal::config::ApiConfig;
use pickleball_portal::guard::{Navigator, Notifier, Severity};
use serde_json::{json, Value};

pub const TOKEN: &str = "tok-coach-123";
pub const PASSWORD: &str = "dink-and-drive";

/// In-process stand-in for the portal backend, bound to an ephemeral port.
pub struct StubBackend {
    pub addr: SocketAddr,
}

impl StubBackend {
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn api_config(&self) -> ApiConfig {
        ApiConfig::new(&self.base_url(), "v1").expect("stub base url is valid")
    }
}

pub async fn spawn_backend() -> Result<StubBackend> {
    let app = Router::new()
        .route("/api/v1/auth/login", post(login))
        .route("/api/v1/courses", get(courses))
        .route("/api/v1/payments", get(payments));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .context("failed to bind stub backend")?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    Ok(StubBackend { addr })
}

async fn login(Json(body): Json<Value>) -> impl IntoResponse {
    if body["password"] != json!(PASSWORD) {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "success": false, "error": "bad credentials" })),
        );
    }
    (
        StatusCode::OK,
        Json(json!({
            "success": true,
            "data": {
                "token": TOKEN,
                "user": { "id": 42, "email": body["email"], "role": "COACH" }
            }
        })),
    )
}

async fn courses(headers: HeaderMap, RawQuery(query): RawQuery) -> impl IntoResponse {
    let authorized = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(|v| v == format!("Bearer {}", TOKEN))
        .unwrap_or(false);
    if !authorized {
        return (StatusCode::UNAUTHORIZED, Json(json!({ "error": "unauthorized" })));
    }
    (
        StatusCode::OK,
        Json(json!({ "items": [{ "id": 1, "title": "Third-shot drops" }], "query": query })),
    )
}

async fn payments() -> impl IntoResponse {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": "payment provider offline" })),
    )
}

#[derive(Default)]
pub struct RecordingNavigator {
    paths: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    pub fn paths(&self) -> Vec<String> {
        self.paths.lock().unwrap().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn replace(&self, path: &str) {
        self.paths.lock().unwrap().push(path.to_string());
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<(Severity, String)>>,
}

impl RecordingNotifier {
    pub fn notices(&self) -> Vec<(Severity, String)> {
        self.notices.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn warn(&self, message: &str) {
        self.notices.lock().unwrap().push((Severity::Warn, message.to_string()));
    }

    fn error(&self, message: &str) {
        self.notices.lock().unwrap().push((Severity::Error, message.to_string()));
    }
}
