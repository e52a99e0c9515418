use axum::{extract::Extension, response::Json};
use serde_json::{json, Value};

use crate::auth::Claims;

fn page(name: &str, claims: Option<&Claims>) -> Json<Value> {
    Json(json!({
        "success": true,
        "data": {
            "page": name,
            "user": claims.map(|c| json!({ "id": c.sub, "role": c.role })),
        }
    }))
}

pub async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "success": true,
        "data": {
            "name": "Pickleball Portal",
            "version": version,
            "pages": {
                "public": ["/", "/signin"],
                "admin": ["/dashboard", "/admin/users", "/admin/coaches", "/admin/credentials", "/admin/payments"],
                "coach": ["/coach/courses"],
                "learner": ["/learn/courses"],
            }
        }
    }))
}

pub async fn health() -> Json<Value> {
    Json(json!({
        "success": true,
        "data": {
            "status": "ok",
            "timestamp": chrono::Utc::now(),
        }
    }))
}

pub async fn signin() -> Json<Value> {
    page("signin", None)
}

pub async fn dashboard(Extension(claims): Extension<Claims>) -> Json<Value> {
    page("dashboard", Some(&claims))
}

pub async fn users(Extension(claims): Extension<Claims>) -> Json<Value> {
    page("users", Some(&claims))
}

pub async fn coaches(Extension(claims): Extension<Claims>) -> Json<Value> {
    page("coaches", Some(&claims))
}

pub async fn credentials(Extension(claims): Extension<Claims>) -> Json<Value> {
    page("credentials", Some(&claims))
}

pub async fn payments(Extension(claims): Extension<Claims>) -> Json<Value> {
    page("payments", Some(&claims))
}

pub async fn coach_courses(Extension(claims): Extension<Claims>) -> Json<Value> {
    page("coach-courses", Some(&claims))
}

pub async fn learner_courses(Extension(claims): Extension<Claims>) -> Json<Value> {
    page("learner-courses", Some(&claims))
}
