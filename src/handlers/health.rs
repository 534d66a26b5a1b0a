// src/handlers/health.rs

use axum::{Json, response::IntoResponse};
use serde_json::json;

pub async fn health() -> impl IntoResponse {
    Json(json!({
        "success": true,
        "status": "ok",
        "timestamp": chrono::Utc::now(),
    }))
}
