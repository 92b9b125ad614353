use axum::{Json, response::IntoResponse};
use serde_json::json;

/// Static welcome response for the root path.
pub async fn root() -> impl IntoResponse {
    Json(json!({ "message": "Welcome to beacon-server" }))
}

/// Liveness probe: returns 200 OK as long as the server is running.
pub async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}
