use axum::Json;
use serde_json::{Value, json};
use tracing::debug;

/// Handler for GET /health
pub async fn health_handler() -> Json<Value> {
    debug!("Health check requested");
    Json(json!({ "ok": true }))
}
