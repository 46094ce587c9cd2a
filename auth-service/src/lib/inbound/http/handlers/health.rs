use axum::http::StatusCode;
use axum::Json;
use serde_json::json;
use serde_json::Value;

/// Liveness probe. Touches no dependency.
pub async fn health() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "ok" })))
}
