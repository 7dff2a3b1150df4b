use agenda_core::observability;
use agenda_core::status::compute_status;
use agenda_models::PublishWindow;
use axum::Json;
use chrono::Utc;
use serde_json::{json, Value};

use crate::extract::JsonBody;

pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "metrics": observability::metrics_snapshot(),
    }))
}

/// Resolve a publish window against the server clock. Lets forms render a
/// badge for unsaved values.
pub async fn preview(JsonBody(window): JsonBody<PublishWindow>) -> Json<Value> {
    observability::status_previewed();
    let status = compute_status(&window, Utc::now());
    Json(json!({ "status": status }))
}
