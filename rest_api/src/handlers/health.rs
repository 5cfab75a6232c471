// rest_api/src/handlers/health.rs

use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value};

use crate::AppState;

// Handler for the /api/health endpoint
pub async fn health_check_handler(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    (
        StatusCode::OK,
        Json(json!({ "status": "ok", "storage": state.store.get_type() })),
    )
}
