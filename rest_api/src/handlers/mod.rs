// rest_api/src/handlers/mod.rs
// One module per resource. Each exposes `routes()`; authorization is applied
// by the caller in `build_router`.

use axum::{http::StatusCode, Json};
use serde::Serialize;
use serde_json::{json, Value};

use crate::errors::RestApiError;

pub mod analysis;
pub mod announcements;
pub mod appointments;
pub mod auth;
pub mod checkups;
pub mod health;
pub mod patients;
pub mod rooms;
pub mod users;

pub type ApiResult<T> = Result<T, RestApiError>;

pub fn created<T: Serialize>(body: T) -> (StatusCode, Json<T>) {
    (StatusCode::CREATED, Json(body))
}

pub fn deleted(what: &str, id: &str) -> Json<Value> {
    Json(json!({ "message": format!("{} deleted", what), "id": id }))
}
