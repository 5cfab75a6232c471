// rest_api/src/handlers/checkups.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Extension, Json, Router,
};
use log::info;
use models::errors::require;
use models::medical::{Checkup, InitialCheckup, NewCheckup};
use security::AuthUser;
use serde::Deserialize;
use serde_json::Value;

use super::{created, deleted, ApiResult};
use crate::errors::RestApiError;
use crate::extract::{ValidJson, ValidQuery};
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/checkups", get(list_checkups).post(create_checkup))
        .route(
            "/api/checkups/:id",
            get(get_checkup).put(update_checkup).patch(update_checkup).delete(delete_checkup),
        )
        .route(
            "/api/patients/:id/checkups",
            get(list_patient_checkups).post(add_initial_checkup),
        )
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckupQuery {
    pub patient_id: Option<String>,
}

fn newest_first(mut checkups: Vec<Checkup>) -> Vec<Checkup> {
    checkups.sort_by(|a, b| b.date.cmp(&a.date));
    checkups
}

async fn ensure_patient(state: &AppState, patient_id: &str) -> ApiResult<()> {
    if state.patients().exists(patient_id).await? {
        Ok(())
    } else {
        Err(RestApiError::not_found("Patient"))
    }
}

async fn list_checkups(State(state): State<AppState>, ValidQuery(query): ValidQuery<CheckupQuery>) -> ApiResult<Json<Vec<Checkup>>> {
    let checkups = match query.patient_id.as_deref() {
        Some(patient_id) => state.checkups().find_by("patientId", patient_id.trim()).await?,
        None => state.checkups().all().await?,
    };
    Ok(Json(newest_first(checkups)))
}

async fn get_checkup(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<Checkup>> {
    state
        .checkups()
        .find(&id)
        .await?
        .map(Json)
        .ok_or_else(|| RestApiError::not_found("Checkup"))
}

async fn create_checkup(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ValidJson(request): ValidJson<NewCheckup>,
) -> ApiResult<(StatusCode, Json<Checkup>)> {
    require("patientId", &request.patient_id)?;
    ensure_patient(&state, request.patient_id.trim()).await?;
    let checkup = Checkup::from_request(request, Some(user.id))?;
    let checkup = state.checkups().insert(checkup).await?;
    info!("Recorded checkup {} for patient {}", checkup.id, checkup.patient_id);
    Ok(created(checkup))
}

async fn update_checkup(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ValidJson(patch): ValidJson<Value>,
) -> ApiResult<Json<Checkup>> {
    if let Some(patient_id) = patch.get("patientId").and_then(Value::as_str) {
        ensure_patient(&state, patient_id.trim()).await?;
    }
    state
        .checkups()
        .update(&id, patch)
        .await?
        .map(Json)
        .ok_or_else(|| RestApiError::not_found("Checkup"))
}

async fn delete_checkup(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<Value>> {
    state
        .checkups()
        .remove(&id)
        .await?
        .ok_or_else(|| RestApiError::not_found("Checkup"))?;
    Ok(deleted("Checkup", &id))
}

async fn list_patient_checkups(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<Vec<Checkup>>> {
    ensure_patient(&state, &id).await?;
    Ok(Json(newest_first(state.checkups().find_by("patientId", &id).await?)))
}

async fn add_initial_checkup(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    ValidJson(entry): ValidJson<InitialCheckup>,
) -> ApiResult<(StatusCode, Json<Checkup>)> {
    ensure_patient(&state, &id).await?;
    let checkup = Checkup::initial(&id, entry, Some(user.id))?;
    Ok(created(state.checkups().insert(checkup).await?))
}
