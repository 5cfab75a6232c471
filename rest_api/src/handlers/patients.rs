// rest_api/src/handlers/patients.rs
// Patients are stored without their checkups; responses assemble a
// `PatientRecord` from the checkup collection.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Extension, Json, Router,
};
use log::info;
use models::medical::{Checkup, NewPatient, Patient, PatientRecord};
use security::AuthUser;
use serde::Deserialize;
use serde_json::{json, Value};

use super::{created, ApiResult};
use crate::errors::RestApiError;
use crate::extract::{ValidJson, ValidQuery};
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/patients", get(list_patients).post(create_patient))
        .route(
            "/api/patients/:id",
            get(get_patient).put(update_patient).patch(update_patient).delete(delete_patient),
        )
}

#[derive(Debug, Default, Deserialize)]
pub struct PatientQuery {
    /// Substring of the name or national id.
    pub search: Option<String>,
}

/// Loads a patient and its checkups, or 404.
pub async fn load_record(state: &AppState, id: &str) -> ApiResult<PatientRecord> {
    let patient = state
        .patients()
        .find(id)
        .await?
        .ok_or_else(|| RestApiError::not_found("Patient"))?;
    let checkups = state.checkups().find_by("patientId", id).await?;
    Ok(PatientRecord::new(patient, checkups))
}

async fn list_patients(State(state): State<AppState>, ValidQuery(query): ValidQuery<PatientQuery>) -> ApiResult<Json<Vec<Patient>>> {
    let mut patients = state.patients().all().await?;
    if let Some(needle) = query.search.as_deref() {
        patients.retain(|patient| patient.matches(needle));
    }
    patients.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(Json(patients))
}

async fn get_patient(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<PatientRecord>> {
    Ok(Json(load_record(&state, &id).await?))
}

async fn create_patient(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ValidJson(request): ValidJson<NewPatient>,
) -> ApiResult<(StatusCode, Json<PatientRecord>)> {
    let (patient, initial) = Patient::from_request(request)?;
    // Validate every initial checkup before anything is written.
    let checkups = initial
        .into_iter()
        .map(|entry| Checkup::initial(&patient.id, entry, Some(user.id.clone())))
        .collect::<Result<Vec<_>, _>>()?;

    let patient = state.patients().insert(patient).await?;
    let mut stored = Vec::with_capacity(checkups.len());
    for checkup in checkups {
        stored.push(state.checkups().insert(checkup).await?);
    }
    info!("{} registered patient {} with {} initial checkup(s)", user.email, patient.id, stored.len());
    Ok(created(PatientRecord::new(patient, stored)))
}

async fn update_patient(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ValidJson(patch): ValidJson<Value>,
) -> ApiResult<Json<PatientRecord>> {
    state
        .patients()
        .update(&id, patch)
        .await?
        .ok_or_else(|| RestApiError::not_found("Patient"))?;
    Ok(Json(load_record(&state, &id).await?))
}

async fn delete_patient(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<Value>> {
    state
        .patients()
        .remove(&id)
        .await?
        .ok_or_else(|| RestApiError::not_found("Patient"))?;
    let removed = state.checkups().remove_by("patientId", &id).await?;
    info!("Deleted patient {} and {} checkup(s)", id, removed);
    Ok(Json(json!({ "message": "Patient deleted", "id": id, "checkupsRemoved": removed })))
}
