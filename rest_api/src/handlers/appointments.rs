// rest_api/src/handlers/appointments.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use models::medical::{Appointment, CheckupSnapshot, NewAppointment, Role};
use serde::Deserialize;
use serde_json::Value;

use super::{created, deleted, ApiResult};
use crate::errors::RestApiError;
use crate::extract::{ValidJson, ValidQuery};
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/appointments", get(list_appointments).post(create_appointment))
        .route(
            "/api/appointments/:id",
            get(get_appointment)
                .put(update_appointment)
                .patch(update_appointment)
                .delete(delete_appointment),
        )
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentQuery {
    pub patient_id: Option<String>,
    pub doctor_id: Option<String>,
}

/// A set doctor id must name a user with the doctor role.
async fn ensure_doctor(state: &AppState, doctor_id: &str) -> ApiResult<()> {
    match state.users().find(doctor_id).await? {
        Some(user) if user.role == Role::Doctor => Ok(()),
        Some(_) => Err(RestApiError::BadRequest(format!("User {} is not a doctor", doctor_id))),
        None => Err(RestApiError::BadRequest(format!("Doctor {} does not exist", doctor_id))),
    }
}

async fn list_appointments(
    State(state): State<AppState>,
    ValidQuery(query): ValidQuery<AppointmentQuery>,
) -> ApiResult<Json<Vec<Appointment>>> {
    let mut appointments = state.appointments().all().await?;
    if let Some(patient_id) = query.patient_id.as_deref() {
        appointments.retain(|a| a.patient_id == patient_id);
    }
    if let Some(doctor_id) = query.doctor_id.as_deref() {
        appointments.retain(|a| a.doctor_id.as_deref() == Some(doctor_id));
    }
    appointments.sort_by(|a, b| a.date_time.cmp(&b.date_time));
    Ok(Json(appointments))
}

async fn get_appointment(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<Appointment>> {
    state
        .appointments()
        .find(&id)
        .await?
        .map(Json)
        .ok_or_else(|| RestApiError::not_found("Appointment"))
}

async fn create_appointment(
    State(state): State<AppState>,
    ValidJson(request): ValidJson<NewAppointment>,
) -> ApiResult<(StatusCode, Json<Appointment>)> {
    if let Some(doctor_id) = request.doctor_id.as_deref().map(str::trim).filter(|d| !d.is_empty()) {
        ensure_doctor(&state, doctor_id).await?;
    }

    let mut snapshots = Vec::with_capacity(request.checkup_ids.len());
    for checkup_id in &request.checkup_ids {
        let checkup = state
            .checkups()
            .find(checkup_id)
            .await?
            .ok_or_else(|| RestApiError::NotFound(format!("Checkup {} not found", checkup_id)))?;
        snapshots.push(CheckupSnapshot::from(&checkup));
    }

    let appointment = Appointment::from_request(request, snapshots)?;
    Ok(created(state.appointments().insert(appointment).await?))
}

async fn update_appointment(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ValidJson(mut patch): ValidJson<Value>,
) -> ApiResult<Json<Appointment>> {
    if let Some(fields) = patch.as_object_mut() {
        // Snapshots are fixed at booking time.
        fields.remove("checkups");
        fields.remove("checkupIds");
    }
    if let Some(doctor_id) = patch.get("doctorId").and_then(Value::as_str).map(str::trim) {
        if !doctor_id.is_empty() {
            ensure_doctor(&state, doctor_id).await?;
        }
    }
    state
        .appointments()
        .update(&id, patch)
        .await?
        .map(Json)
        .ok_or_else(|| RestApiError::not_found("Appointment"))
}

async fn delete_appointment(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<Value>> {
    state
        .appointments()
        .remove(&id)
        .await?
        .ok_or_else(|| RestApiError::not_found("Appointment"))?;
    Ok(deleted("Appointment", &id))
}
