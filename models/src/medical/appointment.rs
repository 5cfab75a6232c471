// models/src/medical/appointment.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::document::Document;
use crate::errors::{require, ValidationResult};
use crate::identifiers::new_id;
use crate::medical::{Checkup, Vitals};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    #[default]
    Scheduled,
    Completed,
    Cancelled,
}

/// Copy of a checkup taken when the appointment was booked. Later edits to the
/// checkup do not flow into the snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckupSnapshot {
    pub checkup_id: String,
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub symptoms: String,
    #[serde(default)]
    pub vitals: Vitals,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doctor_notes: Option<String>,
}

impl From<&Checkup> for CheckupSnapshot {
    fn from(checkup: &Checkup) -> Self {
        CheckupSnapshot {
            checkup_id: checkup.id.clone(),
            date: checkup.date,
            symptoms: checkup.symptoms.clone(),
            vitals: checkup.vitals.clone(),
            doctor_notes: checkup.doctor_notes.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub id: String,
    pub patient_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doctor_id: Option<String>,
    pub date_time: DateTime<Utc>,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub status: AppointmentStatus,
    #[serde(default)]
    pub checkups: Vec<CheckupSnapshot>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAppointment {
    pub patient_id: String,
    #[serde(default)]
    pub doctor_id: Option<String>,
    pub date_time: DateTime<Utc>,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub status: AppointmentStatus,
    /// Checkups to snapshot onto the appointment.
    #[serde(default)]
    pub checkup_ids: Vec<String>,
}

impl Appointment {
    pub fn from_request(request: NewAppointment, snapshots: Vec<CheckupSnapshot>) -> ValidationResult<Self> {
        let now = Utc::now();
        let mut appointment = Appointment {
            id: new_id(),
            patient_id: request.patient_id,
            doctor_id: request.doctor_id,
            date_time: request.date_time,
            notes: request.notes,
            status: request.status,
            checkups: snapshots,
            created_at: now,
            updated_at: now,
        };
        appointment.normalize();
        appointment.validate()?;
        Ok(appointment)
    }
}

impl Document for Appointment {
    const COLLECTION: &'static str = "appointments";

    fn id(&self) -> &str {
        &self.id
    }

    fn normalize(&mut self) {
        self.patient_id = self.patient_id.trim().to_string();
        self.doctor_id = self
            .doctor_id
            .take()
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());
    }

    fn validate(&self) -> ValidationResult<()> {
        require("patientId", &self.patient_id)
    }

    fn touch(&mut self, at: DateTime<Utc>) {
        self.updated_at = at;
    }
}
