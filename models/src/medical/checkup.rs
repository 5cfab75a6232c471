// models/src/medical/checkup.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::document::Document;
use crate::errors::{require, ValidationError, ValidationResult};
use crate::identifiers::new_id;
use crate::medical::{AiAnalysis, Vitals};

/// Where a checkup came from. Initial checkups are the vitals taken when the
/// patient is registered or appended from the patient record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CheckupKind {
    Initial,
    #[default]
    FollowUp,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Checkup {
    pub id: String,
    pub patient_id: String,
    #[serde(default)]
    pub kind: CheckupKind,
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub symptoms: String,
    #[serde(default)]
    pub details: String,
    #[serde(default)]
    pub vitals: Vitals,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diagnosis: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doctor_notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_analysis: Option<AiAnalysis>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recorded_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request body for a standalone checkup.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCheckup {
    pub patient_id: String,
    #[serde(default)]
    pub kind: CheckupKind,
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub symptoms: String,
    #[serde(default)]
    pub details: String,
    #[serde(default)]
    pub vitals: Vitals,
    #[serde(default)]
    pub diagnosis: Option<String>,
    #[serde(default)]
    pub doctor_notes: Option<String>,
}

/// Lightweight vitals record taken at registration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitialCheckup {
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub vitals: Vitals,
    #[serde(default)]
    pub symptoms: String,
    #[serde(default)]
    pub notes: Option<String>,
}

impl Checkup {
    pub fn from_request(request: NewCheckup, recorded_by: Option<String>) -> ValidationResult<Self> {
        let now = Utc::now();
        let mut checkup = Checkup {
            id: new_id(),
            patient_id: request.patient_id,
            kind: request.kind,
            date: request.date.unwrap_or(now),
            symptoms: request.symptoms,
            details: request.details,
            vitals: request.vitals,
            diagnosis: request.diagnosis,
            doctor_notes: request.doctor_notes,
            ai_analysis: None,
            recorded_by,
            created_at: now,
            updated_at: now,
        };
        checkup.normalize();
        checkup.validate()?;
        Ok(checkup)
    }

    pub fn initial(patient_id: &str, initial: InitialCheckup, recorded_by: Option<String>) -> ValidationResult<Self> {
        Checkup::from_request(
            NewCheckup {
                patient_id: patient_id.to_string(),
                kind: CheckupKind::Initial,
                date: initial.date,
                symptoms: initial.symptoms,
                details: String::new(),
                vitals: initial.vitals,
                diagnosis: None,
                doctor_notes: initial.notes,
            },
            recorded_by,
        )
    }
}

impl Document for Checkup {
    const COLLECTION: &'static str = "checkups";

    fn id(&self) -> &str {
        &self.id
    }

    fn normalize(&mut self) {
        self.patient_id = self.patient_id.trim().to_string();
        self.symptoms = self.symptoms.trim().to_string();
        self.details = self.details.trim().to_string();
    }

    fn validate(&self) -> ValidationResult<()> {
        require("patientId", &self.patient_id)?;
        self.vitals.validate()?;
        if self.date > Utc::now() + chrono::Duration::days(1) {
            return Err(ValidationError::invalid("date", "cannot be in the future"));
        }
        Ok(())
    }

    fn touch(&mut self, at: DateTime<Utc>) {
        self.updated_at = at;
    }
}
