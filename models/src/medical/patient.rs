// models/src/medical/patient.rs
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::document::Document;
use crate::errors::{require, ValidationError, ValidationResult};
use crate::identifiers::{new_id, normalize_email, normalize_national_id};
use crate::medical::{Checkup, InitialCheckup};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    #[serde(alias = "Male", alias = "M")]
    Male,
    #[serde(alias = "Female", alias = "F")]
    Female,
    #[serde(alias = "Other")]
    Other,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::Other => "other",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BloodType {
    #[serde(rename = "A+")]
    APositive,
    #[serde(rename = "A-")]
    ANegative,
    #[serde(rename = "B+")]
    BPositive,
    #[serde(rename = "B-")]
    BNegative,
    #[serde(rename = "AB+")]
    AbPositive,
    #[serde(rename = "AB-")]
    AbNegative,
    #[serde(rename = "O+")]
    OPositive,
    #[serde(rename = "O-")]
    ONegative,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    pub id: String,
    pub national_id: String,
    pub name: String,
    pub gender: Gender,
    pub birthdate: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blood_type: Option<BloodType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default)]
    pub medical_history: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Registration payload. `checkups` holds the initial vitals taken at the
/// desk; they are stored in the checkup collection, not on the patient.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPatient {
    pub national_id: String,
    pub name: String,
    pub gender: Gender,
    pub birthdate: NaiveDate,
    #[serde(default)]
    pub blood_type: Option<BloodType>,
    #[serde(default)]
    pub contact: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub medical_history: String,
    #[serde(default)]
    pub checkups: Vec<InitialCheckup>,
}

impl Patient {
    /// Splits a registration payload into the patient and its initial checkups.
    pub fn from_request(request: NewPatient) -> ValidationResult<(Self, Vec<InitialCheckup>)> {
        let now = Utc::now();
        let mut patient = Patient {
            id: new_id(),
            national_id: request.national_id,
            name: request.name,
            gender: request.gender,
            birthdate: request.birthdate,
            blood_type: request.blood_type,
            contact: request.contact,
            email: request.email,
            address: request.address,
            medical_history: request.medical_history,
            created_at: now,
            updated_at: now,
        };
        patient.normalize();
        patient.validate()?;
        Ok((patient, request.checkups))
    }

    /// Age in whole years on `today`.
    pub fn age_on(&self, today: NaiveDate) -> u32 {
        today.years_since(self.birthdate).unwrap_or(0)
    }

    pub fn matches(&self, needle: &str) -> bool {
        let needle = needle.trim().to_lowercase();
        needle.is_empty()
            || self.name.to_lowercase().contains(&needle)
            || self.national_id.to_lowercase().contains(&needle)
    }
}

impl Document for Patient {
    const COLLECTION: &'static str = "patients";
    const UNIQUE_FIELDS: &'static [&'static str] = &["nationalId"];

    fn id(&self) -> &str {
        &self.id
    }

    fn normalize(&mut self) {
        if let Ok(national_id) = normalize_national_id(&self.national_id) {
            self.national_id = national_id;
        }
        self.name = self.name.trim().to_string();
        if let Some(email) = self.email.as_deref().and_then(|e| normalize_email(e).ok()) {
            self.email = Some(email);
        }
        for field in [&mut self.contact, &mut self.address, &mut self.email] {
            if field.as_deref().map_or(false, |v| v.trim().is_empty()) {
                *field = None;
            }
        }
    }

    fn validate(&self) -> ValidationResult<()> {
        normalize_national_id(&self.national_id)?;
        require("name", &self.name)?;
        if let Some(email) = &self.email {
            normalize_email(email)?;
        }
        if self.birthdate > Utc::now().date_naive() {
            return Err(ValidationError::invalid("birthdate", "cannot be in the future"));
        }
        Ok(())
    }

    fn touch(&mut self, at: DateTime<Utc>) {
        self.updated_at = at;
    }
}

/// A patient together with its checkups, newest first.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientRecord {
    #[serde(flatten)]
    pub patient: Patient,
    pub checkups: Vec<Checkup>,
}

impl PatientRecord {
    pub fn new(patient: Patient, mut checkups: Vec<Checkup>) -> Self {
        checkups.sort_by(|a, b| b.date.cmp(&a.date));
        PatientRecord { patient, checkups }
    }
}
