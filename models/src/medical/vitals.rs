// models/src/medical/vitals.rs
use serde::{Deserialize, Serialize};

use crate::errors::{ValidationError, ValidationResult};

/// Vital signs taken during a checkup. Every reading is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vitals {
    /// Systolic/diastolic, e.g. `120/80`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blood_pressure: Option<String>,
    /// Beats per minute.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heart_rate: Option<f64>,
    /// Degrees Celsius.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    /// Breaths per minute.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub respiratory_rate: Option<f64>,
    /// SpO2 percentage.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oxygen_saturation: Option<f64>,
    /// Kilograms.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    /// Centimetres.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
}

impl Vitals {
    pub fn is_empty(&self) -> bool {
        self.blood_pressure.as_deref().map_or(true, |bp| bp.trim().is_empty())
            && self.heart_rate.is_none()
            && self.temperature.is_none()
            && self.respiratory_rate.is_none()
            && self.oxygen_saturation.is_none()
            && self.weight.is_none()
            && self.height.is_none()
    }

    pub fn validate(&self) -> ValidationResult<()> {
        let readings: [(&'static str, Option<f64>); 6] = [
            ("vitals.heartRate", self.heart_rate),
            ("vitals.temperature", self.temperature),
            ("vitals.respiratoryRate", self.respiratory_rate),
            ("vitals.oxygenSaturation", self.oxygen_saturation),
            ("vitals.weight", self.weight),
            ("vitals.height", self.height),
        ];
        for (field, value) in readings {
            if let Some(v) = value {
                if !v.is_finite() || v < 0.0 {
                    return Err(ValidationError::invalid(field, "must be a non-negative number"));
                }
            }
        }
        if matches!(self.oxygen_saturation, Some(v) if v > 100.0) {
            return Err(ValidationError::invalid("vitals.oxygenSaturation", "must be at most 100"));
        }
        if let Some(bp) = self.blood_pressure.as_deref().map(str::trim).filter(|bp| !bp.is_empty()) {
            let valid = bp
                .split_once('/')
                .map(|(sys, dia)| sys.trim().parse::<u16>().is_ok() && dia.trim().parse::<u16>().is_ok())
                .unwrap_or(false);
            if !valid {
                return Err(ValidationError::invalid("vitals.bloodPressure", "expected systolic/diastolic"));
            }
        }
        Ok(())
    }
}
