// models/src/medical/analysis.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Upper bound on the number of differential diagnoses kept per analysis.
pub const MAX_DIAGNOSES: usize = 5;

/// Analysis schema version reported in `AnalysisMetadata`.
pub const ANALYSIS_VERSION: &str = "1.0";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnosis {
    pub condition: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub likelihood: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisMetadata {
    pub generated_at: DateTime<Utc>,
    pub model: String,
    pub version: String,
}

/// Normalized output of the diagnosis-assistance model.
///
/// `error` is set on the degraded object returned when the model could not be
/// used; such an object always asks for manual review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiAnalysis {
    pub diagnoses: Vec<Diagnosis>,
    pub recommended_action: String,
    pub explanation: String,
    pub confidence: f64,
    pub metadata: AnalysisMetadata,
    #[serde(default)]
    pub error: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl AiAnalysis {
    pub fn new(
        mut diagnoses: Vec<Diagnosis>,
        recommended_action: String,
        explanation: String,
        confidence: f64,
        model: &str,
    ) -> Self {
        diagnoses.truncate(MAX_DIAGNOSES);
        AiAnalysis {
            diagnoses,
            recommended_action,
            explanation,
            confidence: clamp_confidence(confidence),
            metadata: AnalysisMetadata {
                generated_at: Utc::now(),
                model: model.to_string(),
                version: ANALYSIS_VERSION.to_string(),
            },
            error: false,
            message: None,
        }
    }

    /// Renderable placeholder used when the model call or its output failed.
    pub fn fallback(model: &str, reason: impl Into<String>) -> Self {
        let mut analysis = AiAnalysis::new(
            Vec::new(),
            "Manual review required".to_string(),
            "Automated analysis is unavailable for this request. A clinician should review the findings directly."
                .to_string(),
            0.0,
            model,
        );
        analysis.error = true;
        analysis.message = Some(reason.into());
        analysis
    }
}

/// Clamps to [0, 100]; non-finite values become 0.
pub fn clamp_confidence(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 100.0)
    } else {
        0.0
    }
}
