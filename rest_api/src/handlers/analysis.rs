// rest_api/src/handlers/analysis.rs

use axum::{extract::State, routing::post, Json, Router};
use chrono::Utc;
use log::{info, warn};
use models::medical::{AiAnalysis, Checkup};
use serde_json::json;

use super::ApiResult;
use crate::ai::{build_prompt, parse_analysis, AiError, AnalysisRequest, PatientContext};
use crate::errors::RestApiError;
use crate::extract::ValidJson;
use crate::AppState;

pub const INSUFFICIENT_DATA_MESSAGE: &str =
    "Insufficient data for analysis. Provide symptoms, examination findings, vital signs or notes.";

pub fn routes() -> Router<AppState> {
    Router::new().route("/api/ai/analyze", post(analyze_handler))
}

async fn patient_context(state: &AppState, checkup: &Checkup) -> ApiResult<Option<PatientContext>> {
    let today = Utc::now().date_naive();
    Ok(state.patients().find(&checkup.patient_id).await?.map(|patient| PatientContext {
        age: patient.age_on(today),
        gender: patient.gender.as_str().to_string(),
        medical_history: patient.medical_history,
    }))
}

/// Runs the model and parses its reply. Failures that the caller can act on
/// become errors; anything else degrades to a fallback analysis.
async fn run_model(state: &AppState, prompt: &str) -> ApiResult<AiAnalysis> {
    let model = state.ai.model_name().to_string();
    let outcome = match state.ai.generate(prompt).await {
        Ok(text) => parse_analysis(&text, &model),
        Err(e) => Err(e),
    };
    match outcome {
        Ok(analysis) => Ok(analysis),
        Err(e @ (AiError::MissingApiKey | AiError::InvalidApiKey(_) | AiError::RateLimited | AiError::SafetyBlocked(_))) => {
            Err(e.into())
        }
        Err(e) => {
            warn!("Returning fallback analysis: {}", e);
            Ok(AiAnalysis::fallback(&model, "AI analysis failed; manual review required"))
        }
    }
}

// Handler for /api/ai/analyze
async fn analyze_handler(
    State(state): State<AppState>,
    ValidJson(request): ValidJson<AnalysisRequest>,
) -> ApiResult<Json<AiAnalysis>> {
    if !request.has_clinical_data() {
        return Err(RestApiError::BadRequest(INSUFFICIENT_DATA_MESSAGE.to_string()));
    }

    let checkup = match request.checkup_id.as_deref().map(str::trim).filter(|id| !id.is_empty()) {
        Some(id) => Some(
            state
                .checkups()
                .find(id)
                .await?
                .ok_or_else(|| RestApiError::not_found("Checkup"))?,
        ),
        None => None,
    };
    let context = match &checkup {
        Some(checkup) => patient_context(&state, checkup).await?,
        None => None,
    };

    let prompt = build_prompt(&request, context.as_ref());
    let analysis = run_model(&state, &prompt).await?;

    // Only the analysis field is written; the checkup may have been edited
    // while the model was running.
    if let Some(checkup) = checkup.filter(|_| !analysis.error) {
        match state.checkups().update(&checkup.id, json!({ "aiAnalysis": &analysis })).await? {
            Some(_) => info!("Stored analysis on checkup {}", checkup.id),
            None => warn!("Checkup {} was removed before its analysis could be stored", checkup.id),
        }
    }
    Ok(Json(analysis))
}
