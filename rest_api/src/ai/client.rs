// rest_api/src/ai/client.rs

use std::time::Duration;

use async_trait::async_trait;
use log::{debug, warn};
use reqwest::StatusCode;
use serde_json::{json, Value};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AiError {
    #[error("no API key is configured")]
    MissingApiKey,
    #[error("the API key was rejected: {0}")]
    InvalidApiKey(String),
    #[error("provider rate limit reached")]
    RateLimited,
    #[error("{0}")]
    SafetyBlocked(String),
    #[error("request to the AI provider failed: {0}")]
    Request(reqwest::Error),
    #[error("AI provider returned {status}: {message}")]
    Provider { status: u16, message: String },
    #[error("AI provider returned no text")]
    EmptyResponse,
    #[error("could not parse AI response: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for AiError {
    fn from(e: reqwest::Error) -> Self {
        // The request URL carries the API key.
        AiError::Request(e.without_url())
    }
}

/// A text generation backend. One prompt in, one untrusted string out.
#[async_trait]
pub trait GenerativeModel: Send + Sync {
    fn model_name(&self) -> &str;

    async fn generate(&self, prompt: &str) -> Result<String, AiError>;
}

/// Client for the Gemini `generateContent` endpoint.
pub struct GeminiClient {
    http_client: reqwest::Client,
    api_key: Option<String>,
    model: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(api_key: Option<String>, model: &str, base_url: &str, timeout: Duration) -> Result<Self, AiError> {
        let http_client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10).min(timeout))
            .timeout(timeout)
            .build()?;
        Ok(GeminiClient {
            http_client,
            api_key: api_key.filter(|key| !key.trim().is_empty()),
            model: model.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.base_url, self.model)
    }
}

#[async_trait]
impl GenerativeModel for GeminiClient {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn generate(&self, prompt: &str) -> Result<String, AiError> {
        let api_key = self.api_key.as_deref().ok_or(AiError::MissingApiKey)?;
        let body = json!({
            "contents": [{ "role": "user", "parts": [{ "text": prompt }] }],
            "generationConfig": { "temperature": 0.2 },
        });

        debug!("Calling {} ({} prompt chars)", self.model, prompt.len());
        let response = self
            .http_client
            .post(self.endpoint())
            .query(&[("key", api_key)])
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        let payload: Value = serde_json::from_str(&text).unwrap_or(Value::Null);
        if !status.is_success() {
            let error = classify_failure(status, &payload);
            warn!("AI provider call failed: {}", error);
            return Err(error);
        }
        extract_text(&payload)
    }
}

/// Maps a non-success provider response to an error kind.
pub fn classify_failure(status: StatusCode, payload: &Value) -> AiError {
    let message = payload["error"]["message"].as_str().unwrap_or_default().to_string();
    let provider_status = payload["error"]["status"].as_str().unwrap_or_default();
    match status {
        StatusCode::TOO_MANY_REQUESTS => AiError::RateLimited,
        _ if provider_status == "RESOURCE_EXHAUSTED" => AiError::RateLimited,
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => AiError::InvalidApiKey(message),
        StatusCode::BAD_REQUEST if message.to_lowercase().contains("api key") => AiError::InvalidApiKey(message),
        _ => AiError::Provider { status: status.as_u16(), message },
    }
}

/// Pulls the generated text out of a successful response, surfacing
/// safety blocks as errors.
pub fn extract_text(payload: &Value) -> Result<String, AiError> {
    if let Some(reason) = payload["promptFeedback"]["blockReason"].as_str() {
        return Err(AiError::SafetyBlocked(format!("prompt blocked ({})", reason)));
    }
    let candidate = &payload["candidates"][0];
    if candidate["finishReason"].as_str() == Some("SAFETY") {
        return Err(AiError::SafetyBlocked("response blocked (SAFETY)".to_string()));
    }
    let text: String = candidate["content"]["parts"]
        .as_array()
        .map(|parts| parts.iter().filter_map(|part| part["text"].as_str()).collect())
        .unwrap_or_default();
    if text.trim().is_empty() {
        return Err(AiError::EmptyResponse);
    }
    Ok(text)
}
